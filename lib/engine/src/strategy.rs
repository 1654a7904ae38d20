//! Recommendation strategies
//!
//! Each strategy scores the shared candidate set against its own reference
//! and keeps the candidates over the request threshold. Strategies fail
//! independently; the orchestrator drops a failed one and carries on.

use ahash::AHashMap;
use async_trait::async_trait;
use craftrec_core::{CandidateItem, CulturalContext, Error, Festival, RecommendationType, Result};
use craftrec_similarity::{accept, RecommendationItem, Reference, Scorer};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Inputs shared by every strategy of one item request
pub struct StrategyContext<'a> {
    pub source: &'a CulturalContext,
    pub candidates: &'a [CandidateItem],
    pub threshold: f32,
    pub limit: usize,
    pub active_festivals: &'a BTreeSet<Festival>,
}

#[async_trait]
pub trait RecommendationStrategy: Send + Sync {
    fn kind(&self) -> RecommendationType;

    async fn recommend(&self, ctx: &StrategyContext<'_>) -> Result<Vec<RecommendationItem>>;
}

/// Score every candidate against `reference`, keep the accepted ones, best first
pub fn score_candidates(
    scorer: &Scorer,
    reference: Reference<'_>,
    candidates: &[CandidateItem],
    threshold: f32,
    kind: RecommendationType,
) -> Result<Vec<RecommendationItem>> {
    let mut items = Vec::new();
    for candidate in candidates {
        let result = scorer
            .try_score(reference, candidate)
            .map_err(|e| Error::Scoring(e.to_string()))?;
        if accept(&result, threshold) {
            items.push(RecommendationItem::new(candidate, result, kind));
        }
    }
    items.sort_by(|a, b| b.overall_score().total_cmp(&a.overall_score()));
    Ok(items)
}

pub struct CulturalSimilarityStrategy {
    scorer: Scorer,
}

impl CulturalSimilarityStrategy {
    pub fn new(scorer: Scorer) -> Self {
        Self { scorer }
    }
}

#[async_trait]
impl RecommendationStrategy for CulturalSimilarityStrategy {
    fn kind(&self) -> RecommendationType {
        RecommendationType::CulturalSimilarity
    }

    async fn recommend(&self, ctx: &StrategyContext<'_>) -> Result<Vec<RecommendationItem>> {
        let mut items =
            score_candidates(&self.scorer, Reference::Item(ctx.source), ctx.candidates, ctx.threshold, self.kind())?;
        items.truncate(ctx.limit);
        Ok(items)
    }
}

/// Same craft or a related tradition from a different region
pub struct RegionalDiscoveryStrategy {
    scorer: Scorer,
}

impl RegionalDiscoveryStrategy {
    pub fn new(scorer: Scorer) -> Self {
        Self { scorer }
    }
}

#[async_trait]
impl RecommendationStrategy for RegionalDiscoveryStrategy {
    fn kind(&self) -> RecommendationType {
        RecommendationType::RegionalDiscovery
    }

    async fn recommend(&self, ctx: &StrategyContext<'_>) -> Result<Vec<RecommendationItem>> {
        let mut items = score_candidates(
            &self.scorer,
            Reference::Discovery(ctx.source),
            ctx.candidates,
            ctx.threshold,
            self.kind(),
        )?;
        items.truncate(ctx.limit);
        Ok(items)
    }
}

/// Items tied to the festivals currently in season
pub struct FestivalSeasonalStrategy {
    scorer: Scorer,
}

impl FestivalSeasonalStrategy {
    pub fn new(scorer: Scorer) -> Self {
        Self { scorer }
    }
}

#[async_trait]
impl RecommendationStrategy for FestivalSeasonalStrategy {
    fn kind(&self) -> RecommendationType {
        RecommendationType::FestivalSeasonal
    }

    async fn recommend(&self, ctx: &StrategyContext<'_>) -> Result<Vec<RecommendationItem>> {
        if ctx.active_festivals.is_empty() {
            return Ok(Vec::new());
        }
        let mut items = score_candidates(
            &self.scorer,
            Reference::Season(ctx.active_festivals),
            ctx.candidates,
            ctx.threshold,
            self.kind(),
        )?;
        items.truncate(ctx.limit);
        Ok(items)
    }
}

#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: AHashMap<RecommendationType, Arc<dyn RecommendationStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The three built-in strategies sharing one scorer
    pub fn with_defaults(scorer: Scorer) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CulturalSimilarityStrategy::new(scorer.clone())));
        registry.register(Arc::new(RegionalDiscoveryStrategy::new(scorer.clone())));
        registry.register(Arc::new(FestivalSeasonalStrategy::new(scorer)));
        registry
    }

    /// Replaces any strategy of the same kind
    pub fn register(&mut self, strategy: Arc<dyn RecommendationStrategy>) {
        self.strategies.insert(strategy.kind(), strategy);
    }

    pub fn get(&self, kind: RecommendationType) -> Option<Arc<dyn RecommendationStrategy>> {
        self.strategies.get(&kind).cloned()
    }
}
