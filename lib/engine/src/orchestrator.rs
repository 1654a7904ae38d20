//! Recommendation Orchestrator
//!
//! Entry point for item, user and seasonal requests. An item request moves
//! through cache lookup, source resolution, neighbor retrieval, per-strategy
//! scoring, deduplication, diversification and finally the cache write. Only
//! a request that fails validation returns an error; every other outcome is
//! a well-formed response, possibly empty with a message.
//!
//! The cache write is the last step of a request. A request future dropped
//! before completion never leaves an entry behind.

use crate::calendar::SeasonalCalendar;
use crate::candidates::CandidateSource;
use crate::config::EngineConfig;
use crate::request::{ItemRecommendationRequest, SeasonalRequest, UserPreferenceRequest};
use crate::resolver::{AnalysisBudget, CulturalContextResolver};
use crate::response::RecommendationResponse;
use crate::stats::{ServiceStats, StatsSnapshot};
use crate::strategy::{score_candidates, RecommendationStrategy, StrategyContext, StrategyRegistry};
use craftrec_core::{
    CandidateItem, CulturalAnalyzer, CulturalSignificance, DocumentStore, FilterCondition,
    ItemFilter, KeyValueCache, RecommendationType, Result, VectorIndex,
};
use craftrec_similarity::{
    DiversityRanker, RecommendationItem, Reference, Scorer, UserCulturalProfile,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

pub type ResponseCache = dyn KeyValueCache<RecommendationResponse>;

pub struct OrchestratorBuilder {
    store: Arc<dyn DocumentStore>,
    index: Arc<dyn VectorIndex>,
    analyzer: Arc<dyn CulturalAnalyzer>,
    cache: Arc<ResponseCache>,
    config: EngineConfig,
    calendar: SeasonalCalendar,
    stats: Option<Arc<ServiceStats>>,
    extra_strategies: Vec<Arc<dyn RecommendationStrategy>>,
}

impl OrchestratorBuilder {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        index: Arc<dyn VectorIndex>,
        analyzer: Arc<dyn CulturalAnalyzer>,
        cache: Arc<ResponseCache>,
    ) -> Self {
        Self {
            store,
            index,
            analyzer,
            cache,
            config: EngineConfig::default(),
            calendar: SeasonalCalendar::default(),
            stats: None,
            extra_strategies: Vec::new(),
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn calendar(mut self, calendar: SeasonalCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Share counters with another component
    pub fn stats(mut self, stats: Arc<ServiceStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Add a strategy, replacing the built-in one of the same kind
    pub fn strategy(mut self, strategy: Arc<dyn RecommendationStrategy>) -> Self {
        self.extra_strategies.push(strategy);
        self
    }

    pub fn build(self) -> Result<RecommendationOrchestrator> {
        let mut config = self.config;
        config.validate()?;

        let stats = self.stats.unwrap_or_default();
        let resolver = Arc::new(CulturalContextResolver::new(
            self.analyzer,
            self.store.clone(),
            stats.clone(),
        ));
        let candidates = CandidateSource::new(self.store.clone(), self.index, resolver.clone(), &config);
        let scorer = Scorer::new(config.weights.clone());

        let mut strategies = StrategyRegistry::with_defaults(scorer.clone());
        for strategy in self.extra_strategies {
            strategies.register(strategy);
        }

        Ok(RecommendationOrchestrator {
            ranker: DiversityRanker::new(config.diversity_strict_cutoff),
            config,
            store: self.store,
            resolver,
            candidates,
            strategies,
            scorer,
            calendar: self.calendar,
            cache: self.cache,
            stats,
        })
    }
}

pub struct RecommendationOrchestrator {
    config: EngineConfig,
    store: Arc<dyn DocumentStore>,
    resolver: Arc<CulturalContextResolver>,
    candidates: CandidateSource,
    strategies: StrategyRegistry,
    scorer: Scorer,
    ranker: DiversityRanker,
    calendar: SeasonalCalendar,
    cache: Arc<ResponseCache>,
    pub(crate) stats: Arc<ServiceStats>,
}

impl RecommendationOrchestrator {
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Drop every cached response, returning how many were held
    pub async fn clear_cache(&self) -> usize {
        match self.cache.clear().await {
            Ok(n) => {
                info!(cleared = n, "response cache cleared");
                n
            }
            Err(e) => {
                warn!(error = %e, "failed to clear response cache");
                0
            }
        }
    }

    pub async fn recommend_for_item(&self, request: &ItemRecommendationRequest) -> Result<RecommendationResponse> {
        let span = info_span!("item_request", request_id = %Uuid::new_v4(), item_id = %request.item_id);
        self.item_flow(request).instrument(span).await
    }

    pub async fn recommend_for_user(&self, request: &UserPreferenceRequest) -> Result<RecommendationResponse> {
        let user = request.user_id.as_deref().unwrap_or("anonymous");
        let span = info_span!("user_request", request_id = %Uuid::new_v4(), user);
        self.user_flow(request).instrument(span).await
    }

    pub async fn recommend_seasonal(&self, request: &SeasonalRequest) -> Result<RecommendationResponse> {
        let span = info_span!("seasonal_request", request_id = %Uuid::new_v4());
        self.seasonal_flow(request).instrument(span).await
    }

    async fn item_flow(&self, request: &ItemRecommendationRequest) -> Result<RecommendationResponse> {
        let started = Instant::now();
        if let Err(e) = request.validate() {
            self.stats.record_failed_request();
            return Err(e.into());
        }
        let source_id = request.item_id.clone();

        let key = request.cache_key();
        match self.cache.get(&key).await {
            Ok(Some(mut cached)) => {
                self.stats.record_cache_hit();
                cached.set_elapsed(started.elapsed());
                debug!(key = %key, "response cache hit");
                return Ok(cached);
            }
            Ok(None) => self.stats.record_cache_miss(),
            Err(e) => {
                warn!(error = %e, key = %key, "response cache read failed");
                self.stats.record_cache_miss();
            }
        }

        let budget = AnalysisBudget::new(self.config.analysis_budget);
        let source = match self.store.get_by_ids(std::slice::from_ref(&source_id)).await {
            Ok(mut records) => records.pop(),
            Err(e) => {
                warn!(error = %e, "source lookup failed");
                None
            }
        };
        let Some(source) = source.filter(|r| !r.is_blank()) else {
            warn!("source item not found");
            self.stats.record_failed_request();
            let message = format!("Source item {} not found", source_id);
            return Ok(RecommendationResponse::empty(Some(source_id), message).with_elapsed(started.elapsed()));
        };

        let resolution = self.resolver.resolve_record(&source, &budget, request.force_refresh).await;
        let origin = resolution.origin();
        let (source_context, _) = resolution.into_parts();
        info!(context = %source_context.summary(), ?origin, "source resolved");

        let candidates = self.candidates.neighbors(&source_id, &request.exclude_item_ids, &budget).await;
        if candidates.is_empty() {
            self.stats.record_empty_response();
            return Ok(RecommendationResponse::empty(Some(source_id), "No candidate items found")
                .with_elapsed(started.elapsed()));
        }
        info!(candidates = candidates.len(), analyses_left = budget.remaining(), "candidates fetched");

        let active_festivals = self.calendar.active_festivals();
        let ctx = StrategyContext {
            source: &source_context,
            candidates: &candidates,
            threshold: request.similarity_threshold,
            limit: request.limit,
            active_festivals: &active_festivals,
        };

        let mut merged = Vec::new();
        let mut types_used = Vec::new();
        for kind in request.unique_types() {
            let Some(strategy) = self.strategies.get(kind) else {
                warn!(strategy = %kind, "no strategy registered");
                self.stats.record_strategy_failure();
                continue;
            };
            match strategy.recommend(&ctx).await {
                Ok(items) => {
                    debug!(strategy = %kind, count = items.len(), "strategy scored");
                    merged.extend(items);
                    types_used.push(kind);
                }
                Err(e) => {
                    warn!(strategy = %kind, error = %e, "strategy failed, skipping");
                    self.stats.record_strategy_failure();
                }
            }
        }

        let ranked = if request.enable_diversity {
            self.ranker
                .rank_and_diversify(merged, self.config.item_diversity_factor, request.limit)
        } else {
            let mut ranked = self.ranker.rank(merged);
            ranked.truncate(request.limit);
            ranked
        };

        let mut response =
            RecommendationResponse::new(Some(source_id), ranked, types_used, &self.config.origin_weights);
        let elapsed = started.elapsed();
        response.set_elapsed(elapsed);
        self.stats.record_served(elapsed);
        info!(
            total = response.total_recommendations,
            ms = response.processing_time_ms,
            "item recommendations ready"
        );

        if !response.recommendation_types_used.is_empty() {
            if let Err(e) = self.cache.set(&key, response.clone(), self.config.cache_ttl()).await {
                warn!(error = %e, key = %key, "response cache write failed");
            }
        }
        Ok(response)
    }

    async fn user_flow(&self, request: &UserPreferenceRequest) -> Result<RecommendationResponse> {
        let started = Instant::now();
        if let Err(e) = request.validate() {
            self.stats.record_failed_request();
            return Err(e.into());
        }
        let budget = AnalysisBudget::new(self.config.analysis_budget);

        let history = &request.user_interaction_history;
        let recent = &history[history.len().saturating_sub(self.config.history_window)..];
        let records = if recent.is_empty() {
            Vec::new()
        } else {
            self.store.get_by_ids(recent).await.unwrap_or_else(|e| {
                warn!(error = %e, "failed to fetch interaction history");
                Vec::new()
            })
        };
        if records.len() < recent.len() {
            debug!(missing = recent.len() - records.len(), "interaction items not found");
        }

        let mut contexts = Vec::with_capacity(records.len());
        for record in &records {
            let (ctx, _) = self.resolver.resolve_record(record, &budget, false).await.into_parts();
            contexts.push(ctx);
        }

        let profile = UserCulturalProfile::builder()
            .history(contexts)
            .declared_crafts(request.preferred_craft_types.iter().copied())
            .declared_regions(request.preferred_regions.iter().copied())
            .declared_festivals(request.preferred_festivals.iter().copied())
            .build();
        info!(
            interactions = profile.interaction_count,
            openness = profile.cultural_openness,
            "user profile built"
        );

        let mut conditions = Vec::new();
        if !request.preferred_craft_types.is_empty() {
            conditions.push(FilterCondition::CraftIn(request.preferred_craft_types.iter().copied().collect()));
        }
        if !request.preferred_regions.is_empty() {
            conditions.push(FilterCondition::RegionIn(request.preferred_regions.iter().copied().collect()));
        }
        if !request.preferred_festivals.is_empty() {
            conditions.push(FilterCondition::FestivalAny(request.preferred_festivals.iter().copied().collect()));
        }
        let filter = ItemFilter::all(conditions);

        let candidates = self
            .candidates
            .scan(&filter, request.budget_range.as_ref(), history, &budget)
            .await;
        if candidates.is_empty() {
            self.stats.record_empty_response();
            return Ok(RecommendationResponse::empty(None, "No suitable items found for user preferences")
                .with_elapsed(started.elapsed()));
        }

        let (scored, types_used) = self.score_single(
            Reference::Profile(&profile),
            &candidates,
            self.config.user_similarity_threshold,
            RecommendationType::CulturalSimilarity,
        );
        let ranked = self.ranker.rank_and_diversify(scored, request.diversity_factor, request.limit);

        let mut response = RecommendationResponse::new(None, ranked, types_used, &self.config.origin_weights);
        let elapsed = started.elapsed();
        response.set_elapsed(elapsed);
        self.stats.record_served(elapsed);
        info!(total = response.total_recommendations, "user recommendations ready");
        Ok(response)
    }

    /// Score against one reference. A failure counts as a strategy failure
    /// and leaves `kind` out of the types used.
    fn score_single(
        &self,
        reference: Reference<'_>,
        candidates: &[CandidateItem],
        threshold: f32,
        kind: RecommendationType,
    ) -> (Vec<RecommendationItem>, Vec<RecommendationType>) {
        match score_candidates(&self.scorer, reference, candidates, threshold, kind) {
            Ok(items) => (items, vec![kind]),
            Err(e) => {
                warn!(strategy = %kind, error = %e, "scoring failed");
                self.stats.record_strategy_failure();
                (Vec::new(), Vec::new())
            }
        }
    }

    async fn seasonal_flow(&self, request: &SeasonalRequest) -> Result<RecommendationResponse> {
        let started = Instant::now();
        if let Err(e) = request.validate() {
            self.stats.record_failed_request();
            return Err(e.into());
        }

        let mut active = request.requested_festivals();
        if active.is_empty() {
            active = self.calendar.active_festivals();
            debug!(festivals = active.len(), "using calendar festivals");
        }
        if active.is_empty() {
            warn!("no active festivals");
            self.stats.record_empty_response();
            return Ok(RecommendationResponse::empty(None, "No active festivals for seasonal recommendations")
                .with_elapsed(started.elapsed()));
        }

        let mut conditions = vec![FilterCondition::FestivalAny(active.clone())];
        if let Some(region) = request.region_preference {
            conditions.push(FilterCondition::RegionIn([region].into()));
        }
        if request.include_gift_items {
            conditions.push(FilterCondition::SignificanceIn(
                [
                    CulturalSignificance::GiftItem,
                    CulturalSignificance::FestivalItem,
                    CulturalSignificance::Decorative,
                ]
                .into(),
            ));
        }
        if request.include_decorative {
            conditions.push(FilterCondition::Not(Box::new(FilterCondition::SignificanceIn(
                [CulturalSignificance::DailyUse].into(),
            ))));
        }
        let filter = ItemFilter::all(conditions);

        let budget = AnalysisBudget::new(self.config.analysis_budget);
        let candidates = self.candidates.scan(&filter, request.price_range.as_ref(), &[], &budget).await;
        if candidates.is_empty() {
            self.stats.record_empty_response();
            return Ok(RecommendationResponse::empty(None, "No items available for seasonal analysis")
                .with_elapsed(started.elapsed()));
        }

        let (scored, types_used) = self.score_single(
            Reference::Season(&active),
            &candidates,
            self.config.seasonal_similarity_threshold,
            RecommendationType::FestivalSeasonal,
        );
        let mut ranked = self.ranker.rank(scored);
        ranked.truncate(request.limit);

        let mut response = RecommendationResponse::new(None, ranked, types_used, &self.config.origin_weights);
        let elapsed = started.elapsed();
        response.set_elapsed(elapsed);
        self.stats.record_served(elapsed);
        info!(festivals = active.len(), total = response.total_recommendations, "seasonal recommendations ready");
        Ok(response)
    }
}
