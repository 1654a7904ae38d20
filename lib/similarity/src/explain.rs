//! Explainability for recommendation results
//!
//! Output structures that show how each recommendation was scored, plus
//! summary statistics computed over a finished list.

use crate::scorer::SimilarityResult;
use craftrec_core::{
    CandidateItem, ContextOrigin, CulturalContext, ItemId, ItemPayload, RecommendationType,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Numeric part of a [`SimilarityResult`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub overall_score: f32,
    pub cultural_similarity: f32,
    pub vector_similarity: f32,
    pub seasonal_relevance: f32,
    pub regional_match: f32,
    pub festival_relevance: f32,
}

impl From<&SimilarityResult> for ScoreBreakdown {
    fn from(r: &SimilarityResult) -> Self {
        Self {
            overall_score: r.overall_score,
            cultural_similarity: r.cultural_similarity,
            vector_similarity: r.vector_similarity,
            seasonal_relevance: r.seasonal_relevance,
            regional_match: r.regional_match,
            festival_relevance: r.festival_relevance,
        }
    }
}

/// One recommended item with its score explanation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub id: ItemId,
    pub text: String,
    pub payload: ItemPayload,
    pub recommendation_type: RecommendationType,
    pub cultural_context: CulturalContext,
    /// Whether the context was parsed, inferred from keywords, or unknown
    pub context_origin: ContextOrigin,
    pub score_breakdown: ScoreBreakdown,
    pub match_reasons: Vec<String>,
    /// `1 - vector_similarity`, when the item came from neighbor retrieval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_from_source: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasonal_context: Option<String>,
}

impl RecommendationItem {
    pub fn new(candidate: &CandidateItem, result: SimilarityResult, kind: RecommendationType) -> Self {
        Self {
            id: candidate.id.clone(),
            text: candidate.text.clone(),
            payload: candidate.payload.clone(),
            recommendation_type: kind,
            cultural_context: candidate.cultural_context.clone(),
            context_origin: candidate.context_origin,
            score_breakdown: ScoreBreakdown::from(&result),
            distance_from_source: candidate.vector_similarity.map(|s| 1.0 - s),
            seasonal_context: (result.seasonal_relevance > 0.0)
                .then(|| format!("Seasonal relevance: {:.2}", result.seasonal_relevance)),
            match_reasons: result.match_reasons,
        }
    }

    pub fn overall_score(&self) -> f32 {
        self.score_breakdown.overall_score
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiversityStats {
    pub unique_regions: usize,
    pub unique_craft_types: usize,
    pub total_items: usize,
}

impl DiversityStats {
    pub fn compute(items: &[RecommendationItem]) -> Self {
        let regions: BTreeSet<_> = items.iter().filter_map(|i| i.cultural_context.region).collect();
        let crafts: BTreeSet<_> = items.iter().filter_map(|i| i.cultural_context.craft_type).collect();
        Self {
            unique_regions: regions.len(),
            unique_craft_types: crafts.len(),
            total_items: items.len(),
        }
    }
}

/// How much a score counts toward confidence, by context origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginWeights {
    pub parsed: f32,
    pub heuristic: f32,
    pub default: f32,
}

impl Default for OriginWeights {
    fn default() -> Self {
        Self { parsed: 1.0, heuristic: 0.8, default: 0.5 }
    }
}

impl OriginWeights {
    pub fn weight(&self, origin: ContextOrigin) -> f32 {
        match origin {
            ContextOrigin::Parsed => self.parsed,
            ContextOrigin::Heuristic => self.heuristic,
            ContextOrigin::Default => self.default,
        }
    }
}

/// Mean overall score, discounted for items whose context is degraded or unknown
pub fn confidence(items: &[RecommendationItem], weights: &OriginWeights) -> f32 {
    if items.is_empty() {
        return 0.0;
    }
    let total: f32 = items
        .iter()
        .map(|i| i.overall_score() * weights.weight(i.context_origin))
        .sum();
    total / items.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use craftrec_core::{CraftType, Region};

    fn item(id: &str, score: f32, origin: ContextOrigin, region: Option<Region>) -> RecommendationItem {
        let ctx = CulturalContext { region, craft_type: Some(CraftType::Pottery), ..Default::default() };
        let candidate = CandidateItem {
            id: ItemId::new(id),
            text: "text".to_string(),
            payload: ItemPayload::default(),
            cultural_context: ctx,
            context_origin: origin,
            vector_similarity: Some(0.75),
        };
        let result = SimilarityResult { overall_score: score, ..Default::default() };
        RecommendationItem::new(&candidate, result, RecommendationType::CulturalSimilarity)
    }

    #[test]
    fn test_distance_from_source() {
        let rec = item("a", 0.5, ContextOrigin::Parsed, None);
        assert_eq!(rec.distance_from_source, Some(0.25));
        assert_eq!(rec.seasonal_context, None);
    }

    #[test]
    fn test_diversity_stats() {
        let items = vec![
            item("a", 0.5, ContextOrigin::Parsed, Some(Region::Rajasthan)),
            item("b", 0.5, ContextOrigin::Parsed, Some(Region::Rajasthan)),
            item("c", 0.5, ContextOrigin::Parsed, Some(Region::Kerala)),
            item("d", 0.5, ContextOrigin::Parsed, None),
        ];
        let stats = DiversityStats::compute(&items);
        assert_eq!(stats, DiversityStats { unique_regions: 2, unique_craft_types: 1, total_items: 4 });
    }

    #[test]
    fn test_confidence_discounts_degraded_origins() {
        let weights = OriginWeights::default();
        let items = vec![
            item("a", 0.8, ContextOrigin::Parsed, None),
            item("b", 0.8, ContextOrigin::Heuristic, None),
            item("c", 0.8, ContextOrigin::Default, None),
        ];
        let expected = (0.8 + 0.64 + 0.4) / 3.0;
        assert!((confidence(&items, &weights) - expected).abs() < 1e-6);
        assert_eq!(confidence(&[], &weights), 0.0);
    }
}
