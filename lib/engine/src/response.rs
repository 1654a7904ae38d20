use craftrec_core::{ItemId, RecommendationType};
use craftrec_similarity::{confidence, DiversityStats, OriginWeights, RecommendationItem};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Response for every request kind. An empty list with a `message` is a
/// normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub source_item_id: Option<ItemId>,
    pub total_recommendations: usize,
    pub recommendations: Vec<RecommendationItem>,
    pub recommendation_types_used: Vec<RecommendationType>,
    pub processing_time_ms: f64,
    pub cultural_diversity_stats: DiversityStats,
    pub recommendation_confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RecommendationResponse {
    pub fn new(
        source_item_id: Option<ItemId>,
        recommendations: Vec<RecommendationItem>,
        recommendation_types_used: Vec<RecommendationType>,
        origin_weights: &OriginWeights,
    ) -> Self {
        Self {
            source_item_id,
            total_recommendations: recommendations.len(),
            cultural_diversity_stats: DiversityStats::compute(&recommendations),
            recommendation_confidence: confidence(&recommendations, origin_weights),
            recommendations,
            recommendation_types_used,
            processing_time_ms: 0.0,
            message: None,
        }
    }

    pub fn empty(source_item_id: Option<ItemId>, message: impl Into<String>) -> Self {
        Self {
            source_item_id,
            total_recommendations: 0,
            recommendations: Vec::new(),
            recommendation_types_used: Vec::new(),
            processing_time_ms: 0.0,
            cultural_diversity_stats: DiversityStats::default(),
            recommendation_confidence: 0.0,
            message: Some(message.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }

    #[must_use]
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.set_elapsed(elapsed);
        self
    }

    /// Wall-clock time in milliseconds, rounded to two decimals
    pub fn set_elapsed(&mut self, elapsed: Duration) {
        let ms = elapsed.as_secs_f64() * 1000.0;
        self.processing_time_ms = (ms * 100.0).round() / 100.0;
    }

    /// Keep only the items matching `keep`, refreshing the summary fields
    pub fn retain_items(&mut self, keep: impl FnMut(&RecommendationItem) -> bool, origin_weights: &OriginWeights) {
        self.recommendations.retain(keep);
        self.total_recommendations = self.recommendations.len();
        self.cultural_diversity_stats = DiversityStats::compute(&self.recommendations);
        self.recommendation_confidence = confidence(&self.recommendations, origin_weights);
    }
}
