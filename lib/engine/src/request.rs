//! Request shapes accepted by the orchestrator
//!
//! Enum-valued fields are closed types, so unknown values are rejected while
//! the request is deserialized. Numeric ranges are checked by `validate`.

use craftrec_core::{
    CraftType, Festival, ItemId, PriceRange, RecommendationType, Region, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const MAX_ITEM_LIMIT: usize = 20;
pub const MAX_USER_LIMIT: usize = 30;
pub const MAX_SEASONAL_LIMIT: usize = 30;
pub const MAX_BATCH_ITEMS: usize = 20;

fn default_types() -> Vec<RecommendationType> {
    vec![RecommendationType::CulturalSimilarity]
}

fn default_item_limit() -> usize {
    10
}

fn default_threshold() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

fn check_limit(limit: usize, max: usize) -> Result<(), ValidationError> {
    if limit == 0 || limit > max {
        return Err(ValidationError::LimitOutOfRange { max, actual: limit });
    }
    Ok(())
}

fn check_threshold(threshold: f32) -> Result<(), ValidationError> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ValidationError::ThresholdOutOfRange(threshold));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecommendationRequest {
    pub item_id: ItemId,
    #[serde(default = "default_types")]
    pub recommendation_types: Vec<RecommendationType>,
    #[serde(default = "default_item_limit")]
    pub limit: usize,
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f32,
    #[serde(default = "default_true")]
    pub enable_diversity: bool,
    #[serde(default)]
    pub exclude_item_ids: Vec<ItemId>,
    /// Recompute the source item's cultural context even if one is stored
    #[serde(default)]
    pub force_refresh: bool,
}

impl ItemRecommendationRequest {
    pub fn new(item_id: impl Into<ItemId>) -> Self {
        Self {
            item_id: item_id.into(),
            recommendation_types: default_types(),
            limit: default_item_limit(),
            similarity_threshold: default_threshold(),
            enable_diversity: true,
            exclude_item_ids: Vec::new(),
            force_refresh: false,
        }
    }

    #[must_use]
    pub fn with_types(mut self, types: Vec<RecommendationType>) -> Self {
        self.recommendation_types = types;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_diversity(mut self, enabled: bool) -> Self {
        self.enable_diversity = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.item_id.is_empty() {
            return Err(ValidationError::EmptyItemId);
        }
        if self.recommendation_types.is_empty() {
            return Err(ValidationError::NoRecommendationTypes);
        }
        check_limit(self.limit, MAX_ITEM_LIMIT)?;
        check_threshold(self.similarity_threshold)
    }

    /// Requested types without repeats, in request order
    pub fn unique_types(&self) -> Vec<RecommendationType> {
        let mut seen = BTreeSet::new();
        self.recommendation_types
            .iter()
            .copied()
            .filter(|t| seen.insert(*t))
            .collect()
    }

    /// `rec:{item}:{sorted types}:{limit}`, followed by every other field
    /// that changes the result: threshold, diversity and sorted exclusions
    pub fn cache_key(&self) -> String {
        let tags: BTreeSet<&str> = self.recommendation_types.iter().map(|t| t.as_str()).collect();
        let excluded: BTreeSet<&str> = self.exclude_item_ids.iter().map(|id| id.as_str()).collect();
        format!(
            "rec:{}:{}:{}:{:.4}:{}:{}",
            self.item_id,
            tags.into_iter().collect::<Vec<_>>().join("-"),
            self.limit,
            self.similarity_threshold,
            if self.enable_diversity { "div" } else { "nodiv" },
            excluded.into_iter().collect::<Vec<_>>().join(",")
        )
    }
}

fn default_user_diversity() -> f32 {
    0.3
}

fn default_user_limit() -> usize {
    20
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferenceRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub preferred_craft_types: Vec<CraftType>,
    #[serde(default)]
    pub preferred_regions: Vec<Region>,
    #[serde(default)]
    pub preferred_festivals: Vec<Festival>,
    /// Recent item ids, most recent last
    #[serde(default)]
    pub user_interaction_history: Vec<ItemId>,
    #[serde(default)]
    pub budget_range: Option<PriceRange>,
    #[serde(default = "default_user_diversity")]
    pub diversity_factor: f32,
    #[serde(default = "default_user_limit")]
    pub limit: usize,
}

impl Default for UserPreferenceRequest {
    fn default() -> Self {
        Self {
            user_id: None,
            preferred_craft_types: Vec::new(),
            preferred_regions: Vec::new(),
            preferred_festivals: Vec::new(),
            user_interaction_history: Vec::new(),
            budget_range: None,
            diversity_factor: default_user_diversity(),
            limit: default_user_limit(),
        }
    }
}

impl UserPreferenceRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_limit(self.limit, MAX_USER_LIMIT)?;
        if !(0.0..=1.0).contains(&self.diversity_factor) {
            return Err(ValidationError::DiversityOutOfRange(self.diversity_factor));
        }
        if let Some(range) = &self.budget_range {
            range.validate("budget_range")?;
        }
        Ok(())
    }
}

fn default_seasonal_limit() -> usize {
    15
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalRequest {
    #[serde(default)]
    pub current_festival: Option<Festival>,
    #[serde(default)]
    pub upcoming_festivals: Vec<Festival>,
    #[serde(default)]
    pub region_preference: Option<Region>,
    /// Keep only gift, festival and decorative items
    #[serde(default)]
    pub include_gift_items: bool,
    /// Drop daily-use items
    #[serde(default)]
    pub include_decorative: bool,
    #[serde(default)]
    pub price_range: Option<PriceRange>,
    #[serde(default = "default_seasonal_limit")]
    pub limit: usize,
}

impl Default for SeasonalRequest {
    fn default() -> Self {
        Self {
            current_festival: None,
            upcoming_festivals: Vec::new(),
            region_preference: None,
            include_gift_items: false,
            include_decorative: false,
            price_range: None,
            limit: default_seasonal_limit(),
        }
    }
}

impl SeasonalRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_limit(self.limit, MAX_SEASONAL_LIMIT)?;
        if let Some(range) = &self.price_range {
            range.validate("price_range")?;
        }
        Ok(())
    }

    /// Current and upcoming festivals named by the request
    pub fn requested_festivals(&self) -> BTreeSet<Festival> {
        self.current_festival
            .into_iter()
            .chain(self.upcoming_festivals.iter().copied())
            .collect()
    }
}

fn default_per_item() -> usize {
    5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecommendationRequest {
    pub item_ids: Vec<ItemId>,
    #[serde(default = "default_types")]
    pub recommendation_types: Vec<RecommendationType>,
    #[serde(default = "default_per_item")]
    pub recommendations_per_item: usize,
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f32,
    /// An item recommended for an earlier source is dropped from later ones
    #[serde(default = "default_true")]
    pub enable_cross_item_deduplication: bool,
}

impl BatchRecommendationRequest {
    pub fn new(item_ids: Vec<ItemId>) -> Self {
        Self {
            item_ids,
            recommendation_types: default_types(),
            recommendations_per_item: default_per_item(),
            similarity_threshold: default_threshold(),
            enable_cross_item_deduplication: true,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.item_ids.is_empty() {
            return Err(ValidationError::EmptyBatch);
        }
        if self.item_ids.len() > MAX_BATCH_ITEMS {
            return Err(ValidationError::BatchTooLarge { max: MAX_BATCH_ITEMS, actual: self.item_ids.len() });
        }
        if self.recommendation_types.is_empty() {
            return Err(ValidationError::NoRecommendationTypes);
        }
        check_limit(self.recommendations_per_item, MAX_ITEM_LIMIT)?;
        check_threshold(self.similarity_threshold)
    }

    /// Item request issued for one source of the batch
    pub fn item_request(&self, item_id: &ItemId) -> ItemRecommendationRequest {
        ItemRecommendationRequest {
            item_id: item_id.clone(),
            recommendation_types: self.recommendation_types.clone(),
            limit: self.recommendations_per_item,
            similarity_threshold: self.similarity_threshold,
            enable_diversity: true,
            exclude_item_ids: Vec::new(),
            force_refresh: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_request_defaults() {
        let req: ItemRecommendationRequest = serde_json::from_str(r#"{"item_id": "abc"}"#).unwrap();
        assert_eq!(req, ItemRecommendationRequest::new("abc"));
        req.validate().unwrap();
    }

    #[test]
    fn test_unknown_enum_rejected_at_parse() {
        let parsed: Result<UserPreferenceRequest, _> =
            serde_json::from_str(r#"{"preferred_craft_types": ["origami"]}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_item_request_ranges() {
        assert_eq!(
            ItemRecommendationRequest::new("a").with_limit(21).validate(),
            Err(ValidationError::LimitOutOfRange { max: 20, actual: 21 })
        );
        assert_eq!(
            ItemRecommendationRequest::new("a").with_limit(0).validate(),
            Err(ValidationError::LimitOutOfRange { max: 20, actual: 0 })
        );
        assert_eq!(
            ItemRecommendationRequest::new("a").with_threshold(1.5).validate(),
            Err(ValidationError::ThresholdOutOfRange(1.5))
        );
        assert_eq!(ItemRecommendationRequest::new("").validate(), Err(ValidationError::EmptyItemId));
        assert_eq!(
            ItemRecommendationRequest::new("a").with_types(vec![]).validate(),
            Err(ValidationError::NoRecommendationTypes)
        );
    }

    #[test]
    fn test_cache_key_sorts_types() {
        let a = ItemRecommendationRequest::new("x").with_types(vec![
            RecommendationType::RegionalDiscovery,
            RecommendationType::CulturalSimilarity,
        ]);
        let b = ItemRecommendationRequest::new("x").with_types(vec![
            RecommendationType::CulturalSimilarity,
            RecommendationType::RegionalDiscovery,
            RecommendationType::CulturalSimilarity,
        ]);
        assert_eq!(a.cache_key(), "rec:x:cultural_similarity-regional_discovery:10:0.3000:div:");
        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(b.unique_types().len(), 2);
    }

    #[test]
    fn test_cache_key_covers_result_shaping_fields() {
        let base = ItemRecommendationRequest::new("x");
        let mut excluded = base.clone();
        excluded.exclude_item_ids = vec![ItemId::new("b"), ItemId::new("a")];
        let mut reordered = base.clone();
        reordered.exclude_item_ids = vec![ItemId::new("a"), ItemId::new("b")];

        assert!(excluded.cache_key().ends_with(":div:a,b"));
        assert_eq!(excluded.cache_key(), reordered.cache_key());
        assert_ne!(base.cache_key(), excluded.cache_key());
        assert_ne!(base.cache_key(), base.clone().with_threshold(0.5).cache_key());
        assert_ne!(base.cache_key(), base.clone().with_diversity(false).cache_key());
    }

    #[test]
    fn test_budget_validation() {
        let req = UserPreferenceRequest { budget_range: Some(PriceRange::new(500.0, 100.0)), ..Default::default() };
        assert!(matches!(req.validate(), Err(ValidationError::InvalidBudget { .. })));

        let req = UserPreferenceRequest { diversity_factor: -0.1, ..Default::default() };
        assert_eq!(req.validate(), Err(ValidationError::DiversityOutOfRange(-0.1)));
    }

    #[test]
    fn test_batch_validation() {
        assert_eq!(BatchRecommendationRequest::new(vec![]).validate(), Err(ValidationError::EmptyBatch));
        let ids = (0..21).map(|i| ItemId::new(i.to_string())).collect();
        assert_eq!(
            BatchRecommendationRequest::new(ids).validate(),
            Err(ValidationError::BatchTooLarge { max: 20, actual: 21 })
        );
    }
}
