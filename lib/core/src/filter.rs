// Candidate filters applied while the catalog is scanned
use crate::culture::{CraftType, CulturalSignificance, Festival, Region};
use crate::error::ValidationError;
use crate::item::CandidateItem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub trait Filter {
    fn matches(&self, item: &CandidateItem) -> bool;
}

/// Inclusive price bounds; a missing bound is open
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min: Some(min), max: Some(max) }
    }

    pub fn validate(&self, field: &'static str) -> Result<(), ValidationError> {
        let min = self.min.unwrap_or(0.0);
        let max = self.max.unwrap_or(f64::INFINITY);
        if !min.is_finite() || min < 0.0 || max.is_nan() || min > max {
            return Err(ValidationError::InvalidBudget { field, min, max });
        }
        Ok(())
    }

    /// Items without a price never fall inside a range
    pub fn contains(&self, price: Option<f64>) -> bool {
        match price {
            Some(p) => {
                p >= self.min.unwrap_or(0.0) && p <= self.max.unwrap_or(f64::INFINITY)
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterCondition {
    CraftIn(BTreeSet<CraftType>),
    RegionIn(BTreeSet<Region>),
    /// At least one festival tag in common
    FestivalAny(BTreeSet<Festival>),
    SignificanceIn(BTreeSet<CulturalSignificance>),
    And(Vec<FilterCondition>),
    Not(Box<FilterCondition>),
}

pub struct ItemFilter {
    condition: FilterCondition,
}

impl ItemFilter {
    pub fn new(condition: FilterCondition) -> Self {
        Self { condition }
    }

    /// Conjunction of `conditions`; an empty list matches everything
    pub fn all(conditions: Vec<FilterCondition>) -> Self {
        Self { condition: FilterCondition::And(conditions) }
    }

    fn matches_condition(condition: &FilterCondition, item: &CandidateItem) -> bool {
        let ctx = &item.cultural_context;
        match condition {
            FilterCondition::CraftIn(crafts) => {
                ctx.craft_type.map(|c| crafts.contains(&c)).unwrap_or(false)
            }
            FilterCondition::RegionIn(regions) => {
                ctx.region.map(|r| regions.contains(&r)).unwrap_or(false)
            }
            FilterCondition::FestivalAny(festivals) => {
                ctx.festival_relevance.iter().any(|f| festivals.contains(f))
            }
            FilterCondition::SignificanceIn(kinds) => {
                ctx.cultural_significance.map(|s| kinds.contains(&s)).unwrap_or(false)
            }
            FilterCondition::And(conditions) => {
                conditions.iter().all(|c| Self::matches_condition(c, item))
            }
            FilterCondition::Not(condition) => !Self::matches_condition(condition, item),
        }
    }
}

impl Filter for ItemFilter {
    fn matches(&self, item: &CandidateItem) -> bool {
        Self::matches_condition(&self.condition, item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::culture::{ContextResolution, CulturalContext};
    use crate::item::ItemRecord;

    fn candidate(ctx: CulturalContext, price: Option<f64>) -> CandidateItem {
        let mut record = ItemRecord::new("c1", "title", "text");
        record.payload.price = price;
        CandidateItem::from_record(record, ContextResolution::Parsed(ctx), None)
    }

    #[test]
    fn test_price_range_excludes_missing_price() {
        let range = PriceRange::new(100.0, 500.0);
        assert!(range.contains(Some(100.0)));
        assert!(range.contains(Some(500.0)));
        assert!(!range.contains(Some(99.99)));
        assert!(!range.contains(None));
    }

    #[test]
    fn test_price_range_validation() {
        assert!(PriceRange::new(10.0, 5.0).validate("price_range").is_err());
        assert!(PriceRange::new(-1.0, 5.0).validate("price_range").is_err());
        assert!(PriceRange::default().validate("price_range").is_ok());
    }

    #[test]
    fn test_null_craft_never_matches_craft_filter() {
        let filter = ItemFilter::new(FilterCondition::CraftIn(BTreeSet::from([CraftType::Textiles])));
        assert!(!filter.matches(&candidate(CulturalContext::new(), None)));
        assert!(filter.matches(&candidate(
            CulturalContext::new().with_craft(CraftType::Textiles),
            None
        )));
    }

    #[test]
    fn test_combined_conditions() {
        let filter = ItemFilter::all(vec![
            FilterCondition::FestivalAny(BTreeSet::from([Festival::Diwali])),
            FilterCondition::Not(Box::new(FilterCondition::SignificanceIn(BTreeSet::from([
                CulturalSignificance::DailyUse,
            ])))),
        ]);

        let diya = CulturalContext::new()
            .with_festival(Festival::Diwali)
            .with_significance(CulturalSignificance::FestivalItem);
        assert!(filter.matches(&candidate(diya, Some(120.0))));

        let cup = CulturalContext::new()
            .with_festival(Festival::Diwali)
            .with_significance(CulturalSignificance::DailyUse);
        assert!(!filter.matches(&candidate(cup, Some(50.0))));
    }

    #[test]
    fn test_empty_conjunction_matches() {
        let filter = ItemFilter::all(Vec::new());
        assert!(filter.matches(&candidate(CulturalContext::new(), None)));
    }
}
