//! Diversity-aware ranking
//!
//! Deduplicates by item id, sorts by overall score and greedily admits items
//! under per-region and per-craft caps of `max(1, floor(limit * (1 - df)))`.
//! The two caps are checked independently; an item over either one is
//! skipped. Below the strictness cutoff the caps are not enforced.

use crate::explain::RecommendationItem;
use ahash::AHashMap;
use craftrec_core::{CraftType, ItemId, Region};
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use tracing::debug;

/// Diversity factors below this keep recall over diversity
pub const DEFAULT_STRICT_CUTOFF: f32 = 0.8;

/// Per-axis admission cap for a list of `limit` items
pub fn cap_for(limit: usize, diversity_factor: f32) -> usize {
    // Absorb f32 rounding so that 10 * (1 - 0.8) floors to 2
    let raw = (limit as f32 * (1.0 - diversity_factor) + 1e-4).floor();
    (raw.max(0.0) as usize).max(1)
}

#[derive(Debug, Clone, Copy)]
pub struct DiversityRanker {
    strict_cutoff: f32,
}

impl Default for DiversityRanker {
    fn default() -> Self {
        Self { strict_cutoff: DEFAULT_STRICT_CUTOFF }
    }
}

impl DiversityRanker {
    pub fn new(strict_cutoff: f32) -> Self {
        Self { strict_cutoff }
    }

    /// Keep one occurrence per id: the higher-scoring one, at the position the id was first seen
    pub fn deduplicate(&self, items: Vec<RecommendationItem>) -> Vec<RecommendationItem> {
        let before = items.len();
        let mut position: AHashMap<ItemId, usize> = AHashMap::with_capacity(items.len());
        let mut kept: Vec<RecommendationItem> = Vec::with_capacity(items.len());

        for item in items {
            match position.get(&item.id) {
                Some(&idx) => {
                    if item.overall_score() > kept[idx].overall_score() {
                        kept[idx] = item;
                    }
                }
                None => {
                    position.insert(item.id.clone(), kept.len());
                    kept.push(item);
                }
            }
        }

        if kept.len() < before {
            debug!(removed = before - kept.len(), "deduplicated recommendations");
        }
        kept
    }

    /// Deduplicate, then sort by descending score. Ties keep input order.
    pub fn rank(&self, items: Vec<RecommendationItem>) -> Vec<RecommendationItem> {
        let mut items = self.deduplicate(items);
        items.sort_by_key(|item| Reverse(OrderedFloat(item.overall_score())));
        items
    }

    pub fn rank_and_diversify(
        &self,
        items: Vec<RecommendationItem>,
        diversity_factor: f32,
        limit: usize,
    ) -> Vec<RecommendationItem> {
        let mut ranked = self.rank(items);
        if diversity_factor <= 0.0 || limit == 0 {
            ranked.truncate(limit);
            return ranked;
        }

        let cap = cap_for(limit, diversity_factor);
        let enforce = diversity_factor >= self.strict_cutoff;
        let mut regions: AHashMap<Region, usize> = AHashMap::new();
        let mut crafts: AHashMap<CraftType, usize> = AHashMap::new();
        let mut admitted = Vec::with_capacity(limit.min(ranked.len()));
        let mut skipped = 0usize;

        for item in ranked {
            if admitted.len() >= limit {
                break;
            }
            let region = item.cultural_context.region;
            let craft = item.cultural_context.craft_type;
            let region_full = region.is_some_and(|r| regions.get(&r).copied().unwrap_or(0) >= cap);
            let craft_full = craft.is_some_and(|c| crafts.get(&c).copied().unwrap_or(0) >= cap);

            if enforce && (region_full || craft_full) {
                skipped += 1;
                continue;
            }
            if let Some(r) = region {
                *regions.entry(r).or_default() += 1;
            }
            if let Some(c) = craft {
                *crafts.entry(c).or_default() += 1;
            }
            admitted.push(item);
        }

        debug!(cap, enforce, admitted = admitted.len(), skipped, "diversity ranking");
        admitted
    }
}
