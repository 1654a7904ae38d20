//! Batch recommendations over several source items

use crate::orchestrator::RecommendationOrchestrator;
use crate::request::BatchRecommendationRequest;
use crate::response::RecommendationResponse;
use ahash::{AHashMap, AHashSet};
use craftrec_core::{CraftType, ItemId, Region, Result};
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

const TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItemResult {
    pub item_id: ItemId,
    pub response: RecommendationResponse,
}

impl BatchItemResult {
    /// An empty response carrying a message means the source could not be served
    pub fn is_failure(&self) -> bool {
        self.response.total_recommendations == 0 && self.response.message.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionCount {
    pub region: Region,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CraftCount {
    pub craft_type: CraftType,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecommendationResponse {
    pub total_items_processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<BatchItemResult>,
    pub processing_time_ms: f64,
    pub most_common_regions: Vec<RegionCount>,
    pub most_common_craft_types: Vec<CraftCount>,
    /// Mean of the unique-region and unique-craft ratios over all recommended items
    pub diversity_across_batch: f32,
}

/// The `n` most frequent keys, ties broken by key order
fn top_counts<K: Copy + Ord + Hash>(keys: impl Iterator<Item = K>, n: usize) -> Vec<(K, usize)> {
    let mut counts: AHashMap<K, usize> = AHashMap::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }
    let mut counts: Vec<(K, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts.truncate(n);
    counts
}

impl RecommendationOrchestrator {
    pub async fn recommend_batch(&self, request: &BatchRecommendationRequest) -> Result<BatchRecommendationResponse> {
        let span = info_span!("batch_request", request_id = %Uuid::new_v4(), items = request.item_ids.len());
        self.batch_flow(request).instrument(span).await
    }

    async fn batch_flow(&self, request: &BatchRecommendationRequest) -> Result<BatchRecommendationResponse> {
        let started = Instant::now();
        if let Err(e) = request.validate() {
            self.stats.record_failed_request();
            return Err(e.into());
        }

        let mut results = Vec::with_capacity(request.item_ids.len());
        let mut seen: AHashSet<ItemId> = AHashSet::new();
        for item_id in &request.item_ids {
            let mut response = match self.recommend_for_item(&request.item_request(item_id)).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(item = %item_id, error = %e, "batch item failed");
                    RecommendationResponse::empty(Some(item_id.clone()), e.to_string())
                }
            };

            if request.enable_cross_item_deduplication {
                let before = response.total_recommendations;
                response.retain_items(|r| !seen.contains(&r.id), &self.config().origin_weights);
                seen.extend(response.recommendations.iter().map(|r| r.id.clone()));
                if response.total_recommendations < before {
                    info!(item = %item_id, removed = before - response.total_recommendations, "cross-item duplicates removed");
                }
            }
            results.push(BatchItemResult { item_id: item_id.clone(), response });
        }

        let failed = results.iter().filter(|r| r.is_failure()).count();
        let all_items: Vec<_> = results.iter().flat_map(|r| r.response.recommendations.iter()).collect();
        let total = all_items.len();

        let regions = top_counts(all_items.iter().filter_map(|i| i.cultural_context.region), TOP_N);
        let crafts = top_counts(all_items.iter().filter_map(|i| i.cultural_context.craft_type), TOP_N);

        let diversity_across_batch = if total == 0 {
            0.0
        } else {
            let unique_regions: AHashSet<_> = all_items.iter().filter_map(|i| i.cultural_context.region).collect();
            let unique_crafts: AHashSet<_> = all_items.iter().filter_map(|i| i.cultural_context.craft_type).collect();
            (unique_regions.len() as f32 / total as f32 + unique_crafts.len() as f32 / total as f32) / 2.0
        };

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        info!(processed = results.len(), failed, recommended = total, "batch finished");

        Ok(BatchRecommendationResponse {
            total_items_processed: results.len(),
            successful: results.len() - failed,
            failed,
            results,
            processing_time_ms: (elapsed_ms * 100.0).round() / 100.0,
            most_common_regions: regions.into_iter().map(|(region, count)| RegionCount { region, count }).collect(),
            most_common_craft_types: crafts
                .into_iter()
                .map(|(craft_type, count)| CraftCount { craft_type, count })
                .collect(),
            diversity_across_batch,
        })
    }
}
