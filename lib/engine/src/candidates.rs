//! Candidate Source
//!
//! Builds the bounded candidate set for one request, either from the vector
//! index around a source item or by paging through the whole catalog. Both
//! modes log collaborator failures and return what they have.

use crate::config::EngineConfig;
use crate::resolver::{AnalysisBudget, CulturalContextResolver};
use ahash::{AHashMap, AHashSet};
use craftrec_core::{
    CandidateItem, DocumentStore, Filter, ItemFilter, ItemId, ItemRecord, NeighborQuery,
    PriceRange, VectorIndex,
};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct CandidateSource {
    store: Arc<dyn DocumentStore>,
    index: Arc<dyn VectorIndex>,
    resolver: Arc<CulturalContextResolver>,
    neighbor_count: usize,
    batch_size: usize,
    max_scan_items: usize,
}

impl CandidateSource {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        index: Arc<dyn VectorIndex>,
        resolver: Arc<CulturalContextResolver>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            store,
            index,
            resolver,
            neighbor_count: config.neighbor_count,
            batch_size: config.scan_batch_size,
            max_scan_items: config.max_scan_items,
        }
    }

    /// Nearest neighbors of `source`, enriched with cultural context, best first
    pub async fn neighbors(
        &self,
        source: &ItemId,
        exclude: &[ItemId],
        budget: &AnalysisBudget,
    ) -> Vec<CandidateItem> {
        let mut excluded = exclude.to_vec();
        excluded.push(source.clone());

        let query = NeighborQuery::Id(source.clone());
        let neighbors = match self.index.find_neighbors(&query, self.neighbor_count, &excluded).await {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, source = %source, "neighbor search failed");
                return Vec::new();
            }
        };
        if neighbors.is_empty() {
            return Vec::new();
        }

        let ids: Vec<ItemId> = neighbors.iter().map(|n| n.id.clone()).collect();
        let records = match self.store.get_by_ids(&ids).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, source = %source, "failed to fetch neighbor records");
                return Vec::new();
            }
        };

        let mut by_id: AHashMap<ItemId, ItemRecord> =
            records.into_iter().map(|r| (r.id.clone(), r)).collect();
        let mut candidates = Vec::with_capacity(neighbors.len());
        for neighbor in neighbors {
            let Some(record) = by_id.remove(&neighbor.id) else {
                continue;
            };
            if record.is_blank() {
                continue;
            }
            let resolution = self.resolver.resolve_record(&record, budget, false).await;
            candidates.push(CandidateItem::from_record(record, resolution, Some(neighbor.score)));
        }

        debug!(source = %source, candidates = candidates.len(), "neighbor candidates");
        candidates
    }

    /// Page through the catalog, keeping records that pass `filter`.
    /// The price range is checked before context resolution.
    pub async fn scan(
        &self,
        filter: &ItemFilter,
        price: Option<&PriceRange>,
        exclude: &[ItemId],
        budget: &AnalysisBudget,
    ) -> Vec<CandidateItem> {
        let excluded: AHashSet<&ItemId> = exclude.iter().collect();
        let mut candidates = Vec::new();
        let mut cursor: Option<ItemId> = None;
        let mut considered = 0usize;

        while considered < self.max_scan_items {
            let limit = self.batch_size.min(self.max_scan_items - considered);
            let page = match self.store.scroll(cursor.as_ref(), limit).await {
                Ok(p) => p,
                Err(e) => {
                    warn!(error = %e, considered, "catalog scan failed");
                    break;
                }
            };
            considered += page.records.len();

            for record in page.records {
                if excluded.contains(&record.id) || record.is_blank() {
                    continue;
                }
                if price.is_some_and(|range| !range.contains(record.payload.price)) {
                    continue;
                }
                let resolution = self.resolver.resolve_record(&record, budget, false).await;
                let candidate = CandidateItem::from_record(record, resolution, None);
                if filter.matches(&candidate) {
                    candidates.push(candidate);
                }
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        debug!(considered, candidates = candidates.len(), "catalog scan finished");
        candidates
    }
}
