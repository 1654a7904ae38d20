//! Collaborator interfaces
//!
//! The recommender reads from a vector index, a document store, a cultural
//! analyzer and a key-value cache. Each is an async trait so the engine can
//! run against remote services or the in-memory implementations in
//! `craftrec-storage`.

use crate::culture::{ContextOrigin, CulturalContext};
use crate::error::Result;
use crate::item::{ItemId, ItemRecord};
use crate::vector::Vector;
use async_trait::async_trait;
use std::time::Duration;

/// Anchor for a nearest-neighbor lookup
#[derive(Debug, Clone, PartialEq)]
pub enum NeighborQuery {
    /// Neighbors of a stored item's own embedding
    Id(ItemId),
    Vector(Vector),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub id: ItemId,
    /// Similarity in [0, 1]
    pub score: f32,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Up to `k` neighbors, best first, never containing an id from `exclude`
    async fn find_neighbors(
        &self,
        query: &NeighborQuery,
        k: usize,
        exclude: &[ItemId],
    ) -> Result<Vec<Neighbor>>;
}

/// One page of a catalog scan
#[derive(Debug, Clone, Default)]
pub struct ScrollPage {
    pub records: Vec<ItemRecord>,
    /// Resume point for the next page; `None` once the store is exhausted
    pub next_cursor: Option<ItemId>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Records for the ids that exist, in the order requested
    async fn get_by_ids(&self, ids: &[ItemId]) -> Result<Vec<ItemRecord>>;

    /// Records strictly after `after` in the store's stable order
    async fn scroll(&self, after: Option<&ItemId>, limit: usize) -> Result<ScrollPage>;

    /// Persist a computed context with the item
    async fn attach_context(
        &self,
        id: &ItemId,
        context: &CulturalContext,
        origin: ContextOrigin,
    ) -> Result<()>;
}

#[async_trait]
pub trait CulturalAnalyzer: Send + Sync {
    async fn analyze(&self, title: &str, description: &str) -> Result<CulturalContext>;
}

#[async_trait]
pub trait KeyValueCache<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<V>>;

    /// Last writer wins
    async fn set(&self, key: &str, value: V, ttl: Duration) -> Result<()>;

    /// Drop every entry, returning how many were held
    async fn clear(&self) -> Result<usize>;
}
