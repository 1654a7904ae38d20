use crate::snapshot::CatalogSnapshot;
use async_trait::async_trait;
use craftrec_core::{
    ContextOrigin, CulturalContext, DocumentStore, Error, ItemId, ItemRecord, Neighbor,
    NeighborQuery, Result, ScrollPage, Vector, VectorIndex,
};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::Path;
use tracing::{debug, info};

/// Item catalog held in memory, ordered by id.
///
/// Serves as both the document store and a brute-force vector index. Scans
/// resume from the last id returned, so no lock is held between pages.
pub struct InMemoryCatalog {
    items: RwLock<BTreeMap<ItemId, ItemRecord>>,
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self { items: RwLock::new(BTreeMap::new()) }
    }

    pub fn from_records(records: impl IntoIterator<Item = ItemRecord>) -> Self {
        let catalog = Self::new();
        for record in records {
            catalog.insert(record);
        }
        catalog
    }

    /// Insert or replace a record
    pub fn insert(&self, record: ItemRecord) {
        self.items.write().insert(record.id.clone(), record);
    }

    pub fn get(&self, id: &ItemId) -> Option<ItemRecord> {
        self.items.read().get(id).cloned()
    }

    /// Every record, in id order
    pub fn records(&self) -> Vec<ItemRecord> {
        self.items.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn load_snapshot<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let snapshot = CatalogSnapshot::load(&path)?;
        info!(items = snapshot.items.len(), path = %path.as_ref().display(), "loaded catalog");
        Ok(Self::from_records(snapshot.items))
    }

    /// Save every record, including contexts attached since load
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<usize> {
        let items: Vec<ItemRecord> = self.items.read().values().cloned().collect();
        let count = items.len();
        CatalogSnapshot::new(items).save(&path)?;
        info!(items = count, path = %path.as_ref().display(), "saved catalog");
        Ok(count)
    }

    fn query_vector(&self, query: &NeighborQuery) -> Result<Option<Vector>> {
        match query {
            NeighborQuery::Vector(v) => Ok(Some(v.clone())),
            NeighborQuery::Id(id) => self
                .items
                .read()
                .get(id)
                .map(|record| record.vector.clone())
                .ok_or_else(|| Error::NotFound(id.to_string())),
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryCatalog {
    async fn get_by_ids(&self, ids: &[ItemId]) -> Result<Vec<ItemRecord>> {
        let items = self.items.read();
        Ok(ids.iter().filter_map(|id| items.get(id).cloned()).collect())
    }

    async fn scroll(&self, after: Option<&ItemId>, limit: usize) -> Result<ScrollPage> {
        let items = self.items.read();
        let lower = match after {
            Some(id) => Bound::Excluded(id),
            None => Bound::Unbounded,
        };

        let mut range = items.range::<ItemId, _>((lower, Bound::Unbounded));
        let records: Vec<ItemRecord> = range.by_ref().take(limit).map(|(_, r)| r.clone()).collect();
        let next_cursor = if range.next().is_some() {
            records.last().map(|r| r.id.clone())
        } else {
            None
        };

        Ok(ScrollPage { records, next_cursor })
    }

    async fn attach_context(
        &self,
        id: &ItemId,
        context: &CulturalContext,
        origin: ContextOrigin,
    ) -> Result<()> {
        let mut items = self.items.write();
        let record = items.get_mut(id).ok_or_else(|| Error::NotFound(id.to_string()))?;
        record.cultural_context = Some(context.clone());
        record.context_origin = origin;
        debug!(item = %id, origin = ?origin, "attached cultural context");
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for InMemoryCatalog {
    async fn find_neighbors(
        &self,
        query: &NeighborQuery,
        k: usize,
        exclude: &[ItemId],
    ) -> Result<Vec<Neighbor>> {
        let Some(anchor) = self.query_vector(query)? else {
            return Ok(Vec::new());
        };
        let anchor_id = match query {
            NeighborQuery::Id(id) => Some(id),
            NeighborQuery::Vector(_) => None,
        };

        let items = self.items.read();
        let mut neighbors: Vec<Neighbor> = items
            .values()
            .filter(|r| Some(&r.id) != anchor_id && !exclude.contains(&r.id))
            .filter_map(|r| {
                r.vector.as_ref().map(|v| Neighbor { id: r.id.clone(), score: anchor.unit_similarity(v) })
            })
            .collect();

        neighbors.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        neighbors.truncate(k);
        Ok(neighbors)
    }
}
