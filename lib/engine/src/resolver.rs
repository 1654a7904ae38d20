//! Cultural Context Resolver
//!
//! Turns an item's title and description into a [`ContextResolution`]. The
//! analyzer is consulted while the request's analysis budget lasts; after
//! that, or when the analyzer fails, the keyword classifier answers. The
//! resolver never returns an error.

use crate::keywords::KeywordClassifier;
use crate::stats::ServiceStats;
use craftrec_core::{ContextResolution, CulturalAnalyzer, DocumentStore, ItemRecord};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Analyzer calls one request may still issue
#[derive(Debug)]
pub struct AnalysisBudget {
    remaining: AtomicUsize,
}

impl AnalysisBudget {
    pub fn new(limit: usize) -> Self {
        Self { remaining: AtomicUsize::new(limit) }
    }

    /// Claim one analyzer call; false once the budget is spent
    pub fn try_take(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok()
    }

    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Relaxed)
    }
}

pub struct CulturalContextResolver {
    analyzer: Arc<dyn CulturalAnalyzer>,
    store: Arc<dyn DocumentStore>,
    classifier: KeywordClassifier,
    stats: Arc<ServiceStats>,
}

impl CulturalContextResolver {
    pub fn new(
        analyzer: Arc<dyn CulturalAnalyzer>,
        store: Arc<dyn DocumentStore>,
        stats: Arc<ServiceStats>,
    ) -> Self {
        Self {
            analyzer,
            store,
            classifier: KeywordClassifier::new(),
            stats,
        }
    }

    /// Keyword classification only
    pub fn classify(&self, title: &str, description: &str) -> ContextResolution {
        match self.classifier.classify(title, description) {
            Some(ctx) => ContextResolution::HeuristicFallback(ctx),
            None => ContextResolution::Default,
        }
    }

    pub async fn resolve(
        &self,
        title: &str,
        description: &str,
        budget: &AnalysisBudget,
    ) -> ContextResolution {
        let resolution = if budget.try_take() {
            match self.analyzer.analyze(title, description).await {
                Ok(ctx) if !ctx.is_empty() => ContextResolution::Parsed(ctx),
                Ok(_) => {
                    debug!(title, "analyzer returned no signal, using keywords");
                    self.classify(title, description)
                }
                Err(e) => {
                    warn!(error = %e, title, "cultural analysis failed, using keywords");
                    self.classify(title, description)
                }
            }
        } else {
            debug!(title, "analysis budget spent, using keywords");
            self.classify(title, description)
        };

        self.stats.record_analysis();
        if !matches!(resolution, ContextResolution::Parsed(_)) {
            self.stats.record_fallback();
        }
        resolution
    }

    /// Context for a stored record, computed and attached only when missing
    /// or when `force_refresh` is set
    pub async fn resolve_record(
        &self,
        record: &ItemRecord,
        budget: &AnalysisBudget,
        force_refresh: bool,
    ) -> ContextResolution {
        if !force_refresh {
            if let Some(stored) = record.stored_resolution() {
                return stored;
            }
        }

        let resolution = self.resolve(&record.title, record.display_text(), budget).await;
        let (ctx, origin) = resolution.clone().into_parts();
        if let Err(e) = self.store.attach_context(&record.id, &ctx, origin).await {
            warn!(error = %e, item = %record.id, "failed to attach cultural context");
        }
        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use craftrec_core::{CraftType, CulturalContext, Error, ItemId, Region, Result};
    use craftrec_storage::InMemoryCatalog;
    use std::sync::atomic::AtomicU64;

    #[derive(Default)]
    struct CountingAnalyzer {
        calls: AtomicU64,
        fail: bool,
    }

    #[async_trait]
    impl CulturalAnalyzer for CountingAnalyzer {
        async fn analyze(&self, _title: &str, _description: &str) -> Result<CulturalContext> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            if self.fail {
                return Err(Error::Upstream("model offline".to_string()));
            }
            Ok(CulturalContext::new().with_craft(CraftType::Jewelry).with_region(Region::Delhi))
        }
    }

    fn resolver(analyzer: Arc<CountingAnalyzer>, store: Arc<InMemoryCatalog>) -> CulturalContextResolver {
        CulturalContextResolver::new(analyzer, store, Arc::new(ServiceStats::new()))
    }

    #[test]
    fn test_budget_is_bounded() {
        let budget = AnalysisBudget::new(2);
        assert!(budget.try_take());
        assert!(budget.try_take());
        assert!(!budget.try_take());
        assert_eq!(budget.remaining(), 0);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_uses_keywords() {
        let analyzer = Arc::new(CountingAnalyzer::default());
        let resolver = resolver(analyzer.clone(), Arc::new(InMemoryCatalog::new()));
        let budget = AnalysisBudget::new(1);

        let first = resolver.resolve("Terracotta pot", "", &budget).await;
        let second = resolver.resolve("Terracotta pot", "", &budget).await;

        assert!(matches!(first, ContextResolution::Parsed(_)));
        match second {
            ContextResolution::HeuristicFallback(ctx) => assert_eq!(ctx.craft_type, Some(CraftType::Pottery)),
            other => panic!("expected heuristic fallback, got {:?}", other),
        }
        assert_eq!(analyzer.calls.load(Ordering::Relaxed), 1);

        let snapshot = resolver.stats.snapshot();
        assert_eq!(snapshot.analyses_performed, 2);
        assert_eq!(snapshot.fallbacks_used, 1);
    }

    #[tokio::test]
    async fn test_analyzer_failure_degrades() {
        let analyzer = Arc::new(CountingAnalyzer { fail: true, ..Default::default() });
        let resolver = resolver(analyzer, Arc::new(InMemoryCatalog::new()));
        let budget = AnalysisBudget::new(10);

        let resolution = resolver.resolve("Mystery object", "no hints", &budget).await;
        assert_eq!(resolution, ContextResolution::Default);
    }

    #[tokio::test]
    async fn test_record_context_is_attached_once() {
        let store = Arc::new(InMemoryCatalog::new());
        store.insert(ItemRecord::new("a", "Silver necklace", "Handmade"));
        let analyzer = Arc::new(CountingAnalyzer::default());
        let resolver = resolver(analyzer.clone(), store.clone());
        let budget = AnalysisBudget::new(10);

        let record = store.get(&ItemId::new("a")).unwrap();
        resolver.resolve_record(&record, &budget, false).await;

        let stored = store.get(&ItemId::new("a")).unwrap();
        assert!(stored.cultural_context.is_some());
        resolver.resolve_record(&stored, &budget, false).await;
        assert_eq!(analyzer.calls.load(Ordering::Relaxed), 1);

        resolver.resolve_record(&stored, &budget, true).await;
        assert_eq!(analyzer.calls.load(Ordering::Relaxed), 2);
    }
}
