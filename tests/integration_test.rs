// Integration tests for craftrec
use async_trait::async_trait;
use chrono::NaiveDate;
use craftrec::{
    BatchRecommendationRequest, ContextOrigin, CraftType, CulturalAnalyzer, CulturalContext,
    CulturalSignificance, EngineConfig, Error, Festival, InMemoryCatalog, ItemId,
    ItemRecommendationRequest, ItemRecord, OrchestratorBuilder, PriceRange, RecommendationItem,
    RecommendationOrchestrator, RecommendationResponse, RecommendationType, Region, Result,
    SeasonalRequest, TtlCache, UserPreferenceRequest, Vector,
};
use craftrec_engine::{FixedClock, RecommendationStrategy, SeasonalCalendar, StrategyContext};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct Offline;

#[async_trait]
impl CulturalAnalyzer for Offline {
    async fn analyze(&self, _title: &str, _description: &str) -> Result<CulturalContext> {
        Err(Error::Upstream("offline".to_string()))
    }
}

#[derive(Default)]
struct CountingAnalyzer {
    calls: AtomicUsize,
}

#[async_trait]
impl CulturalAnalyzer for CountingAnalyzer {
    async fn analyze(&self, _title: &str, _description: &str) -> Result<CulturalContext> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(CulturalContext::new().with_craft(CraftType::Woodwork).with_region(Region::Karnataka))
    }
}

struct FailingStrategy(RecommendationType);

#[async_trait]
impl RecommendationStrategy for FailingStrategy {
    fn kind(&self) -> RecommendationType {
        self.0
    }

    async fn recommend(&self, _ctx: &StrategyContext<'_>) -> Result<Vec<RecommendationItem>> {
        Err(Error::Scoring("scoring backend unavailable".to_string()))
    }
}

struct SlowStrategy;

#[async_trait]
impl RecommendationStrategy for SlowStrategy {
    fn kind(&self) -> RecommendationType {
        RecommendationType::CulturalSimilarity
    }

    async fn recommend(&self, _ctx: &StrategyContext<'_>) -> Result<Vec<RecommendationItem>> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(Vec::new())
    }
}

fn ctx(craft: CraftType, region: Region) -> CulturalContext {
    CulturalContext::new().with_craft(craft).with_region(region)
}

fn item(id: &str, vector: [f32; 2], context: CulturalContext) -> ItemRecord {
    ItemRecord::new(id, id, &format!("handmade {}", id))
        .with_vector(Vector::new(vector.to_vec()))
        .with_context(context)
}

fn quiet_calendar() -> SeasonalCalendar {
    SeasonalCalendar::new(Box::new(FixedClock(NaiveDate::from_ymd_opt(2026, 6, 15).unwrap())))
}

fn engine_with(
    catalog: Arc<InMemoryCatalog>,
    analyzer: Arc<dyn CulturalAnalyzer>,
    config: EngineConfig,
    strategies: Vec<Arc<dyn RecommendationStrategy>>,
) -> RecommendationOrchestrator {
    let mut builder = OrchestratorBuilder::new(
        catalog.clone(),
        catalog,
        analyzer,
        Arc::new(TtlCache::<RecommendationResponse>::new()),
    )
    .config(config)
    .calendar(quiet_calendar());
    for strategy in strategies {
        builder = builder.strategy(strategy);
    }
    builder.build().unwrap()
}

fn engine(catalog: Arc<InMemoryCatalog>) -> RecommendationOrchestrator {
    engine_with(catalog, Arc::new(Offline), EngineConfig::default(), Vec::new())
}

fn ids(response: &RecommendationResponse) -> Vec<String> {
    response.recommendations.iter().map(|r| r.id.to_string()).collect()
}

fn pottery_catalog() -> Arc<InMemoryCatalog> {
    Arc::new(InMemoryCatalog::from_records(vec![
        item("source", [1.0, 0.0], ctx(CraftType::Pottery, Region::Rajasthan)),
        item("match", [0.8, 0.6], ctx(CraftType::Pottery, Region::Rajasthan)),
        item("mismatch", [0.8, 0.6], ctx(CraftType::Leather, Region::Kerala)),
        item("cousin", [0.7, 0.7], ctx(CraftType::Pottery, Region::Gujarat)),
        item("stranger", [0.6, 0.8], ctx(CraftType::Jewelry, Region::Delhi)),
        item("weaver", [0.9, 0.4], ctx(CraftType::Textiles, Region::Punjab)),
    ]))
}

#[tokio::test]
async fn test_shared_craft_and_region_outrank_mismatch() {
    let engine = engine(pottery_catalog());
    let request = ItemRecommendationRequest::new("source")
        .with_threshold(0.0)
        .with_types(vec![RecommendationType::CulturalSimilarity]);
    let response = engine.recommend_for_item(&request).await.unwrap();

    let score = |id: &str| {
        response
            .recommendations
            .iter()
            .find(|r| r.id.as_str() == id)
            .map(|r| r.overall_score())
    };
    let matched = score("match").expect("match recommended");
    let mismatched = score("mismatch").expect("mismatch recommended");
    assert!(matched > mismatched);

    let position = |id: &str| ids(&response).iter().position(|r| r == id).unwrap();
    assert!(position("match") < position("mismatch"));
}

#[tokio::test]
async fn test_empty_candidate_set_is_explained() {
    let engine = engine(pottery_catalog());
    let mut request = ItemRecommendationRequest::new("source");
    request.exclude_item_ids = ["match", "mismatch", "cousin", "stranger", "weaver"]
        .into_iter()
        .map(ItemId::new)
        .collect();

    let response = engine.recommend_for_item(&request).await.unwrap();
    assert_eq!(response.total_recommendations, 0);
    assert_eq!(response.message.as_deref(), Some("No candidate items found"));
}

#[tokio::test]
async fn test_response_never_exceeds_limit() {
    let engine = engine(pottery_catalog());
    for limit in 1..=4 {
        let request = ItemRecommendationRequest::new("source")
            .with_limit(limit)
            .with_threshold(0.0)
            .with_diversity(false);
        let response = engine.recommend_for_item(&request).await.unwrap();
        assert!(response.recommendations.len() <= limit);
        assert_eq!(response.total_recommendations, response.recommendations.len());
    }
}

#[tokio::test]
async fn test_items_from_several_strategies_are_unique() {
    let engine = engine(pottery_catalog());
    let request = ItemRecommendationRequest::new("source")
        .with_threshold(0.0)
        .with_diversity(false)
        .with_types(vec![RecommendationType::CulturalSimilarity, RecommendationType::RegionalDiscovery]);
    let response = engine.recommend_for_item(&request).await.unwrap();

    let unique: HashSet<_> = ids(&response).into_iter().collect();
    assert_eq!(unique.len(), response.recommendations.len());
    assert_eq!(
        response.recommendation_types_used,
        vec![RecommendationType::CulturalSimilarity, RecommendationType::RegionalDiscovery]
    );
}

#[tokio::test]
async fn test_cached_replay_matches_original() {
    let engine = engine(pottery_catalog());
    let request = ItemRecommendationRequest::new("source").with_threshold(0.1);

    let first = engine.recommend_for_item(&request).await.unwrap();
    let second = engine.recommend_for_item(&request).await.unwrap();

    assert_eq!(first.recommendations, second.recommendations);
    assert_eq!(first.recommendation_types_used, second.recommendation_types_used);
    assert_eq!(engine.stats().cache_hits, 1);
}

#[tokio::test]
async fn test_failed_strategy_is_skipped() {
    let engine = engine_with(
        pottery_catalog(),
        Arc::new(Offline),
        EngineConfig::default(),
        vec![Arc::new(FailingStrategy(RecommendationType::RegionalDiscovery))],
    );
    let request = ItemRecommendationRequest::new("source")
        .with_threshold(0.1)
        .with_types(vec![RecommendationType::RegionalDiscovery, RecommendationType::CulturalSimilarity]);
    let response = engine.recommend_for_item(&request).await.unwrap();

    assert_eq!(response.recommendation_types_used, vec![RecommendationType::CulturalSimilarity]);
    assert!(response.total_recommendations > 0);
    assert_eq!(engine.stats().strategy_failures, 1);
}

#[tokio::test]
async fn test_abandoned_request_leaves_no_cache_entry() {
    let engine = engine_with(
        pottery_catalog(),
        Arc::new(Offline),
        EngineConfig::default(),
        vec![Arc::new(SlowStrategy)],
    );
    let request = ItemRecommendationRequest::new("source");
    let outcome = tokio::time::timeout(Duration::from_millis(50), engine.recommend_for_item(&request)).await;

    assert!(outcome.is_err());
    assert_eq!(engine.clear_cache().await, 0);
}

fn textile_catalog() -> Arc<InMemoryCatalog> {
    let gujarat = || ctx(CraftType::Textiles, Region::Gujarat);
    Arc::new(InMemoryCatalog::from_records(vec![
        item("t1", [1.0, 0.0], gujarat()),
        item("t2", [1.0, 0.0], gujarat()),
        item("t3", [1.0, 0.0], gujarat()),
        item("t4", [1.0, 0.0], gujarat()),
        item("t5", [1.0, 0.0], ctx(CraftType::Textiles, Region::Punjab)),
        item("p1", [0.0, 1.0], ctx(CraftType::Pottery, Region::Rajasthan)),
        item("p2", [0.0, 1.0], ctx(CraftType::Pottery, Region::Rajasthan)),
    ]))
}

fn textile_lover() -> UserPreferenceRequest {
    UserPreferenceRequest {
        preferred_craft_types: vec![CraftType::Textiles],
        limit: 10,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_declared_craft_only_returns_that_craft() {
    let engine = engine(textile_catalog());
    let response = engine.recommend_for_user(&textile_lover()).await.unwrap();

    assert!(response.total_recommendations > 0);
    assert_eq!(response.source_item_id, None);
    for rec in &response.recommendations {
        assert_eq!(rec.cultural_context.craft_type, Some(CraftType::Textiles));
        assert!(rec.overall_score() > 0.1);
        assert!(!rec.match_reasons.is_empty());
    }
}

#[tokio::test]
async fn test_strict_diversity_caps_each_region() {
    let engine = engine(textile_catalog());
    let request = UserPreferenceRequest { diversity_factor: 0.9, ..textile_lover() };
    let response = engine.recommend_for_user(&request).await.unwrap();

    let cap = std::cmp::max(1, (10.0f32 * (1.0 - 0.9)).floor() as usize);
    let gujarat = response
        .recommendations
        .iter()
        .filter(|r| r.cultural_context.region == Some(Region::Gujarat))
        .count();
    assert!(gujarat <= cap);
    // Both axes are capped: every item is textiles, so only one fits
    assert_eq!(response.total_recommendations, 1);
}

#[tokio::test]
async fn test_lenient_diversity_bypasses_caps() {
    let engine = engine(textile_catalog());
    let request = UserPreferenceRequest { diversity_factor: 0.5, ..textile_lover() };
    let response = engine.recommend_for_user(&request).await.unwrap();

    let gujarat = response
        .recommendations
        .iter()
        .filter(|r| r.cultural_context.region == Some(Region::Gujarat))
        .count();
    assert_eq!(gujarat, 4);
    assert_eq!(response.total_recommendations, 5);
}

#[tokio::test]
async fn test_ranking_is_deterministic() {
    let engine = engine(textile_catalog());
    let request = UserPreferenceRequest { diversity_factor: 0.0, ..textile_lover() };
    let first = engine.recommend_for_user(&request).await.unwrap();
    let second = engine.recommend_for_user(&request).await.unwrap();
    assert_eq!(ids(&first), ids(&second));
}

#[tokio::test]
async fn test_history_is_not_recommended_back() {
    let engine = engine(textile_catalog());
    let request = UserPreferenceRequest {
        user_interaction_history: vec![ItemId::new("t1"), ItemId::new("t2")],
        diversity_factor: 0.0,
        ..textile_lover()
    };
    let response = engine.recommend_for_user(&request).await.unwrap();
    let returned = ids(&response);
    assert!(!returned.contains(&"t1".to_string()));
    assert!(!returned.contains(&"t2".to_string()));
    assert!(returned.contains(&"t3".to_string()));
}

fn festive_catalog() -> Arc<InMemoryCatalog> {
    let diwali = CulturalContext::new()
        .with_craft(CraftType::Pottery)
        .with_festival(Festival::Diwali)
        .with_significance(CulturalSignificance::FestivalItem);
    let holi = CulturalContext::new().with_craft(CraftType::Textiles).with_festival(Festival::Holi);
    Arc::new(InMemoryCatalog::from_records(vec![
        ItemRecord::new("diya", "Clay diya", "Diwali lamp").with_context(diwali.clone()).with_price(250.0),
        ItemRecord::new("lantern", "Lantern", "Diwali lantern").with_context(diwali.clone()).with_price(900.0),
        ItemRecord::new("rangoli", "Rangoli kit", "Colours").with_context(diwali),
        ItemRecord::new("gulal", "Gulal", "Holi colours").with_context(holi).with_price(300.0),
    ]))
}

#[tokio::test]
async fn test_seasonal_price_range_is_enforced() {
    let engine = engine(festive_catalog());
    let request = SeasonalRequest {
        current_festival: Some(Festival::Diwali),
        price_range: Some(PriceRange::new(100.0, 500.0)),
        ..Default::default()
    };
    let response = engine.recommend_seasonal(&request).await.unwrap();

    assert_eq!(ids(&response), vec!["diya".to_string()]);
    for rec in &response.recommendations {
        let price = rec.payload.price.expect("priced item");
        assert!((100.0..=500.0).contains(&price));
    }
    assert_eq!(response.recommendation_types_used, vec![RecommendationType::FestivalSeasonal]);
    assert!(response.recommendations[0].seasonal_context.is_some());
}

fn diwali_shelf() -> Arc<InMemoryCatalog> {
    let stock = |id: &str, region: Region, significance: Option<CulturalSignificance>| {
        let mut context = CulturalContext::new().with_region(region).with_festival(Festival::Diwali);
        if let Some(significance) = significance {
            context = context.with_significance(significance);
        }
        ItemRecord::new(id, id, "Diwali stock").with_context(context)
    };
    Arc::new(InMemoryCatalog::from_records(vec![
        stock("gift", Region::Rajasthan, Some(CulturalSignificance::GiftItem)),
        stock("lamp", Region::Gujarat, Some(CulturalSignificance::FestivalItem)),
        stock("bowl", Region::Rajasthan, Some(CulturalSignificance::DailyUse)),
        stock("plain", Region::Rajasthan, None),
    ]))
}

async fn seasonal_ids(request: SeasonalRequest) -> HashSet<String> {
    let engine = engine(diwali_shelf());
    let response = engine.recommend_seasonal(&request).await.unwrap();
    ids(&response).into_iter().collect()
}

fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_seasonal_flags_narrow_candidates() {
    let diwali = || SeasonalRequest { current_festival: Some(Festival::Diwali), ..Default::default() };

    assert_eq!(seasonal_ids(diwali()).await, set(&["gift", "lamp", "bowl", "plain"]));

    let regional = SeasonalRequest { region_preference: Some(Region::Rajasthan), ..diwali() };
    assert_eq!(seasonal_ids(regional).await, set(&["gift", "bowl", "plain"]));

    // Unknown significance is not a gift
    let gifts = SeasonalRequest { include_gift_items: true, ..diwali() };
    assert_eq!(seasonal_ids(gifts).await, set(&["gift", "lamp"]));

    // Unknown significance is not daily use either
    let decorative = SeasonalRequest { include_decorative: true, ..diwali() };
    assert_eq!(seasonal_ids(decorative).await, set(&["gift", "lamp", "plain"]));

    let combined = SeasonalRequest {
        region_preference: Some(Region::Rajasthan),
        include_gift_items: true,
        include_decorative: true,
        ..diwali()
    };
    assert_eq!(seasonal_ids(combined).await, set(&["gift"]));
}

#[tokio::test]
async fn test_seasonal_uses_calendar_when_no_festival_named() {
    let catalog = festive_catalog();
    let engine = OrchestratorBuilder::new(
        catalog.clone(),
        catalog,
        Arc::new(Offline),
        Arc::new(TtlCache::<RecommendationResponse>::new()),
    )
    .calendar(SeasonalCalendar::new(Box::new(FixedClock(NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()))))
    .build()
    .unwrap();

    let response = engine.recommend_seasonal(&SeasonalRequest::default()).await.unwrap();
    assert_eq!(ids(&response), vec!["gulal".to_string()]);
}

#[tokio::test]
async fn test_batch_deduplicates_across_sources() {
    let catalog = Arc::new(InMemoryCatalog::from_records(vec![
        item("a", [1.0, 0.0], ctx(CraftType::Pottery, Region::Rajasthan)),
        item("b", [0.95, 0.05], ctx(CraftType::Pottery, Region::Rajasthan)),
        item("c", [0.9, 0.1], ctx(CraftType::Textiles, Region::Gujarat)),
        item("d", [0.85, 0.15], ctx(CraftType::Leather, Region::Punjab)),
        item("e", [0.8, 0.2], ctx(CraftType::Jewelry, Region::Delhi)),
    ]));
    let engine = engine(catalog);
    let mut request = BatchRecommendationRequest::new(vec![ItemId::new("a"), ItemId::new("b"), ItemId::new("missing")]);
    request.similarity_threshold = 0.1;

    let response = engine.recommend_batch(&request).await.unwrap();
    assert_eq!(response.total_items_processed, 3);
    assert_eq!(response.failed, 1);
    assert_eq!(response.successful, 2);

    let mut seen = HashSet::new();
    for result in &response.results {
        for rec in &result.response.recommendations {
            assert!(seen.insert(rec.id.clone()), "{} recommended twice", rec.id);
        }
    }
    assert!(response.diversity_across_batch > 0.0);
    assert!(response.most_common_regions.len() <= 5);
}

#[tokio::test]
async fn test_analysis_budget_bounds_analyzer_calls() {
    let records = (0..6).map(|i| {
        ItemRecord::new(format!("w{}", i), "Carved box", "Sandalwood carving")
            .with_vector(Vector::new(vec![1.0, i as f32 * 0.1]))
    });
    let catalog = Arc::new(InMemoryCatalog::from_records(records));
    let analyzer = Arc::new(CountingAnalyzer::default());
    let config = EngineConfig { analysis_budget: 2, ..Default::default() };
    let engine = engine_with(catalog, analyzer.clone(), config, Vec::new());

    engine.recommend_for_item(&ItemRecommendationRequest::new("w0")).await.unwrap();

    assert_eq!(analyzer.calls.load(Ordering::SeqCst), 2);
    let stats = engine.stats();
    assert_eq!(stats.analyses_performed, 6);
    assert_eq!(stats.fallbacks_used, 4);
}

#[tokio::test]
async fn test_resolved_contexts_survive_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    let seed = InMemoryCatalog::from_records(vec![
        ItemRecord::new("vase", "Blue pottery vase", "Jaipur ceramic").with_vector(Vector::new(vec![1.0, 0.0])),
        ItemRecord::new("bowl", "Terracotta bowl", "Clay from Jaipur").with_vector(Vector::new(vec![0.9, 0.1])),
    ]);
    seed.save_snapshot(&path).unwrap();

    let catalog = Arc::new(InMemoryCatalog::load_snapshot(&path).unwrap());
    let engine = engine(catalog.clone());
    engine.recommend_for_item(&ItemRecommendationRequest::new("vase")).await.unwrap();
    catalog.save_snapshot(&path).unwrap();

    let reloaded = InMemoryCatalog::load_snapshot(&path).unwrap();
    let vase = reloaded.get(&ItemId::new("vase")).unwrap();
    assert_eq!(vase.context_origin, ContextOrigin::Heuristic);
    let context = vase.cultural_context.unwrap();
    assert_eq!(context.craft_type, Some(CraftType::Pottery));
    assert_eq!(context.region, Some(Region::Rajasthan));
    assert!(reloaded.get(&ItemId::new("bowl")).unwrap().cultural_context.is_some());
}

#[tokio::test]
async fn test_invalid_requests_are_rejected_before_work() {
    let engine = engine(pottery_catalog());
    let bad_limit = ItemRecommendationRequest::new("source").with_limit(0);
    assert!(matches!(engine.recommend_for_item(&bad_limit).await, Err(Error::Validation(_))));

    let bad_budget = UserPreferenceRequest {
        budget_range: Some(PriceRange::new(900.0, 100.0)),
        ..Default::default()
    };
    assert!(matches!(engine.recommend_for_user(&bad_budget).await, Err(Error::Validation(_))));
    assert_eq!(engine.stats().failed_requests, 2);
}
