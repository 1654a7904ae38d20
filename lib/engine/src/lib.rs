//! Recommendation orchestration
//!
//! Wires the collaborators from `craftrec-core` to the scoring and ranking
//! in `craftrec-similarity`:
//!
//! - [`CulturalContextResolver`] resolves an item's context through the
//!   analyzer while the per-request budget lasts, then by keywords
//! - [`CandidateSource`] gathers neighbors or scans the catalog
//! - [`RecommendationStrategy`] implementations score candidates per type
//! - [`RecommendationOrchestrator`] runs requests end to end, with response
//!   caching and [`ServiceStats`]

pub mod analyzer;
pub mod batch;
pub mod calendar;
pub mod candidates;
pub mod config;
pub mod keywords;
pub mod orchestrator;
pub mod request;
pub mod resolver;
pub mod response;
pub mod stats;
pub mod strategy;

pub use analyzer::{ModelBackedAnalyzer, TextModel};
pub use batch::{BatchItemResult, BatchRecommendationResponse, CraftCount, RegionCount};
pub use calendar::{Clock, FixedClock, SeasonalCalendar, SystemClock};
pub use candidates::CandidateSource;
pub use config::EngineConfig;
pub use keywords::KeywordClassifier;
pub use orchestrator::{OrchestratorBuilder, RecommendationOrchestrator, ResponseCache};
pub use request::{
    BatchRecommendationRequest, ItemRecommendationRequest, SeasonalRequest, UserPreferenceRequest,
};
pub use resolver::{AnalysisBudget, CulturalContextResolver};
pub use response::RecommendationResponse;
pub use stats::{ServiceStats, StatsSnapshot};
pub use strategy::{
    CulturalSimilarityStrategy, FestivalSeasonalStrategy, RecommendationStrategy,
    RegionalDiscoveryStrategy, StrategyContext, StrategyRegistry,
};
