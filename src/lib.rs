//! # craftrec
//!
//! A content-based recommendation engine for handcrafted items. Items are
//! compared on cultural signals (craft type, region, materials, festival
//! relevance) combined with embedding similarity, and ranked lists are
//! diversified across regions and crafts.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! echo '{"item_id": "vase-01", "limit": 5}' | craftrec --catalog catalog.json item
//! craftrec --catalog catalog.json seasonal --request diwali.json
//! ```
//!
//! ### As a library
//!
//! ```rust,no_run
//! use craftrec::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run() -> craftrec::Result<()> {
//! # struct Offline;
//! # #[async_trait::async_trait]
//! # impl CulturalAnalyzer for Offline {
//! #     async fn analyze(&self, _: &str, _: &str) -> craftrec::Result<CulturalContext> {
//! #         Err(Error::Upstream("offline".into()))
//! #     }
//! # }
//! let catalog = Arc::new(InMemoryCatalog::new());
//! catalog.insert(
//!     ItemRecord::new("vase-01", "Blue pottery vase", "Hand-painted in Jaipur")
//!         .with_vector(Vector::new(vec![0.1, 0.9])),
//! );
//!
//! let engine = OrchestratorBuilder::new(
//!     catalog.clone(),
//!     catalog,
//!     Arc::new(Offline),
//!     Arc::new(TtlCache::<RecommendationResponse>::new()),
//! )
//! .build()?;
//!
//! let response = engine
//!     .recommend_for_item(&ItemRecommendationRequest::new("vase-01"))
//!     .await?;
//! println!("{} recommendations", response.total_recommendations);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! - `craftrec-core` - data model, closed enums, filters, collaborator traits
//! - `craftrec-similarity` - scorer, user profiles, diversity ranking
//! - `craftrec-storage` - in-memory catalog, JSON snapshots, TTL cache
//! - `craftrec-engine` - context resolution, candidates, strategies, orchestrator

// Re-export core types
pub use craftrec_core::{
    parse_recommendation_types, CandidateItem, ContextOrigin, ContextResolution, CraftType, CulturalAnalyzer,
    CulturalContext, CulturalSignificance, DocumentStore, Error, Festival, ItemId, ItemPayload,
    ItemRecord, KeyValueCache, PriceRange, RecommendationType, Region, Result, ValidationError,
    Vector, VectorIndex,
};

// Re-export scoring
pub use craftrec_similarity::{
    DiversityRanker, DiversityStats, RecommendationItem, Scorer, ScoringWeights,
    SimilarityResult, UserCulturalProfile,
};

// Re-export storage
pub use craftrec_storage::{CatalogSnapshot, InMemoryCatalog, TtlCache};

// Re-export engine
pub use craftrec_engine::{
    BatchRecommendationRequest, BatchRecommendationResponse, EngineConfig,
    ItemRecommendationRequest, OrchestratorBuilder, RecommendationOrchestrator,
    RecommendationResponse, SeasonalRequest, StatsSnapshot, UserPreferenceRequest,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CraftType, CulturalAnalyzer, CulturalContext, Error, Festival, InMemoryCatalog,
        ItemRecommendationRequest, ItemRecord, OrchestratorBuilder, RecommendationResponse,
        Region, Result, SeasonalRequest, TtlCache, UserPreferenceRequest, Vector,
    };
}
