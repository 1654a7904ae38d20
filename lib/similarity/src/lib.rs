//! # craftrec Similarity
//!
//! Multi-signal scoring and diversity-aware ranking for cultural recommendations.
//!
//! ## Features
//!
//! - **Scoring Weights**: fixed point allocations per scoring mode, validated and normalized
//! - **Similarity Scorer**: craft, region, festival and material overlap plus vector similarity
//! - **User Profiles**: preference weights built from declared interests and recent history
//! - **Diversity Ranker**: deduplication, stable ranking and per-region/per-craft caps
//! - **Explainability**: score breakdowns, match reasons and confidence
//!
//! ## Example
//!
//! ```rust
//! use craftrec_core::{CandidateItem, ContextOrigin, CraftType, CulturalContext, ItemId, ItemPayload, Region};
//! use craftrec_similarity::{Reference, Scorer};
//!
//! let source = CulturalContext::new().with_craft(CraftType::Pottery).with_region(Region::Rajasthan);
//! let candidate = CandidateItem {
//!     id: ItemId::new("vase-2"),
//!     text: "Terracotta vase from Jaipur".to_string(),
//!     payload: ItemPayload::default(),
//!     cultural_context: source.clone(),
//!     context_origin: ContextOrigin::Parsed,
//!     vector_similarity: Some(0.9),
//! };
//!
//! let result = Scorer::default().score(Reference::Item(&source), &candidate);
//! assert!(result.overall_score > 0.8);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Weights   │────>│   Scorer    │<────│   Profile   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │
//!                     ┌─────────────┐
//!                     │  Diversity  │
//!                     │   Ranker    │
//!                     └─────────────┘
//!                            │
//!                     ┌─────────────┐
//!                     │   Explain   │
//!                     └─────────────┘
//! ```

pub mod distance;
pub mod diversity;
pub mod explain;
pub mod profile;
pub mod scorer;
pub mod weights;

pub use diversity::{cap_for, DiversityRanker, DEFAULT_STRICT_CUTOFF};
pub use explain::{confidence, DiversityStats, OriginWeights, RecommendationItem, ScoreBreakdown};
pub use profile::{ProfileBuilder, UserCulturalProfile};
pub use scorer::{accept, Reference, ScoreError, Scorer, SimilarityResult};
pub use weights::{
    ItemWeights, ProfileWeights, RegionalWeights, ScoringWeights, SeasonalWeights, WeightError,
};
