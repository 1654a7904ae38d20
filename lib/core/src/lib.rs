//! # craftrec Core
//!
//! Core library for the craftrec recommendation engine.
//!
//! This crate provides the shared data model and the seams to the outside world:
//!
//! - [`CulturalContext`] - craft type, region, materials, festivals and significance of an item
//! - [`ItemRecord`] / [`CandidateItem`] - items as stored, and as considered by one request
//! - [`ItemFilter`] - catalog filters applied during scans
//! - [`VectorIndex`], [`DocumentStore`], [`CulturalAnalyzer`], [`KeyValueCache`] - collaborator traits
//!
//! ## Example
//!
//! ```rust
//! use craftrec_core::{CraftType, CulturalContext, ItemRecord, Region};
//!
//! let record = ItemRecord::new("vase-1", "Blue pottery vase", "Hand painted Jaipur blue pottery")
//!     .with_price(450.0)
//!     .with_context(
//!         CulturalContext::new()
//!             .with_craft(CraftType::Pottery)
//!             .with_region(Region::Rajasthan),
//!     );
//! assert_eq!(record.cultural_context.unwrap().summary(), "craft:pottery|region:rajasthan");
//! ```

pub mod collaborators;
pub mod culture;
pub mod error;
pub mod filter;
pub mod item;
pub mod recommendation;
pub mod vector;

pub use collaborators::{
    CulturalAnalyzer, DocumentStore, KeyValueCache, Neighbor, NeighborQuery, ScrollPage, VectorIndex,
};
pub use culture::{
    normalize_tag, ContextOrigin, ContextResolution, CraftType, CulturalContext, CulturalSignificance,
    Festival, Region,
};
pub use error::{Error, Result, ValidationError};
pub use filter::{Filter, FilterCondition, ItemFilter, PriceRange};
pub use item::{CandidateItem, ItemId, ItemPayload, ItemRecord};
pub use recommendation::{parse_recommendation_types, RecommendationType};
pub use vector::Vector;
