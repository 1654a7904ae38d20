pub mod cache;
pub mod catalog;
pub mod snapshot;

pub use cache::TtlCache;
pub use catalog::InMemoryCatalog;
pub use snapshot::CatalogSnapshot;
