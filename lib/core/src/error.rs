use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Scoring error: {0}")]
    Scoring(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Request-shape problems, rejected before any work begins
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("limit must be between 1 and {max}, got {actual}")]
    LimitOutOfRange { max: usize, actual: usize },

    #[error("similarity_threshold must be within [0.0, 1.0], got {0}")]
    ThresholdOutOfRange(f32),

    #[error("diversity_factor must be within [0.0, 1.0], got {0}")]
    DiversityOutOfRange(f32),

    #[error("invalid {field} range: min {min} > max {max}")]
    InvalidBudget { field: &'static str, min: f64, max: f64 },

    #[error("unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("at least one recommendation type is required")]
    NoRecommendationTypes,

    #[error("item_id must not be empty")]
    EmptyItemId,

    #[error("batch must contain at least one item")]
    EmptyBatch,

    #[error("batch may contain at most {max} items, got {actual}")]
    BatchTooLarge { max: usize, actual: usize },
}
