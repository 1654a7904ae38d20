use craftrec_core::{Error, Result};
use craftrec_similarity::{OriginWeights, ScoringWeights, DEFAULT_STRICT_CUTOFF};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Longest accepted response cache lifetime (one week)
pub const MAX_CACHE_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Engine tuning, loaded once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lifetime of cached item responses
    pub cache_ttl_secs: u64,
    /// Neighbors retrieved for item-anchored requests
    pub neighbor_count: usize,
    /// Records read per catalog page
    pub scan_batch_size: usize,
    /// Catalog records considered per scan before stopping
    pub max_scan_items: usize,
    /// Analyzer calls allowed per request; the rest use the keyword classifier
    pub analysis_budget: usize,
    /// Recent interactions used to build a user profile
    pub history_window: usize,
    /// Diversity factor applied to item requests with `enable_diversity`
    pub item_diversity_factor: f32,
    pub user_similarity_threshold: f32,
    pub seasonal_similarity_threshold: f32,
    /// Diversity factors below this do not enforce caps
    pub diversity_strict_cutoff: f32,
    pub weights: ScoringWeights,
    pub origin_weights: OriginWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 1800,
            neighbor_count: 50,
            scan_batch_size: 500,
            max_scan_items: 10_000,
            analysis_budget: 100,
            history_window: 10,
            item_diversity_factor: 0.8,
            user_similarity_threshold: 0.1,
            seasonal_similarity_threshold: 0.0,
            diversity_strict_cutoff: DEFAULT_STRICT_CUTOFF,
            weights: ScoringWeights::default(),
            origin_weights: OriginWeights::default(),
        }
    }
}

impl EngineConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Read a JSON config file; missing fields keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let mut config: EngineConfig = serde_json::from_str(&raw)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject unusable values and normalize the scoring weights
    pub fn validate(&mut self) -> Result<()> {
        if self.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(Error::InvalidConfig(format!(
                "cache_ttl_secs must be at most {}, got {}",
                MAX_CACHE_TTL_SECS, self.cache_ttl_secs
            )));
        }
        let positive = [
            ("neighbor_count", self.neighbor_count),
            ("scan_batch_size", self.scan_batch_size),
            ("max_scan_items", self.max_scan_items),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(Error::InvalidConfig(format!("{} must be greater than zero", name)));
            }
        }

        let unit = [
            ("item_diversity_factor", self.item_diversity_factor),
            ("user_similarity_threshold", self.user_similarity_threshold),
            ("seasonal_similarity_threshold", self.seasonal_similarity_threshold),
            ("diversity_strict_cutoff", self.diversity_strict_cutoff),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!("{} must be within [0, 1], got {}", name, value)));
            }
        }

        let o = &self.origin_weights;
        if [o.parsed, o.heuristic, o.default].iter().any(|w| !(0.0..=1.0).contains(w)) {
            return Err(Error::InvalidConfig("origin weights must be within [0, 1]".to_string()));
        }

        self.weights
            .validate_and_normalize()
            .map_err(|e| Error::InvalidConfig(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let mut config = EngineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.cache_ttl(), Duration::from_secs(1800));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"analysis_budget": 5, "weights": {"item": {"vector": 0.6}}}"#).unwrap();
        assert_eq!(config.analysis_budget, 5);
        assert_eq!(config.neighbor_count, 50);
        assert_eq!(config.weights.item.vector, 0.6);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let mut config = EngineConfig { item_diversity_factor: 1.5, ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = EngineConfig { scan_batch_size: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = EngineConfig::default();
        config.weights.item.craft = -1.0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_cache_ttl_is_bounded() {
        let mut config = EngineConfig { cache_ttl_secs: u64::MAX, ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = EngineConfig { cache_ttl_secs: MAX_CACHE_TTL_SECS, ..Default::default() };
        config.validate().unwrap();
    }

    #[test]
    fn test_from_file_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(EngineConfig::from_file(&path), Err(Error::InvalidConfig(_))));
        assert!(matches!(EngineConfig::from_file(dir.path().join("none.json")), Err(Error::Io(_))));
    }
}
