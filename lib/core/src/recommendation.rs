use crate::error::ValidationError;
use crate::culture::normalize_tag;
use serde::{Deserialize, Serialize};

/// Recommendation strategy tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    CulturalSimilarity,
    RegionalDiscovery,
    FestivalSeasonal,
}

impl RecommendationType {
    pub const ALL: &'static [RecommendationType] = &[
        RecommendationType::CulturalSimilarity,
        RecommendationType::RegionalDiscovery,
        RecommendationType::FestivalSeasonal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationType::CulturalSimilarity => "cultural_similarity",
            RecommendationType::RegionalDiscovery => "regional_discovery",
            RecommendationType::FestivalSeasonal => "festival_seasonal",
        }
    }
}

impl std::fmt::Display for RecommendationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecommendationType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = normalize_tag(s);
        RecommendationType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == tag)
            .ok_or_else(|| ValidationError::UnknownVariant {
                kind: "recommendation type",
                value: s.to_string(),
            })
    }
}

/// Parse a comma-separated list, as query strings carry it
pub fn parse_recommendation_types(list: &str) -> Result<Vec<RecommendationType>, ValidationError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}
