//! Scoring weights
//!
//! Fixed point allocations for each scoring mode. Item, regional and seasonal
//! groups are normalized to sum to 1.0; the profile group is a point scheme
//! where each matching signal adds its share.

use serde::{Deserialize, Serialize};

/// Item-to-item similarity weights
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ItemWeights {
    pub craft: f32,
    pub region: f32,
    pub festival: f32,
    pub material: f32,
    pub vector: f32,
}

impl Default for ItemWeights {
    fn default() -> Self {
        Self { craft: 0.35, region: 0.20, festival: 0.10, material: 0.05, vector: 0.30 }
    }
}

impl ItemWeights {
    /// Share of the total carried by the cultural terms
    pub fn cultural_total(&self) -> f32 {
        self.craft + self.region + self.festival + self.material
    }

    fn values_mut(&mut self) -> [&mut f32; 5] {
        [&mut self.craft, &mut self.region, &mut self.festival, &mut self.material, &mut self.vector]
    }
}

/// Weights for discovering the same or related crafts from other regions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegionalWeights {
    pub craft: f32,
    pub new_region: f32,
    pub vector: f32,
    pub material: f32,
}

impl Default for RegionalWeights {
    fn default() -> Self {
        Self { craft: 0.4, new_region: 0.3, vector: 0.2, material: 0.1 }
    }
}

impl RegionalWeights {
    fn values_mut(&mut self) -> [&mut f32; 4] {
        [&mut self.craft, &mut self.new_region, &mut self.vector, &mut self.material]
    }
}

/// Weights for festival and seasonal relevance
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SeasonalWeights {
    /// Fraction of the candidate's festivals that are active
    pub relevance: f32,
    /// Fraction of the active festivals the candidate covers
    pub coverage: f32,
    pub significance: f32,
}

impl Default for SeasonalWeights {
    fn default() -> Self {
        Self { relevance: 0.6, coverage: 0.2, significance: 0.2 }
    }
}

impl SeasonalWeights {
    fn values_mut(&mut self) -> [&mut f32; 3] {
        [&mut self.relevance, &mut self.coverage, &mut self.significance]
    }
}

/// Point allocations for user-profile compatibility
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProfileWeights {
    pub craft: f32,
    pub region: f32,
    /// Added once per matching festival
    pub festival: f32,
    /// Added once per matching material
    pub material: f32,
    /// Openness must exceed this before the exploration bonus applies
    pub openness_gate: f32,
    /// Bonus is `openness * exploration_scale`
    pub exploration_scale: f32,
}

impl Default for ProfileWeights {
    fn default() -> Self {
        Self {
            craft: 0.4,
            region: 0.3,
            festival: 0.2,
            material: 0.1,
            openness_gate: 0.5,
            exploration_scale: 0.1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringWeights {
    pub item: ItemWeights,
    pub regional: RegionalWeights,
    pub seasonal: SeasonalWeights,
    pub profile: ProfileWeights,
}

impl ScoringWeights {
    /// Reject negative or non-finite weights and normalize the summed groups to 1.0
    pub fn validate_and_normalize(&mut self) -> Result<(), WeightError> {
        normalize_group("item", &mut self.item.values_mut())?;
        normalize_group("regional", &mut self.regional.values_mut())?;
        normalize_group("seasonal", &mut self.seasonal.values_mut())?;

        let p = &self.profile;
        for value in [p.craft, p.region, p.festival, p.material, p.exploration_scale] {
            check_weight("profile", value)?;
        }
        if !(0.0..=1.0).contains(&p.openness_gate) {
            return Err(WeightError::OutOfRange { group: "profile", value: p.openness_gate });
        }
        Ok(())
    }
}

fn check_weight(group: &'static str, value: f32) -> Result<(), WeightError> {
    if !value.is_finite() {
        return Err(WeightError::NonFinite(group));
    }
    if value < 0.0 {
        return Err(WeightError::NegativeWeight(group));
    }
    Ok(())
}

fn normalize_group(group: &'static str, values: &mut [&mut f32]) -> Result<(), WeightError> {
    for value in values.iter() {
        check_weight(group, **value)?;
    }

    let sum: f32 = values.iter().map(|v| **v).sum();
    if sum <= 0.0 {
        return Err(WeightError::ZeroTotalWeight(group));
    }

    if (sum - 1.0).abs() > 0.001 {
        for value in values.iter_mut() {
            **value /= sum;
        }
    }
    Ok(())
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum WeightError {
    #[error("{0} weights contain a negative value")]
    NegativeWeight(&'static str),

    #[error("{0} weights contain a non-finite value")]
    NonFinite(&'static str),

    #[error("{0} weights sum to zero")]
    ZeroTotalWeight(&'static str),

    #[error("{group} value {value} is outside [0, 1]")]
    OutOfRange { group: &'static str, value: f32 },
}
