//! User cultural profile
//!
//! Built per request from declared preferences and the cultural contexts of
//! recent interactions. History weights are occurrence counts divided by the
//! history length; declared preferences are pinned to 1.0.

use craftrec_core::{CraftType, CulturalContext, Festival, Region};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Materials must appear at least this often in history to count
pub const MIN_MATERIAL_OCCURRENCES: usize = 2;

/// Openness used when there is no history to measure it from
pub const DEFAULT_OPENNESS: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserCulturalProfile {
    pub craft_weights: BTreeMap<CraftType, f32>,
    pub region_weights: BTreeMap<Region, f32>,
    pub festival_weights: BTreeMap<Festival, f32>,
    pub material_weights: BTreeMap<String, f32>,
    /// Breadth of past interests in [0, 1]
    pub cultural_openness: f32,
    pub interaction_count: usize,
}

impl UserCulturalProfile {
    pub fn builder() -> ProfileBuilder {
        ProfileBuilder::default()
    }

    pub fn craft_weight(&self, craft: Option<CraftType>) -> Option<f32> {
        craft.and_then(|c| self.craft_weights.get(&c).copied())
    }

    pub fn region_weight(&self, region: Option<Region>) -> Option<f32> {
        region.and_then(|r| self.region_weights.get(&r).copied())
    }

    /// True when the context brings a craft or region the profile has never seen
    pub fn is_unfamiliar(&self, ctx: &CulturalContext) -> bool {
        let new_craft = ctx.craft_type.map(|c| !self.craft_weights.contains_key(&c)).unwrap_or(false);
        let new_region = ctx.region.map(|r| !self.region_weights.contains_key(&r)).unwrap_or(false);
        new_craft || new_region
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileBuilder {
    crafts: BTreeSet<CraftType>,
    regions: BTreeSet<Region>,
    festivals: BTreeSet<Festival>,
    history: Vec<CulturalContext>,
}

impl ProfileBuilder {
    #[must_use]
    pub fn declared_crafts(mut self, crafts: impl IntoIterator<Item = CraftType>) -> Self {
        self.crafts.extend(crafts);
        self
    }

    #[must_use]
    pub fn declared_regions(mut self, regions: impl IntoIterator<Item = Region>) -> Self {
        self.regions.extend(regions);
        self
    }

    #[must_use]
    pub fn declared_festivals(mut self, festivals: impl IntoIterator<Item = Festival>) -> Self {
        self.festivals.extend(festivals);
        self
    }

    /// Contexts of recent interactions, oldest first
    #[must_use]
    pub fn history(mut self, contexts: impl IntoIterator<Item = CulturalContext>) -> Self {
        self.history.extend(contexts);
        self
    }

    pub fn build(self) -> UserCulturalProfile {
        let mut craft_counts: BTreeMap<CraftType, usize> = BTreeMap::new();
        let mut region_counts: BTreeMap<Region, usize> = BTreeMap::new();
        let mut material_counts: BTreeMap<String, usize> = BTreeMap::new();

        for ctx in &self.history {
            if let Some(craft) = ctx.craft_type {
                *craft_counts.entry(craft).or_default() += 1;
            }
            if let Some(region) = ctx.region {
                *region_counts.entry(region).or_default() += 1;
            }
            for material in &ctx.materials {
                *material_counts.entry(material.clone()).or_default() += 1;
            }
        }

        let total = self.history.len();
        let normalize = |count: usize| count as f32 / total as f32;

        let mut craft_weights: BTreeMap<CraftType, f32> =
            craft_counts.iter().map(|(k, v)| (*k, normalize(*v))).collect();
        let mut region_weights: BTreeMap<Region, f32> =
            region_counts.iter().map(|(k, v)| (*k, normalize(*v))).collect();
        let material_weights: BTreeMap<String, f32> = material_counts
            .into_iter()
            .filter(|(_, count)| *count >= MIN_MATERIAL_OCCURRENCES)
            .map(|(k, v)| (k, normalize(v)))
            .collect();

        let cultural_openness = if total == 0 {
            DEFAULT_OPENNESS
        } else {
            ((craft_counts.len() + region_counts.len()) as f32 / 10.0).min(1.0)
        };

        // Declared preferences win over anything history suggests
        for craft in &self.crafts {
            craft_weights.insert(*craft, 1.0);
        }
        for region in &self.regions {
            region_weights.insert(*region, 1.0);
        }
        let festival_weights = self.festivals.iter().map(|f| (*f, 1.0)).collect();

        UserCulturalProfile {
            craft_weights,
            region_weights,
            festival_weights,
            material_weights,
            cultural_openness,
            interaction_count: total,
        }
    }
}
