//! Multi-signal similarity scorer
//!
//! Scores one candidate against a reference. The reference is either another
//! item's cultural context, a discovery anchor, the set of active festivals,
//! or a user profile. Each mode is a fixed point allocation taken from
//! [`ScoringWeights`]; an unknown signal contributes nothing.

use crate::distance::{exact_match, fraction_in, jaccard, known_difference, shared};
use crate::profile::UserCulturalProfile;
use crate::weights::ScoringWeights;
use craftrec_core::{CandidateItem, CulturalContext, CulturalSignificance, Festival};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Score breakdown for one candidate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub overall_score: f32,
    pub cultural_similarity: f32,
    pub vector_similarity: f32,
    pub seasonal_relevance: f32,
    pub regional_match: f32,
    pub festival_relevance: f32,
    /// Human-readable reasons, strongest signal first
    pub match_reasons: Vec<String>,
}

impl SimilarityResult {
    fn zero(vector_similarity: f32) -> Self {
        Self { vector_similarity, ..Self::default() }
    }
}

/// What a candidate is compared against
#[derive(Debug, Clone, Copy)]
pub enum Reference<'a> {
    /// Item-to-item cultural similarity
    Item(&'a CulturalContext),
    /// Same craft or related tradition from a different region
    Discovery(&'a CulturalContext),
    /// Currently active festivals
    Season(&'a BTreeSet<Festival>),
    /// User preference profile
    Profile(&'a UserCulturalProfile),
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ScoreError {
    #[error("non-finite score for item {0}")]
    NonFinite(String),
}

/// True when the candidate's overall score clears the threshold
pub fn accept(result: &SimilarityResult, threshold: f32) -> bool {
    result.overall_score > threshold
}

#[derive(Debug, Clone, Default)]
pub struct Scorer {
    weights: ScoringWeights,
}

impl Scorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Score one candidate, rejecting results that are not finite numbers
    pub fn try_score(
        &self,
        reference: Reference<'_>,
        candidate: &CandidateItem,
    ) -> Result<SimilarityResult, ScoreError> {
        let result = self.score(reference, candidate);
        if result.overall_score.is_finite() {
            Ok(result)
        } else {
            Err(ScoreError::NonFinite(candidate.id.to_string()))
        }
    }

    pub fn score(&self, reference: Reference<'_>, candidate: &CandidateItem) -> SimilarityResult {
        match reference {
            Reference::Item(source) => self.score_item(source, candidate),
            Reference::Discovery(source) => self.score_discovery(source, candidate),
            Reference::Season(active) => self.score_season(active, candidate),
            Reference::Profile(profile) => self.score_profile(profile, candidate),
        }
    }

    fn score_item(&self, source: &CulturalContext, candidate: &CandidateItem) -> SimilarityResult {
        let w = &self.weights.item;
        let ctx = &candidate.cultural_context;
        let vector = candidate.vector_similarity.unwrap_or(0.0);

        let craft = exact_match(source.craft_type, ctx.craft_type);
        let region = exact_match(source.region, ctx.region);
        let festival = fraction_in(&ctx.festival_relevance, &source.festival_relevance);
        let material = jaccard(&ctx.materials, &source.materials);

        let cultural =
            craft * w.craft + region * w.region + festival * w.festival + material * w.material;
        let cultural_total = w.cultural_total();

        let mut reasons = Vec::new();
        if let Some(c) = ctx.craft_type.filter(|_| craft > 0.0) {
            reasons.push(format!("Same craft: {}", c));
        }
        if let Some(r) = ctx.region.filter(|_| region > 0.0) {
            reasons.push(format!("Same region: {}", r));
        }
        push_shared(&mut reasons, "Shared festivals", &ctx.festival_relevance, &source.festival_relevance);
        push_shared(&mut reasons, "Shared materials", &ctx.materials, &source.materials);
        if vector > 0.0 {
            reasons.push(format!("Similar description ({:.2})", vector));
        }

        SimilarityResult {
            overall_score: cultural + vector * w.vector,
            cultural_similarity: if cultural_total > 0.0 { cultural / cultural_total } else { 0.0 },
            vector_similarity: vector,
            seasonal_relevance: 0.0,
            regional_match: region,
            festival_relevance: festival,
            match_reasons: reasons,
        }
    }

    fn score_discovery(&self, source: &CulturalContext, candidate: &CandidateItem) -> SimilarityResult {
        let w = &self.weights.regional;
        let ctx = &candidate.cultural_context;
        let vector = candidate.vector_similarity.unwrap_or(0.0);

        let new_region = known_difference(source.region, ctx.region);
        if new_region == 0.0 {
            return SimilarityResult::zero(vector);
        }

        let craft = exact_match(source.craft_type, ctx.craft_type);
        let material = jaccard(&ctx.materials, &source.materials);

        let mut reasons = Vec::new();
        if let Some(region) = ctx.region {
            match ctx.craft_type {
                Some(c) if craft > 0.0 => {
                    reasons.push(format!("Same craft ({}) from {}", c, region))
                }
                _ => reasons.push(format!("Discover traditions of {}", region)),
            }
        }
        push_shared(&mut reasons, "Shared materials", &ctx.materials, &source.materials);

        let cultural_weight = w.craft + w.material;
        SimilarityResult {
            overall_score: craft * w.craft
                + new_region * w.new_region
                + vector * w.vector
                + material * w.material,
            cultural_similarity: if cultural_weight > 0.0 {
                (craft * w.craft + material * w.material) / cultural_weight
            } else {
                0.0
            },
            vector_similarity: vector,
            seasonal_relevance: 0.0,
            regional_match: 0.0,
            festival_relevance: 0.0,
            match_reasons: reasons,
        }
    }

    fn score_season(&self, active: &BTreeSet<Festival>, candidate: &CandidateItem) -> SimilarityResult {
        let w = &self.weights.seasonal;
        let ctx = &candidate.cultural_context;
        let vector = candidate.vector_similarity.unwrap_or(0.0);

        let relevance = fraction_in(&ctx.festival_relevance, active);
        if relevance == 0.0 {
            return SimilarityResult::zero(vector);
        }

        let matched = shared(&ctx.festival_relevance, active);
        let coverage = matched.len() as f32 / active.len() as f32;
        let significance = match ctx.cultural_significance {
            Some(
                CulturalSignificance::FestivalItem
                | CulturalSignificance::GiftItem
                | CulturalSignificance::Ceremonial,
            ) => 1.0,
            Some(CulturalSignificance::Decorative) => 0.5,
            _ => 0.0,
        };

        let mut reasons = vec![format!("Perfect for {}", join(&matched))];
        if let Some(sig) = ctx.cultural_significance.filter(|_| significance > 0.0) {
            reasons.push(format!("Seasonal use: {}", sig));
        }

        SimilarityResult {
            overall_score: relevance * w.relevance + coverage * w.coverage + significance * w.significance,
            cultural_similarity: significance,
            vector_similarity: vector,
            seasonal_relevance: relevance,
            regional_match: 0.0,
            festival_relevance: relevance,
            match_reasons: reasons,
        }
    }

    fn score_profile(&self, profile: &UserCulturalProfile, candidate: &CandidateItem) -> SimilarityResult {
        let w = &self.weights.profile;
        let ctx = &candidate.cultural_context;
        let vector = candidate.vector_similarity.unwrap_or(0.0);
        let mut reasons = Vec::new();
        let mut cultural = 0.0;

        if let Some((craft, weight)) = ctx.craft_type.zip(profile.craft_weight(ctx.craft_type)) {
            cultural += w.craft * weight;
            reasons.push(format!("Matches your interest in {}", craft));
        }

        let region_weight = profile.region_weight(ctx.region);
        if let Some((region, weight)) = ctx.region.zip(region_weight) {
            cultural += w.region * weight;
            reasons.push(format!("From a region you like: {}", region));
        }

        let mut matched_festivals = Vec::new();
        for festival in &ctx.festival_relevance {
            if let Some(weight) = profile.festival_weights.get(festival) {
                cultural += w.festival * weight;
                matched_festivals.push(festival);
            }
        }
        if !matched_festivals.is_empty() {
            reasons.push(format!("Relevant for {}", join(&matched_festivals)));
        }

        for material in &ctx.materials {
            if let Some(weight) = profile.material_weights.get(material) {
                cultural += w.material * weight;
                reasons.push(format!("Made with {}, a material you favor", material));
            }
        }

        let mut bonus = 0.0;
        if profile.cultural_openness > w.openness_gate && profile.is_unfamiliar(ctx) {
            bonus = profile.cultural_openness * w.exploration_scale;
            reasons.push("Something new to explore".to_string());
        }

        let festival_relevance =
            matched_festivals.len() as f32 / ctx.festival_relevance.len().max(1) as f32;

        SimilarityResult {
            overall_score: cultural + bonus,
            cultural_similarity: cultural,
            vector_similarity: vector,
            seasonal_relevance: 0.0,
            regional_match: if region_weight.is_some() { 1.0 } else { 0.0 },
            festival_relevance,
            match_reasons: reasons,
        }
    }
}

fn join<T: std::fmt::Display>(values: &[&T]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
}

fn push_shared<T: Ord + std::fmt::Display>(
    reasons: &mut Vec<String>,
    label: &str,
    a: &BTreeSet<T>,
    b: &BTreeSet<T>,
) {
    let common = shared(a, b);
    if !common.is_empty() {
        reasons.push(format!("{}: {}", label, join(&common)));
    }
}
