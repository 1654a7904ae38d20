//! Cultural analyzer backed by a hosted text model
//!
//! The model is asked for a JSON object describing the item. Its answer is
//! parsed leniently: code fences and surrounding prose are ignored, and
//! values outside the closed vocabularies are dropped.

use async_trait::async_trait;
use craftrec_core::{
    CraftType, CulturalAnalyzer, CulturalContext, CulturalSignificance, Error, Festival, Region,
    Result,
};
use serde::Deserialize;
use std::fmt::Write as _;
use std::str::FromStr;
use tracing::debug;

/// A prompt-in, text-out generation model
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub struct ModelBackedAnalyzer<M> {
    model: M,
}

impl<M: TextModel> ModelBackedAnalyzer<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn prompt(title: &str, description: &str) -> String {
        let mut prompt = String::from(
            "Analyze this Indian handcraft item and answer with a single JSON object.\n",
        );
        let _ = writeln!(prompt, "Title: {}", title);
        let _ = writeln!(prompt, "Description: {}", description);
        prompt.push_str("Fields: craft_type, region, materials (list), festival_relevance (list), cultural_significance.\n");
        let _ = writeln!(prompt, "craft_type is one of: {}", join(CraftType::ALL.iter().map(|c| c.as_str())));
        let _ = writeln!(prompt, "region is one of: {}", join(Region::ALL.iter().map(|r| r.as_str())));
        let _ = writeln!(prompt, "festival_relevance values: {}", join(Festival::ALL.iter().map(|f| f.as_str())));
        let _ = writeln!(
            prompt,
            "cultural_significance is one of: {}",
            join(CulturalSignificance::ALL.iter().map(|s| s.as_str()))
        );
        prompt.push_str("Use null or an empty list when unsure.");
        prompt
    }
}

fn join<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values.collect::<Vec<_>>().join(", ")
}

#[async_trait]
impl<M: TextModel> CulturalAnalyzer for ModelBackedAnalyzer<M> {
    async fn analyze(&self, title: &str, description: &str) -> Result<CulturalContext> {
        let answer = self.model.generate(&Self::prompt(title, description)).await?;
        parse_answer(&answer)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawContext {
    craft_type: Option<String>,
    region: Option<String>,
    materials: Vec<String>,
    festival_relevance: Vec<String>,
    cultural_significance: Option<String>,
}

fn parse_variant<T: FromStr>(kind: &str, raw: &str) -> Option<T> {
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            debug!(kind, value = raw, "dropping unrecognized value from model answer");
            None
        }
    }
}

/// Extract a context from a model answer
pub fn parse_answer(answer: &str) -> Result<CulturalContext> {
    let start = answer.find('{');
    let end = answer.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &answer[s..=e],
        _ => return Err(Error::Upstream("model answer contains no JSON object".to_string())),
    };

    let raw: RawContext = serde_json::from_str(json)
        .map_err(|e| Error::Upstream(format!("unparseable model answer: {}", e)))?;

    let mut ctx = CulturalContext::new();
    ctx.craft_type = raw.craft_type.as_deref().and_then(|v| parse_variant("craft_type", v));
    ctx.region = raw.region.as_deref().and_then(|v| parse_variant("region", v));
    ctx.cultural_significance = raw
        .cultural_significance
        .as_deref()
        .and_then(|v| parse_variant("cultural_significance", v));
    ctx.festival_relevance = raw
        .festival_relevance
        .iter()
        .filter_map(|v| parse_variant("festival", v))
        .collect();
    for material in raw.materials.iter().filter(|m| !m.trim().is_empty()) {
        ctx = ctx.with_material(material);
    }
    Ok(ctx)
}
