use crate::culture::{ContextOrigin, ContextResolution, CulturalContext};
use crate::vector::Vector;
use serde::{Deserialize, Serialize};

/// Opaque, globally unique item identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        ItemId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId(s)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId(s.to_string())
    }
}

/// Commercial metadata carried with an item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Anything else the catalog stores, passed through untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ItemPayload {
    #[must_use]
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }
}

/// An item as held by the document store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub payload: ItemPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultural_context: Option<CulturalContext>,
    #[serde(default)]
    pub context_origin: ContextOrigin,
}

impl ItemRecord {
    #[must_use]
    pub fn new(id: impl Into<ItemId>, title: &str, text: &str) -> Self {
        Self {
            id: id.into(),
            title: title.to_string(),
            text: text.to_string(),
            payload: ItemPayload::default(),
            vector: None,
            cultural_context: None,
            context_origin: ContextOrigin::Parsed,
        }
    }

    #[must_use]
    pub fn with_payload(mut self, payload: ItemPayload) -> Self {
        self.payload = payload;
        self
    }

    #[must_use]
    pub fn with_price(mut self, price: f64) -> Self {
        self.payload.price = Some(price);
        self
    }

    #[must_use]
    pub fn with_vector(mut self, vector: Vector) -> Self {
        self.vector = Some(vector);
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: CulturalContext) -> Self {
        self.cultural_context = Some(context);
        self.context_origin = ContextOrigin::Parsed;
        self
    }

    /// Text used for scoring and analysis: the body, or the title when the body is blank
    pub fn display_text(&self) -> &str {
        if self.text.trim().is_empty() {
            &self.title
        } else {
            &self.text
        }
    }

    /// True when neither body nor title carries anything to recommend from
    pub fn is_blank(&self) -> bool {
        self.display_text().trim().is_empty()
    }

    /// The attached context, if one has been computed before
    pub fn stored_resolution(&self) -> Option<ContextResolution> {
        self.cultural_context
            .clone()
            .map(|ctx| ContextResolution::from_parts(ctx, self.context_origin))
    }
}

/// An item under consideration for one request
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateItem {
    pub id: ItemId,
    pub text: String,
    pub payload: ItemPayload,
    pub cultural_context: CulturalContext,
    pub context_origin: ContextOrigin,
    /// Present only when the candidate came from nearest-neighbor retrieval
    pub vector_similarity: Option<f32>,
}

impl CandidateItem {
    pub fn from_record(
        record: ItemRecord,
        resolution: ContextResolution,
        vector_similarity: Option<f32>,
    ) -> Self {
        let text = record.display_text().to_string();
        let (cultural_context, context_origin) = resolution.into_parts();
        Self {
            id: record.id,
            text,
            payload: record.payload,
            cultural_context,
            context_origin,
            vector_similarity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::culture::CraftType;
    use serde_json::json;

    #[test]
    fn test_record_deserializes_with_defaults() {
        let record: ItemRecord = serde_json::from_value(json!({
            "id": "item-1",
            "title": "Blue pottery vase",
            "payload": {"price": 450.0, "artisan": "Ramesh"}
        }))
        .unwrap();

        assert_eq!(record.id, ItemId::new("item-1"));
        assert_eq!(record.payload.price, Some(450.0));
        assert_eq!(record.payload.extra.get("artisan"), Some(&json!("Ramesh")));
        assert!(record.cultural_context.is_none());
        assert_eq!(record.display_text(), "Blue pottery vase");
    }

    #[test]
    fn test_blank_record() {
        let record = ItemRecord::new("x", "  ", "");
        assert!(record.is_blank());
    }

    #[test]
    fn test_candidate_from_record() {
        let record = ItemRecord::new("a", "Vase", "Hand thrown clay vase")
            .with_price(300.0)
            .with_context(CulturalContext::new().with_craft(CraftType::Pottery));
        let resolution = record.stored_resolution().unwrap();
        let candidate = CandidateItem::from_record(record, resolution, Some(0.8));

        assert_eq!(candidate.text, "Hand thrown clay vase");
        assert_eq!(candidate.payload.price, Some(300.0));
        assert_eq!(candidate.cultural_context.craft_type, Some(CraftType::Pottery));
        assert_eq!(candidate.context_origin, ContextOrigin::Parsed);
        assert_eq!(candidate.vector_similarity, Some(0.8));
    }
}
