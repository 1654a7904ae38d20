//! Cultural context model
//!
//! Closed enumerations for craft types, regions, festivals and significance,
//! parsed once at the boundary, plus the [`CulturalContext`] record attached
//! to every item.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lowercase, trim and fold spaces/hyphens into underscores
pub fn normalize_tag(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $variant:ident => $tag:literal $(| $alias:literal)* ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String")]
        pub enum $name {
            $( #[serde(rename = $tag)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $tag ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match normalize_tag(s).as_str() {
                    $( $tag $(| $alias)* => Ok($name::$variant), )+
                    _ => Err(ValidationError::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

closed_enum! {
    /// Craft category of an item
    CraftType, "craft type" {
        Pottery => "pottery" | "ceramics" | "ceramic",
        Textiles => "textiles" | "textile" | "handloom",
        Jewelry => "jewelry" | "jewellery",
        Woodwork => "woodwork" | "woodcraft",
        Metalcraft => "metalcraft" | "metalwork",
        Painting => "painting" | "paintings",
        Sculpture => "sculpture",
        Leather => "leather" | "leatherwork",
        Stone => "stone" | "stonework",
        Glass => "glass" | "glasswork",
        Paper => "paper" | "papercraft",
        Bamboo => "bamboo" | "cane",
    }
}

closed_enum! {
    /// Region of origin
    Region, "region" {
        Rajasthan => "rajasthan",
        Gujarat => "gujarat",
        Punjab => "punjab",
        WestBengal => "west_bengal" | "bengal",
        TamilNadu => "tamil_nadu" | "tamilnadu",
        Kerala => "kerala",
        Maharashtra => "maharashtra",
        Delhi => "delhi",
        UttarPradesh => "uttar_pradesh",
        Bihar => "bihar",
        Odisha => "odisha" | "orissa",
        Kashmir => "kashmir",
        Karnataka => "karnataka",
    }
}

closed_enum! {
    /// Festival tag
    Festival, "festival" {
        Diwali => "diwali" | "deepavali",
        Holi => "holi",
        Navratri => "navratri",
        DurgaPuja => "durga_puja",
        GaneshChaturthi => "ganesh_chaturthi",
        RakshaBandhan => "raksha_bandhan" | "rakhi",
        Onam => "onam",
        Pongal => "pongal",
        Baisakhi => "baisakhi" | "vaisakhi",
        Eid => "eid",
        Christmas => "christmas",
        WeddingSeason => "wedding_season" | "wedding",
    }
}

closed_enum! {
    /// How an item is used culturally
    CulturalSignificance, "cultural significance" {
        DailyUse => "daily_use",
        Decorative => "decorative",
        GiftItem => "gift_item" | "gift",
        FestivalItem => "festival_item",
        Ceremonial => "ceremonial",
    }
}

/// Structured cultural metadata for one item.
///
/// A missing signal is `None` or an empty set, never a placeholder value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CulturalContext {
    #[serde(default)]
    pub craft_type: Option<CraftType>,
    #[serde(default)]
    pub region: Option<Region>,
    #[serde(default)]
    pub materials: BTreeSet<String>,
    #[serde(default)]
    pub festival_relevance: BTreeSet<Festival>,
    #[serde(default)]
    pub cultural_significance: Option<CulturalSignificance>,
}

impl CulturalContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_craft(mut self, craft: CraftType) -> Self {
        self.craft_type = Some(craft);
        self
    }

    #[must_use]
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    #[must_use]
    pub fn with_material(mut self, material: &str) -> Self {
        self.materials.insert(normalize_tag(material));
        self
    }

    #[must_use]
    pub fn with_festival(mut self, festival: Festival) -> Self {
        self.festival_relevance.insert(festival);
        self
    }

    #[must_use]
    pub fn with_significance(mut self, significance: CulturalSignificance) -> Self {
        self.cultural_significance = Some(significance);
        self
    }

    /// True when the record carries no signal at all
    pub fn is_empty(&self) -> bool {
        self.craft_type.is_none()
            && self.region.is_none()
            && self.materials.is_empty()
            && self.festival_relevance.is_empty()
            && self.cultural_significance.is_none()
    }

    /// Compact one-line form for log fields
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(craft) = self.craft_type {
            parts.push(format!("craft:{}", craft));
        }
        if let Some(region) = self.region {
            parts.push(format!("region:{}", region));
        }
        if !self.festival_relevance.is_empty() {
            parts.push(format!("festivals:{}", self.festival_relevance.len()));
        }
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join("|")
        }
    }
}

/// Where a context came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextOrigin {
    /// Produced by the cultural analyzer
    #[default]
    Parsed,
    /// Produced by the keyword classifier after the analyzer was skipped or failed
    Heuristic,
    /// No signal could be derived
    Default,
}

/// Outcome of resolving an item's cultural context
#[derive(Debug, Clone, PartialEq)]
pub enum ContextResolution {
    Parsed(CulturalContext),
    HeuristicFallback(CulturalContext),
    Default,
}

impl ContextResolution {
    pub fn from_parts(context: CulturalContext, origin: ContextOrigin) -> Self {
        match origin {
            ContextOrigin::Parsed => ContextResolution::Parsed(context),
            ContextOrigin::Heuristic => ContextResolution::HeuristicFallback(context),
            ContextOrigin::Default => ContextResolution::Default,
        }
    }

    pub fn origin(&self) -> ContextOrigin {
        match self {
            ContextResolution::Parsed(_) => ContextOrigin::Parsed,
            ContextResolution::HeuristicFallback(_) => ContextOrigin::Heuristic,
            ContextResolution::Default => ContextOrigin::Default,
        }
    }

    pub fn context(&self) -> Option<&CulturalContext> {
        match self {
            ContextResolution::Parsed(ctx) | ContextResolution::HeuristicFallback(ctx) => Some(ctx),
            ContextResolution::Default => None,
        }
    }

    pub fn into_parts(self) -> (CulturalContext, ContextOrigin) {
        let origin = self.origin();
        match self {
            ContextResolution::Parsed(ctx) | ContextResolution::HeuristicFallback(ctx) => (ctx, origin),
            ContextResolution::Default => (CulturalContext::default(), origin),
        }
    }
}
