//! Keyword-heuristic cultural classifier
//!
//! Case-insensitive substring matching over title and description against
//! curated keyword sets. Text is lowercased, punctuation becomes spaces and
//! the whole string is padded with spaces, so a keyword written with
//! surrounding spaces only matches a whole word.

use craftrec_core::{CraftType, CulturalContext, CulturalSignificance, Festival, Region};

const CRAFT_KEYWORDS: &[(CraftType, &[&str])] = &[
    (CraftType::Pottery, &["pottery", "ceramic", "clay", "terracotta", "earthenware", "stoneware", "kiln", "glaze"]),
    (CraftType::Textiles, &["textile", "saree", " sari ", "silk", "cotton", "weave", "woven", "handloom", "loom", "embroider", "shawl", "dupatta", "phulkari", "bandhani", "ikat", "block print", "kantha", "chikankari", "pashmina"]),
    (CraftType::Jewelry, &["jewelry", "jewellery", "necklace", "earring", "bangle", "bracelet", "pendant", "anklet", "kundan", "jhumka"]),
    (CraftType::Woodwork, &["woodwork", "wooden", "wood carving", "sandalwood", "rosewood", "teak", "lacquerware", "channapatna"]),
    (CraftType::Metalcraft, &["brass", "copper", "bronze", "metal", "dhokra", "dokra", "bidri", "bell metal"]),
    (CraftType::Painting, &["painting", "madhubani", "warli", "pattachitra", "tanjore", "miniature", "kalamkari", "canvas", "mithila"]),
    (CraftType::Sculpture, &["sculpture", "statue", "idol", "figurine"]),
    (CraftType::Leather, &["leather", "mojari", "jutti", "kolhapuri"]),
    (CraftType::Stone, &["marble", "soapstone", "sandstone", "stone carving", "stone inlay"]),
    (CraftType::Glass, &["glass", "glassware"]),
    (CraftType::Paper, &["papier", " paper ", "paper mache", "handmade paper"]),
    (CraftType::Bamboo, &["bamboo", " cane ", "rattan", "basket"]),
];

const REGION_KEYWORDS: &[(Region, &[&str])] = &[
    (Region::Rajasthan, &["rajasthan", "jaipur", "udaipur", "jodhpur", "jaisalmer", "kundan", "blue pottery"]),
    (Region::Gujarat, &["gujarat", "kutch", "patola", "bandhani", "ahmedabad"]),
    (Region::Punjab, &["punjab", "phulkari", "amritsar"]),
    (Region::WestBengal, &["bengal", "kolkata", "kantha", "bankura", "shantiniketan"]),
    (Region::TamilNadu, &["tamil", "tanjore", "thanjavur", "kanchipuram", "chettinad", "madurai"]),
    (Region::Kerala, &["kerala", "kathakali", "aranmula", " coir "]),
    (Region::Maharashtra, &["maharashtra", "warli", "paithani", "mumbai", "kolhapur"]),
    (Region::Delhi, &["delhi"]),
    (Region::UttarPradesh, &["uttar pradesh", "varanasi", "banaras", "benares", "lucknow", "chikankari", "moradabad", "agra"]),
    (Region::Bihar, &["bihar", "madhubani", "mithila"]),
    (Region::Odisha, &["odisha", "orissa", "pattachitra", "cuttack"]),
    (Region::Kashmir, &["kashmir", "pashmina", "srinagar"]),
    (Region::Karnataka, &["karnataka", "mysore", "mysuru", "channapatna", "bidri"]),
];

const MATERIALS: &[&str] = &[
    "clay", "ceramic", "silk", "cotton", "wool", "gold", "silver", "brass", "copper", "wood",
    "bamboo", "stone", "glass", "leather", "paper",
];

const FESTIVAL_KEYWORDS: &[(Festival, &[&str])] = &[
    (Festival::Diwali, &["diwali", "deepavali", "diya", "rangoli", "lakshmi"]),
    (Festival::Holi, &[" holi ", "gulal", "pichkari"]),
    (Festival::Navratri, &["navratri", "garba", "dandiya", "chaniya choli"]),
    (Festival::DurgaPuja, &["durga"]),
    (Festival::GaneshChaturthi, &["ganesh", "ganpati"]),
    (Festival::RakshaBandhan, &["rakhi", "raksha bandhan"]),
    (Festival::Onam, &[" onam ", "pookalam"]),
    (Festival::Pongal, &["pongal", " kolam "]),
    (Festival::Baisakhi, &["baisakhi", "vaisakhi"]),
    (Festival::Eid, &[" eid ", "ramadan", "ramzan"]),
    (Festival::Christmas, &["christmas", "xmas"]),
    (Festival::WeddingSeason, &["wedding", "bridal", " bride ", "trousseau", "mehndi"]),
];

const CEREMONIAL: &[&str] = &["puja", "pooja", "ritual", "temple", "sacred", "worship", "ceremonial", "prayer"];
const GIFT: &[&str] = &["gift", "souvenir", "keepsake", "present for"];
const DECORATIVE: &[&str] = &["decor", "wall hanging", "showpiece", "ornamental", "home accent"];
const DAILY_USE: &[&str] = &["kitchen", "everyday", "daily use", "tableware", "cookware", "utility"];

/// Maps free text to a cultural context without calling the analyzer
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    /// `None` when the text carries no recognizable signal
    pub fn classify(&self, title: &str, description: &str) -> Option<CulturalContext> {
        let text = prepare(title, description);

        let craft_type = best_match(&text, CRAFT_KEYWORDS);
        let region = best_match(&text, REGION_KEYWORDS);
        let materials = MATERIALS
            .iter()
            .filter(|m| text.contains(*m))
            .map(|m| m.to_string())
            .collect();
        let festival_relevance = FESTIVAL_KEYWORDS
            .iter()
            .filter(|(_, keywords)| hits(&text, keywords) > 0)
            .map(|(festival, _)| *festival)
            .collect();

        let mut ctx = CulturalContext {
            craft_type,
            region,
            materials,
            festival_relevance,
            cultural_significance: None,
        };
        ctx.cultural_significance = significance(&text, &ctx);

        if ctx.is_empty() {
            None
        } else {
            Some(ctx)
        }
    }
}

fn prepare(title: &str, description: &str) -> String {
    let joined = format!("{} {}", title, description).to_lowercase();
    let cleaned: String = joined
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    format!(" {} ", cleaned.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn hits(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| text.contains(*k)).count()
}

/// Entry with the most keyword hits; ties go to the earlier entry
fn best_match<T: Copy>(text: &str, table: &[(T, &[&str])]) -> Option<T> {
    let mut best: Option<(T, usize)> = None;
    for (value, keywords) in table {
        let count = hits(text, keywords);
        if count > 0 && best.map_or(true, |(_, c)| count > c) {
            best = Some((*value, count));
        }
    }
    best.map(|(value, _)| value)
}

fn significance(text: &str, ctx: &CulturalContext) -> Option<CulturalSignificance> {
    if hits(text, CEREMONIAL) > 0 {
        Some(CulturalSignificance::Ceremonial)
    } else if !ctx.festival_relevance.is_empty() {
        Some(CulturalSignificance::FestivalItem)
    } else if hits(text, GIFT) > 0 {
        Some(CulturalSignificance::GiftItem)
    } else if hits(text, DECORATIVE) > 0 {
        Some(CulturalSignificance::Decorative)
    } else if hits(text, DAILY_USE) > 0 {
        Some(CulturalSignificance::DailyUse)
    } else {
        None
    }
}
