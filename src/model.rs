//! Places, constraints, and ranked results.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::lang::Language;

/// A single attribute value as stored in the index metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Number(f64),
    Bool(bool),
    List(Vec<AttributeValue>),
}

impl AttributeValue {
    /// Converts raw metadata, dropping nulls, nested objects, and empty lists.
    fn from_json(value: serde_json::Value) -> Option<Self> {
        use serde_json::Value;
        match value {
            Value::String(s) => Some(AttributeValue::Text(s)),
            Value::Number(n) => n.as_f64().map(AttributeValue::Number),
            Value::Bool(b) => Some(AttributeValue::Bool(b)),
            Value::Array(items) => {
                let items: Vec<_> = items.into_iter().filter_map(Self::from_json).collect();
                (!items.is_empty()).then_some(AttributeValue::List(items))
            }
            Value::Null | Value::Object(_) => None,
        }
    }

    fn render(&self) -> String {
        match self {
            AttributeValue::Text(s) => s.clone(),
            AttributeValue::Number(n) => n.to_string(),
            AttributeValue::Bool(b) => b.to_string(),
            AttributeValue::List(items) => items
                .iter()
                .map(AttributeValue::render)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

pub type Attributes = HashMap<String, AttributeValue>;

/// Reads a metadata map, keeping only values that carry text, numbers, or flags.
/// A null map reads as empty.
pub(crate) fn lenient_attributes<'de, D>(deserializer: D) -> Result<Attributes, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<HashMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, value)| AttributeValue::from_json(value).map(|v| (key, v)))
        .collect())
}

/// Named place attributes. Each resolves through a list of metadata keys so
/// catalogues indexed with Vietnamese column names read the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Description,
    PlaceType,
    Category,
    Region,
    Address,
    OpeningHours,
    Price,
    Tags,
    Keywords,
}

impl Field {
    pub fn keys(self) -> &'static [&'static str] {
        match self {
            Field::Name => &["name", "ten_dia_diem"],
            Field::Description => &["description", "mo_ta"],
            Field::PlaceType => &["place_type", "type", "loai_dia_diem"],
            Field::Category => &["category"],
            Field::Region => &["region", "area", "district", "khu_vuc"],
            Field::Address => &["address", "dia_chi"],
            Field::OpeningHours => &["opening_hours", "thoi_gian_hoat_dong"],
            Field::Price => &["price", "gia_ve"],
            Field::Tags => &["tags"],
            Field::Keywords => &["keywords", "tu_khoa"],
        }
    }
}

/// One document returned by the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    #[serde(default, deserialize_with = "lenient_attributes")]
    pub attributes: Attributes,
    /// Non-negative; smaller is more similar.
    pub distance: f32,
}

impl Candidate {
    /// Raw value of the first present, non-empty key for `field`.
    pub fn get(&self, field: Field) -> Option<String> {
        field
            .keys()
            .iter()
            .filter_map(|k| self.attributes.get(*k))
            .map(AttributeValue::render)
            .find(|v| !v.trim().is_empty())
    }

    /// Lowercased, trimmed value for matching; empty when missing.
    pub fn normalized(&self, field: Field) -> String {
        self.get(field)
            .map(|v| v.trim().to_lowercase())
            .unwrap_or_default()
    }

    pub fn name(&self) -> String {
        self.get(Field::Name).unwrap_or_else(|| self.id.clone())
    }
}

/// Structured criteria inferred from the question. Absent fields are not filtered on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_tier: Option<String>,
}

impl ConstraintSet {
    /// Drops blank values so they count as absent.
    pub fn cleaned(self) -> Self {
        fn keep(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        Self {
            place_type: keep(self.place_type),
            region: keep(self.region),
            keywords: self
                .keywords
                .into_iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
            price_tier: keep(self.price_tier),
        }
    }

    pub fn criteria_count(&self) -> usize {
        usize::from(self.place_type.is_some())
            + usize::from(self.region.is_some())
            + usize::from(!self.keywords.is_empty())
            + usize::from(self.price_tier.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.criteria_count() == 0
    }
}

fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Null,
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => s
            .split([',', ';'])
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect(),
        OneOrMany::Many(v) => v,
        OneOrMany::Null => Vec::new(),
    })
}

/// A candidate with its similarity score and the language of its content.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    /// Always within [0, 1].
    pub score: f32,
    /// `None` when the content language could not be recognized.
    pub language: Option<Language>,
}

impl ScoredCandidate {
    pub fn new(candidate: Candidate, score: f32) -> Self {
        Self {
            candidate,
            score: score.clamp(0.0, 1.0),
            language: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.candidate.id
    }
}

/// Final results: descending score, same-language entries first on ties, unique ids.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct RankedResultSet(Vec<ScoredCandidate>);

impl RankedResultSet {
    /// Callers must hand over entries already in ranked order.
    pub(crate) fn from_ranked(entries: Vec<ScoredCandidate>) -> Self {
        Self(entries)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredCandidate> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<ScoredCandidate> {
        self.0
    }
}

impl<'a> IntoIterator for &'a RankedResultSet {
    type Item = &'a ScoredCandidate;
    type IntoIter = std::slice::Iter<'a, ScoredCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
pub(crate) fn candidate(id: &str, distance: f32, attrs: &[(&str, &str)]) -> Candidate {
    Candidate {
        id: id.to_string(),
        attributes: attrs
            .iter()
            .map(|(k, v)| (k.to_string(), AttributeValue::Text(v.to_string())))
            .collect(),
        distance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_resolves_vietnamese_keys() {
        let c = candidate("1", 0.2, &[("loai_dia_diem", "Bảo tàng"), ("khu_vuc", "Quận 3")]);
        assert_eq!(c.get(Field::PlaceType).as_deref(), Some("Bảo tàng"));
        assert_eq!(c.normalized(Field::Region), "quận 3");
        assert_eq!(c.normalized(Field::Address), "");
    }

    #[test]
    fn blank_attribute_falls_through_to_next_key() {
        let c = candidate("1", 0.2, &[("name", "  "), ("ten_dia_diem", "Chợ Bến Thành")]);
        assert_eq!(c.name(), "Chợ Bến Thành");
    }

    #[test]
    fn name_defaults_to_id() {
        assert_eq!(candidate("place-7", 0.0, &[]).name(), "place-7");
    }

    #[test]
    fn attributes_deserialize_mixed_values() {
        let c: Candidate = serde_json::from_value(serde_json::json!({
            "id": "42",
            "distance": 0.4,
            "attributes": {
                "name": "Dinh Độc Lập",
                "price": 65000,
                "tags": ["history", "architecture"]
            }
        }))
        .unwrap();
        assert_eq!(c.get(Field::Price).as_deref(), Some("65000"));
        assert_eq!(c.get(Field::Tags).as_deref(), Some("history, architecture"));
    }

    #[test]
    fn unusable_attribute_values_are_dropped() {
        let c: Candidate = serde_json::from_value(serde_json::json!({
            "id": "7",
            "distance": 0.3,
            "attributes": {
                "ten_dia_diem": "Chợ Bến Thành",
                "gia_ve": null,
                "open_now": true,
                "tags": ["market", 1830, null],
                "location": {"lat": 10.77, "lng": 106.69},
                "tu_khoa": []
            }
        }))
        .unwrap();
        assert_eq!(c.name(), "Chợ Bến Thành");
        assert_eq!(c.get(Field::Price), None);
        assert_eq!(c.attributes.get("open_now"), Some(&AttributeValue::Bool(true)));
        assert_eq!(c.get(Field::Tags).as_deref(), Some("market, 1830"));
        assert!(!c.attributes.contains_key("location"));
        assert_eq!(c.get(Field::Keywords), None);
    }

    #[test]
    fn null_attribute_map_reads_as_empty() {
        let c: Candidate = serde_json::from_value(serde_json::json!({
            "id": "7",
            "distance": 0.3,
            "attributes": null
        }))
        .unwrap();
        assert!(c.attributes.is_empty());
    }

    #[test]
    fn constraint_keywords_accept_single_string() {
        let set: ConstraintSet = serde_json::from_value(serde_json::json!({
            "place_type": "Quán cà phê",
            "keywords": "yên tĩnh, chụp ảnh"
        }))
        .unwrap();
        assert_eq!(set.keywords, vec!["yên tĩnh", "chụp ảnh"]);
        assert_eq!(set.criteria_count(), 2);
    }

    #[test]
    fn cleaned_drops_blank_fields() {
        let set = ConstraintSet {
            place_type: Some("  ".into()),
            region: Some(" Quận 1 ".into()),
            keywords: vec!["".into(), "quiet".into()],
            price_tier: None,
        }
        .cleaned();
        assert_eq!(set.place_type, None);
        assert_eq!(set.region.as_deref(), Some("Quận 1"));
        assert_eq!(set.keywords, vec!["quiet"]);
        assert_eq!(set.criteria_count(), 2);
    }

    #[test]
    fn scored_candidate_clamps_score() {
        assert_eq!(ScoredCandidate::new(candidate("a", 0.0, &[]), 1.4).score, 1.0);
        assert_eq!(ScoredCandidate::new(candidate("a", 0.0, &[]), -0.2).score, 0.0);
    }
}
