use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type StrainId = String;

/// Evidentiary tier of a lineage claim.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Verified,
    Documented,
    Undocumented,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::Documented => "documented",
            Self::Undocumented => "undocumented",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Verified => "Verified (Signed Claim)",
            Self::Documented => "Documented (Historical Evidence)",
            Self::Undocumented => "Undocumented (Claimed)",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        let norm = text.trim().to_ascii_lowercase();
        match norm.as_str() {
            "verified" => Some(Self::Verified),
            "documented" => Some(Self::Documented),
            "undocumented" => Some(Self::Undocumented),
            _ => None,
        }
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self::Undocumented
    }
}

/// Classification of a parent edge within a multi-stage cross.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeRole {
    Normal,
    F1Component,
    FinalCross,
}

impl EdgeRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::F1Component => "f1_component",
            Self::FinalCross => "final_cross",
        }
    }
}

impl Default for EdgeRole {
    fn default() -> Self {
        Self::Normal
    }
}

/// One catalog entry: a named cultivar and its declared ancestry/descendants.
///
/// `generation` is a display hint only; the two historical catalog variants
/// disagree on its meaning, so nothing in the engine reads it. The
/// `verification` payload is carried through untouched for detail displays.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrainRecord {
    pub id: StrainId,
    pub label: String,
    #[serde(default, alias = "type")]
    pub confidence: Confidence,
    pub breeder: Option<String>,
    pub origin: Option<String>,
    pub generation: Option<i32>,
    pub notes: Option<String>,
    pub lineage_formula: Option<String>,
    #[serde(default)]
    pub parents: Vec<StrainId>,
    #[serde(default)]
    pub children: Vec<StrainId>,
    #[serde(default)]
    pub parent_roles: HashMap<StrainId, EdgeRole>,
    pub verification: Option<serde_json::Value>,
}

impl StrainRecord {
    /// Role of the edge from `parent` into this record.
    pub fn parent_role(&self, parent: &str) -> EdgeRole {
        self.parent_roles.get(parent).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_source_format() {
        // `type` and camelCase keys as written by the original catalog files.
        let json = r#"{
            "id": "fpog",
            "label": "FPOG",
            "type": "documented",
            "generation": 2,
            "lineageFormula": "(Green Ribbon × GDP) × Tahoe Alien",
            "parents": ["green_ribbon", "gdp", "tahoe_alien"],
            "parentRoles": {
                "green_ribbon": "f1_component",
                "gdp": "f1_component",
                "tahoe_alien": "final_cross"
            }
        }"#;
        let record: StrainRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.confidence, Confidence::Documented);
        assert_eq!(record.parents.len(), 3);
        assert!(record.children.is_empty());
        assert_eq!(record.parent_role("green_ribbon"), EdgeRole::F1Component);
        assert_eq!(record.parent_role("tahoe_alien"), EdgeRole::FinalCross);
    }

    #[test]
    fn test_parent_role_defaults_to_normal() {
        let json = r#"{"id": "dd", "label": "Devil Driver", "confidence": "verified",
                       "parents": ["sundae", "melon"]}"#;
        let record: StrainRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.parent_role("sundae"), EdgeRole::Normal);
        assert_eq!(record.parent_role("not_a_parent"), EdgeRole::Normal);
    }

    #[test]
    fn test_confidence_parse_and_text() {
        assert_eq!(Confidence::parse(" Verified "), Some(Confidence::Verified));
        assert_eq!(Confidence::parse("nonsense"), None);
        assert_eq!(Confidence::Documented.as_str(), "documented");
        assert_eq!(EdgeRole::F1Component.as_str(), "f1_component");
    }
}
