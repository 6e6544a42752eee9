use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};

/// Reserved delimiter joining the four key components. Field values that
/// contain this sequence would corrupt the key; catalog data never does.
pub const KEY_DELIMITER: &str = "◆◆◆";

/// Composite working identity of a record: the primary-name full text plus
/// the three hierarchy values. Two records identical in all four components
/// collide and are indistinguishable to the overlay.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordKey {
    name: String,
    category: String,
    subcategory: String,
    sub_subcategory: String,
}

impl RecordKey {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        subcategory: impl Into<String>,
        sub_subcategory: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            subcategory: subcategory.into(),
            sub_subcategory: sub_subcategory.into(),
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        let parts: Vec<&str> = value.split(KEY_DELIMITER).collect();
        let [name, category, subcategory, sub_subcategory] = parts.as_slice() else {
            return Err(VaultError::InvalidKey(value.to_string()));
        };
        Ok(Self::new(*name, *category, *subcategory, *sub_subcategory))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn subcategory(&self) -> &str {
        &self.subcategory
    }

    #[must_use]
    pub fn sub_subcategory(&self) -> &str {
        &self.sub_subcategory
    }

    #[must_use]
    pub fn hierarchy(&self) -> (&str, &str, &str) {
        (&self.category, &self.subcategory, &self.sub_subcategory)
    }

    /// Same name, new hierarchy. This is how a reassignment derives the key a
    /// rekeyed overlay entry moves to.
    #[must_use]
    pub fn with_hierarchy(
        &self,
        category: impl Into<String>,
        subcategory: impl Into<String>,
        sub_subcategory: impl Into<String>,
    ) -> Self {
        Self {
            name: self.name.clone(),
            category: category.into(),
            subcategory: subcategory.into(),
            sub_subcategory: sub_subcategory.into(),
        }
    }
}

impl Display for RecordKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{d}{}{d}{}{d}{}",
            self.name,
            self.category,
            self.subcategory,
            self.sub_subcategory,
            d = KEY_DELIMITER
        )
    }
}

impl FromStr for RecordKey {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RecordKey {
    type Error = VaultError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<RecordKey> for String {
    fn from(key: RecordKey) -> Self {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse_round_trip() {
        let key = RecordKey::new("BOLT_M4-20_A2", "Hardware", "Fasteners", "Screws");
        let parsed = RecordKey::parse(&key.to_string()).expect("parse failed");
        assert_eq!(parsed, key);
        assert_eq!(parsed.name(), "BOLT_M4-20_A2");
        assert_eq!(parsed.hierarchy(), ("Hardware", "Fasteners", "Screws"));
    }

    #[test]
    fn empty_components_survive_round_trip() {
        let key = RecordKey::new("", "", "", "");
        let parsed = RecordKey::parse(&key.to_string()).expect("parse failed");
        assert_eq!(parsed, key);
    }

    #[test]
    fn reject_wrong_component_count() {
        let err = RecordKey::parse("only◆◆◆three◆◆◆parts").expect_err("must fail");
        assert!(matches!(err, VaultError::InvalidKey(_)));
        let err = RecordKey::parse("plain text").expect_err("must fail");
        assert!(matches!(err, VaultError::InvalidKey(_)));
    }

    #[test]
    fn with_hierarchy_keeps_name() {
        let key = RecordKey::new("BOLT", "Hardware", "Fasteners", "Screws");
        let moved = key.with_hierarchy("Electrical", "Connectors", "Plugs");
        assert_eq!(moved.name(), "BOLT");
        assert_eq!(moved.hierarchy(), ("Electrical", "Connectors", "Plugs"));
        assert_ne!(moved, key);
    }

    #[test]
    fn serializes_as_string_form() {
        let key = RecordKey::new("BOLT", "Hardware", "Fasteners", "Screws");
        let json = serde_json::to_string(&key).expect("serialize failed");
        assert_eq!(json, "\"BOLT◆◆◆Hardware◆◆◆Fasteners◆◆◆Screws\"");
        let back: RecordKey = serde_json::from_str(&json).expect("deserialize failed");
        assert_eq!(back, key);
    }
}
