use serde::{Deserialize, Serialize};

/// Placeholder part number for catalog entries that have none.
pub const NO_PART_NUMBER: &str = "NO-PN";

/// Structured primary name of a part. The full-text form joins the non-empty
/// components with `_`; parsing splits on the first two underscores, so the
/// detail component may itself contain underscores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartName {
    #[serde(rename = "type", default)]
    pub type_code: String,
    #[serde(default)]
    pub part_number: String,
    #[serde(default)]
    pub detail: String,
}

impl PartName {
    #[must_use]
    pub fn new(
        type_code: impl Into<String>,
        part_number: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            type_code: type_code.into(),
            part_number: part_number.into(),
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn parse(full: &str) -> Self {
        let mut parts = full.splitn(3, '_');
        Self {
            type_code: parts.next().unwrap_or_default().to_string(),
            part_number: parts.next().unwrap_or_default().to_string(),
            detail: parts.next().unwrap_or_default().to_string(),
        }
    }

    #[must_use]
    pub fn full_text(&self) -> String {
        let components = [
            self.type_code.as_str(),
            self.part_number.as_str(),
            self.detail.as_str(),
        ];
        components
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("_")
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.type_code.is_empty() && self.part_number.is_empty() && self.detail.is_empty()
    }

    /// Lowercased free text used for similarity matching. The `NO-PN`
    /// placeholder carries no signal and is dropped.
    #[must_use]
    pub fn search_text(&self) -> String {
        let mut parts = Vec::new();
        if !self.type_code.is_empty() {
            parts.push(self.type_code.to_lowercase());
        }
        if !self.part_number.is_empty() && self.part_number != NO_PART_NUMBER {
            parts.push(self.part_number.to_lowercase());
        }
        if !self.detail.is_empty() {
            parts.push(self.detail.to_lowercase());
        }
        parts.join(" ")
    }
}
