//! Model catalog entry used for speculative-response model selection.

use serde::{Deserialize, Serialize};

/// One entry in the backend's model catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PredictionModel {
    /// Id sent back to the backend when requesting this model
    pub id: String,
    /// Display name (e.g. "spark-v1", "gpt-mini-2")
    #[serde(alias = "name")]
    pub model: String,
}

impl PredictionModel {
    pub fn new(id: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            model: model.into(),
        }
    }

    /// Whether either the id or the display name contains `needle`
    /// (case-insensitive).
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_ascii_lowercase();
        self.id.to_ascii_lowercase().contains(&needle)
            || self.model.to_ascii_lowercase().contains(&needle)
    }
}
