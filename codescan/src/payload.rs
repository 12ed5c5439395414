//! JSON payload carried by item labels

use serde::{Deserialize, Serialize};

use crate::error::PayloadError;

/// What a printed item label encodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPayload {
    pub item_id: String,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub waste_type: String,
    #[serde(default)]
    pub barangay: String,
    #[serde(default)]
    pub created_at: String,
}

impl ItemPayload {
    pub fn parse(text: &str) -> Result<Self, PayloadError> {
        let payload: ItemPayload =
            serde_json::from_str(text.trim()).map_err(|e| PayloadError::Invalid(e.to_string()))?;

        if payload.item_id.trim().is_empty() {
            return Err(PayloadError::Invalid("empty item_id".into()));
        }

        Ok(payload)
    }

    pub fn to_json(&self) -> String {
        // a struct of plain strings always serializes
        serde_json::to_string(self).unwrap_or_default()
    }
}
