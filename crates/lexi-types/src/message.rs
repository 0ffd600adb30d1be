use serde::{Deserialize, Serialize};

use crate::types::{LookupId, LookupResult};

/// Messages the background sends to a page renderer.
///
/// Serialized as `{"action": "showLoading", ...}` with camelCase fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "action",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum PageMessage {
    ShowLoading {
        selected_text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lookup_id: Option<LookupId>,
    },
    ShowDefinition {
        selected_text: String,
        definition: LookupResult,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lookup_id: Option<LookupId>,
    },
    ShowError {
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selected_text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lookup_id: Option<LookupId>,
    },
}

impl PageMessage {
    pub fn action(&self) -> &'static str {
        match self {
            PageMessage::ShowLoading { .. } => "showLoading",
            PageMessage::ShowDefinition { .. } => "showDefinition",
            PageMessage::ShowError { .. } => "showError",
        }
    }

    pub fn lookup_id(&self) -> Option<LookupId> {
        match self {
            PageMessage::ShowLoading { lookup_id, .. }
            | PageMessage::ShowDefinition { lookup_id, .. }
            | PageMessage::ShowError { lookup_id, .. } => *lookup_id,
        }
    }
}

/// Reply every page message handler sends back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MessageResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}
