use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Primary key of the singleton `form_config` row.
pub const FORM_CONFIG_ID: i64 = 1;

/// Gate controlling whether rating submissions are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormConfig {
    #[serde(default)]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_open: bool,
    #[serde(rename = "active_burger_id", default)]
    pub active_item_id: Option<i64>,
    #[serde(rename = "active_burger", default)]
    pub active_item_label: Option<String>,
    #[serde(default)]
    pub admin_hash: Option<String>,
}

impl FormConfig {
    pub fn active_label_display(&self) -> &str {
        self.active_item_label
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("Unknown")
    }
}
