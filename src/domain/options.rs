use serde::{Deserialize, Serialize};

/// One admin-selectable value populating a feed configuration form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigOption {
    pub id: String,
    pub title: String,
    pub value: String,
}

/// Description of one admin-configurable field on a feed type, consumed by
/// the admin UI to build the feed form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminFormField {
    pub key: String,
    pub input: String,
    pub endpoint: Option<String>,
    pub name: String,
    pub label: String,
    pub help_text: String,
    pub form_group_classes: String,
}

/// Input kind for multiselect fields whose options come from a config
/// endpoint.
pub const MULTISELECT_FROM_ENDPOINT: &str = "multiselect-from-endpoint";

/// A secret a feed source of some type must carry, enforced at write time by
/// the surrounding API layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretField {
    pub key: &'static str,
    pub expose_value: bool,
}
