use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which canonical payload shape a feed source produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    Rss,
    Calendar,
}

impl OutputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputType::Rss => "rss",
            OutputType::Calendar => "calendar",
        }
    }
}

impl std::str::FromStr for OutputType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rss" => Ok(OutputType::Rss),
            "calendar" => Ok(OutputType::Calendar),
            _ => Err(format!("Unknown output type: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Credentials and provider type for one external content provider.
///
/// Owned and validated by the surrounding API layer; this crate only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSource {
    pub id: String,
    pub title: String,
    pub feed_type_id: String,
    pub supported_output: OutputType,
    #[serde(default)]
    pub secrets: HashMap<String, String>,
}

impl FeedSource {
    pub fn secret(&self, key: &str) -> Option<&str> {
        self.secrets.get(key).map(String::as_str)
    }
}

/// A feed source bound to feed-specific filter configuration, attached to a
/// slide by the surrounding API layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    pub id: String,
    pub source: FeedSource,
    #[serde(default)]
    pub configuration: HashMap<String, Value>,
}

impl Feed {
    /// Configured id list under `key`, if the key is set to an array.
    /// Numeric ids are accepted alongside strings.
    pub fn id_list(&self, key: &str) -> Option<Vec<String>> {
        let items = self.configuration.get(key)?.as_array()?;

        Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
        )
    }
}
