use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::CalendarEvent;
use super::feed::OutputType;

/// One media attachment on a canonical item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub url: String,
    pub thumbnail_url: String,
}

/// The uniform content record provider entries are normalized into for
/// RSS-like display templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub link: String,
    pub last_modified: Option<DateTime<Utc>>,
    pub author: Option<String>,
    #[serde(default)]
    pub media: Vec<Media>,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Normalized result of fetching a feed. The variant always matches the
/// adapter's supported output type, so the rendering layer knows which
/// display template applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeedPayload {
    Rss {
        title: String,
        entries: Vec<FeedItem>,
    },
    Calendar {
        title: String,
        events: Vec<CalendarEvent>,
    },
}

impl FeedPayload {
    /// The empty payload of the given shape, used when a feed is missing its
    /// required configuration or the provider returned nothing usable.
    pub fn empty(output: OutputType, title: &str) -> Self {
        match output {
            OutputType::Rss => FeedPayload::Rss {
                title: title.to_string(),
                entries: Vec::new(),
            },
            OutputType::Calendar => FeedPayload::Calendar {
                title: title.to_string(),
                events: Vec::new(),
            },
        }
    }

    pub fn output_type(&self) -> OutputType {
        match self {
            FeedPayload::Rss { .. } => OutputType::Rss,
            FeedPayload::Calendar { .. } => OutputType::Calendar,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            FeedPayload::Rss { title, .. } => title,
            FeedPayload::Calendar { title, .. } => title,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FeedPayload::Rss { entries, .. } => entries.is_empty(),
            FeedPayload::Calendar { events, .. } => events.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload_matches_output_type() {
        let payload = FeedPayload::empty(OutputType::Calendar, "Bookings");
        assert_eq!(payload.output_type(), OutputType::Calendar);
        assert_eq!(payload.title(), "Bookings");
        assert!(payload.is_empty());
    }

    #[test]
    fn test_payload_serializes_flat() {
        let payload = FeedPayload::empty(OutputType::Rss, "Intranet");
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["title"], "Intranet");
        assert!(json["entries"].as_array().unwrap().is_empty());
    }
}
