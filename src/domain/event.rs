use serde::{Deserialize, Serialize};

/// A booked time slot on a resource, the canonical shape for calendar
/// display templates. Timestamps are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start_timestamp: i64,
    pub end_timestamp: i64,
    pub resource_id: String,
    pub resource_display_name: String,
}
