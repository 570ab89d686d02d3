use serde::Deserialize;

/// One news entry as the intranet API returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    pub id: i64,
    pub fields: EntryFields,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub publish_date: Option<String>,
    pub publisher: Publisher,
    #[serde(default)]
    pub recipients: Vec<Recipient>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryFields {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    /// JSON-encoded array of gallery items, as the API delivers it.
    #[serde(default)]
    pub gallery_items: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Publisher {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Recipient {
    pub name: String,
}

/// One decoded gallery item; only the file id is used for thumbnail links.
#[derive(Debug, Clone, Deserialize)]
pub struct GalleryItem {
    pub id: i64,
}
