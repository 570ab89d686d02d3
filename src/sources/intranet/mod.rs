mod client;
mod types;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::client::Secrets;
use crate::collector::{collect_paged, collect_tree, BATCH_SIZE};
use crate::domain::options::MULTISELECT_FROM_ENDPOINT;
use crate::domain::{
    AdminFormField, ConfigOption, Feed, FeedItem, FeedPayload, FeedSource, Media, OutputType,
    SecretField,
};
use crate::errors::FeedResult;
use crate::services::config_endpoint_url;
use crate::util::html_to_text;

use client::{IntranetClient, PublisherGroups, SearchGroups};
use types::{FeedEntry, GalleryItem};

use super::options::OptionsCache;
use super::traits::FeedType;

pub const TYPE_ID: &str = "intranet-news";

const FEED_TITLE: &str = "Intranet";

/// Intranet news feed: entries published to selected recipient groups,
/// optionally narrowed to selected publisher groups.
pub struct IntranetFeedType {
    client: IntranetClient,
    options: OptionsCache,
}

impl IntranetFeedType {
    pub fn new() -> Self {
        Self {
            client: IntranetClient::new(),
            options: OptionsCache::new(),
        }
    }

    async fn group_options(&self, source: &FeedSource, name: &str) -> FeedResult<Vec<ConfigOption>> {
        let key = format!("intranet_{}_groups_{}", name, source.id);
        let tree = name == "publishers";

        self.options
            .get_or_populate(&key, || async move {
                let client = self.client.client_for(source).await?;
                let groups = if tree {
                    collect_tree(&PublisherGroups::new(client), BATCH_SIZE as usize).await
                } else {
                    collect_paged(&SearchGroups::new(client), BATCH_SIZE).await
                };
                Ok(groups)
            })
            .await
    }
}

impl Default for IntranetFeedType {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedType for IntranetFeedType {
    fn type_id(&self) -> &'static str {
        TYPE_ID
    }

    fn admin_form_options(&self, source: &FeedSource) -> Vec<AdminFormField> {
        vec![
            AdminFormField {
                key: "intranet-recipients-selector".to_string(),
                input: MULTISELECT_FROM_ENDPOINT.to_string(),
                endpoint: Some(config_endpoint_url(source, "recipients")),
                name: "recipients".to_string(),
                label: "Recipient groups".to_string(),
                help_text: "Select which groups news is fetched for.".to_string(),
                form_group_classes: "mb-3".to_string(),
            },
            AdminFormField {
                key: "intranet-publishers-selector".to_string(),
                input: MULTISELECT_FROM_ENDPOINT.to_string(),
                endpoint: Some(config_endpoint_url(source, "publishers")),
                name: "publishers".to_string(),
                label: "Publisher groups".to_string(),
                help_text: "Limit which publishers' news is shown from the recipient groups. \
                            Leave empty to show all news from the recipient groups."
                    .to_string(),
                form_group_classes: "mb-3".to_string(),
            },
        ]
    }

    async fn data(&self, feed: &Feed) -> FeedResult<FeedPayload> {
        let recipients = match feed.id_list("recipients") {
            Some(recipients) => recipients,
            // Feed not configured yet; the slide shows an empty feed
            None => return Ok(FeedPayload::empty(OutputType::Rss, FEED_TITLE)),
        };
        let publishers = feed.id_list("publishers").unwrap_or_default();

        let secrets = Secrets::from_source(&feed.source)?;
        let entries = self
            .client
            .feed_entries_news(&feed.source, &recipients, &publishers)
            .await?;

        let base = secrets.base_str();
        let entries = entries
            .into_iter()
            .map(|entry| map_entry(base, entry))
            .collect();

        Ok(FeedPayload::Rss {
            title: FEED_TITLE.to_string(),
            entries,
        })
    }

    async fn config_options(
        &self,
        source: &FeedSource,
        name: &str,
    ) -> FeedResult<Option<Vec<ConfigOption>>> {
        match name {
            "recipients" | "publishers" => Ok(Some(self.group_options(source, name).await?)),
            _ => Ok(None),
        }
    }

    fn required_secrets(&self) -> Vec<SecretField> {
        vec![
            SecretField {
                key: "api_base_uri",
                expose_value: true,
            },
            SecretField {
                key: "client_id",
                expose_value: false,
            },
            SecretField {
                key: "client_secret",
                expose_value: false,
            },
        ]
    }

    fn required_configuration(&self) -> Vec<&'static str> {
        vec!["recipients", "publishers"]
    }

    fn supported_output_type(&self) -> OutputType {
        OutputType::Rss
    }
}

/// Map one provider entry into the canonical item shape.
fn map_entry(base: &str, entry: FeedEntry) -> FeedItem {
    let summary = entry
        .fields
        .description
        .as_deref()
        .map(html_to_text)
        .unwrap_or_default();

    let content = match entry.fields.body.as_deref() {
        Some(body) => html_to_text(body),
        None => summary.clone(),
    };

    let last_modified = entry
        .updated
        .or(entry.publish_date)
        .and_then(|ts| DateTime::parse_from_rfc3339(&ts).ok())
        .map(|ts| ts.with_timezone(&Utc));

    let media = entry
        .fields
        .gallery_items
        .as_deref()
        .map(|raw| gallery_media(base, raw))
        .unwrap_or_default();

    FeedItem {
        title: entry.fields.title,
        summary,
        content,
        link: format!("{}/feedentry/{}", base, entry.id),
        last_modified,
        author: Some(entry.publisher.name),
        media,
        categories: entry
            .recipients
            .into_iter()
            .map(|recipient| recipient.name)
            .collect(),
    }
}

/// Decode the JSON-encoded gallery list and template the thumbnail links.
fn gallery_media(base: &str, raw: &str) -> Vec<Media> {
    let items: Vec<GalleryItem> = match serde_json::from_str(raw) {
        Ok(items) => items,
        Err(e) => {
            tracing::error!(error = %e, "gallery items field is not valid JSON, skipping media");
            return Vec::new();
        }
    };

    items
        .into_iter()
        .map(|item| Media {
            url: format!("{}/api/files/{}/thumbnail/large", base, item.id),
            thumbnail_url: format!("{}/api/files/{}/thumbnail/small", base, item.id),
        })
        .collect()
}
