use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::client::{ApiClient, ClientPool, Secrets};
use crate::collector::{collect_paged, GroupPage, PagedSource, BATCH_SIZE};
use crate::domain::options::MULTISELECT_FROM_ENDPOINT;
use crate::domain::{
    AdminFormField, ConfigOption, Feed, FeedItem, FeedPayload, FeedSource, OutputType, SecretField,
};
use crate::errors::{degrade, FeedResult};
use crate::services::config_endpoint_url;

use super::options::OptionsCache;
use super::traits::FeedType;

pub const TYPE_ID: &str = "notices";

const FEED_TITLE: &str = "Notices";

/// OAuth scope granted to notification API clients.
const SCOPE: &str = "api Notifications.Read.All";

/// One notification as the provider returns it. The message text is already
/// plain, so normalization is a direct mapping plus the fallback rules.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Notice {
    id: i64,
    title: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    created: Option<String>,
    #[serde(default)]
    sender: Option<String>,
    #[serde(default)]
    channel: Option<NoticeChannel>,
}

#[derive(Debug, Clone, Deserialize)]
struct NoticeChannel {
    name: String,
}

/// Notification-stream feed: notices published to the selected channels.
pub struct NoticesFeedType {
    pool: ClientPool,
    options: OptionsCache,
}

impl NoticesFeedType {
    pub fn new() -> Self {
        Self {
            pool: ClientPool::new(SCOPE),
            options: OptionsCache::new(),
        }
    }

    async fn notices(&self, source: &FeedSource, channels: &[String]) -> FeedResult<Vec<Notice>> {
        let result = async {
            let client = self.pool.client_for(source).await?;
            let query: Vec<(String, String)> = channels
                .iter()
                .map(|id| ("getQuery.channels".to_string(), id.clone()))
                .collect();
            client.get_json("/api/notifications", &query).await
        }
        .await;

        degrade(result, &source.id, "notices")
    }
}

impl Default for NoticesFeedType {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedType for NoticesFeedType {
    fn type_id(&self) -> &'static str {
        TYPE_ID
    }

    fn admin_form_options(&self, source: &FeedSource) -> Vec<AdminFormField> {
        vec![AdminFormField {
            key: "notices-channels-selector".to_string(),
            input: MULTISELECT_FROM_ENDPOINT.to_string(),
            endpoint: Some(config_endpoint_url(source, "channels")),
            name: "channels".to_string(),
            label: "Channels".to_string(),
            help_text: "Select which notification channels are shown.".to_string(),
            form_group_classes: "mb-3".to_string(),
        }]
    }

    async fn data(&self, feed: &Feed) -> FeedResult<FeedPayload> {
        let channels = match feed.id_list("channels") {
            Some(channels) => channels,
            None => return Ok(FeedPayload::empty(OutputType::Rss, FEED_TITLE)),
        };

        let secrets = Secrets::from_source(&feed.source)?;
        let base = secrets.base_str().to_string();

        let entries = self
            .notices(&feed.source, &channels)
            .await?
            .into_iter()
            .map(|notice| map_notice(&base, notice))
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
        if name != "channels" {
            return Ok(None);
        }

        let key = format!("notices_channels_{}", source.id);
        let options = self
            .options
            .get_or_populate(&key, || async move {
                let client = self.pool.client_for(source).await?;
                Ok(collect_paged(&Channels::new(client), BATCH_SIZE).await)
            })
            .await?;

        Ok(Some(options))
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
        vec!["channels"]
    }

    fn supported_output_type(&self) -> OutputType {
        OutputType::Rss
    }
}

fn map_notice(base: &str, notice: Notice) -> FeedItem {
    let summary = notice.message.unwrap_or_default();

    FeedItem {
        title: notice.title,
        content: summary.clone(),
        summary,
        link: format!("{}/notifications/{}", base, notice.id),
        last_modified: notice
            .created
            .and_then(|ts| DateTime::parse_from_rfc3339(&ts).ok())
            .map(|ts| ts.with_timezone(&Utc)),
        author: notice.sender,
        media: Vec::new(),
        categories: notice.channel.map(|c| vec![c.name]).unwrap_or_default(),
    }
}

/// Flat channel listing for one source, plugged into the collector.
struct Channels {
    client: ApiClient,
}

impl Channels {
    fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PagedSource for Channels {
    async fn page(&self, page_index: u32, page_size: u32) -> FeedResult<GroupPage> {
        let query = vec![
            ("pageIndex".to_string(), page_index.to_string()),
            ("pageSize".to_string(), page_size.to_string()),
        ];
        self.client.get_json("/api/channels", &query).await
    }
}
