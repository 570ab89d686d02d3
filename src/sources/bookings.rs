use async_trait::async_trait;
use serde::Deserialize;

use crate::client::{ApiClient, ClientPool};
use crate::collector::{collect_paged, GroupPage, PagedSource, BATCH_SIZE};
use crate::domain::options::MULTISELECT_FROM_ENDPOINT;
use crate::domain::{
    AdminFormField, CalendarEvent, ConfigOption, Feed, FeedPayload, FeedSource, OutputType,
    SecretField,
};
use crate::errors::{degrade, FeedResult};
use crate::services::config_endpoint_url;

use super::options::OptionsCache;
use super::traits::FeedType;

pub const TYPE_ID: &str = "room-bookings";

const FEED_TITLE: &str = "Bookings";

/// OAuth scope granted to booking API clients.
const SCOPE: &str = "api Bookings.Read.All";

/// One booking as the provider returns it; field-for-field the calendar
/// event shape, so no text extraction applies.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Booking {
    id: String,
    title: String,
    start_time: i64,
    end_time: i64,
    resource_id: String,
    resource_display_name: String,
}

/// Room-booking feed: upcoming bookings on the selected resources, rendered
/// through calendar display templates.
pub struct BookingsFeedType {
    pool: ClientPool,
    options: OptionsCache,
}

impl BookingsFeedType {
    pub fn new() -> Self {
        Self {
            pool: ClientPool::new(SCOPE),
            options: OptionsCache::new(),
        }
    }

    async fn bookings(
        &self,
        source: &FeedSource,
        resources: &[String],
    ) -> FeedResult<Vec<Booking>> {
        let result = async {
            let client = self.pool.client_for(source).await?;
            let query: Vec<(String, String)> = resources
                .iter()
                .map(|id| ("getQuery.resources".to_string(), id.clone()))
                .collect();
            client.get_json("/api/bookings", &query).await
        }
        .await;

        degrade(result, &source.id, "bookings")
    }
}

impl Default for BookingsFeedType {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedType for BookingsFeedType {
    fn type_id(&self) -> &'static str {
        TYPE_ID
    }

    fn admin_form_options(&self, source: &FeedSource) -> Vec<AdminFormField> {
        vec![AdminFormField {
            key: "bookings-resources-selector".to_string(),
            input: MULTISELECT_FROM_ENDPOINT.to_string(),
            endpoint: Some(config_endpoint_url(source, "resources")),
            name: "resources".to_string(),
            label: "Resources".to_string(),
            help_text: "Select which rooms and resources bookings are shown for.".to_string(),
            form_group_classes: "mb-3".to_string(),
        }]
    }

    async fn data(&self, feed: &Feed) -> FeedResult<FeedPayload> {
        let resources = match feed.id_list("resources") {
            Some(resources) => resources,
            None => return Ok(FeedPayload::empty(OutputType::Calendar, FEED_TITLE)),
        };

        let events = self
            .bookings(&feed.source, &resources)
            .await?
            .into_iter()
            .map(|booking| CalendarEvent {
                id: booking.id,
                title: booking.title,
                start_timestamp: booking.start_time,
                end_timestamp: booking.end_time,
                resource_id: booking.resource_id,
                resource_display_name: booking.resource_display_name,
            })
            .collect();

        Ok(FeedPayload::Calendar {
            title: FEED_TITLE.to_string(),
            events,
        })
    }

    async fn config_options(
        &self,
        source: &FeedSource,
        name: &str,
    ) -> FeedResult<Option<Vec<ConfigOption>>> {
        if name != "resources" {
            return Ok(None);
        }

        let key = format!("bookings_resources_{}", source.id);
        let options = self
            .options
            .get_or_populate(&key, || async move {
                let client = self.pool.client_for(source).await?;
                Ok(collect_paged(&Resources::new(client), BATCH_SIZE).await)
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
        vec!["resources"]
    }

    fn supported_output_type(&self) -> OutputType {
        OutputType::Calendar
    }
}

/// Flat resource listing for one source, plugged into the collector.
struct Resources {
    client: ApiClient,
}

impl Resources {
    fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PagedSource for Resources {
    async fn page(&self, page_index: u32, page_size: u32) -> FeedResult<GroupPage> {
        let query = vec![
            ("pageIndex".to_string(), page_index.to_string()),
            ("pageSize".to_string(), page_size.to_string()),
        ];
        self.client.get_json("/api/resources", &query).await
    }
}
