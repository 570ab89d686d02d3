use std::sync::Arc;

use crate::domain::{AdminFormField, ConfigOption, Feed, FeedPayload, FeedSource};
use crate::errors::FeedResult;
use crate::sources::FeedTypeRegistry;

/// Route prefix the external controller serves config-option endpoints under.
const CONFIG_ROUTE_PREFIX: &str = "/v2/feed-sources";

/// URL of the config-option endpoint for one admin field of a source, used
/// by endpoint-backed multiselects in the admin form.
pub fn config_endpoint_url(source: &FeedSource, name: &str) -> String {
    format!("{}/{}/config/{}", CONFIG_ROUTE_PREFIX, source.id, name)
}

/// Front door for feed consumers: resolves the adapter for a feed or source
/// and dispatches to it.
pub struct FeedService {
    registry: Arc<FeedTypeRegistry>,
}

impl FeedService {
    pub fn new(registry: Arc<FeedTypeRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &FeedTypeRegistry {
        &self.registry
    }

    /// Normalized payload for the feed, consumed by the rendering layer.
    pub async fn data(&self, feed: &Feed) -> FeedResult<FeedPayload> {
        self.registry.data_for(feed).await
    }

    /// Admin form description for a source, consumed by the admin UI.
    pub fn admin_form_options(&self, source: &FeedSource) -> FeedResult<Vec<AdminFormField>> {
        Ok(self
            .registry
            .resolve(&source.feed_type_id)?
            .admin_form_options(source))
    }

    /// Selectable options for one admin field, exposed over HTTP by the
    /// external controller. `None` when the adapter does not know the field.
    pub async fn config_options(
        &self,
        source: &FeedSource,
        name: &str,
    ) -> FeedResult<Option<Vec<ConfigOption>>> {
        self.registry.config_options_for(source, name).await
    }
}
