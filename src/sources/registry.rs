use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{ConfigOption, Feed, FeedPayload, FeedSource};
use crate::errors::{FeedError, FeedResult};

use super::bookings::BookingsFeedType;
use super::intranet::IntranetFeedType;
use super::notices::NoticesFeedType;
use super::traits::FeedType;

/// Resolves a feed source's configured type identifier to its adapter
/// instance. Built once at startup; an explicit table, no reflection.
pub struct FeedTypeRegistry {
    types: HashMap<&'static str, Arc<dyn FeedType>>,
}

impl FeedTypeRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            types: HashMap::new(),
        };

        registry.register(Arc::new(IntranetFeedType::new()));
        registry.register(Arc::new(BookingsFeedType::new()));
        registry.register(Arc::new(NoticesFeedType::new()));

        registry
    }

    pub fn register(&mut self, feed_type: Arc<dyn FeedType>) {
        self.types.insert(feed_type.type_id(), feed_type);
    }

    pub fn get(&self, type_id: &str) -> Option<Arc<dyn FeedType>> {
        self.types.get(type_id).cloned()
    }

    pub fn resolve(&self, type_id: &str) -> FeedResult<Arc<dyn FeedType>> {
        self.get(type_id)
            .ok_or_else(|| FeedError::UnknownFeedType(type_id.to_string()))
    }

    /// Fetch normalized data for a feed through its configured adapter.
    pub async fn data_for(&self, feed: &Feed) -> FeedResult<FeedPayload> {
        self.resolve(&feed.source.feed_type_id)?.data(feed).await
    }

    /// Config options for one admin field of a source, through its adapter.
    pub async fn config_options_for(
        &self,
        source: &FeedSource,
        name: &str,
    ) -> FeedResult<Option<Vec<ConfigOption>>> {
        self.resolve(&source.feed_type_id)?
            .config_options(source, name)
            .await
    }
}

impl Default for FeedTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
