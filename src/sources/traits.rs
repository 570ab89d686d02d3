use async_trait::async_trait;

use crate::domain::{AdminFormField, ConfigOption, Feed, FeedPayload, FeedSource, OutputType, SecretField};
use crate::errors::FeedResult;

/// Contract every feed-type adapter implements.
#[async_trait]
pub trait FeedType: Send + Sync {
    /// Identifier the registry resolves a source's `feed_type_id` against.
    fn type_id(&self) -> &'static str;

    /// Admin-configurable fields for feeds of this type. No side effects.
    fn admin_form_options(&self, source: &FeedSource) -> Vec<AdminFormField>;

    /// Fetch the feed and normalize it into its canonical payload.
    ///
    /// A feed missing required per-feed configuration yields the
    /// provider-titled empty payload rather than an error; only secret and
    /// token failures at the source level propagate.
    async fn data(&self, feed: &Feed) -> FeedResult<FeedPayload>;

    /// Selectable options for the named admin field, `None` if the name is
    /// not one of this adapter's fields.
    async fn config_options(
        &self,
        source: &FeedSource,
        name: &str,
    ) -> FeedResult<Option<Vec<ConfigOption>>>;

    /// Secrets a source of this type must carry; enforced at write time by
    /// the surrounding API layer.
    fn required_secrets(&self) -> Vec<SecretField>;

    /// Per-feed configuration keys this adapter reads.
    fn required_configuration(&self) -> Vec<&'static str>;

    /// Which canonical payload shape `data` produces.
    fn supported_output_type(&self) -> OutputType;
}

impl std::fmt::Debug for dyn FeedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedType")
            .field("type_id", &self.type_id())
            .finish()
    }
}
