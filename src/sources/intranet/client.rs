use async_trait::async_trait;
use serde::Deserialize;

use crate::client::{ApiClient, ClientPool};
use crate::collector::{GroupNode, GroupPage, PagedSource, TreeSource};
use crate::domain::FeedSource;
use crate::errors::{degrade, FeedResult};

use super::types::FeedEntry;

/// OAuth scope granted to intranet API clients.
const SCOPE: &str = "api FeedEntries.Read.All";

/// Group type enumerated for the recipient multiselect.
const SEARCH_GROUP_TYPE: &str = "WorkGroup";

/// Group type at the root of the publisher hierarchy.
const PUBLISHER_GROUP_TYPE: &str = "Department";

/// Intranet provider endpoints, issued through the shared client pool.
pub(super) struct IntranetClient {
    pool: ClientPool,
}

impl IntranetClient {
    pub fn new() -> Self {
        Self {
            pool: ClientPool::new(SCOPE),
        }
    }

    pub async fn client_for(&self, source: &FeedSource) -> FeedResult<ApiClient> {
        self.pool.client_for(source).await
    }

    /// News entries visible to the given recipient groups, optionally
    /// narrowed by publisher groups. Transport failures degrade to an
    /// empty list.
    pub async fn feed_entries_news(
        &self,
        source: &FeedSource,
        recipients: &[String],
        publishers: &[String],
    ) -> FeedResult<Vec<FeedEntry>> {
        let result = self.request_news(source, recipients, publishers).await;
        degrade(result, &source.id, "feed_entries_news")
    }

    async fn request_news(
        &self,
        source: &FeedSource,
        recipients: &[String],
        publishers: &[String],
    ) -> FeedResult<Vec<FeedEntry>> {
        let client = self.client_for(source).await?;

        let mut query: Vec<(String, String)> = recipients
            .iter()
            .map(|id| ("getQuery.recipients".to_string(), id.clone()))
            .collect();
        query.extend(
            publishers
                .iter()
                .map(|id| ("getQuery.publishers".to_string(), id.clone())),
        );

        client.get_json("/api/feedentries/news", &query).await
    }
}

/// The search endpoint wraps each hit in a `model` envelope.
#[derive(Debug, Deserialize)]
struct SearchGroupsPage {
    results: Vec<SearchGroupHit>,
    total: u64,
}

#[derive(Debug, Deserialize)]
struct SearchGroupHit {
    model: GroupNode,
}

/// Flat recipient-group listing for one source, plugged into the collector.
pub(super) struct SearchGroups {
    client: ApiClient,
}

impl SearchGroups {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PagedSource for SearchGroups {
    async fn page(&self, page_index: u32, page_size: u32) -> FeedResult<GroupPage> {
        let query = vec![
            (
                "groupSearchQuery.groupTypes".to_string(),
                SEARCH_GROUP_TYPE.to_string(),
            ),
            (
                "groupSearchQuery.pageIndex".to_string(),
                page_index.to_string(),
            ),
            (
                "groupSearchQuery.pageSize".to_string(),
                page_size.to_string(),
            ),
        ];

        let page: SearchGroupsPage = self.client.get_json("/api/search/groups", &query).await?;

        Ok(GroupPage {
            total: page.total,
            results: page.results.into_iter().map(|hit| hit.model).collect(),
        })
    }
}

/// Publisher-group hierarchy for one source, plugged into the collector.
pub(super) struct PublisherGroups {
    client: ApiClient,
}

impl PublisherGroups {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TreeSource for PublisherGroups {
    async fn roots(&self) -> FeedResult<Vec<GroupNode>> {
        let query = vec![("groupType".to_string(), PUBLISHER_GROUP_TYPE.to_string())];
        self.client
            .get_json("/api/feedentries/publishers/groups", &query)
            .await
    }

    async fn children(&self, group_id: i64) -> FeedResult<Vec<GroupNode>> {
        let path = format!("/api/feedentries/publishers/groups/{}/children", group_id);
        self.client.get_json(&path, &[]).await
    }
}
