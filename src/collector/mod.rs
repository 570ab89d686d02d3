use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;

use crate::errors::FeedResult;

/// Upstream listing page size.
pub const BATCH_SIZE: u32 = 500;

/// Ceiling on nodes collected in one traversal; inconsistent upstream
/// hierarchies stop here instead of growing without bound.
const MAX_NODES: usize = 10_000;

/// One group discovered while listing or walking the upstream hierarchy.
/// Transient; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupNode {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub has_children: bool,
}

/// One page of a flat group listing.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupPage {
    pub results: Vec<GroupNode>,
    pub total: u64,
}

/// A flat, paginated group listing endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PagedSource: Send + Sync {
    async fn page(&self, page_index: u32, page_size: u32) -> FeedResult<GroupPage>;
}

/// A hierarchical group endpoint: root listing plus per-node child listing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TreeSource: Send + Sync {
    async fn roots(&self) -> FeedResult<Vec<GroupNode>>;
    async fn children(&self, group_id: i64) -> FeedResult<Vec<GroupNode>>;
}

/// Enumerate a flat listing completely. Page 0 reveals the total; the
/// remaining pages are requested concurrently and merged, deduped by id.
///
/// A failed page degrades the result to whatever was accumulated, with the
/// error logged; group listings feed admin convenience UI and never fail a
/// caller.
pub async fn collect_paged(source: &dyn PagedSource, batch_size: u32) -> Vec<GroupNode> {
    let first = match source.page(0, batch_size).await {
        Ok(page) => page,
        Err(e) => {
            tracing::error!(operation = "collect_paged", error = %e, "first page request failed");
            return Vec::new();
        }
    };

    let pages = first.total.div_ceil(u64::from(batch_size)) as u32;
    let mut groups = first.results;

    let remaining = (1..pages).map(|page| source.page(page, batch_size));
    for result in join_all(remaining).await {
        match result {
            Ok(page) => groups.extend(page.results),
            Err(e) => {
                tracing::error!(operation = "collect_paged", error = %e, "page request failed, keeping partial listing");
            }
        }
    }

    dedup_by_id(groups)
}

/// Walk a group hierarchy breadth-first. Child listings for each round are
/// requested in chunks of `batch_size` concurrently. A visited-id set keeps
/// repeated or cyclic upstream ids from being expanded twice, so traversal
/// terminates even on inconsistent parent/child data.
pub async fn collect_tree(source: &dyn TreeSource, batch_size: usize) -> Vec<GroupNode> {
    let roots = match source.roots().await {
        Ok(roots) => roots,
        Err(e) => {
            tracing::error!(operation = "collect_tree", error = %e, "root listing failed");
            return Vec::new();
        }
    };

    let mut visited: HashSet<i64> = HashSet::new();
    let mut queue: VecDeque<i64> = VecDeque::new();
    let mut groups: Vec<GroupNode> = Vec::new();

    for node in roots {
        if node.has_children && visited.insert(node.id) {
            queue.push_back(node.id);
        }
        groups.push(node);
    }

    while !queue.is_empty() && groups.len() < MAX_NODES {
        let take = queue.len().min(batch_size.max(1));
        let chunk: Vec<i64> = queue.drain(..take).collect();

        let results = join_all(chunk.iter().map(|id| source.children(*id))).await;
        for (parent, result) in chunk.iter().zip(results) {
            match result {
                Ok(children) => {
                    for child in children {
                        if child.has_children && visited.insert(child.id) {
                            queue.push_back(child.id);
                        }
                        groups.push(child);
                    }
                }
                Err(e) => {
                    tracing::error!(operation = "collect_tree", group_id = parent, error = %e, "child listing failed, keeping partial hierarchy");
                }
            }
        }
    }

    if !queue.is_empty() {
        tracing::error!(
            operation = "collect_tree",
            pending = queue.len(),
            cap = MAX_NODES,
            "node cap reached, returning partial hierarchy"
        );
    }

    dedup_by_id(groups)
}

fn dedup_by_id(groups: Vec<GroupNode>) -> Vec<GroupNode> {
    let mut seen = HashSet::new();
    groups.into_iter().filter(|g| seen.insert(g.id)).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::errors::FeedError;

    fn leaf(id: i64) -> GroupNode {
        GroupNode {
            id,
            title: format!("Group {}", id),
            has_children: false,
        }
    }

    fn branch(id: i64) -> GroupNode {
        GroupNode {
            id,
            title: format!("Group {}", id),
            has_children: true,
        }
    }

    fn page_of(ids: std::ops::Range<i64>, total: u64) -> GroupPage {
        GroupPage {
            results: ids.map(leaf).collect(),
            total,
        }
    }

    fn transport_error() -> FeedError {
        FeedError::Malformed("boom".to_string())
    }

    const BATCH: u32 = 3;

    #[tokio::test]
    async fn test_paged_single_entry_needs_one_page() {
        let mut source = MockPagedSource::new();
        source
            .expect_page()
            .withf(|index, size| *index == 0 && *size == BATCH)
            .times(1)
            .returning(|_, _| Ok(page_of(0..1, 1)));

        let groups = collect_paged(&source, BATCH).await;
        assert_eq!(groups.len(), 1);
    }

    #[tokio::test]
    async fn test_paged_exact_batch_needs_one_page() {
        let mut source = MockPagedSource::new();
        source
            .expect_page()
            .withf(|index, _| *index == 0)
            .times(1)
            .returning(|_, _| Ok(page_of(0..3, 3)));

        let groups = collect_paged(&source, BATCH).await;
        assert_eq!(groups.len(), 3);
    }

    #[tokio::test]
    async fn test_paged_batch_plus_one_fetches_second_page() {
        let mut source = MockPagedSource::new();
        source
            .expect_page()
            .withf(|index, _| *index == 0)
            .times(1)
            .returning(|_, _| Ok(page_of(0..3, 4)));
        source
            .expect_page()
            .withf(|index, _| *index == 1)
            .times(1)
            .returning(|_, _| Ok(page_of(3..4, 4)));

        let groups = collect_paged(&source, BATCH).await;
        let mut ids: Vec<i64> = groups.iter().map(|g| g.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_paged_merges_dedupe_repeated_ids() {
        let mut source = MockPagedSource::new();
        source
            .expect_page()
            .withf(|index, _| *index == 0)
            .returning(|_, _| Ok(page_of(0..3, 4)));
        source
            .expect_page()
            .withf(|index, _| *index == 1)
            .returning(|_, _| {
                // Upstream paging repeated an id from page 0
                Ok(GroupPage {
                    results: vec![leaf(2), leaf(3)],
                    total: 4,
                })
            });

        let groups = collect_paged(&source, BATCH).await;
        assert_eq!(groups.len(), 4);
    }

    #[tokio::test]
    async fn test_paged_failed_page_degrades_to_partial() {
        let mut source = MockPagedSource::new();
        source
            .expect_page()
            .withf(|index, _| *index == 0)
            .returning(|_, _| Ok(page_of(0..3, 7)));
        source
            .expect_page()
            .withf(|index, _| *index == 1)
            .returning(|_, _| Err(transport_error()));
        source
            .expect_page()
            .withf(|index, _| *index == 2)
            .returning(|_, _| Ok(page_of(6..7, 7)));

        let groups = collect_paged(&source, BATCH).await;
        assert_eq!(groups.len(), 4);
    }

    #[tokio::test]
    async fn test_paged_failed_first_page_returns_empty() {
        let mut source = MockPagedSource::new();
        source
            .expect_page()
            .returning(|_, _| Err(transport_error()));

        assert!(collect_paged(&source, BATCH).await.is_empty());
    }

    #[tokio::test]
    async fn test_tree_expands_children_breadth_first() {
        let mut source = MockTreeSource::new();
        source
            .expect_roots()
            .returning(|| Ok(vec![branch(1), leaf(2)]));
        source
            .expect_children()
            .withf(|id| *id == 1)
            .times(1)
            .returning(|_| Ok(vec![branch(3), leaf(4)]));
        source
            .expect_children()
            .withf(|id| *id == 3)
            .times(1)
            .returning(|_| Ok(vec![leaf(5)]));

        let groups = collect_tree(&source, BATCH as usize).await;
        let mut ids: Vec<i64> = groups.iter().map(|g| g.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_tree_cyclic_ids_expand_once_and_terminate() {
        let mut source = MockTreeSource::new();
        source.expect_roots().returning(|| Ok(vec![branch(1)]));
        // Child reports its own parent as a child again
        source
            .expect_children()
            .withf(|id| *id == 1)
            .times(1)
            .returning(|_| Ok(vec![branch(2)]));
        source
            .expect_children()
            .withf(|id| *id == 2)
            .times(1)
            .returning(|_| Ok(vec![branch(1)]));

        let groups = collect_tree(&source, BATCH as usize).await;
        let mut ids: Vec<i64> = groups.iter().map(|g| g.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_tree_failed_child_listing_keeps_partial() {
        let mut source = MockTreeSource::new();
        source
            .expect_roots()
            .returning(|| Ok(vec![branch(1), branch(2)]));
        source
            .expect_children()
            .withf(|id| *id == 1)
            .returning(|_| Err(transport_error()));
        source
            .expect_children()
            .withf(|id| *id == 2)
            .returning(|_| Ok(vec![leaf(3)]));

        let groups = collect_tree(&source, BATCH as usize).await;
        let mut ids: Vec<i64> = groups.iter().map(|g| g.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_tree_failed_roots_returns_empty() {
        let mut source = MockTreeSource::new();
        source.expect_roots().returning(|| Err(transport_error()));

        assert!(collect_tree(&source, BATCH as usize).await.is_empty());
    }
}
