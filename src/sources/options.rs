use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::cache::{Cache, KeyedLocks, MemoryCache};
use crate::collector::GroupNode;
use crate::domain::ConfigOption;
use crate::errors::FeedResult;

/// How long admin option lists stay cached; bounded staleness against the
/// upstream group structure is acceptable inside this window.
pub(crate) const OPTIONS_CACHE_TTL: Duration = Duration::from_secs(3600);

/// TTL-cached, single-flight admin option lists keyed per source and field.
pub(crate) struct OptionsCache {
    cache: Arc<dyn Cache<Vec<ConfigOption>>>,
    locks: KeyedLocks,
    ttl: Duration,
}

impl OptionsCache {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(MemoryCache::new()),
            locks: KeyedLocks::new(),
            ttl: OPTIONS_CACHE_TTL,
        }
    }

    /// The cached option list for `key`, or the list built from `populate`'s
    /// groups: mapped to options, sorted ascending by title, stored under the
    /// cache TTL. Concurrent callers for one key share a single population.
    pub async fn get_or_populate<F, Fut>(&self, key: &str, populate: F) -> FeedResult<Vec<ConfigOption>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FeedResult<Vec<GroupNode>>>,
    {
        let lock = self.locks.acquire(key);
        let _guard = lock.lock().await;

        if let Some(options) = self.cache.get(key) {
            return Ok(options);
        }

        let options = to_config_options(populate().await?);
        self.cache.set(key, options.clone(), self.ttl);

        Ok(options)
    }
}

fn to_config_options(groups: Vec<GroupNode>) -> Vec<ConfigOption> {
    let mut options: Vec<ConfigOption> = groups
        .into_iter()
        .map(|group| ConfigOption {
            id: Uuid::new_v4().to_string(),
            title: format!("{} ({})", group.title, group.id),
            value: group.id.to_string(),
        })
        .collect();

    options.sort_by(|a, b| a.title.cmp(&b.title));
    options
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn group(id: i64, title: &str) -> GroupNode {
        GroupNode {
            id,
            title: title.to_string(),
            has_children: false,
        }
    }

    #[tokio::test]
    async fn test_options_sorted_ascending_by_title() {
        let cache = OptionsCache::new();
        let options = cache
            .get_or_populate("k", || async {
                Ok(vec![group(2, "Zebra"), group(1, "Alpha"), group(3, "Middle")])
            })
            .await
            .unwrap();

        let titles: Vec<&str> = options.iter().map(|o| o.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha (1)", "Middle (3)", "Zebra (2)"]);
        assert_eq!(options[0].value, "1");
    }

    #[tokio::test]
    async fn test_generated_option_ids_are_unique() {
        let cache = OptionsCache::new();
        let options = cache
            .get_or_populate("k", || async { Ok(vec![group(1, "A"), group(2, "B")]) })
            .await
            .unwrap();

        assert_ne!(options[0].id, options[1].id);
    }

    #[tokio::test]
    async fn test_second_call_within_ttl_does_not_repopulate() {
        let cache = OptionsCache::new();
        let first = cache
            .get_or_populate("k", || async { Ok(vec![group(1, "A")]) })
            .await
            .unwrap();

        // A repopulation would produce fresh uuids; the cached list is
        // returned unchanged instead
        let second = cache
            .get_or_populate("k", || async { Ok(vec![group(1, "A")]) })
            .await
            .unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_population_error_is_not_cached() {
        let cache = OptionsCache::new();
        let err = cache
            .get_or_populate("k", || async {
                Err(crate::errors::FeedError::Malformed("boom".to_string()))
            })
            .await;
        assert!(err.is_err());

        let options = cache
            .get_or_populate("k", || async { Ok(vec![group(1, "A")]) })
            .await
            .unwrap();
        assert_eq!(options.len(), 1);
    }
}
