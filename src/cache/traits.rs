use std::time::Duration;

/// TTL-keyed cache capability. Backends must treat an expired entry as
/// absent; callers never see a value past its TTL.
///
/// The in-process [`MemoryCache`](super::MemoryCache) is the default backend;
/// a distributed store can be swapped in behind the same trait.
#[cfg_attr(test, mockall::automock)]
pub trait Cache<V: Clone + Send + Sync + 'static>: Send + Sync {
    fn get(&self, key: &str) -> Option<V>;
    fn set(&self, key: &str, value: V, ttl: Duration);
}
