use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Per-key async locks backing get-or-create single-flight: the first caller
/// for a key populates while holding the key's lock, concurrent callers wait
/// on the same lock and then read the populated entry.
///
/// The lock map itself is append-only; keys are source ids and field names,
/// both bounded by configuration.
pub struct KeyedLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The shared lock for `key`, created on first use.
    pub fn acquire(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(key.to_string()).or_default().clone()
    }
}

impl Default for KeyedLocks {
    fn default() -> Self {
        Self::new()
    }
}
