use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use crate::{ChangeCallback, ChangeSubscription, DurableStorage, StorageError, check_quota, lock};

struct Listener {
    id: u64,
    context: u64,
    key: String,
    callback: ChangeCallback,
}

#[derive(Default)]
struct Shared {
    entries: HashMap<String, String>,
    listeners: Vec<Listener>,
    next_context: u64,
    next_listener: u64,
}

/// In-memory storage.
///
/// Every handle created with [`MemoryStorage::sibling`] is its own context:
/// it sees the same entries, and writes made through it are reported to the
/// listeners registered by the other contexts. Clones share the context of
/// the handle they were cloned from.
#[derive(Clone)]
pub struct MemoryStorage {
    shared: Arc<Mutex<Shared>>,
    context: u64,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                next_context: 1,
                ..Shared::default()
            })),
            context: 0,
            quota: None,
        }
    }

    /// Limits the size of a single value, in bytes. Larger writes fail with
    /// [`StorageError::QuotaExceeded`].
    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = Some(quota);
        self
    }

    /// Creates a handle that acts as another context over the same entries.
    pub fn sibling(&self) -> Self {
        let context = {
            let mut shared = lock(&self.shared);
            let context = shared.next_context;
            shared.next_context += 1;
            context
        };

        Self {
            shared: self.shared.clone(),
            context,
            quota: self.quota,
        }
    }

    fn write(&self, key: &str, value: Option<String>) {
        // callbacks run after the lock is released so they may touch storage
        let callbacks: Vec<ChangeCallback> = {
            let mut shared = lock(&self.shared);
            match &value {
                Some(value) => {
                    shared.entries.insert(key.to_string(), value.clone());
                }
                None => {
                    shared.entries.remove(key);
                }
            }
            shared
                .listeners
                .iter()
                .filter(|listener| listener.context != self.context && listener.key == key)
                .map(|listener| listener.callback.clone())
                .collect()
        };

        for callback in callbacks {
            callback(value.clone());
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

struct ListenerGuard {
    shared: Weak<Mutex<Shared>>,
    id: u64,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            lock(&shared).listeners.retain(|listener| listener.id != self.id);
        }
    }
}

impl DurableStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.shared).entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_quota(key, value, self.quota)?;
        self.write(key, Some(value.to_string()));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.write(key, None);
        Ok(())
    }

    fn on_external_change(
        &self,
        key: &str,
        callback: ChangeCallback,
    ) -> Result<ChangeSubscription, StorageError> {
        let mut shared = lock(&self.shared);
        let id = shared.next_listener;
        shared.next_listener += 1;
        shared.listeners.push(Listener {
            id,
            context: self.context,
            key: key.to_string(),
            callback,
        });

        Ok(ChangeSubscription::new(ListenerGuard {
            shared: Arc::downgrade(&self.shared),
            id,
        }))
    }
}
