//! Durable key/value storage for client-side state.
//!
//! This crate wraps the persistence the notification list relies on into a
//! small interface with two implementations:
//! - [`file::FileStorage`] keeps one JSON file per key in a directory and
//!   observes changes made by other processes with `notify`.
//! - [`memory::MemoryStorage`] keeps entries in memory; sibling handles share
//!   the entries and act as separate browsing contexts.
//!
//! # External changes
//! Writes made through a handle are never reported back to that same handle.
//! Only changes that originate elsewhere reach the callbacks registered with
//! [`DurableStorage::on_external_change`].

pub mod file;
pub mod memory;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Errors that can occur while reading or writing durable storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// An I/O error occurred while accessing the backing files.
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),
    /// The value does not fit into the configured quota.
    #[error("quota exceeded while writing {key}: {size} bytes over a {quota} byte quota")]
    QuotaExceeded {
        key: String,
        size: usize,
        quota: usize,
    },
    /// Failed to set up observation of external changes.
    #[error("failed to watch storage: {0}")]
    Watch(#[from] notify::Error),
}

/// Callback invoked with the new raw value of a key changed elsewhere, or
/// `None` when the key was removed.
pub type ChangeCallback = Arc<dyn Fn(Option<String>) + Send + Sync + 'static>;

/// Keeps an external change registration alive. Dropping it unsubscribes.
#[must_use = "dropping the subscription stops change notifications"]
pub struct ChangeSubscription {
    _guard: Option<Box<dyn Send>>,
}

impl ChangeSubscription {
    pub(crate) fn new(guard: impl Send + 'static) -> Self {
        Self {
            _guard: Some(Box::new(guard)),
        }
    }

    /// A subscription that never fires, for environments without change
    /// observation.
    pub fn detached() -> Self {
        Self { _guard: None }
    }
}

impl std::fmt::Debug for ChangeSubscription {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ChangeSubscription")
            .field("active", &self._guard.is_some())
            .finish()
    }
}

/// String key/value storage that survives restarts.
pub trait DurableStorage: Send + Sync {
    /// Reads the raw value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Registers `callback` for changes to `key` made outside of this handle.
    ///
    /// The default implementation observes nothing.
    fn on_external_change(
        &self,
        _key: &str,
        _callback: ChangeCallback,
    ) -> Result<ChangeSubscription, StorageError> {
        Ok(ChangeSubscription::detached())
    }
}

/// Locks a mutex, recovering the data if another thread panicked with it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fails with [`StorageError::QuotaExceeded`] when `value` is larger than
/// `quota`.
pub(crate) fn check_quota(key: &str, value: &str, quota: Option<usize>) -> Result<(), StorageError> {
    match quota {
        Some(quota) if value.len() > quota => Err(StorageError::QuotaExceeded {
            key: key.to_string(),
            size: value.len(),
            quota,
        }),
        _ => Ok(()),
    }
}
