//! The persisted, capped notification list.
//!
//! Every mutation of the in-memory list is written to durable storage while
//! the list is still locked, so no caller can observe a list that differs
//! from what was last persisted by this process. Changes coming from other
//! processes replace the list but are never written back.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, SubsecRound, Utc};
use opsbell_bridge::notification::{Notification, NotificationDraft};
use opsbell_storage::DurableStorage;
use rand::Rng;
use serde_json::Value;

/// Maximum number of notifications kept; older ones are dropped on insert.
pub const CAPACITY: usize = 200;

const ID_SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LENGTH: usize = 7;

/// Errors that can occur while decoding a serialized notification list.
#[derive(Debug, thiserror::Error)]
pub enum ListDecodeError {
    #[error("invalid notification list: {0}")]
    Json(#[from] serde_json::Error),
    #[error("stored notifications are not an array")]
    NotAnArray,
}

/// Decodes a serialized notification list. Anything but a JSON array of
/// notification records is rejected.
pub fn decode_list(raw: &str) -> Result<Vec<Notification>, ListDecodeError> {
    let value: Value = serde_json::from_str(raw)?;
    if !value.is_array() {
        return Err(ListDecodeError::NotAnArray);
    }
    Ok(serde_json::from_value(value)?)
}

/// Builds a session-unique identifier out of the creation time and a random
/// base36 suffix.
pub(crate) fn generate_id(created_at: DateTime<Utc>) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LENGTH)
        .map(|_| ID_SUFFIX_ALPHABET[rng.random_range(0..ID_SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("{}_{suffix}", created_at.timestamp_millis())
}

/// Ordered, most-recent-first list of notifications mirrored to durable
/// storage under a single key.
pub struct NotificationStore {
    storage: Arc<dyn DurableStorage>,
    key: String,
    items: Mutex<Vec<Notification>>,
}

impl NotificationStore {
    /// Loads the list persisted under `key`. A missing, unparsable, or
    /// non-array value yields an empty list; the problem is only logged.
    pub fn initialize(storage: Arc<dyn DurableStorage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let items = match storage.get(&key) {
            Ok(Some(raw)) => decode_list(&raw).unwrap_or_else(|error| {
                log::error!("Failed to read notifications from storage: {error}");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(error) => {
                log::error!("Failed to read notifications from storage: {error}");
                Vec::new()
            }
        };
        log::info!("Loaded {} notification(s) from {key}", items.len());

        Self {
            storage,
            key,
            items: Mutex::new(items),
        }
    }

    /// Storage key this store persists under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current list, most recent first.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    /// Normalizes `draft`, inserts it at the head, drops everything past
    /// [`CAPACITY`], persists, and returns the resulting list.
    pub fn push(&self, draft: NotificationDraft) -> Vec<Notification> {
        let created_at = Utc::now().trunc_subsecs(3);
        let notification = Notification::from_draft(draft, generate_id(created_at), created_at);

        let mut items = self.lock();
        items.insert(0, notification);
        items.truncate(CAPACITY);
        self.persist(&items);
        items.clone()
    }

    /// Empties the list and removes the storage entry.
    pub fn clear(&self) {
        let mut items = self.lock();
        items.clear();
        if let Err(error) = self.storage.remove(&self.key) {
            log::error!("Failed to remove notifications from storage: {error}");
        }
    }

    /// Applies a change made to the storage entry by another process.
    ///
    /// `None` means the entry was removed and empties the list. A value that
    /// does not decode into a list is ignored. Never writes to storage.
    /// Returns the new list when it was replaced.
    pub fn sync_from_external_change(&self, raw: Option<&str>) -> Option<Vec<Notification>> {
        let next = match raw {
            None => Vec::new(),
            Some(raw) => match decode_list(raw) {
                Ok(list) => list,
                Err(error) => {
                    log::error!("Failed to parse notifications from storage change: {error}");
                    return None;
                }
            },
        };

        let mut items = self.lock();
        *items = next;
        Some(items.clone())
    }

    fn persist(&self, items: &[Notification]) {
        let raw = match serde_json::to_string(items) {
            Ok(raw) => raw,
            Err(error) => {
                log::error!("Failed to serialize notifications: {error}");
                return;
            }
        };
        if let Err(error) = self.storage.set(&self.key, &raw) {
            log::error!("Failed to write notifications to storage: {error}");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use opsbell_bridge::notification::NotificationKind;
    use opsbell_storage::memory::MemoryStorage;

    use super::*;

    const KEY: &str = "app_notifications";

    fn draft(n: usize) -> NotificationDraft {
        NotificationDraft::new(NotificationKind::Order, "New order", format!("#{n}"))
    }

    fn store_over(storage: &MemoryStorage) -> NotificationStore {
        NotificationStore::initialize(Arc::new(storage.clone()), KEY)
    }

    #[test]
    fn push_prepends_and_caps_at_capacity() {
        let store = store_over(&MemoryStorage::new());

        let mut list = Vec::new();
        for n in 1..=205 {
            list = store.push(draft(n));
            assert!(list.len() <= CAPACITY);
        }

        assert_eq!(list.len(), 200);
        assert_eq!(list[0].message, "#205");
        assert_eq!(list[199].message, "#6");
        assert_eq!(store.snapshot(), list);
    }

    #[test]
    fn push_assigns_unique_ids_and_defaults() {
        let store = store_over(&MemoryStorage::new());
        store.push(NotificationDraft::default());
        let list = store.push(NotificationDraft::default());

        assert_ne!(list[0].id, list[1].id);
        let (millis, suffix) = list[0].id.split_once('_').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), 7);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_eq!(list[0].title, "Notification");
        assert_eq!(list[0].kind, NotificationKind::Info);
    }

    #[test]
    fn persisted_list_round_trips_into_a_fresh_store() {
        let storage = MemoryStorage::new();
        let store = store_over(&storage);
        store.push(draft(1));
        let expected = store.push(draft(2).with_meta(serde_json::json!({ "_id": "abc" })));

        let reloaded = store_over(&storage);
        assert_eq!(reloaded.snapshot(), expected);
    }

    #[test]
    fn unreadable_storage_initializes_empty() {
        let storage = MemoryStorage::new();
        storage.set(KEY, "{not json").unwrap();
        assert!(store_over(&storage).snapshot().is_empty());

        storage.set(KEY, r#"{"id":"x"}"#).unwrap();
        assert!(store_over(&storage).snapshot().is_empty());
    }

    #[test]
    fn clear_without_stored_entry_is_fine() {
        let storage = MemoryStorage::new();
        let store = store_over(&storage);
        store.clear();
        assert!(store.snapshot().is_empty());
        assert_eq!(storage.get(KEY).unwrap(), None);
    }

    #[test]
    fn clear_removes_the_entry_and_reload_is_empty() {
        let storage = MemoryStorage::new();
        let store = store_over(&storage);
        store.push(draft(1));
        store.clear();

        assert_eq!(storage.get(KEY).unwrap(), None);
        assert!(store_over(&storage).snapshot().is_empty());
    }

    #[test]
    fn invalid_external_changes_are_ignored() {
        let store = store_over(&MemoryStorage::new());
        let before = store.push(draft(1));

        assert_eq!(store.sync_from_external_change(Some("not json")), None);
        assert_eq!(store.sync_from_external_change(Some(r#"{"a":1}"#)), None);
        assert_eq!(store.sync_from_external_change(Some("42")), None);
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn external_changes_replace_without_persisting() {
        let storage = MemoryStorage::new();
        let store = store_over(&storage);
        store.push(draft(1));
        let persisted = storage.get(KEY).unwrap();

        let other = store_over(&MemoryStorage::new());
        let foreign = other.push(draft(9));
        let raw = serde_json::to_string(&foreign).unwrap();

        assert_eq!(store.sync_from_external_change(Some(&raw)), Some(foreign.clone()));
        assert_eq!(store.snapshot(), foreign);
        assert_eq!(storage.get(KEY).unwrap(), persisted);

        assert_eq!(store.sync_from_external_change(None), Some(Vec::new()));
        assert_eq!(storage.get(KEY).unwrap(), persisted);
    }

    #[test]
    fn storage_failures_keep_memory_authoritative() {
        let storage = MemoryStorage::new().with_quota(16);
        let store = store_over(&storage);

        let list = store.push(draft(1));
        assert_eq!(list.len(), 1);
        assert_eq!(store.snapshot(), list);
        assert_eq!(storage.get(KEY).unwrap(), None);
    }

    #[test]
    fn list_survives_a_restart_on_disk() {
        use opsbell_storage::file::FileStorage;

        let dir = tempfile::tempdir().expect("tempdir");
        let first_run =
            NotificationStore::initialize(Arc::new(FileStorage::new(dir.path())), KEY);
        first_run.push(draft(1));
        let expected = first_run.push(draft(2).with_meta(serde_json::json!({ "orderId": "A2" })));
        drop(first_run);

        let second_run =
            NotificationStore::initialize(Arc::new(FileStorage::new(dir.path())), KEY);
        assert_eq!(second_run.snapshot(), expected);

        second_run.clear();
        let third_run =
            NotificationStore::initialize(Arc::new(FileStorage::new(dir.path())), KEY);
        assert!(third_run.snapshot().is_empty());
    }
}
