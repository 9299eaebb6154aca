use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use notify::{Event, EventKind, RecursiveMode, Watcher};

use crate::{ChangeCallback, ChangeSubscription, DurableStorage, StorageError, check_quota, lock};

/// Last value per file this handle either wrote itself or already reported
/// as an external change. `None` stands for an absent file.
type LastSeen = Arc<Mutex<HashMap<PathBuf, Option<String>>>>;

/// File-backed storage keeping every key in `<directory>/<key>.json`.
///
/// Writes go to a temporary file that is then renamed over the target, so
/// readers in other processes never see a half-written value.
#[derive(Debug, Clone)]
pub struct FileStorage {
    directory: PathBuf,
    quota: Option<usize>,
    last_seen: LastSeen,
}

impl FileStorage {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            quota: None,
            last_seen: LastSeen::default(),
        }
    }

    /// Limits the size of a single value, in bytes.
    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = Some(quota);
        self
    }

    /// Directory holding the stored files.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns the file a key is stored in. Characters outside of
    /// `[A-Za-z0-9._-]` are replaced so any key maps into the directory.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '_' | '-' => c,
                _ => '_',
            })
            .collect();
        self.directory.join(format!("{file_name}.json"))
    }

    fn record_own_write(&self, path: PathBuf, value: Option<String>) {
        lock(&self.last_seen).insert(path, value);
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, std::io::Error> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
        Err(error) => Err(error),
    }
}

fn is_relevant(event: &Event, file_name: &std::ffi::OsStr) -> bool {
    let changed = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );
    // notify may report canonicalized paths, so compare by file name only
    changed
        && event
            .paths
            .iter()
            .any(|path| path.file_name() == Some(file_name))
}

impl DurableStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(read_optional(&self.path_for(key))?)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_quota(key, value, self.quota)?;
        fs::create_dir_all(&self.directory)?;

        let path = self.path_for(key);
        let temporary = path.with_extension("json.tmp");
        fs::write(&temporary, value)?;
        self.record_own_write(path.clone(), Some(value.to_string()));
        fs::rename(&temporary, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        self.record_own_write(path.clone(), None);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }

    fn on_external_change(
        &self,
        key: &str,
        callback: ChangeCallback,
    ) -> Result<ChangeSubscription, StorageError> {
        fs::create_dir_all(&self.directory)?;

        let target = self.path_for(key);
        let Some(file_name) = target.file_name().map(|name| name.to_os_string()) else {
            return Ok(ChangeSubscription::detached());
        };
        let last_seen = self.last_seen.clone();
        let initial = read_optional(&target)?;
        lock(&last_seen).entry(target.clone()).or_insert(initial);

        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            let event = match result {
                Ok(event) => event,
                Err(error) => {
                    log::error!("Storage watch error: {error}");
                    return;
                }
            };
            if !is_relevant(&event, &file_name) {
                return;
            }

            let current = match read_optional(&target) {
                Ok(current) => current,
                Err(error) => {
                    log::error!("Failed to read changed storage file {target:?}: {error}");
                    return;
                }
            };

            // one write shows up as several events; report each state once
            {
                let mut last_seen = lock(&last_seen);
                if last_seen.get(&target) == Some(&current) {
                    return;
                }
                last_seen.insert(target.clone(), current.clone());
            }

            log::debug!("External change detected in {target:?}");
            callback(current);
        })?;
        watcher.watch(&self.directory, RecursiveMode::NonRecursive)?;

        Ok(ChangeSubscription::new(watcher))
    }
}
