//! Persistence adapter: a string-keyed store of JSON documents.
//!
//! [`KeyValueStore`] is the raw backend contract. [`Storage`] layers JSON
//! (de)serialization and default fallback on top and never fails outward:
//! unreadable values fall back to defaults and unwritable values are kept in
//! a session-local overlay, both with a logged warning.
//!
//! A key whose backend read failed is degraded: the default handed out for it
//! does not reflect what the backend holds, so writes derived from it stay in
//! the overlay until a later read succeeds.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Named resources kept in the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageKey {
    WellnessHistory,
    UserGoals,
    JoinedChallenges,
    UserProfile,
    CompletedMissions,
    EarnedBadges,
    ForumPosts,
    Theme,
    NoveltyMode,
}

impl StorageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::WellnessHistory => "nutriaura_wellness_history",
            StorageKey::UserGoals => "nutriaura_user_goals",
            StorageKey::JoinedChallenges => "nutriaura_joined_challenges",
            StorageKey::UserProfile => "nutriaura_user_profile",
            StorageKey::CompletedMissions => "nutriaura_completed_missions",
            StorageKey::EarnedBadges => "nutriaura_earned_badges",
            StorageKey::ForumPosts => "nutriaura_forum_posts",
            StorageKey::Theme => "theme",
            StorageKey::NoveltyMode => "chaosMode",
        }
    }
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Volatile store used by tests and as a stand-in when no data directory is
/// configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON file per key inside a directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

/// Typed, failure-tolerant access to a [`KeyValueStore`].
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn KeyValueStore>,
    overlay: Arc<Mutex<HashMap<StorageKey, String>>>,
    degraded: Arc<Mutex<HashSet<StorageKey>>>,
}

impl Storage {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            overlay: Arc::new(Mutex::new(HashMap::new())),
            degraded: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    fn read_raw(&self, key: StorageKey) -> Option<String> {
        if let Some(pending) = lock(&self.overlay).get(&key) {
            return Some(pending.clone());
        }
        match self.backend.get(key.as_str()) {
            Ok(value) => {
                lock(&self.degraded).remove(&key);
                value
            }
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "storage read failed; using default");
                lock(&self.degraded).insert(key);
                None
            }
        }
    }

    /// Load and decode a value; `None` when missing or unreadable.
    pub fn load<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "stored value is corrupt; using default");
                None
            }
        }
    }

    pub fn load_or_default<T: DeserializeOwned + Default>(&self, key: StorageKey) -> T {
        self.load(key).unwrap_or_default()
    }

    /// Encode and persist a value. A backend failure keeps the value in the
    /// session overlay so later reads in this session still observe it.
    ///
    /// Degraded keys are never written through, so a value built on a
    /// fallback default cannot replace what the backend still holds.
    pub fn save<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "failed to encode value; not saved");
                return;
            }
        };
        if lock(&self.degraded).contains(&key) {
            warn!(key = key.as_str(), "last read failed; keeping value for this session only");
            lock(&self.overlay).insert(key, raw);
            return;
        }
        match self.backend.set(key.as_str(), &raw) {
            Ok(()) => {
                lock(&self.overlay).remove(&key);
            }
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "storage write failed; keeping value for this session");
                lock(&self.overlay).insert(key, raw);
            }
        }
    }
}
