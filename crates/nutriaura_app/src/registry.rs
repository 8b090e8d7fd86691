//! Catalog plus persisted membership set (earned, completed, joined).

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::catalog::{BADGES, Badge, CHALLENGES, CatalogEntry, Challenge, MISSIONS, Mission};
use crate::error::{AppError, AppResult};
use crate::store::{Storage, StorageKey};

pub struct Registry<T: CatalogEntry> {
    catalog: &'static [T],
    key: StorageKey,
    storage: Storage,
}

impl<T: CatalogEntry> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self {
            catalog: self.catalog,
            key: self.key,
            storage: self.storage.clone(),
        }
    }
}

pub type BadgeRegistry = Registry<Badge>;
pub type MissionRegistry = Registry<Mission>;
pub type ChallengeRegistry = Registry<Challenge>;

impl Registry<Badge> {
    pub fn badges(storage: Storage) -> Self {
        Self::new(&BADGES, StorageKey::EarnedBadges, storage)
    }
}

impl Registry<Mission> {
    pub fn missions(storage: Storage) -> Self {
        Self::new(&MISSIONS, StorageKey::CompletedMissions, storage)
    }
}

impl Registry<Challenge> {
    pub fn challenges(storage: Storage) -> Self {
        Self::new(&CHALLENGES, StorageKey::JoinedChallenges, storage)
    }
}

impl<T: CatalogEntry> Registry<T> {
    pub fn new(catalog: &'static [T], key: StorageKey, storage: Storage) -> Self {
        Self {
            catalog,
            key,
            storage,
        }
    }

    pub fn list(&self) -> &'static [T] {
        self.catalog
    }

    pub fn get(&self, id: &str) -> Option<&'static T> {
        self.catalog.iter().find(|entry| entry.id() == id)
    }

    /// Stored ids in insertion order, restricted to the catalog.
    fn stored_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.storage.load_or_default(self.key);
        ids.retain(|id| {
            let known = self.get(id).is_some();
            if !known {
                warn!(key = self.key.as_str(), id = %id, "dropping unknown stored id");
            }
            known
        });
        ids
    }

    pub fn memberships(&self) -> BTreeSet<String> {
        self.stored_ids().into_iter().collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.stored_ids().iter().any(|stored| stored == id)
    }

    /// Add `id` to the membership set. Returns `false` if it was already there.
    pub fn grant(&self, id: &str) -> AppResult<bool> {
        if self.get(id).is_none() {
            return Err(AppError::NotFound(format!(
                "{} has no entry {id}",
                self.key.as_str()
            )));
        }
        let mut ids = self.stored_ids();
        if ids.iter().any(|stored| stored == id) {
            return Ok(false);
        }
        ids.push(id.to_string());
        self.storage.save(self.key, &ids);
        debug!(key = self.key.as_str(), id, "membership granted");
        Ok(true)
    }
}
