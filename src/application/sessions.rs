//! # Session Store
//!
//! Maps a Discord user id to their Square Cloud API key. Entries are created
//! by `/login`, replaced by re-login and removed when the remote API reports
//! the key invalid. The map is sharded per key, so concurrent interactions
//! from different users never contend on a global lock.
//!
//! State is persisted to `sessions.json` in the data directory after every
//! mutation, so sessions survive a restart.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// A single user's credential session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub api_key: String,
    pub last_seen: DateTime<Utc>,
}

/// Concurrent store of user sessions, persisted as JSON.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    sessions: DashMap<u64, Session>,
}

impl SessionStore {
    /// Load the store from `path`, or start empty if the file is missing or
    /// unreadable.
    pub fn load(path: PathBuf) -> Self {
        let sessions = DashMap::new();

        if let Ok(content) = fs::read_to_string(&path) {
            match serde_json::from_str::<BTreeMap<u64, Session>>(&content) {
                Ok(stored) => {
                    for (user_id, session) in stored {
                        sessions.insert(user_id, session);
                    }
                }
                Err(err) => {
                    tracing::warn!("Discarding unreadable session file {}: {err}", path.display());
                }
            }
        }

        Self { path, sessions }
    }

    /// Store or replace a user's API key.
    pub fn set(&self, user_id: u64, api_key: String) {
        self.sessions.insert(
            user_id,
            Session {
                api_key,
                last_seen: Utc::now(),
            },
        );
        self.save();
    }

    /// The user's API key, if a session exists. Bumps `last_seen`.
    pub fn get(&self, user_id: u64) -> Option<String> {
        self.sessions.get_mut(&user_id).map(|mut session| {
            session.last_seen = Utc::now();
            session.api_key.clone()
        })
    }

    /// Remove a user's session, if any.
    pub fn clear(&self, user_id: u64) {
        if self.sessions.remove(&user_id).is_some() {
            self.save();
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Persist the current sessions to disk. Failures are logged, never
    /// propagated; a full disk must not take the bot down.
    fn save(&self) {
        let snapshot: BTreeMap<u64, Session> = self
            .sessions
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        let result = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| e.to_string())
            .and_then(|json| fs::write(&self.path, json).map_err(|e| e.to_string()));

        if let Err(err) = result {
            tracing::warn!("Failed to persist sessions to {}: {err}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::load(dir.path().join("sessions.json"))
    }

    #[test]
    fn set_get_clear_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert!(store.get(1).is_none());

        store.set(1, "square-key".to_string());
        assert_eq!(store.get(1).as_deref(), Some("square-key"));

        // Re-login replaces the key.
        store.set(1, "new-key".to_string());
        assert_eq!(store.get(1).as_deref(), Some("new-key"));

        store.clear(1);
        assert!(store.get(1).is_none());
    }

    #[test]
    fn sessions_survive_reload() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = store_in(&dir);
            store.set(7, "persisted".to_string());
            store.set(8, "also-persisted".to_string());
        }

        let reloaded = store_in(&dir);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get(7).as_deref(), Some("persisted"));
        assert_eq!(reloaded.get(8).as_deref(), Some("also-persisted"));
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        fs::write(&path, "{not json").unwrap();

        let store = SessionStore::load(path);
        assert!(store.is_empty());
    }
}
