//! # Identity Tokens
//!
//! Persisted `user_id` / `session_id` tokens under `~/.coze/identity.json`.
//!
//! The store is a flat string map keyed by [`USER_ID_KEY`] and
//! [`SESSION_ID_KEY`]. A stored token is reused verbatim on every launch; a
//! new UUID v4 is generated only when the key is absent. Tokens are never
//! deleted by this client.
//!
//! The [`IdentityStore`] trait keeps the controller testable: production
//! uses [`FileIdentityStore`] (atomic tmp-file + rename writes),
//! environments without a home directory and tests use
//! [`MemoryIdentityStore`].

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, warn};

pub const USER_ID_KEY: &str = "user_id";
pub const SESSION_ID_KEY: &str = "session_id";

/// Generate a new opaque identity token.
pub fn new_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Key-value persistence for identity tokens.
pub trait IdentityStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
}

/// Return the stored token for `key`, generating and storing a fresh one if
/// absent. A store write failure is logged, not fatal — the session simply
/// won't survive a restart.
pub fn get_or_create(store: &dyn IdentityStore, key: &str) -> String {
    if let Some(existing) = store.get(key) {
        debug!("reusing stored {key}");
        return existing;
    }
    let token = new_token();
    if let Err(e) = store.set(key, &token) {
        warn!("failed to persist {key}: {e}");
    }
    token
}

/// JSON-file-backed store.
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    /// Store at `~/.coze/identity.json`, creating the directory if needed.
    pub fn open_default() -> io::Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no home directory"))?;
        let dir = home.join(".coze");
        fs::create_dir_all(&dir)?;
        Ok(Self::new(dir.join("identity.json")))
    }

    pub fn new(path: PathBuf) -> Self {
        FileIdentityStore { path }
    }

    fn read_map(&self) -> HashMap<String, String> {
        let Ok(json) = fs::read_to_string(&self.path) else {
            return HashMap::new();
        };
        match serde_json::from_str(&json) {
            Ok(map) => map,
            Err(e) => {
                warn!("identity file malformed, starting fresh: {e}");
                HashMap::new()
            }
        }
    }

    /// Atomically write the map as JSON (via `.tmp` + rename).
    fn write_map(&self, map: &HashMap<String, String>) -> io::Result<()> {
        let tmp_path = self.path.with_extension("tmp");
        let json = serde_json::to_string_pretty(map)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IdentityStore for FileIdentityStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_map().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut map = self.read_map();
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }
}

/// In-memory store for tests and homeless environments.
#[derive(Default)]
pub struct MemoryIdentityStore {
    map: Mutex<HashMap<String, String>>,
}

impl IdentityStore for MemoryIdentityStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.map
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
