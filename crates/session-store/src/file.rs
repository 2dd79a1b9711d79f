use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::store::SessionStore;
use crate::{OpenSession, ProtocolEntry, StoreError};

/// JSON-file-backed session registry.
///
/// The full map lives in memory behind an `RwLock`; every mutation
/// rewrites the file through a temporary sibling followed by a rename,
/// so a crash between a server response and the persisted update leaves
/// the previous, resumable state on disk, never a half-written file.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    sessions: RwLock<HashMap<u64, OpenSession>>,
}

impl FileSessionStore {
    /// Opens (or creates) the registry at `path`.
    ///
    /// Parent directories are created as needed. A missing file means an
    /// empty registry; a file that exists but does not parse is a
    /// [`StoreError::Json`] and the caller decides whether to discard it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let sessions = if path.exists() {
            let data = std::fs::read_to_string(&path)?;
            serde_json::from_str(&data)?
        } else {
            HashMap::new()
        };

        debug!(path = %path.display(), "opened session registry");
        Ok(Self {
            path,
            sessions: RwLock::new(sessions),
        })
    }

    /// Serializes `sessions` to the backing file atomically.
    ///
    /// Called with the write lock held, so file writes are ordered the
    /// same way as the in-memory mutations they mirror.
    fn persist(&self, sessions: &HashMap<u64, OpenSession>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(sessions)?;
        let tmp = tmp_path(&self.path);
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

impl SessionStore for FileSessionStore {
    fn get(&self, measurement_id: u64) -> Result<Option<OpenSession>, StoreError> {
        let sessions = self.sessions.read().unwrap();
        Ok(sessions.get(&measurement_id).cloned())
    }

    fn register(
        &self,
        measurement_id: u64,
        location: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().unwrap();
        if sessions.contains_key(&measurement_id) {
            return Err(StoreError::AlreadyRegistered(measurement_id));
        }
        sessions.insert(
            measurement_id,
            OpenSession::new(measurement_id, location, created_at),
        );
        self.persist(&sessions)?;
        debug!(measurement = measurement_id, location, "registered session");
        Ok(())
    }

    fn record(&self, measurement_id: u64, entry: ProtocolEntry) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().unwrap();
        let session = sessions
            .get_mut(&measurement_id)
            .ok_or(StoreError::NotRegistered(measurement_id))?;
        session.protocol_log.push(entry);
        self.persist(&sessions)
    }

    fn remove(&self, measurement_id: u64) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().unwrap();
        if sessions.remove(&measurement_id).is_none() {
            return Err(StoreError::NotRegistered(measurement_id));
        }
        self.persist(&sessions)?;
        debug!(measurement = measurement_id, "removed session");
        Ok(())
    }
}
