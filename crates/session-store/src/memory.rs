use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::store::SessionStore;
use crate::{OpenSession, ProtocolEntry, StoreError};

/// In-memory session registry.
///
/// Same contract as [`FileSessionStore`](crate::FileSessionStore) minus
/// durability; used by tests and by hosts that re-derive pending uploads
/// on every start.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<u64, OpenSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
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
        Ok(())
    }

    fn record(&self, measurement_id: u64, entry: ProtocolEntry) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().unwrap();
        let session = sessions
            .get_mut(&measurement_id)
            .ok_or(StoreError::NotRegistered(measurement_id))?;
        session.protocol_log.push(entry);
        Ok(())
    }

    fn remove(&self, measurement_id: u64) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().unwrap();
        sessions
            .remove(&measurement_id)
            .map(|_| ())
            .ok_or(StoreError::NotRegistered(measurement_id))
    }
}
