use chrono::{DateTime, Utc};

use crate::{OpenSession, ProtocolEntry, StoreError};

/// Registry of open upload sessions, keyed by measurement identifier.
///
/// At most one session exists per measurement at any time. Implementations
/// serialize mutations so that concurrent uploads of *different*
/// measurements never corrupt each other's rows, and a crash mid-write
/// leaves the previous, resumable state behind.
pub trait SessionStore: Send + Sync {
    /// Returns the open session for a measurement, if any.
    fn get(&self, measurement_id: u64) -> Result<Option<OpenSession>, StoreError>;

    /// Creates the session row for a measurement.
    ///
    /// Fails with [`StoreError::AlreadyRegistered`] when called twice for
    /// the same measurement without an intervening [`remove`](Self::remove).
    fn register(
        &self,
        measurement_id: u64,
        location: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Appends an entry to the session's protocol log.
    ///
    /// Fails with [`StoreError::NotRegistered`] when no session exists.
    fn record(&self, measurement_id: u64, entry: ProtocolEntry) -> Result<(), StoreError>;

    /// Deletes the session row.
    ///
    /// Fails with [`StoreError::NotRegistered`] when no session exists;
    /// never touches another measurement's row. Safe to call immediately
    /// after [`register`](Self::register), e.g. when the collector
    /// rejected the upload before any data was sent.
    fn remove(&self, measurement_id: u64) -> Result<(), StoreError>;
}
