//! Durable registry of open upload sessions.
//!
//! One row per measurement correlates the recording with its in-flight
//! protocol exchange: the collector-assigned session location, the
//! creation time, and an append-only log of every request/response pair.
//! The uploader consults this registry to decide between starting fresh,
//! resuming, or treating a measurement as already transferred, so an
//! interrupted process picks up where it left off instead of re-sending
//! payload bytes the collector already holds.
//!
//! Two implementations share the [`SessionStore`] contract:
//! [`FileSessionStore`] persists to a JSON file with atomic rewrites,
//! [`MemorySessionStore`] keeps everything in process memory for tests
//! and hosts that do not need durability.

mod file;
mod memory;
mod store;
mod types;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;
pub use store::SessionStore;
pub use types::{OpenSession, ProtocolEntry};

/// Errors produced by session store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("session already registered for measurement {0}")]
    AlreadyRegistered(u64),

    #[error("no session registered for measurement {0}")]
    NotRegistered(u64),
}
