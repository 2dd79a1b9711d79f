//! Measurement synchronization: the resumable upload state machine.
//!
//! This crate implements the **business logic** for transferring finished
//! recordings to a collector server. It is a library crate with no
//! transport dependency: the host provides a [`CollectorConnection`]
//! implementation (see `ridelog-collector-client` for the HTTP one) and a
//! [`Measurement`] implementation bridging to its recording storage.
//!
//! # Handshake
//!
//! 1. **Pre-request** — announce the measurement; the collector opens a
//!    session or reports it already has the data
//! 2. **Status request** — probe an open session: finished, resumable,
//!    or gone
//! 3. **Upload request** — transmit the payload to the session location
//!
//! The [`Uploader`] drives these phases from the persisted session state,
//! applying a bounded retry policy on upload failures; the
//! [`SyncOrchestrator`] runs a batch of measurements and reports
//! per-measurement results and progress events.

pub mod connection;
pub mod error;
pub mod flow;
pub mod measurement;
pub mod requests;
pub mod sync;
pub mod upload;

// Re-export primary types for convenience.
pub use connection::CollectorConnection;
pub use error::UploadError;
pub use flow::{MAX_FAILED_UPLOADS, Uploader};
pub use measurement::Measurement;
pub use sync::{SyncEvent, SyncOrchestrator, SyncResult};
pub use upload::Upload;
