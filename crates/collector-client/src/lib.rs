//! HTTP implementation of the collector connection.
//!
//! Speaks the three request shapes of the resumable upload handshake
//! over `reqwest`. The client forwards status codes and the `Location`
//! header untouched; outcome interpretation lives in the uploader's
//! state machine, and no request is ever retried here.

mod client;

pub use client::{CollectorClient, default_http_client};
