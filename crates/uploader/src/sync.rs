//! Batch synchronization driver.
//!
//! Runs a set of pending measurements through the [`Uploader`], reports
//! a result per measurement, and publishes progress events for host UIs.

use std::sync::Arc;

use ridelog_session_store::SessionStore;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::connection::CollectorConnection;
use crate::flow::Uploader;
use crate::upload::Upload;

/// Progress notification for one measurement's synchronization.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Started { measurement_id: u64 },
    /// An upload request failed and will be retried after a re-probe.
    Retrying { measurement_id: u64, attempt: u32 },
    Succeeded { measurement_id: u64 },
    Failed { measurement_id: u64, error: String },
}

/// Outcome of one measurement's synchronization attempt.
#[derive(Debug, Clone)]
pub struct SyncResult {
    pub measurement_id: u64,
    pub success: bool,
    pub error: Option<String>,
}

/// Synchronizes batches of measurements with the collector.
pub struct SyncOrchestrator {
    uploader: Uploader,
    events_tx: mpsc::Sender<SyncEvent>,
    events_rx: Option<mpsc::Receiver<SyncEvent>>,
}

impl SyncOrchestrator {
    pub fn new(connection: Arc<dyn CollectorConnection>, store: Arc<dyn SessionStore>) -> Self {
        let (events_tx, events_rx) = mpsc::channel(256);
        Self {
            uploader: Uploader::new(connection, store),
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<SyncEvent>> {
        self.events_rx.take()
    }

    /// Returns a cancellation token covering the whole batch.
    pub fn cancel_token(&self) -> CancellationToken {
        self.uploader.cancel_token()
    }

    /// Synchronizes each upload in turn and returns a result per
    /// measurement.
    ///
    /// Measurements are processed one at a time. Each owns an
    /// independent session row, and a failure in one never aborts the
    /// others.
    pub async fn sync_all(&self, token: &str, uploads: Vec<Upload>) -> Vec<SyncResult> {
        let mut results = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let measurement_id = upload.id();
            let _ = self
                .events_tx
                .send(SyncEvent::Started { measurement_id })
                .await;

            match self.uploader.run(token, upload, Some(&self.events_tx)).await {
                Ok(_) => {
                    let _ = self
                        .events_tx
                        .send(SyncEvent::Succeeded { measurement_id })
                        .await;
                    info!(measurement = measurement_id, "sync completed");
                    results.push(SyncResult {
                        measurement_id,
                        success: true,
                        error: None,
                    });
                }
                Err(e) => {
                    let error = e.to_string();
                    let _ = self
                        .events_tx
                        .send(SyncEvent::Failed {
                            measurement_id,
                            error: error.clone(),
                        })
                        .await;
                    error!(measurement = measurement_id, error = %error, "sync failed");
                    results.push(SyncResult {
                        measurement_id,
                        success: false,
                        error: Some(error),
                    });
                }
            }
        }
        results
    }
}
