//! The upload state machine.
//!
//! Decides, for one measurement, whether to start a new session, resume
//! an interrupted one, or treat the data as already transferred, and
//! reacts to every collector answer. Exactly one exchange is outstanding
//! at a time per measurement; every terminal outcome is written back to
//! the session registry before it is reported to the caller.

use std::sync::Arc;

use chrono::Utc;
use ridelog_protocol::{PreRequestOutcome, RequestKind, StatusOutcome, UploadOutcome};
use ridelog_session_store::{ProtocolEntry, SessionStore};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::connection::CollectorConnection;
use crate::error::UploadError;
use crate::requests;
use crate::sync::SyncEvent;
use crate::upload::Upload;

/// Upload-request failures tolerated before giving up on a measurement.
pub const MAX_FAILED_UPLOADS: u32 = 3;

/// Where the handshake currently stands for one measurement.
enum State {
    /// No session known; the next exchange is a pre-request.
    NoSession,
    /// A session exists; probe it with a status request first.
    SessionOpen { location: String },
    /// The session location is confirmed; send the payload.
    Uploading { location: String },
}

/// Drives the resumable upload handshake for single measurements.
pub struct Uploader {
    connection: Arc<dyn CollectorConnection>,
    store: Arc<dyn SessionStore>,
    cancel: CancellationToken,
}

impl Uploader {
    pub fn new(connection: Arc<dyn CollectorConnection>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            connection,
            store,
            cancel: CancellationToken::new(),
        }
    }

    /// Returns a cancellation token for this uploader.
    ///
    /// Cancellation takes effect between exchanges; an in-flight response
    /// is not force-cancelled but its result is ignored.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Uploads one measurement, resuming an interrupted session if the
    /// registry holds one. Returns the upload with its final session
    /// location on success.
    pub async fn upload(&self, token: &str, upload: Upload) -> Result<Upload, UploadError> {
        self.run(token, upload, None).await
    }

    pub(crate) async fn run(
        &self,
        token: &str,
        mut upload: Upload,
        events: Option<&mpsc::Sender<SyncEvent>>,
    ) -> Result<Upload, UploadError> {
        let id = upload.id();

        // Materialize metadata and payload before any network call; a
        // data problem is never retried.
        let metadata = upload.metadata()?.clone();
        let payload_len = upload.payload()?.len() as u64;
        if payload_len == 0 {
            return Err(UploadError::Data("measurement payload is empty".into()));
        }

        let mut state = match self.store.get(id)? {
            Some(session) => {
                debug!(measurement = id, location = %session.location, "found open session");
                upload.set_location(session.location.clone());
                State::SessionOpen {
                    location: session.location,
                }
            }
            None => State::NoSession,
        };

        loop {
            if self.cancel.is_cancelled() {
                return Err(UploadError::Cancelled);
            }

            state = match state {
                State::NoSession => {
                    let outcome = requests::pre_request(
                        self.connection.as_ref(),
                        token,
                        &metadata,
                        payload_len,
                    )
                    .await?;
                    match outcome {
                        PreRequestOutcome::SessionOpened { location } => {
                            self.store.register(id, &location, Utc::now())?;
                            self.store.record(
                                id,
                                ProtocolEntry::exchange(
                                    RequestKind::PreRequest,
                                    200,
                                    "session opened",
                                    Utc::now(),
                                ),
                            )?;
                            upload.set_location(location.clone());
                            State::Uploading { location }
                        }
                        PreRequestOutcome::AlreadyExists => {
                            info!(measurement = id, "collector already holds this measurement");
                            upload.mark_synchronized()?;
                            upload.reset_failed_uploads();
                            return Ok(upload);
                        }
                        PreRequestOutcome::Failed { status } => {
                            return Err(UploadError::UnexpectedStatus(status));
                        }
                    }
                }
                State::SessionOpen { location } => {
                    let outcome = requests::status_request(
                        self.connection.as_ref(),
                        token,
                        &location,
                        payload_len,
                    )
                    .await?;
                    match outcome {
                        StatusOutcome::Finished => {
                            self.store.record(
                                id,
                                ProtocolEntry::exchange(
                                    RequestKind::Status,
                                    200,
                                    "upload already complete",
                                    Utc::now(),
                                ),
                            )?;
                            upload.mark_synchronized()?;
                            self.store.remove(id)?;
                            upload.reset_failed_uploads();
                            info!(measurement = id, "collector reported upload complete");
                            return Ok(upload);
                        }
                        StatusOutcome::Resume => {
                            self.store.record(
                                id,
                                ProtocolEntry::exchange(
                                    RequestKind::Status,
                                    308,
                                    "resuming",
                                    Utc::now(),
                                ),
                            )?;
                            State::Uploading { location }
                        }
                        StatusOutcome::Aborted => {
                            warn!(measurement = id, "session gone server-side, starting over");
                            self.store.remove(id)?;
                            upload.clear_location();
                            State::NoSession
                        }
                        StatusOutcome::Failed { status } => {
                            self.store.remove(id)?;
                            return Err(UploadError::UnexpectedStatus(status));
                        }
                    }
                }
                State::Uploading { location } => {
                    let outcome = requests::upload_request(
                        self.connection.as_ref(),
                        token,
                        &location,
                        &metadata,
                        upload.payload()?,
                    )
                    .await;
                    match outcome {
                        Ok(UploadOutcome::Created) => {
                            self.store.record(
                                id,
                                ProtocolEntry::exchange(
                                    RequestKind::Upload,
                                    201,
                                    "payload accepted",
                                    Utc::now(),
                                ),
                            )?;
                            upload.mark_synchronized()?;
                            self.store.remove(id)?;
                            upload.reset_failed_uploads();
                            info!(measurement = id, "measurement synchronized");
                            return Ok(upload);
                        }
                        Ok(UploadOutcome::Failed { status }) => {
                            self.note_upload_failure(
                                &mut upload,
                                status,
                                format!("collector answered {status}"),
                                events,
                            )
                            .await?;
                            // Re-probe server state before retrying.
                            State::SessionOpen { location }
                        }
                        // Transport failures inside the upload exchange
                        // consume a retry slot; elsewhere they surface
                        // immediately.
                        Err(UploadError::Transport(reason)) => {
                            self.note_upload_failure(&mut upload, 0, reason, events)
                                .await?;
                            State::SessionOpen { location }
                        }
                        Err(other) => return Err(other),
                    }
                }
            };
        }
    }

    /// Bumps the failure counter, records the failed exchange, and ends
    /// the sequence once the retry budget is spent.
    async fn note_upload_failure(
        &self,
        upload: &mut Upload,
        status: u16,
        reason: String,
        events: Option<&mpsc::Sender<SyncEvent>>,
    ) -> Result<(), UploadError> {
        let id = upload.id();
        let attempt = upload.note_failed_upload();
        self.store.record(
            id,
            ProtocolEntry::failure(RequestKind::Upload, status as i16, &*reason, Utc::now()),
        )?;
        warn!(
            measurement = id,
            status,
            attempt,
            reason = %reason,
            "upload request failed"
        );

        if attempt > MAX_FAILED_UPLOADS {
            // The session row stays behind for external cleanup.
            upload.reset_failed_uploads();
            return Err(UploadError::TooManyRetries {
                last_status: status,
            });
        }

        if let Some(tx) = events {
            let _ = tx
                .send(SyncEvent::Retrying {
                    measurement_id: id,
                    attempt,
                })
                .await;
        }
        Ok(())
    }
}
