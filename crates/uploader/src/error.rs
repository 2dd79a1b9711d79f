//! Upload error types.

use ridelog_session_store::StoreError;

/// Errors produced while synchronizing a measurement.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// No response from the collector (connection failure, timeout).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The collector answered with a status the handshake does not know.
    #[error("collector answered with unexpected status {0}")]
    UnexpectedStatus(u16),

    /// A 200 pre-request response without the mandatory `Location` header.
    #[error("pre-request response carried no Location header")]
    MissingLocation,

    /// Required metadata or the payload could not be produced. Never
    /// retried; retrying cannot fix a data problem.
    #[error("measurement data unavailable: {0}")]
    Data(String),

    #[error("session store error: {0}")]
    Store(#[from] StoreError),

    /// The collector rejected the access token. The caller refreshes the
    /// token and may restart the whole process.
    #[error("collector rejected the access token")]
    Unauthorized,

    /// The upload request failed more often than the retry budget allows.
    /// `last_status` is 0 when the final failure was transport-level.
    #[error("upload abandoned after repeated failures (last status {last_status})")]
    TooManyRetries { last_status: u16 },

    #[error("cancelled")]
    Cancelled,
}
