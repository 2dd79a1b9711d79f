use serde::{Deserialize, Serialize};

/// Kind of protocol exchange, as recorded in a session's protocol log.
///
/// The numeric codes are a storage format; never reorder them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
pub enum RequestKind {
    Status,
    PreRequest,
    Upload,
}

impl RequestKind {
    /// Stable storage code for this kind.
    pub fn code(&self) -> i16 {
        match self {
            RequestKind::Status => 0,
            RequestKind::PreRequest => 1,
            RequestKind::Upload => 2,
        }
    }

    /// Reverses [`code`](Self::code); `None` for unknown codes.
    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(RequestKind::Status),
            1 => Some(RequestKind::PreRequest),
            2 => Some(RequestKind::Upload),
            _ => None,
        }
    }
}

impl From<RequestKind> for i16 {
    fn from(kind: RequestKind) -> Self {
        kind.code()
    }
}

impl TryFrom<i16> for RequestKind {
    type Error = String;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        RequestKind::from_code(code).ok_or_else(|| format!("unknown request kind code {code}"))
    }
}

/// Status line and the headers the handshake cares about, as handed back
/// by the transport. Outcome interpretation happens above the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// `Location` response header, when the server sent one.
    pub location: Option<String>,
}

impl RawResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            location: None,
        }
    }

    pub fn with_location(status: u16, location: impl Into<String>) -> Self {
        Self {
            status,
            location: Some(location.into()),
        }
    }
}

/// Result of the pre-request phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreRequestOutcome {
    /// The collector opened a fresh session at `location`.
    SessionOpened { location: String },
    /// The collector already holds this measurement; nothing to send.
    AlreadyExists,
    /// Any other status the collector answered with.
    Failed { status: u16 },
}

/// Result of the status-request phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutcome {
    /// The server holds the complete payload already.
    Finished,
    /// The server expects the upload to continue on the same session.
    Resume,
    /// The session is gone server-side; start over with a pre-request.
    Aborted,
    Failed { status: u16 },
}

/// Result of the upload-request phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The payload was accepted.
    Created,
    Failed { status: u16 },
}
