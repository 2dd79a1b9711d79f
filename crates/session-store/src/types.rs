use chrono::{DateTime, Utc};
use ridelog_protocol::RequestKind;
use serde::{Deserialize, Serialize};

/// One recorded exchange with the collector.
///
/// Entries are append-only; a session's log is the diagnostic trail of
/// everything that happened on its way to completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolEntry {
    pub kind: RequestKind,
    pub http_status: i16,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    pub caused_error: bool,
    pub time: DateTime<Utc>,
}

impl ProtocolEntry {
    /// Entry for a completed exchange.
    pub fn exchange(
        kind: RequestKind,
        http_status: i16,
        message: impl Into<String>,
        time: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            http_status,
            message: message.into(),
            caused_error: false,
            time,
        }
    }

    /// Entry for an exchange that ended in an error.
    ///
    /// Transport-level failures carry status 0 and the error description.
    pub fn failure(
        kind: RequestKind,
        http_status: i16,
        error: impl Into<String>,
        time: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            http_status,
            message: error.into(),
            caused_error: true,
            time,
        }
    }
}

/// Persisted correlation between a measurement and its in-flight upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSession {
    pub measurement_id: u64,
    /// Collector-assigned session URL.
    pub location: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protocol_log: Vec<ProtocolEntry>,
}

impl OpenSession {
    pub fn new(
        measurement_id: u64,
        location: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            measurement_id,
            location: location.into(),
            created_at,
            protocol_log: Vec::new(),
        }
    }
}
