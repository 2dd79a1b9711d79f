//! The three request components of the handshake.
//!
//! Each issues exactly one exchange and maps the raw response to a typed
//! outcome. None of them retries; retry decisions belong to the state
//! machine alone. A 401 on any exchange short-circuits as
//! [`UploadError::Unauthorized`] before outcome mapping.

use ridelog_protocol::{
    MeasurementMetadata, PreRequestOutcome, StatusOutcome, UploadOutcome,
};
use tracing::debug;

use crate::connection::CollectorConnection;
use crate::error::UploadError;

/// Asks the collector to open an upload session for a measurement.
pub async fn pre_request(
    conn: &dyn CollectorConnection,
    token: &str,
    metadata: &MeasurementMetadata,
    payload_len: u64,
) -> Result<PreRequestOutcome, UploadError> {
    let response = conn.send_pre_request(token, metadata, payload_len).await?;
    debug!(
        measurement = metadata.measurement_id,
        status = response.status,
        "pre-request answered"
    );
    match response.status {
        401 => Err(UploadError::Unauthorized),
        200 => match response.location {
            Some(location) => Ok(PreRequestOutcome::SessionOpened { location }),
            None => Err(UploadError::MissingLocation),
        },
        409 => Ok(PreRequestOutcome::AlreadyExists),
        status => Ok(PreRequestOutcome::Failed { status }),
    }
}

/// Asks whether an open session still needs data.
pub async fn status_request(
    conn: &dyn CollectorConnection,
    token: &str,
    location: &str,
    payload_len: u64,
) -> Result<StatusOutcome, UploadError> {
    let response = conn.send_status_request(token, location, payload_len).await?;
    debug!(location, status = response.status, "status request answered");
    match response.status {
        401 => Err(UploadError::Unauthorized),
        200 => Ok(StatusOutcome::Finished),
        308 => Ok(StatusOutcome::Resume),
        404 => Ok(StatusOutcome::Aborted),
        status => Ok(StatusOutcome::Failed { status }),
    }
}

/// Transmits the payload to an open session.
pub async fn upload_request(
    conn: &dyn CollectorConnection,
    token: &str,
    location: &str,
    metadata: &MeasurementMetadata,
    payload: &[u8],
) -> Result<UploadOutcome, UploadError> {
    let response = conn
        .send_upload_request(token, location, metadata, payload)
        .await?;
    debug!(
        measurement = metadata.measurement_id,
        status = response.status,
        "upload request answered"
    );
    match response.status {
        401 => Err(UploadError::Unauthorized),
        201 => Ok(UploadOutcome::Created),
        status => Ok(UploadOutcome::Failed { status }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ridelog_protocol::RawResponse;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    /// Connection that answers every request from one canned queue.
    struct CannedConnection {
        responses: Mutex<Vec<Result<RawResponse, UploadError>>>,
    }

    impl CannedConnection {
        fn new(responses: Vec<Result<RawResponse, UploadError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }

        fn next(&self) -> Result<RawResponse, UploadError> {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Err(UploadError::Transport("no canned response".into()))
            } else {
                responses.remove(0)
            }
        }
    }

    impl CollectorConnection for CannedConnection {
        fn send_pre_request(
            &self,
            _token: &str,
            _metadata: &MeasurementMetadata,
            _payload_len: u64,
        ) -> Pin<Box<dyn Future<Output = Result<RawResponse, UploadError>> + Send + '_>> {
            Box::pin(async move { self.next() })
        }

        fn send_status_request(
            &self,
            _token: &str,
            _location: &str,
            _payload_len: u64,
        ) -> Pin<Box<dyn Future<Output = Result<RawResponse, UploadError>> + Send + '_>> {
            Box::pin(async move { self.next() })
        }

        fn send_upload_request(
            &self,
            _token: &str,
            _location: &str,
            _metadata: &MeasurementMetadata,
            _payload: &[u8],
        ) -> Pin<Box<dyn Future<Output = Result<RawResponse, UploadError>> + Send + '_>> {
            Box::pin(async move { self.next() })
        }
    }

    fn metadata() -> MeasurementMetadata {
        MeasurementMetadata {
            device_id: "d1".into(),
            measurement_id: 1,
            location_count: 10,
            format_version: "3".into(),
            device_type: "iPhone".into(),
            os_version: "17.0".into(),
            app_version: "1.0".into(),
            length_meters: 100.0,
            modality: "CAR".into(),
            start_location: None,
            end_location: None,
        }
    }

    #[tokio::test]
    async fn pre_request_opens_session() {
        let conn = CannedConnection::new(vec![Ok(RawResponse::with_location(
            200,
            "https://collector/v4/sessions/1",
        ))]);
        let outcome = pre_request(&conn, "tok", &metadata(), 64).await.unwrap();
        assert_eq!(
            outcome,
            PreRequestOutcome::SessionOpened {
                location: "https://collector/v4/sessions/1".into()
            }
        );
    }

    #[tokio::test]
    async fn pre_request_missing_location_is_protocol_violation() {
        let conn = CannedConnection::new(vec![Ok(RawResponse::new(200))]);
        let err = pre_request(&conn, "tok", &metadata(), 64).await.unwrap_err();
        assert!(matches!(err, UploadError::MissingLocation));
    }

    #[tokio::test]
    async fn pre_request_conflict_means_already_exists() {
        let conn = CannedConnection::new(vec![Ok(RawResponse::new(409))]);
        let outcome = pre_request(&conn, "tok", &metadata(), 64).await.unwrap();
        assert_eq!(outcome, PreRequestOutcome::AlreadyExists);
    }

    #[tokio::test]
    async fn pre_request_other_status_is_failed_outcome() {
        let conn = CannedConnection::new(vec![Ok(RawResponse::new(503))]);
        let outcome = pre_request(&conn, "tok", &metadata(), 64).await.unwrap();
        assert_eq!(outcome, PreRequestOutcome::Failed { status: 503 });
    }

    #[tokio::test]
    async fn status_request_outcomes() {
        for (status, expected) in [
            (200, StatusOutcome::Finished),
            (308, StatusOutcome::Resume),
            (404, StatusOutcome::Aborted),
            (500, StatusOutcome::Failed { status: 500 }),
        ] {
            let conn = CannedConnection::new(vec![Ok(RawResponse::new(status))]);
            let outcome = status_request(&conn, "tok", "https://s/1", 64).await.unwrap();
            assert_eq!(outcome, expected, "status {status}");
        }
    }

    #[tokio::test]
    async fn upload_request_created() {
        let conn = CannedConnection::new(vec![Ok(RawResponse::new(201))]);
        let outcome = upload_request(&conn, "tok", "https://s/1", &metadata(), &[1])
            .await
            .unwrap();
        assert_eq!(outcome, UploadOutcome::Created);
    }

    #[tokio::test]
    async fn unauthorized_short_circuits_every_component() {
        let conn = CannedConnection::new(vec![Ok(RawResponse::new(401))]);
        let err = pre_request(&conn, "tok", &metadata(), 64).await.unwrap_err();
        assert!(matches!(err, UploadError::Unauthorized));

        let conn = CannedConnection::new(vec![Ok(RawResponse::new(401))]);
        let err = status_request(&conn, "tok", "https://s/1", 64).await.unwrap_err();
        assert!(matches!(err, UploadError::Unauthorized));

        let conn = CannedConnection::new(vec![Ok(RawResponse::new(401))]);
        let err = upload_request(&conn, "tok", "https://s/1", &metadata(), &[1])
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Unauthorized));
    }

    #[tokio::test]
    async fn transport_error_passes_through() {
        let conn = CannedConnection::new(vec![Err(UploadError::Transport(
            "connection refused".into(),
        ))]);
        let err = pre_request(&conn, "tok", &metadata(), 64).await.unwrap_err();
        assert!(matches!(err, UploadError::Transport(_)));
    }
}
