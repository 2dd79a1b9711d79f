//! Transport seam to the collector.

use std::future::Future;
use std::pin::Pin;

use ridelog_protocol::{MeasurementMetadata, RawResponse};

use crate::error::UploadError;

/// Abstract connection to the collector server.
///
/// `ridelog-collector-client` implements this trait over HTTP; tests use
/// mocks with canned responses. Implementations send exactly one request
/// per call, never retry, and never interpret status codes: they hand
/// back the raw status and the `Location` header for the state machine
/// to judge. Borrowed arguments must be copied into the returned future
/// before any suspension.
pub trait CollectorConnection: Send + Sync {
    /// Announces a measurement, asking the collector to open an upload
    /// session for it.
    fn send_pre_request(
        &self,
        token: &str,
        metadata: &MeasurementMetadata,
        payload_len: u64,
    ) -> Pin<Box<dyn Future<Output = Result<RawResponse, UploadError>> + Send + '_>>;

    /// Probes an open session for how much payload the collector holds.
    fn send_status_request(
        &self,
        token: &str,
        location: &str,
        payload_len: u64,
    ) -> Pin<Box<dyn Future<Output = Result<RawResponse, UploadError>> + Send + '_>>;

    /// Transmits the payload to an open session.
    fn send_upload_request(
        &self,
        token: &str,
        location: &str,
        metadata: &MeasurementMetadata,
        payload: &[u8],
    ) -> Pin<Box<dyn Future<Output = Result<RawResponse, UploadError>> + Send + '_>>;
}
