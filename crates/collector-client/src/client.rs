use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, LOCATION};
use ridelog_protocol::{ContentRange, MeasurementMetadata, RawResponse};
use ridelog_uploader::{CollectorConnection, UploadError};
use tracing::debug;

/// HTTP connection to a collector server.
///
/// The pre-request goes to `<base_url>/measurements`; status and upload
/// requests go to the absolute session location the collector assigned.
pub struct CollectorClient {
    http: reqwest::Client,
    base_url: String,
}

impl CollectorClient {
    /// Creates a client for the collector at `base_url`.
    ///
    /// A trailing `/` on the base URL is normalized away. The provided
    /// `http` client should not follow redirects: a 308 status answer
    /// must reach the state machine, not the redirect policy (see
    /// [`default_http_client`]).
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn measurements_url(&self) -> String {
        format!("{}/measurements", self.base_url)
    }
}

/// HTTP client defaults suitable for the handshake: no redirect
/// following, 30 second request timeout.
pub fn default_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(30))
        .build()
        .expect("failed to build HTTP client")
}

/// Sends a prepared request and reduces the response to the status line
/// and `Location` header.
async fn dispatch(request: reqwest::RequestBuilder) -> Result<RawResponse, UploadError> {
    let response = request
        .send()
        .await
        .map_err(|e| UploadError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    debug!(status, "collector answered");

    Ok(match location {
        Some(location) => RawResponse::with_location(status, location),
        None => RawResponse::new(status),
    })
}

impl CollectorConnection for CollectorClient {
    fn send_pre_request(
        &self,
        token: &str,
        metadata: &MeasurementMetadata,
        payload_len: u64,
    ) -> Pin<Box<dyn Future<Output = Result<RawResponse, UploadError>> + Send + '_>> {
        let mut request = self
            .http
            .post(self.measurements_url())
            .header(AUTHORIZATION, format!("Bearer {token}"));
        for (name, value) in metadata.to_header_fields(payload_len) {
            request = request.header(name, value);
        }

        Box::pin(dispatch(request))
    }

    fn send_status_request(
        &self,
        token: &str,
        location: &str,
        payload_len: u64,
    ) -> Pin<Box<dyn Future<Output = Result<RawResponse, UploadError>> + Send + '_>> {
        let request = self
            .http
            .put(location)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(CONTENT_RANGE, ContentRange::probe(payload_len).to_string())
            .header(CONTENT_LENGTH, 0);

        Box::pin(dispatch(request))
    }

    fn send_upload_request(
        &self,
        token: &str,
        location: &str,
        metadata: &MeasurementMetadata,
        payload: &[u8],
    ) -> Pin<Box<dyn Future<Output = Result<RawResponse, UploadError>> + Send + '_>> {
        let total = payload.len() as u64;
        let mut request = self
            .http
            .put(location)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, payload.len())
            .header(CONTENT_RANGE, ContentRange::full(total).to_string());
        for (name, value) in metadata.to_header_fields(total) {
            request = request.header(name, value);
        }
        let request = request.body(payload.to_vec());

        Box::pin(dispatch(request))
    }
}
