//! Seam to the host's recording storage.

use ridelog_protocol::MeasurementMetadata;

use crate::error::UploadError;

/// One finished recording, as seen by the uploader.
///
/// Implemented by the host on top of its trip storage. The uploader only
/// ever reads the payload and metadata once per attempt sequence (the
/// [`Upload`](crate::Upload) caches both) and flags the recording when
/// the collector confirmed receipt.
pub trait Measurement: Send + Sync {
    /// Device-unique identifier of the recording. Stable across process
    /// restarts; the session registry keys on it.
    fn id(&self) -> u64;

    /// Descriptive attributes for the collector.
    ///
    /// Fails with [`UploadError::Data`] when a required field (app
    /// version, modality, device descriptors) is unavailable.
    fn metadata(&self) -> Result<MeasurementMetadata, UploadError>;

    /// The serialized, compressed payload bytes.
    ///
    /// Fails with [`UploadError::Data`] on serialization problems.
    fn payload(&self) -> Result<Vec<u8>, UploadError>;

    /// Marks the recording as synchronized and no longer eligible for
    /// upload. Must be idempotent.
    fn mark_synchronized(&self) -> Result<(), UploadError>;
}
