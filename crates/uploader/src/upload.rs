//! The transmittable unit: one measurement on its way to the collector.

use std::fmt;
use std::sync::Arc;

use ridelog_protocol::MeasurementMetadata;

use crate::error::UploadError;
use crate::measurement::Measurement;

/// One measurement's upload attempt sequence.
///
/// Wraps the [`Measurement`] seam with compute-once caches for metadata
/// and payload, the failed-attempt counter, and the session location once
/// one is known. The value is moved into
/// [`Uploader::upload`](crate::Uploader::upload) and returned on success,
/// so all mutation happens inside that owned value, never through shared
/// references across await points.
pub struct Upload {
    measurement: Arc<dyn Measurement>,
    metadata: Option<MeasurementMetadata>,
    payload: Option<Vec<u8>>,
    failed_uploads: u32,
    location: Option<String>,
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("id", &self.measurement.id())
            .field("metadata", &self.metadata)
            .field("payload", &self.payload)
            .field("failed_uploads", &self.failed_uploads)
            .field("location", &self.location)
            .finish()
    }
}

impl Upload {
    pub fn new(measurement: Arc<dyn Measurement>) -> Self {
        Self {
            measurement,
            metadata: None,
            payload: None,
            failed_uploads: 0,
            location: None,
        }
    }

    /// Identifier of the backing measurement.
    pub fn id(&self) -> u64 {
        self.measurement.id()
    }

    /// Metadata of the backing measurement, computed once and cached.
    pub fn metadata(&mut self) -> Result<&MeasurementMetadata, UploadError> {
        match self.metadata {
            Some(ref metadata) => Ok(metadata),
            None => {
                let metadata = self.measurement.metadata()?;
                Ok(self.metadata.insert(metadata))
            }
        }
    }

    /// Payload bytes of the backing measurement, computed once and cached.
    pub fn payload(&mut self) -> Result<&[u8], UploadError> {
        match self.payload {
            Some(ref payload) => Ok(payload),
            None => {
                let payload = self.measurement.payload()?;
                Ok(self.payload.insert(payload))
            }
        }
    }

    /// Marks the backing measurement as synchronized.
    pub fn mark_synchronized(&self) -> Result<(), UploadError> {
        self.measurement.mark_synchronized()
    }

    /// Number of failed upload requests in this attempt sequence.
    pub fn failed_uploads(&self) -> u32 {
        self.failed_uploads
    }

    /// Collector-assigned session location, once one is known.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub(crate) fn set_location(&mut self, location: impl Into<String>) {
        self.location = Some(location.into());
    }

    pub(crate) fn clear_location(&mut self) {
        self.location = None;
    }

    /// Bumps the failure counter and returns the new value.
    pub(crate) fn note_failed_upload(&mut self) -> u32 {
        self.failed_uploads += 1;
        self.failed_uploads
    }

    /// Resets the failure counter; on success and on giving up.
    pub(crate) fn reset_failed_uploads(&mut self) {
        self.failed_uploads = 0;
    }
}
