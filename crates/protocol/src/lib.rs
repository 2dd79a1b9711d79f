//! Wire protocol types for the resumable collector upload handshake.
//!
//! The collector speaks a Google-Media-Upload-style protocol in three
//! phases: a pre-request announcing a measurement, a status request
//! probing how much of an open session the server already holds, and the
//! upload request carrying the payload. This crate defines the vocabulary
//! shared by the session store, the uploader, and the HTTP client:
//! measurement metadata and its header rendering, the `Content-Range`
//! value grammar, and the typed outcomes of each phase.

mod metadata;
mod outcome;
mod range;

pub use metadata::{GeoAnchor, MeasurementMetadata, fields};
pub use outcome::{
    PreRequestOutcome, RawResponse, RequestKind, StatusOutcome, UploadOutcome,
};
pub use range::{ContentRange, RangeParseError};
