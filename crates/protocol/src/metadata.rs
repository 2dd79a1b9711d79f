use serde::{Deserialize, Serialize};

/// Header field names understood by the collector.
///
/// The pre-request and the upload request both carry the full set; absent
/// geo anchors omit their fields entirely.
pub mod fields {
    pub const DEVICE_ID: &str = "deviceId";
    pub const MEASUREMENT_ID: &str = "measurementId";
    pub const LOCATION_COUNT: &str = "locationCount";
    pub const FORMAT_VERSION: &str = "formatVersion";
    pub const DEVICE_TYPE: &str = "deviceType";
    pub const OS_VERSION: &str = "osVersion";
    pub const APP_VERSION: &str = "appVersion";
    pub const LENGTH: &str = "length";
    pub const MODALITY: &str = "modality";
    pub const START_LOC_LAT: &str = "startLocLat";
    pub const START_LOC_LON: &str = "startLocLon";
    pub const START_LOC_TS: &str = "startLocTS";
    pub const END_LOC_LAT: &str = "endLocLat";
    pub const END_LOC_LON: &str = "endLocLon";
    pub const END_LOC_TS: &str = "endLocTS";
}

/// A single GPS fix anchoring one end of a recording.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoAnchor {
    pub latitude: f64,
    pub longitude: f64,
    /// Unix timestamp of the fix in milliseconds.
    pub timestamp_ms: i64,
}

/// Descriptive attributes of one finished measurement.
///
/// Deterministic for a given recording; the collector receives these as
/// header fields on the pre-request and the upload request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementMetadata {
    /// World-unique identifier of the capturing device.
    pub device_id: String,
    /// Device-unique identifier of the measurement.
    pub measurement_id: u64,
    /// Number of geo locations captured during the recording.
    pub location_count: u64,
    /// Version of the payload serialization format.
    pub format_version: String,
    pub device_type: String,
    pub os_version: String,
    pub app_version: String,
    /// Length of the captured track in meters.
    pub length_meters: f64,
    /// Transportation mode the recording started in (e.g. "BICYCLE").
    pub modality: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_location: Option<GeoAnchor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_location: Option<GeoAnchor>,
}

impl MeasurementMetadata {
    /// Renders the metadata as collector header fields.
    ///
    /// `payload_len` becomes the `length` field. Field order is stable so
    /// requests are reproducible byte-for-byte.
    pub fn to_header_fields(&self, payload_len: u64) -> Vec<(&'static str, String)> {
        let mut out = vec![
            (fields::DEVICE_ID, self.device_id.clone()),
            (fields::MEASUREMENT_ID, self.measurement_id.to_string()),
            (fields::LOCATION_COUNT, self.location_count.to_string()),
            (fields::FORMAT_VERSION, self.format_version.clone()),
            (fields::DEVICE_TYPE, self.device_type.clone()),
            (fields::OS_VERSION, self.os_version.clone()),
            (fields::APP_VERSION, self.app_version.clone()),
            (fields::LENGTH, payload_len.to_string()),
            (fields::MODALITY, self.modality.clone()),
        ];
        if let Some(start) = &self.start_location {
            out.push((fields::START_LOC_LAT, start.latitude.to_string()));
            out.push((fields::START_LOC_LON, start.longitude.to_string()));
            out.push((fields::START_LOC_TS, start.timestamp_ms.to_string()));
        }
        if let Some(end) = &self.end_location {
            out.push((fields::END_LOC_LAT, end.latitude.to_string()));
            out.push((fields::END_LOC_LON, end.longitude.to_string()));
            out.push((fields::END_LOC_TS, end.timestamp_ms.to_string()));
        }
        out
    }
}
