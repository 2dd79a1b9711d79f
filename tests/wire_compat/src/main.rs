fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use ridelog_protocol::{ContentRange, GeoAnchor, MeasurementMetadata, RequestKind};
    use ridelog_session_store::{OpenSession, ProtocolEntry};

    fn reference_metadata() -> MeasurementMetadata {
        MeasurementMetadata {
            device_id: "3b8f1a77-13b1-4a0f-9f5e-6f2f8f0c4d21".into(),
            measurement_id: 17,
            location_count: 250,
            format_version: "3".into(),
            device_type: "iPhone 14,2".into(),
            os_version: "17.4".into(),
            app_version: "2.1.0".into(),
            length_meters: 1834.6,
            modality: "BICYCLE".into(),
            start_location: Some(GeoAnchor {
                latitude: 51.0504,
                longitude: 13.7373,
                timestamp_ms: 1_700_000_000_000,
            }),
            end_location: Some(GeoAnchor {
                latitude: 51.0601,
                longitude: 13.7512,
                timestamp_ms: 1_700_000_900_000,
            }),
        }
    }

    // --- Collector header fields ---

    #[test]
    fn header_field_names_and_order() {
        let fields = reference_metadata().to_header_fields(4096);
        let rendered: Vec<String> = fields
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect();
        assert_eq!(
            rendered,
            vec![
                "deviceId: 3b8f1a77-13b1-4a0f-9f5e-6f2f8f0c4d21",
                "measurementId: 17",
                "locationCount: 250",
                "formatVersion: 3",
                "deviceType: iPhone 14,2",
                "osVersion: 17.4",
                "appVersion: 2.1.0",
                "length: 4096",
                "modality: BICYCLE",
                "startLocLat: 51.0504",
                "startLocLon: 13.7373",
                "startLocTS: 1700000000000",
                "endLocLat: 51.0601",
                "endLocLon: 13.7512",
                "endLocTS: 1700000900000",
            ]
        );
    }

    // --- Content-Range grammar ---

    #[test]
    fn content_range_probe_shape() {
        assert_eq!(ContentRange::probe(4096).to_string(), "bytes */4096");
    }

    #[test]
    fn content_range_full_shape() {
        assert_eq!(ContentRange::full(4096).to_string(), "bytes 0-4095/4096");
    }

    #[test]
    fn content_range_parses_both_shapes() {
        assert_eq!(
            "bytes */4096".parse::<ContentRange>().unwrap(),
            ContentRange::probe(4096)
        );
        assert_eq!(
            "bytes 0-4095/4096".parse::<ContentRange>().unwrap(),
            ContentRange::full(4096)
        );
    }

    // --- Stable storage codes ---

    #[test]
    fn request_kind_codes() {
        assert_eq!(RequestKind::Status.code(), 0);
        assert_eq!(RequestKind::PreRequest.code(), 1);
        assert_eq!(RequestKind::Upload.code(), 2);
    }

    // --- Persisted session layout ---

    #[test]
    fn open_session_json_layout() {
        let created = Utc.with_ymd_and_hms(2024, 3, 18, 9, 15, 0).unwrap();
        let recorded = Utc.with_ymd_and_hms(2024, 3, 18, 9, 15, 2).unwrap();

        let mut session = OpenSession::new(
            17,
            "https://collector.example.com/v4/measurements/17/sessions/abc",
            created,
        );
        session.protocol_log.push(ProtocolEntry::exchange(
            RequestKind::PreRequest,
            200,
            "session opened",
            recorded,
        ));
        session.protocol_log.push(ProtocolEntry::failure(
            RequestKind::Upload,
            500,
            "collector answered 500",
            recorded,
        ));

        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "measurementId": 17,
                "location": "https://collector.example.com/v4/measurements/17/sessions/abc",
                "createdAt": "2024-03-18T09:15:00Z",
                "protocolLog": [
                    {
                        "kind": 1,
                        "httpStatus": 200,
                        "message": "session opened",
                        "causedError": false,
                        "time": "2024-03-18T09:15:02Z"
                    },
                    {
                        "kind": 2,
                        "httpStatus": 500,
                        "message": "collector answered 500",
                        "causedError": true,
                        "time": "2024-03-18T09:15:02Z"
                    }
                ]
            })
        );
    }

    #[test]
    fn metadata_json_field_names() {
        let value = serde_json::to_value(reference_metadata()).unwrap();
        let object = value.as_object().unwrap();
        for key in [
            "deviceId",
            "measurementId",
            "locationCount",
            "formatVersion",
            "deviceType",
            "osVersion",
            "appVersion",
            "lengthMeters",
            "modality",
            "startLocation",
            "endLocation",
        ] {
            assert!(object.contains_key(key), "missing key {key}");
        }
        assert_eq!(value["startLocation"]["timestampMs"], 1_700_000_000_000i64);
    }
}
