//! Parse a CelesTrak style multi-record payload with CRLF line endings and padded labels

use tle_protocol::*;

const STATIONS: &str = include_str!("../test_fixtures/stations.txt");

#[test]
fn stations_payload() {
    let iss = find_element_set(STATIONS, ISS_LABEL).unwrap();
    assert_eq!(iss.satellite_name, ISS_LABEL);
    assert_eq!(iss.catalog_number(), Some(25544));
    assert!(iss.line1.starts_with("1 25544U"));
    assert!(iss.line2.ends_with("15.72125391563537"));

    for (label, catalog) in [("GEO1", 37481), ("GEO2", 39120)] {
        let tle = find_element_set(STATIONS, label).unwrap();
        assert_eq!(tle.satellite_name, label);
        assert_eq!(tle.catalog_number(), Some(catalog));
    }
}

#[test]
fn stations_payload_missing_label() {
    let err = find_element_set(STATIONS, "CSS (TIANHE)").unwrap_err();
    assert!(matches!(err, ParseError::NotFound { .. }));
}
