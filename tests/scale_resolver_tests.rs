use approx::assert_abs_diff_eq;
use bundle_charts::core::scale::resolve;
use bundle_charts::core::time::datetime_to_unix_seconds;
use bundle_charts::core::{Bound, CoordinateMap, ScaleKind, axis_ticks, parse_instant};
use bundle_charts::error::ChartError;
use chrono::{TimeZone, Utc};

#[test]
fn linear_bounds_are_used_unchanged() {
    let (map, min, max) = resolve(
        ScaleKind::Linear,
        &Bound::Number(0.0),
        &Bound::Number(10.0),
        (0.0, 470.0),
    )
    .expect("resolves");

    assert_eq!((min, max), (0.0, 10.0));
    assert_eq!(map.domain(), (0.0, 10.0));
    assert_eq!(map.apply(0.0), 0.0);
    assert_eq!(map.apply(10.0), 470.0);
    assert_abs_diff_eq!(map.apply(5.0), 235.0, epsilon = 1e-9);
}

#[test]
fn inverted_pixel_range_maps_larger_values_higher() {
    let map = CoordinateMap::new(ScaleKind::Linear, (0.0, 5.0), (260.0, 0.0)).expect("map");
    assert_eq!(map.apply(0.0), 260.0);
    assert_eq!(map.apply(5.0), 0.0);
    assert_abs_diff_eq!(map.invert(130.0), 2.5, epsilon = 1e-9);
}

#[test]
fn time_bounds_resolve_to_parsed_instants() {
    let (map, min, max) = resolve(
        ScaleKind::Time,
        &Bound::from("2020-01-01"),
        &Bound::from("2020-01-02T12:30:00Z"),
        (0.0, 100.0),
    )
    .expect("resolves");

    let expected_min = datetime_to_unix_seconds(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
    let expected_max =
        datetime_to_unix_seconds(Utc.with_ymd_and_hms(2020, 1, 2, 12, 30, 0).unwrap());
    assert_eq!(min, expected_min);
    assert_eq!(max, expected_max);
    assert_eq!(map.kind(), ScaleKind::Time);
    assert_eq!(map.apply(expected_max), 100.0);
}

#[test]
fn naive_datetime_forms_are_read_as_utc() {
    let expected = Utc.with_ymd_and_hms(2021, 6, 5, 7, 8, 9).unwrap();
    assert_eq!(parse_instant("2021-06-05 07:08:09").expect("space form"), expected);
    assert_eq!(parse_instant("2021-06-05T07:08:09").expect("t form"), expected);
    assert_eq!(
        parse_instant("2021-06-05T09:08:09+02:00").expect("offset form"),
        expected
    );
    assert_eq!(
        parse_instant("2021-06-05 07:08:09.250")
            .expect("fractional form")
            .timestamp_millis(),
        expected.timestamp_millis() + 250
    );
}

#[test]
fn malformed_time_bound_is_validation_error() {
    let err = resolve(
        ScaleKind::Time,
        &Bound::from("2020-13-45"),
        &Bound::from("2020-01-02"),
        (0.0, 100.0),
    )
    .expect_err("must fail");
    assert!(matches!(err, ChartError::Validation(_)));
}

#[test]
fn numeric_time_bounds_are_unix_seconds() {
    let (_, min, max) = resolve(
        ScaleKind::Time,
        &Bound::Number(1_600_000_000.0),
        &Bound::Number(1_600_003_600.0),
        (0.0, 100.0),
    )
    .expect("resolves");
    assert_eq!((min, max), (1_600_000_000.0, 1_600_003_600.0));
}

#[test]
fn linear_text_bounds_must_be_numeric() {
    let (_, min, _) = resolve(
        ScaleKind::Linear,
        &Bound::from(" 2.5 "),
        &Bound::Number(3.0),
        (0.0, 1.0),
    )
    .expect("numeric text accepted");
    assert_eq!(min, 2.5);

    let err = resolve(
        ScaleKind::Linear,
        &Bound::from("2020-01-01"),
        &Bound::Number(3.0),
        (0.0, 1.0),
    )
    .expect_err("must fail");
    assert!(matches!(err, ChartError::Validation(_)));
}

#[test]
fn non_finite_bounds_are_rejected() {
    let err = resolve(
        ScaleKind::Linear,
        &Bound::Number(f64::NAN),
        &Bound::Number(1.0),
        (0.0, 1.0),
    )
    .expect_err("must fail");
    assert!(matches!(err, ChartError::Validation(_)));
}

#[test]
fn equal_bounds_map_to_range_midpoint() {
    let (map, ..) = resolve(
        ScaleKind::Linear,
        &Bound::Number(4.0),
        &Bound::Number(4.0),
        (0.0, 200.0),
    )
    .expect("resolves");
    assert_eq!(map.apply(4.0), 100.0);
    assert_eq!(map.apply(1e9), 100.0);
}

#[test]
fn linear_ticks_cover_declared_domain_with_nice_labels() {
    let map = CoordinateMap::new(ScaleKind::Linear, (0.0, 10.0), (0.0, 470.0)).expect("map");
    let labels: Vec<String> = axis_ticks(map, 10).into_iter().map(|tick| tick.label).collect();
    assert_eq!(
        labels,
        vec!["0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "10"]
    );

    let map = CoordinateMap::new(ScaleKind::Linear, (0.0, 1.0), (0.0, 470.0)).expect("map");
    let ticks = axis_ticks(map, 5);
    assert_eq!(ticks[1].label, "0.2");
}

#[test]
fn time_ticks_use_calendar_labels() {
    let start = datetime_to_unix_seconds(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
    let end = datetime_to_unix_seconds(Utc.with_ymd_and_hms(2020, 1, 8, 0, 0, 0).unwrap());
    let map = CoordinateMap::new(ScaleKind::Time, (start, end), (0.0, 470.0)).expect("map");

    let ticks = axis_ticks(map, 10);
    assert_eq!(ticks.len(), 8);
    assert_eq!(ticks[0].label, "2020-01-01");
    assert_eq!(ticks[7].label, "2020-01-08");

    let end = datetime_to_unix_seconds(Utc.with_ymd_and_hms(2020, 1, 1, 0, 10, 0).unwrap());
    let map = CoordinateMap::new(ScaleKind::Time, (start, end), (0.0, 470.0)).expect("map");
    let ticks = axis_ticks(map, 10);
    assert_eq!(ticks[0].label, "00:00");
    assert_eq!(ticks[1].label, "00:01");
}
