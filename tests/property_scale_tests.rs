use bundle_charts::core::ticks::linear_ticks;
use bundle_charts::core::{CoordinateMap, ScaleKind, axis_ticks};
use proptest::prelude::*;

proptest! {
    #[test]
    fn linear_map_round_trip_property(
        domain_start in -1_000_000.0f64..1_000_000.0,
        domain_span in 0.001f64..1_000_000.0,
        value_factor in 0.0f64..1.0
    ) {
        let domain_end = domain_start + domain_span;
        let value = domain_start + value_factor * domain_span;

        let map = CoordinateMap::new(ScaleKind::Linear, (domain_start, domain_end), (0.0, 470.0))
            .expect("valid map");
        let recovered = map.invert(map.apply(value));

        prop_assert!((recovered - value).abs() <= 1e-6 * domain_span.max(1.0));
    }

    #[test]
    fn inverted_range_round_trip_property(
        domain_start in -1_000.0f64..1_000.0,
        domain_span in 0.001f64..10_000.0,
        pixel in 0.0f64..260.0
    ) {
        let map = CoordinateMap::new(
            ScaleKind::Linear,
            (domain_start, domain_start + domain_span),
            (260.0, 0.0),
        )
        .expect("valid map");

        let recovered = map.apply(map.invert(pixel));
        prop_assert!((recovered - pixel).abs() <= 1e-6);
    }

    #[test]
    fn map_is_monotonic_property(
        domain_start in -1_000_000.0f64..1_000_000.0,
        domain_span in 0.001f64..1_000_000.0,
        a in 0.0f64..1.0,
        b in 0.0f64..1.0
    ) {
        let map = CoordinateMap::new(
            ScaleKind::Time,
            (domain_start, domain_start + domain_span),
            (0.0, 470.0),
        )
        .expect("valid map");
        let (low, high) = if a <= b { (a, b) } else { (b, a) };

        let low_px = map.apply(domain_start + low * domain_span);
        let high_px = map.apply(domain_start + high * domain_span);
        prop_assert!(low_px <= high_px + 1e-9);
    }

    #[test]
    fn linear_ticks_ascend_inside_domain_property(
        start in -10_000.0f64..10_000.0,
        span in 0.01f64..10_000.0,
        count in 1usize..20
    ) {
        let end = start + span;
        let ticks = linear_ticks(start, end, count);
        let slack = span * 1e-9;

        prop_assert!(ticks.windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert!(ticks.iter().all(|tick| *tick >= start - slack && *tick <= end + slack));
    }

    #[test]
    fn time_ticks_ascend_inside_domain_property(
        start in 0.0f64..2_000_000_000.0,
        span in 10.0f64..400_000_000.0
    ) {
        let map = CoordinateMap::new(ScaleKind::Time, (start, start + span), (0.0, 470.0))
            .expect("valid map");
        let ticks = axis_ticks(map, 10);

        prop_assert!(ticks.windows(2).all(|pair| pair[0].value < pair[1].value));
        prop_assert!(ticks
            .iter()
            .all(|tick| tick.value >= start - 1e-6 && tick.value <= start + span + 1e-6));
        prop_assert!(ticks.iter().all(|tick| !tick.label.is_empty()));
    }
}
