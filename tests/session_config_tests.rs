use std::time::Duration;

use bundle_charts::bundle::MemoryFetcher;
use bundle_charts::config::{ChartFailurePolicy, ChartLayout, InteractionTiming, SessionConfig};
use bundle_charts::error::ChartError;
use bundle_charts::session::{HostElement, SessionLoader};

#[test]
fn session_config_json_round_trip() {
    let config = SessionConfig::default()
        .with_metadata_entry("session.json")
        .with_failure_policy(ChartFailurePolicy::Notice)
        .with_timing(InteractionTiming {
            idle_debounce: Duration::from_millis(200),
            zoom_transition: Duration::from_millis(600),
            reset_transition: Duration::from_millis(100),
        });

    let json = config.to_json_pretty().expect("serialize");
    assert!(json.contains(r#""failure_policy": "notice""#));
    assert!(json.contains(r#""idle_debounce": 200"#));

    let restored = SessionConfig::from_json_str(&json).expect("parse");
    assert_eq!(restored, config);
}

#[test]
fn partial_documents_fall_back_to_defaults() {
    let config =
        SessionConfig::from_json_str(r#"{"layout": {"width": 800}, "timing": {"zoom_transition": 0}}"#)
            .expect("parse");

    assert_eq!(config.metadata_entry, "metadata.json");
    assert_eq!(config.layout.width, 800);
    assert_eq!(config.layout.height, 400);
    assert_eq!(config.layout.plot_width(), 710.0);
    assert_eq!(config.timing.zoom_transition, Duration::ZERO);
    assert_eq!(config.timing.idle_debounce, Duration::from_millis(350));
    assert_eq!(config.failure_policy, ChartFailurePolicy::Omit);
}

#[test]
fn default_layout_leaves_470_by_260_plot_area() {
    let layout = ChartLayout::default();
    assert_eq!(layout.plot_width(), 470.0);
    assert_eq!(layout.plot_height(), 260.0);
    assert!(layout.validate().is_ok());
}

#[test]
fn invalid_config_documents_are_rejected() {
    let err = SessionConfig::from_json_str("{not json").expect_err("must fail");
    assert!(matches!(err, ChartError::InvalidData(_)));

    let err = SessionConfig::from_json_str(r#"{"metadata_entry": ""}"#).expect_err("must fail");
    assert!(matches!(err, ChartError::InvalidData(_)));

    let err = SessionConfig::from_json_str(r#"{"layout": {"height": 100}}"#).expect_err("must fail");
    assert!(matches!(err, ChartError::InvalidViewport { .. }));
}

#[tokio::test]
async fn unusable_layout_fails_the_session() {
    let config = SessionConfig::default().with_layout(ChartLayout {
        width: 50,
        ..ChartLayout::default()
    });
    let loader = SessionLoader::new(MemoryFetcher::new(), config);
    let host = HostElement::new("host");

    let report = loader.load("mem://any", &host).await;
    assert!(matches!(report.error(), Some(ChartError::InvalidViewport { .. })));
    assert!(host.status_text().starts_with("Unable to load charts"));
}
