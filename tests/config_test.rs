//! Settings and configuration tests.

use ridetrack::location::types::AccuracyTier;
use ridetrack::recording::types::AutoPauseSettings;
use ridetrack::storage::config::{RecordingSettings, Units};
use std::time::Duration;

#[test]
fn unit_conversions() {
    let (kmh, unit) = Units::Metric.convert_speed(5.0);
    assert!((kmh - 18.0).abs() < 0.01);
    assert_eq!(unit, "km/h");

    let (mph, unit) = Units::Imperial.convert_speed(5.0);
    assert!((mph - 11.18).abs() < 0.01);
    assert_eq!(unit, "mph");

    let (km, unit) = Units::Metric.convert_distance(2500.0);
    assert!((km - 2.5).abs() < 1e-9);
    assert_eq!(unit, "km");

    let (mi, unit) = Units::Imperial.convert_distance(1609.344);
    assert!((mi - 1.0).abs() < 1e-9);
    assert_eq!(unit, "mi");
}

#[test]
fn accuracy_tier_sets_the_fix_interval() {
    assert_eq!(AccuracyTier::High.fix_interval(), Duration::from_secs(1));
    assert_eq!(
        AccuracyTier::BatterySaver.fix_interval(),
        Duration::from_secs(4)
    );
}

#[test]
fn auto_pause_threshold_is_clamped_to_the_valid_range() {
    let low = AutoPauseSettings {
        enabled: true,
        threshold_minutes: 0,
    };
    assert_eq!(low.threshold(), Duration::from_secs(60));

    let high = AutoPauseSettings {
        enabled: true,
        threshold_minutes: 200,
    };
    assert_eq!(high.threshold(), Duration::from_secs(15 * 60));

    let mid = AutoPauseSettings {
        enabled: true,
        threshold_minutes: 5,
    };
    assert_eq!(mid.threshold(), Duration::from_secs(300));
}

#[test]
fn recording_settings_roundtrip_through_toml() {
    let settings = RecordingSettings {
        units: Units::Imperial,
        accuracy: AccuracyTier::BatterySaver,
        auto_pause: AutoPauseSettings {
            enabled: false,
            threshold_minutes: 7,
        },
    };

    let serialized = toml::to_string(&settings).unwrap();
    let parsed: RecordingSettings = toml::from_str(&serialized).unwrap();
    assert_eq!(parsed, settings);
}
