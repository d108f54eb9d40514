//! Integration tests for mock hardware implementations
//!
//! These tests verify that the simulated servo, LED and photodiode implement
//! the capability traits and behave like the real bench.

use polscan::config::SimulationConfig;
use polscan::hardware::capabilities::{Actuator, Detector, LightSource, MAX_INTENSITY};
use polscan::hardware::mock::{
    MalusModel, MockActuator, MockBench, MockDetector, MockLightSource,
};
use std::time::Duration;
use tokio::time::Instant;

// =============================================================================
// MockActuator Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_mock_actuator_rejects_out_of_range() {
    let actuator = MockActuator::with_angle(30);

    let err = actuator
        .set_position(181, Duration::ZERO)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("181"));
    assert_eq!(actuator.angle().await, 30, "failed move must not change angle");
    assert!(actuator.moves().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_mock_actuator_home_uses_given_settle() {
    let actuator = MockActuator::with_angle(120);
    let settle = Duration::from_secs(1);

    let start = Instant::now();
    actuator.home(settle).await.unwrap();

    assert!(start.elapsed() >= settle);
    assert_eq!(actuator.angle().await, 0);
    let moves = actuator.moves().await;
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].angle_deg, 0);
    assert_eq!(moves[0].settle, settle);
}

// =============================================================================
// MockDetector Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_mock_detector_follows_actuator_and_light() {
    let actuator = MockActuator::new();
    let light = MockLightSource::new();
    let model = MalusModel {
        extinction_angle_deg: 0.0,
        max_intensity: 800,
        dark_level: 10,
        noise_amplitude: 0,
    };
    let detector = MockDetector::malus(&actuator, &light, model);

    // Dark while the LED is off, whatever the angle
    actuator.set_position(90, Duration::ZERO).await.unwrap();
    assert_eq!(detector.read_intensity().await.unwrap(), 10);

    light.turn_on().await.unwrap();
    assert_eq!(detector.read_intensity().await.unwrap(), 800);

    actuator.set_position(0, Duration::ZERO).await.unwrap();
    assert_eq!(detector.read_intensity().await.unwrap(), 10);

    actuator.set_position(180, Duration::ZERO).await.unwrap();
    assert!(detector.read_intensity().await.unwrap() <= 11);

    assert_eq!(detector.read_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_mock_detector_noise_stays_in_range() {
    let actuator = MockActuator::new();
    let light = MockLightSource::with_state(true);
    let model = MalusModel {
        extinction_angle_deg: 0.0,
        max_intensity: MAX_INTENSITY,
        dark_level: 0,
        noise_amplitude: 50,
    };
    let detector = MockDetector::malus(&actuator, &light, model);

    for angle in [0, 90] {
        actuator.set_position(angle, Duration::ZERO).await.unwrap();
        for _ in 0..200 {
            let value = detector.read_intensity().await.unwrap();
            assert!(value <= MAX_INTENSITY);
        }
    }
}

// =============================================================================
// MockBench Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_mock_bench_instruments_share_state() {
    let config = SimulationConfig {
        noise_amplitude: 0,
        ..SimulationConfig::default()
    };
    let bench = MockBench::new(&config);
    let instruments = bench.instruments();

    instruments.light.turn_on().await.unwrap();
    instruments
        .actuator
        .set_position(90, Duration::ZERO)
        .await
        .unwrap();

    assert!(bench.light.is_on().await.unwrap());
    assert_eq!(bench.actuator.angle().await, 90);
    assert_eq!(
        instruments.detector.read_intensity().await.unwrap(),
        config.max_intensity
    );
    assert_eq!(bench.detector.read_count(), 1);
}
