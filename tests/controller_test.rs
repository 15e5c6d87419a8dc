//! Behavioral tests for the single-axis controller

use std::time::{Duration, Instant};

use approx::assert_relative_eq;
use docking_autopilot::{AxisParams, ControlError, Controller};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Profile whose rate ceiling never binds, for tests that target the
/// proportional/quantization path in isolation.
fn unclamped(correction: f64, damping_cycles: f64) -> AxisParams {
    AxisParams {
        correction,
        damping_cycles,
        rate_factor: 1e9,
        rate_min: 0.0,
        rate_max: f64::INFINITY,
    }
}

// ============================================================================
// INITIALIZATION
// ============================================================================

#[test]
fn first_call_latches_and_returns_zero() {
    let mut controller = Controller::new(unclamped(0.5, 0.0));
    assert!(!controller.is_initialized());

    let clicks = controller.correct(Instant::now(), 1234.5).unwrap();

    assert_eq!(clicks, 0, "initializing call must never command clicks");
    assert!(controller.is_initialized());
    assert_eq!(controller.accumulator(), 0.0);
    assert_eq!(controller.rate(), 0.0);
}

#[test]
fn second_call_is_first_to_command() {
    let mut controller = Controller::new(unclamped(0.5, 0.0));
    let t0 = Instant::now();

    assert_eq!(controller.correct(t0, 10.0).unwrap(), 0);
    let clicks = controller.correct(t0 + Duration::from_secs(1), 8.0).unwrap();
    assert_ne!(clicks, 0);
}

// ============================================================================
// STEADY STATE
// ============================================================================

#[test]
fn zero_offset_stays_quiet() {
    let mut controller = Controller::new(unclamped(0.5, 0.0));
    let t0 = Instant::now();
    controller.correct(t0, 0.0).unwrap();

    for i in 1..=100u64 {
        let now = t0 + Duration::from_millis(100 * i);
        assert_eq!(controller.correct(now, 0.0).unwrap(), 0);
        assert_eq!(controller.accumulator(), 0.0);
        assert_eq!(controller.rate(), 0.0);
    }
}

// ============================================================================
// WORKED SCENARIO
// ============================================================================

#[test]
fn worked_scenario_two_negative_clicks() {
    // correction 0.5, no damping, ceiling never binds. Offsets 10 then 8 at
    // dt = 1 s: instant rate -2, target -4, gap -2, so exactly -2 clicks
    // with nothing left in the accumulator.
    let mut controller = Controller::new(unclamped(0.5, 0.0));
    let t0 = Instant::now();

    assert_eq!(controller.correct(t0, 10.0).unwrap(), 0);
    let clicks = controller.correct(t0 + Duration::from_secs(1), 8.0).unwrap();

    assert_eq!(clicks, -2);
    assert_eq!(controller.accumulator(), 0.0);
    assert_relative_eq!(controller.rate(), -2.0);
}

// ============================================================================
// RATE FILTER
// ============================================================================

#[test]
fn no_damping_tracks_instant_rate_exactly() {
    let mut controller = Controller::new(unclamped(0.4, 0.0));
    let t0 = Instant::now();
    controller.correct(t0, 10.0).unwrap();

    let samples = [(1.0, 8.0), (2.0, 5.0), (2.5, 5.5), (4.0, 5.5)];
    let mut prev = (0.0, 10.0);
    for (t, offset) in samples {
        let now = t0 + Duration::from_secs_f64(t);
        controller.correct(now, offset).unwrap();
        let instant_rate = (offset - prev.1) / (t - prev.0);
        assert_eq!(controller.rate(), instant_rate);
        prev = (t, offset);
    }
}

#[test]
fn damping_smooths_the_rate_estimate() {
    let damping = 4.0;
    let mut controller = Controller::new(unclamped(0.3, damping));
    let t0 = Instant::now();
    controller.correct(t0, 0.0).unwrap();

    let mut expected_rate = 0.0;
    let mut prev_offset = 0.0;
    for i in 1..=50u64 {
        let offset = (i as f64 * 0.7).sin() * 5.0;
        let now = t0 + Duration::from_millis(100 * i);
        controller.correct(now, offset).unwrap();

        let instant_rate = (offset - prev_offset) / 0.1;
        expected_rate = (expected_rate * damping + instant_rate) / (damping + 1.0);
        assert_relative_eq!(controller.rate(), expected_rate, max_relative = 1e-9);
        prev_offset = offset;
    }
}

// ============================================================================
// RATE CEILING
// ============================================================================

#[test]
fn large_offset_is_limited_by_rate_max() {
    let params = AxisParams {
        correction: 0.4,
        damping_cycles: 0.0,
        rate_factor: 1.5,
        rate_min: 1.0,
        rate_max: 2.0,
    };
    let mut controller = Controller::new(params);
    let t0 = Instant::now();
    controller.correct(t0, 1000.0).unwrap();

    // Constant offset keeps the rate estimate at zero, so the clicks expose
    // the clamped target directly: raw target -400 capped to -2.
    for i in 1..=5u64 {
        let now = t0 + Duration::from_secs(i);
        assert_eq!(controller.correct(now, 1000.0).unwrap(), -2);
        assert_eq!(controller.accumulator(), 0.0);
    }
}

#[test]
fn small_offset_ceiling_is_floored_by_rate_min() {
    let params = AxisParams {
        correction: 10.0,
        damping_cycles: 0.0,
        rate_factor: 1.5,
        rate_min: 1.0,
        rate_max: 2.0,
    };
    let mut controller = Controller::new(params);
    let t0 = Instant::now();
    controller.correct(t0, 0.1).unwrap();

    // |0.1| * 1.5 = 0.15 lifts to rate_min 1.0; raw target -1.0 survives.
    let clicks = controller.correct(t0 + Duration::from_secs(1), 0.1).unwrap();
    assert_eq!(clicks, -1);
    assert_eq!(controller.accumulator(), 0.0);
}

// ============================================================================
// QUANTIZER
// ============================================================================

#[test]
fn sustained_sub_unit_demand_carries_forward() {
    // Constant offset -0.5 with gain 0.5 demands +0.25 clicks per tick.
    // Over 12 ticks that is exactly 3 whole clicks, at ticks 4, 8 and 12.
    let mut controller = Controller::new(unclamped(0.5, 0.0));
    let t0 = Instant::now();
    controller.correct(t0, -0.5).unwrap();

    let mut issued = Vec::new();
    for i in 1..=12u64 {
        let now = t0 + Duration::from_secs(i);
        issued.push(controller.correct(now, -0.5).unwrap());
    }

    assert_eq!(issued, vec![0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1]);
    assert_eq!(issued.iter().sum::<i64>(), 3);
    assert_eq!(controller.accumulator(), 0.0);
}

#[test]
fn negative_fraction_clicks_early_and_leaves_positive_remainder() {
    // Floor quantization: a -0.25 demand issues one negative click now and
    // carries +0.75, instead of waiting like round-to-nearest would.
    let mut controller = Controller::new(unclamped(0.5, 0.0));
    let t0 = Instant::now();
    controller.correct(t0, 0.5).unwrap();

    let clicks = controller.correct(t0 + Duration::from_secs(1), 0.5).unwrap();
    assert_eq!(clicks, -1);
    assert_eq!(controller.accumulator(), 0.75);
}

#[test]
fn accumulator_stays_in_unit_interval_under_random_walk() {
    let params = AxisParams {
        correction: 0.4,
        damping_cycles: 2.0,
        rate_factor: 1.5,
        rate_min: 1.0,
        rate_max: 10.0,
    };
    let mut controller = Controller::new(params);
    let mut rng = StdRng::seed_from_u64(7);
    let t0 = Instant::now();

    let mut offset = 5.0;
    controller.correct(t0, offset).unwrap();
    for i in 1..=1000u64 {
        offset += rng.gen_range(-0.8..0.8);
        let now = t0 + Duration::from_millis(100 * i);
        controller.correct(now, offset).unwrap();

        let accumulator = controller.accumulator();
        assert!(
            (0.0..1.0).contains(&accumulator),
            "accumulator {} escaped [0, 1) at tick {}",
            accumulator,
            i
        );
    }
}

// ============================================================================
// CLOCK CONTRACT
// ============================================================================

#[test]
fn non_advancing_clock_is_rejected() {
    let mut controller = Controller::new(unclamped(0.5, 0.0));
    let t0 = Instant::now();
    let t1 = t0 + Duration::from_secs(1);

    controller.correct(t0, 10.0).unwrap();
    controller.correct(t1, 9.0).unwrap();

    // Same timestamp again: dt = 0.
    let err = controller.correct(t1, 8.0).unwrap_err();
    assert!(matches!(err, ControlError::NonMonotonicTime { .. }));

    // Regressing clock.
    let err = controller.correct(t0, 8.0).unwrap_err();
    assert!(matches!(err, ControlError::NonMonotonicTime { .. }));

    // State survives the violation; a valid call still works.
    let t2 = t1 + Duration::from_secs(1);
    controller.correct(t2, 8.0).unwrap();
}
