//! Single-axis correction - damped-rate proportional control with click quantization

use std::time::Instant;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// AXIS PARAMETERS - Immutable tuning profiles
// ============================================================================

/// Tuning parameters for one kind of axis. One set is shared by every
/// channel of the same kind; the controller never mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AxisParams {
    /// Proportional gain applied (sign-inverted) to the offset.
    pub correction: f64,
    /// Time constant of the rate filter, in cycles. 0 disables smoothing.
    pub damping_cycles: f64,
    /// Per-offset-magnitude slope of the commanded-rate ceiling.
    pub rate_factor: f64,
    /// Lower bound of the rate ceiling.
    pub rate_min: f64,
    /// Upper bound of the rate ceiling.
    pub rate_max: f64,
}

impl AxisParams {
    /// Roll/pitch/yaw profile (degrees).
    pub const ROTATION: Self = Self {
        correction: 0.4,
        damping_cycles: 0.0,
        rate_factor: 1.5,
        rate_min: 1.0,
        rate_max: f64::INFINITY,
    };

    /// Lateral/vertical translation profile (y, z).
    pub const CENTERING: Self = Self {
        correction: 0.3,
        damping_cycles: 4.0,
        rate_factor: 0.2,
        rate_min: 0.05,
        rate_max: f64::INFINITY,
    };

    /// Closing-distance translation profile (x).
    pub const APPROACH: Self = Self {
        correction: 0.3,
        damping_cycles: 4.0,
        rate_factor: 0.1,
        rate_min: 0.15,
        rate_max: 10.0,
    };

    /// Symmetric ceiling on the commanded rate for a given offset magnitude.
    pub fn rate_limit(&self, offset_abs: f64) -> f64 {
        (offset_abs * self.rate_factor).clamp(self.rate_min, self.rate_max)
    }
}

// ============================================================================
// CONTROL ERROR
// ============================================================================

#[derive(Debug, Error)]
pub enum ControlError {
    /// The clock handed to `correct` did not advance past the previous tick.
    #[error("tick time did not advance (dt = {dt_secs} s)")]
    NonMonotonicTime { dt_secs: f64 },
}

// ============================================================================
// CONTROLLER - Stateful single-axis correction
// ============================================================================

/// Converts a stream of (time, offset) samples into signed whole-click
/// counts. The first call only latches the sample; every later call compares
/// the offset's estimated rate of change against a clamped proportional
/// target and quantizes the gap into unit commands, carrying the fractional
/// remainder forward.
pub struct Controller {
    params: AxisParams,
    previous: Option<(Instant, f64)>,
    rate: f64,
    accumulator: f64,
}

impl Controller {
    pub fn new(params: AxisParams) -> Self {
        Self {
            params,
            previous: None,
            rate: 0.0,
            accumulator: 0.0,
        }
    }

    /// Process one sample and return the number of clicks to issue. The sign
    /// selects the direction. Returns an error (state untouched) if `now`
    /// does not lie strictly after the previous sample's time.
    pub fn correct(&mut self, now: Instant, offset: f64) -> Result<i64, ControlError> {
        let (prev_time, prev_offset) = match self.previous {
            Some(prev) => prev,
            None => {
                self.previous = Some((now, offset));
                return Ok(0);
            }
        };

        let dt = now
            .checked_duration_since(prev_time)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        if dt <= 0.0 {
            return Err(ControlError::NonMonotonicTime { dt_secs: dt });
        }

        let instant_rate = (offset - prev_offset) / dt;
        self.rate = (self.rate * self.params.damping_cycles + instant_rate)
            / (self.params.damping_cycles + 1.0);

        let limit = self.params.rate_limit(offset.abs());
        let target = (offset * -self.params.correction).clamp(-limit, limit);

        let correction = target - self.rate;
        self.accumulator += correction;
        let clicks = self.accumulator.floor();
        self.accumulator -= clicks;

        log::trace!(
            "target {:+.3} rate {:+.3} correction {:+.3} accumulator {:+.3} clicks {:+.0}",
            target,
            self.rate,
            correction,
            self.accumulator,
            clicks
        );

        self.previous = Some((now, offset));
        Ok(clicks as i64)
    }

    pub fn params(&self) -> &AxisParams {
        &self.params
    }

    /// Smoothed estimate of the offset's rate of change.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Fractional click demand carried to the next tick. Always in [0, 1)
    /// after a completed correction.
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    pub fn is_initialized(&self) -> bool {
        self.previous.is_some()
    }
}
