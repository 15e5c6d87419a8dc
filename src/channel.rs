//! Channel - binds one controller to a sensor and a pair of actuators

use std::time::Instant;

use serde::Deserialize;

use crate::controller::{AxisParams, ControlError, Controller};
use crate::ports::{ActuatorPort, SensorPort};

// ============================================================================
// AXIS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Roll,
    Pitch,
    Yaw,
    X,
    Y,
    Z,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Roll => write!(f, "roll"),
            Axis::Pitch => write!(f, "pitch"),
            Axis::Yaw => write!(f, "yaw"),
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

// ============================================================================
// CHANNEL
// ============================================================================

/// One correction channel: a sensor identifier, an actuator identifier per
/// direction, and an exclusively-owned controller.
pub struct Channel {
    axis: Axis,
    sensor: String,
    press_positive: String,
    press_negative: String,
    controller: Controller,
}

impl Channel {
    pub fn new(
        axis: Axis,
        sensor: impl Into<String>,
        press_positive: impl Into<String>,
        press_negative: impl Into<String>,
        params: AxisParams,
    ) -> Self {
        Self {
            axis,
            sensor: sensor.into(),
            press_positive: press_positive.into(),
            press_negative: press_negative.into(),
            controller: Controller::new(params),
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Run one correction cycle: read the offset, feed it to the controller
    /// and translate the signed click count into directional presses.
    /// Returns the signed count for telemetry.
    pub fn control(
        &mut self,
        now: Instant,
        sensors: &mut dyn SensorPort,
        actuators: &mut dyn ActuatorPort,
    ) -> Result<i64, ControlError> {
        let offset = sensors.read(&self.sensor);
        let clicks = self.controller.correct(now, offset)?;

        if clicks > 0 {
            for _ in 0..clicks {
                actuators.press(&self.press_positive);
            }
        } else if clicks < 0 {
            for _ in 0..clicks.unsigned_abs() {
                actuators.press(&self.press_negative);
            }
        }

        if clicks != 0 {
            log::debug!("{}: offset {:+.3} -> {} clicks", self.axis, offset, clicks);
        }
        Ok(clicks)
    }
}
