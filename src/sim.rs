//! Simulated vehicle - drifting six-axis plant for closed-loop runs
//!
//! Each press changes the rate of change of one axis by a small fixed
//! amount, the way a thruster pulse changes a velocity. The plant only
//! moves when `step` is called, so tests can drive simulated time
//! deterministically while the demo binary steps it from a thread.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::channel::Axis;
use crate::config::{AutopilotConfig, ProfileKind};
use crate::ports::{ActuatorPort, SensorPort};

struct SimAxis {
    axis: Axis,
    sensor: String,
    press_positive: String,
    press_negative: String,
    offset: f64,
    velocity: f64,
    /// Velocity change per press, in units/second.
    click_effect: f64,
    /// Random-walk disturbance on the velocity, units/second^2.
    drift: f64,
    measurement_noise: f64,
    history: Vec<(f64, f64)>,
}

struct SimState {
    rng: StdRng,
    axes: Vec<SimAxis>,
    elapsed_secs: f64,
}

/// Shared handle to the simulated plant. Clones observe the same state, so
/// one clone can serve as the scheduler's sensor port while another applies
/// presses from a consumer thread.
#[derive(Clone)]
pub struct SimVehicle {
    inner: Arc<Mutex<SimState>>,
}

impl SimVehicle {
    /// Build one simulated axis per channel table entry, with identifiers
    /// matching the configuration so the ports line up.
    pub fn from_config(config: &AutopilotConfig, seed: u64) -> Self {
        let axes = config
            .channels
            .iter()
            .map(|entry| {
                let (click_effect, drift, measurement_noise) = match entry.profile {
                    ProfileKind::Rotation => (0.1, 0.02, 0.02),
                    ProfileKind::Approach => (0.05, 0.01, 0.01),
                    ProfileKind::Centering => (0.02, 0.005, 0.005),
                };
                SimAxis {
                    axis: entry.axis,
                    sensor: entry.sensor.clone(),
                    press_positive: entry.press_positive.clone(),
                    press_negative: entry.press_negative.clone(),
                    offset: 0.0,
                    velocity: 0.0,
                    click_effect,
                    drift,
                    measurement_noise,
                    history: Vec::new(),
                }
            })
            .collect();

        Self {
            inner: Arc::new(Mutex::new(SimState {
                rng: StdRng::seed_from_u64(seed),
                axes,
                elapsed_secs: 0.0,
            })),
        }
    }

    pub fn set_offset(&self, axis: Axis, offset: f64) {
        let mut state = self.inner.lock();
        if let Some(sim_axis) = state.axes.iter_mut().find(|a| a.axis == axis) {
            sim_axis.offset = offset;
        }
    }

    pub fn offset(&self, axis: Axis) -> f64 {
        let state = self.inner.lock();
        state
            .axes
            .iter()
            .find(|a| a.axis == axis)
            .map(|a| a.offset)
            .unwrap_or(0.0)
    }

    pub fn offsets(&self) -> Vec<(Axis, f64)> {
        let state = self.inner.lock();
        state.axes.iter().map(|a| (a.axis, a.offset)).collect()
    }

    /// Advance the plant by `dt`: integrate velocities into offsets and
    /// apply a small random-walk disturbance.
    pub fn step(&self, dt: Duration) {
        let dt = dt.as_secs_f64();
        let mut state = self.inner.lock();
        state.elapsed_secs += dt;
        let elapsed = state.elapsed_secs;

        let SimState { rng, axes, .. } = &mut *state;
        for axis in axes.iter_mut() {
            let disturbance = rng.gen_range(-axis.drift..axis.drift);
            axis.velocity += disturbance * dt;
            axis.offset += axis.velocity * dt;
            axis.history.push((elapsed, axis.offset));
        }
    }

    /// True offset trajectory per axis, as (seconds, offset) samples.
    pub fn history(&self) -> Vec<(Axis, Vec<(f64, f64)>)> {
        let state = self.inner.lock();
        state
            .axes
            .iter()
            .map(|a| (a.axis, a.history.clone()))
            .collect()
    }
}

impl SensorPort for SimVehicle {
    fn read(&mut self, sensor: &str) -> f64 {
        let mut state = self.inner.lock();
        let SimState { rng, axes, .. } = &mut *state;
        match axes.iter().find(|a| a.sensor == sensor) {
            Some(axis) => {
                let noise = rng.gen_range(-axis.measurement_noise..axis.measurement_noise);
                axis.offset + noise
            }
            None => {
                log::warn!("unknown sensor {}, reporting 0.0", sensor);
                0.0
            }
        }
    }
}

impl ActuatorPort for SimVehicle {
    fn press(&mut self, actuator: &str) {
        let mut state = self.inner.lock();
        for axis in state.axes.iter_mut() {
            if axis.press_positive == actuator {
                axis.velocity += axis.click_effect;
                return;
            }
            if axis.press_negative == actuator {
                axis.velocity -= axis.click_effect;
                return;
            }
        }
        log::warn!("unknown actuator {}, press dropped", actuator);
    }
}
