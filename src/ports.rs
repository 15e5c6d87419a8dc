//! Ports - capability interfaces between the control core and the host

use std::sync::Arc;
use std::time::Instant;

use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};

// ============================================================================
// CAPABILITY TRAITS
// ============================================================================

/// Supplies the latest scalar reading for a sensor identifier, in the
/// channel's native unit (degrees for rotations, a consistent distance unit
/// for translations). A port that cannot obtain or parse a value reports
/// 0.0; the core treats that the same as a genuine zero offset.
pub trait SensorPort {
    fn read(&mut self, sensor: &str) -> f64;
}

/// Accepts one discrete unit of corrective action per call. May be called
/// zero or many times per tick and must not block materially longer than
/// the tick period.
pub trait ActuatorPort {
    fn press(&mut self, actuator: &str);
}

// ============================================================================
// COMMAND BUS - Hand presses to a consumer thread
// ============================================================================

#[derive(Clone, Debug)]
pub struct ClickCommand {
    pub actuator: String,
    pub issued_at: Instant,
}

/// Bounded crossbeam channel carrying click commands from the scheduler
/// thread to a host-side consumer.
#[derive(Clone)]
pub struct CommandBus {
    pub click_tx: Sender<ClickCommand>,
    pub click_rx: Arc<Receiver<ClickCommand>>,
}

impl CommandBus {
    pub fn new(buffer_size: usize) -> Self {
        let (click_tx, click_rx) = bounded(buffer_size);
        Self {
            click_tx,
            click_rx: Arc::new(click_rx),
        }
    }
}

/// Actuator port that forwards presses onto a `CommandBus`. Sends are
/// non-blocking: a full or disconnected bus drops the command with a
/// warning so a stalled consumer cannot stall the tick loop.
pub struct BusActuator {
    tx: Sender<ClickCommand>,
}

impl BusActuator {
    pub fn new(tx: Sender<ClickCommand>) -> Self {
        Self { tx }
    }
}

impl ActuatorPort for BusActuator {
    fn press(&mut self, actuator: &str) {
        let command = ClickCommand {
            actuator: actuator.to_string(),
            issued_at: Instant::now(),
        };
        match self.tx.try_send(command) {
            Ok(()) => {}
            Err(TrySendError::Full(cmd)) => {
                log::warn!("command bus full, dropping press on {}", cmd.actuator);
            }
            Err(TrySendError::Disconnected(cmd)) => {
                log::warn!("command bus closed, dropping press on {}", cmd.actuator);
            }
        }
    }
}
