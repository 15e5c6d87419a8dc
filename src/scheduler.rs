//! Fixed-tick scheduler - drives every channel once per period

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::channel::Channel;
use crate::config::AutopilotConfig;
use crate::controller::ControlError;
use crate::ports::{ActuatorPort, SensorPort};
use crate::telemetry::{DiagnosticLog, TickMetrics};

// ============================================================================
// SCHEDULER STATS - Shared counters and the shutdown flag
// ============================================================================

pub struct SchedulerStats {
    pub ticks: AtomicU64,
    pub clicks_issued: AtomicU64,
    pub overruns: AtomicU64,
    pub shutdown: AtomicBool,
}

impl SchedulerStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            ticks: AtomicU64::new(0),
            clicks_issued: AtomicU64::new(0),
            overruns: AtomicU64::new(0),
            shutdown: AtomicBool::new(false),
        })
    }
}

// ============================================================================
// SCHEDULER
// ============================================================================

/// Runs an ordered, fixed list of channels at a fixed period on the calling
/// thread. Sensor reads and actuator presses happen inline within the tick,
/// so ports must be bounded-latency; an overrunning tick is counted and the
/// next one starts immediately.
pub struct Scheduler {
    channels: Vec<Channel>,
    sensors: Box<dyn SensorPort + Send>,
    actuators: Box<dyn ActuatorPort + Send>,
    period: Duration,
    metrics: TickMetrics,
    diagnostics: DiagnosticLog,
    last_tick: Option<Instant>,
}

impl Scheduler {
    pub fn new(
        channels: Vec<Channel>,
        sensors: Box<dyn SensorPort + Send>,
        actuators: Box<dyn ActuatorPort + Send>,
        period: Duration,
        metrics: TickMetrics,
        diagnostics: DiagnosticLog,
    ) -> Self {
        Self {
            channels,
            sensors,
            actuators,
            period,
            metrics,
            diagnostics,
            last_tick: None,
        }
    }

    /// Build the channel list from the configuration table and wrap it with
    /// the given ports.
    pub fn from_config(
        config: &AutopilotConfig,
        sensors: Box<dyn SensorPort + Send>,
        actuators: Box<dyn ActuatorPort + Send>,
        metrics: TickMetrics,
        diagnostics: DiagnosticLog,
    ) -> Self {
        let channels = config
            .channels
            .iter()
            .map(|entry| {
                Channel::new(
                    entry.axis,
                    entry.sensor.clone(),
                    entry.press_positive.clone(),
                    entry.press_negative.clone(),
                    config.params_for(entry.profile),
                )
            })
            .collect();
        Self::new(channels, sensors, actuators, config.tick_interval(), metrics, diagnostics)
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Run every channel once, in table order. Controllers require strictly
    /// increasing tick times, so a `now` that has not advanced past the
    /// previous tick is skipped here instead of being forwarded to them.
    /// Returns the total number of clicks issued across all channels.
    pub fn tick(&mut self, now: Instant) -> Result<u64, ControlError> {
        if let Some(last) = self.last_tick {
            if now <= last {
                log::warn!("tick clock did not advance, skipping cycle");
                return Ok(0);
            }
        }

        let mut issued = 0u64;
        for channel in &mut self.channels {
            let start = Instant::now();
            let clicks = channel.control(now, self.sensors.as_mut(), self.actuators.as_mut())?;
            self.metrics.record_control(start.elapsed());
            issued += clicks.unsigned_abs();
        }

        self.last_tick = Some(now);
        Ok(issued)
    }

    /// One full cycle of the periodic loop: tick, account, measure.
    pub(crate) fn run_cycle(&mut self, stats: &SchedulerStats) -> Result<Duration, ControlError> {
        let cycle_start = Instant::now();
        let issued = self.tick(cycle_start)?;

        let tick_number = stats.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        stats.clicks_issued.fetch_add(issued, Ordering::Relaxed);

        let elapsed = cycle_start.elapsed();
        self.metrics.record_tick(elapsed);

        if tick_number % 50 == 0 {
            self.diagnostics.write(format!(
                "tick {}: {} clicks issued, cycle time {:?}",
                tick_number, issued, elapsed
            ));
        }
        Ok(elapsed)
    }

    /// Blocking fixed-period loop. Returns when the shutdown flag is set or
    /// a controller reports a contract violation.
    pub fn run(&mut self, stats: &SchedulerStats) -> Result<(), ControlError> {
        loop {
            if stats.shutdown.load(Ordering::Relaxed) {
                log::info!("scheduler shutting down");
                return Ok(());
            }

            let elapsed = self.run_cycle(stats)?;

            if elapsed < self.period {
                thread::sleep(self.period - elapsed);
            } else {
                stats.overruns.fetch_add(1, Ordering::Relaxed);
                log::warn!("tick overran period: {:?} > {:?}", elapsed, self.period);
            }
        }
    }
}

/// Spawn the scheduler loop on its own thread, sharing counters and the
/// shutdown flag with the caller.
pub fn spawn_scheduler(
    mut scheduler: Scheduler,
) -> (thread::JoinHandle<Result<(), ControlError>>, Arc<SchedulerStats>) {
    let stats = SchedulerStats::new();
    let stats_clone = stats.clone();
    let handle = thread::spawn(move || scheduler.run(&stats_clone));
    (handle, stats)
}
