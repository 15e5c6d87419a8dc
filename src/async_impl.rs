//! Tokio variant of the tick loop
//!
//! Same per-tick behavior as `Scheduler::run`, driven by a tokio interval
//! instead of a sleeping thread, for hosts that already run a runtime.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::time::{interval, MissedTickBehavior};

use crate::controller::ControlError;
use crate::scheduler::{Scheduler, SchedulerStats};

pub async fn run_scheduler(
    mut scheduler: Scheduler,
    stats: Arc<SchedulerStats>,
) -> Result<(), ControlError> {
    let mut ticker = interval(scheduler.period());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if stats.shutdown.load(Ordering::Relaxed) {
            log::info!("async scheduler shutting down");
            return Ok(());
        }
        scheduler.run_cycle(&stats)?;
    }
}
