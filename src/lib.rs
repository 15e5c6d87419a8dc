pub mod async_impl;
pub mod channel;
pub mod config;
pub mod controller;
pub mod ports;
pub mod scheduler;
pub mod sim;
pub mod telemetry;
pub mod visualization;

pub use channel::{Axis, Channel};
pub use config::{load_config, AutopilotConfig, ChannelConfig, ProfileKind};
pub use controller::{AxisParams, ControlError, Controller};
pub use ports::{ActuatorPort, BusActuator, ClickCommand, CommandBus, SensorPort};
pub use scheduler::{spawn_scheduler, Scheduler, SchedulerStats};
pub use sim::SimVehicle;
pub use telemetry::{DiagnosticLog, MetricsReport, TickMetrics};
