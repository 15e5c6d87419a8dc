//! Static configuration - tuning profiles and the channel table

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::channel::Axis;
use crate::controller::AxisParams;

// ============================================================================
// PROFILES AND CHANNEL TABLE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Rotation,
    Centering,
    Approach,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    pub axis: Axis,
    pub sensor: String,
    pub press_positive: String,
    pub press_negative: String,
    pub profile: ProfileKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AutopilotConfig {
    pub tick_interval_ms: u64,
    pub rotation: AxisParams,
    pub centering: AxisParams,
    pub approach: AxisParams,
    pub channels: Vec<ChannelConfig>,
}

impl AutopilotConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn params_for(&self, profile: ProfileKind) -> AxisParams {
        match profile {
            ProfileKind::Rotation => self.rotation,
            ProfileKind::Centering => self.centering,
            ProfileKind::Approach => self.approach,
        }
    }
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        let channel = |axis, sensor: &str, pos: &str, neg: &str, profile| ChannelConfig {
            axis,
            sensor: sensor.to_string(),
            press_positive: pos.to_string(),
            press_negative: neg.to_string(),
            profile,
        };

        Self {
            tick_interval_ms: 100,
            rotation: AxisParams::ROTATION,
            centering: AxisParams::CENTERING,
            approach: AxisParams::APPROACH,
            channels: vec![
                channel(
                    Axis::Roll,
                    "roll-error",
                    "roll-left-button",
                    "roll-right-button",
                    ProfileKind::Rotation,
                ),
                channel(
                    Axis::Pitch,
                    "pitch-error",
                    "pitch-up-button",
                    "pitch-down-button",
                    ProfileKind::Rotation,
                ),
                channel(
                    Axis::Yaw,
                    "yaw-error",
                    "yaw-left-button",
                    "yaw-right-button",
                    ProfileKind::Rotation,
                ),
                channel(
                    Axis::X,
                    "x-range",
                    "translate-backward-button",
                    "translate-forward-button",
                    ProfileKind::Approach,
                ),
                channel(
                    Axis::Y,
                    "y-range",
                    "translate-right-button",
                    "translate-left-button",
                    ProfileKind::Centering,
                ),
                channel(
                    Axis::Z,
                    "z-range",
                    "translate-up-button",
                    "translate-down-button",
                    ProfileKind::Centering,
                ),
            ],
        }
    }
}

// ============================================================================
// LOADING
// ============================================================================

/// Load runtime configuration from a TOML file. A missing file is normal
/// (defaults apply); a malformed file falls back to defaults with a warning
/// so a bad deploy cannot leave the loop without tuning.
pub fn load_config(path: impl AsRef<Path>) -> AutopilotConfig {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(raw) => match toml::from_str(&raw) {
            Ok(config) => {
                log::info!("loaded configuration from {}", path.display());
                config
            }
            Err(err) => {
                log::warn!("ignoring malformed {}: {}", path.display(), err);
                AutopilotConfig::default()
            }
        },
        Err(_) => {
            log::info!("no config at {}, using defaults", path.display());
            AutopilotConfig::default()
        }
    }
}
