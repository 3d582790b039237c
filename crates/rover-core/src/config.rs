//! Controller configuration
//!
//! All timing knobs in one place. Defaults match the reference console
//! behavior: 1 s heartbeat polling, 2 s disconnect debounce, immediate
//! recovery, 5 s recovery banner, sync progress in +15 point steps
//! every 300 ms.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing configuration for a [`ModeController`](crate::ModeController).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Period between connectivity samples.
    #[serde(default = "default_poll_interval", with = "duration_millis")]
    pub poll_interval: Duration,

    /// Staleness past which `Connected` demotes to `Degraded`.
    #[serde(default = "default_disconnect_threshold", with = "duration_millis")]
    pub disconnect_threshold: Duration,

    /// How long the "connection restored" banner stays visible after a
    /// recovery transition, independent of sync completion.
    #[serde(default = "default_banner_duration", with = "duration_millis")]
    pub banner_duration: Duration,

    /// Period between sync progress steps.
    #[serde(default = "default_sync_tick", with = "duration_millis")]
    pub sync_tick: Duration,

    /// Percentage points added per sync step.
    #[serde(default = "default_sync_step")]
    pub sync_step: u8,
}

const fn default_poll_interval() -> Duration {
    Duration::from_secs(1)
}

const fn default_disconnect_threshold() -> Duration {
    Duration::from_millis(2000)
}

const fn default_banner_duration() -> Duration {
    Duration::from_millis(5000)
}

const fn default_sync_tick() -> Duration {
    Duration::from_millis(300)
}

const fn default_sync_step() -> u8 {
    15
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            disconnect_threshold: default_disconnect_threshold(),
            banner_duration: default_banner_duration(),
            sync_tick: default_sync_tick(),
            sync_step: default_sync_step(),
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
