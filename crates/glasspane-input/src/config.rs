//! Tracker configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration applied to every tracker created by a manager.
///
/// Serializable so embedders can carry it inside their own settings files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// How long a lifted block keeps reporting as active, in milliseconds.
    ///
    /// Covers the race where the wrapped application polls input in the
    /// same frame the overlay releases a block.
    pub grace_period_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: 125,
        }
    }
}

impl TrackerConfig {
    /// The grace period as a [`Duration`].
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}
