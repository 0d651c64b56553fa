// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Session configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::colour::{self, Colour};
use crate::error::FramebufError;
use crate::orientation::Orientation;

/// Read-only settings for one session, fixed once the session is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Counter-clockwise rotation applied to each composed frame, in degrees.
    /// Multiples of 90 take an exact fast path.
    pub rotate: i32,
    /// Minimum gap between tick callbacks in milliseconds (0 ticks every frame).
    pub tick_interval_ms: u64,
    /// Hex colour used for pixels left uncovered by a non-right-angle rotation.
    pub rotate_fill: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rotate: 0,
            tick_interval_ms: 0,
            rotate_fill: colour::to_hex(colour::BLACK),
        }
    }
}

impl SessionConfig {
    /// Deserialize a config from a JSON document. Missing fields keep their defaults.
    pub fn from_json(bytes: &[u8]) -> Result<Self, FramebufError> {
        serde_json::from_slice(bytes)
            .map_err(|e| FramebufError::invalid(format!("config document: {e}")))
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<Vec<u8>, FramebufError> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| FramebufError::invalid(format!("config document: {e}")))
    }

    /// Set the rotation angle.
    pub fn with_rotation(mut self, degrees: i32) -> Self {
        self.rotate = degrees;
        self
    }

    /// Set the tick interval (truncated to whole milliseconds).
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the rotation fill colour.
    pub fn with_rotate_fill(mut self, fill: Colour) -> Self {
        self.rotate_fill = colour::to_hex(fill);
        self
    }

    /// Tick interval as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Orientation transform selected by `rotate`.
    pub fn orientation(&self) -> Orientation {
        Orientation::from_degrees(self.rotate)
    }

    /// Parsed rotation fill colour.
    pub fn fill_colour(&self) -> Result<Colour, FramebufError> {
        colour::parse_hex(&self.rotate_fill)
    }
}
