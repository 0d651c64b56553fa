// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error taxonomy shared by sessions, devices and the render loop.

use std::io;
use thiserror::Error;

/// Errors raised by framebuffer sessions and device adapters.
#[derive(Debug, Error)]
pub enum FramebufError {
    /// The device could not be acquired.
    #[error("could not open framebuffer {device}: {source}")]
    DeviceOpen {
        /// Device identifier (usually the device node path).
        device: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The pixel surface could not be derived from an opened device.
    #[error("could not init framebuffer: {0}")]
    DeviceInit(String),
    /// Writing a frame to the device failed. Fatal to the render loop.
    #[error("could not write frame to device: {0}")]
    DeviceWrite(#[source] io::Error),
    /// Nonsensical input (frame rate, colour, configuration document).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// The operation needs the render loop to be stopped first.
    #[error("render loop is still running")]
    LoopRunning,
    /// The render loop thread panicked.
    #[error("render loop panicked")]
    LoopPanicked,
    /// The random-fill diagnostic hit a write error other than end-of-device.
    #[error("could not write random bytes: {0}")]
    Diagnostic(#[source] io::Error),
}

impl FramebufError {
    /// Shorthand for [`FramebufError::InvalidConfiguration`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// True for errors that end a render loop rather than a single call.
    pub fn is_fatal_to_loop(&self) -> bool {
        matches!(self, Self::DeviceWrite(_) | Self::LoopPanicked)
    }
}
