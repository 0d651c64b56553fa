// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Drive a raw pixel-addressable display from an application drawing routine.
//!
//! A [`Session`] owns one [`DeviceSurface`] and an off-screen [`Canvas`] sized
//! to it. [`Session::start`] spawns a paced render loop that, every frame,
//! optionally runs a lower-frequency tick callback, rotates the canvas into
//! the device's mounting [`Orientation`], fingerprints the result, and writes
//! it to the device only when the fingerprint changed.
//!
//! ```no_run
//! # use framebuf_core::{colour, DeviceSurface, FramebufError, Session, SessionConfig};
//! # fn demo<D: DeviceSurface + 'static>(device: D) -> Result<(), FramebufError> {
//! let config = SessionConfig::default().with_rotation(90);
//! let session = Session::open(device, &config)?
//!     .on_tick(|display| display.clear(colour::rgb(0, 0, 64)));
//! let handle = session.start(30)?;
//! // ...
//! handle.stop();
//! # Ok(())
//! # }
//! ```

pub mod canvas;
pub mod colour;
pub mod config;
pub mod device;
pub mod diag;
pub mod display;
pub mod error;
pub mod fingerprint;
pub mod orientation;
pub mod scheduler;
pub mod session;

pub use canvas::Canvas;
pub use colour::Colour;
pub use config::SessionConfig;
pub use device::{Bounds, DeviceSurface};
pub use display::{Display, FlushOutcome, FrameStats};
pub use error::FramebufError;
pub use fingerprint::{ChangeDetector, Fingerprint};
pub use orientation::Orientation;
pub use scheduler::{FramePacer, LoopReport, StopHandle, TickFn, TickGate, MIN_IDLE};
pub use session::{DrawGuard, Session};
