// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Device port: the physical pixel buffer a session writes frames into.
//!
//! Adapters (Linux fbdev, in-memory fakes) implement [`DeviceSurface`]; the
//! session owns exactly one for its lifetime and releases it on close.

use std::io;

use image::RgbaImage;

use crate::error::FramebufError;

/// Physical device geometry in pixels, before any rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    /// Visible width.
    pub width: u32,
    /// Visible height.
    pub height: u32,
}

impl Bounds {
    /// Construct bounds.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels covered.
    pub fn area(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Port implemented by every display device.
pub trait DeviceSurface: Send {
    /// Device geometry as reported by the hardware.
    fn bounds(&self) -> Bounds;

    /// Overwrite the device with `frame`.
    ///
    /// Pixels in the overlap of the frame and the device bounds are replaced
    /// unconditionally (no alpha blending); the rest keep their value.
    fn write_frame(&mut self, frame: &RgbaImage) -> Result<(), FramebufError>;

    /// Raw byte-stream write at `offset`, used only by diagnostics.
    ///
    /// Returns the number of bytes accepted. Running past the end of the
    /// device must surface as `Ok(0)` or an `io::ErrorKind::StorageFull` /
    /// `FileTooLarge` error.
    fn write_raw_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<usize>;
}

impl<D: DeviceSurface + ?Sized> DeviceSurface for Box<D> {
    fn bounds(&self) -> Bounds {
        (**self).bounds()
    }

    fn write_frame(&mut self, frame: &RgbaImage) -> Result<(), FramebufError> {
        (**self).write_frame(frame)
    }

    fn write_raw_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<usize> {
        (**self).write_raw_at(offset, bytes)
    }
}
