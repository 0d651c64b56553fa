// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Display state owned by a session: device, canvas, orientation and the
//! change detector, plus the draw/flush step the render loop runs each frame.

use tracing::{debug, trace};

use crate::canvas::Canvas;
use crate::colour::Colour;
use crate::device::{Bounds, DeviceSurface};
use crate::error::FramebufError;
use crate::fingerprint::{ChangeDetector, Fingerprint};
use crate::orientation::Orientation;

/// Result of one draw/flush step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// The frame differed from the last one and was written to the device.
    Written(Fingerprint),
    /// The frame matched the last written frame; the device was not touched.
    Skipped,
}

/// Counters over the lifetime of a display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Draw/flush steps attempted.
    pub flushes: u64,
    /// Steps that wrote to the device.
    pub writes: u64,
    /// Steps skipped because content was unchanged.
    pub skipped: u64,
}

/// Everything the render loop and tick callback touch, behind one lock.
pub struct Display<D> {
    device: D,
    canvas: Canvas,
    orientation: Orientation,
    fill: Colour,
    detector: ChangeDetector,
    stats: FrameStats,
}

impl<D: DeviceSurface> Display<D> {
    /// Wrap a device with a canvas sized to its un-rotated bounds.
    pub fn new(device: D, orientation: Orientation, fill: Colour) -> Result<Self, FramebufError> {
        let bounds = device.bounds();
        if bounds.is_empty() {
            return Err(FramebufError::DeviceInit(format!(
                "device reports empty bounds {}x{}",
                bounds.width, bounds.height
            )));
        }
        Ok(Self {
            canvas: Canvas::new(bounds.width, bounds.height),
            device,
            orientation,
            fill,
            detector: ChangeDetector::new(),
            stats: FrameStats::default(),
        })
    }

    /// Physical device bounds. Rotation never changes this.
    pub fn bounds(&self) -> Bounds {
        self.device.bounds()
    }

    /// Reset the canvas to a solid colour. The device is updated on the next flush.
    pub fn clear(&mut self, colour: Colour) {
        self.canvas.fill(colour);
    }

    /// Make the next flush write even if the content is unchanged.
    pub fn force_redraw(&mut self) {
        self.detector.reset();
    }

    /// Canvas to draw on.
    pub fn canvas(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// Read-only canvas view.
    pub fn canvas_ref(&self) -> &Canvas {
        &self.canvas
    }

    /// Orientation applied to every frame.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Frame counters.
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Fingerprint of the last frame written, or the sentinel.
    pub fn last_fingerprint(&self) -> Fingerprint {
        self.detector.last()
    }

    /// Borrow the device.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Mutably borrow the device.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Give the device back, dropping the canvas.
    pub fn into_device(self) -> D {
        self.device
    }

    /// Transform the canvas, fingerprint the result and write it if it changed.
    pub fn flush(&mut self) -> Result<FlushOutcome, FramebufError> {
        self.stats.flushes += 1;
        let frame = self.orientation.apply(self.canvas.raster(), self.fill);
        let fingerprint = Fingerprint::of(&frame);
        if !self.detector.is_changed(fingerprint) {
            self.stats.skipped += 1;
            trace!(%fingerprint, "frame unchanged");
            return Ok(FlushOutcome::Skipped);
        }
        self.device.write_frame(&frame)?;
        self.detector.commit(fingerprint);
        self.stats.writes += 1;
        debug!(%fingerprint, width = frame.width(), height = frame.height(), "frame written");
        Ok(FlushOutcome::Written(fingerprint))
    }
}

impl<D> std::fmt::Debug for Display<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Display")
            .field("canvas", &(self.canvas.width(), self.canvas.height()))
            .field("orientation", &self.orientation)
            .field("last", &self.detector.last())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
