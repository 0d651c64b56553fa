// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Session: the live binding between an application and one device.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info};

use crate::canvas::Canvas;
use crate::colour::Colour;
use crate::config::SessionConfig;
use crate::device::{Bounds, DeviceSurface};
use crate::diag;
use crate::display::{Display, FlushOutcome, FrameStats};
use crate::error::FramebufError;
use crate::orientation::Orientation;
use crate::scheduler::{self, FramePacer, StopHandle, TickFn};

/// Owns a device and its canvas, and drives the render loop over them.
///
/// The canvas sits behind the same lock the render loop takes while
/// compositing, so drawing through [`draw_target`](Self::draw_target) from
/// another thread is serialised against the loop.
pub struct Session<D> {
    display: Arc<Mutex<Display<D>>>,
    tick: Option<Arc<Mutex<TickFn<D>>>>,
    tick_interval: Duration,
    running: Arc<AtomicBool>,
}

impl<D: DeviceSurface + 'static> Session<D> {
    /// Bind an acquired device to a new session.
    ///
    /// The canvas is sized to the device's reported bounds. Fails with
    /// `DeviceInit` for empty bounds and `InvalidConfiguration` for a bad
    /// rotation fill colour.
    pub fn open(device: D, config: &SessionConfig) -> Result<Self, FramebufError> {
        let fill = config.fill_colour()?;
        let orientation = config.orientation();
        let display = Display::new(device, orientation, fill)?;
        let bounds = display.bounds();
        info!(
            width = bounds.width,
            height = bounds.height,
            rotate = orientation.degrees(),
            "framebuffer session opened"
        );
        Ok(Self {
            display: Arc::new(Mutex::new(display)),
            tick: None,
            tick_interval: config.tick_interval(),
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Attach the tick callback. Runs on the render loop between frames.
    pub fn on_tick<F>(mut self, tick: F) -> Self
    where
        F: FnMut(&mut Display<D>) + Send + 'static,
    {
        let tick: TickFn<D> = Box::new(tick);
        self.tick = Some(Arc::new(Mutex::new(tick)));
        self
    }

    fn lock(&self) -> MutexGuard<'_, Display<D>> {
        self.display.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Physical device size, unaffected by rotation.
    pub fn bounds(&self) -> Bounds {
        self.lock().bounds()
    }

    /// Orientation resolved from the configuration.
    pub fn orientation(&self) -> Orientation {
        self.lock().orientation()
    }

    /// Reset the canvas to a solid colour; the device updates on the next frame.
    pub fn clear(&self, colour: Colour) {
        self.lock().clear(colour);
    }

    /// Guarantee the next frame is written even if nothing changed.
    pub fn force_redraw(&self) {
        self.lock().force_redraw();
    }

    /// Locked access to the canvas for drawing.
    ///
    /// The render loop waits for the guard to drop before compositing, so keep
    /// it short-lived.
    pub fn draw_target(&self) -> DrawGuard<'_, D> {
        DrawGuard { display: self.lock() }
    }

    /// Run one draw/flush step on the calling thread.
    pub fn flush_now(&self) -> Result<FlushOutcome, FramebufError> {
        self.lock().flush()
    }

    /// Frame counters so far.
    pub fn stats(&self) -> FrameStats {
        self.lock().stats()
    }

    /// True while a render loop started by this session is alive.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Start the background render loop at `fps` frames per second.
    ///
    /// Only one loop may run per session.
    pub fn start(&self, fps: u32) -> Result<StopHandle, FramebufError> {
        let pacer = FramePacer::new(fps)?;
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(FramebufError::LoopRunning);
        }
        scheduler::spawn(
            Arc::clone(&self.display),
            self.tick.clone(),
            self.tick_interval,
            pacer,
            Arc::clone(&self.running),
        )
        .inspect_err(|_| self.running.store(false, Ordering::Release))
    }

    /// Fill the device with random bytes. Refused while the loop runs.
    pub fn randomize(&self) -> Result<u64, FramebufError> {
        if self.is_running() {
            return Err(FramebufError::LoopRunning);
        }
        let mut display = self.lock();
        let written = diag::randomize(display.device_mut())?;
        display.force_redraw();
        Ok(written)
    }

    /// Release the session and hand the device back.
    ///
    /// The render loop must have exited first.
    pub fn close(self) -> Result<D, FramebufError> {
        if self.is_running() {
            return Err(FramebufError::LoopRunning);
        }
        let Self { display, tick, .. } = self;
        drop(tick);
        let display = Arc::try_unwrap(display).map_err(|_| FramebufError::LoopRunning)?;
        let display = display.into_inner().unwrap_or_else(PoisonError::into_inner);
        debug!("framebuffer session closed");
        Ok(display.into_device())
    }
}

impl<D> std::fmt::Debug for Session<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("tick", &self.tick.is_some())
            .field("tick_interval", &self.tick_interval)
            .field("running", &self.running.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Exclusive canvas access handed out by [`Session::draw_target`].
pub struct DrawGuard<'a, D> {
    display: MutexGuard<'a, Display<D>>,
}

impl<D: DeviceSurface> DrawGuard<'_, D> {
    /// The whole display, for callers that also want `force_redraw` or bounds.
    pub fn display(&mut self) -> &mut Display<D> {
        &mut self.display
    }
}

impl<D: DeviceSurface> Deref for DrawGuard<'_, D> {
    type Target = Canvas;

    fn deref(&self) -> &Canvas {
        self.display.canvas_ref()
    }
}

impl<D: DeviceSurface> DerefMut for DrawGuard<'_, D> {
    fn deref_mut(&mut self) -> &mut Canvas {
        self.display.canvas()
    }
}
