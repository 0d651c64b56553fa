// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Frame scheduler: the background render loop.
//!
//! Each iteration cycles through three phases:
//!
//! 1. `Tick`: poll the stop channel, then run the tick callback if its
//!    interval has elapsed since the last tick.
//! 2. `Draw`: compose, transform, fingerprint and (maybe) write the frame.
//! 3. `IdleWait`: sleep out the rest of the frame budget, or the minimum
//!    guard interval when the budget was already blown.
//!
//! Iterations never overlap. A device write failure ends the loop and is
//! returned through [`StopHandle::join`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::device::DeviceSurface;
use crate::display::{Display, FlushOutcome};
use crate::error::FramebufError;

/// Sleep used instead of the remaining budget when a frame overran it.
pub const MIN_IDLE: Duration = Duration::from_millis(10);

/// Callback that mutates application state on the loop's own timeline.
pub type TickFn<D> = Box<dyn FnMut(&mut Display<D>) + Send>;

/// Frame budget maths for a target rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePacer {
    frame_interval: Duration,
}

impl FramePacer {
    /// Pacer for `fps` frames per second. Zero is rejected.
    pub fn new(fps: u32) -> Result<Self, FramebufError> {
        if fps == 0 {
            return Err(FramebufError::invalid("target fps must be positive"));
        }
        Ok(Self {
            frame_interval: Duration::from_secs_f64(1.0 / f64::from(fps)),
        })
    }

    /// Target time between iteration starts.
    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// How long to sleep after an iteration that took `elapsed`.
    pub fn idle_after(&self, elapsed: Duration) -> Duration {
        match self.frame_interval.checked_sub(elapsed) {
            Some(rest) if !rest.is_zero() => rest,
            _ => MIN_IDLE,
        }
    }
}

/// Decides when the tick callback is due.
#[derive(Debug, Clone, Copy)]
pub struct TickGate {
    interval: Duration,
    last: Option<Instant>,
}

impl TickGate {
    /// Gate that opens once more than `interval` has passed since the last tick.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// True when a tick is due at `now`; records `now` as the tick time.
    pub fn poll(&mut self, now: Instant) -> bool {
        let due = self
            .last
            .is_none_or(|last| now.saturating_duration_since(last) > self.interval);
        if due {
            self.last = Some(now);
        }
        due
    }
}

/// Summary returned when the loop exits cleanly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopReport {
    /// Iterations started.
    pub iterations: u64,
    /// Tick callbacks invoked.
    pub ticks: u64,
    /// Frames written to the device.
    pub writes: u64,
}

/// Handle returned by `Session::start`.
///
/// `stop` is fire-and-forget: the loop will not begin another iteration once
/// it sees the signal, but an iteration in flight runs to completion.
/// Dropping the handle stops the loop as well.
#[derive(Debug)]
pub struct StopHandle {
    stop_tx: Sender<()>,
    worker: JoinHandle<Result<LoopReport, FramebufError>>,
}

impl StopHandle {
    /// Ask the loop to stop. Never blocks; repeated calls are harmless.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(());
    }

    /// True once the loop thread has exited.
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Block until the loop exits and return how it ended.
    ///
    /// Does not stop the loop by itself; call [`stop`](Self::stop) first, or
    /// use this to wait for a fatal device error.
    pub fn join(self) -> Result<LoopReport, FramebufError> {
        let Self { stop_tx, worker } = self;
        let outcome = worker.join().unwrap_or(Err(FramebufError::LoopPanicked));
        drop(stop_tx);
        outcome
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Tick,
    Draw { started: Instant },
    IdleWait { started: Instant },
}

struct RenderLoop<D> {
    display: Arc<Mutex<Display<D>>>,
    tick: Option<Arc<Mutex<TickFn<D>>>>,
    gate: TickGate,
    pacer: FramePacer,
    stop_rx: Receiver<()>,
    report: LoopReport,
}

impl<D: DeviceSurface> RenderLoop<D> {
    fn stop_requested(&self) -> bool {
        match self.stop_rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => true,
            Err(TryRecvError::Empty) => false,
        }
    }

    fn run(mut self) -> Result<LoopReport, FramebufError> {
        let mut phase = Phase::Tick;
        loop {
            phase = match phase {
                Phase::Tick => {
                    if self.stop_requested() {
                        return Ok(self.report);
                    }
                    let started = Instant::now();
                    self.report.iterations += 1;
                    if self.gate.poll(started) {
                        if let Some(tick) = &self.tick {
                            let mut tick = tick.lock().unwrap_or_else(PoisonError::into_inner);
                            let mut display =
                                self.display.lock().unwrap_or_else(PoisonError::into_inner);
                            let tick: &mut TickFn<D> = &mut tick;
                            tick(&mut *display);
                            self.report.ticks += 1;
                        }
                    }
                    Phase::Draw { started }
                }
                Phase::Draw { started } => {
                    let flushed = self
                        .display
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .flush();
                    match flushed {
                        Ok(FlushOutcome::Written(_)) => self.report.writes += 1,
                        Ok(FlushOutcome::Skipped) => {}
                        Err(err) => {
                            error!(error = %err, "device write failed, stopping render loop");
                            return Err(err);
                        }
                    }
                    Phase::IdleWait { started }
                }
                Phase::IdleWait { started } => {
                    let elapsed = started.elapsed();
                    if elapsed >= self.pacer.frame_interval() {
                        warn!(?elapsed, budget = ?self.pacer.frame_interval(), "frame over budget");
                    }
                    thread::sleep(self.pacer.idle_after(elapsed));
                    Phase::Tick
                }
            };
        }
    }
}

/// Spawn the render loop thread. `running` is cleared when it exits.
pub(crate) fn spawn<D>(
    display: Arc<Mutex<Display<D>>>,
    tick: Option<Arc<Mutex<TickFn<D>>>>,
    tick_interval: Duration,
    pacer: FramePacer,
    running: Arc<AtomicBool>,
) -> Result<StopHandle, FramebufError>
where
    D: DeviceSurface + 'static,
{
    let (stop_tx, stop_rx) = mpsc::channel();
    let render_loop = RenderLoop {
        display,
        tick,
        gate: TickGate::new(tick_interval),
        pacer,
        stop_rx,
        report: LoopReport::default(),
    };
    info!(interval = ?pacer.frame_interval(), ?tick_interval, "render loop starting");
    let worker = thread::Builder::new()
        .name("framebuf-render".into())
        .spawn(move || {
            let _running = RunningGuard(running);
            let outcome = render_loop.run();
            match &outcome {
                Ok(report) => info!(
                    iterations = report.iterations,
                    ticks = report.ticks,
                    writes = report.writes,
                    "render loop stopped"
                ),
                Err(err) => error!(error = %err, "render loop terminated"),
            }
            outcome
        })
        .map_err(|e| FramebufError::invalid(format!("could not spawn render thread: {e}")))?;
    Ok(StopHandle { stop_tx, worker })
}

struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
