// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory device fake for testing sessions without hardware.

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use framebuf_core::{Bounds, DeviceSurface, FramebufError};
use image::RgbaImage;

/// In-memory implementation of [`DeviceSurface`] for testing.
///
/// Clones share state, so a test can keep a clone as a probe after handing
/// the device to a session.
///
/// # Example
///
/// ```
/// use framebuf_core::{Session, SessionConfig};
/// use framebuf_dry_tests::MemoryDevice;
///
/// let device = MemoryDevice::new(4, 4);
/// let session = Session::open(device.clone(), &SessionConfig::default()).unwrap();
/// session.flush_now().unwrap();
/// assert_eq!(device.write_count(), 1);
/// ```
#[derive(Clone)]
pub struct MemoryDevice {
    inner: Arc<Mutex<MemoryDeviceInner>>,
}

struct MemoryDeviceInner {
    bounds: Bounds,
    pixels: RgbaImage,
    raw: Vec<u8>,
    write_count: usize,
    write_times: Vec<Instant>,
    fail_on_write: bool,
    raw_error: Option<io::ErrorKind>,
}

impl MemoryDevice {
    /// A `width` x `height` device with a 4-byte-per-pixel raw store.
    pub fn new(width: u32, height: u32) -> Self {
        let bounds = Bounds::new(width, height);
        Self {
            inner: Arc::new(Mutex::new(MemoryDeviceInner {
                bounds,
                pixels: RgbaImage::new(width, height),
                raw: vec![0; bounds.area() as usize * 4],
                write_count: 0,
                write_times: Vec::new(),
                fail_on_write: false,
                raw_error: None,
            })),
        }
    }

    fn with_inner<R>(&self, f: impl FnOnce(&mut MemoryDeviceInner) -> R) -> R {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut inner)
    }

    /// Make every subsequent `write_frame` fail with an I/O error.
    pub fn set_fail_on_write(&self, fail: bool) {
        self.with_inner(|inner| inner.fail_on_write = fail);
    }

    /// Make raw writes fail with `kind` (or succeed again with `None`).
    pub fn set_raw_error(&self, kind: Option<io::ErrorKind>) {
        self.with_inner(|inner| inner.raw_error = kind);
    }

    /// Number of successful frame writes.
    pub fn write_count(&self) -> usize {
        self.with_inner(|inner| inner.write_count)
    }

    /// When each successful frame write happened.
    pub fn write_times(&self) -> Vec<Instant> {
        self.with_inner(|inner| inner.write_times.clone())
    }

    /// Current device pixels.
    pub fn pixels(&self) -> RgbaImage {
        self.with_inner(|inner| inner.pixels.clone())
    }

    /// Current raw byte store.
    pub fn raw(&self) -> Vec<u8> {
        self.with_inner(|inner| inner.raw.clone())
    }
}

impl DeviceSurface for MemoryDevice {
    fn bounds(&self) -> Bounds {
        self.with_inner(|inner| inner.bounds)
    }

    fn write_frame(&mut self, frame: &RgbaImage) -> Result<(), FramebufError> {
        self.with_inner(|inner| {
            if inner.fail_on_write {
                return Err(FramebufError::DeviceWrite(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "memory device set to fail",
                )));
            }
            let w = frame.width().min(inner.bounds.width);
            let h = frame.height().min(inner.bounds.height);
            for y in 0..h {
                for x in 0..w {
                    inner.pixels.put_pixel(x, y, *frame.get_pixel(x, y));
                }
            }
            inner.write_count += 1;
            inner.write_times.push(Instant::now());
            Ok(())
        })
    }

    fn write_raw_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<usize> {
        self.with_inner(|inner| {
            if let Some(kind) = inner.raw_error {
                return Err(io::Error::from(kind));
            }
            let start = usize::try_from(offset).unwrap_or(usize::MAX);
            if start >= inner.raw.len() {
                return Err(io::Error::from(io::ErrorKind::StorageFull));
            }
            let n = bytes.len().min(inner.raw.len() - start);
            inner.raw[start..start + n].copy_from_slice(&bytes[..n]);
            Ok(n)
        })
    }
}

impl std::fmt::Debug for MemoryDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with_inner(|inner| {
            f.debug_struct("MemoryDevice")
                .field("bounds", &inner.bounds)
                .field("write_count", &inner.write_count)
                .finish_non_exhaustive()
        })
    }
}
