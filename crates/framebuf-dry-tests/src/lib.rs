// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for framebuf crates.
//!
//! - [`MemoryDevice`]: an in-memory [`DeviceSurface`](framebuf_core::DeviceSurface)
//!   with write counters, timestamps and failure injection.
//! - Raster fixtures for orientation and fingerprint tests.

mod device;

pub use device::MemoryDevice;

use image::{Rgba, RgbaImage};

/// Raster whose every pixel encodes its own coordinates, so any permutation
/// of pixels is detectable.
pub fn numbered(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([x as u8, y as u8, (x >> 8) as u8 ^ (y >> 8) as u8, 0xff])
    })
}

/// Two-colour checkerboard with `cell`-pixel squares.
pub fn checkerboard(width: u32, height: u32, cell: u32, a: Rgba<u8>, b: Rgba<u8>) -> RgbaImage {
    let cell = cell.max(1);
    RgbaImage::from_fn(width, height, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            a
        } else {
            b
        }
    })
}
