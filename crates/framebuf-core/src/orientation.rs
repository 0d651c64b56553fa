// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Orientation transform from canvas space into device mounting space.
//!
//! Angles are counter-clockwise degrees. Right angles are exact pixel
//! permutations; anything else is resampled bilinearly into the bounding box
//! of the rotated raster.

use image::{imageops, Rgba, RgbaImage};

use crate::colour::Colour;

/// Rotation resolved once per session from the configured angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// 0°: frames pass through (still copied).
    Identity,
    /// 90° counter-clockwise.
    Quarter,
    /// 180°.
    Half,
    /// 270° counter-clockwise (90° clockwise).
    ThreeQuarter,
    /// Any other angle, normalised into `1..360`.
    Arbitrary(i32),
}

impl Orientation {
    /// Resolve an angle. Values are taken modulo 360, so `-90` is `ThreeQuarter`.
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees.rem_euclid(360) {
            0 => Self::Identity,
            90 => Self::Quarter,
            180 => Self::Half,
            270 => Self::ThreeQuarter,
            other => Self::Arbitrary(other),
        }
    }

    /// Normalised angle in degrees.
    pub fn degrees(self) -> i32 {
        match self {
            Self::Identity => 0,
            Self::Quarter => 90,
            Self::Half => 180,
            Self::ThreeQuarter => 270,
            Self::Arbitrary(d) => d,
        }
    }

    /// True for the exact right-angle paths.
    pub fn is_exact(self) -> bool {
        !matches!(self, Self::Arbitrary(_))
    }

    /// Dimensions of a transformed `width` x `height` frame.
    pub fn output_size(self, width: u32, height: u32) -> (u32, u32) {
        match self {
            Self::Identity | Self::Half => (width, height),
            Self::Quarter | Self::ThreeQuarter => (height, width),
            Self::Arbitrary(d) => {
                let (sin, cos) = (d as f32).to_radians().sin_cos();
                let (w, h) = (width as f32, height as f32);
                let ow = (w * cos.abs() + h * sin.abs() - 1e-3).ceil().max(1.0);
                let oh = (w * sin.abs() + h * cos.abs() - 1e-3).ceil().max(1.0);
                (ow as u32, oh as u32)
            }
        }
    }

    /// Produce a standalone transformed copy of `frame`.
    pub fn apply(self, frame: &RgbaImage, fill: Colour) -> RgbaImage {
        match self {
            Self::Identity => frame.clone(),
            // imageops rotates clockwise.
            Self::Quarter => imageops::rotate270(frame),
            Self::Half => imageops::rotate180(frame),
            Self::ThreeQuarter => imageops::rotate90(frame),
            Self::Arbitrary(d) => rotate_resampled(frame, d, fill),
        }
    }
}

fn rotate_resampled(src: &RgbaImage, degrees: i32, fill: Colour) -> RgbaImage {
    let (sw, sh) = src.dimensions();
    let (dw, dh) = Orientation::Arbitrary(degrees).output_size(sw, sh);
    if sw == 0 || sh == 0 {
        return RgbaImage::from_pixel(dw, dh, fill);
    }
    let (sin, cos) = (degrees as f32).to_radians().sin_cos();
    let (scx, scy) = (sw as f32 / 2.0, sh as f32 / 2.0);
    let (dcx, dcy) = (dw as f32 / 2.0, dh as f32 / 2.0);

    RgbaImage::from_fn(dw, dh, |x, y| {
        // Inverse map the destination pixel centre into source space. With y
        // pointing down, a counter-clockwise turn by θ is undone by
        // (x, y) -> (x cos θ - y sin θ, x sin θ + y cos θ).
        let dx = x as f32 + 0.5 - dcx;
        let dy = y as f32 + 0.5 - dcy;
        let sx = dx * cos - dy * sin + scx - 0.5;
        let sy = dx * sin + dy * cos + scy - 0.5;
        bilinear(src, sx, sy, fill)
    })
}

fn bilinear(src: &RgbaImage, sx: f32, sy: f32, fill: Colour) -> Colour {
    let (x0, y0) = (sx.floor(), sy.floor());
    let (fx, fy) = (sx - x0, sy - y0);
    let (x0, y0) = (x0 as i64, y0 as i64);
    let tap = |x: i64, y: i64| -> [f32; 4] {
        let inside = x >= 0 && y >= 0 && x < i64::from(src.width()) && y < i64::from(src.height());
        let Rgba(px) = if inside {
            *src.get_pixel(x as u32, y as u32)
        } else {
            fill
        };
        px.map(f32::from)
    };
    let (a, b) = (tap(x0, y0), tap(x0 + 1, y0));
    let (c, d) = (tap(x0, y0 + 1), tap(x0 + 1, y0 + 1));
    let mut out = [0u8; 4];
    for (i, o) in out.iter_mut().enumerate() {
        let top = a[i] + (b[i] - a[i]) * fx;
        let bottom = c[i] + (d[i] - c[i]) * fx;
        *o = (top + (bottom - top) * fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}
