// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Native pixel encodings of fbdev surfaces.

use framebuf_core::{Colour, FramebufError};

/// In-memory pixel format of the device, chosen from its colour depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// 32bpp, bytes `B G R X`.
    Bgrx8888,
    /// 24bpp, bytes `B G R`.
    Bgr888,
    /// 16bpp little-endian `RRRRRGGG GGGBBBBB`.
    Rgb565,
}

impl PixelLayout {
    /// Layout for a `bits_per_pixel` value as reported by the kernel.
    pub fn from_bits_per_pixel(bpp: u32) -> Result<Self, FramebufError> {
        match bpp {
            32 => Ok(Self::Bgrx8888),
            24 => Ok(Self::Bgr888),
            16 => Ok(Self::Rgb565),
            other => Err(FramebufError::DeviceInit(format!(
                "unsupported colour depth: {other} bits per pixel"
            ))),
        }
    }

    /// Bytes one pixel occupies on the device.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Bgrx8888 => 4,
            Self::Bgr888 => 3,
            Self::Rgb565 => 2,
        }
    }

    /// Encode `colour` into `out`, which must be exactly one pixel wide.
    ///
    /// Alpha is dropped; the device has no notion of blending.
    pub fn encode(self, colour: Colour, out: &mut [u8]) {
        let [r, g, b, _] = colour.0;
        match self {
            Self::Bgrx8888 => out.copy_from_slice(&[b, g, r, 0xff]),
            Self::Bgr888 => out.copy_from_slice(&[b, g, r]),
            Self::Rgb565 => {
                let packed = (u16::from(r & 0b1111_1000) << 8)
                    | (u16::from(g & 0b1111_1100) << 3)
                    | (u16::from(b) >> 3);
                out.copy_from_slice(&packed.to_le_bytes());
            }
        }
    }

    /// Encode a row of pixels into `out`, `bytes_per_pixel` bytes each.
    pub fn encode_row<'a>(self, pixels: impl Iterator<Item = &'a Colour>, out: &mut [u8]) {
        for (px, chunk) in pixels.zip(out.chunks_exact_mut(self.bytes_per_pixel())) {
            self.encode(*px, chunk);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use framebuf_core::colour::rgb;

    #[test]
    fn depth_selects_layout() {
        assert_eq!(PixelLayout::from_bits_per_pixel(32).unwrap(), PixelLayout::Bgrx8888);
        assert_eq!(PixelLayout::from_bits_per_pixel(16).unwrap(), PixelLayout::Rgb565);
        assert!(matches!(
            PixelLayout::from_bits_per_pixel(8),
            Err(FramebufError::DeviceInit(_))
        ));
    }

    #[test]
    fn bgrx_swaps_channels() {
        let mut out = [0u8; 4];
        PixelLayout::Bgrx8888.encode(rgb(1, 2, 3), &mut out);
        assert_eq!(out, [3, 2, 1, 0xff]);
    }

    #[test]
    fn rgb565_packs_high_bits() {
        let mut out = [0u8; 2];
        PixelLayout::Rgb565.encode(rgb(0xff, 0, 0), &mut out);
        assert_eq!(u16::from_le_bytes(out), 0xf800);
        PixelLayout::Rgb565.encode(rgb(0, 0xff, 0), &mut out);
        assert_eq!(u16::from_le_bytes(out), 0x07e0);
        PixelLayout::Rgb565.encode(rgb(0, 0, 0xff), &mut out);
        assert_eq!(u16::from_le_bytes(out), 0x001f);
    }
}
