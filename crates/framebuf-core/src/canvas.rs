// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Off-screen RGBA canvas the application draws into.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use image::RgbaImage;

use crate::colour::{self, Colour};

/// Off-screen drawing surface, sized to the device's physical bounds.
///
/// Implements [`DrawTarget`] so any `embedded-graphics` primitive (text,
/// shapes, images) can be drawn onto it; alpha is set opaque for those.
#[derive(Debug, Clone)]
pub struct Canvas {
    raster: RgbaImage,
}

impl Canvas {
    /// A transparent-black canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            raster: RgbaImage::new(width, height),
        }
    }

    /// Canvas width in pixels.
    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    /// Canvas height in pixels.
    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    /// Reset every pixel to `colour`.
    pub fn fill(&mut self, colour: Colour) {
        for px in self.raster.pixels_mut() {
            *px = colour;
        }
    }

    /// Set one pixel; out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, colour: Colour) {
        if x < self.width() && y < self.height() {
            self.raster.put_pixel(x, y, colour);
        }
    }

    /// Read one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Colour> {
        self.raster.get_pixel_checked(x, y).copied()
    }

    /// Current raster content.
    pub fn raster(&self) -> &RgbaImage {
        &self.raster
    }

    /// Mutable raster access for bulk RGBA work.
    pub fn raster_mut(&mut self) -> &mut RgbaImage {
        &mut self.raster
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            if x < 0 || y < 0 {
                continue;
            }
            self.set_pixel(x as u32, y as u32, colour::from_rgb888(color));
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };
        let c = colour::from_rgb888(color);
        for y in area.top_left.y..=bottom_right.y {
            for x in area.top_left.x..=bottom_right.x {
                self.raster.put_pixel(x as u32, y as u32, c);
            }
        }
        Ok(())
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }
}
