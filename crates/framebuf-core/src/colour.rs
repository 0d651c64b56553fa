// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! RGBA colour helpers.
//!
//! Colours are raw `image::Rgba<u8>` values; no colour management happens
//! anywhere in the pipeline.

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use image::Rgba;

use crate::error::FramebufError;

/// Straight (non-premultiplied) 8-bit RGBA colour.
pub type Colour = Rgba<u8>;

/// Opaque black, the default fill for uncovered pixels after rotation.
pub const BLACK: Colour = rgb(0, 0, 0);

/// Opaque white.
pub const WHITE: Colour = rgb(0xff, 0xff, 0xff);

/// Build an opaque colour from its red, green and blue channels.
pub const fn rgb(r: u8, g: u8, b: u8) -> Colour {
    Rgba([r, g, b, 0xff])
}

/// Parse an HTML-style hex colour.
///
/// Accepts `rgb`, `rrggbb` and `rrggbbaa`, each with an optional leading `#`.
/// Short forms double every digit (`#f80` is `#ff8800`).
pub fn parse_hex(s: &str) -> Result<Colour, FramebufError> {
    let digits = s.trim().trim_start_matches('#');
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(FramebufError::invalid(format!("malformed colour {s:?}")));
    }
    let byte_at = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
    let nibble_at = |i: usize| u8::from_str_radix(&digits[i..=i], 16).map(|n| n * 17);
    let parsed = match digits.len() {
        3 => (nibble_at(0), nibble_at(1), nibble_at(2), Ok(0xff)),
        6 => (byte_at(0), byte_at(2), byte_at(4), Ok(0xff)),
        8 => (byte_at(0), byte_at(2), byte_at(4), byte_at(6)),
        n => {
            return Err(FramebufError::invalid(format!(
                "colour {s:?} has {n} hex digits, expected 3, 6 or 8"
            )))
        }
    };
    match parsed {
        (Ok(r), Ok(g), Ok(b), Ok(a)) => Ok(Rgba([r, g, b, a])),
        _ => Err(FramebufError::invalid(format!("malformed colour {s:?}"))),
    }
}

/// Render a colour back to `#rrggbb` (or `#rrggbbaa` when not opaque).
pub fn to_hex(c: Colour) -> String {
    let Rgba([r, g, b, a]) = c;
    if a == 0xff {
        format!("#{r:02x}{g:02x}{b:02x}")
    } else {
        format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}

/// Widen an `embedded-graphics` colour into an opaque RGBA colour.
pub fn from_rgb888(c: Rgb888) -> Colour {
    rgb(c.r(), c.g(), c.b())
}

/// Drop alpha to hand a colour to `embedded-graphics` primitives.
pub fn to_rgb888(c: Colour) -> Rgb888 {
    let Rgba([r, g, b, _]) = c;
    Rgb888::new(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_forms() {
        assert_eq!(parse_hex("#ff8000").ok(), Some(rgb(0xff, 0x80, 0x00)));
        assert_eq!(parse_hex("ff8000").ok(), Some(rgb(0xff, 0x80, 0x00)));
        assert_eq!(parse_hex("#f80").ok(), Some(rgb(0xff, 0x88, 0x00)));
        assert_eq!(parse_hex("#10203040").ok(), Some(Rgba([0x10, 0x20, 0x30, 0x40])));
    }

    #[test]
    fn rejects_malformed_colours() {
        for bad in ["", "#", "#ff80", "#gg0000", "#12345", "#ff8000ff00", "#ä00"] {
            assert!(
                matches!(parse_hex(bad), Err(FramebufError::InvalidConfiguration(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn hex_round_trips_through_display_form() {
        assert_eq!(to_hex(rgb(1, 2, 3)), "#010203");
        assert_eq!(to_hex(Rgba([1, 2, 3, 4])), "#01020304");
    }

    #[test]
    fn rgb888_conversion_is_opaque() {
        assert_eq!(from_rgb888(Rgb888::new(9, 8, 7)), rgb(9, 8, 7));
        assert_eq!(to_rgb888(Rgba([9, 8, 7, 0])), Rgb888::new(9, 8, 7));
    }
}
