// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Whole-frame content fingerprints and the change detector built on them.
//!
//! A fingerprint is the first eight bytes of a BLAKE3 digest over the frame's
//! dimensions and raw RGBA bytes. Zero is reserved as the "no previous frame"
//! sentinel; a digest that truncates to zero is remapped to one.

use std::fmt;

use image::RgbaImage;

/// 64-bit summary of a frame's pixel content.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Sentinel meaning "nothing has been written yet".
    pub const NONE: Self = Self(0);

    /// Fingerprint a frame buffer.
    pub fn of(frame: &RgbaImage) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&frame.width().to_le_bytes());
        hasher.update(&frame.height().to_le_bytes());
        hasher.update(frame.as_raw());
        let digest = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.as_bytes()[..8]);
        match u64::from_le_bytes(head) {
            0 => Self(1),
            v => Self(v),
        }
    }

    /// True for the sentinel.
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Raw value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Remembers the fingerprint of the last frame written to the device.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last: Fingerprint,
}

impl ChangeDetector {
    /// A detector with no previous frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `next` must be written: there is no previous frame, or it differs.
    pub fn is_changed(&self, next: Fingerprint) -> bool {
        self.last.is_none() || self.last != next
    }

    /// Record `next` as the frame now on the device. Call only after a successful write.
    pub fn commit(&mut self, next: Fingerprint) {
        self.last = next;
    }

    /// Forget the previous frame so the next observation always writes.
    pub fn reset(&mut self) {
        self.last = Fingerprint::NONE;
    }

    /// Fingerprint of the last frame accepted for writing.
    pub fn last(&self) -> Fingerprint {
        self.last
    }
}
