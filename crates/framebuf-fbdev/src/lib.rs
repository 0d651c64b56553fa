// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Linux fbdev adapter for framebuf sessions.
//!
//! [`FbDevice`] implements [`DeviceSurface`](framebuf_core::DeviceSurface)
//! over a `/dev/fbN` node, taking its geometry and colour depth from sysfs.

mod device;
mod layout;

pub use device::{FbDevice, Geometry, DEFAULT_DEVICE, DEVICE_ENV, SYSFS_GRAPHICS};
pub use layout::PixelLayout;

use framebuf_core::{FramebufError, Session, SessionConfig};

/// Open the default framebuffer and bind a session to it.
///
/// The device is `$FRAMEBUFFER` when set, else `/dev/fb0`.
pub fn open_session(config: &SessionConfig) -> Result<Session<FbDevice>, FramebufError> {
    Session::open(FbDevice::open_default()?, config)
}
