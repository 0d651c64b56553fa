// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Random-fill diagnostic: sprays noise over the whole device.

use std::io;

use rand::RngCore;
use tracing::info;

use crate::device::DeviceSurface;
use crate::error::FramebufError;

const CHUNK: usize = 1024;

/// Fill `device` with random bytes from offset 0 until it reports the end.
///
/// Running out of space is the expected way to finish. Returns the number of
/// bytes written.
pub fn randomize<D: DeviceSurface + ?Sized>(device: &mut D) -> Result<u64, FramebufError> {
    let mut rng = rand::thread_rng();
    let mut buf = [0u8; CHUNK];
    let mut offset = 0u64;
    loop {
        rng.fill_bytes(&mut buf);
        match device.write_raw_at(offset, &buf) {
            Ok(0) => break,
            Ok(n) => offset += n as u64,
            Err(e) if is_end_of_device(&e) => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(FramebufError::Diagnostic(e)),
        }
    }
    info!(bytes = offset, "device filled with random data");
    Ok(offset)
}

fn is_end_of_device(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::StorageFull | io::ErrorKind::FileTooLarge
    )
}
