// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]
use std::fs;
use std::path::{Path, PathBuf};

use framebuf_core::colour::rgb;
use framebuf_core::{Bounds, DeviceSurface, FlushOutcome, FramebufError, Session, SessionConfig};
use framebuf_fbdev::{FbDevice, PixelLayout};
use image::RgbaImage;
use tempfile::TempDir;

/// A fake `/dev/fbN` file plus its sysfs directory.
struct FakeFb {
    _dir: TempDir,
    node: PathBuf,
    sysfs: PathBuf,
}

fn fake_fb(width: u32, height: u32, bpp: u32, stride: Option<usize>) -> FakeFb {
    let dir = tempfile::tempdir().unwrap();
    let sysfs = dir.path().join("sys");
    fs::create_dir(&sysfs).unwrap();
    fs::write(sysfs.join("virtual_size"), format!("{width},{height}\n")).unwrap();
    fs::write(sysfs.join("bits_per_pixel"), format!("{bpp}\n")).unwrap();
    let packed = width as usize * (bpp as usize / 8);
    if let Some(stride) = stride {
        fs::write(sysfs.join("stride"), format!("{stride}\n")).unwrap();
    }
    let node = dir.path().join("fb0");
    fs::write(&node, vec![0u8; stride.unwrap_or(packed) * height as usize]).unwrap();
    FakeFb {
        _dir: dir,
        node,
        sysfs,
    }
}

fn open(fb: &FakeFb) -> FbDevice {
    FbDevice::open_with_sysfs(&fb.node, &fb.sysfs).unwrap()
}

fn bytes(path: &Path) -> Vec<u8> {
    fs::read(path).unwrap()
}

#[test]
fn geometry_comes_from_sysfs() {
    let fb = fake_fb(6, 4, 32, Some(32));
    let device = open(&fb);
    assert_eq!(device.bounds(), Bounds::new(6, 4));
    assert_eq!(device.geometry().stride, 32);
    assert_eq!(device.geometry().layout, PixelLayout::Bgrx8888);
    assert_eq!(device.path(), fb.node.as_path());
}

#[test]
fn missing_stride_means_packed_rows() {
    let fb = fake_fb(5, 2, 16, None);
    assert_eq!(open(&fb).geometry().stride, 10);
}

#[test]
fn missing_device_node_is_an_open_error() {
    let fb = fake_fb(2, 2, 32, None);
    let err = FbDevice::open_with_sysfs(fb.node.with_file_name("fb9"), &fb.sysfs).unwrap_err();
    assert!(matches!(err, FramebufError::DeviceOpen { .. }));
}

#[test]
fn unusable_sysfs_is_an_init_error() {
    let fb = fake_fb(2, 2, 8, None);
    assert!(matches!(
        FbDevice::open_with_sysfs(&fb.node, &fb.sysfs),
        Err(FramebufError::DeviceInit(_))
    ));

    let fb = fake_fb(2, 2, 32, None);
    fs::remove_file(fb.sysfs.join("virtual_size")).unwrap();
    assert!(matches!(
        FbDevice::open_with_sysfs(&fb.node, &fb.sysfs),
        Err(FramebufError::DeviceInit(_))
    ));

    let fb = fake_fb(4, 2, 32, Some(8));
    assert!(matches!(
        FbDevice::open_with_sysfs(&fb.node, &fb.sysfs),
        Err(FramebufError::DeviceInit(_))
    ));
}

#[test]
fn frames_are_encoded_bgrx_with_stride_padding() {
    let fb = fake_fb(2, 2, 32, Some(12));
    let mut device = open(&fb);
    let frame = RgbaImage::from_fn(2, 2, |x, y| rgb(x as u8 + 1, y as u8 + 1, 9));
    device.write_frame(&frame).unwrap();
    assert_eq!(
        bytes(&fb.node),
        vec![
            9, 1, 1, 0xff, 9, 1, 2, 0xff, 0, 0, 0, 0, //
            9, 2, 1, 0xff, 9, 2, 2, 0xff, 0, 0, 0, 0,
        ]
    );
}

#[test]
fn frames_are_encoded_rgb565() {
    let fb = fake_fb(2, 1, 16, None);
    let mut device = open(&fb);
    let frame = RgbaImage::from_vec(2, 1, vec![0xff, 0, 0, 0xff, 0, 0, 0xff, 0xff]).unwrap();
    device.write_frame(&frame).unwrap();
    assert_eq!(bytes(&fb.node), vec![0x00, 0xf8, 0x1f, 0x00]);
}

#[test]
fn only_the_overlap_of_frame_and_device_is_written() {
    let fb = fake_fb(3, 3, 24, None);
    let mut device = open(&fb);
    // Wider and shorter than the device.
    let frame = RgbaImage::from_pixel(5, 1, rgb(7, 8, 9));
    device.write_frame(&frame).unwrap();
    let raw = bytes(&fb.node);
    assert_eq!(&raw[..9], &[9, 8, 7, 9, 8, 7, 9, 8, 7]);
    assert!(raw[9..].iter().all(|b| *b == 0));
    assert_eq!(raw.len(), 27);
}

#[test]
fn raw_writes_stop_at_the_end_of_pixel_memory() {
    let fb = fake_fb(2, 2, 32, None);
    let mut device = open(&fb);
    assert_eq!(device.write_raw_at(12, &[1; 8]).unwrap(), 4);
    assert_eq!(device.write_raw_at(16, &[1; 8]).unwrap(), 0);
    assert_eq!(bytes(&fb.node).len(), 16);
}

#[test]
fn session_over_fbdev_writes_rotated_frames() {
    let fb = fake_fb(2, 2, 32, None);
    let session = Session::open(open(&fb), &SessionConfig::default().with_rotation(180)).unwrap();
    session.draw_target().set_pixel(0, 0, rgb(0xaa, 0xbb, 0xcc));
    assert!(matches!(session.flush_now(), Ok(FlushOutcome::Written(_))));
    let raw = bytes(&fb.node);
    assert_eq!(&raw[12..16], &[0xcc, 0xbb, 0xaa, 0xff]);
    assert!(matches!(session.flush_now(), Ok(FlushOutcome::Skipped)));
}

#[test]
fn randomize_fills_the_whole_device() {
    let fb = fake_fb(16, 16, 32, None);
    let session = Session::open(open(&fb), &SessionConfig::default()).unwrap();
    assert_eq!(session.randomize().unwrap(), 16 * 16 * 4);
    assert!(bytes(&fb.node).iter().any(|b| *b != 0));
}
