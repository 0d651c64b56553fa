// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]
use std::io;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use framebuf_core::colour::{self, rgb};
use framebuf_core::{
    Bounds, DeviceSurface, FlushOutcome, FramebufError, Orientation, Session, SessionConfig,
};
use framebuf_dry_tests::MemoryDevice;

fn open(device: &MemoryDevice, config: &SessionConfig) -> Session<MemoryDevice> {
    Session::open(device.clone(), config).expect("open session")
}

#[test]
fn bounds_report_unrotated_geometry() {
    let device = MemoryDevice::new(320, 240);
    let session = open(&device, &SessionConfig::default().with_rotation(90));
    assert_eq!(session.bounds(), Bounds::new(320, 240));
    assert_eq!(session.orientation(), Orientation::Quarter);
    let canvas = session.draw_target();
    assert_eq!((canvas.width(), canvas.height()), (320, 240));
}

#[test]
fn first_flush_always_writes() {
    let device = MemoryDevice::new(4, 4);
    let session = open(&device, &SessionConfig::default());
    session.clear(rgb(10, 20, 30));
    assert!(matches!(session.flush_now(), Ok(FlushOutcome::Written(_))));
    assert_eq!(device.write_count(), 1);
    assert_eq!(*device.pixels().get_pixel(3, 3), rgb(10, 20, 30));
}

#[test]
fn unchanged_scene_is_written_once() {
    let device = MemoryDevice::new(8, 8);
    let session = open(&device, &SessionConfig::default());
    session.clear(colour::WHITE);
    session.flush_now().expect("first flush");
    assert!(matches!(session.flush_now(), Ok(FlushOutcome::Skipped)));
    assert_eq!(device.write_count(), 1);
    let stats = session.stats();
    assert_eq!((stats.flushes, stats.writes, stats.skipped), (2, 1, 1));
}

#[test]
fn force_redraw_writes_identical_content() {
    let device = MemoryDevice::new(8, 8);
    let session = open(&device, &SessionConfig::default());
    session.flush_now().expect("first flush");
    session.force_redraw();
    assert!(matches!(session.flush_now(), Ok(FlushOutcome::Written(_))));
    assert_eq!(device.write_count(), 2);
}

#[test]
fn clear_does_not_touch_the_device_until_flush() {
    let device = MemoryDevice::new(2, 2);
    let session = open(&device, &SessionConfig::default());
    session.clear(rgb(1, 2, 3));
    assert_eq!(device.write_count(), 0);
    assert_eq!(device.pixels().get_pixel(0, 0).0, [0, 0, 0, 0]);
}

#[test]
fn drawing_through_the_guard_is_detected_as_change() {
    let device = MemoryDevice::new(16, 16);
    let session = open(&device, &SessionConfig::default());
    session.flush_now().expect("first flush");
    {
        let mut canvas = session.draw_target();
        Rectangle::new(Point::new(2, 2), Size::new(4, 4))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::RED))
            .draw(&mut *canvas)
            .ok();
    }
    assert!(matches!(session.flush_now(), Ok(FlushOutcome::Written(_))));
    assert_eq!(*device.pixels().get_pixel(3, 3), rgb(0xff, 0, 0));
}

#[test]
fn rotation_is_applied_before_the_device_write() {
    let device = MemoryDevice::new(4, 4);
    let session = open(&device, &SessionConfig::default().with_rotation(180));
    session.draw_target().set_pixel(0, 0, rgb(9, 9, 9));
    session.flush_now().expect("flush");
    assert_eq!(*device.pixels().get_pixel(3, 3), rgb(9, 9, 9));
    assert_eq!(device.pixels().get_pixel(0, 0).0, [0, 0, 0, 0]);
}

#[test]
fn arbitrary_rotation_uses_the_configured_fill() {
    let device = MemoryDevice::new(10, 10);
    let config = SessionConfig::default()
        .with_rotation(45)
        .with_rotate_fill(rgb(0, 0, 200));
    let session = open(&device, &config);
    session.clear(rgb(200, 0, 0));
    session.flush_now().expect("flush");
    // The rotated frame is larger than the device; its corner is fill.
    assert_eq!(*device.pixels().get_pixel(0, 0), rgb(0, 0, 200));
}

#[test]
fn bad_fill_colour_is_rejected_at_open() {
    let config = SessionConfig {
        rotate_fill: "#12".into(),
        ..SessionConfig::default()
    };
    let err = Session::open(MemoryDevice::new(2, 2), &config).unwrap_err();
    assert!(matches!(err, FramebufError::InvalidConfiguration(_)));
}

#[test]
fn empty_device_bounds_fail_init() {
    let err = Session::open(MemoryDevice::new(0, 10), &SessionConfig::default()).unwrap_err();
    assert!(matches!(err, FramebufError::DeviceInit(_)));
}

#[test]
fn write_failure_surfaces_from_flush() {
    let device = MemoryDevice::new(2, 2);
    let session = open(&device, &SessionConfig::default());
    device.set_fail_on_write(true);
    let err = session.flush_now().unwrap_err();
    assert!(matches!(err, FramebufError::DeviceWrite(_)));
    assert!(err.is_fatal_to_loop());
}

#[test]
fn failed_write_is_retried_on_the_next_flush() {
    let device = MemoryDevice::new(2, 2);
    let session = open(&device, &SessionConfig::default());
    session.clear(rgb(7, 7, 7));
    device.set_fail_on_write(true);
    assert!(session.flush_now().is_err());
    device.set_fail_on_write(false);
    assert!(matches!(session.flush_now(), Ok(FlushOutcome::Written(_))));
    assert_eq!(device.write_count(), 1);
    assert_eq!(*device.pixels().get_pixel(1, 1), rgb(7, 7, 7));
}

#[test]
fn randomize_fills_until_end_of_device() {
    let device = MemoryDevice::new(30, 20);
    let session = open(&device, &SessionConfig::default());
    let written = session.randomize().expect("randomize");
    assert_eq!(written, 30 * 20 * 4);
    assert!(device.raw().iter().any(|b| *b != 0));
}

#[test]
fn randomize_reports_non_space_errors() {
    let device = MemoryDevice::new(4, 4);
    let session = open(&device, &SessionConfig::default());
    device.set_raw_error(Some(io::ErrorKind::PermissionDenied));
    assert!(matches!(
        session.randomize(),
        Err(FramebufError::Diagnostic(_))
    ));
}

#[test]
fn close_returns_the_device() {
    let device = MemoryDevice::new(3, 3);
    let session = open(&device, &SessionConfig::default());
    session.flush_now().expect("flush");
    let released = session.close().expect("close");
    assert_eq!(released.bounds(), Bounds::new(3, 3));
    assert_eq!(released.write_count(), 1);
}
