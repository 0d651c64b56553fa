// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! framebuf-clock
//!
//! Renders a full-screen `HH:MM:SS` UTC clock to a Linux framebuffer. The
//! clock face is redrawn on every tick; the render loop only touches the
//! device when the face actually changed.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use embedded_graphics::mono_font::{ascii::FONT_10X20, MonoTextStyle};
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use framebuf_core::colour::{self, Colour};
use framebuf_core::{Display, DeviceSurface, Session, SessionConfig};
use framebuf_fbdev::FbDevice;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Full-screen UTC clock on a Linux framebuffer")]
struct Args {
    /// Framebuffer device node (default: $FRAMEBUFFER, then /dev/fb0)
    #[arg(long)]
    device: Option<PathBuf>,
    /// Session configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Target frame rate
    #[arg(long, default_value_t = 10)]
    fps: u32,
    /// Mounting rotation in degrees, overrides the config file
    #[arg(long, allow_hyphen_values = true)]
    rotate: Option<i32>,
    /// Milliseconds between clock redraws, overrides the config file
    #[arg(long)]
    tick_ms: Option<u64>,
    /// Text colour
    #[arg(long, default_value = "#ffffff")]
    fg: String,
    /// Background colour
    #[arg(long, default_value = "#000000")]
    bg: String,
    /// Fill the device with random bytes and exit
    #[arg(long)]
    randomize: bool,
}

fn load_config(args: &Args) -> Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let bytes =
                fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            SessionConfig::from_json(&bytes)?
        }
        None => SessionConfig::default(),
    };
    if let Some(degrees) = args.rotate {
        config = config.with_rotation(degrees);
    }
    if let Some(ms) = args.tick_ms {
        config = config.with_tick_interval(Duration::from_millis(ms));
    }
    Ok(config)
}

fn utc_hms(now: SystemTime) -> String {
    let secs = now.duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs()) % 86_400;
    format!("{:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
}

fn draw_clock<D: DeviceSurface>(display: &mut Display<D>, fg: Colour, bg: Colour) {
    display.clear(bg);
    let bounds = display.bounds();
    let centre = Point::new(bounds.width as i32 / 2, bounds.height as i32 / 2);
    let font = MonoTextStyle::new(&FONT_10X20, colour::to_rgb888(fg));
    let layout = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Middle)
        .build();
    let label = utc_hms(SystemTime::now());
    Text::with_text_style(&label, centre, font, layout)
        .draw(display.canvas())
        .ok();
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = load_config(&args)?;
    let fg = colour::parse_hex(&args.fg)?;
    let bg = colour::parse_hex(&args.bg)?;

    let device = match &args.device {
        Some(path) => FbDevice::open(path)?,
        None => FbDevice::open_default()?,
    };
    info!(device = %device.path().display(), "using framebuffer");
    let session = Session::open(device, &config)?;

    if args.randomize {
        let written = session.randomize()?;
        info!(bytes = written, "randomize complete");
        return Ok(());
    }

    let session = session.on_tick(move |display| draw_clock(display, fg, bg));
    let handle = session.start(args.fps)?;
    info!(fps = args.fps, "clock running");

    match handle.join() {
        Ok(report) => {
            info!(
                iterations = report.iterations,
                writes = report.writes,
                "render loop stopped"
            );
            Ok(())
        }
        Err(err) => {
            error!(%err, "render loop failed");
            Err(err.into())
        }
    }
}
