// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `/dev/fbN` device surface.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use framebuf_core::{Bounds, DeviceSurface, FramebufError};
use image::RgbaImage;
use tracing::{debug, info};

use crate::layout::PixelLayout;

/// Environment variable naming the framebuffer device node.
pub const DEVICE_ENV: &str = "FRAMEBUFFER";
/// Device node used when [`DEVICE_ENV`] is unset.
pub const DEFAULT_DEVICE: &str = "/dev/fb0";
/// Where the kernel exposes per-device geometry.
pub const SYSFS_GRAPHICS: &str = "/sys/class/graphics";

/// Geometry and pixel format read from a device's sysfs directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Visible pixel extent.
    pub bounds: Bounds,
    /// Bytes between the starts of consecutive rows.
    pub stride: usize,
    /// Native pixel encoding.
    pub layout: PixelLayout,
}

impl Geometry {
    /// Read `virtual_size`, `bits_per_pixel` and (optionally) `stride`
    /// from `dir`. A missing `stride` node falls back to tightly packed rows.
    pub fn read(dir: &Path) -> Result<Self, FramebufError> {
        let (width, height) = parse_virtual_size(&read_node(dir, "virtual_size")?)?;
        let bpp = parse_number(&read_node(dir, "bits_per_pixel")?, "bits_per_pixel")?;
        let layout = PixelLayout::from_bits_per_pixel(bpp)?;
        let packed = width as usize * layout.bytes_per_pixel();
        let stride = match fs::read_to_string(dir.join("stride")) {
            Ok(raw) => parse_number(&raw, "stride")? as usize,
            Err(err) if err.kind() == io::ErrorKind::NotFound => packed,
            Err(err) => return Err(init_error("stride", &err)),
        };
        if stride < packed {
            return Err(FramebufError::DeviceInit(format!(
                "stride {stride} is shorter than a {width}px row"
            )));
        }
        Ok(Self {
            bounds: Bounds::new(width, height),
            stride,
            layout,
        })
    }

    /// Size in bytes of the whole pixel memory.
    pub fn byte_len(&self) -> u64 {
        self.stride as u64 * u64::from(self.bounds.height)
    }
}

fn read_node(dir: &Path, name: &str) -> Result<String, FramebufError> {
    fs::read_to_string(dir.join(name)).map_err(|err| init_error(name, &err))
}

fn init_error(name: &str, err: &io::Error) -> FramebufError {
    FramebufError::DeviceInit(format!("could not read {name}: {err}"))
}

fn parse_number(raw: &str, name: &str) -> Result<u32, FramebufError> {
    raw.trim()
        .parse()
        .map_err(|_| FramebufError::DeviceInit(format!("malformed {name}: {:?}", raw.trim())))
}

fn parse_virtual_size(raw: &str) -> Result<(u32, u32), FramebufError> {
    let malformed = || FramebufError::DeviceInit(format!("malformed virtual_size: {:?}", raw.trim()));
    let (w, h) = raw.trim().split_once(',').ok_or_else(malformed)?;
    let w = w.trim().parse().map_err(|_| malformed())?;
    let h = h.trim().parse().map_err(|_| malformed())?;
    Ok((w, h))
}

/// A Linux framebuffer device node opened for writing.
///
/// Frames are encoded row by row into the device's native layout and written
/// with positioned writes; no memory mapping is involved.
#[derive(Debug)]
pub struct FbDevice {
    path: PathBuf,
    file: File,
    geometry: Geometry,
    row: Vec<u8>,
}

impl FbDevice {
    /// Open the device named by `$FRAMEBUFFER`, or `/dev/fb0`.
    pub fn open_default() -> Result<Self, FramebufError> {
        let path = std::env::var_os(DEVICE_ENV)
            .filter(|v| !v.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_DEVICE), PathBuf::from);
        Self::open(path)
    }

    /// Open `path`, reading its geometry from `/sys/class/graphics/<name>`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FramebufError> {
        let path = path.as_ref();
        let name = path.file_name().ok_or_else(|| FramebufError::DeviceOpen {
            device: path.display().to_string(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a device node"),
        })?;
        Self::open_with_sysfs(path, Path::new(SYSFS_GRAPHICS).join(name))
    }

    /// Open `path` with geometry read from an explicit sysfs directory.
    pub fn open_with_sysfs(
        path: impl AsRef<Path>,
        sysfs_dir: impl AsRef<Path>,
    ) -> Result<Self, FramebufError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| FramebufError::DeviceOpen {
                device: path.display().to_string(),
                source,
            })?;
        let geometry = Geometry::read(sysfs_dir.as_ref())?;
        info!(
            device = %path.display(),
            width = geometry.bounds.width,
            height = geometry.bounds.height,
            stride = geometry.stride,
            layout = ?geometry.layout,
            "framebuffer device opened"
        );
        Ok(Self {
            path,
            file,
            geometry,
            row: Vec::new(),
        })
    }

    /// Device node this surface writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Geometry read at open time.
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }
}

impl DeviceSurface for FbDevice {
    fn bounds(&self) -> Bounds {
        self.geometry.bounds
    }

    fn write_frame(&mut self, frame: &RgbaImage) -> Result<(), FramebufError> {
        let Geometry {
            bounds,
            stride,
            layout,
        } = self.geometry;
        let w = frame.width().min(bounds.width);
        let h = frame.height().min(bounds.height);
        if w == 0 || h == 0 {
            return Ok(());
        }
        self.row.resize(w as usize * layout.bytes_per_pixel(), 0);
        for (y, pixels) in frame.rows().take(h as usize).enumerate() {
            layout.encode_row(pixels.take(w as usize), &mut self.row);
            self.file
                .seek(SeekFrom::Start((y * stride) as u64))
                .and_then(|_| self.file.write_all(&self.row))
                .map_err(FramebufError::DeviceWrite)?;
        }
        debug!(width = w, height = h, "frame written");
        Ok(())
    }

    fn write_raw_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<usize> {
        let len = self.geometry.byte_len();
        if offset >= len {
            return Ok(0);
        }
        let room = usize::try_from(len - offset).unwrap_or(usize::MAX);
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write(&bytes[..bytes.len().min(room)])
    }
}
