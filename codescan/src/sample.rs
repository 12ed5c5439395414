//! Raw image samples handed to a decode attempt

use std::path::Path;

use imageproc::image::{self, DynamicImage, GrayImage, Luma};
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter};

use crate::error::DecodeError;

/// Interleaved channel layout of a sample, valued by channels per pixel.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, TryFromPrimitive, EnumCount, EnumIter,
)]
#[repr(u8)]
pub enum Channels {
    Luma = 1,
    LumaAlpha = 2,
    Rgb = 3,
    Rgba = 4,
}

impl Channels {
    pub fn len() -> usize {
        Self::COUNT
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }

    pub fn count(self) -> usize {
        self as usize
    }

    /// Work out the layout from a buffer length, for callers that only pass
    /// data and dimensions.
    pub fn infer(len: usize, width: u32, height: u32) -> Result<Self, DecodeError> {
        let pixels = pixel_count(width, height)?;
        if len == 0 || len % pixels != 0 {
            return Err(DecodeError::invalid(format!(
                "{len} bytes is not a whole number of channels for {width}x{height}"
            )));
        }

        u8::try_from(len / pixels)
            .ok()
            .and_then(|n| Channels::try_from(n).ok())
            .ok_or_else(|| {
                DecodeError::invalid(format!(
                    "{} channels per pixel is not supported (expected 1-4)",
                    len / pixels
                ))
            })
    }
}

fn pixel_count(width: u32, height: u32) -> Result<usize, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::invalid(format!(
            "dimensions must be positive, got {width}x{height}"
        )));
    }

    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| DecodeError::invalid(format!("{width}x{height} overflows")))
}

/// Pixel data plus dimensions. `data.len() == width * height * channels`
/// always holds for a constructed sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSample {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: Channels,
}

impl ImageSample {
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        channels: Channels,
    ) -> Result<Self, DecodeError> {
        let expected = pixel_count(width, height)?
            .checked_mul(channels.count())
            .ok_or_else(|| DecodeError::invalid(format!("{width}x{height} overflows")))?;

        if data.len() != expected {
            return Err(DecodeError::invalid(format!(
                "expected {expected} bytes for {width}x{height} {channels:?}, got {}",
                data.len()
            )));
        }

        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Build a sample whose layout is inferred from the buffer length.
    pub fn from_raw(data: Vec<u8>, width: u32, height: u32) -> Result<Self, DecodeError> {
        let channels = Channels::infer(data.len(), width, height)?;
        Self::new(data, width, height, channels)
    }

    pub fn luma(data: Vec<u8>, width: u32, height: u32) -> Result<Self, DecodeError> {
        Self::new(data, width, height, Channels::Luma)
    }

    pub fn rgba(data: Vec<u8>, width: u32, height: u32) -> Result<Self, DecodeError> {
        Self::new(data, width, height, Channels::Rgba)
    }

    pub fn from_image(img: &DynamicImage) -> Result<Self, DecodeError> {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::rgba(rgba.into_raw(), width, height)
    }

    pub fn from_path(path: &Path) -> Result<Self, DecodeError> {
        let img = image::open(path).map_err(|source| DecodeError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!(
            "Loaded {} ({}x{})",
            path.display(),
            img.width(),
            img.height()
        );
        Self::from_image(&img)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Grayscale view of the sample, alpha ignored. Decoders that binarize
    /// usually start here.
    pub fn to_luma(&self) -> GrayImage {
        let stride = self.channels.count();
        let width = self.width as usize;

        GrayImage::from_fn(self.width, self.height, |x, y| {
            let i = (y as usize * width + x as usize) * stride;
            let px = &self.data[i..i + stride];
            let value = match self.channels {
                Channels::Luma | Channels::LumaAlpha => px[0],
                Channels::Rgb | Channels::Rgba => luminance(px[0], px[1], px[2]),
            };
            Luma([value])
        })
    }
}

// ITU-R BT.601 weights, integer form
fn luminance(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000) as u8
}
