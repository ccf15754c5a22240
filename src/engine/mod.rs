//! Contract of the external image processing engine.
//!
//! Filter math and encoding live behind [`ImageEngine`]; this crate only
//! decides when and with which committed parameters the engine is called.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adjustments::AdjustmentParams;

/// Decoded source or processed bitmap.
pub type Bitmap = image::RgbaImage;

pub type EngineResult<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("image engine is not loaded")]
    Unavailable,
    #[error("source bitmap cannot be decoded: {0}")]
    Decode(String),
    #[error("filter processing failed: {0}")]
    Processing(String),
    #[error("encoding {format:?} failed: {reason}")]
    Encode {
        format: ExportFormat,
        reason: String,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Decode failures abort the attempt and keep whatever was shown before.
    pub const fn keeps_previous_preview(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ExportFormat {
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }

    pub const fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Webp => image::ImageFormat::WebP,
        }
    }

    /// PNG is lossless and ignores any quality setting.
    pub const fn uses_quality(self) -> bool {
        !matches!(self, Self::Png)
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Png => "Lossless compression, larger files, supports transparency",
            Self::Jpeg => "Lossy compression, small files, no transparency",
            Self::Webp => "Modern format, small files, supports transparency",
        }
    }
}

/// Encoder quality in `[10, 100]`, always a multiple of 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "f64", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const MIN: Quality = Quality(10);
    pub const MAX: Quality = Quality(100);
    pub const STEP: u8 = 5;
    pub const DEFAULT: Quality = Quality(90);

    /// Snaps `value` to the nearest step inside the valid range.
    pub fn new(value: f64) -> Self {
        if !value.is_finite() {
            return Self::DEFAULT;
        }
        let step = f64::from(Self::STEP);
        let snapped = (value / step).round() * step;
        let clamped = snapped.clamp(f64::from(Self::MIN.0), f64::from(Self::MAX.0));
        Self(clamped as u8)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    pub const fn label(self) -> &'static str {
        match self.0 {
            90..=u8::MAX => "Excellent",
            75..=89 => "Very Good",
            60..=74 => "Good",
            40..=59 => "Fair",
            _ => "Poor",
        }
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<f64> for Quality {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

/// Argument list of `process_all_filters`, in the order the engine consumes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterArgs {
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub monochrome: bool,
    pub blur: f64,
    pub sharpen: f64,
    pub pixelate: u32,
    pub gamma: f64,
}

impl From<&AdjustmentParams> for FilterArgs {
    fn from(params: &AdjustmentParams) -> Self {
        Self {
            brightness: params.color.brightness,
            contrast: params.color.contrast,
            saturation: params.color.saturation,
            monochrome: params.color.monochrome,
            blur: params.filters.blur,
            sharpen: params.filters.sharpen,
            pixelate: params.pixelate_block_size(),
            gamma: params.color.gamma,
        }
    }
}

pub trait ImageEngine: Send + Sync {
    fn process_all_filters(&self, source: &Bitmap, args: &FilterArgs) -> EngineResult<Bitmap>;

    fn preview_data_url(
        &self,
        bitmap: &Bitmap,
        format: ExportFormat,
        quality: Quality,
    ) -> EngineResult<String>;

    /// Encodes and writes `bitmap`; `quality` is `None` for PNG.
    fn encode_and_save(
        &self,
        bitmap: &Bitmap,
        format: ExportFormat,
        filename: &str,
        quality: Option<Quality>,
    ) -> EngineResult<PathBuf>;

    /// Diagnostic identity string for the debug overlay.
    fn identity(&self) -> String;
}

/// A zero-sized bitmap cannot be drawn, so it counts as a decode failure.
pub fn ensure_drawable(bitmap: &Bitmap) -> EngineResult<()> {
    let (width, height) = bitmap.dimensions();
    if width == 0 || height == 0 {
        return Err(EngineError::Decode(format!(
            "empty bitmap {width}x{height}"
        )));
    }
    Ok(())
}
