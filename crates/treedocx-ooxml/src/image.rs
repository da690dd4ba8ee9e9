//! Picture sizing and probing
//!
//! Word measures drawings in EMUs (English Metric Units):
//! - 914400 EMUs = 1 inch
//! - 9525 EMUs = 1 pixel (at 96 DPI)
//! - 635 EMUs = 1 twip (page geometry in `w:sectPr` is in twips)

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, ImageReader};

use crate::error::{OoxmlError, Result};

/// EMUs per inch (914400)
pub const EMU_PER_INCH: i64 = 914400;

/// EMUs per pixel at 96 DPI (9525)
pub const EMU_PER_PIXEL: i64 = 9525;

/// EMUs per twip (635)
pub const EMU_PER_TWIP: i64 = 635;

/// Convert pixels to EMUs
pub fn pixels_to_emu(pixels: i64) -> i64 {
    pixels * EMU_PER_PIXEL
}

/// Convert EMUs to twips
pub fn emu_to_twips(emu: i64) -> i64 {
    emu / EMU_PER_TWIP
}

/// Dimensions and format of a picture file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub width_px: u32,
    pub height_px: u32,
    /// Lowercase file extension for the media part ("png", "jpeg", ...)
    pub extension: String,
}

impl ImageInfo {
    /// Natural size in EMUs
    pub fn size_emu(&self) -> (i64, i64) {
        (
            pixels_to_emu(self.width_px as i64),
            pixels_to_emu(self.height_px as i64),
        )
    }
}

/// Read a picture's header from disk
pub fn probe_image(path: &Path) -> Result<ImageInfo> {
    let bytes = std::fs::read(path)?;
    probe_bytes(&bytes).map_err(|e| match e {
        OoxmlError::Image { source, .. } => OoxmlError::Image {
            path: path.display().to_string(),
            source,
        },
        other => other,
    })
}

/// Read a picture's header from memory
pub fn probe_bytes(bytes: &[u8]) -> Result<ImageInfo> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let format = reader.format();
    let (width_px, height_px) = reader
        .into_dimensions()
        .map_err(|source| OoxmlError::Image {
            path: "<memory>".to_string(),
            source,
        })?;
    let extension = match format {
        Some(ImageFormat::Png) => "png",
        Some(ImageFormat::Jpeg) => "jpeg",
        Some(ImageFormat::Gif) => "gif",
        Some(ImageFormat::Bmp) => "bmp",
        Some(ImageFormat::Tiff) => "tiff",
        _ => "bin",
    };
    Ok(ImageInfo {
        width_px,
        height_px,
        extension: extension.to_string(),
    })
}

/// MIME type for a media extension
pub fn content_type(extension: &str) -> &'static str {
    match extension.to_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "emf" => "image/x-emf",
        "wmf" => "image/x-wmf",
        _ => "application/octet-stream",
    }
}

/// Scale `(width, height)` down to `block_width`, keeping the aspect ratio.
///
/// Sizes that already fit are returned unchanged.
pub fn fit_to_width(size: (i64, i64), block_width: i64) -> (i64, i64) {
    let (width, height) = size;
    if width <= block_width || width <= 0 {
        return size;
    }
    let scaled = (height as i128 * block_width as i128 / width as i128) as i64;
    (block_width, scaled)
}
