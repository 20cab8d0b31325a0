//! Inventory icons: RGBA images with a PNG codec.

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, ImageFormat, Rgba, RgbaImage};
use thiserror::Error;

/// Side length of the gray placeholder shown for items without a usable icon.
pub const PLACEHOLDER_ICON_SIZE: u32 = 64;

/// Errors from encoding or decoding icon bytes.
#[derive(Debug, Error)]
pub enum IconError {
    /// PNG encode/decode failure.
    #[error("icon codec failed: {0}")]
    Codec(#[from] image::ImageError),
    /// No bytes were supplied.
    #[error("icon data is empty")]
    Empty,
}

/// Square or rectangular RGBA8 icon.
#[derive(Debug, Clone, PartialEq)]
pub struct Icon {
    image: RgbaImage,
}

impl Icon {
    /// Wrap an existing image.
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Build from tightly packed RGBA8 bytes. Returns `None` on a size mismatch.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        RgbaImage::from_raw(width, height, rgba).map(Self::from_image)
    }

    /// Image filled with a single color.
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self::from_image(RgbaImage::from_pixel(width, height, Rgba(color)))
    }

    /// Fully transparent image.
    pub fn transparent(size: u32) -> Self {
        Self::filled(size, size, [0, 0, 0, 0])
    }

    /// Opaque gray placeholder used when icon bytes are missing or corrupt.
    pub fn placeholder() -> Self {
        Self::filled(
            PLACEHOLDER_ICON_SIZE,
            PLACEHOLDER_ICON_SIZE,
            [128, 128, 128, 255],
        )
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Pixel at (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    /// Borrow the underlying image.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Raw RGBA8 bytes.
    pub fn as_rgba(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Count of pixels with non-zero alpha.
    pub fn opaque_pixel_count(&self) -> usize {
        self.image.pixels().filter(|p| p.0[3] != 0).count()
    }

    /// Encode as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, IconError> {
        let mut out = Vec::new();
        let encoder =
            PngEncoder::new_with_quality(&mut out, CompressionType::Fast, FilterType::NoFilter);
        encoder.write_image(
            self.image.as_raw(),
            self.image.width(),
            self.image.height(),
            ExtendedColorType::Rgba8,
        )?;
        Ok(out)
    }

    /// Decode PNG bytes.
    pub fn from_png(bytes: &[u8]) -> Result<Self, IconError> {
        if bytes.is_empty() {
            return Err(IconError::Empty);
        }
        let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
        Ok(Self::from_image(decoded.to_rgba8()))
    }
}
