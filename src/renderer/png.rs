use image::codecs::png::{CompressionType, FilterType, PngEncoder as ImagePngEncoder};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};

use super::config::PngCompression;
use crate::error::{Error, Result};

pub const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Serializes a finished canvas as an 8-bit RGB PNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngEncoder {
    compression: PngCompression,
}

impl PngEncoder {
    pub fn new(compression: PngCompression) -> Self {
        Self { compression }
    }

    pub fn encode(&self, canvas: RgbaImage) -> Result<Vec<u8>> {
        let (width, height) = canvas.dimensions();
        // overlays are composited onto an opaque base, alpha carries nothing
        let rgb = DynamicImage::ImageRgba8(canvas).into_rgb8();

        let compression = match self.compression {
            PngCompression::Fast => CompressionType::Fast,
            PngCompression::Default => CompressionType::Default,
            PngCompression::Best => CompressionType::Best,
        };
        let mut buf = Vec::new();
        ImagePngEncoder::new_with_quality(&mut buf, compression, FilterType::Adaptive)
            .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
            .map_err(|e| Error::Encode(e.to_string()))?;
        Ok(buf)
    }
}
