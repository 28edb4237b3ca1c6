//! Image transcoding backed by the `image` crate.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat, imageops};

use crate::error::ImageError;
use crate::service::Transcoder;

/// Distance between the watermark and the image edges, in pixels.
const WATERMARK_MARGIN: u32 = 10;

/// Transcoder converting WebP to JPEG and stamping watermarks.
#[derive(Clone, Copy, Debug)]
pub struct ImageTranscoder {
    quality: u8,
}

impl Default for ImageTranscoder {
    fn default() -> Self {
        Self { quality: 85 }
    }
}

impl ImageTranscoder {
    /// Create a transcoder with the given JPEG quality (1-100).
    #[must_use]
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    fn encode_jpeg(&self, image: &DynamicImage) -> Result<Vec<u8>, ImageError> {
        let mut out = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut out, self.quality);
        encoder.encode_image(&image.to_rgb8())?;
        Ok(out)
    }
}

impl Transcoder for ImageTranscoder {
    fn ready(&self) -> bool {
        true
    }

    fn webp_to_jpeg(&self, data: &[u8]) -> Result<Vec<u8>, ImageError> {
        let image = image::load_from_memory_with_format(data, ImageFormat::WebP)?;
        self.encode_jpeg(&image)
    }

    /// Overlay `watermark` at the bottom-right corner of `image`.
    ///
    /// A watermark larger than the image is placed at the top-left corner
    /// and clipped.
    fn add_watermark(&self, image: &[u8], watermark: &[u8]) -> Result<Vec<u8>, ImageError> {
        let format = image::guess_format(image)?;
        let mut base = image::load_from_memory_with_format(image, format)?;
        let mark = image::load_from_memory(watermark)?;

        let (width, height) = base.dimensions();
        let (mark_width, mark_height) = mark.dimensions();
        let x = width.saturating_sub(mark_width + WATERMARK_MARGIN);
        let y = height.saturating_sub(mark_height + WATERMARK_MARGIN);
        imageops::overlay(&mut base, &mark, i64::from(x), i64::from(y));

        if format == ImageFormat::Jpeg {
            return self.encode_jpeg(&base);
        }
        let mut out = Cursor::new(Vec::new());
        base.write_to(&mut out, format)?;
        Ok(out.into_inner())
    }
}
