use enough::Stop;

use crate::buffer::PixelBuffer;
use crate::error::RasterError;
use crate::registry::Codec;

/// How the PNG encoder picks a scanline filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterStrategy {
    /// Filter type 0 on every row.
    #[default]
    None,
    /// Per row, the filter with the smallest sum of absolute residuals.
    Adaptive,
}

/// Options for encoding and saving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Lossy quality, 0-100. Ignored by BMP, PNG and GIF.
    pub quality: Option<u8>,
    /// Resize to this width before saving.
    pub target_width: Option<u32>,
    /// Resize to this height before saving.
    pub target_height: Option<u32>,
    pub png_filter: FilterStrategy,
    /// Deflate level for PNG, 0 (store) to 10.
    pub compression_level: u8,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            quality: None,
            target_width: None,
            target_height: None,
            png_filter: FilterStrategy::None,
            compression_level: 6,
        }
    }
}

impl EncodeOptions {
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_target_size(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.target_width = width;
        self.target_height = height;
        self
    }

    pub fn with_png_filter(mut self, strategy: FilterStrategy) -> Self {
        self.png_filter = strategy;
        self
    }

    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.compression_level = level;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), RasterError> {
        if let Some(q) = self.quality {
            if q > 100 {
                return Err(RasterError::InvalidOptions(format!(
                    "quality {q} is outside 0-100"
                )));
            }
        }
        if self.compression_level > 10 {
            return Err(RasterError::InvalidOptions(format!(
                "compression level {} is outside 0-10",
                self.compression_level
            )));
        }
        Ok(())
    }
}

/// Encode a [`PixelBuffer`] to bytes.
///
/// ```no_run
/// use zenraster::{EncodeOptions, EncodeRequest, FilterStrategy, PixelBuffer, PixelLayout, Unstoppable};
///
/// let image = PixelBuffer::blank(64, 48, PixelLayout::Rgb8)?;
/// let png = EncodeRequest::png()
///     .with_options(EncodeOptions::default().with_png_filter(FilterStrategy::Adaptive))
///     .encode(&image, Unstoppable)?;
/// # Ok::<(), zenraster::RasterError>(())
/// ```
#[derive(Clone, Debug)]
pub struct EncodeRequest {
    codec: Codec,
    options: EncodeOptions,
}

impl EncodeRequest {
    pub fn bmp() -> Self {
        Self::for_codec(Codec::Bmp)
    }

    pub fn png() -> Self {
        Self::for_codec(Codec::Png)
    }

    pub fn for_codec(codec: Codec) -> Self {
        Self {
            codec,
            options: EncodeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: EncodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Encode `buffer`. Target sizes in the options are ignored here; they
    /// apply when saving an [`crate::Image`].
    pub fn encode(&self, buffer: &PixelBuffer, stop: impl Stop) -> Result<Vec<u8>, RasterError> {
        self.codec.encode_raw(buffer, &self.options, &stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::PixelLayout;
    use enough::Unstoppable;

    #[test]
    fn quality_above_100_rejected() {
        let buf = PixelBuffer::blank(1, 1, PixelLayout::Rgb8).unwrap();
        let err = EncodeRequest::png()
            .with_options(EncodeOptions::default().with_quality(101))
            .encode(&buf, Unstoppable)
            .unwrap_err();
        assert!(matches!(err, RasterError::InvalidOptions(_)));
    }

    #[test]
    fn quality_ignored_by_lossless() {
        let buf = PixelBuffer::new(vec![9, 8, 7], 1, 1, PixelLayout::Rgb8).unwrap();
        let plain = EncodeRequest::bmp().encode(&buf, Unstoppable).unwrap();
        let with_q = EncodeRequest::bmp()
            .with_options(EncodeOptions::default().with_quality(10))
            .encode(&buf, Unstoppable)
            .unwrap();
        assert_eq!(plain, with_q);
    }

    #[test]
    fn compression_level_range() {
        assert!(EncodeOptions::default().with_compression_level(10).validate().is_ok());
        assert!(EncodeOptions::default().with_compression_level(11).validate().is_err());
    }

    #[test]
    fn gray_not_encodable() {
        let buf = PixelBuffer::blank(2, 2, PixelLayout::Gray8).unwrap();
        for request in [EncodeRequest::bmp(), EncodeRequest::png()] {
            assert!(matches!(
                request.encode(&buf, Unstoppable),
                Err(RasterError::UnsupportedColorMode(PixelLayout::Gray8))
            ));
        }
    }
}
