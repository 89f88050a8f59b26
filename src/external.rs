//! JPEG and GIF, delegated to the `image` crate.
//!
//! Decoded images are normalized to [`PixelLayout::Rgb8`]. GIF decoding
//! keeps the first frame only.

use std::io::Cursor;

use enough::Stop;
use image::{ExtendedColorType, ImageFormat, ImageReader};

use crate::buffer::PixelBuffer;
use crate::error::RasterError;
use crate::limits::{Limits, check_output};
use crate::pixel::PixelLayout;

fn codec_error(e: image::ImageError) -> RasterError {
    RasterError::Codec(e.to_string())
}

fn probe_with(data: &[u8], format: ImageFormat) -> Result<(u32, u32, PixelLayout), RasterError> {
    let (width, height) = ImageReader::with_format(Cursor::new(data), format)
        .into_dimensions()
        .map_err(codec_error)?;
    Ok((width, height, PixelLayout::Rgb8))
}

fn decode_with(
    data: &[u8],
    format: ImageFormat,
    limits: Option<&Limits>,
    stop: &dyn Stop,
) -> Result<PixelBuffer, RasterError> {
    let (width, height, layout) = probe_with(data, format)?;
    check_output(limits, width, height, layout.bytes_per_pixel())?;
    stop.check()?;
    let rgb = image::load_from_memory_with_format(data, format)
        .map_err(codec_error)?
        .into_rgb8();
    let (width, height) = rgb.dimensions();
    log::debug!("{format:?}: decoded {width}x{height} via image");
    PixelBuffer::new(rgb.into_raw(), width, height, PixelLayout::Rgb8)
}

#[cfg(feature = "jpeg")]
pub(crate) mod jpeg {
    use super::*;
    use image::codecs::jpeg::JpegEncoder;

    pub(crate) const EXTENSIONS: &[&str] = &["jpg", "jpeg", "jpe", "jif", "jfif"];

    const DEFAULT_QUALITY: u8 = 85;

    pub(crate) fn detect(header: &[u8]) -> bool {
        header.starts_with(&[0xFF, 0xD8, 0xFF])
    }

    pub(crate) fn probe(data: &[u8]) -> Result<(u32, u32, PixelLayout), RasterError> {
        probe_with(data, ImageFormat::Jpeg)
    }

    pub(crate) fn decode(
        data: &[u8],
        limits: Option<&Limits>,
        stop: &dyn Stop,
    ) -> Result<PixelBuffer, RasterError> {
        decode_with(data, ImageFormat::Jpeg, limits, stop)
    }

    /// Encode as baseline JPEG. Alpha is dropped.
    pub(crate) fn encode(
        buffer: &PixelBuffer,
        quality: Option<u8>,
        stop: &dyn Stop,
    ) -> Result<Vec<u8>, RasterError> {
        let quality = quality.unwrap_or(DEFAULT_QUALITY).clamp(1, 100);
        let rgb = buffer.convert(PixelLayout::Rgb8);
        stop.check()?;
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, quality)
            .encode(
                rgb.samples(),
                rgb.width(),
                rgb.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(codec_error)?;
        log::debug!(
            "jpeg: encoded {}x{} at quality {quality}, {} bytes",
            rgb.width(),
            rgb.height(),
            out.len()
        );
        Ok(out)
    }
}

#[cfg(feature = "gif")]
pub(crate) mod gif {
    use super::*;
    use image::codecs::gif::GifEncoder;

    pub(crate) const EXTENSIONS: &[&str] = &["gif"];

    pub(crate) fn detect(header: &[u8]) -> bool {
        header.starts_with(b"GIF87a") || header.starts_with(b"GIF89a")
    }

    pub(crate) fn probe(data: &[u8]) -> Result<(u32, u32, PixelLayout), RasterError> {
        probe_with(data, ImageFormat::Gif)
    }

    pub(crate) fn decode(
        data: &[u8],
        limits: Option<&Limits>,
        stop: &dyn Stop,
    ) -> Result<PixelBuffer, RasterError> {
        decode_with(data, ImageFormat::Gif, limits, stop)
    }

    /// Encode a single-frame GIF.
    pub(crate) fn encode(buffer: &PixelBuffer, stop: &dyn Stop) -> Result<Vec<u8>, RasterError> {
        let rgba = buffer.convert(PixelLayout::Rgba8);
        stop.check()?;
        let mut out = Vec::new();
        {
            // The encoder writes the trailer when dropped.
            let mut encoder = GifEncoder::new(&mut out);
            encoder
                .encode(
                    rgba.samples(),
                    rgba.width(),
                    rgba.height(),
                    ExtendedColorType::Rgba8,
                )
                .map_err(codec_error)?;
        }
        log::debug!(
            "gif: encoded {}x{}, {} bytes",
            rgba.width(),
            rgba.height(),
            out.len()
        );
        Ok(out)
    }
}
