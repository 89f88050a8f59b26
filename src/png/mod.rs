//! PNG decoder and encoder (internal).
//!
//! Covers 8-bit truecolor (color type 2) and truecolor with alpha (color
//! type 6), non-interlaced. All five scanline filters are reversed on
//! decode; the encoder writes filter 0 or picks a filter per row.

mod chunk;
mod decode;
mod encode;
mod filter;

use enough::Stop;

use crate::buffer::PixelBuffer;
use crate::decode::Permissiveness;
use crate::encode::EncodeOptions;
use crate::error::RasterError;
use crate::limits::Limits;
use crate::pixel::PixelLayout;

pub(crate) const EXTENSIONS: &[&str] = &["png"];

/// Whether `header` starts with the 8-byte PNG signature.
pub(crate) fn detect(header: &[u8]) -> bool {
    header.starts_with(&chunk::SIGNATURE)
}

/// Read dimensions and layout from IHDR.
pub(crate) fn probe(data: &[u8]) -> Result<(u32, u32, PixelLayout), RasterError> {
    let header = decode::parse_png_header(data)?;
    Ok((header.width, header.height, header.layout))
}

pub(crate) fn decode(
    data: &[u8],
    limits: Option<&Limits>,
    permissiveness: Permissiveness,
    stop: &dyn Stop,
) -> Result<PixelBuffer, RasterError> {
    decode::decode_png(data, limits, permissiveness, stop)
}

pub(crate) fn encode(
    buffer: &PixelBuffer,
    options: &EncodeOptions,
    stop: &dyn Stop,
) -> Result<Vec<u8>, RasterError> {
    encode::encode_png(buffer, options.png_filter, options.compression_level, stop)
}
