//! BMP decoder and encoder (internal).
//!
//! Use [`crate::Codec::Bmp`] or the request builders.

mod decode;
mod encode;

use enough::Stop;

use crate::buffer::PixelBuffer;
use crate::decode::Permissiveness;
use crate::error::RasterError;
use crate::limits::Limits;
use crate::pixel::PixelLayout;

pub(crate) const EXTENSIONS: &[&str] = &["bmp", "dib"];

/// Whether `header` starts with the `BM` magic.
pub(crate) fn detect(header: &[u8]) -> bool {
    header.starts_with(b"BM")
}

/// Read dimensions and layout from the headers.
pub(crate) fn probe(data: &[u8]) -> Result<(u32, u32, PixelLayout), RasterError> {
    let header = decode::parse_bmp_header(data)?;
    Ok((header.width, header.height, header.layout))
}

/// Decode BMP data (output in RGB/RGBA byte order).
pub(crate) fn decode(
    data: &[u8],
    limits: Option<&Limits>,
    permissiveness: Permissiveness,
    stop: &dyn Stop,
) -> Result<PixelBuffer, RasterError> {
    decode::decode_bmp(data, limits, permissiveness, stop)
}

/// Encode to BMP.
pub(crate) fn encode(buffer: &PixelBuffer, stop: &dyn Stop) -> Result<Vec<u8>, RasterError> {
    encode::encode_bmp(buffer, stop)
}
