//! PNG encoder: 8-bit RGB/RGBA, one IDAT chunk.

use enough::Stop;

use super::chunk::{SIGNATURE, write_chunk};
use super::filter::{FilterType, filter_row, filter_row_adaptive};
use crate::buffer::PixelBuffer;
use crate::encode::FilterStrategy;
use crate::error::RasterError;
use crate::pixel::PixelLayout;

/// Largest width/height PNG can express.
const MAX_DIMENSION: u32 = (1 << 31) - 1;

pub(crate) fn encode_png(
    buffer: &PixelBuffer,
    strategy: FilterStrategy,
    compression_level: u8,
    stop: &dyn Stop,
) -> Result<Vec<u8>, RasterError> {
    let color_type: u8 = match buffer.layout() {
        PixelLayout::Rgb8 => 2,
        PixelLayout::Rgba8 => 6,
        other => return Err(RasterError::UnsupportedColorMode(other)),
    };
    let width = buffer.width();
    let height = buffer.height();
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(RasterError::DimensionsTooLarge { width, height });
    }

    let bpp = buffer.layout().bytes_per_pixel();
    let row_bytes = buffer.stride();
    let mut scanlines = Vec::with_capacity((row_bytes + 1) * height as usize);
    let mut scratch = Vec::new();
    for y in 0..height {
        if y % 16 == 0 {
            stop.check()?;
        }
        let row = buffer.row(y);
        let prev = if y > 0 { Some(buffer.row(y - 1)) } else { None };
        match strategy {
            FilterStrategy::None => {
                scanlines.push(FilterType::None as u8);
                filter_row(FilterType::None, row, prev, bpp, &mut scanlines);
            }
            FilterStrategy::Adaptive => {
                filter_row_adaptive(row, prev, bpp, &mut scratch, &mut scanlines);
            }
        }
    }

    stop.check()?;
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&scanlines, compression_level);
    stop.check()?;

    let mut ihdr = [0u8; 13];
    ihdr[0..4].copy_from_slice(&width.to_be_bytes());
    ihdr[4..8].copy_from_slice(&height.to_be_bytes());
    ihdr[8] = 8; // bit depth
    ihdr[9] = color_type;
    // compression, filter method and interlace stay 0

    let mut out = Vec::with_capacity(SIGNATURE.len() + compressed.len() + 3 * 12 + ihdr.len());
    out.extend_from_slice(&SIGNATURE);
    write_chunk(&mut out, b"IHDR", &ihdr)?;
    write_chunk(&mut out, b"IDAT", &compressed)?;
    write_chunk(&mut out, b"IEND", &[])?;

    log::debug!(
        "png: encoded {width}x{height} {:?} ({:?} filters), {} scanline bytes -> {} bytes",
        buffer.layout(),
        strategy,
        scanlines.len(),
        out.len()
    );
    Ok(out)
}
