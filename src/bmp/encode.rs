//! BMP encoder: uncompressed 24-bit and 32-bit BMP.

use enough::Stop;

use crate::buffer::PixelBuffer;
use crate::error::RasterError;
use crate::pixel::PixelLayout;

use super::decode::MIN_HEADER_LEN;

/// Encode an RGB or RGBA buffer as a bottom-up BMP.
///
/// `Rgb8` becomes 24-bit, `Rgba8` 32-bit with the alpha byte kept as-is.
pub(crate) fn encode_bmp(buffer: &PixelBuffer, stop: &dyn Stop) -> Result<Vec<u8>, RasterError> {
    let layout = buffer.layout();
    let bpp: u16 = match layout {
        PixelLayout::Rgb8 => 24,
        PixelLayout::Rgba8 => 32,
        other => return Err(RasterError::UnsupportedColorMode(other)),
    };

    let width = buffer.width();
    let height = buffer.height();
    let too_large = RasterError::DimensionsTooLarge { width, height };
    if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
        return Err(too_large);
    }

    let w = width as usize;
    let h = height as usize;
    let src_bpp = layout.bytes_per_pixel();
    let row_size = w * src_bpp;
    let pad_bytes = (4 - row_size % 4) % 4;
    let row_stride = row_size + pad_bytes;
    let (pixel_data_size, file_size) = match row_stride
        .checked_mul(h)
        .and_then(|size| Some((size, size.checked_add(MIN_HEADER_LEN)?)))
    {
        Some((size, total)) if u32::try_from(total).is_ok() => (size, total),
        _ => return Err(too_large),
    };

    stop.check()?;

    let mut out = Vec::with_capacity(file_size);
    write_bmp_header(&mut out, file_size, pixel_data_size, width, height, bpp);

    for row in (0..height).rev() {
        if row % 16 == 0 {
            stop.check()?;
        }
        for px in buffer.row(row).chunks_exact(src_bpp) {
            out.extend_from_slice(&[px[2], px[1], px[0]]);
            if src_bpp == 4 {
                out.push(px[3]);
            }
        }
        out.extend(core::iter::repeat_n(0u8, pad_bytes));
    }

    log::debug!("bmp: encoded {width}x{height} {bpp}-bit, {file_size} bytes");
    Ok(out)
}

fn write_bmp_header(
    out: &mut Vec<u8>,
    file_size: usize,
    pixel_data_size: usize,
    width: u32,
    height: u32,
    bpp: u16,
) {
    // File header (14 bytes)
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(file_size as u32).to_le_bytes());
    out.extend_from_slice(&[0u8; 4]); // reserved
    out.extend_from_slice(&(MIN_HEADER_LEN as u32).to_le_bytes()); // data offset

    // DIB header (BITMAPINFOHEADER, 40 bytes)
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&(width as i32).to_le_bytes());
    out.extend_from_slice(&(height as i32).to_le_bytes()); // positive = bottom-up
    out.extend_from_slice(&1u16.to_le_bytes()); // planes
    out.extend_from_slice(&bpp.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // compression
    out.extend_from_slice(&(pixel_data_size as u32).to_le_bytes());
    out.extend_from_slice(&2835u32.to_le_bytes()); // h resolution (72 DPI)
    out.extend_from_slice(&2835u32.to_le_bytes()); // v resolution
    out.extend_from_slice(&0u32.to_le_bytes()); // colors used
    out.extend_from_slice(&0u32.to_le_bytes()); // important colors
}
