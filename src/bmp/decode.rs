//! BMP decoder: uncompressed 24-bit and 32-bit bitmaps.
//!
//! Accepts BITMAPINFOHEADER and its V4/V5 extensions. Rows are stored
//! bottom-up (positive height) or top-down (negative height), each padded to
//! a 4-byte boundary, in B,G,R[,A] order.

use enough::Stop;

use crate::buffer::PixelBuffer;
use crate::decode::Permissiveness;
use crate::error::RasterError;
use crate::limits::{Limits, check_output};
use crate::pixel::PixelLayout;

const FILE_HEADER_LEN: usize = 14;
const INFO_HEADER_LEN: u32 = 40;
/// File header plus BITMAPINFOHEADER.
pub(crate) const MIN_HEADER_LEN: usize = FILE_HEADER_LEN + INFO_HEADER_LEN as usize;

const BI_RGB: u32 = 0;
const BI_BITFIELDS: u32 = 3;
const BI_ALPHABITFIELDS: u32 = 6;

/// R, G, B masks of a B8G8R8A8 pixel.
const BGRA_MASKS: [u32; 3] = [0x00FF_0000, 0x0000_FF00, 0x0000_00FF];

// ── Cursor for reading from &[u8] ───────────────────────────────────

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn skip(&mut self, n: usize) -> Result<(), RasterError> {
        let new_pos = self.pos.checked_add(n).ok_or(RasterError::TruncatedFile)?;
        if new_pos > self.data.len() {
            return Err(RasterError::TruncatedFile);
        }
        self.pos = new_pos;
        Ok(())
    }

    fn read_fixed_bytes<const N: usize>(&mut self) -> Result<[u8; N], RasterError> {
        let bytes = self
            .data
            .get(self.pos..self.pos + N)
            .ok_or(RasterError::TruncatedFile)?;
        let mut buf = [0u8; N];
        buf.copy_from_slice(bytes);
        self.pos += N;
        Ok(buf)
    }

    fn get_u16_le(&mut self) -> Result<u16, RasterError> {
        self.read_fixed_bytes().map(u16::from_le_bytes)
    }

    fn get_u32_le(&mut self) -> Result<u32, RasterError> {
        self.read_fixed_bytes().map(u32::from_le_bytes)
    }

    fn get_i32_le(&mut self) -> Result<i32, RasterError> {
        self.read_fixed_bytes().map(i32::from_le_bytes)
    }
}

// ── Parsed BMP header ───────────────────────────────────────────────

#[derive(Debug)]
pub(crate) struct BmpHeader {
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
    /// Rows stored top row first (negative height field).
    top_down: bool,
    bits_per_pixel: u16,
    data_offset: usize,
    file_size: u32,
    planes: u16,
}

impl BmpHeader {
    /// Unpadded bytes per stored row.
    fn row_size(&self) -> usize {
        self.width as usize * usize::from(self.bits_per_pixel / 8)
    }

    /// Bytes per stored row including the padding to a 4-byte boundary.
    fn row_stride(&self) -> usize {
        let row_size = self.row_size();
        row_size + (4 - row_size % 4) % 4
    }
}

/// Parse the file header and DIB header without touching pixel data.
pub(crate) fn parse_bmp_header(data: &[u8]) -> Result<BmpHeader, RasterError> {
    if data.len() < 2 || &data[..2] != b"BM" {
        return Err(RasterError::InvalidSignature);
    }
    if data.len() < MIN_HEADER_LEN {
        return Err(RasterError::TruncatedFile);
    }

    let mut bytes = Cursor::new(data);
    bytes.skip(2)?;
    let file_size = bytes.get_u32_le()?;
    bytes.skip(4)?; // reserved
    let data_offset = bytes.get_u32_le()? as usize;

    let ihsize = bytes.get_u32_le()?;
    if ihsize < INFO_HEADER_LEN {
        return Err(RasterError::InvalidHeader(format!(
            "BMP info header size {ihsize} (OS/2 bitmaps are not supported)"
        )));
    }

    let width = bytes.get_i32_le()?;
    let height = bytes.get_i32_le()?;
    let planes = bytes.get_u16_le()?;
    let bits_per_pixel = bytes.get_u16_le()?;
    let compression = bytes.get_u32_le()?;

    if width <= 0 {
        return Err(RasterError::InvalidHeader(format!(
            "BMP width must be positive, got {width}"
        )));
    }
    if height == 0 {
        return Err(RasterError::InvalidHeader("BMP height is zero".into()));
    }

    let layout = match bits_per_pixel {
        24 => PixelLayout::Rgb8,
        32 => PixelLayout::Rgba8,
        other => return Err(RasterError::UnsupportedBitDepth(other)),
    };

    match compression {
        BI_RGB => {}
        BI_BITFIELDS | BI_ALPHABITFIELDS if bits_per_pixel == 32 => {
            // Masks sit right after the 40-byte header (inside it for V2+);
            // skip image size, resolution and palette counts.
            bytes.skip(20)?;
            let masks = [bytes.get_u32_le()?, bytes.get_u32_le()?, bytes.get_u32_le()?];
            if masks != BGRA_MASKS {
                return Err(RasterError::UnsupportedVariant(format!(
                    "BMP bitfield masks {masks:08X?}"
                )));
            }
        }
        other => {
            return Err(RasterError::UnsupportedVariant(format!(
                "BMP compression type {other}"
            )));
        }
    }

    if data_offset < FILE_HEADER_LEN + ihsize as usize {
        return Err(RasterError::InvalidHeader(format!(
            "BMP pixel data offset {data_offset} overlaps the headers"
        )));
    }

    Ok(BmpHeader {
        width: width as u32,
        height: height.unsigned_abs(),
        layout,
        top_down: height < 0,
        bits_per_pixel,
        data_offset,
        file_size,
        planes,
    })
}

// ── Full decode ─────────────────────────────────────────────────────

/// Decode BMP pixel data into RGB/RGBA samples.
pub(crate) fn decode_bmp(
    data: &[u8],
    limits: Option<&Limits>,
    permissiveness: Permissiveness,
    stop: &dyn Stop,
) -> Result<PixelBuffer, RasterError> {
    let header = parse_bmp_header(data)?;
    let is_strict = permissiveness == Permissiveness::Strict;
    let is_permissive = permissiveness == Permissiveness::Permissive;

    if !is_permissive && header.planes != 1 {
        return Err(RasterError::InvalidHeader(format!(
            "BMP planes field is {}, expected 1",
            header.planes
        )));
    }
    if is_strict && header.file_size != 0 && header.file_size as usize != data.len() {
        return Err(RasterError::InvalidHeader(format!(
            "BMP file size field ({}) doesn't match actual size ({})",
            header.file_size,
            data.len()
        )));
    }

    let out_len = check_output(
        limits,
        header.width,
        header.height,
        header.layout.bytes_per_pixel(),
    )?;

    let h = header.height as usize;
    let row_size = header.row_size();
    let stride = header.row_stride();

    // The last row's padding is routinely omitted by writers; only Strict
    // insists on it.
    let tail = if is_strict { stride } else { row_size };
    let needed = (h - 1)
        .checked_mul(stride)
        .and_then(|n| n.checked_add(tail))
        .and_then(|n| n.checked_add(header.data_offset))
        .ok_or(RasterError::DimensionsTooLarge {
            width: header.width,
            height: header.height,
        })?;
    if data.len() < needed {
        if !is_permissive {
            return Err(RasterError::TruncatedFile);
        }
        log::warn!(
            "bmp: truncated pixel data ({} of {needed} bytes), zero-filling",
            data.len()
        );
    }

    stop.check()?;

    let bpp = usize::from(header.bits_per_pixel / 8);
    let mut out = vec![0u8; out_len];
    for (y, dst_row) in out.chunks_exact_mut(row_size).enumerate() {
        if y % 16 == 0 {
            stop.check()?;
        }
        let file_row = if header.top_down { y } else { h - 1 - y };
        let start = header.data_offset + file_row * stride;
        let available = data.len().saturating_sub(start).min(row_size);
        if available == 0 {
            continue;
        }
        let src_row = &data[start..start + available];
        for (dst, src) in dst_row.chunks_exact_mut(bpp).zip(src_row.chunks_exact(bpp)) {
            dst[0] = src[2];
            dst[1] = src[1];
            dst[2] = src[0];
            if bpp == 4 {
                dst[3] = src[3];
            }
        }
    }

    log::debug!(
        "bmp: decoded {}x{} {}-bit ({})",
        header.width,
        header.height,
        header.bits_per_pixel,
        if header.top_down { "top-down" } else { "bottom-up" }
    );

    PixelBuffer::new(out, header.width, header.height, header.layout)
}
