//! PNG decoder: 8-bit RGB and RGBA, non-interlaced.

use enough::Stop;

use super::chunk::{ChunkReader, RawChunk, SIGNATURE};
use super::filter::{FilterType, unfilter_row};
use crate::buffer::PixelBuffer;
use crate::decode::Permissiveness;
use crate::error::RasterError;
use crate::limits::{Limits, check_output};
use crate::pixel::PixelLayout;

const IHDR_LEN: usize = 13;

/// Fields of the IHDR chunk that matter for decoding.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PngHeader {
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
}

/// Check the signature and parse the leading IHDR chunk.
pub(crate) fn parse_png_header(data: &[u8]) -> Result<PngHeader, RasterError> {
    let mut chunks = signature_checked(data)?;
    let ihdr = chunks.next().ok_or(RasterError::TruncatedFile)??;
    parse_ihdr(&ihdr)
}

fn signature_checked(data: &[u8]) -> Result<ChunkReader<'_>, RasterError> {
    if !data.starts_with(&SIGNATURE) {
        return Err(RasterError::InvalidSignature);
    }
    Ok(ChunkReader::new(data))
}

fn parse_ihdr(chunk: &RawChunk<'_>) -> Result<PngHeader, RasterError> {
    if &chunk.kind != b"IHDR" {
        return Err(RasterError::InvalidHeader(format!(
            "first chunk is {}, expected IHDR",
            chunk.name()
        )));
    }
    let d = chunk.data;
    if d.len() != IHDR_LEN {
        return Err(RasterError::InvalidHeader(format!(
            "IHDR length {} (expected {IHDR_LEN})",
            d.len()
        )));
    }

    let width = u32::from_be_bytes([d[0], d[1], d[2], d[3]]);
    let height = u32::from_be_bytes([d[4], d[5], d[6], d[7]]);
    let (bit_depth, color_type) = (d[8], d[9]);
    let (compression, filter_method, interlace) = (d[10], d[11], d[12]);

    if width == 0 || height == 0 {
        return Err(RasterError::InvalidHeader(format!(
            "PNG dimensions {width}x{height}"
        )));
    }
    if bit_depth != 8 {
        return Err(RasterError::UnsupportedBitDepth(u16::from(bit_depth)));
    }
    let layout = match color_type {
        2 => PixelLayout::Rgb8,
        6 => PixelLayout::Rgba8,
        other => return Err(RasterError::UnsupportedColorType(other)),
    };
    if compression != 0 {
        return Err(RasterError::InvalidHeader(format!(
            "PNG compression method {compression}"
        )));
    }
    if filter_method != 0 {
        return Err(RasterError::InvalidHeader(format!(
            "PNG filter method {filter_method}"
        )));
    }
    match interlace {
        0 => {}
        1 => {
            return Err(RasterError::UnsupportedVariant(
                "interlaced (Adam7) PNG".into(),
            ));
        }
        other => {
            return Err(RasterError::InvalidHeader(format!(
                "PNG interlace method {other}"
            )));
        }
    }

    Ok(PngHeader {
        width,
        height,
        layout,
    })
}

fn check_crc(chunk: &RawChunk<'_>, permissiveness: Permissiveness) -> Result<(), RasterError> {
    if chunk.crc_matches() {
        return Ok(());
    }
    if permissiveness == Permissiveness::Permissive {
        log::warn!("png: CRC mismatch in {} chunk, ignoring", chunk.name());
        return Ok(());
    }
    Err(RasterError::InvalidData(format!(
        "CRC mismatch in {} chunk",
        chunk.name()
    )))
}

/// Decode a PNG file into RGB/RGBA samples.
pub(crate) fn decode_png(
    data: &[u8],
    limits: Option<&Limits>,
    permissiveness: Permissiveness,
    stop: &dyn Stop,
) -> Result<PixelBuffer, RasterError> {
    let mut chunks = signature_checked(data)?;
    let ihdr = chunks.next().ok_or(RasterError::TruncatedFile)??;
    check_crc(&ihdr, permissiveness)?;
    let header = parse_ihdr(&ihdr)?;

    let out_len = check_output(
        limits,
        header.width,
        header.height,
        header.layout.bytes_per_pixel(),
    )?;

    let mut idat = Vec::new();
    let mut saw_iend = false;
    for chunk in chunks {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(RasterError::TruncatedFile) => break,
            Err(e) => return Err(e),
        };
        check_crc(&chunk, permissiveness)?;
        match &chunk.kind {
            b"IDAT" => idat.extend_from_slice(chunk.data),
            b"IEND" => {
                saw_iend = true;
                break;
            }
            b"IHDR" => {
                return Err(RasterError::InvalidData("duplicate IHDR chunk".into()));
            }
            // A suggested palette for truecolor images; not needed.
            b"PLTE" => {}
            _ if chunk.is_critical() && permissiveness == Permissiveness::Strict => {
                return Err(RasterError::InvalidData(format!(
                    "unknown critical chunk {}",
                    chunk.name()
                )));
            }
            _ => log::trace!("png: skipping {} chunk ({} bytes)", chunk.name(), chunk.data.len()),
        }
        stop.check()?;
    }

    if !saw_iend {
        if permissiveness != Permissiveness::Permissive || idat.is_empty() {
            return Err(RasterError::TruncatedFile);
        }
        log::warn!("png: missing IEND chunk, decoding the IDAT data seen so far");
    }
    if idat.is_empty() {
        return Err(RasterError::InvalidData("no IDAT chunks".into()));
    }

    let bpp = header.layout.bytes_per_pixel();
    let row_bytes = header.width as usize * bpp;
    let line_len = row_bytes + 1;
    let h = header.height as usize;
    let expected = line_len
        .checked_mul(h)
        .ok_or(RasterError::DimensionsTooLarge {
            width: header.width,
            height: header.height,
        })?;

    let raw = inflate(&idat, expected, permissiveness)?;
    stop.check()?;

    let mut out = vec![0u8; out_len];
    for (y, line) in raw.chunks(line_len).enumerate().take(h) {
        if y % 16 == 0 {
            stop.check()?;
        }
        if line.len() < line_len {
            // Only reachable in Permissive mode; the remaining rows stay zero.
            break;
        }
        let filter = FilterType::from_u8(line[0]).ok_or_else(|| {
            RasterError::InvalidData(format!("unknown filter type {} on row {y}", line[0]))
        })?;
        let (done, rest) = out.split_at_mut(y * row_bytes);
        let row = &mut rest[..row_bytes];
        row.copy_from_slice(&line[1..]);
        let prev = if y > 0 {
            Some(&done[(y - 1) * row_bytes..])
        } else {
            None
        };
        unfilter_row(filter, row, prev, bpp);
    }

    log::debug!(
        "png: decoded {}x{} {:?} from {} IDAT bytes",
        header.width,
        header.height,
        header.layout,
        idat.len()
    );

    PixelBuffer::new(out, header.width, header.height, header.layout)
}

/// Inflate the concatenated IDAT payload, expecting exactly `expected` bytes.
fn inflate(
    idat: &[u8],
    expected: usize,
    permissiveness: Permissiveness,
) -> Result<Vec<u8>, RasterError> {
    use miniz_oxide::inflate::{TINFLStatus, decompress_to_vec_zlib_with_limit};

    let permissive = permissiveness == Permissiveness::Permissive;
    let overlong = || {
        RasterError::InvalidData(format!(
            "image data inflates past the expected {expected} bytes"
        ))
    };
    // One spare byte tells an exact-size stream apart from an overlong one.
    let mut raw = match decompress_to_vec_zlib_with_limit(idat, expected.saturating_add(1)) {
        Ok(raw) => raw,
        Err(e) if e.status == TINFLStatus::HasMoreOutput => {
            if permissiveness == Permissiveness::Strict {
                return Err(overlong());
            }
            e.output
        }
        Err(e) if permissive && e.status == TINFLStatus::FailedCannotMakeProgress => {
            log::warn!(
                "png: zlib stream ends early ({} of {expected} bytes)",
                e.output.len()
            );
            e.output
        }
        Err(e) if e.status == TINFLStatus::FailedCannotMakeProgress => {
            return Err(RasterError::TruncatedFile);
        }
        Err(e) => {
            return Err(RasterError::InvalidData(format!(
                "zlib stream error: {:?}",
                e.status
            )));
        }
    };

    if raw.len() > expected {
        if permissiveness == Permissiveness::Strict {
            return Err(overlong());
        }
        log::warn!("png: ignoring data past the last scanline");
        raw.truncate(expected);
    }
    if raw.len() < expected && !permissive {
        return Err(RasterError::TruncatedFile);
    }
    Ok(raw)
}
