//! PNG chunk framing: `length | type | data | crc`, all integers big-endian.

use crate::error::RasterError;

/// The 8-byte PNG file signature.
pub(crate) const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Largest chunk data length the format allows.
const MAX_CHUNK_LEN: usize = (1 << 31) - 1;

/// A chunk borrowed from the input, CRC not yet checked.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawChunk<'a> {
    pub kind: [u8; 4],
    pub data: &'a [u8],
    pub crc: u32,
}

impl RawChunk<'_> {
    /// Whether the stored CRC matches `type || data`.
    pub fn crc_matches(&self) -> bool {
        chunk_crc(&self.kind, self.data) == self.crc
    }

    /// Critical chunks have an uppercase first letter.
    pub fn is_critical(&self) -> bool {
        self.kind[0].is_ascii_uppercase()
    }

    pub fn name(&self) -> &str {
        core::str::from_utf8(&self.kind).unwrap_or("????")
    }
}

/// Iterates over the chunks following the signature.
///
/// Yields `Err(TruncatedFile)` once if a chunk runs past the end of input,
/// then stops.
pub(crate) struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ChunkReader<'a> {
    /// `data` is the whole file; reading starts after the signature.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: SIGNATURE.len(),
        }
    }

    fn read_chunk(&mut self) -> Result<RawChunk<'a>, RasterError> {
        let rest = self.data.get(self.pos..).ok_or(RasterError::TruncatedFile)?;
        if rest.len() < 8 {
            return Err(RasterError::TruncatedFile);
        }
        let len = u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;
        if len > MAX_CHUNK_LEN {
            return Err(RasterError::InvalidData(format!(
                "chunk length {len} exceeds 2^31-1"
            )));
        }
        let kind = [rest[4], rest[5], rest[6], rest[7]];
        let crc_bytes = rest
            .get(8 + len..8 + len + 4)
            .ok_or(RasterError::TruncatedFile)?;
        let chunk = RawChunk {
            kind,
            data: &rest[8..8 + len],
            crc: u32::from_be_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]),
        };
        self.pos += 12 + len;
        Ok(chunk)
    }
}

impl<'a> Iterator for ChunkReader<'a> {
    type Item = Result<RawChunk<'a>, RasterError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.data.len() {
            return None;
        }
        let result = self.read_chunk();
        if result.is_err() {
            self.pos = self.data.len();
        }
        Some(result)
    }
}

/// CRC32 over the chunk type followed by its data.
pub(crate) fn chunk_crc(kind: &[u8; 4], data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(kind);
    hasher.update(data);
    hasher.finalize()
}

/// Append a complete chunk to `out`.
pub(crate) fn write_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) -> Result<(), RasterError> {
    if data.len() > MAX_CHUNK_LEN {
        return Err(RasterError::InvalidData(format!(
            "{} chunk of {} bytes exceeds 2^31-1",
            core::str::from_utf8(kind).unwrap_or("????"),
            data.len()
        )));
    }
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);
    out.extend_from_slice(&chunk_crc(kind, data).to_be_bytes());
    Ok(())
}
