use std::path::Path;

use crate::error::RasterError;
use crate::fs;
use crate::pixel::PixelLayout;
use crate::registry::{Codec, HEADER_PROBE_BYTES, Registry};

/// Image metadata read from headers, without decoding pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Layout the decoder will produce.
    pub layout: PixelLayout,
    pub codec: Codec,
}

impl ImageInfo {
    /// Probe in-memory image data. The codec is detected from its signature.
    pub fn from_bytes(data: &[u8]) -> Result<Self, RasterError> {
        let codec = Registry::standard().detect(Some(data), "")?;
        Self::probe(codec, data)
    }

    /// Probe a file, detecting the codec by signature, then by extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RasterError> {
        let path = path.as_ref();
        let data = fs::read_all(path)?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let header = &data[..data.len().min(HEADER_PROBE_BYTES)];
        let codec = Registry::standard().detect(Some(header), ext)?;
        Self::probe(codec, &data)
    }

    fn probe(codec: Codec, data: &[u8]) -> Result<Self, RasterError> {
        let (width, height, layout) = codec.probe(data)?;
        Ok(Self {
            width,
            height,
            layout,
            codec,
        })
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Size of the decoded sample buffer in bytes.
    pub fn memory_size(&self) -> u64 {
        self.pixel_count() * self.layout.bytes_per_pixel() as u64
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}
