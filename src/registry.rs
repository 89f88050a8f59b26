//! Codec selection by signature and file extension.

use std::path::Path;
use std::sync::OnceLock;

use enough::{Stop, Unstoppable};

use crate::buffer::PixelBuffer;
use crate::decode::{DecodeConfig, Permissiveness};
use crate::encode::EncodeOptions;
use crate::error::RasterError;
use crate::limits::Limits;
use crate::pixel::PixelLayout;
use crate::{bmp, fs, png};

#[cfg(feature = "gif")]
use crate::external::gif;
#[cfg(feature = "jpeg")]
use crate::external::jpeg;

/// Leading bytes read from a file for signature detection.
pub const HEADER_PROBE_BYTES: usize = 54;

/// A supported image format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Codec {
    Bmp,
    Png,
    #[cfg(feature = "jpeg")]
    Jpeg,
    #[cfg(feature = "gif")]
    Gif,
}

impl Codec {
    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Codec::Bmp => "bmp",
            Codec::Png => "png",
            #[cfg(feature = "jpeg")]
            Codec::Jpeg => "jpeg",
            #[cfg(feature = "gif")]
            Codec::Gif => "gif",
        }
    }

    /// Lowercase file extensions, without the dot.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Codec::Bmp => bmp::EXTENSIONS,
            Codec::Png => png::EXTENSIONS,
            #[cfg(feature = "jpeg")]
            Codec::Jpeg => jpeg::EXTENSIONS,
            #[cfg(feature = "gif")]
            Codec::Gif => gif::EXTENSIONS,
        }
    }

    /// Whether `header` starts with this format's signature.
    pub fn detect(self, header: &[u8]) -> bool {
        match self {
            Codec::Bmp => bmp::detect(header),
            Codec::Png => png::detect(header),
            #[cfg(feature = "jpeg")]
            Codec::Jpeg => jpeg::detect(header),
            #[cfg(feature = "gif")]
            Codec::Gif => gif::detect(header),
        }
    }

    /// Decode a file with default settings.
    pub fn decode(self, path: impl AsRef<Path>) -> Result<PixelBuffer, RasterError> {
        self.decode_with(path, &DecodeConfig::default())
    }

    pub fn decode_with(
        self,
        path: impl AsRef<Path>,
        config: &DecodeConfig,
    ) -> Result<PixelBuffer, RasterError> {
        let data = fs::read_all(path.as_ref())?;
        self.decode_bytes(&data, config)
    }

    /// Encode `buffer` and write it to `path` atomically.
    ///
    /// Nothing is written when encoding fails.
    pub fn encode(
        self,
        buffer: &PixelBuffer,
        path: impl AsRef<Path>,
        options: &EncodeOptions,
    ) -> Result<(), RasterError> {
        let bytes = self.encode_bytes(buffer, options)?;
        fs::write_atomic(path.as_ref(), &bytes)
    }

    pub fn decode_bytes(
        self,
        data: &[u8],
        config: &DecodeConfig,
    ) -> Result<PixelBuffer, RasterError> {
        self.decode_raw(
            data,
            Some(&config.limits),
            config.permissiveness,
            &Unstoppable,
        )
    }

    pub fn encode_bytes(
        self,
        buffer: &PixelBuffer,
        options: &EncodeOptions,
    ) -> Result<Vec<u8>, RasterError> {
        self.encode_raw(buffer, options, &Unstoppable)
    }

    pub(crate) fn decode_raw(
        self,
        data: &[u8],
        limits: Option<&Limits>,
        permissiveness: Permissiveness,
        stop: &dyn Stop,
    ) -> Result<PixelBuffer, RasterError> {
        match self {
            Codec::Bmp => bmp::decode(data, limits, permissiveness, stop),
            Codec::Png => png::decode(data, limits, permissiveness, stop),
            #[cfg(feature = "jpeg")]
            Codec::Jpeg => jpeg::decode(data, limits, stop),
            #[cfg(feature = "gif")]
            Codec::Gif => gif::decode(data, limits, stop),
        }
    }

    pub(crate) fn encode_raw(
        self,
        buffer: &PixelBuffer,
        options: &EncodeOptions,
        stop: &dyn Stop,
    ) -> Result<Vec<u8>, RasterError> {
        options.validate()?;
        stop.check()?;
        match self {
            Codec::Bmp => bmp::encode(buffer, stop),
            Codec::Png => png::encode(buffer, options, stop),
            #[cfg(feature = "jpeg")]
            Codec::Jpeg => jpeg::encode(buffer, options.quality, stop),
            #[cfg(feature = "gif")]
            Codec::Gif => gif::encode(buffer, stop),
        }
    }

    /// Dimensions and layout without decoding pixels.
    pub(crate) fn probe(self, data: &[u8]) -> Result<(u32, u32, PixelLayout), RasterError> {
        match self {
            Codec::Bmp => bmp::probe(data),
            Codec::Png => png::probe(data),
            #[cfg(feature = "jpeg")]
            Codec::Jpeg => jpeg::probe(data),
            #[cfg(feature = "gif")]
            Codec::Gif => gif::probe(data),
        }
    }
}

/// An ordered list of codecs. Earlier entries win ties.
#[derive(Clone, Debug)]
pub struct Registry {
    codecs: Vec<Codec>,
}

impl Registry {
    pub fn new(codecs: Vec<Codec>) -> Self {
        Self { codecs }
    }

    /// Every codec compiled in: BMP, PNG, then JPEG and GIF when enabled.
    pub fn standard() -> &'static Registry {
        static STANDARD: OnceLock<Registry> = OnceLock::new();
        STANDARD.get_or_init(|| {
            Registry::new(vec![
                Codec::Bmp,
                Codec::Png,
                #[cfg(feature = "jpeg")]
                Codec::Jpeg,
                #[cfg(feature = "gif")]
                Codec::Gif,
            ])
        })
    }

    pub fn codecs(&self) -> &[Codec] {
        &self.codecs
    }

    /// Pick a codec.
    ///
    /// A non-empty `header` is matched against each codec's signature first;
    /// when nothing matches, `extension` (case-insensitive, leading dot
    /// optional) is looked up instead.
    pub fn detect(&self, header: Option<&[u8]>, extension: &str) -> Result<Codec, RasterError> {
        if let Some(header) = header.filter(|h| !h.is_empty()) {
            if let Some(codec) = self.codecs.iter().copied().find(|c| c.detect(header)) {
                log::debug!("detected {} from signature", codec.name());
                return Ok(codec);
            }
        }

        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        if !ext.is_empty() {
            if let Some(codec) = self
                .codecs
                .iter()
                .copied()
                .find(|c| c.extensions().contains(&ext.as_str()))
            {
                log::debug!("selected {} from extension .{ext}", codec.name());
                return Ok(codec);
            }
        }

        Err(RasterError::UnsupportedFormat(if ext.is_empty() {
            "unrecognized signature".into()
        } else {
            format!("unrecognized signature and extension .{ext}")
        }))
    }

    /// Detect from the first [`HEADER_PROBE_BYTES`] of the file and its
    /// extension.
    pub fn detect_path(&self, path: impl AsRef<Path>) -> Result<Codec, RasterError> {
        let path = path.as_ref();
        let header = fs::read_prefix(path, HEADER_PROBE_BYTES)?;
        self.detect(Some(header.as_slice()), extension_of(path))
    }

    /// Select by extension only, e.g. for an output path that doesn't exist yet.
    pub fn for_extension(&self, path: impl AsRef<Path>) -> Result<Codec, RasterError> {
        self.detect(None, extension_of(path.as_ref()))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::standard().clone()
    }
}

fn extension_of(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("")
}
