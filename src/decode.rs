use enough::Stop;

use crate::buffer::PixelBuffer;
use crate::error::RasterError;
use crate::limits::Limits;
use crate::registry::{Codec, Registry};

// ── Permissiveness ──────────────────────────────────────────────────

/// Controls how strictly the decoders validate input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permissiveness {
    /// Reject files that violate the format even in non-critical ways.
    /// BMP: file size field must match, final row padding must be present.
    /// PNG: unknown critical chunks and overlong zlib streams are errors.
    Strict,

    /// Default behavior. Accept deviations that don't affect pixel
    /// decoding (bad BMP file size, trailing zlib data, unknown critical
    /// PNG chunks). Reject bad CRCs, BMP planes != 1, truncated data.
    #[default]
    Standard,

    /// Accept as much as possible. Zero-fill truncated pixel data, ignore
    /// CRC mismatches, a missing IEND and BMP planes.
    Permissive,
}

// ── DecodeConfig ────────────────────────────────────────────────────

/// Decoder settings used by the path-level API ([`crate::Image::open_with`],
/// [`Codec::decode_with`]).
#[derive(Clone, Debug, Default)]
pub struct DecodeConfig {
    pub limits: Limits,
    pub permissiveness: Permissiveness,
}

impl DecodeConfig {
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_permissiveness(mut self, permissiveness: Permissiveness) -> Self {
        self.permissiveness = permissiveness;
        self
    }
}

// ── DecodeRequest ───────────────────────────────────────────────────

/// Decode an in-memory image.
///
/// The codec is detected from the leading bytes unless set with
/// [`with_codec`](Self::with_codec).
///
/// ```no_run
/// use zenraster::{DecodeRequest, Permissiveness, Unstoppable};
///
/// let data = std::fs::read("photo.png")?;
/// let image = DecodeRequest::new(&data)
///     .with_permissiveness(Permissiveness::Strict)
///     .decode(Unstoppable)?;
/// println!("{}x{}", image.width(), image.height());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    limits: Option<&'a Limits>,
    permissiveness: Permissiveness,
    codec: Option<Codec>,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            limits: None,
            permissiveness: Permissiveness::default(),
            codec: None,
        }
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn with_permissiveness(mut self, permissiveness: Permissiveness) -> Self {
        self.permissiveness = permissiveness;
        self
    }

    /// Skip detection and decode with `codec`.
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn decode(self, stop: impl Stop) -> Result<PixelBuffer, RasterError> {
        let codec = match self.codec {
            Some(codec) => codec,
            None => Registry::standard().detect(Some(self.data), "")?,
        };
        codec.decode_raw(self.data, self.limits, self.permissiveness, &stop)
    }
}
