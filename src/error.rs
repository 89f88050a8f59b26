use enough::StopReason;

use crate::pixel::PixelLayout;

/// Errors from decoding, encoding, and pipeline materialization.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RasterError {
    #[error("no codec recognizes this input: {0}")]
    UnsupportedFormat(String),

    #[error("invalid file signature")]
    InvalidSignature,

    #[error("file is truncated")]
    TruncatedFile,

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("invalid pixel data: {0}")]
    InvalidData(String),

    #[error("unsupported bit depth: {0}")]
    UnsupportedBitDepth(u16),

    #[error("unsupported PNG color type: {0}")]
    UnsupportedColorType(u8),

    #[error("unsupported color mode for this codec: {0:?}")]
    UnsupportedColorMode(PixelLayout),

    #[error("unsupported format variant: {0}")]
    UnsupportedVariant(String),

    #[error("sample count mismatch: expected {expected} bytes, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("image dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("pixel layout mismatch: expected {expected:?}, got {actual:?}")]
    LayoutMismatch {
        expected: PixelLayout,
        actual: PixelLayout,
    },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("delegate codec failed: {0}")]
    Codec(String),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for RasterError {
    fn from(r: StopReason) -> Self {
        RasterError::Cancelled(r)
    }
}
