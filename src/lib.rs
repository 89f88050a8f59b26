//! # zenraster
//!
//! BMP and PNG decoders and encoders with a deferred resize/filter pipeline.
//!
//! Decoded images are plain [`PixelBuffer`]s: 8-bit samples in `Gray8`,
//! `Rgb8` or `Rgba8` layout, row-major, top row first. An [`Image`] wraps a
//! buffer together with pending [`Operation`]s that run only when the image
//! is rendered or saved.
//!
//! ## Supported Formats
//!
//! - **BMP**: uncompressed 24-bit RGB and 32-bit RGBA, bottom-up or top-down
//! - **PNG**: 8-bit truecolor and truecolor+alpha, all five scanline filters,
//!   non-interlaced
//! - **JPEG** (`jpeg` feature) and **GIF** (`gif` feature, first frame only),
//!   delegated to the `image` crate
//!
//! ## Non-Goals
//!
//! - Interlaced (Adam7) PNG, palette and 16-bit PNG
//! - Color management
//! - Animation
//!
//! ## Usage
//!
//! ```no_run
//! use zenraster::{EncodeOptions, Image, filters};
//!
//! let thumb = Image::open("photo.bmp")?
//!     .resize(Some(320), None)
//!     .filter(filters::grayscale);
//! // Nothing has been computed yet.
//! thumb.save("thumb.png", &EncodeOptions::default())?;
//! # Ok::<(), zenraster::RasterError>(())
//! ```
//!
//! Byte-level decoding and encoding, with cancellation:
//!
//! ```no_run
//! use zenraster::{DecodeRequest, EncodeRequest, ImageInfo, Unstoppable};
//!
//! let data: &[u8] = &[]; // your BMP/PNG bytes
//!
//! // Probe without decoding
//! let info = ImageInfo::from_bytes(data)?;
//! println!("{}x{} {:?}", info.width, info.height, info.codec);
//!
//! let decoded = DecodeRequest::new(data).decode(Unstoppable)?;
//! let png = EncodeRequest::png().encode(&decoded, Unstoppable)?;
//! # Ok::<(), zenraster::RasterError>(())
//! ```

#![forbid(unsafe_code)]

mod bmp;
mod buffer;
mod decode;
mod encode;
mod error;
#[cfg(any(feature = "jpeg", feature = "gif"))]
mod external;
pub mod filters;
mod fs;
mod info;
mod limits;
mod pipeline;
mod pixel;
mod png;
mod registry;

// Re-exports
pub use buffer::PixelBuffer;
pub use decode::{DecodeConfig, DecodeRequest, Permissiveness};
pub use encode::{EncodeOptions, EncodeRequest, FilterStrategy};
pub use enough::{Stop, StopReason, Unstoppable};
pub use error::RasterError;
pub use info::ImageInfo;
pub use limits::Limits;
pub use pipeline::{FilterFn, Image, Operation};
#[cfg(feature = "rgb")]
pub use pixel::RasterPixel;
pub use pixel::PixelLayout;
pub use registry::{Codec, HEADER_PROBE_BYTES, Registry};
