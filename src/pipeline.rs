//! Deferred image operations.
//!
//! An [`Image`] pairs a shared source buffer with a list of pending
//! operations. Appending an operation returns a new handle; nothing is
//! computed until [`Image::render`], [`Image::encode`] or [`Image::save`]
//! folds the operations over the source in order.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::buffer::PixelBuffer;
use crate::decode::DecodeConfig;
use crate::encode::EncodeOptions;
use crate::error::RasterError;
use crate::fs;
use crate::limits::{Limits, check_output};
use crate::pixel::PixelLayout;
use crate::registry::{Codec, HEADER_PROBE_BYTES, Registry};

/// A pure per-image sample transform.
///
/// Receives the working samples and their layout and returns the new
/// samples, which must have the same length.
pub type FilterFn = Arc<dyn Fn(&[u8], PixelLayout) -> Vec<u8> + Send + Sync>;

/// One deferred step.
#[derive(Clone)]
pub enum Operation {
    /// Nearest-neighbour resize. A missing axis keeps its current size.
    Resize {
        width: Option<u32>,
        height: Option<u32>,
    },
    Filter(FilterFn),
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Resize { width, height } => f
                .debug_struct("Resize")
                .field("width", width)
                .field("height", height)
                .finish(),
            Operation::Filter(_) => f.write_str("Filter(..)"),
        }
    }
}

impl Operation {
    fn apply(&self, input: &PixelBuffer, limits: &Limits) -> Result<PixelBuffer, RasterError> {
        match self {
            Operation::Resize { width, height } => resize_nearest(input, *width, *height, limits),
            Operation::Filter(filter) => apply_filter(input, filter.as_ref()),
        }
    }
}

/// An image handle: a shared source plus pending operations.
///
/// Cloning is cheap; the source pixels are shared.
#[derive(Clone, Debug)]
pub struct Image {
    source: Arc<PixelBuffer>,
    pending: Vec<Operation>,
    limits: Limits,
}

impl From<PixelBuffer> for Image {
    fn from(buffer: PixelBuffer) -> Self {
        Image::new(buffer)
    }
}

impl Image {
    pub fn new(buffer: PixelBuffer) -> Self {
        Self {
            source: Arc::new(buffer),
            pending: Vec::new(),
            limits: Limits::default(),
        }
    }

    /// Decode a file, picking the codec by signature, then by extension.
    pub fn open(path: impl AsRef<Path>) -> Result<Image, RasterError> {
        Self::open_with(path, Registry::standard(), &DecodeConfig::default())
    }

    /// Like [`open`](Self::open) with an explicit registry and decoder
    /// settings. The limits also bound later resizes.
    pub fn open_with(
        path: impl AsRef<Path>,
        registry: &Registry,
        config: &DecodeConfig,
    ) -> Result<Image, RasterError> {
        let path = path.as_ref();
        let data = fs::read_all(path)?;
        let header = &data[..data.len().min(HEADER_PROBE_BYTES)];
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let codec = registry.detect(Some(header), ext)?;
        let buffer = codec.decode_bytes(&data, config)?;
        log::debug!(
            "opened {} as {}: {}x{} {:?}",
            path.display(),
            codec.name(),
            buffer.width(),
            buffer.height(),
            buffer.layout()
        );
        Ok(Image::new(buffer).with_limits(config.limits.clone()))
    }

    /// Bound the size of buffers produced while rendering.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// The decoded source, before any pending operation.
    pub fn source(&self) -> &PixelBuffer {
        &self.source
    }

    pub fn pending(&self) -> &[Operation] {
        &self.pending
    }

    /// True when no operations are pending.
    pub fn is_materialized(&self) -> bool {
        self.pending.is_empty()
    }

    /// A new handle with `op` appended. `self` is unchanged.
    pub fn apply_operation(&self, op: Operation) -> Image {
        let mut pending = Vec::with_capacity(self.pending.len() + 1);
        pending.extend(self.pending.iter().cloned());
        pending.push(op);
        Image {
            source: Arc::clone(&self.source),
            pending,
            limits: self.limits.clone(),
        }
    }

    pub fn resize(&self, width: Option<u32>, height: Option<u32>) -> Image {
        self.apply_operation(Operation::Resize { width, height })
    }

    pub fn filter<F>(&self, filter: F) -> Image
    where
        F: Fn(&[u8], PixelLayout) -> Vec<u8> + Send + Sync + 'static,
    {
        self.apply_operation(Operation::Filter(Arc::new(filter)))
    }

    /// Apply every pending operation in order and return the result.
    ///
    /// Fails on the first failing operation; no partial result is returned.
    pub fn render(&self) -> Result<PixelBuffer, RasterError> {
        let mut working: Option<PixelBuffer> = None;
        for op in &self.pending {
            let input = working.as_ref().unwrap_or(&*self.source);
            working = Some(op.apply(input, &self.limits)?);
        }
        Ok(working.unwrap_or_else(|| PixelBuffer::clone(&self.source)))
    }

    /// Render into a new handle with no pending operations.
    pub fn materialize(&self) -> Result<Image, RasterError> {
        Ok(Image::new(self.render()?).with_limits(self.limits.clone()))
    }

    /// Render, apply the target size from `options`, and encode in memory.
    pub fn encode(&self, codec: Codec, options: &EncodeOptions) -> Result<Vec<u8>, RasterError> {
        options.validate()?;
        let buffer = if options.target_width.is_some() || options.target_height.is_some() {
            self.resize(options.target_width, options.target_height)
                .render()?
        } else {
            self.render()?
        };
        codec.encode_bytes(&buffer, options)
    }

    /// Render and write to `path`, picking the codec by extension.
    ///
    /// The file is written atomically only after encoding succeeded.
    pub fn save(&self, path: impl AsRef<Path>, options: &EncodeOptions) -> Result<(), RasterError> {
        self.save_with(path, Registry::standard(), options)
    }

    pub fn save_with(
        &self,
        path: impl AsRef<Path>,
        registry: &Registry,
        options: &EncodeOptions,
    ) -> Result<(), RasterError> {
        let path = path.as_ref();
        let codec = registry.for_extension(path)?;
        let bytes = self.encode(codec, options)?;
        fs::write_atomic(path, &bytes)?;
        log::debug!("saved {} as {}", path.display(), codec.name());
        Ok(())
    }
}

fn resize_nearest(
    input: &PixelBuffer,
    width: Option<u32>,
    height: Option<u32>,
    limits: &Limits,
) -> Result<PixelBuffer, RasterError> {
    if width.is_none() && height.is_none() {
        return Err(RasterError::InvalidOptions(
            "resize needs a target width or height".into(),
        ));
    }
    let (src_w, src_h) = (input.width(), input.height());
    let dst_w = width.unwrap_or(src_w);
    let dst_h = height.unwrap_or(src_h);
    if dst_w == 0 || dst_h == 0 {
        return Err(RasterError::ZeroDimension {
            width: dst_w,
            height: dst_h,
        });
    }
    let bpp = input.layout().bytes_per_pixel();
    let out_len = check_output(Some(limits), dst_w, dst_h, bpp)?;
    if (dst_w, dst_h) == (src_w, src_h) {
        return Ok(input.clone());
    }

    // Source column byte offsets, shared by every row.
    let columns: Vec<usize> = (0..dst_w)
        .map(|x| nearest(x, src_w, dst_w) as usize * bpp)
        .collect();
    let mut out = Vec::with_capacity(out_len);
    for y in 0..dst_h {
        let row = input.row(nearest(y, src_h, dst_h));
        for &offset in &columns {
            out.extend_from_slice(&row[offset..offset + bpp]);
        }
    }

    log::debug!("resized {src_w}x{src_h} -> {dst_w}x{dst_h}");
    PixelBuffer::new(out, dst_w, dst_h, input.layout())
}

/// `floor(dst * src / dst_len)`, clamped to the last source index.
fn nearest(dst: u32, src_len: u32, dst_len: u32) -> u32 {
    let src = u64::from(dst) * u64::from(src_len) / u64::from(dst_len);
    src.min(u64::from(src_len - 1)) as u32
}

fn apply_filter(
    input: &PixelBuffer,
    filter: &(dyn Fn(&[u8], PixelLayout) -> Vec<u8> + Send + Sync),
) -> Result<PixelBuffer, RasterError> {
    let samples = filter(input.samples(), input.layout());
    if samples.len() != input.samples().len() {
        return Err(RasterError::DimensionMismatch {
            expected: input.samples().len(),
            actual: samples.len(),
        });
    }
    PixelBuffer::new(samples, input.width(), input.height(), input.layout())
}
