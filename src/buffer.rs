#[cfg(feature = "rgb")]
use rgb::AsPixels as _;

use crate::error::RasterError;
use crate::pixel::{PixelLayout, luma};

/// A decoded raster image: raw samples plus dimensions and layout.
///
/// `samples().len() == width * height * layout.bytes_per_pixel()` always
/// holds. Dimensions never change; transforms that resize produce a new
/// buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    samples: Vec<u8>,
    width: u32,
    height: u32,
    layout: PixelLayout,
}

impl PixelBuffer {
    /// Wrap `samples` as a `width` x `height` image.
    ///
    /// Fails with [`RasterError::DimensionMismatch`] when the sample count
    /// doesn't match the dimensions and layout exactly.
    pub fn new(
        samples: Vec<u8>,
        width: u32,
        height: u32,
        layout: PixelLayout,
    ) -> Result<Self, RasterError> {
        let expected = expected_len(width, height, layout)?;
        if samples.len() != expected {
            return Err(RasterError::DimensionMismatch {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            samples,
            width,
            height,
            layout,
        })
    }

    /// A zero-filled image.
    pub fn blank(width: u32, height: u32, layout: PixelLayout) -> Result<Self, RasterError> {
        let len = expected_len(width, height, layout)?;
        Ok(Self {
            samples: vec![0u8; len],
            width,
            height,
            layout,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    /// Access the sample bytes, row-major, top row first.
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Take ownership of the sample bytes.
    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * self.layout.bytes_per_pixel()
    }

    /// Samples of row `y`.
    ///
    /// # Panics
    ///
    /// If `y >= height`.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &self.samples[start..start + stride]
    }

    /// Samples of the pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.layout.bytes_per_pixel();
        let off = (y as usize * self.width as usize + x as usize) * bpp;
        Some(&self.samples[off..off + bpp])
    }

    /// Convert to another color layout.
    ///
    /// Adding alpha makes every pixel opaque; dropping to gray uses Rec. 601
    /// luma; expanding gray replicates the value into each color channel.
    pub fn convert(&self, layout: PixelLayout) -> PixelBuffer {
        if layout == self.layout {
            return self.clone();
        }
        let src_bpp = self.layout.bytes_per_pixel();
        let pixel_count = self.width as usize * self.height as usize;
        let mut out = Vec::with_capacity(pixel_count * layout.bytes_per_pixel());

        for px in self.samples.chunks_exact(src_bpp) {
            let (r, g, b, a) = match self.layout {
                PixelLayout::Gray8 => (px[0], px[0], px[0], 255),
                PixelLayout::Rgb8 => (px[0], px[1], px[2], 255),
                PixelLayout::Rgba8 => (px[0], px[1], px[2], px[3]),
            };
            match layout {
                PixelLayout::Gray8 => out.push(luma(r, g, b)),
                PixelLayout::Rgb8 => out.extend_from_slice(&[r, g, b]),
                PixelLayout::Rgba8 => out.extend_from_slice(&[r, g, b, a]),
            }
        }

        PixelBuffer {
            samples: out,
            width: self.width,
            height: self.height,
            layout,
        }
    }

    /// Reinterpret sample data as a typed pixel slice.
    ///
    /// Returns [`RasterError::LayoutMismatch`] if the layout doesn't match `P`.
    #[cfg(feature = "rgb")]
    pub fn as_pixels<P: crate::RasterPixel>(&self) -> Result<&[P], RasterError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        if self.layout != P::layout() {
            return Err(RasterError::LayoutMismatch {
                expected: P::layout(),
                actual: self.layout,
            });
        }
        Ok(self.samples.as_pixels())
    }

    /// Build a buffer by copying typed pixels.
    #[cfg(feature = "rgb")]
    pub fn from_pixels<P: crate::RasterPixel>(
        pixels: &[P],
        width: u32,
        height: u32,
    ) -> Result<Self, RasterError>
    where
        [P]: rgb::ComponentBytes<u8>,
    {
        use rgb::ComponentBytes as _;
        Self::new(pixels.as_bytes().to_vec(), width, height, P::layout())
    }

    /// Zero-copy view as an [`imgref::ImgRef`] of typed pixels.
    ///
    /// Returns [`RasterError::LayoutMismatch`] if the layout doesn't match `P`.
    #[cfg(feature = "imgref")]
    pub fn as_imgref<P: crate::RasterPixel>(&self) -> Result<imgref::ImgRef<'_, P>, RasterError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        let pixels: &[P] = self.as_pixels()?;
        Ok(imgref::ImgRef::new(
            pixels,
            self.width as usize,
            self.height as usize,
        ))
    }
}

/// Exact sample count for the given dimensions.
pub(crate) fn expected_len(
    width: u32,
    height: u32,
    layout: PixelLayout,
) -> Result<usize, RasterError> {
    if width == 0 || height == 0 {
        return Err(RasterError::ZeroDimension { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|wh| wh.checked_mul(layout.bytes_per_pixel()))
        .ok_or(RasterError::DimensionsTooLarge { width, height })
}
