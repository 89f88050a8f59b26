//! Built-in color filters for [`crate::Image::filter`].
//!
//! Each keeps the sample count and layout, and leaves alpha untouched.
//!
//! ```
//! use zenraster::{Image, PixelBuffer, PixelLayout, filters};
//!
//! let image = Image::new(PixelBuffer::blank(4, 4, PixelLayout::Rgba8)?);
//! let inverted = image.filter(filters::invert).render()?;
//! assert_eq!(inverted.pixel(0, 0), Some(&[255, 255, 255, 0][..]));
//! # Ok::<(), zenraster::RasterError>(())
//! ```

use crate::pixel::{PixelLayout, luma};

/// Replace R, G and B with the pixel's luma. Identity on `Gray8`.
pub fn grayscale(samples: &[u8], layout: PixelLayout) -> Vec<u8> {
    map_rgb(samples, layout, |r, g, b| {
        let y = luma(r, g, b);
        [y, y, y]
    })
}

/// Classic sepia tone matrix, clamped to 255. Identity on `Gray8`.
pub fn sepia(samples: &[u8], layout: PixelLayout) -> Vec<u8> {
    map_rgb(samples, layout, |r, g, b| {
        let (r, g, b) = (u32::from(r), u32::from(g), u32::from(b));
        let tone = |kr: u32, kg: u32, kb: u32| ((kr * r + kg * g + kb * b) / 1000).min(255) as u8;
        [tone(393, 769, 189), tone(349, 686, 168), tone(272, 534, 131)]
    })
}

/// `255 - v` for every color sample.
pub fn invert(samples: &[u8], layout: PixelLayout) -> Vec<u8> {
    match layout {
        PixelLayout::Gray8 => samples.iter().map(|v| 255 - v).collect(),
        _ => map_rgb(samples, layout, |r, g, b| [255 - r, 255 - g, 255 - b]),
    }
}

fn map_rgb(samples: &[u8], layout: PixelLayout, f: impl Fn(u8, u8, u8) -> [u8; 3]) -> Vec<u8> {
    if layout == PixelLayout::Gray8 {
        return samples.to_vec();
    }
    let mut out = samples.to_vec();
    for px in out.chunks_exact_mut(layout.bytes_per_pixel()) {
        let [r, g, b] = f(px[0], px[1], px[2]);
        px[..3].copy_from_slice(&[r, g, b]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grayscale_keeps_alpha() {
        let out = grayscale(&[255, 0, 0, 17, 255, 255, 255, 0], PixelLayout::Rgba8);
        assert_eq!(out, vec![76, 76, 76, 17, 255, 255, 255, 0]);
    }

    #[test]
    fn sepia_clamps() {
        let out = sepia(&[255, 255, 255], PixelLayout::Rgb8);
        assert_eq!(out, vec![255, 255, 238]);
        assert_eq!(sepia(&[0, 0, 0], PixelLayout::Rgb8), vec![0, 0, 0]);
    }

    #[test]
    fn gray_input() {
        let gray = [0u8, 100, 255];
        assert_eq!(grayscale(&gray, PixelLayout::Gray8), gray.to_vec());
        assert_eq!(sepia(&gray, PixelLayout::Gray8), gray.to_vec());
        assert_eq!(invert(&gray, PixelLayout::Gray8), vec![255, 155, 0]);
    }

    #[test]
    fn invert_twice_is_identity() {
        let rgba = [1u8, 2, 3, 4, 250, 251, 252, 253];
        let once = invert(&rgba, PixelLayout::Rgba8);
        assert_eq!(once, vec![254, 253, 252, 4, 5, 4, 3, 253]);
        assert_eq!(invert(&once, PixelLayout::Rgba8), rgba.to_vec());
    }
}
