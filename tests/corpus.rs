//! Test corpus: roundtrips over patterns and sizes, plus hand-built PNGs
//! exercising every scanline filter.

use enough::Unstoppable;
use zenraster::*;

fn checkerboard(w: usize, h: usize, bpp: usize) -> Vec<u8> {
    let mut pixels = vec![0u8; w * h * bpp];
    for y in 0..h {
        for x in 0..w {
            let off = (y * w + x) * bpp;
            if (x + y) % 2 == 0 {
                for c in 0..bpp {
                    pixels[off + c] = 200 + (c as u8 * 20);
                }
            } else {
                for c in 0..bpp {
                    pixels[off + c] = 10 + (c as u8 * 30);
                }
            }
        }
    }
    pixels
}

fn noise_pattern(w: usize, h: usize, bpp: usize) -> Vec<u8> {
    let mut pixels = vec![0u8; w * h * bpp];
    let mut state: u32 = 0xDEAD_BEEF;
    for p in pixels.iter_mut() {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        *p = state as u8;
    }
    pixels
}

fn gradient(w: usize, h: usize, bpp: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(w * h * bpp);
    for y in 0..h {
        for x in 0..w {
            for c in 0..bpp {
                pixels.push((x * 3 + y * 5 + c * 40) as u8);
            }
        }
    }
    pixels
}

const SIZES: &[(u32, u32)] = &[(1, 1), (1, 7), (7, 1), (2, 2), (3, 5), (5, 3), (13, 11), (64, 3), (33, 33)];

fn patterns(w: u32, h: u32, layout: PixelLayout) -> Vec<PixelBuffer> {
    let (w_us, h_us, bpp) = (w as usize, h as usize, layout.bytes_per_pixel());
    [
        checkerboard(w_us, h_us, bpp),
        noise_pattern(w_us, h_us, bpp),
        gradient(w_us, h_us, bpp),
    ]
    .into_iter()
    .map(|pixels| PixelBuffer::new(pixels, w, h, layout).unwrap())
    .collect()
}

// ── BMP ──────────────────────────────────────────────────────────────

#[test]
fn bmp_corpus_roundtrip() {
    for &(w, h) in SIZES {
        for layout in [PixelLayout::Rgb8, PixelLayout::Rgba8] {
            for buf in patterns(w, h, layout) {
                let bmp = EncodeRequest::bmp().encode(&buf, Unstoppable).unwrap();
                let row = w as usize * layout.bytes_per_pixel();
                assert_eq!(bmp.len(), 54 + row.next_multiple_of(4) * h as usize);
                let decoded = DecodeRequest::new(&bmp)
                    .with_permissiveness(Permissiveness::Strict)
                    .decode(Unstoppable)
                    .unwrap();
                assert_eq!(decoded, buf, "{w}x{h} {layout:?}");
            }
        }
    }
}

#[test]
fn bmp_missing_final_padding_tolerated() {
    let buf = PixelBuffer::new(gradient(3, 3, 3), 3, 3, PixelLayout::Rgb8).unwrap();
    let bmp = EncodeRequest::bmp().encode(&buf, Unstoppable).unwrap();
    let short = &bmp[..bmp.len() - 3];
    assert_eq!(DecodeRequest::new(short).decode(Unstoppable).unwrap(), buf);
}

#[test]
fn bmp_limits() {
    let buf = PixelBuffer::new(checkerboard(10, 10, 3), 10, 10, PixelLayout::Rgb8).unwrap();
    let bmp = EncodeRequest::bmp().encode(&buf, Unstoppable).unwrap();

    let limits = Limits {
        max_width: Some(9),
        ..Default::default()
    };
    let err = DecodeRequest::new(&bmp)
        .with_limits(&limits)
        .decode(Unstoppable)
        .unwrap_err();
    assert!(matches!(err, RasterError::LimitExceeded(_)));

    let limits = Limits {
        max_memory_bytes: Some(299),
        ..Default::default()
    };
    let err = DecodeRequest::new(&bmp)
        .with_limits(&limits)
        .decode(Unstoppable)
        .unwrap_err();
    assert!(matches!(err, RasterError::LimitExceeded(_)));
}

// ── PNG ──────────────────────────────────────────────────────────────

#[test]
fn png_corpus_roundtrip_both_strategies() {
    for &(w, h) in SIZES {
        for layout in [PixelLayout::Rgb8, PixelLayout::Rgba8] {
            for buf in patterns(w, h, layout) {
                for strategy in [FilterStrategy::None, FilterStrategy::Adaptive] {
                    let options = EncodeOptions::default().with_png_filter(strategy);
                    let png = EncodeRequest::png()
                        .with_options(options)
                        .encode(&buf, Unstoppable)
                        .unwrap();
                    let decoded = DecodeRequest::new(&png)
                        .with_permissiveness(Permissiveness::Strict)
                        .decode(Unstoppable)
                        .unwrap();
                    assert_eq!(decoded, buf, "{w}x{h} {layout:?} {strategy:?}");
                }
            }
        }
    }
}

#[test]
fn png_compression_levels() {
    let buf = PixelBuffer::new(gradient(40, 40, 3), 40, 40, PixelLayout::Rgb8).unwrap();
    let stored = EncodeRequest::png()
        .with_options(EncodeOptions::default().with_compression_level(0))
        .encode(&buf, Unstoppable)
        .unwrap();
    let best = EncodeRequest::png()
        .with_options(EncodeOptions::default().with_compression_level(10))
        .encode(&buf, Unstoppable)
        .unwrap();
    assert!(best.len() < stored.len());
    for png in [&stored, &best] {
        assert_eq!(DecodeRequest::new(png).decode(Unstoppable).unwrap(), buf);
    }
}

/// Hand-built PNG writer for decoder tests.
mod handmade {
    pub const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    pub fn chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(kind);
        out.extend_from_slice(data);
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(kind);
        hasher.update(data);
        out.extend_from_slice(&hasher.finalize().to_be_bytes());
    }

    pub fn ihdr(width: u32, height: u32, color_type: u8) -> Vec<u8> {
        let mut d = Vec::with_capacity(13);
        d.extend_from_slice(&width.to_be_bytes());
        d.extend_from_slice(&height.to_be_bytes());
        d.extend_from_slice(&[8, color_type, 0, 0, 0]);
        d
    }

    /// Assemble a PNG whose IDAT payload is split into `idat_parts` chunks.
    pub fn png(width: u32, height: u32, color_type: u8, scanlines: &[u8], idat_parts: usize) -> Vec<u8> {
        let z = miniz_oxide::deflate::compress_to_vec_zlib(scanlines, 6);
        let mut out = SIGNATURE.to_vec();
        chunk(&mut out, b"IHDR", &ihdr(width, height, color_type));
        let part = z.len().div_ceil(idat_parts.max(1));
        for piece in z.chunks(part.max(1)) {
            chunk(&mut out, b"IDAT", piece);
        }
        chunk(&mut out, b"IEND", &[]);
        out
    }

    fn paeth(a: u8, b: u8, c: u8) -> u8 {
        let p = a as i16 + b as i16 - c as i16;
        let (pa, pb, pc) = ((p - a as i16).abs(), (p - b as i16).abs(), (p - c as i16).abs());
        if pa <= pb && pa <= pc {
            a
        } else if pb <= pc {
            b
        } else {
            c
        }
    }

    /// Filter every row of `raw` with `filter`, straight from the PNG
    /// definitions.
    pub fn filter_rows(raw: &[u8], row_bytes: usize, bpp: usize, filter: u8) -> Vec<u8> {
        let mut out = Vec::new();
        let zero = vec![0u8; row_bytes];
        for (y, row) in raw.chunks(row_bytes).enumerate() {
            let prev = if y == 0 { &zero[..] } else { &raw[(y - 1) * row_bytes..y * row_bytes] };
            out.push(filter);
            for i in 0..row_bytes {
                let a = if i >= bpp { row[i - bpp] } else { 0 };
                let b = prev[i];
                let c = if i >= bpp { prev[i - bpp] } else { 0 };
                let predicted = match filter {
                    0 => 0,
                    1 => a,
                    2 => b,
                    3 => ((a as u16 + b as u16) / 2) as u8,
                    4 => paeth(a, b, c),
                    _ => unreachable!(),
                };
                out.push(row[i].wrapping_sub(predicted));
            }
        }
        out
    }
}

#[test]
fn png_each_filter_type_decodes() {
    let (w, h) = (9u32, 6u32);
    for (color_type, layout) in [(2u8, PixelLayout::Rgb8), (6, PixelLayout::Rgba8)] {
        let bpp = layout.bytes_per_pixel();
        let raw = noise_pattern(w as usize, h as usize, bpp);
        for filter in 0..=4u8 {
            let scanlines = handmade::filter_rows(&raw, w as usize * bpp, bpp, filter);
            let png = handmade::png(w, h, color_type, &scanlines, 1);
            let decoded = DecodeRequest::new(&png).decode(Unstoppable).unwrap();
            assert_eq!(decoded.samples(), &raw[..], "filter {filter}, {layout:?}");
        }
    }
}

#[test]
fn png_mixed_filters_per_row() {
    let (w, h, bpp) = (5usize, 5usize, 3usize);
    let raw = gradient(w, h, bpp);
    let mut scanlines = Vec::new();
    for y in 0..h {
        // Filter each row with a different type, using the true previous row.
        let start = y.saturating_sub(1) * w * bpp;
        let window = &raw[start..(y + 1) * w * bpp];
        let filtered = handmade::filter_rows(window, w * bpp, bpp, y as u8 % 5);
        let last = &filtered[filtered.len() - (w * bpp + 1)..];
        scanlines.extend_from_slice(last);
    }
    let png = handmade::png(w as u32, h as u32, 2, &scanlines, 1);
    let decoded = DecodeRequest::new(&png).decode(Unstoppable).unwrap();
    assert_eq!(decoded.samples(), &raw[..]);
}

#[test]
fn png_split_idat() {
    let raw = checkerboard(12, 12, 4);
    let scanlines = handmade::filter_rows(&raw, 48, 4, 4);
    let png = handmade::png(12, 12, 6, &scanlines, 5);
    let decoded = DecodeRequest::new(&png).decode(Unstoppable).unwrap();
    assert_eq!(decoded.samples(), &raw[..]);
}

#[test]
fn png_unknown_filter_byte() {
    let raw = checkerboard(2, 2, 3);
    let mut scanlines = handmade::filter_rows(&raw, 6, 3, 0);
    scanlines[7] = 5;
    let png = handmade::png(2, 2, 2, &scanlines, 1);
    let err = DecodeRequest::new(&png).decode(Unstoppable).unwrap_err();
    assert!(matches!(err, RasterError::InvalidData(_)), "{err}");
}

#[test]
fn png_short_image_data() {
    let raw = gradient(4, 4, 3);
    let scanlines = handmade::filter_rows(&raw, 12, 3, 1);
    // Drop the last scanline from the compressed stream.
    let png = handmade::png(4, 4, 2, &scanlines[..39], 1);

    let err = DecodeRequest::new(&png).decode(Unstoppable).unwrap_err();
    assert!(matches!(err, RasterError::TruncatedFile));

    let decoded = DecodeRequest::new(&png)
        .with_permissiveness(Permissiveness::Permissive)
        .decode(Unstoppable)
        .unwrap();
    assert_eq!(&decoded.samples()[..36], &raw[..36]);
    assert!(decoded.samples()[36..].iter().all(|&v| v == 0));
}

#[test]
fn png_trailing_image_data() {
    let raw = gradient(3, 2, 3);
    let mut scanlines = handmade::filter_rows(&raw, 9, 3, 2);
    scanlines.extend_from_slice(&[0; 10]);
    let png = handmade::png(3, 2, 2, &scanlines, 1);

    let decoded = DecodeRequest::new(&png).decode(Unstoppable).unwrap();
    assert_eq!(decoded.samples(), &raw[..]);
    let err = DecodeRequest::new(&png)
        .with_permissiveness(Permissiveness::Strict)
        .decode(Unstoppable)
        .unwrap_err();
    assert!(matches!(err, RasterError::InvalidData(_)));
}

#[test]
fn png_unknown_critical_chunk() {
    let raw = checkerboard(2, 2, 3);
    let scanlines = handmade::filter_rows(&raw, 6, 3, 0);
    let z = miniz_oxide::deflate::compress_to_vec_zlib(&scanlines, 6);
    let mut png = handmade::SIGNATURE.to_vec();
    handmade::chunk(&mut png, b"IHDR", &handmade::ihdr(2, 2, 2));
    handmade::chunk(&mut png, b"ZZZZ", b"?");
    handmade::chunk(&mut png, b"IDAT", &z);
    handmade::chunk(&mut png, b"IEND", &[]);

    assert_eq!(DecodeRequest::new(&png).decode(Unstoppable).unwrap().samples(), &raw[..]);
    let err = DecodeRequest::new(&png)
        .with_permissiveness(Permissiveness::Strict)
        .decode(Unstoppable)
        .unwrap_err();
    assert!(matches!(err, RasterError::InvalidData(_)));
}

#[test]
fn png_ihdr_must_come_first() {
    let mut png = handmade::SIGNATURE.to_vec();
    handmade::chunk(&mut png, b"tEXt", b"a\0b");
    handmade::chunk(&mut png, b"IHDR", &handmade::ihdr(1, 1, 2));
    handmade::chunk(&mut png, b"IEND", &[]);
    let err = DecodeRequest::new(&png).decode(Unstoppable).unwrap_err();
    assert!(matches!(err, RasterError::InvalidHeader(_)));
}

#[test]
fn png_limits() {
    let buf = PixelBuffer::new(noise_pattern(20, 20, 4), 20, 20, PixelLayout::Rgba8).unwrap();
    let png = EncodeRequest::png().encode(&buf, Unstoppable).unwrap();
    let limits = Limits {
        max_pixels: Some(399),
        ..Default::default()
    };
    let err = DecodeRequest::new(&png)
        .with_limits(&limits)
        .decode(Unstoppable)
        .unwrap_err();
    assert!(matches!(err, RasterError::LimitExceeded(_)));
}

#[test]
fn probe_matches_decode() {
    for &(w, h) in SIZES {
        let buf = PixelBuffer::new(gradient(w as usize, h as usize, 3), w, h, PixelLayout::Rgb8).unwrap();
        for request in [EncodeRequest::bmp(), EncodeRequest::png()] {
            let bytes = request.encode(&buf, Unstoppable).unwrap();
            let info = ImageInfo::from_bytes(&bytes).unwrap();
            let decoded = DecodeRequest::new(&bytes).decode(Unstoppable).unwrap();
            assert_eq!((info.width, info.height, info.layout), (decoded.width(), decoded.height(), decoded.layout()));
        }
    }
}
