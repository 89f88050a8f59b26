#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &b in bytes {
        crc ^= u32::from(b);
        for _ in 0..8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ 0xEDB8_8320 } else { crc >> 1 };
        }
    }
    !crc
}

fn adler32(bytes: &[u8]) -> u32 {
    let (mut a, mut b) = (1u32, 0u32);
    for &x in bytes {
        a = (a + u32::from(x)) % 65521;
        b = (b + a) % 65521;
    }
    (b << 16) | a
}

/// zlib stream with a single stored (uncompressed) deflate block.
fn zlib_stored(raw: &[u8]) -> Vec<u8> {
    let mut z = vec![0x78, 0x01, 0x01];
    let len = raw.len() as u16;
    z.extend_from_slice(&len.to_le_bytes());
    z.extend_from_slice(&(!len).to_le_bytes());
    z.extend_from_slice(raw);
    z.extend_from_slice(&adler32(raw).to_be_bytes());
    z
}

fn chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    let start = out.len();
    out.extend_from_slice(kind);
    out.extend_from_slice(data);
    let crc = crc32(&out[start..]);
    out.extend_from_slice(&crc.to_be_bytes());
}

fn png(width: u32, height: u32, color_type: u8, scanlines: &[u8]) -> Vec<u8> {
    let mut out = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    let mut ihdr = Vec::new();
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    ihdr.extend_from_slice(&[8, color_type, 0, 0, 0]);
    chunk(&mut out, b"IHDR", &ihdr);
    chunk(&mut out, b"IDAT", &zlib_stored(scanlines));
    chunk(&mut out, b"IEND", &[]);
    out
}

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    // Minimal BMP 1x1 24-bit
    let mut bmp = vec![0u8; 58]; // 54 header + 4 pixel (3 + 1 padding)
    bmp[0] = b'B'; bmp[1] = b'M';
    bmp[2..6].copy_from_slice(&58u32.to_le_bytes()); // file size
    bmp[10..14].copy_from_slice(&54u32.to_le_bytes()); // data offset
    bmp[14..18].copy_from_slice(&40u32.to_le_bytes()); // DIB header size
    bmp[18..22].copy_from_slice(&1i32.to_le_bytes()); // width
    bmp[22..26].copy_from_slice(&1i32.to_le_bytes()); // height
    bmp[26..28].copy_from_slice(&1u16.to_le_bytes()); // planes
    bmp[28..30].copy_from_slice(&24u16.to_le_bytes()); // bpp
    bmp[54] = 0xff; bmp[55] = 0x00; bmp[56] = 0x00; // BGR
    fs::write(format!("{dir}/bmp_1x1.bmp"), &bmp).unwrap();

    // BMP 2x2 32-bit top-down
    let mut bmp32 = bmp[..54].to_vec();
    bmp32[2..6].copy_from_slice(&70u32.to_le_bytes());
    bmp32[18..22].copy_from_slice(&2i32.to_le_bytes());
    bmp32[22..26].copy_from_slice(&(-2i32).to_le_bytes());
    bmp32[28..30].copy_from_slice(&32u16.to_le_bytes());
    bmp32.extend_from_slice(&[0, 0, 255, 255, 0, 255, 0, 128, 255, 0, 0, 0, 9, 9, 9, 255]);
    fs::write(format!("{dir}/bmp_2x2_rgba_topdown.bmp"), &bmp32).unwrap();

    // PNG 2x2 RGB, filters None and Sub
    let rgb = [0u8, 255, 0, 0, 0, 255, 0, 1, 0, 0, 255, 0, 0, 0];
    fs::write(format!("{dir}/png_2x2_rgb.png"), png(2, 2, 2, &rgb)).unwrap();

    // PNG 2x2 RGBA, filters Up and Paeth
    let rgba = [2u8, 1, 2, 3, 4, 5, 6, 7, 8, 4, 9, 9, 9, 9, 1, 1, 1, 1];
    fs::write(format!("{dir}/png_2x2_rgba.png"), png(2, 2, 6, &rgba)).unwrap();

    // PNG 3x1 RGB, Average filter
    let avg = [3u8, 10, 20, 30, 5, 5, 5, 1, 1, 1];
    fs::write(format!("{dir}/png_3x1_avg.png"), png(3, 1, 2, &avg)).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/bm_short.bin"), b"BM\x00\x00").unwrap();
    let full = png(2, 2, 2, &rgb);
    fs::write(format!("{dir}/png_no_iend.bin"), &full[..full.len() - 12]).unwrap();
    fs::write(format!("{dir}/png_sig_only.bin"), &full[..8]).unwrap();

    println!("Generated seed corpus in {dir}/");
}
