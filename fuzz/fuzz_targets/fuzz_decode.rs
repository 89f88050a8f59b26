#![no_main]
use libfuzzer_sys::fuzz_target;
use zenraster::*;

fuzz_target!(|data: &[u8]| {
    let limits = Limits {
        max_pixels: Some(1 << 22),
        ..Default::default()
    };

    // Auto-detect decode and header probing must never panic
    let _ = DecodeRequest::new(data).with_limits(&limits).decode(enough::Unstoppable);
    let _ = ImageInfo::from_bytes(data);

    // Each codec explicitly, at every strictness level
    for codec in [Codec::Bmp, Codec::Png] {
        for permissiveness in [
            Permissiveness::Strict,
            Permissiveness::Standard,
            Permissiveness::Permissive,
        ] {
            let _ = DecodeRequest::new(data)
                .with_codec(codec)
                .with_limits(&limits)
                .with_permissiveness(permissiveness)
                .decode(enough::Unstoppable);
        }
    }
});
