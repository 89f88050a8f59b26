#![no_main]
use libfuzzer_sys::fuzz_target;
use zenraster::*;

fuzz_target!(|data: &[u8]| {
    // If we can decode it, re-encoding and decoding again must produce identical pixels
    let limits = Limits {
        max_pixels: Some(1 << 20),
        ..Default::default()
    };
    let Ok(decoded) = DecodeRequest::new(data)
        .with_limits(&limits)
        .decode(enough::Unstoppable)
    else {
        return;
    };

    let adaptive = EncodeOptions::default().with_png_filter(FilterStrategy::Adaptive);
    for request in [
        EncodeRequest::bmp(),
        EncodeRequest::png(),
        EncodeRequest::png().with_options(adaptive),
    ] {
        let reencoded = request
            .encode(&decoded, enough::Unstoppable)
            .expect("decoded RGB/RGBA must re-encode");
        let Ok(decoded2) = DecodeRequest::new(&reencoded).decode(enough::Unstoppable) else {
            panic!("re-encoded data failed to decode");
        };
        assert_eq!(decoded, decoded2, "roundtrip pixel mismatch");
    }
});
