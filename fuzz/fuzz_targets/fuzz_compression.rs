#![no_main]

use framewire::core::codec::Codec;
use framewire::utils::compression::{BuiltinCompressor, Compressor};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

const CAP: usize = 64 * 1024;

fuzz_target!(|data: &[u8]| {
    let providers = [BuiltinCompressor::lz4(), BuiltinCompressor::zstd(1)];

    for provider in providers {
        // hostile input must fail cleanly and stay under the cap
        if let Ok(out) = provider.decompress(data, CAP) {
            assert!(out.len() <= CAP);
        }

        let codec = Codec::plain()
            .with_compressor(Some(Arc::new(provider) as Arc<dyn Compressor>))
            .with_max_buffer_size(CAP);
        let _ = codec.decode::<Vec<String>>(data);

        // anything the codec agrees to encode must come back
        let value = data.to_vec();
        if let Ok(encoded) = codec.encode(&value) {
            match codec.decode::<Vec<u8>>(&encoded) {
                Ok(decoded) => assert_eq!(decoded, value),
                Err(e) => panic!("encoded value failed to decode: {e}"),
            }
        }
    }
});
