#![no_main]

use cvt_codec::{Codec, ConversionResult, Cp1258};
use libfuzzer_sys::fuzz_target;

const MAX_INPUT_BYTES: usize = 64 * 1024;

fuzz_target!(|data: &[u8]| {
    if data.len() > MAX_INPUT_BYTES {
        return;
    }
    let codec = Cp1258::<u16>::new();

    // A single-byte code page never reports a partial sequence, and anything it decodes
    // must encode back to the same bytes.
    match codec.decode_all(data) {
        ConversionResult::Success { output, consumed } => {
            assert_eq!(consumed, data.len());
            assert_eq!(output.len(), data.len());
            assert_eq!(
                codec.encode_all(&output),
                ConversionResult::success(data.to_vec(), output.len())
            );
        }
        ConversionResult::Partial { reason } => panic!("partial result from cp1258: {reason}"),
        ConversionResult::Error { .. } => {}
    }
});
