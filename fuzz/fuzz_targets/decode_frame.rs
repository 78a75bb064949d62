#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: RecordDecoder::decode on arbitrary frame text.
//
// Catches bugs in:
// - id resolution (id_str vs string or numeric id)
// - Preview truncation on multi-byte characters
fuzz_target!(|text: &str| {
    let decoder = firehose_decoder::RecordDecoder::new();
    let frame = firehose_wire::Frame::new(text);

    if let Err(firehose_decoder::DecodeError::Malformed { preview, len, .. }) = decoder.decode(&frame) {
        assert_eq!(len, text.len());
        assert!(text.starts_with(&preview));
    }
});
