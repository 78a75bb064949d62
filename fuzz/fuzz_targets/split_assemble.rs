#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: FrameSplitter + FrameAssembler over arbitrary bytes.
//
// Catches bugs in:
// - UTF-8 tail carry across chunk boundaries
// - Delimiter runs and leading boundaries
// - Frames that contain a CR or LF
fuzz_target!(|data: &[u8]| {
    let mut splitter = firehose_wire::FrameSplitter::new();
    let mut assembler = firehose_wire::FrameAssembler::new();

    for chunk in data.chunks(7) {
        for frame in assembler.push(splitter.split(chunk)) {
            assert!(!frame.is_empty());
            assert!(!frame.as_str().contains(['\r', '\n']));
        }
    }
    assert!(splitter.pending_bytes() < 4);
});
