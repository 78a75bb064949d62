#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use firehose_decoder::FramePipeline;

#[derive(Debug, Arbitrary)]
struct Input {
    bytes: Vec<u8>,
    cuts: Vec<u16>,
}

fn outcome(chunks: &[&[u8]]) -> (Vec<firehose_types::Record>, bool) {
    let mut pipeline = FramePipeline::new();
    let mut records = Vec::new();
    for chunk in chunks {
        for item in pipeline.push(chunk) {
            match item {
                Ok(record) => records.push(record),
                Err(_) => return (records, true),
            }
        }
    }
    (records, false)
}

// Fuzz target: the pipeline must not depend on where chunks are cut.
//
// Feeds the same bytes whole and cut at arbitrary offsets, and requires
// identical records and the same failure outcome.
fuzz_target!(|input: Input| {
    let mut offsets: Vec<usize> = input
        .cuts
        .iter()
        .map(|&c| usize::from(c) % (input.bytes.len() + 1))
        .collect();
    offsets.sort_unstable();
    offsets.dedup();

    let mut chunks = Vec::new();
    let mut start = 0;
    for offset in offsets {
        chunks.push(&input.bytes[start..offset]);
        start = offset;
    }
    chunks.push(&input.bytes[start..]);

    assert_eq!(outcome(&[input.bytes.as_slice()]), outcome(&chunks));
});
