//! Chunk-boundary independence of the frame pipeline.
//!
//! However the upstream happens to cut the byte stream, including inside
//! the CRLF delimiter or inside a multi-byte character, the pipeline must
//! emit exactly the records a single whole-stream chunk would.

use firehose_decoder::FramePipeline;
use firehose_types::Record;
use proptest::prelude::*;
use proptest::sample::Index;

fn run(chunks: &[&[u8]]) -> Vec<Record> {
    let mut pipeline = FramePipeline::new();
    let mut out = Vec::new();
    for chunk in chunks {
        for item in pipeline.push(chunk) {
            out.push(item.expect("fixture frames are valid JSON"));
        }
    }
    pipeline.finish();
    out
}

fn cut<'a>(bytes: &'a [u8], points: &[Index]) -> Vec<&'a [u8]> {
    let mut offsets: Vec<usize> = points.iter().map(|p| p.index(bytes.len() + 1)).collect();
    offsets.sort_unstable();
    offsets.dedup();

    let mut chunks = Vec::new();
    let mut start = 0;
    for offset in offsets {
        chunks.push(&bytes[start..offset]);
        start = offset;
    }
    chunks.push(&bytes[start..]);
    chunks
}

fn encode(records: &[Record]) -> Vec<u8> {
    let lines: Vec<String> = records
        .iter()
        .map(|r| serde_json::to_string(r).expect("records serialize"))
        .collect();
    firehose_wire::encode_frames(&lines)
}

fn record() -> impl Strategy<Value = Record> {
    (any::<u64>(), "\\PC{0,16}").prop_map(|(id, text)| Record::new(id.to_string(), text))
}

#[test]
fn two_chunk_example() {
    let stream: [&[u8]; 2] = [
        b"{\"id\":\"1\",\"text\":\"A\"}\r\n{\"id\":\"2\",\"te",
        b"xt\":\"B\"}\r\n",
    ];
    assert_eq!(run(&stream), [Record::new("1", "A"), Record::new("2", "B")]);
}

#[test]
fn delimiter_split_between_cr_and_lf() {
    let stream: [&[u8]; 3] = [
        b"{\"id_str\":\"1\",\"text\":\"A\"}\r",
        b"\n{\"id_str\":\"2\",\"text\":\"B\"}\r",
        b"\n",
    ];
    assert_eq!(run(&stream), [Record::new("1", "A"), Record::new("2", "B")]);
}

proptest! {
    #[test]
    fn any_partition_yields_the_same_records(
        records in prop::collection::vec(record(), 0..12),
        points in prop::collection::vec(any::<Index>(), 0..16),
    ) {
        let bytes = encode(&records);
        let expected: Vec<Record> = records.into_iter().filter(Record::has_text).collect();

        prop_assert_eq!(run(&[bytes.as_slice()]), expected.clone());
        prop_assert_eq!(run(&cut(&bytes, &points)), expected);
    }

    #[test]
    fn trailing_partial_frame_never_emits(
        records in prop::collection::vec(record(), 1..6),
        keep in any::<Index>(),
    ) {
        let mut bytes = encode(&records);
        let last = serde_json::to_vec(records.last().unwrap()).unwrap();
        // Drop the final delimiter and a suffix of the last frame.
        bytes.truncate(bytes.len() - 2 - keep.index(last.len()));

        let expected: Vec<Record> = records[..records.len() - 1]
            .iter()
            .filter(|r| r.has_text())
            .cloned()
            .collect();
        prop_assert_eq!(run(&cut(&bytes, &[keep])), expected);
    }
}
