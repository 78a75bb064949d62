//! Conformance tests: captured streams replayed to insta snapshots.
//!
//! Each test reads a fixture from `tests/golden/`, replays it through
//! [`RecordReader`] at several chunk sizes, and renders the outcome one
//! line per record. Every chunk size must render identically; the
//! rendering is compared against a snapshot in `tests/snapshots/`.
//!
//! The fixtures are written by `src/bin/generate_golden.rs`. A diff in a
//! snapshot signals either a deliberate behaviour change (accept via
//! `cargo insta review`) or a regression.

use std::fmt::Write as _;
use std::path::Path;

use firehose_decoder::{DecodeError, RecordReader};
use insta::assert_snapshot;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn golden(fixture: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/golden")
        .join(fixture);
    std::fs::read(&path)
        .unwrap_or_else(|e| panic!("failed to read golden fixture {}: {e}", path.display()))
}

/// Replay `bytes` in `chunk_size` pieces and render each outcome.
async fn replay(bytes: &[u8], chunk_size: usize) -> String {
    let mut reader = RecordReader::new(bytes).with_chunk_size(chunk_size);
    let mut out = String::new();

    while let Some(item) = reader.next().await {
        match item {
            Ok(record) => writeln!(out, "{record}").unwrap(),
            Err(DecodeError::Malformed { preview, len, .. }) => {
                writeln!(out, "error: malformed frame ({len} bytes) {preview}").unwrap();
            }
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    out
}

async fn replay_all_sizes(fixture: &str) -> String {
    let bytes = golden(fixture);
    let whole = replay(&bytes, bytes.len().max(1)).await;

    for chunk_size in [1, 2, 3, 7, 64] {
        assert_eq!(
            replay(&bytes, chunk_size).await,
            whole,
            "{fixture} rendered differently at chunk size {chunk_size}"
        );
    }
    whole
}

// ── Fixtures ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn capture_records() {
    let output = replay_all_sizes("capture.txt").await;
    assert_snapshot!("capture_records", output);
}

#[tokio::test]
async fn malformed_stops_stream() {
    let output = replay_all_sizes("malformed.txt").await;
    assert_snapshot!("malformed_stops_stream", output);
}
