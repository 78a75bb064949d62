//! Golden fixture generator for the firehose conformance suite.
//!
//! Writes the captured-stream fixtures under `tests/golden/`. Run it after
//! changing the fixture content; snapshot files (`.snap`) are updated
//! separately via `cargo insta review` after running the conformance tests.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin generate_golden -p firehose-tests
//! ```
//!
//! # Generated fixtures
//!
//! | File             | Contents                                          |
//! |------------------|---------------------------------------------------|
//! | capture.txt      | Mixed records, keep-alives, textless messages, and an unterminated tail |
//! | malformed.txt    | Two good records, one unquoted value, one more record |

#![allow(clippy::pedantic)]

use std::path::Path;

use firehose_wire::{DELIMITER, encode_frames};

fn main() {
    let golden = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/golden");
    std::fs::create_dir_all(&golden).expect("create tests/golden");

    write(&golden.join("capture.txt"), &capture());
    write(&golden.join("malformed.txt"), &malformed());
}

fn write(path: &Path, bytes: &[u8]) {
    std::fs::write(path, bytes).unwrap_or_else(|e| panic!("write {}: {e}", path.display()));
    println!("wrote {} ({} bytes)", path.display(), bytes.len());
}

fn capture() -> Vec<u8> {
    let mut out = encode_frames([
        r#"{"created_at":"Mon Oct 12 09:00:00 +0000 2026","id":1001,"id_str":"1001","text":"Rust 2024 edition is out","user":{"screen_name":"ferris"}}"#,
    ]);
    // Keep-alive.
    out.extend_from_slice(DELIMITER.as_bytes());
    out.extend(encode_frames([
        r#"{"id_str":"1002","text":"   ","lang":"en"}"#,
        r#"{"delete":{"status":{"id":1,"id_str":"1"}}}"#,
        r#"{"id":1003,"text":"numeric id only"}"#,
        r#"{"id_str":"1004","text":"unicode: café ☕ 🦀"}"#,
        r#"{"id_str":"1005","id":5,"text":"escaped \"quotes\" and \\ slash"}"#,
        r#"{"id_str":"1006","text":null}"#,
        r#"{"id_str":"1007","text":"last complete record"}"#,
    ]));
    out.extend_from_slice(DELIMITER.as_bytes());
    out.extend_from_slice(br#"{"id_str":"1008","text":"never terminated"}"#);
    out
}

fn malformed() -> Vec<u8> {
    encode_frames([
        r#"{"id_str":"1","text":"first"}"#,
        r#"{"id_str":"2","text":"second"}"#,
        r#"{"id":"3","text":Example}"#,
        r#"{"id_str":"4","text":"unreachable"}"#,
    ])
}
