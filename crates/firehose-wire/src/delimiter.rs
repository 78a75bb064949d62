/// The two-character sequence that terminates every record on the wire.
///
/// ```text
/// {"id_str":"1","text":"a"}\r\n{"id_str":"2","text":"b"}\r\n\r\n
/// └──────── frame ────────┘    └──────── frame ────────┘    └─ keep-alive
/// ```
///
/// Raw CR and LF can never appear inside a JSON document (string values
/// escape them), so either character on the wire is a frame boundary.
pub const DELIMITER: &str = "\r\n";

/// Returns `true` for the characters that make up [`DELIMITER`].
///
/// Splitting treats a run of these as one boundary, so a chunk cut
/// between the CR and the LF splits exactly like an uncut stream.
#[must_use]
pub fn is_boundary(c: char) -> bool {
    c == '\r' || c == '\n'
}
