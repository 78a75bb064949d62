use crate::delimiter::DELIMITER;

/// Append one payload followed by the delimiter.
pub fn write_frame(out: &mut Vec<u8>, payload: &str) {
    out.extend_from_slice(payload.as_bytes());
    out.extend_from_slice(DELIMITER.as_bytes());
}

/// Encode payloads as wire text, each terminated by [`DELIMITER`].
///
/// This is the inverse of splitting plus assembling, and is what test
/// fixtures, benches and fuzz targets use to build upstream bytes.
///
/// ```rust
/// use firehose_wire::encode_frames;
///
/// let wire = encode_frames([r#"{"id_str":"1","text":"hi"}"#]);
/// assert_eq!(wire, b"{\"id_str\":\"1\",\"text\":\"hi\"}\r\n");
/// ```
pub fn encode_frames<I, S>(payloads: I) -> Vec<u8>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = Vec::new();
    for payload in payloads {
        write_frame(&mut out, payload.as_ref());
    }
    out
}
