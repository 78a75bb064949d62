use std::mem;

use crate::delimiter::is_boundary;

/// One piece of a chunk's text between delimiter boundaries.
///
/// `terminated` records whether a boundary closed the token inside the
/// chunk it arrived in. Every token except the last one of a chunk is
/// terminated by construction; the last one is terminated only when the
/// chunk's text ends on a boundary character.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub terminated: bool,
}

impl Token {
    /// A token closed by a boundary within its chunk.
    #[must_use]
    pub fn terminated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            terminated: true,
        }
    }

    /// A dangling token awaiting continuation in a later chunk.
    #[must_use]
    pub fn dangling(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            terminated: false,
        }
    }
}

/// The tokens of a single chunk, in order.
///
/// `leading_boundary` is set when the chunk's text starts on a boundary
/// character. That boundary belongs to whatever the previous chunk left
/// dangling, so the assembler closes its open fragments before taking
/// this chunk's tokens.
///
/// ```text
///   chunk N:    {"id_str":"1"}\r        → [ `{"id_str":"1"}` terminated ]
///   chunk N+1:  \n{"id_str":"2           → leading_boundary, [ `{"id_str":"2` dangling ]
///   chunk N+2:  "}\r\n                   → [ `"}` terminated ]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitChunk {
    pub leading_boundary: bool,
    pub tokens: Vec<Token>,
}

impl SplitChunk {
    /// `true` when the chunk carries no boundary and no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.leading_boundary && self.tokens.is_empty()
    }
}

/// Decodes raw chunk bytes as UTF-8 and tokenizes them on the delimiter.
///
/// Decoding is lossy: invalid sequences become U+FFFD and never fail.
/// A multi-byte character cut by the network layer is not an invalid
/// sequence, though. The splitter holds the incomplete trailing bytes
/// and prepends them to the next chunk, so the decoded text of any
/// partition of a byte stream concatenates to the decoded text of the
/// whole stream.
///
/// One splitter serves one upstream subscription; state never crosses
/// subscriptions.
#[derive(Debug, Default)]
pub struct FrameSplitter {
    utf8_tail: Vec<u8>,
}

impl FrameSplitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one chunk and split it into tokens.
    pub fn split(&mut self, chunk: &[u8]) -> SplitChunk {
        let text = self.decode(chunk);
        split_text(&text)
    }

    /// Number of bytes of an incomplete UTF-8 sequence held back from
    /// the previous chunk.
    #[must_use]
    pub fn pending_bytes(&self) -> usize {
        self.utf8_tail.len()
    }

    fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = mem::take(&mut self.utf8_tail);
        bytes.extend_from_slice(chunk);

        let mut text = String::with_capacity(bytes.len());
        let mut rest = bytes.as_slice();

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    text.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    text.push_str(&String::from_utf8_lossy(valid));

                    match err.error_len() {
                        Some(len) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        // Incomplete sequence at the end of the chunk
                        None => {
                            self.utf8_tail = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        text
    }
}

/// Split already-decoded text on delimiter boundaries.
///
/// Runs of boundary characters collapse into one boundary, so no token
/// is ever empty. An all-boundary text yields no tokens but still
/// reports its leading boundary.
#[must_use]
pub fn split_text(text: &str) -> SplitChunk {
    let mut tokens: Vec<Token> = text
        .split(is_boundary)
        .filter(|piece| !piece.is_empty())
        .map(Token::terminated)
        .collect();

    if let Some(last) = tokens.last_mut() {
        last.terminated = text.ends_with(is_boundary);
    }

    SplitChunk {
        leading_boundary: text.starts_with(is_boundary),
        tokens,
    }
}
