use std::fmt;

use crate::splitter::{SplitChunk, Token};

/// The complete text of exactly one wire record.
///
/// A frame never contains delimiter characters; its boundaries sit on
/// delimiter occurrences in the logical concatenation of all chunks.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Frame(String);

impl Frame {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `true` when the frame holds nothing but whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl AsRef<str> for Frame {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reassembles frames from the token stream of consecutive chunks.
///
/// The assembler holds the fragments seen since the last boundary.
/// Each token is appended in arrival order; a terminated token closes
/// the accumulator into a [`Frame`] (fragments concatenated with no
/// separator) and clears it.
///
/// ```text
///   chunk 1: `{"id_str":"1","text":"A"}\r\n{"id_str":"2","te`
///            ├─ token T ───────────────┤    ├─ token D ─────┤
///                       │                           │
///                       ▼                           ▼
///                  emit Frame 1             fragments = [ `{"id_str":"2","te` ]
///
///   chunk 2: `xt":"B"}\r\n`
///            ├ token T ┤
///                 │
///                 ▼
///            emit Frame 2 = `{"id_str":"2","te` + `xt":"B"}`
/// ```
///
/// State is scoped to one upstream subscription. Whatever is still open
/// when the upstream completes is an incomplete record and must be
/// dropped with [`discard`](Self::discard), never emitted.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    fragments: Vec<String>,
}

impl FrameAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk's tokens and collect the frames they close.
    pub fn push(&mut self, split: SplitChunk) -> Vec<Frame> {
        let mut frames = Vec::new();

        if split.leading_boundary {
            frames.extend(self.close());
        }

        for token in split.tokens {
            frames.extend(self.push_token(token));
        }

        frames
    }

    /// Append one token; returns the frame it closes, if any.
    pub fn push_token(&mut self, token: Token) -> Option<Frame> {
        self.fragments.push(token.text);

        if token.terminated {
            self.close()
        } else {
            None
        }
    }

    /// Close the accumulator at a boundary.
    ///
    /// Returns `None` when nothing is open, so repeated boundaries never
    /// produce empty frames.
    pub fn close(&mut self) -> Option<Frame> {
        if self.fragments.is_empty() {
            return None;
        }

        let frame = Frame(self.fragments.concat());
        self.fragments.clear();
        Some(frame)
    }

    /// Drop any open fragments, returning how many bytes were dropped.
    pub fn discard(&mut self) -> usize {
        let dropped = self.pending_len();
        self.fragments.clear();
        dropped
    }

    /// Bytes of text accumulated since the last boundary.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.fragments.iter().map(String::len).sum()
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.fragments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splitter::FrameSplitter;

    fn assemble(chunks: &[&[u8]]) -> (Vec<Frame>, FrameAssembler) {
        let mut splitter = FrameSplitter::new();
        let mut assembler = FrameAssembler::new();
        let mut frames = Vec::new();

        for chunk in chunks {
            frames.extend(assembler.push(splitter.split(chunk)));
        }

        (frames, assembler)
    }

    #[test]
    fn carries_dangling_token_into_next_chunk() {
        let (frames, assembler) = assemble(&[
            b"{\"id\":\"1\",\"text\":\"A\"}\r\n{\"id\":\"2\",\"te",
            b"xt\":\"B\"}\r\n",
        ]);

        assert_eq!(
            frames,
            vec![
                Frame::new("{\"id\":\"1\",\"text\":\"A\"}"),
                Frame::new("{\"id\":\"2\",\"text\":\"B\"}"),
            ]
        );
        assert!(assembler.is_idle());
    }

    #[test]
    fn frame_spanning_many_chunks() {
        let (frames, _) = assemble(&[b"{\"a\"", b":", b"1", b"}", b"\r\n"]);
        assert_eq!(frames, vec![Frame::new("{\"a\":1}")]);
    }

    #[test]
    fn boundary_at_start_of_chunk_closes_previous_fragments() {
        let (frames, assembler) = assemble(&[b"{\"a\":1}", b"\r\n{\"b\":2}"]);
        assert_eq!(frames, vec![Frame::new("{\"a\":1}")]);
        assert_eq!(assembler.pending_len(), "{\"b\":2}".len());
    }

    #[test]
    fn unterminated_tail_is_never_emitted() {
        let (frames, mut assembler) = assemble(&[b"{\"a\":1}\r\n{\"b\":"]);
        assert_eq!(frames.len(), 1);
        assert_eq!(assembler.discard(), 5);
        assert!(assembler.is_idle());
        assert_eq!(assembler.close(), None);
    }

    #[test]
    fn keep_alive_chunks_produce_nothing() {
        let (frames, assembler) = assemble(&[b"\r\n", b"\r\n\r\n", b""]);
        assert!(frames.is_empty());
        assert!(assembler.is_idle());
    }

    #[test]
    fn blank_frame_detection() {
        assert!(Frame::new("  \t").is_blank());
        assert!(!Frame::new(" {} ").is_blank());
    }
}
