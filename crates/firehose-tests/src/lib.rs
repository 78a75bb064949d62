//! Shared fixtures for the firehose integration suite.
//!
//! [`ScriptedSource`] is a [`ByteChunkSource`] whose chunks are pushed by
//! the test body, one upstream session at a time. It counts how many
//! sessions were opened and how many chunk streams were dropped, which is
//! how the multicast tests observe connect and cancel. The hub opens its
//! upstream from a spawned task, so tests wait with
//! [`ScriptedSource::wait_opened`] before pushing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use firehose_hub::{ByteChunkSource, ChunkStream, SourceError};
use futures::StreamExt;
use tokio::sync::mpsc;

type Feed = mpsc::UnboundedSender<Result<Bytes, SourceError>>;

/// A hand-driven upstream.
///
/// Clones share state, so a test keeps one handle and gives the other
/// to the hub.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    shared: Arc<Shared>,
}

#[derive(Default)]
struct Shared {
    opened: AtomicUsize,
    closed: Arc<AtomicUsize>,
    peak_live: AtomicUsize,
    feed: Mutex<Option<Feed>>,
}

/// Bumps the close counter when the chunk stream is dropped.
struct CloseGuard(Arc<AtomicUsize>);

impl Drop for CloseGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl ScriptedSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Upstream sessions opened so far.
    #[must_use]
    pub fn opened(&self) -> usize {
        self.shared.opened.load(Ordering::SeqCst)
    }

    /// Chunk streams dropped so far, whether cancelled or finished.
    #[must_use]
    pub fn closed(&self) -> usize {
        self.shared.closed.load(Ordering::SeqCst)
    }

    /// The most chunk streams ever alive at the same moment.
    #[must_use]
    pub fn peak_live(&self) -> usize {
        self.shared.peak_live.load(Ordering::SeqCst)
    }

    /// Deliver a chunk on the current session. Ignored once it is gone.
    pub fn push(&self, chunk: impl Into<Bytes>) {
        self.send(Ok(chunk.into()));
    }

    /// Fail the current session.
    pub fn fail(&self, err: SourceError) {
        self.send(Err(err));
        self.complete();
    }

    /// End the current session normally.
    pub fn complete(&self) {
        self.lock_feed().take();
    }

    /// Wait until at least `n` sessions have been opened.
    ///
    /// # Panics
    ///
    /// Panics if that does not happen within one second.
    pub async fn wait_opened(&self, n: usize) {
        let waited = tokio::time::timeout(Duration::from_secs(1), async {
            while self.opened() < n {
                tokio::task::yield_now().await;
            }
        })
        .await;
        assert!(waited.is_ok(), "expected {n} opened sessions, saw {}", self.opened());
    }

    /// Wait until at least `n` chunk streams have been dropped.
    ///
    /// # Panics
    ///
    /// Panics if that does not happen within one second.
    pub async fn wait_closed(&self, n: usize) {
        let waited = tokio::time::timeout(Duration::from_secs(1), async {
            while self.closed() < n {
                tokio::task::yield_now().await;
            }
        })
        .await;
        assert!(waited.is_ok(), "expected {n} closed streams, saw {}", self.closed());
    }

    fn send(&self, item: Result<Bytes, SourceError>) {
        if let Some(feed) = self.lock_feed().as_ref() {
            let _ = feed.send(item);
        }
    }

    fn lock_feed(&self) -> std::sync::MutexGuard<'_, Option<Feed>> {
        self.shared
            .feed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ByteChunkSource for ScriptedSource {
    fn subscribe(&self) -> ChunkStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let opened = self.shared.opened.fetch_add(1, Ordering::SeqCst) + 1;
        let live = opened.saturating_sub(self.closed());
        self.shared.peak_live.fetch_max(live, Ordering::SeqCst);
        *self.lock_feed() = Some(tx);

        let guard = CloseGuard(Arc::clone(&self.shared.closed));
        futures::stream::unfold((rx, guard), |(mut rx, guard)| async move {
            let item = rx.recv().await?;
            Some((item, (rx, guard)))
        })
        .boxed()
    }
}

/// Serialize records as wire frames, one JSON object per CRLF line.
#[must_use]
pub fn wire(records: &[(&str, &str)]) -> Vec<u8> {
    let lines: Vec<String> = records
        .iter()
        .map(|(id, text)| serde_json::json!({ "id_str": id, "text": text }).to_string())
        .collect();
    firehose_wire::encode_frames(&lines)
}
