use std::collections::BTreeMap;
use std::mem;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use firehose_decoder::FramePipeline;
use futures::{Stream, StreamExt};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard, mpsc};
use tokio::task::AbortHandle;

use crate::event::HubEvent;
use crate::source::{ByteChunkSource, ChunkStream, SourceEvent};

/// Shares one upstream subscription among any number of consumers.
///
/// The hub connects on demand and disconnects when nobody is listening:
///
/// ```text
///            first subscribe()                 last detach()  /  terminal event
///   ┌──────┐ ─────────────────▶ ┌────────────┐ ───────────────────────────────▶ ┌──────┐
///   │ Idle │                    │   Active   │                                  │ Idle │
///   └──────┘                    │ 1 upstream │                                  └──────┘
///                               │ N ≥ 1 cons │
///                               └────────────┘
/// ```
///
/// - **Idle → Active**: the first [`subscribe`](Self::subscribe) spawns
///   the task that opens exactly one upstream subscription and drives
///   the [`FramePipeline`] over it. The task first waits until the
///   previous session's chunk stream has been dropped, so two upstream
///   connections never overlap.
/// - **Active**: every record, error, or completion is broadcast to the
///   consumers attached at that moment. Late consumers see only what
///   happens after they attach; nothing is replayed.
/// - **Active → Idle** (last detach): the upstream task is aborted, which
///   drops the chunk stream and closes the connection. Detaching never
///   waits for the teardown.
/// - **Active → Idle** (terminal event): the error or completion reaches
///   every consumer, the registry is cleared, and the next subscribe
///   starts over with a fresh connection and fresh pipeline state.
///
/// Broadcasts run under the registry lock into per-consumer unbounded
/// channels, so each event reaches a consistent snapshot of consumers and
/// never blocks on a slow one. A consumer whose detach has returned
/// receives nothing further.
///
/// # Example
///
/// ```rust,no_run
/// use firehose_hub::{ByteChunkSource, HubEvent, MulticastHub};
///
/// async fn tail(source: impl ByteChunkSource) {
///     let hub = MulticastHub::new(source);
///     let mut subscription = hub.subscribe();
///     while let Some(event) = subscription.next().await {
///         match event {
///             HubEvent::Record(record) => println!("{record}"),
///             HubEvent::Error(e) => eprintln!("stream failed: {e}"),
///             HubEvent::Complete => break,
///         }
///     }
/// }
/// ```
#[derive(Clone)]
pub struct MulticastHub {
    inner: Arc<Inner>,
}

struct Inner {
    source: Arc<dyn ByteChunkSource>,
    registry: Mutex<Registry>,
    /// Held by whichever session's chunk stream is open.
    upstream: Arc<AsyncMutex<()>>,
}

#[derive(Default)]
struct Registry {
    phase: Phase,
    consumers: BTreeMap<u64, mpsc::UnboundedSender<HubEvent>>,
    next_consumer: u64,
    next_session: u64,
}

#[derive(Default)]
enum Phase {
    #[default]
    Idle,
    Active(Session),
}

struct Session {
    id: u64,
    task: AbortHandle,
}

impl MulticastHub {
    pub fn new(source: impl ByteChunkSource) -> Self {
        Self::from_arc(Arc::new(source))
    }

    #[must_use]
    pub fn from_arc(source: Arc<dyn ByteChunkSource>) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                registry: Mutex::new(Registry::default()),
                upstream: Arc::new(AsyncMutex::new(())),
            }),
        }
    }

    /// Attach a consumer.
    ///
    /// The first consumer of an idle hub opens the upstream subscription.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime while the hub is idle,
    /// since connecting spawns the upstream task.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut registry = self.inner.lock();

        if matches!(registry.phase, Phase::Idle) {
            // Spawn before touching the registry so a panic here leaves
            // no consumer behind.
            let session = registry.next_session + 1;
            let task = tokio::spawn(pump(Arc::clone(&self.inner), session));

            registry.next_session = session;
            registry.phase = Phase::Active(Session {
                id: session,
                task: task.abort_handle(),
            });
            tracing::info!(session, "first consumer attached, connecting upstream");
        }

        let id = registry.next_consumer;
        registry.next_consumer += 1;
        registry.consumers.insert(id, tx);

        tracing::debug!(
            consumer = id,
            consumers = registry.consumers.len(),
            "consumer attached"
        );
        drop(registry);

        Subscription {
            hub: Arc::clone(&self.inner),
            id,
            rx: Some(rx),
        }
    }

    /// Number of currently attached consumers.
    #[must_use]
    pub fn consumer_count(&self) -> usize {
        self.inner.lock().consumers.len()
    }

    /// `true` while an upstream subscription is open.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.inner.lock().phase, Phase::Active(_))
    }
}

impl Inner {
    fn is_current(&self, session: u64) -> bool {
        matches!(&self.lock().phase, Phase::Active(s) if s.id == session)
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn detach(&self, consumer: u64) {
        let cancelled = {
            let mut registry = self.lock();
            if registry.consumers.remove(&consumer).is_none() {
                return;
            }
            tracing::debug!(
                consumer,
                consumers = registry.consumers.len(),
                "consumer detached"
            );

            if registry.consumers.is_empty() {
                match mem::take(&mut registry.phase) {
                    Phase::Active(session) => Some(session),
                    Phase::Idle => None,
                }
            } else {
                None
            }
        };

        if let Some(session) = cancelled {
            session.task.abort();
            tracing::info!(
                session = session.id,
                "last consumer detached, upstream cancelled"
            );
        }
    }

    /// Broadcast the events of one upstream step.
    ///
    /// Returns `false` when the session must stop pumping: it was
    /// superseded or cancelled, it hit a terminal event, or every
    /// consumer went away.
    fn dispatch(&self, session: u64, events: Vec<HubEvent>) -> bool {
        let mut registry = self.lock();
        if !matches!(&registry.phase, Phase::Active(s) if s.id == session) {
            return false;
        }

        for event in events {
            let terminal = event.is_terminal();
            registry
                .consumers
                .retain(|_, tx| tx.send(event.clone()).is_ok());

            if terminal {
                registry.consumers.clear();
                registry.phase = Phase::Idle;
                match &event {
                    HubEvent::Error(err) => {
                        tracing::warn!(session, error = %err, "upstream failed, hub idle");
                    }
                    _ => tracing::info!(session, "upstream completed, hub idle"),
                }
                return false;
            }
        }

        if registry.consumers.is_empty() {
            registry.phase = Phase::Idle;
            return false;
        }

        true
    }
}

/// An open upstream subscription.
///
/// Fields drop in order, so the chunk stream is gone before the permit
/// lets the next session connect.
struct Upstream {
    chunks: ChunkStream,
    _permit: OwnedMutexGuard<()>,
}

/// Drive one upstream subscription until it ends or is cancelled.
async fn pump(inner: Arc<Inner>, session: u64) {
    let permit = Arc::clone(&inner.upstream).lock_owned().await;
    if !inner.is_current(session) {
        return;
    }

    let mut upstream = Upstream {
        chunks: inner.source.subscribe(),
        _permit: permit,
    };
    let mut pipeline = FramePipeline::new();

    loop {
        let events = match SourceEvent::from(upstream.chunks.next().await) {
            SourceEvent::Chunk(chunk) => pipeline
                .push(&chunk)
                .into_iter()
                .map(|item| match item {
                    Ok(record) => HubEvent::Record(record),
                    Err(err) => HubEvent::Error(err.into()),
                })
                .collect(),
            SourceEvent::Error(err) => {
                pipeline.finish();
                vec![HubEvent::Error(err.into())]
            }
            SourceEvent::Complete => {
                pipeline.finish();
                vec![HubEvent::Complete]
            }
        };

        if !inner.dispatch(session, events) {
            break;
        }
    }

    let stats = pipeline.stats();
    tracing::debug!(
        session,
        chunks = stats.chunks,
        bytes = stats.bytes,
        frames = stats.frames,
        records = stats.records,
        dropped = stats.dropped,
        "upstream session ended"
    );
}

/// One consumer's attachment to a [`MulticastHub`].
///
/// Events arrive through [`next`](Self::next) or the [`Stream`] impl.
/// After a terminal event the subscription is already detached from the
/// hub and yields `None`. Dropping the subscription detaches it.
pub struct Subscription {
    hub: Arc<Inner>,
    id: u64,
    rx: Option<mpsc::UnboundedReceiver<HubEvent>>,
}

impl Subscription {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the stream is over or the subscription has
    /// been detached.
    pub async fn next(&mut self) -> Option<HubEvent> {
        self.rx.as_mut()?.recv().await
    }

    /// Detach from the hub. Idempotent.
    ///
    /// If this was the last consumer, the upstream subscription is
    /// cancelled. Nothing is received after this returns.
    pub fn detach(&mut self) {
        if let Some(mut rx) = self.rx.take() {
            self.hub.detach(self.id);
            rx.close();
        }
    }

    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.rx.is_none()
    }
}

impl Stream for Subscription {
    type Item = HubEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.get_mut().rx.as_mut() {
            Some(rx) => rx.poll_recv(cx),
            None => Poll::Ready(None),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}
