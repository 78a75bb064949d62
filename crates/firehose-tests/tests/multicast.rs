//! Multicast behaviour of [`MulticastHub`] over a hand-driven upstream.
//!
//! Each test pushes chunks into a [`ScriptedSource`] and observes what the
//! attached consumers receive, and how many upstream sessions were opened
//! and closed along the way.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use firehose_hub::{HubEvent, MulticastHub, SourceError, Subscription};
use firehose_tests::{ScriptedSource, wire};
use firehose_types::Record;

async fn next_record(sub: &mut Subscription) -> Record {
    match sub.next().await {
        Some(HubEvent::Record(record)) => record,
        other => panic!("expected a record, got {other:?}"),
    }
}

// ── Sharing ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn two_consumers_share_one_upstream() {
    let source = ScriptedSource::new();
    let hub = MulticastHub::new(source.clone());

    let mut a = hub.subscribe();
    let mut b = hub.subscribe();
    source.wait_opened(1).await;
    assert_eq!(source.opened(), 1);
    assert_eq!(hub.consumer_count(), 2);

    source.push(wire(&[("1", "A"), ("2", "B")]));

    for sub in [&mut a, &mut b] {
        assert_eq!(next_record(sub).await, Record::new("1", "A"));
        assert_eq!(next_record(sub).await, Record::new("2", "B"));
    }

    source.complete();
    assert!(matches!(a.next().await, Some(HubEvent::Complete)));
    assert!(matches!(b.next().await, Some(HubEvent::Complete)));
    assert!(a.next().await.is_none());
    assert_eq!(source.opened(), 1);
}

#[tokio::test]
async fn late_consumer_sees_only_later_records() {
    let source = ScriptedSource::new();
    let hub = MulticastHub::new(source.clone());

    let mut early = hub.subscribe();
    source.wait_opened(1).await;
    source.push(wire(&[("1", "first")]));
    assert_eq!(next_record(&mut early).await.id, "1");

    let mut late = hub.subscribe();
    source.push(wire(&[("2", "second")]));

    assert_eq!(next_record(&mut early).await.id, "2");
    assert_eq!(next_record(&mut late).await.id, "2");
    assert_eq!(source.opened(), 1);
}

// ── Detach and cancel ─────────────────────────────────────────────────────────

#[tokio::test]
async fn detaching_one_consumer_keeps_the_other_flowing() {
    let source = ScriptedSource::new();
    let hub = MulticastHub::new(source.clone());

    let mut a = hub.subscribe();
    let mut b = hub.subscribe();
    source.wait_opened(1).await;
    a.detach();
    a.detach();
    assert!(a.is_detached());

    source.push(wire(&[("1", "still here")]));
    assert_eq!(next_record(&mut b).await.text, "still here");
    assert!(a.next().await.is_none());
    assert!(hub.is_active());
    assert_eq!(source.closed(), 0);
}

#[tokio::test]
async fn last_detach_cancels_upstream() {
    let source = ScriptedSource::new();
    let hub = MulticastHub::new(source.clone());

    let a = hub.subscribe();
    let mut b = hub.subscribe();
    source.wait_opened(1).await;
    drop(a);
    b.detach();

    assert!(!hub.is_active());
    assert_eq!(hub.consumer_count(), 0);
    source.wait_closed(1).await;
}

#[tokio::test]
async fn resubscribe_after_cancel_opens_a_new_upstream() {
    let source = ScriptedSource::new();
    let hub = MulticastHub::new(source.clone());

    let mut first = hub.subscribe();
    source.wait_opened(1).await;
    first.detach();
    source.wait_closed(1).await;

    let mut second = hub.subscribe();
    source.wait_opened(2).await;

    source.push(wire(&[("9", "fresh")]));
    assert_eq!(next_record(&mut second).await, Record::new("9", "fresh"));
}

#[tokio::test]
async fn partial_frame_does_not_leak_into_the_next_session() {
    let source = ScriptedSource::new();
    let hub = MulticastHub::new(source.clone());

    let mut first = hub.subscribe();
    source.wait_opened(1).await;
    source.push(&b"{\"id_str\":\"1\",\"te"[..]);
    tokio::task::yield_now().await;
    first.detach();
    source.wait_closed(1).await;

    let mut second = hub.subscribe();
    source.wait_opened(2).await;
    source.push(wire(&[("2", "clean")]));
    assert_eq!(next_record(&mut second).await, Record::new("2", "clean"));
}

// ── Terminal events ───────────────────────────────────────────────────────────

#[tokio::test]
async fn decode_error_reaches_every_consumer_once() {
    let source = ScriptedSource::new();
    let hub = MulticastHub::new(source.clone());

    let mut a = hub.subscribe();
    let mut b = hub.subscribe();
    source.wait_opened(1).await;
    source.push(&b"{\"id_str\":\"1\",\"text\":\"ok\"}\r\n{\"text\":Example}\r\n{\"id_str\":\"3\",\"text\":\"late\"}\r\n"[..]);

    for sub in [&mut a, &mut b] {
        assert_eq!(next_record(sub).await.id, "1");
        match sub.next().await {
            Some(HubEvent::Error(err)) => assert!(err.is_decode()),
            other => panic!("expected decode error, got {other:?}"),
        }
        assert!(sub.next().await.is_none());
    }

    assert!(!hub.is_active());
    source.wait_closed(1).await;
}

#[tokio::test]
async fn upstream_error_is_broadcast_and_hub_reconnects() {
    let source = ScriptedSource::new();
    let hub = MulticastHub::new(source.clone());

    let mut a = hub.subscribe();
    let mut b = hub.subscribe();
    source.wait_opened(1).await;
    source.fail(SourceError::Status { status: 420 });

    for sub in [&mut a, &mut b] {
        match sub.next().await {
            Some(HubEvent::Error(err)) => {
                assert_eq!(err.status(), Some(420));
                assert_eq!(err.to_string(), "upstream failed: Received HTTP response status: 420");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    let mut again = hub.subscribe();
    source.wait_opened(2).await;
    source.push(wire(&[("5", "back")]));
    assert_eq!(next_record(&mut again).await.id, "5");
}

#[tokio::test]
async fn records_without_text_never_reach_consumers() {
    let source = ScriptedSource::new();
    let hub = MulticastHub::new(source.clone());

    let mut sub = hub.subscribe();
    source.wait_opened(1).await;
    source.push(&b"{\"id_str\":\"1\"}\r\n{\"id_str\":\"2\",\"text\":\"   \"}\r\n{\"id_str\":\"3\",\"text\":\"kept\"}\r\n"[..]);
    source.complete();

    assert_eq!(next_record(&mut sub).await.id, "3");
    assert!(matches!(sub.next().await, Some(HubEvent::Complete)));
}

// ── Concurrency ───────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn reconnect_never_overlaps_the_cancelled_upstream() {
    let source = ScriptedSource::new();
    let hub = MulticastHub::new(source.clone());

    for round in 1..=50 {
        let mut sub = hub.subscribe();
        source.wait_opened(round).await;
        sub.detach();
    }

    let _last = hub.subscribe();
    source.wait_opened(51).await;
    assert_eq!(source.peak_live(), 1);
    assert!(source.opened() - source.closed() <= 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_attach_and_detach_during_broadcast() {
    let source = ScriptedSource::new();
    let hub = MulticastHub::new(source.clone());

    // Keeps the upstream open while the others come and go.
    let mut anchor = hub.subscribe();
    source.wait_opened(1).await;

    let stop = Arc::new(AtomicBool::new(false));
    let producer = {
        let source = source.clone();
        let stop = Arc::clone(&stop);
        tokio::spawn(async move {
            let mut sent = 0usize;
            while !stop.load(Ordering::SeqCst) {
                let id = sent.to_string();
                source.push(wire(&[(id.as_str(), "tick")]));
                sent += 1;
                tokio::task::yield_now().await;
            }
            sent
        })
    };

    let consumers: Vec<_> = (0..16usize)
        .map(|n| {
            let hub = hub.clone();
            tokio::spawn(async move {
                let mut sub = hub.subscribe();
                let mut seen = Vec::new();
                while seen.len() < 10 + n * 5 {
                    let record = next_record(&mut sub).await;
                    seen.push(record.id.parse::<usize>().unwrap());
                }
                sub.detach();
                assert!(sub.next().await.is_none(), "event after detach");

                // A throwaway attach while the broadcast is still running.
                drop(hub.subscribe());
                seen
            })
        })
        .collect();

    for consumer in consumers {
        let seen = consumer.await.unwrap();
        assert!(
            seen.windows(2).all(|w| w[1] == w[0] + 1),
            "gap or reorder in {seen:?}"
        );
    }

    stop.store(true, Ordering::SeqCst);
    let sent = producer.await.unwrap();
    source.complete();

    let mut ids = Vec::new();
    loop {
        match anchor.next().await {
            Some(HubEvent::Record(record)) => ids.push(record.id.parse::<usize>().unwrap()),
            Some(HubEvent::Complete) => break,
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(ids, (0..sent).collect::<Vec<_>>());
    assert_eq!(source.opened(), 1);
}
