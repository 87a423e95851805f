use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fanhub::{
    Event, EventKind, Hub, HubConfig, HubError, HubHandle, Message, Observe, Payload, RenderError,
    RenderFn, SubscriberStream,
};
use tokio::sync::Mutex;
use tokio::sync::broadcast::Receiver;

fn spawn_hub(cfg: HubConfig) -> (HubHandle, tokio::task::JoinHandle<()>) {
    Hub::builder(cfg).build().spawn()
}

fn small_queues(capacity: usize) -> HubConfig {
    HubConfig {
        subscriber_queue_capacity: capacity,
        ..HubConfig::default()
    }
}

fn text(p: Payload) -> String {
    p.as_str().unwrap().to_string()
}

async fn take(stream: &mut SubscriberStream, n: usize) -> Vec<String> {
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        let p = tokio::time::timeout(Duration::from_secs(2), stream.recv())
            .await
            .expect("payload within timeout")
            .expect("stream still open");
        out.push(text(p));
    }
    out
}

/// Waits for the first event of `kind`.
async fn wait_for(rx: &mut Receiver<Arc<Event>>, kind: EventKind) -> Arc<Event> {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let ev = rx.recv().await.expect("bus open");
            if ev.kind == kind {
                return ev;
            }
        }
    })
    .await
    .expect("event within timeout")
}

#[tokio::test]
async fn scenario_hello_world_again() {
    let (hub, task) = spawn_hub(HubConfig::default());

    hub.publish("A", "hello").await.unwrap();
    hub.publish("B", "world").await.unwrap();

    let mut c = hub.connect_as("C").await.unwrap();
    assert_eq!(take(&mut c, 2).await, vec!["A: hello", "B: world"]);
    assert!(c.try_recv().is_none());

    hub.publish("A", "again").await.unwrap();
    assert_eq!(take(&mut c, 1).await, vec!["A: again"]);

    let mut d = hub.connect_as("D").await.unwrap();
    assert_eq!(
        take(&mut d, 3).await,
        vec!["A: hello", "B: world", "A: again"]
    );

    let history = hub.history().await.unwrap();
    let texts: Vec<&str> = history.iter().map(|m| m.text()).collect();
    assert_eq!(texts, vec!["hello", "world", "again"]);

    hub.shutdown();
    task.await.unwrap();
}

#[tokio::test]
async fn history_completeness_for_late_joiner() {
    let (hub, task) = spawn_hub(small_queues(1));

    for i in 0..50 {
        hub.publish("p", &format!("m{i}")).await.unwrap();
    }
    // connect sizes the queue for history even with a tiny live capacity
    let mut late = hub.connect().await.unwrap();
    let got = take(&mut late, 50).await;
    let want: Vec<String> = (0..50).map(|i| format!("p: m{i}")).collect();
    assert_eq!(got, want);

    hub.shutdown();
    task.await.unwrap();
}

#[tokio::test]
async fn live_subscribers_see_global_order() {
    let (hub, task) = spawn_hub(small_queues(64));

    let mut a = hub.connect().await.unwrap();
    let mut b = hub.connect().await.unwrap();
    for i in 0..20 {
        hub.publish("p", &i.to_string()).await.unwrap();
    }

    let want: Vec<String> = (0..20).map(|i| format!("p: {i}")).collect();
    assert_eq!(take(&mut a, 20).await, want);
    assert_eq!(take(&mut b, 20).await, want);

    hub.shutdown();
    task.await.unwrap();
}

#[tokio::test]
async fn overflow_evicts_and_later_broadcasts_do_not_block() {
    const K: usize = 3;
    let (hub, task) = spawn_hub(small_queues(K));
    let mut events = hub.events();

    let (handle, mut stuck) = hub.subscriber("stuck");
    hub.register(handle).await.unwrap();
    let mut healthy = hub.connect_as("healthy").await.unwrap();

    // healthy drains after every broadcast, stuck never does
    for i in 0..=K {
        hub.publish("p", &i.to_string()).await.unwrap();
        assert_eq!(take(&mut healthy, 1).await, vec![format!("p: {i}")]);
    }
    let evicted = wait_for(&mut events, EventKind::SubscriberEvicted).await;
    assert_eq!(evicted.subscriber.as_deref(), Some("stuck"));
    assert_eq!(evicted.reason.as_deref(), Some("full"));

    for i in 0..10 {
        tokio::time::timeout(Duration::from_secs(1), hub.publish("p", &format!("late{i}")))
            .await
            .expect("broadcast never blocks on an evicted subscriber")
            .unwrap();
        assert_eq!(take(&mut healthy, 1).await.len(), 1);
    }

    let ids = hub.subscribers().await.unwrap();
    assert_eq!(ids.len(), 1);
    assert_eq!(ids[0].as_str(), "healthy");

    // the evicted stream still drains what was buffered, then ends
    assert_eq!(take(&mut stuck, K).await.len(), K);
    assert!(stuck.recv().await.is_none());

    hub.shutdown();
    task.await.unwrap();
}

#[tokio::test]
async fn connect_as_taken_id_returns_ended_stream() {
    let (hub, task) = spawn_hub(HubConfig::default());
    let mut events = hub.events();
    hub.publish("A", "hello").await.unwrap();

    let mut first = hub.connect_as("C").await.unwrap();
    let mut second = hub.connect_as("C").await.unwrap();
    assert!(second.recv().await.is_none());

    let dup = wait_for(&mut events, EventKind::DuplicateRegister).await;
    assert_eq!(dup.subscriber.as_deref(), Some("C"));

    hub.publish("B", "world").await.unwrap();
    assert_eq!(take(&mut first, 2).await, vec!["A: hello", "B: world"]);
    assert_eq!(hub.subscribers().await.unwrap().len(), 1);

    hub.shutdown();
    task.await.unwrap();
}

#[tokio::test]
async fn oversized_queue_capacity_does_not_stop_the_loop() {
    let (hub, task) = spawn_hub(small_queues(usize::MAX));
    hub.publish("A", "hello").await.unwrap();

    let mut c = hub.connect_as("C").await.unwrap();
    hub.publish("B", "world").await.unwrap();
    assert_eq!(take(&mut c, 2).await, vec!["A: hello", "B: world"]);
    assert!(!task.is_finished());

    hub.shutdown();
    task.await.unwrap();
}

#[tokio::test]
async fn unregister_twice_is_a_noop() {
    let (hub, task) = spawn_hub(HubConfig::default());
    let mut events = hub.events();

    let mut c = hub.connect_as("C").await.unwrap();
    let id = c.id().clone();
    hub.unregister(&id).await.unwrap();
    hub.unregister(&id).await.unwrap();
    assert!(c.recv().await.is_none());

    // a query after both intents proves both were processed
    assert!(hub.subscribers().await.unwrap().is_empty());

    let mut disconnects = 0;
    while let Ok(ev) = events.try_recv() {
        if ev.kind == EventKind::SubscriberDisconnected {
            disconnects += 1;
        }
    }
    assert_eq!(disconnects, 1);

    hub.shutdown();
    task.await.unwrap();
}

#[tokio::test]
async fn render_failure_is_isolated_to_the_live_attempt() {
    let broken = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&broken);
    let renderer = RenderFn::arc("flaky", move |m: &Message| {
        if m.text() == "world" && flag.load(Ordering::SeqCst) {
            Err(RenderError::failed("template unavailable"))
        } else {
            Ok(Payload::from(m.text()))
        }
    });
    let (hub, task) = Hub::builder(HubConfig::default())
        .with_renderer(renderer)
        .build()
        .spawn();
    let mut events = hub.events();

    let mut c = hub.connect_as("C").await.unwrap();
    hub.publish("A", "hello").await.unwrap();
    hub.publish("B", "world").await.unwrap();
    hub.publish("A", "again").await.unwrap();
    assert_eq!(take(&mut c, 2).await, vec!["hello", "again"]);

    let failed = wait_for(&mut events, EventKind::RenderFailed).await;
    assert_eq!(failed.origin.as_deref(), Some("B"));
    assert_eq!(failed.index, Some(1));

    broken.store(false, Ordering::SeqCst);
    let mut d = hub.connect_as("D").await.unwrap();
    assert_eq!(take(&mut d, 3).await, vec!["hello", "world", "again"]);
    assert!(c.try_recv().is_none());

    hub.shutdown();
    task.await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_producers_and_joiners_never_duplicate() {
    let (hub, task) = spawn_hub(small_queues(4096));

    let mut early = hub.connect().await.unwrap();

    let mut producers = Vec::new();
    for p in 0..4 {
        let hub = hub.clone();
        producers.push(tokio::spawn(async move {
            for i in 0..50 {
                hub.publish(&format!("p{p}"), &i.to_string()).await.unwrap();
            }
        }));
    }
    let joiner = {
        let hub = hub.clone();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            hub.connect().await.unwrap()
        })
    };

    for p in producers {
        p.await.unwrap();
    }
    let mut mid = joiner.await.unwrap();

    let early_seen = take(&mut early, 200).await;
    let mid_seen = take(&mut mid, 200).await;
    assert_eq!(early_seen, mid_seen, "replay + live equals the global order");

    let mut unique = early_seen.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 200);

    let history: Vec<String> = hub
        .history()
        .await
        .unwrap()
        .iter()
        .map(|m| m.to_string())
        .collect();
    assert_eq!(history, early_seen);

    hub.shutdown();
    task.await.unwrap();
}

#[tokio::test]
async fn dropping_every_handle_stops_the_loop() {
    let hub = Hub::builder(HubConfig::default()).build();
    let handle = hub.handle();
    let task = tokio::spawn(hub.run());

    let mut c = handle.connect().await.unwrap();
    drop(handle);

    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("loop exits")
        .unwrap();
    assert!(c.recv().await.is_none());
}

#[tokio::test]
async fn intents_after_shutdown_report_closed() {
    let (hub, task) = spawn_hub(HubConfig::default());
    let mut events = hub.events();
    let mut c = hub.connect().await.unwrap();

    hub.shutdown();
    task.await.unwrap();

    let stopped = wait_for(&mut events, EventKind::HubStopped).await;
    assert_eq!(stopped.count, Some(1));
    assert!(hub.is_closed());
    assert!(c.recv().await.is_none());
    assert_eq!(hub.publish("A", "late").await, Err(HubError::Closed));
    assert_eq!(hub.try_broadcast(Message::new("A", "late")), Err(HubError::Closed));
    assert!(matches!(hub.connect().await, Err(HubError::Closed)));
}

#[tokio::test]
async fn try_broadcast_reports_busy_when_loop_is_saturated() {
    let cfg = HubConfig {
        intent_capacity: 1,
        ..HubConfig::default()
    };
    // not running: nothing drains the intent queue
    let hub = Hub::builder(cfg).build();
    let handle = hub.handle();

    handle.try_broadcast(Message::new("A", "1")).unwrap();
    assert_eq!(
        handle.try_broadcast(Message::new("A", "2")),
        Err(HubError::Busy)
    );

    let task = tokio::spawn(hub.run());
    handle.publish("A", "3").await.unwrap();
    let texts: Vec<String> = handle
        .history()
        .await
        .unwrap()
        .iter()
        .map(|m| m.text().to_string())
        .collect();
    assert_eq!(texts, vec!["1", "3"]);

    handle.shutdown();
    task.await.unwrap();
}

#[derive(Default)]
struct Recorder {
    kinds: Mutex<Vec<EventKind>>,
}

#[async_trait]
impl Observe for Recorder {
    async fn on_event(&self, event: &Event) {
        self.kinds.lock().await.push(event.kind);
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

#[tokio::test]
async fn observers_receive_lifecycle_events() {
    let rec = Arc::new(Recorder::default());
    let observers: Vec<Arc<dyn Observe>> = vec![rec.clone()];
    let (hub, task) = Hub::builder(HubConfig::default())
        .with_observers(observers)
        .build()
        .spawn();

    let c = hub.connect_as("C").await.unwrap();
    hub.publish("A", "hi").await.unwrap();
    hub.unregister(c.id()).await.unwrap();
    // shutdown wins over queued intents; make sure they were applied first
    assert!(hub.subscribers().await.unwrap().is_empty());
    hub.shutdown();
    task.await.unwrap();

    let kinds = rec.kinds.lock().await.clone();
    assert_eq!(
        kinds,
        vec![
            EventKind::HubStarted,
            EventKind::SubscriberConnected,
            EventKind::MessageBroadcast,
            EventKind::SubscriberDisconnected,
            EventKind::HubStopped,
        ]
    );
}

#[cfg(feature = "logging")]
#[tokio::test]
async fn log_writer_runs_alongside_the_hub() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let (hub, task) = Hub::builder(HubConfig::default())
        .with_logging()
        .build()
        .spawn();
    let mut c = hub.connect().await.unwrap();
    hub.publish("A", "logged").await.unwrap();
    assert_eq!(take(&mut c, 1).await, vec!["A: logged"]);

    hub.shutdown();
    task.await.unwrap();
}
