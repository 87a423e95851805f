//! # Demo: chat
//!
//! A scripted chat room on top of the hub:
//! - two well-behaved clients print everything they receive,
//! - a third client never reads and gets evicted once its queue fills,
//! - a late joiner receives the full history first.
//!
//! Payloads are HTML fragments rendered with [`Template`].
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example chat
//! ```

use std::{sync::Arc, time::Duration};

use fanhub::{Hub, HubConfig, HubHandle, SubscriberStream, Template};
use tracing_subscriber::EnvFilter;

const MESSAGE_TEMPLATE: &str =
    r#"<div id="messages" hx-swap-oob="beforeend"><p><b>{{origin_id}}</b>: {{text}}</p></div>"#;

fn reader(name: &'static str, mut stream: SubscriberStream) -> tokio::task::JoinHandle<usize> {
    tokio::spawn(async move {
        let mut n = 0;
        while let Some(payload) = stream.recv().await {
            n += 1;
            println!("[{name}] {}", payload.as_str().unwrap_or("<binary>"));
        }
        println!("[{name}] stream closed after {n} payloads");
        n
    })
}

async fn say(hub: &HubHandle, who: &str, text: &str) -> Result<(), fanhub::HubError> {
    hub.publish(who, text).await?;
    tokio::time::sleep(Duration::from_millis(20)).await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cfg = HubConfig {
        subscriber_queue_capacity: 4,
        ..HubConfig::default()
    };
    let renderer = Arc::new(Template::new(MESSAGE_TEMPLATE)?.with_html_escape());
    let hub = Hub::builder(cfg)
        .with_renderer(renderer)
        .with_logging()
        .build();
    let handle = hub.handle();
    let hub_task = tokio::spawn(hub.run_until_shutdown());

    let alice = reader("alice", handle.connect_as("alice").await?);
    let bob = reader("bob", handle.connect_as("bob").await?);
    // never drained: evicted after the 5th live message
    let _lurker = handle.connect_as("lurker").await?;

    for (who, text) in [
        ("alice", "hi all"),
        ("bob", "hey alice"),
        ("alice", "<script>alert(1)</script>"),
        ("system", "lurker is not reading"),
        ("bob", "bye lurker"),
        ("alice", "anyone else?"),
    ] {
        say(&handle, who, text).await?;
    }

    let carol = reader("carol", handle.connect_as("carol").await?);
    say(&handle, "carol", "just joined, saw everything").await?;

    println!("connected: {:?}", handle.subscribers().await?);
    println!("history: {} messages", handle.history().await?.len());

    handle.shutdown();
    hub_task.await?;
    for r in [alice, bob, carol] {
        r.await?;
    }
    Ok(())
}
