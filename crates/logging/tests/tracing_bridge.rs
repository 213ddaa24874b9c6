//! Integration tests for routing `tracing` events into the logger tree.
//!
//! Each test installs a scoped subscriber with `with_default`, so tests do not
//! compete for the global dispatcher.

use std::sync::{Arc, Mutex};

use logging::{FnSink, HierarchyLayer, Level, Record, Registry};
use tracing_subscriber::layer::SubscriberExt;

type Journal = Arc<Mutex<Vec<(String, Level, String)>>>;

fn capture(registry: &Registry, name: &str) -> Journal {
    let journal: Journal = Arc::default();
    let sink_journal = Arc::clone(&journal);
    registry
        .lookup(name)
        .add_sink(Arc::new(FnSink::new(move |record: &Record| {
            sink_journal.lock().unwrap().push((
                record.logger().to_owned(),
                record.level(),
                record.message().to_owned(),
            ));
            Ok(())
        })));
    journal
}

fn with_layer(registry: &Arc<Registry>, f: impl FnOnce()) {
    let subscriber = tracing_subscriber::registry().with(HierarchyLayer::new(Arc::clone(registry)));
    tracing::subscriber::with_default(subscriber, f);
}

/// Verifies module-path targets land on the matching logger and fan out.
#[test]
fn events_reach_logger_named_after_target() {
    let registry = Arc::new(Registry::new());
    let journal = capture(&registry, "app");

    with_layer(&registry, || {
        tracing::warn!(target: "app::net::http", "slow peer {}", 7);
    });

    assert_eq!(
        *journal.lock().unwrap(),
        vec![("app:net:http".to_owned(), Level::Warning, "slow peer 7".to_owned())]
    );
    assert!(registry.contains("app:net"));
}

/// Verifies the target logger's threshold filters bridged events.
#[test]
fn bridged_events_respect_thresholds() {
    let registry = Arc::new(Registry::new());
    let journal = capture(&registry, "");

    with_layer(&registry, || {
        tracing::debug!(target: "svc", "hidden");
        tracing::info!(target: "svc", "shown");
    });
    registry.lookup("svc").set_level(Level::Trace);
    with_layer(&registry, || {
        tracing::trace!(target: "svc", "now shown");
    });

    let messages: Vec<String> = journal
        .lock()
        .unwrap()
        .iter()
        .map(|(_, _, message)| message.clone())
        .collect();
    assert_eq!(messages, vec!["shown", "now shown"]);
}

/// Verifies the crate's own diagnostics are not fed back into the tree.
#[test]
fn own_diagnostics_are_not_bridged() {
    let registry = Arc::new(Registry::new());
    let journal = capture(&registry, "");

    with_layer(&registry, || {
        tracing::warn!(target: "logging::delivery", "sink failed");
    });

    assert!(journal.lock().unwrap().is_empty());
    assert!(!registry.contains("logging"));
}
