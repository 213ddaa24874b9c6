//! Integration tests for configuration snapshots.
//!
//! Each update is a full replacement: loggers not matched by the newest
//! snapshot fall back to INFO, whatever earlier snapshots or manual
//! `set_level` calls did.

use std::sync::{Arc, Mutex};

use logging::{ConfigBridge, ConfigError, FnSink, Level, LevelMasks, Record, Registry, resolve};

fn setup() -> (Arc<Registry>, ConfigBridge) {
    let registry = Arc::new(Registry::new());
    let bridge = ConfigBridge::new(Arc::clone(&registry));
    (registry, bridge)
}

// ============================================================================
// Replacement Semantics
// ============================================================================

/// Verifies a second snapshot reverts loggers the first one touched.
#[test]
fn second_snapshot_reverts_first() {
    let (registry, bridge) = setup();
    let ab = registry.lookup("a:b");
    let c = registry.lookup("c");

    bridge.update([("a:.*", Level::Debug)]).unwrap();
    assert_eq!(ab.level(), Level::Debug);
    assert_eq!(c.level(), Level::Info);

    bridge.update([("c", Level::Error)]).unwrap();
    assert_eq!(ab.level(), Level::Info);
    assert_eq!(c.level(), Level::Error);
}

/// Verifies manual thresholds do not survive the next update.
#[test]
fn manual_levels_are_overwritten() {
    let (registry, bridge) = setup();
    let logger = registry.lookup("manual");
    logger.set_level(Level::Trace);

    bridge.update([("other", Level::Debug)]).unwrap();

    assert_eq!(logger.level(), Level::Info);
}

/// Verifies the most verbose matching rule wins regardless of order.
#[test]
fn most_verbose_match_wins() {
    let (registry, bridge) = setup();
    let logger = registry.lookup("net:http:client");

    bridge
        .update([("net:http:client", Level::Debug), (".*", Level::Trace)])
        .unwrap();
    assert_eq!(logger.level(), Level::Trace);

    bridge
        .update([(".*", Level::Error), ("net:.*", Level::Warning)])
        .unwrap();
    assert_eq!(logger.level(), Level::Warning);
}

/// Verifies patterns must match the whole name.
#[test]
fn patterns_are_anchored() {
    let (registry, bridge) = setup();
    let exact = registry.lookup("db");
    let longer = registry.lookup("db:pool");

    bridge.update([("db", Level::Debug)]).unwrap();

    assert_eq!(exact.level(), Level::Debug);
    assert_eq!(longer.level(), Level::Info);
}

/// Verifies a NONE rule silences matching loggers.
#[test]
fn none_rule_silences() {
    let (registry, bridge) = setup();
    let journal = Arc::new(Mutex::new(Vec::new()));
    let sink_journal = Arc::clone(&journal);
    registry.root().add_sink(Arc::new(FnSink::new(move |record: &Record| {
        sink_journal.lock().unwrap().push(record.message().to_owned());
        Ok(())
    })));
    let noisy = registry.lookup("noisy");

    bridge.update([("noisy", Level::None)]).unwrap();
    logging::fatal!(noisy, "dropped");

    assert_eq!(noisy.level(), Level::None);
    assert!(journal.lock().unwrap().is_empty());
}

/// Verifies loggers created after an update pick up the active rules.
#[test]
fn later_loggers_follow_active_rules() {
    let (registry, bridge) = setup();
    bridge.update([("late:.*", Level::Verbose)]).unwrap();

    let late = registry.lookup("late:comer");
    let parent = registry.lookup("late");

    assert_eq!(late.level(), Level::Verbose);
    assert_eq!(parent.level(), Level::Info);
}

// ============================================================================
// Rejected Snapshots
// ============================================================================

/// Verifies a malformed snapshot leaves levels and rules untouched.
#[test]
fn malformed_snapshot_changes_nothing() {
    let (registry, bridge) = setup();
    let logger = registry.lookup("svc");
    bridge.update([("svc", Level::Debug)]).unwrap();

    let err = bridge.update([("(", Level::Trace)]).unwrap_err();

    match err {
        ConfigError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "("),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(logger.level(), Level::Debug);
    assert_eq!(bridge.current().level_for("svc"), Level::Debug);
}

// ============================================================================
// Masks
// ============================================================================

/// Verifies key/value masks drive the same replacement semantics.
#[test]
fn masks_replay() {
    let (registry, bridge) = setup();
    let client = registry.lookup("net:http:client");
    let server = registry.lookup("net:http:server");

    let first = LevelMasks::from_pairs([
        ("log.debugmask", "net:http:client"),
        ("log.warnmask", "net:.*"),
    ])
    .unwrap();
    bridge.update_masks(&first).unwrap();
    assert_eq!(client.level(), Level::Debug);
    assert_eq!(server.level(), Level::Warning);

    bridge.update_masks(&LevelMasks::default()).unwrap();
    assert_eq!(client.level(), Level::Info);
    assert_eq!(server.level(), Level::Info);
}

/// Verifies resolve previews an update without touching the registry.
#[test]
fn resolve_previews_levels() {
    let (registry, bridge) = setup();
    registry.lookup("a:b");
    let rules = LevelMasks::from_pairs([("log.tracemask", "a")])
        .unwrap()
        .to_rules()
        .unwrap();

    let names = registry.names();
    let preview = resolve(&rules, names.iter().map(String::as_str));

    assert_eq!(preview["a"], Level::Trace);
    assert_eq!(preview["a:b"], Level::Info);
    assert_eq!(preview[""], Level::Info);
    assert_eq!(registry.lookup("a").level(), Level::Info);
    assert!(bridge.current().is_empty());
}
