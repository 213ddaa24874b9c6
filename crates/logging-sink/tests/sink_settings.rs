//! Integration tests for the root sink configuration keys.
//!
//! Each key is switched on and off through a [`ConfigBridge`] and checked
//! against what actually reaches the root, with hand-attached sinks present.

use std::fs;
use std::sync::Arc;

use logging::{ConfigBridge, Registry};
use logging_sink::{MemorySink, SinkConfigError, SinkSettings};
use tempfile::tempdir;

fn bridge_with_manual_sink() -> (ConfigBridge, Arc<MemorySink>) {
    let bridge = ConfigBridge::new(Arc::new(Registry::new()));
    let manual = Arc::new(MemorySink::new());
    bridge.registry().root().add_sink(manual.clone());
    (bridge, manual)
}

// ============================================================================
// File Key
// ============================================================================

/// Verifies `log.file` appends records and stops once cleared.
#[test]
fn file_key_routes_root_records_to_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("root.log");
    let (bridge, manual) = bridge_with_manual_sink();
    let app = bridge.registry().lookup("app:db");

    let mut settings = SinkSettings::default();
    settings.set("log.file", path.to_str().unwrap()).unwrap();
    settings.apply(&bridge).unwrap();
    logging::warning!(app, "written");

    settings.set("log.file", "").unwrap();
    settings.apply(&bridge).unwrap();
    logging::warning!(app, "not written");

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert!(text.ends_with(" WARNING app:db: written\n"));
    assert_eq!(manual.messages(), vec!["written", "not written"]);
    assert!(bridge.root_sink_keys().is_empty());
}

/// Verifies pointing `log.file` elsewhere moves output to the new file.
#[test]
fn file_key_switches_files() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("first.log");
    let second = dir.path().join("second.log");
    let (bridge, _manual) = bridge_with_manual_sink();
    let app = bridge.registry().lookup("app");

    SinkSettings::from_pairs([("log.file", first.to_str().unwrap())])
        .unwrap()
        .apply(&bridge)
        .unwrap();
    logging::info!(app, "one");
    SinkSettings::from_pairs([("log.file", second.to_str().unwrap())])
        .unwrap()
        .apply(&bridge)
        .unwrap();
    logging::info!(app, "two");

    assert!(fs::read_to_string(&first).unwrap().ends_with("app: one\n"));
    assert!(fs::read_to_string(&second).unwrap().ends_with("app: two\n"));
    assert_eq!(bridge.registry().root().sinks().len(), 2);
}

/// Verifies a file that cannot be opened is reported with its path.
#[test]
fn unopenable_file_is_reported() {
    let dir = tempdir().unwrap();
    let (bridge, _manual) = bridge_with_manual_sink();
    let missing = dir.path().join("missing").join("app.log");

    let err = SinkSettings::from_pairs([("log.file", missing.to_str().unwrap())])
        .unwrap()
        .apply(&bridge)
        .unwrap_err();

    assert!(matches!(err, SinkConfigError::File { .. }));
    assert!(err.to_string().contains("missing"));
    assert_eq!(bridge.registry().root().sinks().len(), 1);
}

// ============================================================================
// Console Keys
// ============================================================================

/// Verifies `log.stdout` and `log.stderr` each own exactly one root sink.
#[test]
fn console_keys_toggle_their_own_sinks() {
    let (bridge, _manual) = bridge_with_manual_sink();

    for key in ["log.stdout", "log.stderr"] {
        let mut settings = SinkSettings::default();
        settings.set(key, "on").unwrap();
        settings.apply(&bridge).unwrap();
        settings.apply(&bridge).unwrap();
        assert_eq!(bridge.root_sink_keys(), vec![key]);
        assert_eq!(bridge.registry().root().sinks().len(), 2);

        settings.set(key, "off").unwrap();
        settings.apply(&bridge).unwrap();
        assert!(bridge.root_sink_keys().is_empty());
        assert_eq!(bridge.registry().root().sinks().len(), 1);
    }
}

// ============================================================================
// Syslog Key
// ============================================================================

/// Verifies `log.syslog` opens one shared connection and releases it when cleared.
#[cfg(unix)]
#[test]
fn syslog_key_holds_connection_while_enabled() {
    use logging_sink::syslog::live_sinks;

    let (bridge, manual) = bridge_with_manual_sink();
    let app = bridge.registry().lookup("app");

    let mut settings = SinkSettings::default();
    settings.set("log.syslog", "local7/logtree-test").unwrap();
    settings.apply(&bridge).unwrap();
    assert_eq!(bridge.root_sink_keys(), vec!["log.syslog"]);
    assert_eq!(live_sinks(), 1);
    logging::info!(app, "to syslog");

    settings.set("log.syslog", "local6/logtree-other").unwrap();
    settings.apply(&bridge).unwrap();
    assert_eq!(live_sinks(), 1);

    settings.set("log.syslog", "off").unwrap();
    settings.apply(&bridge).unwrap();
    assert!(bridge.root_sink_keys().is_empty());
    assert_eq!(live_sinks(), 0);
    assert_eq!(manual.messages(), vec!["to syslog"]);
    assert_eq!(app.delivery_failures(), 0);
}
