#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` is a hierarchical logging framework: a registry of named loggers
//! arranged in a tree, each with its own severity threshold and its own list
//! of sinks. A logger's name places it in the tree. Names are split on `:`
//! and `net:http:client` is a child of `net:http`, which is a child of `net`,
//! which is a child of the root (the empty name). Intermediate loggers are
//! created implicitly.
//!
//! # Design
//!
//! - [`Registry`] owns every [`Logger`]. Lookups of existing names only take
//!   a shard read lock; concurrent creation of one name converges on a single
//!   node. Loggers are never removed.
//! - [`Logger::log`] checks the logger's own threshold once. If the message
//!   passes, it is delivered to the logger's sinks, then to its parent's
//!   sinks, and so on up to the root. Ancestor thresholds are not consulted.
//! - [`Sink`] is the only contract a destination has to meet. Concrete sinks
//!   live in the `logging-sink` crate.
//! - [`ConfigBridge`] applies `(pattern, level)` snapshots from an external
//!   configuration source. Each snapshot replaces the previous one: every
//!   logger is set to the most verbose level among the rules it matches, or
//!   back to [`Level::Info`] when it matches none.
//!
//! # Invariants
//!
//! - Every registered logger's parent is registered.
//! - One node per name; looking a name up twice returns the same `Arc`.
//! - Suppressed messages do no formatting and touch no sink.
//! - A failing or panicking sink never stops delivery to the remaining sinks
//!   and never reaches the caller of `log`.
//!
//! # Errors
//!
//! Only configuration updates return errors ([`ConfigError`]). Sink failures
//! are counted per logger ([`Logger::delivery_failures`]) and, with the
//! `tracing` feature, reported as `tracing` warnings on `logging::delivery`.
//!
//! # Examples
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use logging::{ConfigBridge, FnSink, Level, Record, Registry};
//!
//! let registry = Arc::new(Registry::new());
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink_seen = Arc::clone(&seen);
//! registry.root().add_sink(Arc::new(FnSink::new(move |record: &Record| {
//!     sink_seen.lock().unwrap().push(record.message().to_owned());
//!     Ok(())
//! })));
//!
//! let client = registry.lookup("net:http:client");
//! logging::info!(client, "connected");
//! logging::debug!(client, "headers: {}", 12);
//!
//! ConfigBridge::new(Arc::clone(&registry)).update([("net:.*", Level::Debug)])?;
//! logging::debug!(client, "headers: {}", 14);
//!
//! assert_eq!(*seen.lock().unwrap(), vec!["connected", "headers: 14"]);
//! # Ok::<(), logging::ConfigError>(())
//! ```

mod config;
mod level;
mod logger;
mod macros;
mod name;
mod record;
mod registry;
mod rules;
mod sink;
#[cfg(feature = "tracing")]
mod tracing_bridge;

use std::sync::Arc;

pub use config::{ConfigBridge, ConfigError, LevelMasks, UpdateCallback};
pub use level::{Level, ParseLevelError};
pub use logger::Logger;
pub use record::{Location, Record};
pub use registry::{Registry, SEPARATOR, parent_name};
pub use rules::{DEFAULT_LEVEL, LevelRule, LevelRules, resolve};
pub use sink::{FnSink, Sink, SinkError};
#[cfg(feature = "tracing")]
pub use tracing_bridge::{HierarchyLayer, init_tracing};

/// Finds or creates the logger called `name` in the global registry.
pub fn lookup(name: &str) -> Arc<Logger> {
    Registry::global().lookup(name)
}

/// The root logger of the global registry.
pub fn root() -> Arc<Logger> {
    Registry::global().root()
}

/// Calls `f` for every logger in the global registry.
pub fn visit<F>(f: F)
where
    F: FnMut(&Arc<Logger>),
{
    Registry::global().visit(f);
}
