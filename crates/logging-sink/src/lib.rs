#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/logging-sink/src/lib.rs
//!
//! # Overview
//!
//! `logging-sink` provides concrete [`logging::Sink`] implementations for the
//! hierarchical logger registry: a text sink over any [`std::io::Write`]
//! implementor (stdout, stderr, append-mode files, in-memory buffers), an
//! in-memory record capture, and on unix a syslog(3) sink. [`SinkSettings`]
//! maps the `log.stdout`, `log.stderr`, `log.file` and `log.syslog`
//! configuration keys onto those sinks at the root logger.
//!
//! # Design
//!
//! Sinks are shared between threads behind `Arc<dyn Sink>` and serialize
//! their own deliveries. [`WriterSink`] renders each record into a reused
//! buffer and writes it with a single `write_all`, so concurrent lines never
//! interleave. [`LineMode`] decides whether each record ends with a newline
//! and [`Format`] decides which fields are rendered.
//!
//! # Errors
//!
//! Writer failures are returned from [`logging::Sink::accept`] as
//! [`logging::SinkError::Io`]; the logger counts them and carries on.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use logging::{Level, Registry};
//! use logging_sink::{MemorySink, WriterSink};
//!
//! let registry = Registry::new();
//! let memory = Arc::new(MemorySink::new());
//! registry.root().add_sink(memory.clone());
//! registry.lookup("app").add_sink(Arc::new(WriterSink::stderr()));
//!
//! logging::error!(registry.lookup("app:db"), "connection lost");
//! assert_eq!(memory.messages(), vec!["connection lost"]);
//! ```

mod config;
mod format;
mod line_mode;
mod memory;
#[cfg(unix)]
#[allow(unsafe_code)]
pub mod syslog;
mod writer;

pub use config::{SinkConfigError, SinkSettings};
pub use format::{Format, ROOT_DISPLAY_NAME};
pub use line_mode::LineMode;
pub use memory::MemorySink;
#[cfg(unix)]
pub use syslog::SyslogSink;
pub use writer::WriterSink;
