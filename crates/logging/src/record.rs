//! crates/logging/src/record.rs
//! The unit of delivery handed to every sink.

use std::thread::{self, ThreadId};
use std::time::SystemTime;

use crate::level::Level;

/// Source location captured by the logging macros.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Location {
    /// Source file, as reported by `file!()`.
    pub file: &'static str,
    /// Line number, as reported by `line!()`.
    pub line: u32,
}

/// A single log message that passed its logger's threshold.
///
/// Records are only built once the originating logger has decided to emit,
/// so constructing one never happens for suppressed messages.
#[derive(Clone, Debug)]
pub struct Record {
    level: Level,
    logger: String,
    message: String,
    timestamp: SystemTime,
    thread: ThreadId,
    location: Option<Location>,
}

impl Record {
    /// Creates a record stamped with the current time and thread.
    pub fn new(level: Level, logger: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            logger: logger.into(),
            message: message.into(),
            timestamp: SystemTime::now(),
            thread: thread::current().id(),
            location: None,
        }
    }

    /// Attaches the source location of the call site.
    #[must_use]
    pub const fn with_location(mut self, file: &'static str, line: u32) -> Self {
        self.location = Some(Location { file, line });
        self
    }

    /// Severity the message was logged at.
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Name of the logger the message originated from.
    pub fn logger(&self) -> &str {
        &self.logger
    }

    /// The message text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Wall-clock time the record was created.
    pub const fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Thread that produced the record.
    pub const fn thread(&self) -> ThreadId {
        self.thread
    }

    /// Call site, when captured by a macro.
    pub const fn location(&self) -> Option<Location> {
        self.location
    }
}
