//! crates/logging-sink/src/format.rs
//! Text rendering of records.

use std::fmt::Write as _;
use std::time::UNIX_EPOCH;

use logging::Record;

/// Name printed for the root logger, whose real name is empty.
pub const ROOT_DISPLAY_NAME: &str = "root";

/// How a [`WriterSink`](crate::WriterSink) renders a record.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Format {
    /// `<seconds>.<millis> <thread> <LEVEL> <logger>: <message>`.
    #[default]
    Full,
    /// The message text only.
    Message,
}

impl Format {
    /// Renders `record` into `out` without a trailing newline.
    ///
    /// # Examples
    ///
    /// ```
    /// use logging::{Level, Record};
    /// use logging_sink::Format;
    ///
    /// let record = Record::new(Level::Warning, "db:pool", "exhausted");
    /// let mut line = String::new();
    /// Format::Full.render(&record, &mut line);
    /// assert!(line.ends_with(" WARNING db:pool: exhausted"));
    ///
    /// line.clear();
    /// Format::Message.render(&record, &mut line);
    /// assert_eq!(line, "exhausted");
    /// ```
    pub fn render(self, record: &Record, out: &mut String) {
        match self {
            Self::Message => out.push_str(record.message()),
            Self::Full => {
                // Clocks set before the epoch render as zero.
                let elapsed = record
                    .timestamp()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default();
                let logger = match record.logger() {
                    "" => ROOT_DISPLAY_NAME,
                    name => name,
                };
                // Writing into a String cannot fail.
                let _ = write!(
                    out,
                    "{}.{:03} {:?} {} {}: {}",
                    elapsed.as_secs(),
                    elapsed.subsec_millis(),
                    record.thread(),
                    record.level(),
                    logger,
                    record.message()
                );
            }
        }
    }
}
