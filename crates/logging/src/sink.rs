//! crates/logging/src/sink.rs
//! The capability every log destination implements.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::record::Record;

/// Failure reported by a sink while accepting a record.
///
/// Sink errors never reach the code that called [`Logger::log`](crate::Logger::log);
/// they are counted on the originating logger and the remaining sinks still run.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The underlying writer failed.
    #[error("sink I/O failed: {0}")]
    Io(#[from] io::Error),
    /// The sink has been shut down and no longer accepts records.
    #[error("sink is closed")]
    Closed,
    /// Any other sink-specific failure.
    #[error("{0}")]
    Other(String),
}

/// A destination for log records.
///
/// Implementations must be safe to call from many threads at once and should
/// serialize their own deliveries if the destination requires it. The core
/// never inspects a sink beyond this trait.
pub trait Sink: Send + Sync {
    /// Accepts one record that already passed its logger's threshold.
    fn accept(&self, record: &Record) -> Result<(), SinkError>;

    /// Flushes any buffered output.
    fn flush(&self) {}
}

/// Adapts a closure into a [`Sink`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use logging::{FnSink, Level, Registry};
///
/// let registry = Registry::new();
/// let logger = registry.lookup("app");
/// logger.add_sink(Arc::new(FnSink::new(|record: &logging::Record| {
///     assert_eq!(record.message(), "ready");
///     Ok(())
/// })));
/// logger.log(Level::Info, "ready");
/// ```
pub struct FnSink<F> {
    f: F,
}

impl<F> FnSink<F>
where
    F: Fn(&Record) -> Result<(), SinkError> + Send + Sync,
{
    /// Wraps `f`.
    pub const fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Sink for FnSink<F>
where
    F: Fn(&Record) -> Result<(), SinkError> + Send + Sync,
{
    fn accept(&self, record: &Record) -> Result<(), SinkError> {
        (self.f)(record)
    }
}

impl<F> fmt::Debug for FnSink<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSink").finish_non_exhaustive()
    }
}
