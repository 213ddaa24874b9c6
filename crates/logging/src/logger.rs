//! crates/logging/src/logger.rs
//! A single named node of the logger hierarchy.
//!
//! Each [`Logger`] owns its threshold and the sinks attached directly to it.
//! Emission is gated once, by the originating logger's own threshold; after
//! that the record is fanned out to the logger's sinks and then to every
//! ancestor's sinks, nearest first, without consulting ancestor thresholds.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::level::Level;
use crate::name::LoggerName;
use crate::record::Record;
use crate::sink::{Sink, SinkError};

/// Sinks attached to one logger. Replaced wholesale on mutation so delivery
/// can hold a snapshot without keeping the lock.
type SinkList = Arc<[Arc<dyn Sink>]>;

/// A named logger.
///
/// Loggers are obtained from a [`Registry`](crate::Registry) and live as long
/// as the registry. Every method takes `&self` and is safe to call from any
/// thread.
///
/// # Examples
///
/// ```
/// use logging::{Level, Registry};
///
/// let registry = Registry::new();
/// let client = registry.lookup("net:http:client");
///
/// assert_eq!(client.name(), "net:http:client");
/// assert_eq!(client.parent().map(|p| p.name().to_owned()), Some("net:http".to_owned()));
/// assert!(client.is_enabled_for(Level::Info));
/// assert!(!client.is_enabled_for(Level::Debug));
/// ```
pub struct Logger {
    name: LoggerName,
    parent: Option<Arc<Self>>,
    level: AtomicU8,
    inherit_sinks: AtomicBool,
    sinks: RwLock<SinkList>,
    delivery_failures: AtomicU64,
}

impl Logger {
    pub(crate) fn new(
        name: impl Into<LoggerName>,
        parent: Option<Arc<Self>>,
        level: Level,
    ) -> Self {
        Self {
            name: name.into(),
            parent,
            level: AtomicU8::new(level.as_u8()),
            inherit_sinks: AtomicBool::new(true),
            sinks: RwLock::new(Arc::from(Vec::new())),
            delivery_failures: AtomicU64::new(0),
        }
    }

    /// The colon-separated name of this logger; empty for the root.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The logger one component up, or `None` for the root.
    pub fn parent(&self) -> Option<&Arc<Self>> {
        self.parent.as_ref()
    }

    /// Whether this is the root logger.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Current threshold.
    #[inline]
    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed)).unwrap_or_default()
    }

    /// Replaces this logger's threshold. Descendants are not touched.
    ///
    /// A later level-rule update recomputes every threshold from scratch and
    /// overwrites values set here.
    pub fn set_level(&self, level: Level) {
        self.level.store(level.as_u8(), Ordering::Relaxed);
    }

    /// Reports whether a message at `level` would be emitted by this logger.
    ///
    /// Only this logger's threshold is consulted.
    #[inline]
    pub fn is_enabled_for(&self, level: Level) -> bool {
        self.level().enables(level)
    }

    /// Whether records continue to ancestor sinks after this logger's own sinks.
    pub fn inherits_sinks(&self) -> bool {
        self.inherit_sinks.load(Ordering::Relaxed)
    }

    /// Stops (or resumes) fan-out to ancestor sinks past this logger.
    pub fn set_inherit_sinks(&self, inherit: bool) {
        self.inherit_sinks.store(inherit, Ordering::Relaxed);
    }

    /// Appends a sink. Delivery follows attachment order.
    pub fn add_sink(&self, sink: Arc<dyn Sink>) {
        let mut sinks = self.sinks.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = Vec::with_capacity(sinks.len() + 1);
        next.extend(sinks.iter().cloned());
        next.push(sink);
        *sinks = Arc::from(next);
    }

    /// Detaches the first attachment of `sink`, compared by pointer identity.
    ///
    /// Returns `false` when the sink was not attached to this logger.
    pub fn remove_sink<S>(&self, sink: &Arc<S>) -> bool
    where
        S: Sink + ?Sized,
    {
        let target = Arc::as_ptr(sink).cast::<()>();
        let mut sinks = self.sinks.write().unwrap_or_else(PoisonError::into_inner);
        let Some(index) = sinks
            .iter()
            .position(|attached| Arc::as_ptr(attached).cast::<()>() == target)
        else {
            return false;
        };

        let mut next: Vec<_> = sinks.iter().cloned().collect();
        next.remove(index);
        *sinks = Arc::from(next);
        true
    }

    /// Detaches every sink from this logger.
    pub fn clear_sinks(&self) {
        *self.sinks.write().unwrap_or_else(PoisonError::into_inner) = Arc::from(Vec::new());
    }

    /// Snapshot of the sinks attached directly to this logger.
    pub fn sinks(&self) -> Vec<Arc<dyn Sink>> {
        self.snapshot().to_vec()
    }

    /// Number of records that at least one sink failed to accept.
    pub fn delivery_failures(&self) -> u64 {
        self.delivery_failures.load(Ordering::Relaxed)
    }

    /// Logs `message` at `level`.
    ///
    /// Returns immediately, without touching `message`, when the level is not
    /// enabled. Otherwise the record goes to this logger's sinks in attachment
    /// order, then to each ancestor's sinks up to the root.
    pub fn log(&self, level: Level, message: impl Into<String>) {
        if !self.is_enabled_for(level) {
            return;
        }
        self.deliver(&Record::new(level, self.name(), message));
    }

    /// Logs a prebuilt record, typically one carrying a source location.
    ///
    /// The record's level is checked against this logger's threshold.
    pub fn log_record(&self, record: &Record) {
        if self.is_enabled_for(record.level()) {
            self.deliver(record);
        }
    }

    fn snapshot(&self) -> SinkList {
        Arc::clone(&self.sinks.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn deliver(&self, record: &Record) {
        let mut failed = false;
        let mut node = Some(self);
        while let Some(current) = node {
            for sink in current.snapshot().iter() {
                if let Err(error) = dispatch(sink.as_ref(), record) {
                    failed = true;
                    report_failure(self.name(), current.name(), &error);
                }
            }
            if !current.inherits_sinks() {
                break;
            }
            node = current.parent.as_deref();
        }
        if failed {
            self.delivery_failures.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn report_failure(origin: &str, owner: &str, error: &SinkError) {
    #[cfg(feature = "tracing")]
    tracing::warn!(
        target: "logging::delivery",
        logger = origin,
        sink_owner = owner,
        %error,
        "sink rejected record"
    );
}

/// Runs one sink, converting a panic into an error so the chain continues.
fn dispatch(sink: &dyn Sink, record: &Record) -> Result<(), SinkError> {
    match panic::catch_unwind(AssertUnwindSafe(|| sink.accept(record))) {
        Ok(result) => result,
        Err(_) => Err(SinkError::Other("sink panicked".to_owned())),
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        // Release ancestors one at a time; a deep chain would otherwise be
        // freed recursively, one stack frame per component.
        let mut parent = self.parent.take();
        while let Some(node) = parent {
            parent = Arc::into_inner(node).and_then(|mut logger| logger.parent.take());
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name())
            .field("level", &self.level())
            .field("inherit_sinks", &self.inherits_sinks())
            .field("sinks", &self.snapshot().len())
            .finish_non_exhaustive()
    }
}
