//! crates/logging-sink/src/memory.rs
//! In-memory capture of delivered records.

use std::sync::{Mutex, MutexGuard, PoisonError};

use logging::{Record, Sink, SinkError};

/// Collects every record it receives.
///
/// Intended for tests and for tools that inspect recent log output. The
/// buffer is unbounded; use [`drain`](Self::drain) to empty it.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use logging::{Level, Registry};
/// use logging_sink::MemorySink;
///
/// let registry = Registry::new();
/// let memory = Arc::new(MemorySink::new());
/// registry.root().add_sink(memory.clone());
///
/// registry.lookup("a:b").log(Level::Warning, "careful");
/// assert_eq!(memory.messages(), vec!["careful"]);
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<Record>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies of every captured record, oldest first.
    pub fn records(&self) -> Vec<Record> {
        self.lock().clone()
    }

    /// The captured messages, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.lock()
            .iter()
            .map(|record| record.message().to_owned())
            .collect()
    }

    /// Removes and returns every captured record.
    pub fn drain(&self) -> Vec<Record> {
        self.lock().drain(..).collect()
    }

    /// Number of captured records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been captured.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Record>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Sink for MemorySink {
    fn accept(&self, record: &Record) -> Result<(), SinkError> {
        self.lock().push(record.clone());
        Ok(())
    }
}
