//! crates/logging-sink/src/writer.rs
//! Sink that renders records as text into any [`std::io::Write`] implementor.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use logging::{Record, Sink, SinkError};

use crate::format::Format;
use crate::line_mode::LineMode;

struct Inner<W> {
    writer: W,
    scratch: String,
}

/// Streams rendered records into a writer.
///
/// Deliveries from different threads are serialized through an internal
/// mutex, and each record reaches the writer in a single `write_all` call, so
/// lines from concurrent loggers never interleave. The render buffer is kept
/// between records and reused.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use logging::{Level, Registry};
/// use logging_sink::{Format, WriterSink};
///
/// let registry = Registry::new();
/// let sink = Arc::new(WriterSink::new(Vec::new()).with_format(Format::Message));
/// let root = registry.root();
/// root.add_sink(sink.clone());
///
/// registry.lookup("app").log(Level::Info, "ready");
///
/// root.clear_sinks();
/// let sink = Arc::try_unwrap(sink).ok().unwrap();
/// assert_eq!(sink.into_inner(), b"ready\n");
/// ```
pub struct WriterSink<W> {
    inner: Mutex<Inner<W>>,
    line_mode: LineMode,
    format: Format,
}

impl<W> WriterSink<W>
where
    W: Write + Send,
{
    /// Wraps `writer` using [`Format::Full`] and [`LineMode::WithNewline`].
    pub fn new(writer: W) -> Self {
        Self::with_line_mode(writer, LineMode::default())
    }

    /// Wraps `writer` with an explicit newline policy.
    pub fn with_line_mode(writer: W, line_mode: LineMode) -> Self {
        Self {
            inner: Mutex::new(Inner {
                writer,
                scratch: String::new(),
            }),
            line_mode,
            format: Format::default(),
        }
    }

    /// Replaces the rendering format.
    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// The newline policy in effect.
    pub const fn line_mode(&self) -> LineMode {
        self.line_mode
    }

    /// The rendering format in effect.
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Flushes the underlying writer, reporting any error.
    pub fn try_flush(&self) -> io::Result<()> {
        self.lock().writer.flush()
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .writer
    }

    fn lock(&self) -> MutexGuard<'_, Inner<W>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl WriterSink<io::Stdout> {
    /// A sink writing to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl WriterSink<io::Stderr> {
    /// A sink writing to standard error.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl WriterSink<File> {
    /// Opens `path` for appending, creating it if needed.
    pub fn file(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(file))
    }
}

impl<W> Sink for WriterSink<W>
where
    W: Write + Send,
{
    fn accept(&self, record: &Record) -> Result<(), SinkError> {
        let mut guard = self.lock();
        let Inner { writer, scratch } = &mut *guard;
        scratch.clear();
        self.format.render(record, scratch);
        if self.line_mode.append_newline() {
            scratch.push('\n');
        }
        writer.write_all(scratch.as_bytes())?;
        Ok(())
    }

    fn flush(&self) {
        // Sink::flush has no error channel.
        let _ = self.try_flush();
    }
}

impl<W> fmt::Debug for WriterSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterSink")
            .field("line_mode", &self.line_mode)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logging::Level;

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::other("flush failed"))
        }
    }

    fn record(message: &str) -> Record {
        Record::new(Level::Info, "t", message)
    }

    #[test]
    fn message_format_with_newline() {
        let sink = WriterSink::new(Vec::new()).with_format(Format::Message);
        sink.accept(&record("one")).unwrap();
        sink.accept(&record("two")).unwrap();
        assert_eq!(sink.into_inner(), b"one\ntwo\n");
    }

    #[test]
    fn without_newline_concatenates() {
        let sink = WriterSink::with_line_mode(Vec::new(), LineMode::WithoutNewline)
            .with_format(Format::Message);
        sink.accept(&record("a")).unwrap();
        sink.accept(&record("b")).unwrap();
        assert_eq!(sink.into_inner(), b"ab");
    }

    #[test]
    fn full_format_is_default() {
        let sink = WriterSink::new(Vec::new());
        assert_eq!(sink.format(), Format::Full);
        assert_eq!(sink.line_mode(), LineMode::WithNewline);
        sink.accept(&record("hello")).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert!(text.ends_with(" INFO t: hello\n"), "{text}");
    }

    #[test]
    fn write_errors_surface_as_io() {
        let sink = WriterSink::new(Broken);
        let err = sink.accept(&record("x")).unwrap_err();
        assert!(matches!(err, SinkError::Io(ref io) if io.kind() == io::ErrorKind::BrokenPipe));
        assert!(sink.try_flush().is_err());
        Sink::flush(&sink);
    }

    #[test]
    fn debug_omits_writer() {
        let sink = WriterSink::new(Vec::<u8>::new());
        let debug = format!("{sink:?}");
        assert!(debug.starts_with("WriterSink"));
        assert!(debug.contains("Full"));
    }
}
