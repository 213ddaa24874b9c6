//! crates/logging/src/macros.rs
//! Producer macros.
//!
//! Every macro checks the logger's threshold before formatting, so a
//! suppressed message costs one atomic load. Records built by the macros
//! carry the call site's `file!()` and `line!()`.

/// Log a formatted message at an explicit level.
///
/// The first argument is anything that dereferences to a [`Logger`](crate::Logger),
/// such as the `Arc<Logger>` returned by [`lookup`](crate::lookup).
///
/// # Example
/// ```
/// use logging::{Level, Registry};
///
/// let registry = Registry::new();
/// let logger = registry.lookup("app:startup");
/// logging::log!(logger, Level::Info, "listening on port {}", 8080);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger: &$crate::Logger = &$logger;
        let level: $crate::Level = $level;
        if logger.is_enabled_for(level) {
            logger.log_record(
                &$crate::Record::new(level, logger.name(), ::std::format!($($arg)+))
                    .with_location(::std::file!(), ::std::line!()),
            );
        }
    }};
}

/// Log at FATAL.
///
/// # Example
/// ```ignore
/// fatal!(logger, "cannot continue: {}", reason);
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Fatal, $($arg)+)
    };
}

/// Log at ERROR.
///
/// # Example
/// ```ignore
/// error!(logger, "request failed: {}", err);
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Error, $($arg)+)
    };
}

/// Log at WARNING.
///
/// # Example
/// ```ignore
/// warning!(logger, "retrying after {} ms", delay);
/// ```
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Warning, $($arg)+)
    };
}

/// Log at INFO.
///
/// # Example
/// ```ignore
/// info!(logger, "connected to {}", peer);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Info, $($arg)+)
    };
}

/// Log at VERBOSE.
///
/// # Example
/// ```ignore
/// verbose!(logger, "cache warmed with {} entries", count);
/// ```
#[macro_export]
macro_rules! verbose {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Verbose, $($arg)+)
    };
}

/// Log at DEBUG.
///
/// # Example
/// ```ignore
/// debug!(logger, "parsed header {:?}", header);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Debug, $($arg)+)
    };
}

/// Log at TRACE.
///
/// # Example
/// ```ignore
/// trace!(logger, "state = {:?}", state);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Trace, $($arg)+)
    };
}
