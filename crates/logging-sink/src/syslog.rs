//! Syslog destination for the logger tree.
//!
//! Uses libc `openlog`/`syslog`/`closelog` directly rather than pulling in a
//! dedicated syslog crate. Every record is sent with `syslog(priority, "%s",
//! line)` so `%` in messages is never interpreted. Sinks share one
//! refcounted connection; `closelog` runs when the last one is dropped.

use std::ffi::CString;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use logging::{Level, Record, Sink, SinkError};

use crate::format::ROOT_DISPLAY_NAME;

/// Syslog facility codes matching the POSIX syslog(3) constants.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[repr(i32)]
pub enum SyslogFacility {
    /// Kernel messages (LOG_KERN).
    Kern = libc::LOG_KERN,
    /// User-level messages (LOG_USER).
    #[default]
    User = libc::LOG_USER,
    /// Mail system (LOG_MAIL).
    Mail = libc::LOG_MAIL,
    /// System daemons (LOG_DAEMON).
    Daemon = libc::LOG_DAEMON,
    /// Security/authorization messages (LOG_AUTH).
    Auth = libc::LOG_AUTH,
    /// Messages generated internally by syslogd (LOG_SYSLOG).
    Syslog = libc::LOG_SYSLOG,
    /// Line printer subsystem (LOG_LPR).
    Lpr = libc::LOG_LPR,
    /// Network news subsystem (LOG_NEWS).
    News = libc::LOG_NEWS,
    /// UUCP subsystem (LOG_UUCP).
    Uucp = libc::LOG_UUCP,
    /// Clock daemon (LOG_CRON).
    Cron = libc::LOG_CRON,
    /// Reserved for local use (LOG_LOCAL0).
    Local0 = libc::LOG_LOCAL0,
    /// Reserved for local use (LOG_LOCAL1).
    Local1 = libc::LOG_LOCAL1,
    /// Reserved for local use (LOG_LOCAL2).
    Local2 = libc::LOG_LOCAL2,
    /// Reserved for local use (LOG_LOCAL3).
    Local3 = libc::LOG_LOCAL3,
    /// Reserved for local use (LOG_LOCAL4).
    Local4 = libc::LOG_LOCAL4,
    /// Reserved for local use (LOG_LOCAL5).
    Local5 = libc::LOG_LOCAL5,
    /// Reserved for local use (LOG_LOCAL6).
    Local6 = libc::LOG_LOCAL6,
    /// Reserved for local use (LOG_LOCAL7).
    Local7 = libc::LOG_LOCAL7,
}

impl SyslogFacility {
    const NAMES: [(&'static str, Self); 18] = [
        ("kern", Self::Kern),
        ("user", Self::User),
        ("mail", Self::Mail),
        ("daemon", Self::Daemon),
        ("auth", Self::Auth),
        ("syslog", Self::Syslog),
        ("lpr", Self::Lpr),
        ("news", Self::News),
        ("uucp", Self::Uucp),
        ("cron", Self::Cron),
        ("local0", Self::Local0),
        ("local1", Self::Local1),
        ("local2", Self::Local2),
        ("local3", Self::Local3),
        ("local4", Self::Local4),
        ("local5", Self::Local5),
        ("local6", Self::Local6),
        ("local7", Self::Local7),
    ];

    /// Parses a facility name, ignoring case. Returns `None` for unknown names.
    ///
    /// # Examples
    ///
    /// ```
    /// use logging_sink::syslog::SyslogFacility;
    ///
    /// assert_eq!(SyslogFacility::from_name("LOCAL3"), Some(SyslogFacility::Local3));
    /// assert_eq!(SyslogFacility::from_name("local8"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|(_, facility)| *facility)
    }

    /// The facility's lowercase name.
    pub fn as_str(self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(_, facility)| *facility == self)
            .map_or("user", |(name, _)| name)
    }
}

impl fmt::Display for SyslogFacility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Syslog priority levels matching POSIX syslog(3) severity constants.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(i32)]
pub enum SyslogPriority {
    /// Critical conditions (LOG_CRIT).
    Critical = libc::LOG_CRIT,
    /// Error conditions (LOG_ERR).
    Error = libc::LOG_ERR,
    /// Warning conditions (LOG_WARNING).
    Warning = libc::LOG_WARNING,
    /// Normal but significant condition (LOG_NOTICE).
    Notice = libc::LOG_NOTICE,
    /// Informational messages (LOG_INFO).
    Info = libc::LOG_INFO,
    /// Debug-level messages (LOG_DEBUG).
    Debug = libc::LOG_DEBUG,
}

impl From<Level> for SyslogPriority {
    fn from(level: Level) -> Self {
        match level {
            Level::Fatal => Self::Critical,
            Level::Error => Self::Error,
            Level::Warning => Self::Warning,
            Level::Info => Self::Notice,
            Level::Verbose => Self::Info,
            // NONE never reaches a sink.
            Level::Debug | Level::Trace | Level::None => Self::Debug,
        }
    }
}

/// Default ident passed to `openlog`.
pub const DEFAULT_SYSLOG_TAG: &str = "logtree";

/// Facility and tag (ident) used when opening the syslog connection.
///
/// # Examples
///
/// ```
/// use logging_sink::syslog::{SyslogConfig, SyslogFacility};
///
/// let config = SyslogConfig::new(SyslogFacility::Local5, "my-daemon");
/// assert_eq!(config.facility(), SyslogFacility::Local5);
/// assert_eq!(config.tag(), "my-daemon");
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyslogConfig {
    facility: SyslogFacility,
    tag: String,
}

impl SyslogConfig {
    /// Creates a configuration with the given facility and tag.
    pub fn new(facility: SyslogFacility, tag: impl Into<String>) -> Self {
        Self {
            facility,
            tag: tag.into(),
        }
    }

    /// The configured facility.
    pub const fn facility(&self) -> SyslogFacility {
        self.facility
    }

    /// The configured tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl Default for SyslogConfig {
    fn default() -> Self {
        Self::new(SyslogFacility::default(), DEFAULT_SYSLOG_TAG)
    }
}

/// Errors from [`SyslogSink::open`].
#[derive(Debug, thiserror::Error)]
pub enum SyslogOpenError {
    /// The tag contains a NUL byte and cannot be passed to `openlog`.
    #[error("syslog tag {0:?} contains a NUL byte")]
    NulInTag(String),
    /// Another live sink opened the connection under a different tag.
    #[error("syslog is open as {open:?}; cannot reopen as {requested:?} while sinks are live")]
    TagInUse {
        /// Tag of the live connection.
        open: String,
        /// Tag that was requested.
        requested: String,
    },
}

/// Process-wide syslog connection shared by every live [`SyslogSink`].
struct Connection {
    live: usize,
    tag: String,
    // openlog keeps this pointer until closelog or the next openlog.
    ident: Option<CString>,
}

static CONNECTION: Mutex<Connection> = Mutex::new(Connection {
    live: 0,
    tag: String::new(),
    ident: None,
});

fn connection() -> MutexGuard<'static, Connection> {
    CONNECTION.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Number of [`SyslogSink`]s currently holding the connection open.
pub fn live_sinks() -> usize {
    connection().live
}

/// Sink that forwards records to syslog(3).
///
/// syslog keeps one connection per process. Sinks share it: the first one
/// calls `openlog` with its tag and the last one dropped calls `closelog`.
/// While any sink is live, opening another with a different tag fails with
/// [`SyslogOpenError::TagInUse`]. Each sink still logs under its own facility,
/// which is combined with the record's priority on every call.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use logging::Registry;
/// use logging_sink::syslog::{SyslogConfig, SyslogFacility, SyslogSink};
///
/// let sink = SyslogSink::open(&SyslogConfig::new(SyslogFacility::Daemon, "myd"))?;
/// Registry::global().root().add_sink(Arc::new(sink));
/// # Ok::<(), logging_sink::syslog::SyslogOpenError>(())
/// ```
#[derive(Debug)]
pub struct SyslogSink {
    facility: SyslogFacility,
}

impl SyslogSink {
    /// Opens the syslog connection described by `config`, or joins it when
    /// another sink already opened it under the same tag.
    pub fn open(config: &SyslogConfig) -> Result<Self, SyslogOpenError> {
        let mut connection = connection();
        if connection.live == 0 {
            let ident = CString::new(config.tag.as_str())
                .map_err(|_| SyslogOpenError::NulInTag(config.tag.clone()))?;
            // SAFETY: ident is stored in the connection below and is only
            // released after closelog or a later openlog replaced it.
            unsafe {
                libc::openlog(ident.as_ptr(), libc::LOG_PID, config.facility as libc::c_int);
            }
            connection.ident = Some(ident);
            connection.tag.clone_from(&config.tag);
        } else if connection.tag != config.tag {
            return Err(SyslogOpenError::TagInUse {
                open: connection.tag.clone(),
                requested: config.tag.clone(),
            });
        }
        connection.live += 1;

        Ok(Self {
            facility: config.facility,
        })
    }

    /// The facility this sink was opened with.
    pub const fn facility(&self) -> SyslogFacility {
        self.facility
    }
}

impl Sink for SyslogSink {
    fn accept(&self, record: &Record) -> Result<(), SinkError> {
        let logger = match record.logger() {
            "" => ROOT_DISPLAY_NAME,
            name => name,
        };
        let line = format!("{logger}: {}", record.message());
        syslog_message(self.facility, SyslogPriority::from(record.level()), &line)
    }
}

impl Drop for SyslogSink {
    fn drop(&mut self) {
        let mut connection = connection();
        connection.live = connection.live.saturating_sub(1);
        if connection.live == 0 {
            // SAFETY: closelog has no preconditions.
            unsafe {
                libc::closelog();
            }
            connection.ident = None;
        }
    }
}

/// The `priority` argument syslog(3) expects: facility and severity combined.
pub const fn encode_priority(facility: SyslogFacility, priority: SyslogPriority) -> libc::c_int {
    facility as libc::c_int | priority as libc::c_int
}

/// Sends one line to syslog(3) under `facility` at `priority`.
///
/// Fails with [`SinkError::Other`] when `message` contains a NUL byte.
pub fn syslog_message(
    facility: SyslogFacility,
    priority: SyslogPriority,
    message: &str,
) -> Result<(), SinkError> {
    let c_message = CString::new(message)
        .map_err(|_| SinkError::Other("message contains a NUL byte".to_owned()))?;

    // SAFETY: both arguments are valid NUL-terminated C strings; "%s" keeps
    // the message from being read as a format string.
    unsafe {
        libc::syslog(
            encode_priority(facility, priority),
            c"%s".as_ptr(),
            c_message.as_ptr(),
        );
    }
    Ok(())
}
