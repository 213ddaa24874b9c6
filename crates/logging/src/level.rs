//! crates/logging/src/level.rs
//! Severity scale shared by loggers, records and level masks.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Severity of a log message, or the threshold of a logger.
///
/// Variants are ordered from least to most verbose. A logger whose threshold
/// is `T` emits a message of level `L` iff `L <= T`, so a [`Level::None`]
/// threshold disables everything and [`Level::Trace`] enables everything.
///
/// # Examples
///
/// ```
/// use logging::Level;
///
/// assert!(Level::Info.enables(Level::Error));
/// assert!(!Level::Info.enables(Level::Debug));
/// assert!(!Level::None.enables(Level::Fatal));
/// ```
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Level {
    /// Disables all output when used as a threshold.
    None = 0,
    /// The application cannot continue.
    Fatal = 1,
    /// An error that cannot be recovered from locally.
    Error = 2,
    /// An error that was recovered from but is worth knowing about.
    Warning = 3,
    /// A normal but significant event.
    #[default]
    Info = 4,
    /// A somewhat significant event.
    Verbose = 5,
    /// Calls a component makes; normally only useful for debugging.
    Debug = 6,
    /// Everything, including internal state.
    Trace = 7,
}

impl Level {
    /// Every level, least verbose first.
    pub const ALL: [Self; 8] = [
        Self::None,
        Self::Fatal,
        Self::Error,
        Self::Warning,
        Self::Info,
        Self::Verbose,
        Self::Debug,
        Self::Trace,
    ];

    /// Reports whether a threshold of `self` lets a message at `message` through.
    ///
    /// [`Level::None`] is not a message severity and is never enabled.
    #[inline]
    #[must_use]
    pub const fn enables(self, message: Self) -> bool {
        !matches!(message, Self::None) && message as u8 <= self as u8
    }

    /// Numeric value of the level, `0` for [`Level::None`] through `7` for [`Level::Trace`].
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a numeric value back into a level.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Fatal),
            2 => Some(Self::Error),
            3 => Some(Self::Warning),
            4 => Some(Self::Info),
            5 => Some(Self::Verbose),
            6 => Some(Self::Debug),
            7 => Some(Self::Trace),
            _ => None,
        }
    }

    /// Upper-case name used when rendering records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Fatal => "FATAL",
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
            Self::Verbose => "VERBOSE",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level name is not recognised.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("unknown log level: {input:?}")]
pub struct ParseLevelError {
    input: String,
}

impl ParseLevelError {
    /// The text that failed to parse.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    /// Parses a level name case-insensitively. `warn` is accepted for `warning`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "fatal" => Ok(Self::Fatal),
            "error" => Ok(Self::Error),
            "warning" | "warn" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            "verbose" => Ok(Self::Verbose),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(ParseLevelError {
                input: s.to_owned(),
            }),
        }
    }
}
