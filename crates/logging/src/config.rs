//! crates/logging/src/config.rs
//! Bridge between an external configuration source and logger thresholds.
//!
//! Configuration arrives as complete snapshots, never deltas. Every accepted
//! snapshot is compiled in full first; only then are thresholds recomputed
//! for every logger, so a malformed update changes nothing.

use std::sync::Arc;

use thiserror::Error;

use crate::level::{Level, ParseLevelError};
use crate::registry::Registry;
use crate::rules::LevelRules;
use crate::sink::Sink;

/// Errors raised while accepting a configuration update.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A level pattern is not a valid regular expression.
    #[error("invalid logger pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Why the regex engine rejected it.
        #[source]
        source: regex::Error,
    },
    /// A mask key is not one of [`LevelMasks::KEYS`].
    #[error("unknown level mask key: {0:?}")]
    UnknownKey(String),
    /// A level name could not be parsed.
    #[error(transparent)]
    InvalidLevel(#[from] ParseLevelError),
}

/// One optional logger-name pattern per level.
///
/// This is the conventional shape of level configuration: a `log.debugmask`
/// entry names the loggers that should run at DEBUG, a `log.tracemask` entry
/// those at TRACE, and so on. A logger ends up at the most verbose level whose
/// mask it matches. Empty masks are treated as unset.
///
/// # Examples
///
/// ```
/// use logging::{Level, LevelMasks};
///
/// let mut masks = LevelMasks::default();
/// masks.set("log.debugmask", "net:http:client")?;
/// masks.set("log.tracemask", ".*")?;
///
/// let rules = masks.to_rules()?;
/// assert_eq!(rules.level_for("net:http:client"), Level::Trace);
/// # Ok::<(), logging::ConfigError>(())
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LevelMasks {
    /// Loggers to run at FATAL.
    pub fatal: Option<String>,
    /// Loggers to run at ERROR.
    pub error: Option<String>,
    /// Loggers to run at WARNING.
    pub warning: Option<String>,
    /// Loggers to run at INFO.
    pub info: Option<String>,
    /// Loggers to run at VERBOSE.
    pub verbose: Option<String>,
    /// Loggers to run at DEBUG.
    pub debug: Option<String>,
    /// Loggers to run at TRACE.
    pub trace: Option<String>,
}

impl LevelMasks {
    /// Recognised keys, least verbose first.
    pub const KEYS: [(&'static str, Level); 7] = [
        ("log.fatalmask", Level::Fatal),
        ("log.errormask", Level::Error),
        ("log.warnmask", Level::Warning),
        ("log.infomask", Level::Info),
        ("log.verbosemask", Level::Verbose),
        ("log.debugmask", Level::Debug),
        ("log.tracemask", Level::Trace),
    ];

    /// Builds masks from `(key, pattern)` pairs, rejecting unknown keys.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut masks = Self::default();
        for (key, value) in pairs {
            masks.set(key.as_ref(), value)?;
        }
        Ok(masks)
    }

    /// Sets the mask stored under `key`, e.g. `log.debugmask`.
    pub fn set(&mut self, key: &str, pattern: impl Into<String>) -> Result<(), ConfigError> {
        let level = Self::KEYS
            .iter()
            .find(|(known, _)| *known == key)
            .map(|(_, level)| *level)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_owned()))?;
        self.set_mask(level, Some(pattern.into()));
        Ok(())
    }

    /// Mask for `level`; always `None` for [`Level::None`].
    pub fn get(&self, level: Level) -> Option<&str> {
        let slot = match level {
            Level::None => return None,
            Level::Fatal => &self.fatal,
            Level::Error => &self.error,
            Level::Warning => &self.warning,
            Level::Info => &self.info,
            Level::Verbose => &self.verbose,
            Level::Debug => &self.debug,
            Level::Trace => &self.trace,
        };
        slot.as_deref().filter(|pattern| !pattern.is_empty())
    }

    /// Replaces the mask for `level`. Ignored for [`Level::None`].
    pub fn set_mask(&mut self, level: Level, pattern: Option<String>) {
        let slot = match level {
            Level::None => return,
            Level::Fatal => &mut self.fatal,
            Level::Error => &mut self.error,
            Level::Warning => &mut self.warning,
            Level::Info => &mut self.info,
            Level::Verbose => &mut self.verbose,
            Level::Debug => &mut self.debug,
            Level::Trace => &mut self.trace,
        };
        *slot = pattern;
    }

    /// Compiles the non-empty masks into a rule set.
    pub fn to_rules(&self) -> Result<LevelRules, ConfigError> {
        LevelRules::compile(
            Self::KEYS
                .iter()
                .filter_map(|(_, level)| self.get(*level).map(|pattern| (pattern, *level))),
        )
    }
}

/// Applies configuration snapshots to a [`Registry`].
///
/// Level rules are the only mass mutator of thresholds. Levels set by hand
/// with [`Logger::set_level`](crate::Logger::set_level) survive only until
/// the next update.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use logging::{ConfigBridge, Level, Registry};
///
/// let registry = Arc::new(Registry::new());
/// let bridge = ConfigBridge::new(Arc::clone(&registry));
/// let logger = registry.lookup("a:b");
///
/// bridge.update([("a:.*", Level::Debug)])?;
/// assert_eq!(logger.level(), Level::Debug);
///
/// bridge.update(Vec::<(&str, Level)>::new())?;
/// assert_eq!(logger.level(), Level::Info);
/// # Ok::<(), logging::ConfigError>(())
/// ```
#[derive(Clone, Debug)]
pub struct ConfigBridge {
    registry: Arc<Registry>,
}

/// Callback shape handed to external configuration sources.
pub type UpdateCallback = Box<dyn Fn(&[(String, Level)]) -> Result<(), ConfigError> + Send + Sync>;

impl ConfigBridge {
    /// Binds a bridge to `registry`.
    pub const fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Binds a bridge to the process-wide registry.
    pub fn global() -> Self {
        Self::new(Arc::clone(Registry::global()))
    }

    /// The registry this bridge configures.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Replaces the rule set with `pairs`.
    ///
    /// On error the previous rules and every threshold stay as they were.
    pub fn update<I, P>(&self, pairs: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (P, Level)>,
        P: AsRef<str>,
    {
        let rules = LevelRules::compile(pairs)?;
        self.apply(rules);
        Ok(())
    }

    /// Replaces the rule set with the one described by `masks`.
    pub fn update_masks(&self, masks: &LevelMasks) -> Result<(), ConfigError> {
        let rules = masks.to_rules()?;
        self.apply(rules);
        Ok(())
    }

    /// Installs an already compiled rule set.
    pub fn apply(&self, rules: LevelRules) {
        self.registry.apply_rules(rules);
    }

    /// The rule set currently in effect.
    pub fn current(&self) -> Arc<LevelRules> {
        self.registry.rules()
    }

    /// Enables (`Some`) or disables (`None`) the root sink owned by the
    /// configuration key `key`, e.g. `log.stdout`.
    ///
    /// See [`Registry::set_root_sink`]; sinks attached by hand are untouched.
    pub fn set_root_sink(&self, key: &str, sink: Option<Arc<dyn Sink>>) -> Option<Arc<dyn Sink>> {
        let previous = self.registry.set_root_sink(key, sink);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "logging::config",
            key,
            enabled = self.registry.root_sink(key).is_some(),
            "root sink updated"
        );
        previous
    }

    /// Configuration keys that currently own a root sink.
    pub fn root_sink_keys(&self) -> Vec<String> {
        self.registry.root_sink_keys()
    }

    /// A callback an external configuration source can invoke on every change.
    pub fn callback(&self) -> UpdateCallback {
        let bridge = self.clone();
        Box::new(move |pairs: &[(String, Level)]| {
            bridge.update(pairs.iter().map(|(pattern, level)| (pattern.as_str(), *level)))
        })
    }
}
