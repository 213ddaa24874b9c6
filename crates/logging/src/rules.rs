//! crates/logging/src/rules.rs
//! Pure resolution of logger thresholds from `(pattern, level)` rules.
//!
//! A rule set is an immutable, compiled snapshot. Each pattern is a regular
//! expression that must match the whole logger name. A logger's threshold is
//! the most verbose level among all rules it matches, or [`Level::Info`] when
//! it matches none. Equally verbose matches cannot conflict because only the
//! level is taken from a rule.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;

use crate::config::ConfigError;
use crate::level::Level;

/// Threshold given to loggers that no rule matches.
pub const DEFAULT_LEVEL: Level = Level::Info;

/// One compiled `(pattern, level)` rule.
#[derive(Clone)]
pub struct LevelRule {
    pattern: String,
    regex: Regex,
    level: Level,
}

impl LevelRule {
    /// Compiles `pattern`, anchored so it must match an entire logger name.
    pub fn new(pattern: &str, level: Level) -> Result<Self, ConfigError> {
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
            ConfigError::InvalidPattern {
                pattern: pattern.to_owned(),
                source,
            }
        })?;
        Ok(Self {
            pattern: pattern.to_owned(),
            regex,
            level,
        })
    }

    /// The pattern as supplied, without anchoring.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Level assigned to matching loggers.
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Whether the rule covers the logger called `name`.
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

impl fmt::Debug for LevelRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LevelRule")
            .field("pattern", &self.pattern)
            .field("level", &self.level)
            .finish()
    }
}

/// A complete, compiled rule set.
///
/// # Examples
///
/// ```
/// use logging::{Level, LevelRules};
///
/// let rules = LevelRules::compile([("net:.*", Level::Debug), ("net:http", Level::Trace)])?;
/// assert_eq!(rules.level_for("net:http"), Level::Trace);
/// assert_eq!(rules.level_for("net:dns"), Level::Debug);
/// assert_eq!(rules.level_for("disk"), Level::Info);
/// # Ok::<(), logging::ConfigError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct LevelRules {
    rules: Vec<LevelRule>,
}

impl LevelRules {
    /// An empty rule set; every logger resolves to the default level.
    pub const fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Compiles every pair, failing on the first malformed pattern.
    ///
    /// Nothing is returned on error, so a caller holding a previous rule set
    /// keeps using it unchanged.
    pub fn compile<I, P>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (P, Level)>,
        P: AsRef<str>,
    {
        let rules = pairs
            .into_iter()
            .map(|(pattern, level)| LevelRule::new(pattern.as_ref(), level))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Threshold for the logger called `name`.
    pub fn level_for(&self, name: &str) -> Level {
        self.rules
            .iter()
            .filter(|rule| rule.matches(name))
            .map(LevelRule::level)
            .max()
            .unwrap_or(DEFAULT_LEVEL)
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set contains no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates over the rules in the order they were supplied.
    pub fn iter(&self) -> std::slice::Iter<'_, LevelRule> {
        self.rules.iter()
    }
}

impl<'a> IntoIterator for &'a LevelRules {
    type Item = &'a LevelRule;
    type IntoIter = std::slice::Iter<'a, LevelRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Computes the threshold of every named logger under `rules`.
///
/// This is the whole of a configuration update minus the tree mutation:
/// applying the returned map to the registry yields the same state as
/// [`Registry::apply_rules`](crate::Registry::apply_rules).
pub fn resolve<'a, I>(rules: &LevelRules, names: I) -> BTreeMap<String, Level>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .map(|name| (name.to_owned(), rules.level_for(name)))
        .collect()
}
