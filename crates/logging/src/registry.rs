//! crates/logging/src/registry.rs
//!
//! Process-wide tree of loggers keyed by colon-separated name.
//!
//! The registry uses DashMap for sharded concurrent access: looking up an
//! existing logger only takes a shard read lock, and two threads creating
//! the same name race through the entry API so exactly one node is stored.
//! Nodes are never removed, which keeps visitation simple: a visit walks a
//! snapshot of the nodes present when it started.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;

use crate::level::Level;
use crate::logger::Logger;
use crate::name::LoggerName;
use crate::rules::LevelRules;
use crate::sink::Sink;

/// Separator between name components.
pub const SEPARATOR: char = ':';

/// Name of the logger one level up from `name`.
///
/// Returns `None` for the root (the empty name). A name without a separator
/// is a direct child of the root.
///
/// # Examples
///
/// ```
/// use logging::parent_name;
///
/// assert_eq!(parent_name("a:b:c"), Some("a:b"));
/// assert_eq!(parent_name("a"), Some(""));
/// assert_eq!(parent_name(""), None);
/// ```
pub fn parent_name(name: &str) -> Option<&str> {
    if name.is_empty() {
        return None;
    }
    Some(name.rsplit_once(SEPARATOR).map_or("", |(parent, _)| parent))
}

/// Owner of every logger in one hierarchy.
///
/// Most programs use [`Registry::global`] through the crate-level
/// [`lookup`](crate::lookup), [`root`](crate::root) and [`visit`](crate::visit)
/// functions. Independent registries can be built with [`Registry::new`],
/// which is how the tests exercise isolated trees.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use logging::Registry;
///
/// let registry = Registry::new();
/// let first = registry.lookup("db:pool");
/// let second = registry.lookup("db:pool");
///
/// assert!(Arc::ptr_eq(&first, &second));
/// assert!(registry.contains("db"));
/// assert_eq!(registry.names(), vec!["", "db", "db:pool"]);
/// ```
pub struct Registry {
    loggers: DashMap<LoggerName, Arc<Logger>, FxBuildHasher>,
    root: Arc<Logger>,
    /// Rules last applied; new loggers take their initial level from here.
    rules: RwLock<Arc<LevelRules>>,
    /// Serializes rule application so visits never interleave.
    applying: Mutex<()>,
    /// Root sinks installed by configuration key, see [`Registry::set_root_sink`].
    keyed_sinks: Mutex<BTreeMap<String, Arc<dyn Sink>>>,
}

impl Registry {
    /// Creates a registry holding only the root logger.
    pub fn new() -> Self {
        let root = Arc::new(Logger::new("", None, Level::default()));
        let loggers = DashMap::with_hasher(FxBuildHasher);
        loggers.insert(LoggerName::from(""), Arc::clone(&root));
        Self {
            loggers,
            root,
            rules: RwLock::new(Arc::new(LevelRules::empty())),
            applying: Mutex::new(()),
            keyed_sinks: Mutex::new(BTreeMap::new()),
        }
    }

    /// The process-wide registry, created on first use.
    pub fn global() -> &'static Arc<Self> {
        static GLOBAL: OnceLock<Arc<Registry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(Self::new()))
    }

    /// The root logger, ancestor of every other logger.
    pub fn root(&self) -> Arc<Logger> {
        Arc::clone(&self.root)
    }

    /// Returns the logger called `name`, creating it and any missing ancestors.
    ///
    /// Repeated and concurrent lookups of one name all return the same node.
    /// Missing ancestors are created top-down, and all of them share the
    /// storage of `name`, so the depth of a name costs no stack and no extra
    /// name allocations.
    pub fn lookup(&self, name: &str) -> Arc<Logger> {
        if let Some(existing) = self.loggers.get(name) {
            return Arc::clone(existing.value());
        }

        // Byte lengths of the prefixes of `name` that are not registered yet,
        // deepest first. The root always exists, so the walk ends there.
        let mut missing = vec![name.len()];
        let mut parent = self.root();
        let mut current = name;
        while let Some(up) = parent_name(current) {
            if let Some(existing) = self.loggers.get(up) {
                parent = Arc::clone(existing.value());
                break;
            }
            missing.push(up.len());
            current = up;
        }

        let source: Arc<str> = Arc::from(name);
        // Holding the rules read lock across insertion orders creation against
        // `apply_rules`: a node is either present for its visit or sees its rules.
        let rules = self.rules.read().unwrap_or_else(PoisonError::into_inner);
        for len in missing.into_iter().rev() {
            let key = LoggerName::prefix(&source, len);
            let level = rules.level_for(key.as_str());
            let node = Arc::clone(
                self.loggers
                    .entry(key.clone())
                    .or_insert_with(|| {
                        Arc::new(Logger::new(key, Some(Arc::clone(&parent)), level))
                    })
                    .value(),
            );
            parent = node;
        }
        parent
    }

    /// Calls `f` once for every logger registered when the visit starts.
    ///
    /// Loggers are visited in no particular order. `f` runs without any
    /// registry lock held, so it may itself look up loggers.
    pub fn visit<F>(&self, mut f: F)
    where
        F: FnMut(&Arc<Logger>),
    {
        for logger in self.snapshot() {
            f(&logger);
        }
    }

    /// Sorted names of every registered logger, including the root (`""`).
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .loggers
            .iter()
            .map(|entry| entry.key().as_str().to_owned())
            .collect();
        names.sort_unstable();
        names
    }

    /// Whether a logger called `name` exists. Never creates one.
    pub fn contains(&self, name: &str) -> bool {
        self.loggers.contains_key(name)
    }

    /// Number of registered loggers, including the root.
    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    /// Whether no logger is registered. A registry holds its root from
    /// construction, so this only reports `true` for a broken invariant.
    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }

    /// Rules currently in effect.
    pub fn rules(&self) -> Arc<LevelRules> {
        Arc::clone(&self.rules.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Makes `rules` authoritative and recomputes every logger's threshold.
    ///
    /// Loggers matching no rule go back to [`Level::Info`], discarding any
    /// level set earlier by hand or by a previous rule set. Loggers created
    /// afterwards start at the level these rules give them.
    pub fn apply_rules(&self, rules: LevelRules) {
        let _serial = self.applying.lock().unwrap_or_else(PoisonError::into_inner);
        let rules = Arc::new(rules);
        *self.rules.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&rules);

        let mut visited = 0_usize;
        self.visit(|logger| {
            logger.set_level(rules.level_for(logger.name()));
            visited += 1;
        });

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "logging::config",
            rules = rules.len(),
            loggers = visited,
            "applied level rules"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = visited;
    }

    /// Installs `sink` on the root under `key`, or detaches the sink held
    /// there when `sink` is `None`. Returns the sink previously held by `key`.
    ///
    /// Each key owns at most one root sink, so enabling a destination twice
    /// replaces it rather than duplicating output. Only sinks installed
    /// through this method are ever detached by it; sinks attached with
    /// [`Logger::add_sink`] stay where they are.
    pub fn set_root_sink(&self, key: &str, sink: Option<Arc<dyn Sink>>) -> Option<Arc<dyn Sink>> {
        let mut keyed = self.keyed_sinks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(held) = keyed.get(key)
            && let Some(next) = &sink
            && Arc::ptr_eq(held, next)
        {
            return Some(Arc::clone(held));
        }

        let previous = keyed.remove(key);
        if let Some(previous) = &previous {
            self.root.remove_sink(previous);
        }
        if let Some(sink) = sink {
            self.root.add_sink(Arc::clone(&sink));
            keyed.insert(key.to_owned(), sink);
        }
        previous
    }

    /// The root sink installed under `key`, if any.
    pub fn root_sink(&self, key: &str) -> Option<Arc<dyn Sink>> {
        self.keyed_sinks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Sorted keys that currently hold a root sink.
    pub fn root_sink_keys(&self) -> Vec<String> {
        self.keyed_sinks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    fn snapshot(&self) -> Vec<Arc<Logger>> {
        self.loggers
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("loggers", &self.loggers.len())
            .field("rules", &self.rules().len())
            .field("root_sinks", &self.root_sink_keys())
            .finish()
    }
}
