//! crates/logging/src/tracing_bridge.rs
//! Bridge from the tracing crate into the logger hierarchy.
//!
//! [`HierarchyLayer`] is a tracing-subscriber layer that turns every tracing
//! event into a log call on the logger named after the event's target. Rust
//! module paths map onto logger names by swapping `::` for `:`, so an event
//! from `app::net::http` lands on logger `app:net:http` and reaches whatever
//! sinks hang off `app:net`, `app` and the root.
//!
//! # Usage
//!
//! ```rust,ignore
//! use logging::{Registry, init_tracing};
//!
//! init_tracing(std::sync::Arc::clone(Registry::global()))?;
//!
//! tracing::info!(target: "app::net", "listening");
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use tracing::Subscriber;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::level::Level;
use crate::record::Record;
use crate::registry::{Registry, SEPARATOR};

/// Targets used by this crate's own diagnostics; never bridged back in.
const OWN_TARGET: &str = "logging";

/// Path separator in tracing targets.
const MODULE_SEPARATOR: &str = "::";

/// A tracing layer that routes events to loggers in a [`Registry`].
#[derive(Clone, Debug)]
pub struct HierarchyLayer {
    registry: Arc<Registry>,
}

impl HierarchyLayer {
    /// Creates a layer feeding `registry`.
    #[must_use]
    pub const fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Map a tracing target to a logger name. Single-segment targets are
    /// borrowed as-is.
    fn target_to_logger_name(target: &str) -> Cow<'_, str> {
        if !target.contains(MODULE_SEPARATOR) {
            return Cow::Borrowed(target);
        }
        let mut name = String::with_capacity(target.len());
        for (index, segment) in target.split(MODULE_SEPARATOR).enumerate() {
            if index > 0 {
                name.push(SEPARATOR);
            }
            name.push_str(segment);
        }
        Cow::Owned(name)
    }

    /// Map a tracing level to a log level.
    const fn map_level(level: tracing::Level) -> Level {
        match level {
            tracing::Level::ERROR => Level::Error,
            tracing::Level::WARN => Level::Warning,
            tracing::Level::INFO => Level::Info,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::TRACE => Level::Trace,
        }
    }

    fn is_own_target(target: &str) -> bool {
        target == OWN_TARGET
            || target
                .strip_prefix(OWN_TARGET)
                .is_some_and(|rest| rest.starts_with(MODULE_SEPARATOR))
    }
}

impl<S> Layer<S> for HierarchyLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let target = metadata.target();
        if Self::is_own_target(target) {
            return;
        }

        let logger = self.registry.lookup(&Self::target_to_logger_name(target));
        let level = Self::map_level(*metadata.level());
        if !logger.is_enabled_for(level) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let mut record = Record::new(level, logger.name(), visitor.message.unwrap_or_default());
        if let (Some(file), Some(line)) = (metadata.file(), metadata.line()) {
            record = record.with_location(file, line);
        }
        logger.log_record(&record);
    }
}

/// Visitor to extract the message from a tracing event.
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        }
    }
}

/// Installs a global tracing subscriber that feeds `registry`.
///
/// Fails if a global subscriber is already installed.
///
/// # Example
///
/// ```rust,ignore
/// use logging::{Registry, init_tracing};
///
/// init_tracing(std::sync::Arc::clone(Registry::global()))?;
/// tracing::warn!(target: "app::db", "slow query");
/// ```
pub fn init_tracing(
    registry: Arc<Registry>,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(HierarchyLayer::new(registry))
        .try_init()
}
