//! crates/logging-sink/src/config.rs
//! Configuration keys that switch the standard root sinks on and off.
//!
//! Each standard destination has one key. Enabling a key attaches the
//! matching sink to the root logger through
//! [`ConfigBridge::set_root_sink`]; disabling it detaches that sink again.
//! Sinks attached to the root by hand are never touched.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use logging::{ConfigBridge, Sink};
use thiserror::Error;

#[cfg(unix)]
use crate::syslog::{
    DEFAULT_SYSLOG_TAG, SyslogConfig, SyslogFacility, SyslogOpenError, SyslogSink,
};
use crate::writer::WriterSink;

/// Errors raised while reading or applying sink settings.
#[derive(Debug, Error)]
pub enum SinkConfigError {
    /// The key is not one of [`SinkSettings::KEYS`].
    #[error("unknown sink key: {0:?}")]
    UnknownKey(String),
    /// The value cannot be interpreted for `key`.
    #[error("invalid value {value:?} for {key}")]
    InvalidValue {
        /// Key being set.
        key: &'static str,
        /// The rejected value.
        value: String,
    },
    /// The log file could not be opened for appending.
    #[error("cannot open log file {}: {source}", path.display())]
    File {
        /// Path from `log.file`.
        path: PathBuf,
        /// Why opening failed.
        #[source]
        source: io::Error,
    },
    /// The syslog connection could not be opened.
    #[cfg(unix)]
    #[error(transparent)]
    Syslog(#[from] SyslogOpenError),
}

/// Which standard sinks the root logger should carry.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use logging::{ConfigBridge, Registry};
/// use logging_sink::SinkSettings;
///
/// let bridge = ConfigBridge::new(Arc::new(Registry::new()));
/// let mut settings = SinkSettings::default();
/// settings.set("log.stderr", "true")?;
/// settings.apply(&bridge)?;
/// assert_eq!(bridge.root_sink_keys(), vec!["log.stderr"]);
///
/// settings.set("log.stderr", "off")?;
/// settings.apply(&bridge)?;
/// assert!(bridge.root_sink_keys().is_empty());
/// # Ok::<(), logging_sink::SinkConfigError>(())
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SinkSettings {
    /// Write full-format lines to standard output.
    pub stdout: bool,
    /// Write full-format lines to standard error.
    pub stderr: bool,
    /// Append full-format lines to this file.
    pub file: Option<PathBuf>,
    /// Forward records to syslog(3).
    #[cfg(unix)]
    pub syslog: Option<SyslogConfig>,
}

impl SinkSettings {
    /// Key enabling the standard output sink.
    pub const STDOUT: &'static str = "log.stdout";
    /// Key enabling the standard error sink.
    pub const STDERR: &'static str = "log.stderr";
    /// Key naming the file sink's path.
    pub const FILE: &'static str = "log.file";
    /// Key naming the syslog facility, optionally followed by `/tag`.
    pub const SYSLOG: &'static str = "log.syslog";

    /// Every recognised key.
    pub const KEYS: [&'static str; 4] = [Self::STDOUT, Self::STDERR, Self::FILE, Self::SYSLOG];

    /// Builds settings from `(key, value)` pairs, rejecting unknown keys.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, SinkConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut settings = Self::default();
        for (key, value) in pairs {
            settings.set(key.as_ref(), value.as_ref())?;
        }
        Ok(settings)
    }

    /// Sets one key from its textual value.
    ///
    /// `log.stdout` and `log.stderr` take a boolean (`true`/`false`, `on`/`off`,
    /// `yes`/`no`, `1`/`0`). `log.file` takes a path. `log.syslog` takes a
    /// facility name such as `daemon` or `local3/my-tag`. An empty value, or
    /// `off` for the last two, disables the sink.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SinkConfigError> {
        match key {
            Self::STDOUT => self.stdout = parse_switch(Self::STDOUT, value)?,
            Self::STDERR => self.stderr = parse_switch(Self::STDERR, value)?,
            Self::FILE => {
                self.file = (!is_off(value)).then(|| PathBuf::from(value));
            }
            Self::SYSLOG => self.set_syslog(value)?,
            _ => return Err(SinkConfigError::UnknownKey(key.to_owned())),
        }
        Ok(())
    }

    #[cfg(unix)]
    fn set_syslog(&mut self, value: &str) -> Result<(), SinkConfigError> {
        if is_off(value) {
            self.syslog = None;
            return Ok(());
        }
        let (facility, tag) = value.split_once('/').unwrap_or((value, DEFAULT_SYSLOG_TAG));
        let facility = SyslogFacility::from_name(facility.trim()).ok_or_else(|| {
            SinkConfigError::InvalidValue {
                key: Self::SYSLOG,
                value: value.to_owned(),
            }
        })?;
        self.syslog = Some(SyslogConfig::new(facility, tag));
        Ok(())
    }

    #[cfg(not(unix))]
    fn set_syslog(&mut self, value: &str) -> Result<(), SinkConfigError> {
        if is_off(value) {
            return Ok(());
        }
        Err(SinkConfigError::InvalidValue {
            key: Self::SYSLOG,
            value: value.to_owned(),
        })
    }

    /// Attaches the enabled sinks to the bridge's root logger and detaches
    /// the disabled ones.
    ///
    /// The log file and the syslog connection are opened before anything is
    /// attached, so a failure leaves the other destinations as they were.
    /// Switching syslog to another tag releases the current syslog sink
    /// first, since the process holds a single connection. An enabled stdout
    /// or stderr sink that is already attached is kept.
    pub fn apply(&self, bridge: &ConfigBridge) -> Result<(), SinkConfigError> {
        let file = match &self.file {
            Some(path) => Some(shared(WriterSink::file(path).map_err(|source| {
                SinkConfigError::File {
                    path: path.clone(),
                    source,
                }
            })?)),
            None => None,
        };
        #[cfg(unix)]
        let syslog = match &self.syslog {
            Some(config) => Some(open_syslog(bridge, config)?),
            None => None,
        };
        #[cfg(not(unix))]
        let syslog = None;

        toggle(bridge, Self::STDOUT, self.stdout, || shared(WriterSink::stdout()));
        toggle(bridge, Self::STDERR, self.stderr, || shared(WriterSink::stderr()));
        bridge.set_root_sink(Self::FILE, file);
        bridge.set_root_sink(Self::SYSLOG, syslog);
        Ok(())
    }
}

fn shared<S: Sink + 'static>(sink: S) -> Arc<dyn Sink> {
    Arc::new(sink)
}

fn toggle(
    bridge: &ConfigBridge,
    key: &str,
    enabled: bool,
    build: impl FnOnce() -> Arc<dyn Sink>,
) {
    if !enabled {
        bridge.set_root_sink(key, None);
    } else if bridge.registry().root_sink(key).is_none() {
        bridge.set_root_sink(key, Some(build()));
    }
}

/// Opens a syslog sink, releasing the one installed under `log.syslog` first
/// when it holds the connection under another tag.
#[cfg(unix)]
fn open_syslog(
    bridge: &ConfigBridge,
    config: &SyslogConfig,
) -> Result<Arc<dyn Sink>, SinkConfigError> {
    match SyslogSink::open(config) {
        Ok(sink) => Ok(shared(sink)),
        Err(SyslogOpenError::TagInUse { .. })
            if bridge.registry().root_sink(SinkSettings::SYSLOG).is_some() =>
        {
            drop(bridge.set_root_sink(SinkSettings::SYSLOG, None));
            Ok(shared(SyslogSink::open(config)?))
        }
        Err(error) => Err(error.into()),
    }
}

fn is_off(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("off")
}

fn parse_switch(key: &'static str, value: &str) -> Result<bool, SinkConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "" | "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(SinkConfigError::InvalidValue {
            key,
            value: value.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logging::Registry;

    use crate::memory::MemorySink;

    fn bridge() -> ConfigBridge {
        ConfigBridge::new(Arc::new(Registry::new()))
    }

    #[test]
    fn switches_accept_common_spellings() {
        let mut settings = SinkSettings::default();
        for value in ["true", "ON", "yes", "1"] {
            settings.set(SinkSettings::STDOUT, value).unwrap();
            assert!(settings.stdout, "{value}");
        }
        for value in ["false", "Off", "no", "0", ""] {
            settings.set(SinkSettings::STDOUT, value).unwrap();
            assert!(!settings.stdout, "{value}");
        }
    }

    #[test]
    fn bad_switch_value_is_rejected() {
        let err = SinkSettings::default()
            .set(SinkSettings::STDERR, "loud")
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid value \"loud\" for log.stderr");
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = SinkSettings::from_pairs([("log.pager", "true")]).unwrap_err();
        assert!(matches!(err, SinkConfigError::UnknownKey(key) if key == "log.pager"));
    }

    #[test]
    fn file_key_takes_a_path_and_clears_on_empty() {
        let mut settings = SinkSettings::default();
        settings.set(SinkSettings::FILE, "/var/log/app.log").unwrap();
        assert_eq!(settings.file, Some(PathBuf::from("/var/log/app.log")));
        settings.set(SinkSettings::FILE, "").unwrap();
        assert_eq!(settings.file, None);
    }

    #[cfg(unix)]
    #[test]
    fn syslog_key_parses_facility_and_tag() {
        let mut settings = SinkSettings::default();
        settings.set(SinkSettings::SYSLOG, "daemon").unwrap();
        assert_eq!(
            settings.syslog,
            Some(SyslogConfig::new(SyslogFacility::Daemon, DEFAULT_SYSLOG_TAG))
        );
        settings.set(SinkSettings::SYSLOG, "local3/my-daemon").unwrap();
        assert_eq!(
            settings.syslog,
            Some(SyslogConfig::new(SyslogFacility::Local3, "my-daemon"))
        );
        settings.set(SinkSettings::SYSLOG, "off").unwrap();
        assert_eq!(settings.syslog, None);

        let err = settings.set(SinkSettings::SYSLOG, "local9").unwrap_err();
        assert!(matches!(err, SinkConfigError::InvalidValue { key: "log.syslog", .. }));
    }

    #[test]
    fn stdout_and_stderr_keys_attach_and_detach() {
        let bridge = bridge();
        let mut settings =
            SinkSettings::from_pairs([("log.stdout", "1"), ("log.stderr", "1")]).unwrap();
        settings.apply(&bridge).unwrap();
        assert_eq!(bridge.root_sink_keys(), vec!["log.stderr", "log.stdout"]);
        assert_eq!(bridge.registry().root().sinks().len(), 2);

        settings.stdout = false;
        settings.apply(&bridge).unwrap();
        assert_eq!(bridge.root_sink_keys(), vec!["log.stderr"]);
        assert_eq!(bridge.registry().root().sinks().len(), 1);
    }

    #[test]
    fn reapplying_keeps_existing_console_sink() {
        let bridge = bridge();
        let settings = SinkSettings::from_pairs([("log.stderr", "yes")]).unwrap();
        settings.apply(&bridge).unwrap();
        let first = bridge.registry().root_sink(SinkSettings::STDERR).unwrap();

        settings.apply(&bridge).unwrap();

        let second = bridge.registry().root_sink(SinkSettings::STDERR).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(bridge.registry().root().sinks().len(), 1);
    }

    #[test]
    fn manual_root_sinks_survive_every_setting() {
        let bridge = bridge();
        let manual = Arc::new(MemorySink::new());
        bridge.registry().root().add_sink(manual.clone());

        SinkSettings::from_pairs([("log.stdout", "on")])
            .unwrap()
            .apply(&bridge)
            .unwrap();
        SinkSettings::default().apply(&bridge).unwrap();

        let attached = bridge.registry().root().sinks();
        assert_eq!(attached.len(), 1);
        logging::info!(bridge.registry().lookup("app"), "kept");
        assert_eq!(manual.messages(), vec!["kept"]);
    }

    #[test]
    fn unopenable_file_changes_nothing() {
        let bridge = bridge();
        SinkSettings::from_pairs([("log.stderr", "on")])
            .unwrap()
            .apply(&bridge)
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let settings = SinkSettings::from_pairs([
            ("log.stdout", "on"),
            ("log.file", dir.path().to_str().unwrap()),
        ])
        .unwrap();
        let err = settings.apply(&bridge).unwrap_err();

        assert!(matches!(err, SinkConfigError::File { .. }));
        assert_eq!(bridge.root_sink_keys(), vec!["log.stderr"]);
    }
}
