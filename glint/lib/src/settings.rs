//! Debug settings read from the `GLINT_DEBUG` environment variable.
//!
//! The variable holds comma-separated `key=value` pairs, for example
//! `GLINT_DEBUG=forcecolor=1`. Recognized keys:
//!
//! - `forcecolor` (`1` or `0`): when `1`, forcing color on skips enabling
//!   virtual-terminal processing on the console. Automatic detection is not
//!   affected: a stdout that is not a terminal still gets no color.
//!
//! Unknown keys are ignored. A recognized key with an unusable value is
//! reported as [`GlintError::InvalidSetting`] and ignored.

use crate::env::EnvSource;
use crate::error::{GlintError, Result};

/// The environment variable debug settings are read from.
pub const DEBUG_VAR: &str = "GLINT_DEBUG";

/// Debug switches that alter how forcing color treats the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    /// Leave the console mode alone when color is forced on.
    pub skip_virtual_terminal: bool,
}

impl Settings {
    /// Reads settings from `GLINT_DEBUG` in `source`.
    ///
    /// Never fails: invalid entries are logged and skipped.
    pub fn from_source(source: &dyn EnvSource) -> Self {
        let raw = source.var(DEBUG_VAR).unwrap_or_default();
        let mut settings = Settings::default();
        for entry in raw.split(',').filter(|entry| !entry.trim().is_empty()) {
            if let Err(e) = settings.apply(entry) {
                tracing::debug!(error = %e, entry, "Ignoring GLINT_DEBUG entry");
            }
        }
        settings
    }

    /// Parses settings from a `key=value,key=value` string.
    ///
    /// ## Examples
    ///
    /// ```
    /// use glint::settings::Settings;
    ///
    /// let settings = Settings::parse("foo=bar,forcecolor=1").unwrap();
    /// assert!(settings.skip_virtual_terminal);
    ///
    /// assert!(Settings::parse("forcecolor=maybe").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let mut settings = Settings::default();
        for entry in raw.split(',').filter(|entry| !entry.trim().is_empty()) {
            settings.apply(entry)?;
        }
        Ok(settings)
    }

    fn apply(&mut self, entry: &str) -> Result<()> {
        let (key, value) = entry.split_once('=').unwrap_or((entry, ""));
        match key.trim() {
            "forcecolor" => {
                self.skip_virtual_terminal = parse_flag(key, value)?;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim() {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(GlintError::InvalidSetting {
            key: key.trim().to_string(),
            value: other.to_string(),
        }),
    }
}
