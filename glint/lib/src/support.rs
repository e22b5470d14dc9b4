//! The `ColorSupport` facade.
//!
//! [`ColorSupport`] is the one object an application needs: construct it at
//! startup, share it (it is `Send + Sync`), and ask it whether to emit color.
//!
//! - Answers are computed once and memoized until [`ColorSupport::reset_color`].
//! - [`ColorSupport::force_color`] overrides detection, except that a
//!   non-empty `NO_COLOR` always wins over forcing color on.
//! - Forcing color on enables virtual-terminal processing on Windows.
//!
//! Nothing here returns an error: every failure resolves to "no color" or to
//! the best answer available.

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use serde::Serialize;

use crate::classify::classify;
use crate::console::{Console, HostConsole};
use crate::env::{EnvCache, EnvSource, EnvVar, ProcessEnv};
use crate::level::ColorLevel;
use crate::memo::Memo;
use crate::settings::Settings;
use crate::terminal::{HostTerminal, Stream, TerminalProbe};

/// Description returned when stdout is not a terminal.
pub const NOT_A_TERMINAL: &str = "Error: Output is not a terminal.";

/// A manual decision that bypasses automatic detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Override {
    /// automatic detection decides
    #[default]
    Unset,
    ForcedOn,
    ForcedOff,
}

/// Decides whether stdout should receive ANSI color, and at what level.
///
/// ## Examples
///
/// ```
/// use std::collections::HashMap;
///
/// use glint::{ColorLevel, ColorSupport};
/// use glint::terminal::TerminalProbe;
///
/// struct AlwaysTerminal;
///
/// impl TerminalProbe for AlwaysTerminal {
///     fn is_terminal(&self, _: glint::Stream) -> bool { true }
///     fn is_compatibility_terminal(&self, _: glint::Stream) -> bool { false }
/// }
///
/// let support = ColorSupport::builder()
///     .env(HashMap::from([("COLORTERM", "truecolor")]))
///     .terminal(AlwaysTerminal)
///     .build();
///
/// assert!(support.color_supported());
/// assert_eq!(support.color_level(), ColorLevel::TrueColor);
///
/// support.force_color(false);
/// assert!(!support.color_supported());
/// assert_eq!(support.color_level(), ColorLevel::None);
///
/// support.reset_color();
/// assert!(support.color_supported());
/// ```
pub struct ColorSupport {
    env: EnvCache,
    terminal: Box<dyn TerminalProbe>,
    console: Box<dyn Console>,
    settings: Settings,
    state: RwLock<Override>,
    supported: Memo<bool>,
    level: Memo<ColorLevel>,
    classified: Memo<ColorLevel>,
    virtual_terminal: OnceLock<bool>,
}

impl ColorSupport {
    /// Detection against the real process environment, terminal and console.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a `ColorSupport` with injected collaborators.
    pub fn builder() -> ColorSupportBuilder {
        ColorSupportBuilder::default()
    }

    /// Whether color output should be used on stdout.
    ///
    /// An active override decides directly. Otherwise the answer is `false`
    /// when stdout is not a terminal, and whether the classified level is at
    /// least [`ColorLevel::Basic`] when it is. The automatic answer is
    /// computed once per validity window.
    pub fn color_supported(&self) -> bool {
        match self.override_state() {
            Override::ForcedOn => true,
            Override::ForcedOff => false,
            Override::Unset => self
                .supported
                .get_or_init(|| self.detected_level() >= ColorLevel::Basic),
        }
    }

    /// The color level of stdout.
    ///
    /// [`ColorLevel::None`] whenever [`color_supported`](Self::color_supported)
    /// is `false`. When color is forced on, the classified level is used but
    /// never reported below [`ColorLevel::Basic`].
    pub fn color_level(&self) -> ColorLevel {
        match self.override_state() {
            Override::ForcedOn => self.classified_level().max(ColorLevel::Basic),
            Override::ForcedOff => ColorLevel::None,
            Override::Unset => self.detected_level(),
        }
    }

    /// A human-readable description of [`color_level`](Self::color_level).
    ///
    /// Without an override, a stdout that is not a terminal is described as
    /// [`NOT_A_TERMINAL`] rather than as "no color support".
    pub fn color_level_description(&self) -> &'static str {
        if self.override_state() == Override::Unset && !self.is_stdout_terminal() {
            return NOT_A_TERMINAL;
        }
        self.color_level().description()
    }

    /// Overrides automatic detection.
    ///
    /// `force_color(true)` is downgraded to forcing color off when `NO_COLOR`
    /// is set to a non-empty value. Forcing color on also enables
    /// virtual-terminal processing on hosts that need it.
    pub fn force_color(&self, enabled: bool) {
        let vetoed = enabled && self.env.snapshot().is_set(EnvVar::NoColor);
        let next = if enabled && !vetoed {
            Override::ForcedOn
        } else {
            Override::ForcedOff
        };

        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            *state = next;
            self.supported.reset();
        }

        tracing::debug!(enabled, vetoed, state = ?next, "Color override set");

        if next == Override::ForcedOn && !self.settings.skip_virtual_terminal {
            self.enable_virtual_terminal();
        }
    }

    /// Clears any override and forgets every memoized answer.
    ///
    /// The environment snapshot is dropped too, so the next query re-reads
    /// the environment and re-tests the terminal. Meant for tests and
    /// reconfiguration: it is safe next to concurrent queries, but two
    /// concurrent resets (or a reset racing `force_color`) leave the order of
    /// their effects unspecified.
    pub fn reset_color(&self) {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            *state = Override::Unset;
            // Inputs before the answers derived from them, so a concurrent
            // reader can never memoize a level built from the old snapshot.
            self.env.invalidate();
            self.classified.reset();
            self.level.reset();
            self.supported.reset();
        }
        tracing::debug!("Color detection reset");
    }

    /// The current override.
    pub fn override_state(&self) -> Override {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether stdout is a native terminal or an MSYS2/Cygwin pty.
    pub fn is_stdout_terminal(&self) -> bool {
        self.terminal.is_any_terminal(Stream::Stdout)
    }

    /// Enables ANSI processing on the console, once per `ColorSupport`.
    ///
    /// Returns whether processing was switched on. On hosts that need no
    /// change this is `false`.
    pub fn enable_virtual_terminal(&self) -> bool {
        *self
            .virtual_terminal
            .get_or_init(|| match self.console.enable_virtual_terminal() {
                Ok(enabled) => {
                    tracing::info!(enabled, "Virtual terminal processing checked");
                    enabled
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Could not enable virtual terminal processing");
                    false
                }
            })
    }

    /// The environment snapshot cache detection reads from.
    pub fn env(&self) -> &EnvCache {
        &self.env
    }

    /// The debug settings in effect.
    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// The automatic level: terminal gate plus classification, memoized.
    fn detected_level(&self) -> ColorLevel {
        self.level.get_or_init(|| {
            let is_terminal = self.is_stdout_terminal();
            let level = if is_terminal {
                self.classified_level()
            } else {
                ColorLevel::None
            };
            tracing::debug!(
                stream = %Stream::Stdout,
                is_terminal,
                color_level = ?level,
                "Detected color support"
            );
            level
        })
    }

    fn classified_level(&self) -> ColorLevel {
        self.classified
            .get_or_init(|| classify(&self.env.snapshot()))
    }
}

impl Default for ColorSupport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ColorSupport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorSupport")
            .field("override", &self.override_state())
            .field("settings", &self.settings)
            .field("supported", &self.supported.get())
            .field("level", &self.level.get())
            .finish_non_exhaustive()
    }
}

/// Builder for [`ColorSupport`]; anything left unset uses the host.
#[derive(Default)]
pub struct ColorSupportBuilder {
    env: Option<Arc<dyn EnvSource>>,
    terminal: Option<Box<dyn TerminalProbe>>,
    console: Option<Box<dyn Console>>,
    settings: Option<Settings>,
}

impl ColorSupportBuilder {
    /// Where environment variables are read from (default: the process).
    pub fn env(mut self, source: impl EnvSource + 'static) -> Self {
        self.env = Some(Arc::new(source));
        self
    }

    /// How stdout is tested for being a terminal (default: the OS).
    pub fn terminal(mut self, probe: impl TerminalProbe + 'static) -> Self {
        self.terminal = Some(Box::new(probe));
        self
    }

    /// How virtual-terminal processing is enabled (default: [`HostConsole`]).
    pub fn console(mut self, console: impl Console + 'static) -> Self {
        self.console = Some(Box::new(console));
        self
    }

    /// Debug settings (default: parsed from `GLINT_DEBUG` in the environment).
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn build(self) -> ColorSupport {
        let source = self
            .env
            .unwrap_or_else(|| Arc::new(ProcessEnv) as Arc<dyn EnvSource>);
        let settings = self
            .settings
            .unwrap_or_else(|| Settings::from_source(source.as_ref()));

        ColorSupport {
            env: EnvCache::from_shared(source),
            terminal: self
                .terminal
                .unwrap_or_else(|| Box::new(HostTerminal) as Box<dyn TerminalProbe>),
            console: self
                .console
                .unwrap_or_else(|| Box::new(HostConsole::default()) as Box<dyn Console>),
            settings,
            state: RwLock::new(Override::Unset),
            supported: Memo::new(),
            level: Memo::new(),
            classified: Memo::new(),
            virtual_terminal: OnceLock::new(),
        }
    }
}
