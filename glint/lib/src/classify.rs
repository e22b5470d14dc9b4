//! The rule cascade mapping an environment [`Snapshot`] to a [`ColorLevel`].
//!
//! Rules are checked in a fixed order and the first match wins:
//!
//! 1. `NO_COLOR` (anything non-empty) disables color outright
//! 2. `FORCE_COLOR` forces truecolor
//! 3. `COLOR_24`, `COLOR_256`, `COLOR_16` pick a level explicitly
//! 4. `COLORTERM` of `truecolor`/`24bit` or `256color`
//! 5. `TERM` exact matches (`xterm-256color`, `xterm`, `dumb`, ...)
//! 6. Windows Terminal (`WT_SESSION`, `WT_PROFILE_ID`)
//! 7. Legacy ANSI consoles (`ANSICON`, `ConEmuANSI=ON`)
//! 8. `TERM_PROGRAM` naming a truecolor terminal
//! 9. `CI`
//! 10. Termux (`TERMUX_VERSION`)
//! 11. WSL (`WSLENV`)
//! 12. SSH (`SSH_CONNECTION`)
//! 13. Otherwise basic 16 colors
//!
//! Explicit user choices come first, then exact terminal identities, then
//! circumstantial hints. Reordering the rules changes results.

use crate::env::{EnvVar, Snapshot};
use crate::level::ColorLevel;

/// `TERM` values known to support the 256 color palette.
pub const EXTENDED_TERMS: &[&str] = &[
    "xterm-256color",
    "screen-256color",
    "tmux-256color",
    "rxvt-256color",
];

/// `TERM` values known to support the basic 16 colors.
pub const BASIC_TERMS: &[&str] = &["xterm", "screen", "tmux", "rxvt"];

/// `TERM_PROGRAM` values of terminal emulators with 24-bit color.
///
/// Only `iTerm.app` is trusted here. Other emulators that advertise truecolor
/// are expected to say so through `COLORTERM`.
pub const TRUECOLOR_PROGRAMS: &[&str] = &["iTerm.app"];

/// Classifies the color capability described by `snapshot`.
///
/// Pure and deterministic: the same snapshot always yields the same level,
/// and every snapshot (including an empty one) yields some level.
///
/// ## Examples
///
/// ```
/// use glint::{classify, ColorLevel, EnvVar, Snapshot};
///
/// let env = Snapshot::empty().with(EnvVar::ColorTerm, "truecolor");
/// assert_eq!(classify(&env), ColorLevel::TrueColor);
///
/// // NO_COLOR beats everything else
/// let env = env.with(EnvVar::NoColor, "1");
/// assert_eq!(classify(&env), ColorLevel::None);
///
/// // nothing recognizable still gets basic color
/// assert_eq!(classify(&Snapshot::empty()), ColorLevel::Basic);
/// ```
pub fn classify(snapshot: &Snapshot) -> ColorLevel {
    let (level, source) = cascade(snapshot);
    tracing::debug!(
        color_level = ?level,
        source,
        "Classified terminal color level"
    );
    level
}

/// Runs the cascade, returning the level and the name of the deciding signal.
fn cascade(env: &Snapshot) -> (ColorLevel, &'static str) {
    if env.is_set(EnvVar::NoColor) {
        return (ColorLevel::None, EnvVar::NoColor.name());
    }

    if env.is_set(EnvVar::ForceColor) {
        return (ColorLevel::TrueColor, EnvVar::ForceColor.name());
    }

    if env.is_set(EnvVar::Color24) {
        return (ColorLevel::TrueColor, EnvVar::Color24.name());
    }
    if env.is_set(EnvVar::Color256) {
        return (ColorLevel::Extended, EnvVar::Color256.name());
    }
    if env.is_set(EnvVar::Color16) {
        return (ColorLevel::Basic, EnvVar::Color16.name());
    }

    match env.get(EnvVar::ColorTerm) {
        "truecolor" | "24bit" => return (ColorLevel::TrueColor, EnvVar::ColorTerm.name()),
        "256color" => return (ColorLevel::Extended, EnvVar::ColorTerm.name()),
        _ => {}
    }

    let term = env.get(EnvVar::Term);
    if EXTENDED_TERMS.contains(&term) {
        return (ColorLevel::Extended, EnvVar::Term.name());
    }
    if BASIC_TERMS.contains(&term) {
        return (ColorLevel::Basic, EnvVar::Term.name());
    }
    if term == "dumb" {
        return (ColorLevel::None, EnvVar::Term.name());
    }

    if env.is_set(EnvVar::WtSession) {
        return (ColorLevel::TrueColor, EnvVar::WtSession.name());
    }
    if env.is_set(EnvVar::WtProfileId) {
        return (ColorLevel::TrueColor, EnvVar::WtProfileId.name());
    }

    if env.is_set(EnvVar::Ansicon) {
        return (ColorLevel::Extended, EnvVar::Ansicon.name());
    }
    if env.get(EnvVar::ConEmuAnsi) == "ON" {
        return (ColorLevel::Extended, EnvVar::ConEmuAnsi.name());
    }

    if TRUECOLOR_PROGRAMS.contains(&env.get(EnvVar::TermProgram)) {
        return (ColorLevel::TrueColor, EnvVar::TermProgram.name());
    }

    // CI logs usually render at least the basic palette
    if env.is_set(EnvVar::Ci) {
        return (ColorLevel::Basic, EnvVar::Ci.name());
    }

    if env.is_set(EnvVar::TermuxVersion) {
        return (ColorLevel::Extended, EnvVar::TermuxVersion.name());
    }

    if env.is_set(EnvVar::WslEnv) {
        return (ColorLevel::Extended, EnvVar::WslEnv.name());
    }

    if env.is_set(EnvVar::SshConnection) {
        return (ColorLevel::Extended, EnvVar::SshConnection.name());
    }

    (ColorLevel::Basic, "default")
}
