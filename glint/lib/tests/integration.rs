//! Integration tests for the glint library.
//!
//! These run against the real process environment and the real terminal
//! tests, so they only assert what holds regardless of how the test harness
//! wires up stdout.

use std::env;

use glint::terminal::{HostTerminal, TerminalProbe};
use glint::{ColorLevel, ColorSupport, EnvCache, Override, Stream, is_compatibility_terminal, is_terminal};
use serial_test::serial;

/// Sets an environment variable for the lifetime of the guard.
struct ScopedEnv {
    key: &'static str,
    original: Option<String>,
}

impl ScopedEnv {
    fn set(key: &'static str, value: &str) -> Self {
        let original = env::var(key).ok();
        // SAFETY: every test touching the environment is #[serial]
        unsafe { env::set_var(key, value) };
        Self { key, original }
    }

    fn remove(key: &'static str) -> Self {
        let original = env::var(key).ok();
        // SAFETY: as above
        unsafe { env::remove_var(key) };
        Self { key, original }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        match &self.original {
            Some(value) => unsafe { env::set_var(self.key, value) },
            None => unsafe { env::remove_var(self.key) },
        }
    }
}

// ============================================================================
// Facade against the host
// ============================================================================

#[test]
#[serial]
fn host_support_is_consistent() {
    let support = ColorSupport::new();
    let supported = support.color_supported();
    let level = support.color_level();

    assert_eq!(supported, level != ColorLevel::None);
    assert_eq!(support.override_state(), Override::Unset);
}

#[test]
#[serial]
fn host_support_is_stable_across_calls() {
    let support = ColorSupport::new();
    let first = support.color_supported();
    let level = support.color_level();

    for _ in 0..100 {
        assert_eq!(support.color_supported(), first);
        assert_eq!(support.color_level(), level);
    }
}

#[test]
#[serial]
fn no_color_vetoes_force() {
    let _no_color = ScopedEnv::set("NO_COLOR", "1");
    let _debug = ScopedEnv::remove("GLINT_DEBUG");

    let support = ColorSupport::new();
    support.force_color(true);

    assert_eq!(support.override_state(), Override::ForcedOff);
    assert!(!support.color_supported());
    assert_eq!(support.color_level(), ColorLevel::None);
}

#[test]
#[serial]
fn force_without_no_color_enables_color() {
    let _no_color = ScopedEnv::remove("NO_COLOR");

    let support = ColorSupport::new();
    support.force_color(true);

    assert!(support.color_supported());
    assert!(support.color_level() >= ColorLevel::Basic);
}

#[test]
#[serial]
fn reset_restores_automatic_detection() {
    let _no_color = ScopedEnv::remove("NO_COLOR");

    let support = ColorSupport::new();
    let automatic = support.color_supported();

    support.force_color(!automatic);
    assert_eq!(support.color_supported(), !automatic);

    support.reset_color();
    assert_eq!(support.color_supported(), automatic);
}

#[test]
#[serial]
fn debug_setting_does_not_bypass_terminal_gate() {
    let _debug = ScopedEnv::set("GLINT_DEBUG", "forcecolor=1");
    let _no_color = ScopedEnv::remove("NO_COLOR");
    let _force = ScopedEnv::remove("FORCE_COLOR");
    let _color_term = ScopedEnv::set("COLORTERM", "truecolor");

    let support = ColorSupport::new();
    let is_terminal = HostTerminal.is_any_terminal(Stream::Stdout);

    assert!(support.settings().skip_virtual_terminal);
    assert_eq!(support.is_stdout_terminal(), is_terminal);
    assert_eq!(support.color_supported(), is_terminal);
    if !is_terminal {
        assert_eq!(support.color_level(), ColorLevel::None);
    }
}

// ============================================================================
// Environment cache
// ============================================================================

#[test]
#[serial]
fn env_cache_snapshots_process_environment() {
    let _term = ScopedEnv::set("TERM", "screen-256color");

    let cache = EnvCache::new();
    assert_eq!(cache.get("TERM"), "screen-256color");

    let _changed = ScopedEnv::set("TERM", "dumb");
    assert_eq!(cache.get("TERM"), "screen-256color");

    cache.invalidate();
    assert_eq!(cache.get("TERM"), "dumb");
}

#[test]
fn env_cache_ignores_unrecognized_names() {
    let cache = EnvCache::new();
    assert_eq!(cache.get("PATH"), "");
    assert_eq!(cache.get("definitely not a variable"), "");
    assert!(!cache.is_initialized());
}

// ============================================================================
// Terminal tests
// ============================================================================

#[test]
fn terminal_functions_dont_panic() {
    for stream in [Stream::Stdin, Stream::Stdout, Stream::Stderr] {
        let _ = is_terminal(stream);
        let _ = is_compatibility_terminal(stream);
        let _ = HostTerminal.is_any_terminal(stream);
    }
}

#[test]
fn level_descriptions_are_distinct() {
    let descriptions: Vec<_> = ColorLevel::ALL.iter().map(|l| l.description()).collect();
    for (i, a) in descriptions.iter().enumerate() {
        for b in descriptions.iter().skip(i + 1) {
            assert_ne!(a, b);
        }
    }
}
