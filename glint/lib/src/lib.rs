//! # glint
//!
//! Decide whether a process should emit ANSI color, and at what fidelity.
//!
//! Output redirected to a file or a pipe should stay free of escape codes,
//! while an interactive terminal gets the richest palette it can display.
//! This crate answers both questions:
//!
//! - **Terminal Gate**: is stdout a real terminal (or an MSYS2/Cygwin pty)?
//! - **Color Level**: `None`, `Basic` (16), `Extended` (256) or `TrueColor`
//! - **Overrides**: force color on or off, then reset to automatic detection
//! - **Legacy Consoles**: enable virtual-terminal processing on Windows
//!
//! ## Quick Start
//!
//! ```
//! use glint::{ColorLevel, ColorSupport};
//!
//! let support = ColorSupport::new();
//!
//! if support.color_level() >= ColorLevel::Extended {
//!     println!("\x1b[38;5;208morange\x1b[0m");
//! } else if support.color_supported() {
//!     println!("\x1b[33myellow\x1b[0m");
//! } else {
//!     println!("plain");
//! }
//! ```
//!
//! ## Modules
//!
//! - [`support`] - the `ColorSupport` facade (memoization, force/reset)
//! - [`classify`] - the ordered rule cascade mapping environment to level
//! - [`env`] - recognized environment variables and the snapshot cache
//! - [`level`] - the `ColorLevel` enumeration
//! - [`terminal`] - terminal tests for standard streams
//! - [`console`] - virtual-terminal processing on legacy consoles
//! - [`settings`] - debug settings read from `GLINT_DEBUG`

pub mod classify;
pub mod console;
pub mod env;
pub mod error;
pub mod level;
pub mod settings;
pub mod support;
pub mod terminal;

mod memo;

pub use classify::classify;
pub use env::{EnvCache, EnvVar, Snapshot};
pub use error::{GlintError, Result};
pub use level::ColorLevel;
pub use support::{ColorSupport, ColorSupportBuilder, Override};
pub use terminal::{Stream, is_compatibility_terminal, is_terminal};
