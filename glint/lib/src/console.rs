//! Virtual-terminal processing for legacy consoles.
//!
//! The classic Windows console only interprets ANSI escape sequences once
//! [`ENABLE_VIRTUAL_TERMINAL_PROCESSING`](https://learn.microsoft.com/en-us/windows/console/console-virtual-terminal-sequences#output-sequences)
//! is set on the output handle. Every other host understands them already.
//!
//! [`HostConsole`] is the implementation for the platform being compiled for.

use crate::error::Result;

/// Turns on ANSI escape processing for stdout where the host needs it.
pub trait Console: Send + Sync {
    /// Enables virtual-terminal processing.
    ///
    /// Returns `Ok(true)` once processing is on, and `Ok(false)` on hosts
    /// where nothing needs to change.
    fn enable_virtual_terminal(&self) -> Result<bool>;
}

/// A console that never needs configuring.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopConsole;

impl Console for NoopConsole {
    fn enable_virtual_terminal(&self) -> Result<bool> {
        Ok(false)
    }
}

#[cfg(windows)]
pub use windows_console::WindowsConsole;

/// The console implementation for the current platform.
#[cfg(windows)]
pub type HostConsole = WindowsConsole;

/// The console implementation for the current platform.
#[cfg(not(windows))]
pub type HostConsole = NoopConsole;

#[cfg(windows)]
mod windows_console {
    use std::os::windows::io::AsRawHandle;

    use windows_sys::Win32::Foundation::{HANDLE, INVALID_HANDLE_VALUE};
    use windows_sys::Win32::System::Console::{
        CONSOLE_MODE, ENABLE_VIRTUAL_TERMINAL_PROCESSING, GetConsoleMode, SetConsoleMode,
    };

    use super::Console;
    use crate::error::{GlintError, Result};

    /// The Windows console attached to stdout.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct WindowsConsole;

    impl Console for WindowsConsole {
        fn enable_virtual_terminal(&self) -> Result<bool> {
            let handle = std::io::stdout().as_raw_handle() as HANDLE;
            enable_vt(handle)
        }
    }

    fn enable_vt(handle: HANDLE) -> Result<bool> {
        if handle == 0 || handle == INVALID_HANDLE_VALUE {
            return Err(GlintError::ConsoleDetached);
        }

        let mut mode: CONSOLE_MODE = 0;
        // SAFETY: the handle is non-null; GetConsoleMode fails for non-consoles.
        if unsafe { GetConsoleMode(handle, &mut mode) } == 0 {
            return Err(std::io::Error::last_os_error().into());
        }

        if mode & ENABLE_VIRTUAL_TERMINAL_PROCESSING != 0 {
            return Ok(true);
        }

        // SAFETY: same handle, only adding a documented output mode flag.
        if unsafe { SetConsoleMode(handle, mode | ENABLE_VIRTUAL_TERMINAL_PROCESSING) } == 0 {
            return Err(std::io::Error::last_os_error().into());
        }

        Ok(true)
    }
}
