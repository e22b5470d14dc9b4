//! Terminal tests for the standard streams.
//!
//! Two flavors of "terminal" count for color purposes:
//!
//! - a real interactive terminal device (`isatty` on Unix, a console handle
//!   on Windows)
//! - a **compatibility terminal**: the named-pipe pty that MSYS2 and Cygwin
//!   hand to Windows programs (mintty, Git Bash)
//!
//! Invalid descriptors are never an error, they just are not terminals.

use std::fmt;

use serde::Serialize;

#[cfg(unix)]
pub type RawDescriptor = std::os::fd::RawFd;

#[cfg(windows)]
pub type RawDescriptor = std::os::windows::io::RawHandle;

#[cfg(not(any(unix, windows)))]
pub type RawDescriptor = i32;

/// One of the three standard streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stream {
    Stdin,
    Stdout,
    Stderr,
}

impl Stream {
    /// The raw descriptor of the stream for this process.
    pub fn raw(self) -> RawDescriptor {
        platform::raw(self)
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stream::Stdin => "stdin",
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        })
    }
}

/// Answers whether a standard stream is attached to a terminal.
///
/// [`HostTerminal`] asks the operating system. Tests and embedders can supply
/// their own implementation to [`ColorSupport`](crate::ColorSupport).
pub trait TerminalProbe: Send + Sync {
    /// Whether `stream` is a real interactive terminal.
    fn is_terminal(&self, stream: Stream) -> bool;

    /// Whether `stream` is a terminal emulated by MSYS2 or Cygwin.
    fn is_compatibility_terminal(&self, stream: Stream) -> bool;

    /// Whether `stream` is either kind of terminal.
    fn is_any_terminal(&self, stream: Stream) -> bool {
        self.is_terminal(stream) || self.is_compatibility_terminal(stream)
    }
}

/// The host operating system's terminal tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostTerminal;

impl TerminalProbe for HostTerminal {
    fn is_terminal(&self, stream: Stream) -> bool {
        is_terminal(stream)
    }

    fn is_compatibility_terminal(&self, stream: Stream) -> bool {
        is_compatibility_terminal(stream)
    }
}

/// Whether `stream` is a real interactive terminal.
///
/// ## Examples
///
/// ```
/// use glint::{is_terminal, Stream};
///
/// if !is_terminal(Stream::Stdout) {
///     // output is going to a file or a pipe
/// }
/// ```
pub fn is_terminal(stream: Stream) -> bool {
    is_raw_terminal(stream.raw())
}

/// Whether `stream` is a terminal emulated by MSYS2 or Cygwin.
///
/// Always `false` outside Windows.
pub fn is_compatibility_terminal(stream: Stream) -> bool {
    is_raw_compatibility_terminal(stream.raw())
}

/// Whether a raw descriptor refers to a real interactive terminal.
///
/// Closed or out-of-range descriptors return `false`.
pub fn is_raw_terminal(descriptor: RawDescriptor) -> bool {
    platform::is_terminal(descriptor)
}

/// Whether a raw descriptor refers to an MSYS2/Cygwin pty.
pub fn is_raw_compatibility_terminal(descriptor: RawDescriptor) -> bool {
    platform::is_compatibility_terminal(descriptor)
}

#[cfg(unix)]
mod platform {
    use super::{RawDescriptor, Stream};

    pub(super) fn raw(stream: Stream) -> RawDescriptor {
        match stream {
            Stream::Stdin => libc::STDIN_FILENO,
            Stream::Stdout => libc::STDOUT_FILENO,
            Stream::Stderr => libc::STDERR_FILENO,
        }
    }

    pub(super) fn is_terminal(fd: RawDescriptor) -> bool {
        if fd < 0 {
            return false;
        }
        // SAFETY: isatty only inspects the descriptor and reports EBADF for
        // descriptors that are not open.
        unsafe { libc::isatty(fd) == 1 }
    }

    pub(super) fn is_compatibility_terminal(_fd: RawDescriptor) -> bool {
        false
    }
}

#[cfg(windows)]
mod platform {
    use std::os::windows::io::AsRawHandle;

    use windows_sys::Win32::Foundation::{HANDLE, INVALID_HANDLE_VALUE};
    use windows_sys::Win32::Storage::FileSystem::{
        FILE_TYPE_PIPE, FileNameInfo, GetFileInformationByHandleEx, GetFileType,
    };
    use windows_sys::Win32::System::Console::{CONSOLE_MODE, GetConsoleMode};

    use super::{RawDescriptor, Stream};

    const MAX_NAME: usize = 1024;

    /// Same layout as `FILE_NAME_INFO` with room for the name.
    #[repr(C)]
    struct FileNameBuffer {
        length: u32,
        name: [u16; MAX_NAME],
    }

    pub(super) fn raw(stream: Stream) -> RawDescriptor {
        match stream {
            Stream::Stdin => std::io::stdin().as_raw_handle(),
            Stream::Stdout => std::io::stdout().as_raw_handle(),
            Stream::Stderr => std::io::stderr().as_raw_handle(),
        }
    }

    fn to_handle(descriptor: RawDescriptor) -> Option<HANDLE> {
        let handle = descriptor as HANDLE;
        (handle != 0 && handle != INVALID_HANDLE_VALUE).then_some(handle)
    }

    pub(super) fn is_terminal(descriptor: RawDescriptor) -> bool {
        let Some(handle) = to_handle(descriptor) else {
            return false;
        };
        let mut mode: CONSOLE_MODE = 0;
        // SAFETY: GetConsoleMode fails cleanly for handles that are not consoles.
        unsafe { GetConsoleMode(handle, &mut mode) != 0 }
    }

    pub(super) fn is_compatibility_terminal(descriptor: RawDescriptor) -> bool {
        let Some(handle) = to_handle(descriptor) else {
            return false;
        };

        // SAFETY: GetFileType accepts any handle value.
        if unsafe { GetFileType(handle) } != FILE_TYPE_PIPE {
            return false;
        }

        let mut buffer = FileNameBuffer {
            length: 0,
            name: [0; MAX_NAME],
        };
        // SAFETY: the buffer is a valid FILE_NAME_INFO with `size_of` bytes
        // available, and the call writes at most that many.
        let ok = unsafe {
            GetFileInformationByHandleEx(
                handle,
                FileNameInfo,
                (&mut buffer as *mut FileNameBuffer).cast(),
                std::mem::size_of::<FileNameBuffer>() as u32,
            )
        };
        if ok == 0 {
            return false;
        }

        let len = (buffer.length as usize / 2).min(MAX_NAME);
        let name = String::from_utf16_lossy(&buffer.name[..len]);

        // e.g. \msys-dd50a72ab4668b33-pty0-to-master
        let is_msys = name.contains("msys-") || name.contains("cygwin-");
        is_msys && name.contains("-pty")
    }
}

#[cfg(not(any(unix, windows)))]
mod platform {
    use std::io::IsTerminal;

    use super::{RawDescriptor, Stream};

    pub(super) fn raw(stream: Stream) -> RawDescriptor {
        match stream {
            Stream::Stdin => 0,
            Stream::Stdout => 1,
            Stream::Stderr => 2,
        }
    }

    pub(super) fn is_terminal(descriptor: RawDescriptor) -> bool {
        match descriptor {
            0 => std::io::stdin().is_terminal(),
            1 => std::io::stdout().is_terminal(),
            2 => std::io::stderr().is_terminal(),
            _ => false,
        }
    }

    pub(super) fn is_compatibility_terminal(_descriptor: RawDescriptor) -> bool {
        false
    }
}
