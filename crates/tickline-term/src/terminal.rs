// SPDX-License-Identifier: MIT
//
// Standard input as a real terminal: termios save/raw/restore, the window
// size, and the panic hook and signal handlers that put cooked mode back.
//
// Raw mode is normally undone by `RawModeSession`'s destructor. That covers
// early returns and panics that unwind, but not a panic hook that aborts or
// a panic raised while the session is being torn down. So while stdin is in
// raw mode, the termios it came from is also parked in a global backup, and
// a panic hook (installed once per process) puts it back before the
// original hook prints the message. Fatal signals (Ctrl-C, hangup,
// SIGTERM) get the same treatment from a one-shot handler that restores
// the backup and re-raises.
//
// All the libc calls here (tcgetattr, tcsetattr, ioctl, isatty, read,
// sigaction) are
// plain POSIX terminal interfaces; each unsafe block wraps exactly one call.
#![allow(unsafe_code)]

use std::io;
#[cfg(unix)]
use std::sync::Mutex;
use std::sync::Once;

use crate::input::{Apply, InputDevice};

// ─── Size ───────────────────────────────────────────────────────────────────

/// Window size in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Columns and rows of the terminal behind stdout (`TIOCGWINSZ`).
///
/// `None` when stdout is redirected or reports a zero size.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Whether stdin is a terminal.
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Panic-Safe Restore ─────────────────────────────────────────────────────

/// A descriptor and the termios it had before the current raw read.
#[cfg(unix)]
type Backup = (libc::c_int, libc::termios);

/// Mode parked for the panic hook and the fatal-signal handler.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<Backup>> = Mutex::new(None);

#[cfg(unix)]
fn set_backup(backup: Option<Backup>) {
    if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
        *guard = backup;
    }
}

/// Put the parked termios back. Errors are ignored: this runs inside the
/// panic hook or a signal handler.
///
/// Uses `try_lock`: the code that was interrupted may be holding the lock,
/// and waiting for it there would hang the process.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.try_lock() {
        if let Some((fd, ref original)) = *guard {
            unsafe {
                let _ = libc::tcsetattr(fd, libc::TCSANOW, original);
            }
        }
    }
}

/// Set once the restore hook is in place.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that leaves raw mode before the message prints.
///
/// Without it a panic mid-read can leave the shell with echo off and no
/// line editing, so the user cannot even see the error.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

// ─── Fatal Signals ──────────────────────────────────────────────────────────

/// Signals whose default action ends the process without unwinding, so
/// neither `Drop` nor the panic hook gets a chance to restore the mode.
/// Raw mode keeps `ISIG`, which makes Ctrl-C and Ctrl-\ the common case.
#[cfg(unix)]
const FATAL_SIGNALS: [libc::c_int; 4] = [libc::SIGINT, libc::SIGQUIT, libc::SIGTERM, libc::SIGHUP];

/// Set once the fatal-signal handlers are in place.
#[cfg(unix)]
static SIGNAL_HANDLERS_INSTALLED: Once = Once::new();

/// Route every fatal signal still at its default action through
/// [`restore_and_reraise`]. Ignored signals (`nohup`) and handlers someone
/// else installed are left alone.
#[cfg(unix)]
fn install_signal_handlers() {
    SIGNAL_HANDLERS_INSTALLED.call_once(|| {
        for sig in FATAL_SIGNALS {
            let mut current: libc::sigaction = unsafe { std::mem::zeroed() };
            let rc = unsafe { libc::sigaction(sig, std::ptr::null(), &raw mut current) };
            if rc == 0 && current.sa_sigaction == libc::SIG_DFL {
                install_restore_handler(sig);
            }
        }
    });
}

/// One-shot handler for `sig`: `SA_RESETHAND` puts the default action back
/// as the handler starts, so the re-raise inside it terminates normally.
#[cfg(unix)]
fn install_restore_handler(sig: libc::c_int) {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = restore_and_reraise as *const () as usize;
        sa.sa_flags = libc::SA_RESETHAND;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(sig, &raw const sa, std::ptr::null_mut());
    }
}

/// Restore the parked mode, then deliver `sig` again so the process still
/// dies of it (the shell sees the right exit status).
#[cfg(unix)]
extern "C" fn restore_and_reraise(sig: libc::c_int) {
    restore_termios_from_backup();
    unsafe {
        libc::raise(sig);
    }
}

// ─── StdinDevice ────────────────────────────────────────────────────────────

/// Standard input as an [`InputDevice`], configured through termios.
///
/// When stdin is not a terminal, [`mode`](InputDevice::mode) returns
/// `None` and reads go straight to the descriptor.
pub struct StdinDevice {
    /// Mode seen by the last successful query; parked for the panic hook
    /// and signal handlers while raw mode is applied.
    #[cfg(unix)]
    last_seen: Option<libc::termios>,
}

impl StdinDevice {
    /// A handle to fd 0. Installs the restore-on-panic hook and, on unix,
    /// the restore-on-signal handlers.
    #[must_use]
    pub fn new() -> Self {
        install_panic_hook();
        #[cfg(unix)]
        install_signal_handlers();
        Self {
            #[cfg(unix)]
            last_seen: None,
        }
    }
}

impl Default for StdinDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
impl InputDevice for StdinDevice {
    type Mode = libc::termios;

    fn mode(&mut self) -> io::Result<Option<libc::termios>> {
        if !is_tty() {
            return Ok(None);
        }

        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut termios) } != 0 {
            return Err(io::Error::last_os_error());
        }
        self.last_seen = Some(termios);
        Ok(Some(termios))
    }

    fn set_mode(&mut self, mode: &libc::termios, when: Apply) -> io::Result<()> {
        let action = match when {
            Apply::Now => libc::TCSANOW,
            Apply::Drain => libc::TCSADRAIN,
        };

        // Park the cooked settings before leaving them.
        if when == Apply::Now {
            set_backup(self.last_seen.map(|t| (libc::STDIN_FILENO, t)));
        }

        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, action, mode) } != 0 {
            return Err(io::Error::last_os_error());
        }

        if when == Apply::Drain {
            set_backup(None);
        }
        Ok(())
    }

    fn raw_mode(mode: &libc::termios) -> libc::termios {
        let mut raw = *mode;
        raw.c_lflag &= !(libc::ICANON | libc::ECHO);
        // VMIN=1, VTIME=0: read() blocks until at least 1 byte is available.
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;
        raw
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = 0u8;
        let buf = (&raw mut byte).cast::<libc::c_void>();
        loop {
            let n = unsafe { libc::read(libc::STDIN_FILENO, buf, 1) };
            if n > 0 {
                return Ok(Some(byte));
            }
            if n == 0 {
                return Ok(None);
            }

            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }
}

/// Non-unix fallback: no line discipline, plain blocking reads.
#[cfg(not(unix))]
impl InputDevice for StdinDevice {
    type Mode = ();

    fn mode(&mut self) -> io::Result<Option<()>> {
        Ok(None)
    }

    fn set_mode(&mut self, _mode: &(), _when: Apply) -> io::Result<()> {
        Ok(())
    }

    fn raw_mode(_mode: &()) {}

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        use std::io::Read;

        let mut byte = [0u8; 1];
        match io::stdin().lock().read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
