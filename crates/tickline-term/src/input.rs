// SPDX-License-Identifier: MIT
//
// Input devices — where keystrokes come from.
//
// A device is two things at once: a byte source and a line discipline that
// can be read, changed, and put back. `InputDevice` captures exactly that,
// with the mode as an associated type so a real terminal can carry its full
// termios (restoration must be exact, not a re-derived approximation) while
// a scripted device carries a couple of flags.

use std::collections::VecDeque;
use std::io;

use bitflags::bitflags;

// ─── InputDevice ────────────────────────────────────────────────────────────

/// When a mode change takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Apply {
    /// Immediately (`TCSANOW`). Used when entering raw mode.
    Now,
    /// After pending output has been written (`TCSADRAIN`). Used when
    /// restoring, so a redrawn prompt is not cut off.
    Drain,
}

/// A byte-at-a-time input source with a settable line discipline.
pub trait InputDevice {
    /// A complete snapshot of the device's line-discipline settings.
    type Mode: Clone;

    /// The current mode, or `None` if the device has no line discipline
    /// (e.g. stdin is a pipe). `None` means raw-mode switching is skipped.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the mode cannot be queried.
    fn mode(&mut self) -> io::Result<Option<Self::Mode>>;

    /// Replace the device's mode.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the mode cannot be applied.
    fn set_mode(&mut self, mode: &Self::Mode, when: Apply) -> io::Result<()>;

    /// Derive the raw variant of `mode`: no canonical buffering, no echo,
    /// reads return after one byte with no timeout. Everything else is kept.
    fn raw_mode(mode: &Self::Mode) -> Self::Mode;

    /// Block until one byte is available and return it.
    ///
    /// `Ok(None)` means end of input.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the read fails.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

// ─── ScriptedMode ───────────────────────────────────────────────────────────

bitflags! {
    /// Local-mode flags of a [`ScriptedDevice`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ModeFlags: u8 {
        /// Line-buffered input (`ICANON`).
        const CANONICAL = 1 << 0;
        /// Typed characters are echoed (`ECHO`).
        const ECHO      = 1 << 1;
    }
}

/// The line discipline of a [`ScriptedDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScriptedMode {
    pub flags: ModeFlags,
    /// Minimum bytes per read (`VMIN`).
    pub min_bytes: u8,
    /// Read timeout in tenths of a second (`VTIME`).
    pub timeout_ds: u8,
}

impl Default for ScriptedMode {
    /// A cooked terminal: canonical, echoing.
    fn default() -> Self {
        Self {
            flags: ModeFlags::CANONICAL | ModeFlags::ECHO,
            min_bytes: 1,
            timeout_ds: 0,
        }
    }
}

// ─── ScriptedDevice ─────────────────────────────────────────────────────────

/// One scripted read result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Byte(u8),
    Fail(io::ErrorKind),
}

/// An in-memory input device for tests and harnesses.
///
/// Plays back a script of bytes and read failures, reports end of input
/// once the script runs out, and records every mode it is switched to so
/// callers can check that the original mode came back.
#[derive(Debug, Clone)]
pub struct ScriptedDevice {
    script: VecDeque<Step>,
    mode: Option<ScriptedMode>,
    history: Vec<(ScriptedMode, Apply)>,
    reads: usize,
    fail_query: bool,
    fail_raw: bool,
}

impl ScriptedDevice {
    /// A terminal-like device that will yield `bytes` in order.
    #[must_use]
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        Self::from_steps(bytes.as_ref().iter().copied().map(Step::Byte))
    }

    /// A terminal-like device playing back arbitrary steps.
    #[must_use]
    pub fn from_steps(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: steps.into_iter().collect(),
            mode: Some(ScriptedMode::default()),
            history: Vec::new(),
            reads: 0,
            fail_query: false,
            fail_raw: false,
        }
    }

    /// Behave like a pipe: no line discipline at all.
    #[must_use]
    pub const fn without_terminal(mut self) -> Self {
        self.mode = None;
        self
    }

    /// Make every mode query fail.
    #[must_use]
    pub const fn failing_mode_query(mut self) -> Self {
        self.fail_query = true;
        self
    }

    /// Make switching into raw mode fail (restoring still works).
    #[must_use]
    pub const fn failing_raw_switch(mut self) -> Self {
        self.fail_raw = true;
        self
    }

    /// The mode the device is in right now.
    #[must_use]
    pub const fn current_mode(&self) -> Option<ScriptedMode> {
        self.mode
    }

    /// Every successful mode change, in order.
    #[must_use]
    pub fn history(&self) -> &[(ScriptedMode, Apply)] {
        &self.history
    }

    /// Number of reads performed (including failed ones).
    #[must_use]
    pub const fn reads(&self) -> usize {
        self.reads
    }

    /// Steps not yet played back.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl InputDevice for ScriptedDevice {
    type Mode = ScriptedMode;

    fn mode(&mut self) -> io::Result<Option<ScriptedMode>> {
        if self.fail_query {
            return Err(io::Error::other("scripted mode query failure"));
        }
        Ok(self.mode)
    }

    fn set_mode(&mut self, mode: &ScriptedMode, when: Apply) -> io::Result<()> {
        if self.fail_raw && when == Apply::Now {
            return Err(io::Error::other("scripted raw switch failure"));
        }
        self.mode = Some(*mode);
        self.history.push((*mode, when));
        Ok(())
    }

    fn raw_mode(mode: &ScriptedMode) -> ScriptedMode {
        ScriptedMode {
            flags: mode.flags - (ModeFlags::CANONICAL | ModeFlags::ECHO),
            min_bytes: 1,
            timeout_ds: 0,
        }
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.reads += 1;
        match self.script.pop_front() {
            Some(Step::Byte(b)) => Ok(Some(b)),
            Some(Step::Fail(kind)) => Err(io::Error::new(kind, "scripted read failure")),
            None => Ok(None),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_mode_is_cooked() {
        let mode = ScriptedMode::default();
        assert!(mode.flags.contains(ModeFlags::CANONICAL));
        assert!(mode.flags.contains(ModeFlags::ECHO));
    }

    #[test]
    fn raw_mode_clears_canonical_and_echo() {
        let raw = ScriptedDevice::raw_mode(&ScriptedMode {
            flags: ModeFlags::all(),
            min_bytes: 0,
            timeout_ds: 5,
        });
        assert_eq!(raw.flags, ModeFlags::empty());
        assert_eq!(raw.min_bytes, 1);
        assert_eq!(raw.timeout_ds, 0);
    }

    #[test]
    fn plays_back_bytes_then_eof() {
        let mut dev = ScriptedDevice::new(b"hi");
        assert_eq!(dev.read_byte().unwrap(), Some(b'h'));
        assert_eq!(dev.read_byte().unwrap(), Some(b'i'));
        assert_eq!(dev.read_byte().unwrap(), None);
        assert_eq!(dev.reads(), 3);
    }

    #[test]
    fn plays_back_failures() {
        let mut dev =
            ScriptedDevice::from_steps([Step::Fail(io::ErrorKind::Interrupted), Step::Byte(b'x')]);
        let err = dev.read_byte().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Interrupted);
        assert_eq!(dev.read_byte().unwrap(), Some(b'x'));
        assert_eq!(dev.remaining(), 0);
    }

    #[test]
    fn pipe_has_no_mode() {
        let mut dev = ScriptedDevice::new(b"").without_terminal();
        assert_eq!(dev.mode().unwrap(), None);
    }

    #[test]
    fn records_mode_history() {
        let mut dev = ScriptedDevice::new(b"");
        let cooked = dev.mode().unwrap().unwrap();
        let raw = ScriptedDevice::raw_mode(&cooked);
        dev.set_mode(&raw, Apply::Now).unwrap();
        dev.set_mode(&cooked, Apply::Drain).unwrap();
        assert_eq!(dev.history(), &[(raw, Apply::Now), (cooked, Apply::Drain)]);
        assert_eq!(dev.current_mode(), Some(cooked));
    }

    #[test]
    fn failing_raw_switch_still_restores() {
        let mut dev = ScriptedDevice::new(b"").failing_raw_switch();
        let cooked = dev.mode().unwrap().unwrap();
        let raw = ScriptedDevice::raw_mode(&cooked);
        assert!(dev.set_mode(&raw, Apply::Now).is_err());
        assert!(dev.set_mode(&cooked, Apply::Drain).is_ok());
    }
}
