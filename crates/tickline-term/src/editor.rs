// SPDX-License-Identifier: MIT
//
// Line editor — a prompt that reads keystrokes one byte at a time.
//
// The loop is a three-state machine:
//
//   Collecting ──DEL──▶ Deleting ──▶ Collecting
//       │
//       └──\n──▶ Done
//
// Each iteration redraws `prompt + buffer`, reads one raw byte, and
// dispatches on it. DEL (127) drops the last byte, and is a no-op on an
// empty buffer. `\n` ends the line and is not part of the result.
// Everything else is appended as-is, control bytes included.
//
// Read failures are handled per `ReadFailure`; a run of
// `max_consecutive_failures` of them in a row ends the prompt so a dead descriptor cannot
// spin forever.

use log::{debug, warn};

use crate::display::{AnsiLineDisplay, LineDisplay};
use crate::error::LineError;
use crate::input::InputDevice;
use crate::session::read_raw_char;
use crate::terminal::StdinDevice;

/// DEL, what terminals send for the Backspace key.
pub const BACKSPACE: u8 = 127;

/// Line feed, what Enter arrives as with `ICRNL` left on.
pub const ENTER: u8 = b'\n';

// ─── Keystroke ──────────────────────────────────────────────────────────────

/// What a raw byte means to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    Backspace,
    Enter,
    Byte(u8),
}

impl Keystroke {
    #[must_use]
    pub const fn from_byte(b: u8) -> Self {
        match b {
            BACKSPACE => Self::Backspace,
            ENTER => Self::Enter,
            other => Self::Byte(other),
        }
    }
}

// ─── LineBuffer ─────────────────────────────────────────────────────────────

/// The in-progress line: raw bytes, append and remove-last only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    bytes: Vec<u8>,
}

impl LineBuffer {
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    pub fn push(&mut self, b: u8) {
        self.bytes.push(b);
    }

    /// Remove and return the last byte. `None` on an empty buffer.
    pub fn pop(&mut self) -> Option<u8> {
        self.bytes.pop()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The finished line. Invalid UTF-8 becomes U+FFFD.
    #[must_use]
    pub fn into_string(self) -> String {
        String::from_utf8(self.bytes)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
    }
}

// ─── Configuration ──────────────────────────────────────────────────────────

/// What to do with C0 control bytes (other than `\n`) typed into the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlBytes {
    /// Append them like any other byte.
    #[default]
    Keep,
    /// Ignore them.
    Drop,
}

/// What to do when a single read fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadFailure {
    /// Log it and read again; the buffer is untouched.
    #[default]
    Skip,
    /// Log it and append a NUL byte, as if 0 had been typed.
    InsertNul,
    /// Stop and return [`LineError::Read`].
    Abort,
}

/// Line editor behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorConfig {
    pub control_bytes: ControlBytes,
    pub on_read_error: ReadFailure,
    /// Consecutive read failures tolerated before giving up. Values below 1
    /// are treated as 1.
    pub max_consecutive_failures: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            control_bytes: ControlBytes::Keep,
            on_read_error: ReadFailure::Skip,
            max_consecutive_failures: 16,
        }
    }
}

// ─── LineEditor ─────────────────────────────────────────────────────────────

/// Reads a line from an [`InputDevice`], echoing it through a
/// [`LineDisplay`].
///
/// # Example
///
/// ```no_run
/// use tickline_term::{EditorConfig, LineEditor};
///
/// let mut editor = LineEditor::stdio(EditorConfig::default());
/// let name = editor.read_line("Write a name for the file: ")?;
/// println!("got {name:?}");
/// # Ok::<(), tickline_term::LineError>(())
/// ```
pub struct LineEditor<D: InputDevice, V: LineDisplay> {
    device: D,
    display: V,
    config: EditorConfig,
}

impl LineEditor<StdinDevice, AnsiLineDisplay<std::io::Stdout>> {
    /// An editor on the process's terminal.
    #[must_use]
    pub fn stdio(config: EditorConfig) -> Self {
        Self::new(StdinDevice::new(), AnsiLineDisplay::stdout(), config)
    }
}

impl<D: InputDevice, V: LineDisplay> LineEditor<D, V> {
    pub const fn new(device: D, display: V, config: EditorConfig) -> Self {
        Self {
            device,
            display,
            config,
        }
    }

    pub const fn device(&self) -> &D {
        &self.device
    }

    /// Give back the device and display.
    pub fn into_parts(self) -> (D, V) {
        (self.device, self.display)
    }

    /// Show `prompt`, collect keystrokes until Enter, return the line.
    ///
    /// # Errors
    ///
    /// - [`LineError::EndOfInput`] if input ends before Enter.
    /// - [`LineError::Read`] on a read failure with [`ReadFailure::Abort`].
    /// - [`LineError::TooManyFailures`] after too many failures in a row.
    /// - [`LineError::Display`] if the prompt cannot be drawn.
    pub fn read_line(&mut self, prompt: &str) -> Result<String, LineError> {
        let mut buffer = LineBuffer::new();
        let mut failures = 0u32;
        let limit = self.config.max_consecutive_failures.max(1);

        loop {
            self.display
                .redraw(prompt, buffer.as_bytes())
                .map_err(LineError::Display)?;

            let byte = match read_raw_char(&mut self.device) {
                Ok(read) => {
                    failures = 0;
                    read.byte
                }
                Err(err) => {
                    failures += 1;
                    warn!("{err} (failure {failures} of {limit})");
                    match self.config.on_read_error {
                        ReadFailure::Abort => return self.abandon(LineError::Read(err)),
                        _ if failures >= limit => {
                            return self.abandon(LineError::TooManyFailures {
                                count: failures,
                                last: err,
                            });
                        }
                        ReadFailure::Skip => {}
                        ReadFailure::InsertNul => buffer.push(0),
                    }
                    continue;
                }
            };

            let Some(byte) = byte else {
                debug!("end of input with {} bytes pending", buffer.len());
                return self.abandon(LineError::EndOfInput {
                    partial: buffer.into_string(),
                });
            };

            match Keystroke::from_byte(byte) {
                Keystroke::Backspace => {
                    buffer.pop();
                }
                Keystroke::Enter => break,
                Keystroke::Byte(b) => {
                    if b.is_ascii_control() && self.config.control_bytes == ControlBytes::Drop {
                        continue;
                    }
                    buffer.push(b);
                }
            }
        }

        self.display.finish().map_err(LineError::Display)?;
        Ok(buffer.into_string())
    }

    /// Move off the prompt row, then fail with `err`. A display error here
    /// is only logged so `err` is what the caller sees.
    fn abandon(&mut self, err: LineError) -> Result<String, LineError> {
        if let Err(e) = self.display.finish() {
            debug!("cannot finish the input line: {e}");
        }
        Err(err)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TermError;
    use crate::input::{ScriptedDevice, ScriptedMode, Step};
    use pretty_assertions::assert_eq;
    use std::io;

    fn editor(device: ScriptedDevice) -> LineEditor<ScriptedDevice, AnsiLineDisplay<Vec<u8>>> {
        editor_with(device, EditorConfig::default())
    }

    fn editor_with(
        device: ScriptedDevice,
        config: EditorConfig,
    ) -> LineEditor<ScriptedDevice, AnsiLineDisplay<Vec<u8>>> {
        LineEditor::new(device, AnsiLineDisplay::new(Vec::new(), None), config)
    }

    fn read(script: &[u8]) -> Result<String, LineError> {
        editor(ScriptedDevice::new(script)).read_line("> ")
    }

    // ── Keystroke ───────────────────────────────────────────────────

    #[test]
    fn keystroke_classification() {
        assert_eq!(Keystroke::from_byte(127), Keystroke::Backspace);
        assert_eq!(Keystroke::from_byte(b'\n'), Keystroke::Enter);
        assert_eq!(Keystroke::from_byte(b'\r'), Keystroke::Byte(b'\r'));
        assert_eq!(Keystroke::from_byte(b'a'), Keystroke::Byte(b'a'));
    }

    // ── LineBuffer ──────────────────────────────────────────────────

    #[test]
    fn buffer_pop_on_empty_is_none() {
        let mut buf = LineBuffer::new();
        assert_eq!(buf.pop(), None);
        assert!(buf.is_empty());
    }

    #[test]
    fn buffer_invalid_utf8_is_replaced() {
        let mut buf = LineBuffer::new();
        buf.push(b'a');
        buf.push(0xff);
        assert_eq!(buf.into_string(), "a\u{fffd}");
    }

    // ── read_line ───────────────────────────────────────────────────

    #[test]
    fn backspace_removes_previous_byte() {
        assert_eq!(read(b"ab\x7fc\n").unwrap(), "ac");
    }

    #[test]
    fn backspace_on_empty_is_noop() {
        assert_eq!(read(b"\x7f\x7fx\n").unwrap(), "x");
    }

    #[test]
    fn enter_alone_is_empty_line() {
        assert_eq!(read(b"\n").unwrap(), "");
    }

    #[test]
    fn stops_at_first_enter() {
        let mut ed = editor(ScriptedDevice::new(b"one\ntwo\n"));
        assert_eq!(ed.read_line("").unwrap(), "one");
        assert_eq!(ed.read_line("").unwrap(), "two");
    }

    #[test]
    fn control_bytes_are_kept_by_default() {
        assert_eq!(read(b"a\x01\tb\r\n").unwrap(), "a\x01\tb\r");
    }

    #[test]
    fn control_bytes_can_be_dropped() {
        let config = EditorConfig {
            control_bytes: ControlBytes::Drop,
            ..EditorConfig::default()
        };
        let mut ed = editor_with(ScriptedDevice::new(b"a\x01\tb\n"), config);
        assert_eq!(ed.read_line("").unwrap(), "ab");
    }

    #[test]
    fn end_of_input_returns_partial() {
        let err = read(b"par").unwrap_err();
        assert!(matches!(err, LineError::EndOfInput { ref partial } if partial == "par"));
    }

    #[test]
    fn every_keystroke_redraws_in_place() {
        let mut ed = editor(ScriptedDevice::new(b"ab\x7f\n"));
        ed.read_line("> ").unwrap();
        let (_, display) = ed.into_parts();
        let out = String::from_utf8(display.into_inner()).unwrap();
        assert_eq!(out, "\r\x1b[2K> \r\x1b[2K> a\r\x1b[2K> ab\r\x1b[2K> a\n");
    }

    #[test]
    fn terminal_mode_restored_after_line() {
        let mut ed = editor(ScriptedDevice::new(b"hey\n"));
        ed.read_line("").unwrap();
        assert_eq!(ed.device().current_mode(), Some(ScriptedMode::default()));
        // One raw/restore pair per byte read.
        assert_eq!(ed.device().history().len(), 8);
    }

    // ── Read failures ───────────────────────────────────────────────

    fn failing_script() -> ScriptedDevice {
        ScriptedDevice::from_steps([
            Step::Byte(b'a'),
            Step::Fail(io::ErrorKind::Other),
            Step::Byte(b'b'),
            Step::Byte(b'\n'),
        ])
    }

    #[test]
    fn failed_read_is_skipped_by_default() {
        let mut ed = editor(failing_script());
        assert_eq!(ed.read_line("").unwrap(), "ab");
    }

    #[test]
    fn failed_read_can_insert_nul() {
        let config = EditorConfig {
            on_read_error: ReadFailure::InsertNul,
            ..EditorConfig::default()
        };
        let mut ed = editor_with(failing_script(), config);
        assert_eq!(ed.read_line("").unwrap(), "a\0b");
    }

    #[test]
    fn failed_read_can_abort() {
        let config = EditorConfig {
            on_read_error: ReadFailure::Abort,
            ..EditorConfig::default()
        };
        let mut ed = editor_with(failing_script(), config);
        let err = ed.read_line("").unwrap_err();
        assert!(matches!(err, LineError::Read(TermError::Read(_))));
        assert_eq!(ed.device().current_mode(), Some(ScriptedMode::default()));
    }

    #[test]
    fn persistent_failures_give_up() {
        let config = EditorConfig {
            max_consecutive_failures: 3,
            ..EditorConfig::default()
        };
        let steps = std::iter::repeat_n(Step::Fail(io::ErrorKind::Other), 10);
        let mut ed = editor_with(ScriptedDevice::from_steps(steps), config);
        let err = ed.read_line("").unwrap_err();
        assert!(matches!(err, LineError::TooManyFailures { count: 3, .. }));
        assert_eq!(ed.device().reads(), 3);
    }

    #[test]
    fn failure_count_resets_after_success() {
        let config = EditorConfig {
            max_consecutive_failures: 2,
            ..EditorConfig::default()
        };
        let fail = Step::Fail(io::ErrorKind::Other);
        let [x, y, enter] = [b'x', b'y', b'\n'].map(Step::Byte);
        let steps = [fail, x, fail, y, enter];
        let mut ed = editor_with(ScriptedDevice::from_steps(steps), config);
        assert_eq!(ed.read_line("").unwrap(), "xy");
    }

    #[test]
    fn works_on_a_pipe() {
        let mut ed = editor(ScriptedDevice::new(b"piped\n").without_terminal());
        assert_eq!(ed.read_line("").unwrap(), "piped");
        assert!(ed.device().history().is_empty());
    }

    #[test]
    fn abort_wins_over_failure_limit() {
        let config = EditorConfig {
            on_read_error: ReadFailure::Abort,
            max_consecutive_failures: 1,
            ..EditorConfig::default()
        };
        let steps = [Step::Fail(io::ErrorKind::Other)];
        let mut ed = editor_with(ScriptedDevice::from_steps(steps), config);
        let err = ed.read_line("").unwrap_err();
        assert!(matches!(err, LineError::Read(TermError::Read(_))));
    }

    // ── Leaving the prompt row ──────────────────────────────────────

    fn screen_after_error(device: ScriptedDevice, config: EditorConfig) -> String {
        let mut ed = editor_with(device, config);
        assert!(ed.read_line("> ").is_err());
        let (_, display) = ed.into_parts();
        String::from_utf8(display.into_inner()).unwrap()
    }

    #[test]
    fn abort_moves_off_the_prompt_row() {
        let config = EditorConfig {
            on_read_error: ReadFailure::Abort,
            ..EditorConfig::default()
        };
        let screen = screen_after_error(failing_script(), config);
        assert_eq!(screen, "\r\x1b[2K> \r\x1b[2K> a\n");
    }

    #[test]
    fn giving_up_moves_off_the_prompt_row() {
        let config = EditorConfig {
            max_consecutive_failures: 2,
            ..EditorConfig::default()
        };
        let steps = std::iter::repeat_n(Step::Fail(io::ErrorKind::Other), 2);
        let screen = screen_after_error(ScriptedDevice::from_steps(steps), config);
        assert!(screen.ends_with("> \n"), "screen was {screen:?}");
    }

    #[test]
    fn end_of_input_moves_off_the_prompt_row() {
        let screen = screen_after_error(ScriptedDevice::new(b"x"), EditorConfig::default());
        assert_eq!(screen, "\r\x1b[2K> \r\x1b[2K> x\n");
    }
}
