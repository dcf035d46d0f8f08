// SPDX-License-Identifier: MIT
//
// tickline-term — raw-mode keystroke input for line-oriented prompts.
//
// The editor reads one byte at a time with the terminal's line discipline
// switched off (no canonical buffering, no echo), keeps its own line buffer,
// and redraws the prompt in place after every keystroke. Raw mode is held
// only for the duration of a single read: the original settings come back
// before the read returns, on every path out.
//
// The input device and the line display are both traits, so the editor can
// be driven by a scripted byte source and a `Vec<u8>` screen in tests.

pub mod ansi;
pub mod display;
pub mod editor;
pub mod error;
pub mod input;
pub mod session;
pub mod terminal;

pub use display::{AnsiLineDisplay, LineDisplay};
pub use editor::{ControlBytes, EditorConfig, LineBuffer, LineEditor, ReadFailure};
pub use error::{LineError, TermError};
pub use input::{Apply, InputDevice, ModeFlags, ScriptedDevice, ScriptedMode, Step};
pub use session::{RawModeSession, RawRead, read_raw_char};
pub use terminal::StdinDevice;
