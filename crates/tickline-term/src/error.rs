// SPDX-License-Identifier: MIT

use std::io;

use thiserror::Error;

/// Failures around a single raw-mode read.
///
/// Only [`TermError::Read`] stops a read from producing a byte. The mode
/// variants describe a degraded read: the byte was still read, but the
/// terminal may have been in (or left in) the wrong mode for it.
#[derive(Debug, Error)]
pub enum TermError {
    /// `tcgetattr` (or the device's equivalent) failed.
    #[error("cannot query terminal mode: {0}")]
    GetMode(#[source] io::Error),

    /// Switching to non-canonical, no-echo mode failed.
    #[error("cannot switch terminal to raw mode: {0}")]
    EnterRaw(#[source] io::Error),

    /// Putting the saved mode back failed.
    #[error("cannot restore terminal mode: {0}")]
    Restore(#[source] io::Error),

    /// The one-byte read itself failed.
    #[error("read from input device failed: {0}")]
    Read(#[source] io::Error),
}

/// Why [`LineEditor::read_line`](crate::editor::LineEditor::read_line)
/// returned without a line.
#[derive(Debug, Error)]
pub enum LineError {
    /// A read failed and the editor is configured to abort on read errors.
    #[error(transparent)]
    Read(TermError),

    /// Reads kept failing; the input device looks unusable.
    #[error("gave up after {count} consecutive failed reads")]
    TooManyFailures {
        count: u32,
        #[source]
        last: TermError,
    },

    /// The input device reached end of file before Enter was pressed.
    ///
    /// `partial` holds whatever had been typed.
    #[error("input ended before the line was finished")]
    EndOfInput { partial: String },

    /// The prompt could not be drawn.
    #[error("cannot draw the input line: {0}")]
    Display(#[source] io::Error),
}
