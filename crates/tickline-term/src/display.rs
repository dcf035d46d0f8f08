// SPDX-License-Identifier: MIT
//
// Line display — keeping the visible prompt in sync with the buffer.
//
// Every keystroke redraws the whole row: carriage return, erase line, then
// prompt + buffer. No cursor arithmetic, so there is nothing to drift out
// of sync. Two details keep that true:
//
//   - Control bytes are stored verbatim but *shown* in caret notation
//     (0x01 → ^A). Echoing them raw would move the cursor or ring the bell.
//   - The row is clipped from the left to the terminal width. A line that
//     wraps puts the cursor on the next row, and CR + EL would then only
//     clean up the tail.

use std::io::{self, Write};

use unicode_width::UnicodeWidthChar;

use crate::ansi;
use crate::terminal::get_size;

// ─── LineDisplay ────────────────────────────────────────────────────────────

/// Where the line editor shows its prompt and buffer.
pub trait LineDisplay {
    /// Replace the current row with `prompt` followed by `line`.
    ///
    /// # Errors
    ///
    /// Returns the underlying write error.
    fn redraw(&mut self, prompt: &str, line: &[u8]) -> io::Result<()>;

    /// The line is done; move past it.
    ///
    /// # Errors
    ///
    /// Returns the underlying write error.
    fn finish(&mut self) -> io::Result<()>;
}

// ─── AnsiLineDisplay ────────────────────────────────────────────────────────

/// A [`LineDisplay`] that writes ANSI sequences to any [`Write`].
pub struct AnsiLineDisplay<W: Write> {
    out: W,
    /// Terminal width in columns; `None` disables clipping.
    width: Option<u16>,
}

impl AnsiLineDisplay<io::Stdout> {
    /// Display on stdout, clipped to the current terminal width.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout(), get_size().map(|s| s.cols))
    }
}

impl<W: Write> AnsiLineDisplay<W> {
    /// Display on `out`, clipped to `width` columns if given.
    pub const fn new(out: W, width: Option<u16>) -> Self {
        Self { out, width }
    }

    /// The writer, for inspecting captured output.
    pub const fn get_ref(&self) -> &W {
        &self.out
    }

    /// Give back the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> LineDisplay for AnsiLineDisplay<W> {
    fn redraw(&mut self, prompt: &str, line: &[u8]) -> io::Result<()> {
        let mut visible = String::with_capacity(prompt.len() + line.len());
        visible.push_str(prompt);
        push_visible(&mut visible, line);

        // Leave the last column free so the cursor never wraps.
        let text = match self.width {
            Some(cols) => clip_left(&visible, usize::from(cols.saturating_sub(1))),
            None => &visible,
        };

        ansi::carriage_return(&mut self.out)?;
        ansi::clear_line(&mut self.out)?;
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

// ─── Rendering helpers ──────────────────────────────────────────────────────

/// Append `line` to `out` as it should appear on screen.
///
/// Bytes are decoded as UTF-8 where possible; C0 controls become caret
/// notation.
fn push_visible(out: &mut String, line: &[u8]) {
    for ch in String::from_utf8_lossy(line).chars() {
        if ch.is_ascii_control() {
            out.push('^');
            out.push(char::from(u8::try_from(ch).unwrap_or(b'?') ^ 0x40));
        } else {
            out.push(ch);
        }
    }
}

/// The longest suffix of `s` at most `max_cols` display columns wide.
fn clip_left(s: &str, max_cols: usize) -> &str {
    let mut cols = 0;
    for (idx, ch) in s.char_indices().rev() {
        let w = ch.width().unwrap_or(0);
        if cols + w > max_cols {
            return &s[idx + ch.len_utf8()..];
        }
        cols += w;
    }
    s
}

// ─── Tests ───────────────────────────────────────────────────────────────────
