// SPDX-License-Identifier: MIT
//
// ANSI escape sequences for in-place line redraws.
//
// Pure functions over any `impl Write`, same shape as a full renderer's
// escape module but limited to what a one-row prompt needs: return to
// column 0 and erase the row.

use std::io::{self, Write};

/// Move the cursor to column 0 of the current row (CR).
#[inline]
pub fn carriage_return(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\r")
}

/// Erase the entire current row (EL 2). The cursor does not move.
#[inline]
pub fn clear_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2K")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
