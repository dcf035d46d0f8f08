// SPDX-License-Identifier: MIT
//
// Calendar timestamps in the classic ctime(3) layout:
//
//   Sun Jul 16 14:03:09 2023
//
// Used to stamp diagnostics and the lines the demo driver writes. The
// conversion is libc's own (`time`, `localtime_r`, `strftime`), so the
// local time zone and DST rules are whatever the C library says. Unlike
// ctime() there is no trailing newline and no static buffer.
#![allow(unsafe_code)]

use crate::error::ClockError;

/// `strftime` pattern equivalent to ctime's fixed layout (`%e` pads the
/// day with a space).
#[cfg(unix)]
const CTIME_FORMAT: &std::ffi::CStr = c"%a %b %e %H:%M:%S %Y";

/// The current local time, formatted like `ctime(3)` without the newline.
///
/// # Errors
///
/// Returns [`ClockError::CalendarUnavailable`] if wall-clock time cannot be
/// read or converted to local time.
#[cfg(unix)]
pub fn timestamp() -> Result<String, ClockError> {
    let now = unsafe { libc::time(std::ptr::null_mut()) };
    if now == -1 {
        return Err(ClockError::CalendarUnavailable(
            std::io::Error::last_os_error().to_string(),
        ));
    }

    let mut tm: libc::tm = unsafe { std::mem::zeroed() };
    if unsafe { libc::localtime_r(&raw const now, &raw mut tm) }.is_null() {
        return Err(ClockError::CalendarUnavailable(
            "cannot convert the current time to local time".into(),
        ));
    }

    format_tm(&tm)
}

/// Without POSIX local time there is no calendar to read.
///
/// # Errors
///
/// Always returns [`ClockError::CalendarUnavailable`].
#[cfg(not(unix))]
pub fn timestamp() -> Result<String, ClockError> {
    Err(ClockError::CalendarUnavailable(
        "local calendar time needs a POSIX C library".into(),
    ))
}

/// Render broken-down time with [`CTIME_FORMAT`].
#[cfg(unix)]
fn format_tm(tm: &libc::tm) -> Result<String, ClockError> {
    let mut buf = [0u8; 64];
    let len = unsafe {
        libc::strftime(
            buf.as_mut_ptr().cast::<libc::c_char>(),
            buf.len(),
            CTIME_FORMAT.as_ptr(),
            tm,
        )
    };
    if len == 0 {
        return Err(ClockError::CalendarUnavailable(
            "calendar time does not fit the timestamp layout".into(),
        ));
    }
    Ok(String::from_utf8_lossy(&buf[..len]).into_owned())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
