// SPDX-License-Identifier: MIT

use std::io;

use thiserror::Error;

/// Failures of the time sources.
///
/// None of these are recoverable inside the library: without a clock there
/// is no way to pace a frame. They are returned rather than acted on so the
/// top-level driver decides how to exit.
#[derive(Debug, Error)]
pub enum ClockError {
    /// The monotonic clock could not be read.
    #[error("monotonic clock unavailable: {0}")]
    Unavailable(#[source] io::Error),

    /// Calendar (wall) time could not be read or converted to local time.
    #[error("calendar time unavailable: {0}")]
    CalendarUnavailable(String),

    /// A tick rate of zero frames per second was requested.
    #[error("tick rate must be at least 1 Hz")]
    InvalidRate,
}
