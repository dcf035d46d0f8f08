// SPDX-License-Identifier: MIT
//
// Time sources.
//
// `Timespec` is the unit of exchange: seconds plus sub-second nanoseconds,
// the same split the kernel hands back from clock_gettime(). Two of them
// are only ever compared by subtraction, which yields a signed nanosecond
// delta computed in i128 so even absurd uptimes cannot overflow.
#![allow(unsafe_code)]

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::error::ClockError;

/// Nanoseconds in one second.
pub const NANOS_PER_SEC: u64 = 1_000_000_000;

// ─── Timespec ───────────────────────────────────────────────────────────────

/// A point on a clock's timeline with nanosecond resolution.
///
/// Only meaningful relative to another `Timespec` from the same clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timespec {
    secs: i64,
    nanos: u32,
}

impl Timespec {
    /// The clock's origin.
    pub const ZERO: Self = Self { secs: 0, nanos: 0 };

    /// Build a timespec, carrying whole seconds out of `nanos`.
    #[must_use]
    pub const fn new(secs: i64, nanos: u32) -> Self {
        let carry = nanos / 1_000_000_000;
        Self {
            secs: secs.saturating_add(carry as i64),
            nanos: nanos % 1_000_000_000,
        }
    }

    /// Whole seconds.
    #[inline]
    #[must_use]
    pub const fn secs(self) -> i64 {
        self.secs
    }

    /// Nanoseconds past the whole second, always below [`NANOS_PER_SEC`].
    #[inline]
    #[must_use]
    pub const fn subsec_nanos(self) -> u32 {
        self.nanos
    }

    /// Signed nanoseconds from `earlier` to `self`.
    ///
    /// Negative if `earlier` is actually later.
    #[must_use]
    pub fn nanos_since(self, earlier: Self) -> i128 {
        let secs = i128::from(self.secs) - i128::from(earlier.secs);
        let nanos = i128::from(self.nanos) - i128::from(earlier.nanos);
        secs * i128::from(NANOS_PER_SEC) + nanos
    }

    /// This timespec moved forward by `nanos`.
    #[must_use]
    pub fn saturating_add_nanos(self, nanos: u64) -> Self {
        let total = u64::from(self.nanos) + nanos % NANOS_PER_SEC;
        let whole = nanos / NANOS_PER_SEC + total / NANOS_PER_SEC;
        #[allow(clippy::cast_possible_truncation)] // total % 1e9 < 2^32.
        let sub = (total % NANOS_PER_SEC) as u32;
        Self {
            secs: self
                .secs
                .saturating_add(i64::try_from(whole).unwrap_or(i64::MAX)),
            nanos: sub,
        }
    }
}

impl From<Duration> for Timespec {
    fn from(d: Duration) -> Self {
        Self {
            secs: i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
            nanos: d.subsec_nanos(),
        }
    }
}

// ─── Clock ──────────────────────────────────────────────────────────────────

/// Something that can tell the current time.
pub trait Clock {
    /// Read the current instant.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Unavailable`] if the underlying source cannot
    /// be read.
    fn now(&self) -> Result<Timespec, ClockError>;
}

// ─── MonotonicClock ─────────────────────────────────────────────────────────

/// The system's monotonic clock.
///
/// Unaffected by wall-clock adjustments, so a frame period never stretches
/// or collapses when NTP steps the time.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl MonotonicClock {
    /// Create a handle to the system monotonic clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl Clock for MonotonicClock {
    #[allow(clippy::useless_conversion)] // time_t is i32 on some targets.
    fn now(&self) -> Result<Timespec, ClockError> {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        let rc = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &raw mut ts) };
        if rc != 0 {
            return Err(ClockError::Unavailable(std::io::Error::last_os_error()));
        }

        let nanos = u32::try_from(ts.tv_nsec).map_err(|_| {
            ClockError::Unavailable(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "clock_gettime returned an out-of-range tv_nsec",
            ))
        })?;
        Ok(Timespec::new(i64::from(ts.tv_sec), nanos))
    }
}

#[cfg(not(unix))]
impl Clock for MonotonicClock {
    fn now(&self) -> Result<Timespec, ClockError> {
        use std::sync::OnceLock;
        use std::time::Instant;

        static ORIGIN: OnceLock<Instant> = OnceLock::new();
        let origin = *ORIGIN.get_or_init(Instant::now);
        Ok(Timespec::from(origin.elapsed()))
    }
}

// ─── ManualClock ────────────────────────────────────────────────────────────

/// A clock that only moves when told to.
///
/// Clones share the same timeline, so a test can hand one clone to a
/// [`FrameTimer`](crate::timer::FrameTimer) and advance the other.
/// It can also be switched into a failing state to exercise error paths.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Timespec>>,
    unavailable: Rc<Cell<bool>>,
}

impl ManualClock {
    /// A clock reading `start`.
    #[must_use]
    pub fn new(start: Timespec) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
            unavailable: Rc::new(Cell::new(false)),
        }
    }

    /// Jump to an absolute time. May move backwards.
    pub fn set(&self, t: Timespec) {
        self.now.set(t);
    }

    /// Move forward by `nanos`.
    pub fn advance_nanos(&self, nanos: u64) {
        self.now.set(self.now.get().saturating_add_nanos(nanos));
    }

    /// Move forward by a [`Duration`].
    pub fn advance(&self, d: Duration) {
        self.advance_nanos(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX));
    }

    /// Make subsequent reads fail (`true`) or succeed again (`false`).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Result<Timespec, ClockError> {
        if self.unavailable.get() {
            return Err(ClockError::Unavailable(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "manual clock marked unavailable",
            )));
        }
        Ok(self.now.get())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
