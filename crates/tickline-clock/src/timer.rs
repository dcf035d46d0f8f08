// SPDX-License-Identifier: MIT
//
// Frame timer — the heartbeat of a polling frame loop.
//
// The loop this supports looks like:
//
//   let mut ticker = Ticker::from_rate(MonotonicClock::new(), 60)?;
//   loop {
//       if ticker.poll()? {
//           // one frame of work
//       }
//       // ...free to check keys, sockets, flags in between
//   }
//
// Polling instead of sleeping keeps the loop responsive to everything else
// it watches. The cost is a spinning core; `PaceConfig::idle` lets the
// caller trade a little latency for most of that CPU back.

use std::time::Duration;

use crate::clock::{Clock, MonotonicClock, NANOS_PER_SEC, Timespec};
use crate::error::ClockError;

// ─── FrameTimer ─────────────────────────────────────────────────────────────

/// Remembers when it was last (re)started and answers "has N ns passed?".
#[derive(Debug, Clone)]
pub struct FrameTimer<C: Clock = MonotonicClock> {
    clock: C,
    started: Timespec,
}

impl<C: Clock> FrameTimer<C> {
    /// Start a timer at the clock's current instant.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Unavailable`] if the clock cannot be read.
    pub fn start(clock: C) -> Result<Self, ClockError> {
        let started = clock.now()?;
        Ok(Self { clock, started })
    }

    /// Begin a new period from the current instant.
    ///
    /// On error the previous start instant is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Unavailable`] if the clock cannot be read.
    pub fn restart(&mut self) -> Result<(), ClockError> {
        self.started = self.clock.now()?;
        Ok(())
    }

    /// The instant of the last (re)start.
    #[inline]
    #[must_use]
    pub const fn started(&self) -> Timespec {
        self.started
    }

    /// Signed nanoseconds since the last (re)start.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Unavailable`] if the clock cannot be read.
    pub fn elapsed_nanos(&self) -> Result<i128, ClockError> {
        Ok(self.clock.now()?.nanos_since(self.started))
    }

    /// Whether at least `nanos` have passed since the last (re)start.
    ///
    /// The boundary is inclusive: exactly `nanos` elapsed counts. A clock
    /// that went backwards reads as negative elapsed time, which never
    /// satisfies any threshold.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Unavailable`] if the clock cannot be read.
    pub fn elapsed_at_least(&self, nanos: u64) -> Result<bool, ClockError> {
        Ok(self.elapsed_nanos()? >= i128::from(nanos))
    }
}

// ─── PaceConfig ─────────────────────────────────────────────────────────────

/// Timing configuration for a polling frame loop.
///
/// The defaults match the classic 60 fps demo loop with no idle sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaceConfig {
    /// Ticks per second.
    pub rate_hz: u32,

    /// Optional sleep between polls that did not tick.
    ///
    /// `None` is a pure busy poll. Keep this well under the frame period
    /// or ticks will arrive late.
    pub idle: Option<Duration>,
}

impl Default for PaceConfig {
    fn default() -> Self {
        Self {
            rate_hz: 60,
            idle: None,
        }
    }
}

impl PaceConfig {
    /// Nanoseconds per tick for this rate.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidRate`] if `rate_hz` is zero.
    pub fn period_nanos(&self) -> Result<u64, ClockError> {
        if self.rate_hz == 0 {
            return Err(ClockError::InvalidRate);
        }
        Ok(NANOS_PER_SEC / u64::from(self.rate_hz))
    }
}

// ─── Ticker ─────────────────────────────────────────────────────────────────

/// A [`FrameTimer`] bound to a fixed period.
///
/// Each successful [`poll`](Self::poll) that crosses the period counts a
/// tick and restarts the timer, so periods are measured from the moment the
/// previous tick was observed. Time spent doing frame work after `poll`
/// returns therefore lands in the next period.
#[derive(Debug, Clone)]
pub struct Ticker<C: Clock = MonotonicClock> {
    timer: FrameTimer<C>,
    period_nanos: u64,
    ticks: u64,
}

impl<C: Clock> Ticker<C> {
    /// A ticker firing every `period_nanos`, starting now.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Unavailable`] if the clock cannot be read.
    pub fn new(clock: C, period_nanos: u64) -> Result<Self, ClockError> {
        Ok(Self {
            timer: FrameTimer::start(clock)?,
            period_nanos,
            ticks: 0,
        })
    }

    /// A ticker firing `rate_hz` times per second.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidRate`] for a zero rate, or
    /// [`ClockError::Unavailable`] if the clock cannot be read.
    pub fn from_rate(clock: C, rate_hz: u32) -> Result<Self, ClockError> {
        let period = PaceConfig {
            rate_hz,
            idle: None,
        }
        .period_nanos()?;
        Self::new(clock, period)
    }

    /// Check the timer; on a full period, count a tick and restart.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Unavailable`] if the clock cannot be read.
    pub fn poll(&mut self) -> Result<bool, ClockError> {
        if !self.timer.elapsed_at_least(self.period_nanos)? {
            return Ok(false);
        }
        self.ticks += 1;
        self.timer.restart()?;
        Ok(true)
    }

    /// Ticks observed so far.
    #[inline]
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The tick period in nanoseconds.
    #[inline]
    #[must_use]
    pub const fn period_nanos(&self) -> u64 {
        self.period_nanos
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
