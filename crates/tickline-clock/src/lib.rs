// SPDX-License-Identifier: MIT
//
// tickline-clock — time sources for frame-paced terminal programs.
//
// A frame loop here is a busy poll: the caller asks "has a full period
// passed since the last tick?" as often as it likes, and does its work when
// the answer is yes. Nothing in this crate sleeps or blocks. Callers that
// want to give the CPU back between polls add their own short sleep
// (see `PaceConfig::idle`).
//
// The clock is a trait so the timer can be driven by a scripted clock in
// tests, and so clock failure surfaces as a value instead of a process exit.

pub mod clock;
pub mod error;
pub mod stamp;
pub mod timer;

pub use clock::{Clock, ManualClock, MonotonicClock, NANOS_PER_SEC, Timespec};
pub use error::ClockError;
pub use stamp::timestamp;
pub use timer::{FrameTimer, PaceConfig, Ticker};
