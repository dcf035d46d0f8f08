// SPDX-License-Identifier: MIT
//
// The frame-log loop: on every tick, write one stamped line to the log
// file and echo it to the terminal.

use std::io::Write;
use std::thread;

use anyhow::{Context, Result};
use tickline_clock::{Clock, ClockError, PaceConfig, Ticker};

/// The line recorded for frame `n`.
#[must_use]
pub fn frame_line(n: u64, stamp: &str) -> String {
    format!("Frame number {n} at {stamp}\n")
}

/// Poll `ticker` until `frames` ticks have been logged (forever if `None`).
///
/// Between polls that did not tick, sleeps for `pace.idle` if set.
///
/// # Errors
///
/// Fails on clock or calendar errors and on write errors to either sink.
pub fn run<C: Clock>(
    ticker: &mut Ticker<C>,
    pace: &PaceConfig,
    frames: Option<u64>,
    mut stamp: impl FnMut() -> Result<String, ClockError>,
    file: &mut impl Write,
    out: &mut impl Write,
) -> Result<()> {
    while frames.is_none_or(|limit| ticker.ticks() < limit) {
        if !ticker.poll().context("frame timer failed")? {
            if let Some(idle) = pace.idle {
                thread::sleep(idle);
            }
            continue;
        }

        let now = stamp().context("cannot stamp frame")?;
        let line = frame_line(ticker.ticks(), &now);

        file.write_all(line.as_bytes())
            .context("cannot write frame to file")?;
        out.write_all(line.as_bytes())
            .and_then(|()| out.flush())
            .context("cannot write frame to stdout")?;
    }
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
