// SPDX-License-Identifier: MIT
//
// Diagnostics on stderr, one timestamped line per record:
//
//   [ Sun Jul 16 14:03:09 2023 ] WARN: read from input device failed: ...
//
// The filter comes from TICKLINE_LOG (env_logger syntax), defaulting to
// `warn` so degraded reads are visible without asking.

use std::fmt::Display;
use std::io::Write;
use std::sync::Once;

use env_logger::{Builder, Env};
use log::Level;
use tickline_clock::timestamp;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "TICKLINE_LOG";

static INIT: Once = Once::new();

/// Install the global logger. Later calls are ignored.
pub fn init() {
    INIT.call_once(|| {
        Builder::from_env(Env::default().filter_or(LOG_ENV, "warn"))
            .format(|buf, record| {
                writeln!(buf, "{}", render(&stamp(), record.level(), record.args()))
            })
            .init();

        log::debug!("logging initialized");
    });
}

/// The current time for a log line. A diagnostic must not fail because the
/// calendar is unavailable, so that case gets a placeholder.
fn stamp() -> String {
    timestamp().unwrap_or_else(|_| String::from("time unavailable"))
}

fn render(stamp: &str, level: Level, message: impl Display) -> String {
    format!("[ {stamp} ] {level}: {message}")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn render_layout() {
        assert_eq!(
            render("Sun Jul 16 14:03:09 2023", Level::Error, "clock gone"),
            "[ Sun Jul 16 14:03:09 2023 ] ERROR: clock gone"
        );
    }

    #[test]
    fn render_warn_level() {
        assert!(render("t", Level::Warn, "x").contains("] WARN: x"));
    }

    #[test]
    fn stamp_is_never_empty() {
        assert!(!stamp().is_empty());
    }

    #[test]
    fn init_is_idempotent() {
        init();
        init();
    }
}
