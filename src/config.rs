// SPDX-License-Identifier: MIT
//
// Command-line configuration for the frame-log driver.
//
// Parsed by hand from `env::args()`: a handful of flags does not earn a
// CLI framework. Every flag has a default, so a bare `tickline` behaves
// like the classic demo (60 fps, five frames, skip failed reads).

use std::time::Duration;

use thiserror::Error;
use tickline_clock::PaceConfig;
use tickline_term::{ControlBytes, EditorConfig, ReadFailure};

pub const USAGE: &str = "\
Usage: tickline [OPTIONS]

Asks for a file name, then logs one timestamped line per frame to that
file and to stdout.

Options:
  --fps <n>                  frames per second (default 60)
  --frames <n>               frames to log, 0 for no limit (default 5)
  --idle-us <n>              sleep between polls in microseconds (default: busy poll)
  --prompt <text>            file name prompt
  --on-read-error <policy>   skip | nul | abort (default skip)
  --drop-control             ignore control characters typed at the prompt
  -h, --help                 show this help

Environment:
  TICKLINE_LOG               log filter, env_logger syntax (default warn)
";

const DEFAULT_PROMPT: &str = "Write a name for the file: ";

/// A rejected command line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown option `{0}`")]
    UnknownFlag(String),

    #[error("option `{0}` needs a value")]
    MissingValue(&'static str),

    #[error("invalid value `{value}` for `{flag}`: {reason}")]
    InvalidValue {
        flag: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Config),
    Help,
}

/// Driver settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub pace: PaceConfig,
    /// Frames to log; `None` runs until interrupted.
    pub frames: Option<u64>,
    pub prompt: String,
    pub editor: EditorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pace: PaceConfig::default(),
            frames: Some(5),
            prompt: DEFAULT_PROMPT.to_owned(),
            editor: EditorConfig::default(),
        }
    }
}

impl Config {
    /// Parse arguments (without the program name).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for unknown flags, missing values, or
    /// values that do not parse.
    pub fn from_args<I, S>(args: I) -> Result<Command, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter().map(Into::<String>::into);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => return Ok(Command::Help),
                "--fps" => {
                    let rate: u32 = parse_number(&mut args, "--fps")?;
                    if rate == 0 {
                        return Err(invalid("--fps", "0", "must be at least 1"));
                    }
                    config.pace.rate_hz = rate;
                }
                "--frames" => {
                    let n: u64 = parse_number(&mut args, "--frames")?;
                    config.frames = (n > 0).then_some(n);
                }
                "--idle-us" => {
                    let us: u64 = parse_number(&mut args, "--idle-us")?;
                    config.pace.idle = (us > 0).then(|| Duration::from_micros(us));
                }
                "--prompt" => {
                    config.prompt = args.next().ok_or(ConfigError::MissingValue("--prompt"))?;
                }
                "--on-read-error" => {
                    let value = args
                        .next()
                        .ok_or(ConfigError::MissingValue("--on-read-error"))?;
                    config.editor.on_read_error = match value.as_str() {
                        "skip" => ReadFailure::Skip,
                        "nul" => ReadFailure::InsertNul,
                        "abort" => ReadFailure::Abort,
                        _ => {
                            return Err(invalid(
                                "--on-read-error",
                                &value,
                                "expected skip, nul or abort",
                            ));
                        }
                    };
                }
                "--drop-control" => config.editor.control_bytes = ControlBytes::Drop,
                _ => return Err(ConfigError::UnknownFlag(arg)),
            }
        }

        Ok(Command::Run(config))
    }
}

fn parse_number<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<T, ConfigError> {
    let value = args.next().ok_or(ConfigError::MissingValue(flag))?;
    value
        .parse()
        .map_err(|_| invalid(flag, &value, "not a non-negative integer"))
}

fn invalid(flag: &'static str, value: &str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        flag,
        value: value.to_owned(),
        reason,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
