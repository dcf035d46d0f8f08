// SPDX-License-Identifier: MIT
//
// tickline: ask for a file name in raw mode, then log a timestamped line
// per frame to that file and to stdout.
//
//   prompt → LineEditor (raw-mode session, restored on every path)
//   name   → BufWriter<File>
//   ticks  → Ticker at --fps → "Frame number N at <ctime>"
//
// Exit codes: 0 on success or --help, 1 on a runtime failure, 2 on a bad
// command line.

mod config;
mod frames;
mod logging;

use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use log::{error, info, warn};
use tickline_clock::{MonotonicClock, Ticker, timestamp};
use tickline_term::{LineEditor, LineError};

use config::{Command, Config, USAGE};

fn main() -> ExitCode {
    let config = match Config::from_args(env::args().skip(1)) {
        Ok(Command::Run(config)) => config,
        Ok(Command::Help) => {
            print!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("tickline: {e}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    logging::init();

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<()> {
    let mut editor = LineEditor::stdio(config.editor);
    let name = file_name(editor.read_line(&config.prompt))?;
    info!("logging frames to {name}");

    let file = File::create(&name)
        .with_context(|| format!("could not open file {name}"))?;
    let mut file = BufWriter::new(file);

    let mut ticker = Ticker::from_rate(MonotonicClock::new(), config.pace.rate_hz)
        .context("invalid frame rate")?;
    let mut stdout = io::stdout().lock();

    frames::run(
        &mut ticker,
        &config.pace,
        config.frames,
        timestamp,
        &mut file,
        &mut stdout,
    )?;

    file.flush()
        .with_context(|| format!("could not write file {name}"))?;
    writeln!(stdout, "Please review file: {name}")
        .context("cannot write to stdout")?;
    Ok(())
}

/// Turn the prompt's outcome into a file name. Input that ends mid-line
/// still names the file as long as something was typed.
fn file_name(line: Result<String, LineError>) -> Result<String> {
    let name = match line {
        Ok(name) => name,
        Err(LineError::EndOfInput { partial }) if !partial.is_empty() => {
            warn!("input ended before Enter, using {partial:?}");
            partial
        }
        Err(e) => return Err(e).context("could not read a file name"),
    };

    if name.is_empty() {
        bail!("no file name given");
    }
    Ok(name)
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tickline_term::{AnsiLineDisplay, EditorConfig, ScriptedDevice};

    fn prompt(script: &[u8]) -> Result<String, LineError> {
        let mut editor = LineEditor::new(
            ScriptedDevice::new(script),
            AnsiLineDisplay::new(Vec::new(), None),
            EditorConfig::default(),
        );
        editor.read_line("Write a name for the file: ")
    }

    #[test]
    fn typed_name_is_used() {
        assert_eq!(file_name(prompt(b"out.txt\n")).unwrap(), "out.txt");
    }

    #[test]
    fn edited_name_is_used() {
        assert_eq!(file_name(prompt(b"ab\x7fc\n")).unwrap(), "ac");
    }

    #[test]
    fn partial_name_at_end_of_input_is_used() {
        assert_eq!(file_name(prompt(b"log")).unwrap(), "log");
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = file_name(prompt(b"\n")).unwrap_err();
        assert_eq!(err.to_string(), "no file name given");
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = file_name(prompt(b"")).unwrap_err();
        assert_eq!(err.to_string(), "could not read a file name");
    }
}
