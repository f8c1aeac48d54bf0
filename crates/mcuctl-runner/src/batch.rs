//! Command batch files.
//!
//! A batch file holds one shell command per line:
//!
//! ```text
//! # Blink the LEDs
//! led 0x0f        # all on
//! delay 500000    # microseconds
//! led 0x00
//! lcd text 10 10 0xffffff 0 #1 is drawn, not a comment
//! exit
//! ```
//!
//! `#` starts a comment except on `lcd text` lines. `delay` and `exit` are
//! handled by the runner; everything else goes to the device. Replies to
//! `help`, `info` and `lcd help` are not evaluated.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use mcuctl_link::{CommandChannel, Severity};
use mcuctl_protocol::{parse_int_literal, PROMPT};
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

use crate::error::RunnerError;

pub const COMMENT_MARKER: char = '#';

/// One parsed batch file line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptLine {
    /// Empty or comment-only line.
    Blank,
    /// Sleep before the next line.
    Delay(Duration),
    /// Stop executing the file.
    Exit,
    /// A command for the device.
    Device {
        command: String,
        /// Whether the reply severity counts toward the summary.
        evaluate: bool,
        comment: String,
    },
}

/// A line the runner cannot execute.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("delay value required after command `delay`")]
    MissingDelay,
    #[error("invalid delay value `{0}`")]
    InvalidDelay(String),
}

/// Parse one batch file line.
pub fn parse_line(line: &str) -> Result<ScriptLine, ScriptError> {
    let stripped = line.trim_matches([' ', '\t', '\n', '\r']);
    let (code, comment) = match stripped.find(COMMENT_MARKER) {
        Some(pos) => (
            stripped[..pos].trim_matches([' ', '\t']),
            &stripped[pos + COMMENT_MARKER.len_utf8()..],
        ),
        None => (stripped, ""),
    };

    let mut tokens = code.split([' ', '\t']).filter(|token| !token.is_empty());
    let Some(keyword) = tokens.next() else {
        return Ok(ScriptLine::Blank);
    };
    let argument = tokens.next();

    match keyword {
        "delay" => {
            let value = argument.ok_or(ScriptError::MissingDelay)?;
            let micros = parse_int_literal(value)
                .ok()
                .and_then(|v| u64::try_from(v).ok())
                .ok_or_else(|| ScriptError::InvalidDelay(value.to_string()))?;
            Ok(ScriptLine::Delay(Duration::from_micros(micros)))
        }
        "exit" => Ok(ScriptLine::Exit),
        _ => {
            // `#` is drawable text here
            let (command, comment) = if keyword == "lcd" && argument == Some("text") {
                (stripped, "")
            } else {
                (code, comment)
            };
            let evaluate =
                !(keyword == "help" || keyword == "info" || (keyword == "lcd" && argument == Some("help")));
            Ok(ScriptLine::Device {
                command: command.to_string(),
                evaluate,
                comment: comment.to_string(),
            })
        }
    }
}

/// Statistics of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub lines: usize,
    pub internal_commands: usize,
    pub device_commands: usize,
    pub ok: usize,
    pub not_evaluated: usize,
    pub warnings: usize,
    pub errors: usize,
    /// Line that stopped the run on error.
    pub stopped_at: Option<usize>,
    /// The run was interrupted with Ctrl-C.
    pub interrupted: bool,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.errors == 0 && !self.interrupted
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Lines processed:             {}", self.lines)?;
        writeln!(f, "Internal commands:           {}", self.internal_commands)?;
        writeln!(f, "MCU commands executed:       {}", self.device_commands)?;
        writeln!(f, "MCU commands OK:             {}", self.ok)?;
        writeln!(f, "MCU commands w/o evaluation: {}", self.not_evaluated)?;
        writeln!(f, "MCU command warnings:        {}", self.warnings)?;
        write!(f, "MCU command errors:          {}", self.errors)
    }
}

/// Options of a batch run.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    pub stop_on_error: bool,
}

/// Executes batch files over a command channel.
pub struct BatchRunner {
    options: BatchOptions,
    stop: Arc<AtomicBool>,
}

impl BatchRunner {
    pub fn new(options: BatchOptions) -> Self {
        BatchRunner {
            options,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stop between lines once `flag` is set.
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop = flag;
        self
    }

    pub fn run_file(&self, channel: &mut CommandChannel, path: &Path) -> Result<BatchSummary, RunnerError> {
        let file = File::open(path).map_err(|source| RunnerError::BatchFile {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Executing batch file {}", path.display());
        self.run(channel, BufReader::new(file))
            .map_err(|e| match e {
                RunnerError::BatchFile { source, .. } => RunnerError::BatchFile {
                    path: path.to_path_buf(),
                    source,
                },
                other => other,
            })
    }

    /// Execute the lines of `script`.
    ///
    /// Device and script errors are counted in the summary; only a failure
    /// to read the script ends the run with an error.
    pub fn run(&self, channel: &mut CommandChannel, script: impl BufRead) -> Result<BatchSummary, RunnerError> {
        let mut summary = BatchSummary::default();

        for (index, line) in script.lines().enumerate() {
            if self.stop.load(Ordering::SeqCst) {
                warn!("Batch execution interrupted before line {}", index + 1);
                summary.interrupted = true;
                break;
            }
            let line = line.map_err(|source| RunnerError::BatchFile {
                path: Default::default(),
                source,
            })?;
            let number = index + 1;
            summary.lines += 1;
            trace!("Line {}: {}", number, line.trim_end());

            let parsed = match parse_line(&line) {
                Ok(parsed) => parsed,
                Err(e) => {
                    summary.errors += 1;
                    error!("Line {}: {}", number, e);
                    if self.options.stop_on_error {
                        summary.stopped_at = Some(number);
                        break;
                    }
                    continue;
                }
            };

            match parsed {
                ScriptLine::Blank => {}
                ScriptLine::Delay(duration) => {
                    summary.internal_commands += 1;
                    thread::sleep(duration);
                }
                ScriptLine::Exit => {
                    summary.internal_commands += 1;
                    info!("Execution stopped by `exit` in line {}", number);
                    break;
                }
                ScriptLine::Device {
                    command,
                    evaluate,
                    comment,
                } => {
                    summary.device_commands += 1;
                    if !evaluate {
                        summary.not_evaluated += 1;
                    }
                    debug!("Line {}: command `{}`, comment `{}`", number, command, comment);
                    info!("{}{}", PROMPT, command);

                    let failed = match channel.send_line(&command) {
                        Err(e) => {
                            summary.errors += 1;
                            error!("Line {}: error sending `{}`: {}", number, command, e);
                            true
                        }
                        Ok(response) => {
                            info!("{}", response.full());
                            if !evaluate {
                                false
                            } else {
                                match response.severity() {
                                    Severity::Ok => {
                                        summary.ok += 1;
                                        false
                                    }
                                    Severity::Warning => {
                                        summary.warnings += 1;
                                        warn!("Line {}: warning from `{}`: {}", number, command, response.body());
                                        false
                                    }
                                    severity => {
                                        summary.errors += 1;
                                        error!("Line {}: `{}` failed with {}: {}", number, command, severity, response.body());
                                        true
                                    }
                                }
                            }
                        }
                    };

                    if failed && self.options.stop_on_error {
                        error!("Execution stopped after error in line {}", number);
                        summary.stopped_at = Some(number);
                        break;
                    }
                }
            }
        }

        Ok(summary)
    }
}
