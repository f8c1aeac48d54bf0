//! # mcuctl-runner
//!
//! Batch file execution and the board self-test on top of `mcuctl-link`.
//! The `mcuctl` binary wires both to the command line.

pub mod batch;
pub mod error;
pub mod logging;
pub mod selftest;

pub use batch::{parse_line, BatchOptions, BatchRunner, BatchSummary, ScriptError, ScriptLine};
pub use error::RunnerError;
pub use selftest::{SelfTest, SelfTestReport};
