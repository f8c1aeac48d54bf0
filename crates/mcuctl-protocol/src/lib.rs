//! TM4C1294 Hardware Demo Shell Protocol
//!
//! This crate provides the types and utilities for talking to the hardware
//! demo firmware running on a TM4C1294 board over its UART command shell.
//! Nothing in here performs I/O: it builds command lines, reassembles reply
//! fragments and decodes the loosely formatted reply text.
//!
//! # Protocol Overview
//!
//! The shell is a simple line-based text interface:
//!
//! - **Commands** (host → firmware): ASCII text terminated with `\r`
//! - **Echo**: the firmware echoes the command line before answering
//! - **Replies** (firmware → host): one or more lines ending in `\r\n`,
//!   starting with a severity word (`OK`, `WARNING`, `ERROR`, `FATAL`)
//! - **Prompt**: the literal `"> "` (no newline) marks the end of a reply
//!
//! # Command Types
//!
//! - **GPIO**: `led`, `button`, `rgb`
//! - **Analog**: `adc`
//! - **Buses**: `i2c`, `i2c-det`, `ssi-set`, `ssi`, `uart-s`, `uart`
//! - **Display**: `lcd ...`
//! - **Firmware**: `info`, `help`
//!
//! # Example
//!
//! ```rust,ignore
//! use mcuctl_protocol::{Command, Response, ButtonStatus};
//!
//! let cmd = Command::button(2)?;
//! let line = cmd.encode();
//!
//! let response = Response::parse("OK: Button 2 status: 1, pressed count: 4, released count: 3\r\n");
//! let status = ButtonStatus::parse(response.body())?;
//! ```

mod codec;
mod commands;
mod constants;
mod error;
mod responses;
mod scanner;

pub use codec::*;
pub use commands::*;
pub use constants::*;
pub use error::*;
pub use responses::*;
pub use scanner::*;
