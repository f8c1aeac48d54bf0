//! Command channel: one command out, one reply back.
//!
//! The channel writes a command line, drops the echo, collects reply
//! fragments until the prompt shows up and classifies the result. It never
//! interprets severity; a WARNING or ERROR reply is still a successful
//! transaction. Only a missing prompt (framing fault) or a transport error
//! fails `send`.

use std::sync::Arc;
use std::time::Duration;

use mcuctl_protocol::{Command, CommandError, LineCodec, ReplyAccumulator, ReplyProgress, Response};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::config::{ChannelConfig, LinkConfig};
use crate::counters::AccessCounters;
use crate::error::{LinkError, LinkResult};
use crate::transport::{open_transport, Transport};

/// Channel shared by all peripheral handles.
pub type SharedChannel = Arc<Mutex<CommandChannel>>;

/// Progress of the current transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Idle,
    Sending,
    AwaitingEcho,
    Accumulating,
    Complete,
    TimedOut,
}

/// Synchronous command/response engine over a [`Transport`].
pub struct CommandChannel {
    transport: Box<dyn Transport>,
    config: ChannelConfig,
    poll_timeout: Duration,
    state: ChannelState,
    counters: AccessCounters,
    last_response: Option<Response>,
}

impl CommandChannel {
    pub fn new(transport: Box<dyn Transport>, config: ChannelConfig) -> Self {
        let poll_timeout = config.poll_timeout();
        CommandChannel {
            transport,
            config,
            poll_timeout,
            state: ChannelState::Idle,
            counters: AccessCounters::default(),
            last_response: None,
        }
    }

    /// Open the transport named by `config` and wrap it in a channel.
    pub fn open(config: &LinkConfig) -> LinkResult<Self> {
        config.validate()?;
        let transport = open_transport(config.device_path(), &config.serial)?;
        Ok(Self::new(transport, config.channel.clone()))
    }

    pub fn into_shared(self) -> SharedChannel {
        Arc::new(Mutex::new(self))
    }

    pub fn is_simulated(&self) -> bool {
        self.transport.is_simulated()
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn counters(&self) -> AccessCounters {
        self.counters
    }

    /// Reply of the last completed transaction.
    pub fn last_response(&self) -> Option<&Response> {
        self.last_response.as_ref()
    }

    /// Send a command and wait for its reply.
    pub fn send(&mut self, command: &Command) -> LinkResult<Response> {
        self.transact(&command.to_command_string())
    }

    /// Send a free-form command line.
    pub fn send_line(&mut self, line: &str) -> LinkResult<Response> {
        let command = Command::raw(line)?;
        self.send(&command)
    }

    /// Send a command with a longer poll timeout for this one transaction.
    pub fn send_with_poll_timeout(&mut self, command: &Command, timeout: Duration) -> LinkResult<Response> {
        let saved = std::mem::replace(&mut self.poll_timeout, timeout);
        let result = self.send(command);
        self.poll_timeout = saved;
        result
    }

    /// Drop stale input from the device.
    ///
    /// Reads until nothing more arrives or `max_lines` lines were consumed.
    pub fn clear(&mut self) -> LinkResult<()> {
        if self.is_simulated() {
            return Ok(());
        }
        self.transport.discard_input()?;
        for _ in 0..self.config.max_lines {
            match self.transport.read_line(self.poll_timeout)? {
                Some(stale) => trace!("Discarding stale input {:?}", stale),
                None => break,
            }
        }
        self.state = ChannelState::Idle;
        Ok(())
    }

    /// Link settings, timing and counters as a printable report.
    pub fn details(&self) -> String {
        format!(
            "{}, response timeout: {:?}, poll timeout: {:?}, max lines: {}, {}",
            self.transport.describe(),
            self.config.response_timeout(),
            self.poll_timeout,
            self.config.max_lines,
            self.counters
        )
    }

    fn transact(&mut self, line: &str) -> LinkResult<Response> {
        if line.contains(['\r', '\n']) {
            return Err(CommandError::EmbeddedNewline(line.to_string()).into());
        }
        self.last_response = None;

        if self.transport.is_simulated() {
            debug!("Simulated command `{}`", line);
            let response = Response::simulated();
            self.last_response = Some(response.clone());
            self.state = ChannelState::Complete;
            return Ok(response);
        }

        self.state = ChannelState::Sending;
        debug!("Sending command `{}`", line);
        let frame = LineCodec::encode_command(line);
        if let Err(e) = self.transport.write(&frame) {
            return Err(self.fail(e.into()));
        }
        self.counters.record_write(frame.len());

        let max_lines = self.config.max_lines;
        let mut reads = 0;

        self.state = ChannelState::AwaitingEcho;
        let response_timeout = self.config.response_timeout();
        loop {
            reads += 1;
            match self.read_fragment(response_timeout)? {
                Some(echo) if !echo.is_empty() => {
                    trace!("Echo {:?}", echo);
                    break;
                }
                _ => {}
            }
            if reads > max_lines {
                debug!("No echo for `{}` after {} reads", line, reads);
                break;
            }
        }

        self.state = ChannelState::Accumulating;
        let mut accumulator = ReplyAccumulator::new();
        loop {
            reads += 1;
            let fragment = self.read_fragment(self.poll_timeout)?;
            if let Some(fragment) = fragment {
                if accumulator.push_fragment(&fragment) == ReplyProgress::Prompt {
                    break;
                }
            }
            if reads > max_lines {
                self.state = ChannelState::TimedOut;
                self.counters.record_error();
                let partial = accumulator.finish();
                warn!("No prompt after {} reads in reply to `{}`", reads, line);
                return Err(LinkError::IncompleteResponse {
                    command: line.to_string(),
                    lines: reads,
                    partial,
                });
            }
        }

        let response = Response::parse(accumulator.finish());
        self.state = ChannelState::Complete;
        if self.config.verbosity >= 3 {
            debug!("Reply to `{}`: {}", line, response.full());
        } else {
            trace!("Reply to `{}`: {:?}", line, response.severity());
        }
        self.last_response = Some(response.clone());
        Ok(response)
    }

    fn read_fragment(&mut self, timeout: Duration) -> LinkResult<Option<String>> {
        match self.transport.read_line(timeout) {
            Ok(Some(fragment)) => {
                self.counters.record_read(fragment.len());
                trace!("Read {:?}", fragment);
                Ok(Some(fragment))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(self.fail(e.into())),
        }
    }

    fn fail(&mut self, error: LinkError) -> LinkError {
        warn!("Transport error: {}", error);
        self.counters.record_error();
        self.state = ChannelState::Idle;
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{ScriptedTransport, SimulatedTransport};
    use mcuctl_protocol::{Severity, SIMULATED_BODY};

    fn channel(transport: ScriptedTransport) -> CommandChannel {
        CommandChannel::new(Box::new(transport), ChannelConfig::default())
    }

    #[test]
    fn test_simulated_send() {
        let mut channel = CommandChannel::new(Box::new(SimulatedTransport::new()), ChannelConfig::default());
        let response = channel.send(&Command::Adc).unwrap();
        assert_eq!(response.severity(), Severity::Ok);
        assert_eq!(response.body(), SIMULATED_BODY);
        assert_eq!(channel.state(), ChannelState::Complete);
        assert_eq!(channel.counters().write_accesses, 0);
    }

    #[test]
    fn test_send_collects_reply() {
        let transport = ScriptedTransport::new().reply("OK: LEDs set to 0x05.");
        let log = transport.log();
        let mut channel = channel(transport);

        let response = channel.send(&Command::led_set(5)).unwrap();
        assert_eq!(response.full(), "OK: LEDs set to 0x05.");
        assert_eq!(log.commands(), vec!["led 0x05".to_string()]);
        assert_eq!(channel.last_response(), Some(&response));
        assert_eq!(channel.counters().write_accesses, 1);
        assert_eq!(channel.counters().units_written, 9);
    }

    #[test]
    fn test_device_error_is_not_a_channel_error() {
        let transport = ScriptedTransport::new().reply("ERROR: Unknown command");
        let mut channel = channel(transport);
        let response = channel.send_line("bogus").unwrap();
        assert_eq!(response.severity(), Severity::Error);
        assert_eq!(response.body(), "Unknown command");
    }

    #[test]
    fn test_missing_prompt_is_framing_fault() {
        let transport = ScriptedTransport::new().reply_without_prompt("OK. Data: 0x12");
        let mut channel = channel(transport);
        let err = channel.send(&Command::Adc).unwrap_err();
        assert!(err.is_framing_fault());
        assert_eq!(channel.state(), ChannelState::TimedOut);
        assert_eq!(channel.counters().errors, 1);
        assert!(channel.last_response().is_none());
        match err {
            LinkError::IncompleteResponse { partial, .. } => assert_eq!(partial, "OK. Data: 0x12\n"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_fragmented_reply() {
        let transport = ScriptedTransport::new().reply_fragments(&["OK. Da", "ta: 0x12\r", "\n", ">", " "]);
        let mut channel = channel(transport);
        let response = channel.send(&Command::Adc).unwrap();
        assert_eq!(response.full(), "OK. Data: 0x12");
    }

    #[test]
    fn test_poll_timeout_restored() {
        let transport = ScriptedTransport::new().reply("OK");
        let mut channel = channel(transport);
        let before = channel.poll_timeout;
        channel
            .send_with_poll_timeout(&Command::I2cDetect { port: 2 }, Duration::from_millis(20))
            .unwrap();
        assert_eq!(channel.poll_timeout, before);

        // restored on failure as well
        channel
            .send_with_poll_timeout(&Command::I2cDetect { port: 2 }, Duration::from_millis(20))
            .unwrap_err();
        assert_eq!(channel.poll_timeout, before);
    }

    #[test]
    fn test_embedded_newline_rejected() {
        let transport = ScriptedTransport::new();
        let log = transport.log();
        let mut channel = channel(transport);
        assert!(channel.send_line("led\r\nadc").is_err());
        assert!(log.is_empty());
    }

    /// Hands out one queued read result per `read_line`, `None` once drained.
    struct QueuedReads(std::collections::VecDeque<Option<&'static str>>);

    impl Transport for QueuedReads {
        fn write(&mut self, _data: &[u8]) -> std::io::Result<()> {
            Ok(())
        }

        fn read_line(&mut self, _timeout: Duration) -> std::io::Result<Option<String>> {
            Ok(self.0.pop_front().flatten().map(str::to_string))
        }

        fn describe(&self) -> String {
            "queued reads".to_string()
        }
    }

    fn queued(max_lines: usize, reads: &[Option<&'static str>]) -> CommandChannel {
        let config = ChannelConfig {
            max_lines,
            ..Default::default()
        };
        CommandChannel::new(Box::new(QueuedReads(reads.iter().copied().collect())), config)
    }

    #[test]
    fn test_late_echo_within_bound() {
        let mut channel = queued(5, &[None, None, Some("adc\r\n"), Some("OK\r\n"), Some("> ")]);
        let response = channel.send(&Command::Adc).unwrap();
        assert_eq!(response.full(), "OK");
        assert_eq!(channel.state(), ChannelState::Complete);
    }

    #[test]
    fn test_echo_bound_exhausted_then_prompt() {
        // four silent reads use up the bound of 3 in the echo phase
        let mut channel = queued(3, &[None, None, None, None, Some("> ")]);
        let response = channel.send(&Command::Adc).unwrap();
        assert_eq!(response.full(), "");
        assert_eq!(channel.state(), ChannelState::Complete);
        assert_eq!(channel.counters().errors, 0);
    }

    #[test]
    fn test_echo_bound_exhausted_without_prompt() {
        let mut channel = queued(3, &[None, None, None, None, Some("OK\r\n"), Some("> ")]);
        match channel.send(&Command::Adc).unwrap_err() {
            LinkError::IncompleteResponse { lines, partial, .. } => {
                assert_eq!(lines, 5);
                assert_eq!(partial, "OK\n");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(channel.state(), ChannelState::TimedOut);
    }

    #[test]
    fn test_new_send_replaces_last_response() {
        let transport = ScriptedTransport::new().reply("OK first").reply_without_prompt("OK second");
        let mut channel = channel(transport);
        channel.send_line("info").unwrap();
        assert!(channel.last_response().is_some());
        channel.send_line("info").unwrap_err();
        assert!(channel.last_response().is_none());
    }
}
