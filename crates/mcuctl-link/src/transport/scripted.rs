use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use mcuctl_protocol::PROMPT;
use parking_lot::Mutex;

use super::Transport;

/// One scripted answer of the stand-in shell.
#[derive(Debug, Clone)]
enum ScriptedReply {
    /// Reply lines followed by the prompt.
    Lines(Vec<String>),
    /// Reply lines without a prompt.
    NoPrompt(Vec<String>),
    /// Fragments returned verbatim after the echo.
    Fragments(Vec<String>),
    /// No echo and no reply.
    Silent,
}

/// Commands received by a [`ScriptedTransport`], shared with the test.
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    inner: Arc<Mutex<Vec<String>>>,
}

impl CommandLog {
    /// All command lines received so far, without terminator.
    pub fn commands(&self) -> Vec<String> {
        self.inner.lock().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.inner.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    fn push(&self, command: String) {
        self.inner.lock().push(command);
    }
}

/// In-process stand-in for the firmware shell.
///
/// Every command written is echoed and answered with the next queued reply.
/// A command without a queued reply gets no answer at all, which the
/// command channel reports as a framing fault.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: VecDeque<ScriptedReply>,
    pending: VecDeque<String>,
    inbox: Vec<u8>,
    log: CommandLog,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply; each line of `text` is sent with `\r\n`, then the prompt.
    pub fn reply(mut self, text: &str) -> Self {
        self.push_reply(text);
        self
    }

    /// Queue a reply in place.
    pub fn push_reply(&mut self, text: &str) {
        self.replies.push_back(ScriptedReply::Lines(split_lines(text)));
    }

    /// Queue a reply that never ends with the prompt.
    pub fn reply_without_prompt(mut self, text: &str) -> Self {
        self.replies.push_back(ScriptedReply::NoPrompt(split_lines(text)));
        self
    }

    /// Queue raw fragments delivered after the echo, one per read.
    pub fn reply_fragments(mut self, fragments: &[&str]) -> Self {
        self.replies.push_back(ScriptedReply::Fragments(
            fragments.iter().map(|f| f.to_string()).collect(),
        ));
        self
    }

    /// Queue a command that is swallowed without echo or reply.
    pub fn silent(mut self) -> Self {
        self.replies.push_back(ScriptedReply::Silent);
        self
    }

    /// Handle on the commands received, usable after the transport moved.
    pub fn log(&self) -> CommandLog {
        self.log.clone()
    }

    /// Replies queued but not consumed yet.
    pub fn remaining_replies(&self) -> usize {
        self.replies.len()
    }

    fn answer(&mut self, command: String) {
        let reply = self.replies.pop_front().unwrap_or(ScriptedReply::Silent);
        let echo = format!("{}\r\n", command);
        self.log.push(command);
        match reply {
            ScriptedReply::Lines(lines) => {
                self.pending.push_back(echo);
                self.pending
                    .extend(lines.into_iter().map(|line| format!("{}\r\n", line)));
                self.pending.push_back(PROMPT.to_string());
            }
            ScriptedReply::NoPrompt(lines) => {
                self.pending.push_back(echo);
                self.pending
                    .extend(lines.into_iter().map(|line| format!("{}\r\n", line)));
            }
            ScriptedReply::Fragments(fragments) => {
                self.pending.push_back(echo);
                self.pending.extend(fragments);
            }
            ScriptedReply::Silent => {}
        }
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

impl Transport for ScriptedTransport {
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.inbox.extend_from_slice(data);
        while let Some(end) = self.inbox.iter().position(|&b| b == b'\r') {
            let line: Vec<u8> = self.inbox.drain(..=end).collect();
            let command = String::from_utf8_lossy(&line[..end]).into_owned();
            self.answer(command);
        }
        Ok(())
    }

    fn read_line(&mut self, _timeout: Duration) -> io::Result<Option<String>> {
        Ok(self.pending.pop_front())
    }

    fn discard_input(&mut self) -> io::Result<()> {
        self.pending.clear();
        Ok(())
    }

    fn describe(&self) -> String {
        "scripted shell".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_reply_and_prompt() {
        let mut transport = ScriptedTransport::new().reply("OK: LEDs set to 0x05.");
        let log = transport.log();
        transport.write(b"led 0x05\r").unwrap();

        let timeout = Duration::from_millis(1);
        assert_eq!(transport.read_line(timeout).unwrap().as_deref(), Some("led 0x05\r\n"));
        assert_eq!(
            transport.read_line(timeout).unwrap().as_deref(),
            Some("OK: LEDs set to 0x05.\r\n")
        );
        assert_eq!(transport.read_line(timeout).unwrap().as_deref(), Some("> "));
        assert_eq!(transport.read_line(timeout).unwrap(), None);
        assert_eq!(log.commands(), vec!["led 0x05".to_string()]);
    }

    #[test]
    fn test_unscripted_command_is_silent() {
        let mut transport = ScriptedTransport::new();
        transport.write(b"adc\r").unwrap();
        assert_eq!(transport.read_line(Duration::ZERO).unwrap(), None);
        assert_eq!(transport.log().last().as_deref(), Some("adc"));
    }

    #[test]
    fn test_partial_writes_are_joined() {
        let mut transport = ScriptedTransport::new().reply("OK");
        transport.write(b"inf").unwrap();
        assert!(transport.log().is_empty());
        transport.write(b"o\r").unwrap();
        assert_eq!(transport.log().commands(), vec!["info".to_string()]);
        assert_eq!(transport.remaining_replies(), 0);
    }
}
