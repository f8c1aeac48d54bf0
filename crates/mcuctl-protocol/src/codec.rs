//! Line-based codec for the firmware shell.
//!
//! Commands are terminated with a carriage return (`\r`). Replies arrive as
//! `\r\n` terminated lines followed by the newline-less prompt `"> "`, so the
//! receive side has to cope with fragments: complete lines, and whatever
//! partial text was pending when a read timed out.

use bytes::BytesMut;
use log::trace;

use crate::constants::{COMMAND_TERMINATOR, PROMPT};

/// Maximum length of a shell line (size of the firmware's input buffer).
pub const MAX_LINE_LENGTH: usize = 256;

/// Reassembles received bytes into lines.
///
/// Lines end at `\n`; the `\r` before it stays part of the line so callers
/// can tell a complete line from a partial one.
#[derive(Debug, Default)]
pub struct LineCodec {
    /// Buffer for accumulating incoming data.
    buffer: BytesMut,
}

impl LineCodec {
    /// Create a new line codec.
    pub fn new() -> Self {
        LineCodec {
            buffer: BytesMut::with_capacity(MAX_LINE_LENGTH * 2),
        }
    }

    /// Add received data to the buffer.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Take the next complete line from the buffer, terminator included.
    pub fn decode_line(&mut self) -> Option<String> {
        let end = self.buffer.iter().position(|&byte| byte == b'\n')?;
        let line = self.buffer.split_to(end + 1);
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// Take whatever is buffered without waiting for a line terminator.
    ///
    /// Returns `None` when the buffer is empty.
    pub fn take_partial(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let data = self.buffer.split();
        Some(String::from_utf8_lossy(&data).into_owned())
    }

    /// Encode a command line for sending.
    pub fn encode_command(cmd: &str) -> Vec<u8> {
        let mut data = Vec::with_capacity(cmd.len() + 1);
        data.extend_from_slice(cmd.as_bytes());
        data.push(COMMAND_TERMINATOR);
        data
    }

    /// Get the number of bytes in the buffer.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// Outcome of feeding one fragment to a [`ReplyAccumulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyProgress {
    /// More fragments are needed.
    Pending,
    /// The prompt was seen; the reply is complete.
    Prompt,
}

/// Joins reply fragments into the reply text.
///
/// Completed lines lose their `\r\n` and get a single `\n` back. A fragment
/// (or a pending partial line) that is exactly the prompt completes the reply.
#[derive(Debug, Default, Clone)]
pub struct ReplyAccumulator {
    text: String,
    partial: String,
    lines: usize,
}

impl ReplyAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one fragment as returned by a transport read.
    pub fn push_fragment(&mut self, fragment: &str) -> ReplyProgress {
        if fragment.is_empty() {
            return ReplyProgress::Pending;
        }
        if self.partial.is_empty() && fragment == PROMPT {
            return ReplyProgress::Prompt;
        }

        self.partial.push_str(fragment);
        if self.partial.ends_with('\n') {
            let line = self.partial.trim_end_matches(['\n', '\r']);
            trace!("reply line: {:?}", line);
            self.text.push_str(line);
            self.text.push('\n');
            self.lines += 1;
            self.partial.clear();
        } else if self.partial == PROMPT {
            self.partial.clear();
            return ReplyProgress::Prompt;
        }
        ReplyProgress::Pending
    }

    /// Number of complete lines collected so far.
    pub fn line_count(&self) -> usize {
        self.lines
    }

    /// Text collected so far, including an uncommitted partial line.
    pub fn text(&self) -> String {
        let mut text = self.text.clone();
        text.push_str(&self.partial);
        text
    }

    /// Consume the accumulator and return the reply text.
    pub fn finish(mut self) -> String {
        self.text.push_str(&self.partial);
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_command() {
        let encoded = LineCodec::encode_command("led 0x05");
        assert_eq!(encoded, b"led 0x05\r");
    }

    #[test]
    fn test_decode_line_keeps_terminator() {
        let mut codec = LineCodec::new();
        codec.push(b"adc\r\nOK: Joy");
        assert_eq!(codec.decode_line(), Some("adc\r\n".to_string()));
        assert_eq!(codec.decode_line(), None);
        assert_eq!(codec.buffered_len(), 7);
    }

    #[test]
    fn test_take_partial() {
        let mut codec = LineCodec::new();
        assert_eq!(codec.take_partial(), None);
        codec.push(b"> ");
        assert_eq!(codec.decode_line(), None);
        assert_eq!(codec.take_partial(), Some("> ".to_string()));
        assert_eq!(codec.buffered_len(), 0);
    }

    #[test]
    fn test_clear() {
        let mut codec = LineCodec::new();
        codec.push(b"stale data\r\n");
        codec.clear();
        assert_eq!(codec.decode_line(), None);
    }

    #[test]
    fn test_accumulator_lines_and_prompt() {
        let mut acc = ReplyAccumulator::new();
        assert_eq!(acc.push_fragment("OK. Data: 0x12\r\n"), ReplyProgress::Pending);
        assert_eq!(acc.push_fragment(""), ReplyProgress::Pending);
        assert_eq!(acc.push_fragment("second line\r\n"), ReplyProgress::Pending);
        assert_eq!(acc.push_fragment("> "), ReplyProgress::Prompt);
        assert_eq!(acc.line_count(), 2);
        assert_eq!(acc.finish(), "OK. Data: 0x12\nsecond line\n");
    }

    #[test]
    fn test_accumulator_keeps_blank_lines() {
        let mut acc = ReplyAccumulator::new();
        acc.push_fragment("Available commands:\r\n");
        acc.push_fragment("\r\n");
        acc.push_fragment("  help    Show this help text.\r\n");
        assert_eq!(acc.push_fragment("> "), ReplyProgress::Prompt);
        assert_eq!(acc.line_count(), 3);
        assert_eq!(acc.finish(), "Available commands:\n\n  help    Show this help text.\n");
    }

    #[test]
    fn test_accumulator_joins_partial_fragments() {
        let mut acc = ReplyAccumulator::new();
        acc.push_fragment("OK: LEDs ");
        acc.push_fragment("set to 0x05.\r");
        assert_eq!(acc.line_count(), 0);
        acc.push_fragment("\n");
        assert_eq!(acc.line_count(), 1);
        assert_eq!(acc.text(), "OK: LEDs set to 0x05.\n");
    }

    #[test]
    fn test_accumulator_prompt_split_over_fragments() {
        let mut acc = ReplyAccumulator::new();
        acc.push_fragment("OK\r\n");
        assert_eq!(acc.push_fragment(">"), ReplyProgress::Pending);
        assert_eq!(acc.push_fragment(" "), ReplyProgress::Prompt);
        assert_eq!(acc.finish(), "OK\n");
    }

    #[test]
    fn test_accumulator_without_prompt_keeps_partial() {
        let mut acc = ReplyAccumulator::new();
        acc.push_fragment("OK\r\n");
        acc.push_fragment("half");
        assert_eq!(acc.finish(), "OK\nhalf");
    }
}
