//! Marker-anchored scanning of reply bodies.
//!
//! Reply payloads are located by a literal marker (`"Data:"`, `"status:"`,
//! ...) and the text after it is split on whitespace into integer tokens.

use crate::error::{DecodeError, DecodeResult};

/// Parse an integer literal.
///
/// Accepts an optional sign followed by `0x`/`0X` hex, `0b`/`0B` binary,
/// `0o`/`0O` octal or plain decimal digits.
pub fn parse_int_literal(token: &str) -> DecodeResult<i64> {
    let invalid = || DecodeError::InvalidInteger(token.to_string());
    let trimmed = token.trim();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let (radix, digits) = match digits.get(..2) {
        Some("0x") | Some("0X") => (16, &digits[2..]),
        Some("0b") | Some("0B") => (2, &digits[2..]),
        Some("0o") | Some("0O") => (8, &digits[2..]),
        _ => (10, digits),
    };
    // from_str_radix would accept a second sign
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(invalid());
    }

    let magnitude = i64::from_str_radix(digits, radix).map_err(|_| invalid())?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// A cursor over reply text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyScanner<'a> {
    text: &'a str,
}

impl<'a> ReplyScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        ReplyScanner { text }
    }

    /// The remaining text.
    pub fn as_str(&self) -> &'a str {
        self.text
    }

    pub fn contains(&self, marker: &str) -> bool {
        self.text.contains(marker)
    }

    /// Continue after the first occurrence of `marker`.
    pub fn after(&self, marker: &'static str) -> DecodeResult<ReplyScanner<'a>> {
        let start = self
            .text
            .find(marker)
            .ok_or(DecodeError::MissingMarker(marker))?;
        Ok(ReplyScanner::new(&self.text[start + marker.len()..]))
    }

    /// Continue after `marker` if present, otherwise `None`.
    pub fn after_opt(&self, marker: &'static str) -> Option<ReplyScanner<'a>> {
        self.after(marker).ok()
    }

    /// Text between the first `start` marker and the following `end` marker.
    pub fn between(&self, start: &'static str, end: &'static str) -> DecodeResult<&'a str> {
        let rest = self.after(start)?;
        let stop = rest.text.find(end).ok_or(DecodeError::MissingMarker(end))?;
        Ok(&rest.text[..stop])
    }

    /// All whitespace separated tokens as integers.
    pub fn integers(&self) -> DecodeResult<Vec<i64>> {
        self.text.split_whitespace().map(parse_int_literal).collect()
    }

    /// The first whitespace separated token as an integer.
    pub fn first_integer(&self, marker: &'static str) -> DecodeResult<i64> {
        let token = self
            .text
            .split_whitespace()
            .next()
            .ok_or(DecodeError::MissingValue(marker))?;
        parse_int_literal(token)
    }

    /// All tokens converted to a narrower integer type.
    pub fn values<T: TryFrom<i64>>(&self) -> DecodeResult<Vec<T>> {
        self.integers()?
            .into_iter()
            .map(|value| T::try_from(value).map_err(|_| DecodeError::ValueOutOfRange(value)))
            .collect()
    }

    /// Decimal numbers left after dropping everything but digits and spaces.
    pub fn decimal_digits(&self) -> DecodeResult<Vec<i64>> {
        let filtered: String = self
            .text
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == ' ')
            .collect();
        filtered.split_whitespace().map(parse_int_literal).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_literal() {
        assert_eq!(parse_int_literal("0x1f"), Ok(31));
        assert_eq!(parse_int_literal("0X1F"), Ok(31));
        assert_eq!(parse_int_literal("0b101"), Ok(5));
        assert_eq!(parse_int_literal("0o17"), Ok(15));
        assert_eq!(parse_int_literal("42"), Ok(42));
        assert_eq!(parse_int_literal("007"), Ok(7));
        assert_eq!(parse_int_literal("-12"), Ok(-12));
        assert_eq!(parse_int_literal(" +3 "), Ok(3));
    }

    #[test]
    fn test_parse_int_literal_rejects_garbage() {
        assert!(parse_int_literal("").is_err());
        assert!(parse_int_literal("0x").is_err());
        assert!(parse_int_literal("12a").is_err());
        assert!(parse_int_literal("--1").is_err());
        assert!(parse_int_literal("0x-1").is_err());
        assert_eq!(
            parse_int_literal("abc"),
            Err(DecodeError::InvalidInteger("abc".to_string()))
        );
    }

    #[test]
    fn test_after_and_integers() {
        let scanner = ReplyScanner::new(". Data: 0x12 0x34");
        let data = scanner.after("Data:").unwrap();
        assert_eq!(data.integers().unwrap(), vec![0x12, 0x34]);
        assert_eq!(data.values::<u8>().unwrap(), vec![0x12u8, 0x34]);
    }

    #[test]
    fn test_missing_marker() {
        let scanner = ReplyScanner::new("no payload here");
        assert_eq!(
            scanner.after("Data:"),
            Err(DecodeError::MissingMarker("Data:"))
        );
        assert!(scanner.after_opt("Data:").is_none());
    }

    #[test]
    fn test_between() {
        let scanner = ReplyScanner::new("status: 1, pressed count: 4");
        assert_eq!(scanner.between("status:", "pressed").unwrap(), " 1, ");
    }

    #[test]
    fn test_first_integer() {
        let scanner = ReplyScanner::new(" 0x05 trailing");
        assert_eq!(scanner.first_integer("x"), Ok(5));
        assert_eq!(
            ReplyScanner::new("   ").first_integer("x"),
            Err(DecodeError::MissingValue("x"))
        );
    }

    #[test]
    fn test_values_out_of_range() {
        let scanner = ReplyScanner::new("0x1ff");
        assert_eq!(
            scanner.values::<u8>(),
            Err(DecodeError::ValueOutOfRange(0x1ff))
        );
    }

    #[test]
    fn test_decimal_digits() {
        let scanner = ReplyScanner::new("Joystick: X = 2048 Y = 12; Z=-3");
        assert_eq!(scanner.decimal_digits().unwrap(), vec![2048, 12, 3]);
    }
}
