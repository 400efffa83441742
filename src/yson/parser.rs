//! Text YSON parser.
//!
//! # Responsibilities
//! - Decode a single top-level value (response payloads)
//! - Decode list-fragment items incrementally (table streams)

use crate::yson::{Yson, YsonError, YsonMap};

/// Deepest map/list nesting accepted before giving up.
pub const MAX_DEPTH: usize = 256;

/// Parse exactly one value; only whitespace may follow it.
pub fn from_slice(input: &[u8]) -> Result<Yson, YsonError> {
    let mut parser = Parser::new(input, true);
    let value = parser.parse_value(0)?;
    parser.skip_whitespace();
    if parser.pos != input.len() {
        return Err(YsonError::TrailingData(parser.pos));
    }
    Ok(value)
}

/// Try to take the next item of a `;`-separated list fragment from `buf`.
///
/// Returns the item and the number of bytes consumed, or `None` when `buf`
/// does not yet hold a complete item. With `at_eof` set, a final item
/// without the trailing `;` is accepted.
pub fn next_fragment_item(buf: &[u8], at_eof: bool) -> Result<Option<(Yson, usize)>, YsonError> {
    let mut parser = Parser::new(buf, at_eof);
    parser.skip_whitespace();
    if parser.pos == buf.len() {
        return Ok(None);
    }

    let value = match parser.parse_value(0) {
        Ok(value) => value,
        Err(YsonError::UnexpectedEof) if !at_eof => return Ok(None),
        Err(err) => return Err(err),
    };

    parser.skip_whitespace();
    match parser.peek() {
        Some(b';') => {
            parser.pos += 1;
            Ok(Some((value, parser.pos)))
        }
        None if at_eof => Ok(Some((value, parser.pos))),
        // A scalar at the very end might still be growing.
        None => Ok(None),
        Some(byte) => Err(YsonError::UnexpectedByte { byte, offset: parser.pos }),
    }
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    /// False when more bytes may still be appended to `input`.
    complete: bool,
}

impl<'a> Parser<'a> {
    fn new(input: &'a [u8], complete: bool) -> Self {
        Self {
            input,
            pos: 0,
            complete,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn next_byte(&mut self) -> Result<u8, YsonError> {
        let byte = self.peek().ok_or(YsonError::UnexpectedEof)?;
        self.pos += 1;
        Ok(byte)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn unexpected(&self, byte: u8) -> YsonError {
        YsonError::UnexpectedByte { byte, offset: self.pos }
    }

    fn parse_value(&mut self, depth: usize) -> Result<Yson, YsonError> {
        self.skip_whitespace();
        let byte = self.peek().ok_or(YsonError::UnexpectedEof)?;
        if matches!(byte, b'{' | b'[') && depth >= MAX_DEPTH {
            return Err(YsonError::NestingTooDeep(self.pos));
        }
        match byte {
            b'{' => self.parse_map(depth + 1),
            b'[' => self.parse_list(depth + 1),
            b'"' => self.parse_quoted().map(Yson::String),
            b'#' => {
                self.pos += 1;
                Ok(Yson::Entity)
            }
            b'%' => self.parse_literal(),
            b'<' => Err(YsonError::Attributes(self.pos)),
            b'-' | b'+' | b'0'..=b'9' => self.parse_number(),
            b'_' | b'a'..=b'z' | b'A'..=b'Z' => Ok(Yson::String(self.parse_unquoted())),
            other => Err(self.unexpected(other)),
        }
    }

    fn parse_map(&mut self, depth: usize) -> Result<Yson, YsonError> {
        self.pos += 1;
        let mut map = YsonMap::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(YsonError::UnexpectedEof),
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(Yson::Map(map));
                }
                Some(_) => {}
            }

            let key = self.parse_key()?;
            self.skip_whitespace();
            match self.next_byte()? {
                b'=' => {}
                other => {
                    self.pos -= 1;
                    return Err(self.unexpected(other));
                }
            }
            let value = self.parse_value(depth)?;
            map.insert(key, value);

            self.skip_whitespace();
            match self.next_byte()? {
                b';' => {}
                b'}' => return Ok(Yson::Map(map)),
                other => {
                    self.pos -= 1;
                    return Err(self.unexpected(other));
                }
            }
        }
    }

    fn parse_list(&mut self, depth: usize) -> Result<Yson, YsonError> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(YsonError::UnexpectedEof),
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Yson::List(items));
                }
                Some(_) => {}
            }

            items.push(self.parse_value(depth)?);

            self.skip_whitespace();
            match self.next_byte()? {
                b';' => {}
                b']' => return Ok(Yson::List(items)),
                other => {
                    self.pos -= 1;
                    return Err(self.unexpected(other));
                }
            }
        }
    }

    fn parse_key(&mut self) -> Result<String, YsonError> {
        match self.peek() {
            Some(b'"') => self.parse_quoted(),
            Some(b'_' | b'a'..=b'z' | b'A'..=b'Z') => Ok(self.parse_unquoted()),
            Some(other) => Err(self.unexpected(other)),
            None => Err(YsonError::UnexpectedEof),
        }
    }

    fn parse_unquoted(&mut self) -> String {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(b'_' | b'-' | b'.' | b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9')
        ) {
            self.pos += 1;
        }
        // Only ASCII bytes were accepted above.
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    fn parse_quoted(&mut self) -> Result<String, YsonError> {
        let start = self.pos;
        self.pos += 1;
        let mut bytes = Vec::new();
        loop {
            match self.next_byte()? {
                b'"' => break,
                b'\\' => {
                    let escaped = self.next_byte()?;
                    match escaped {
                        b'"' | b'\\' | b'\'' | b'/' => bytes.push(escaped),
                        b'n' => bytes.push(b'\n'),
                        b'r' => bytes.push(b'\r'),
                        b't' => bytes.push(b'\t'),
                        b'0' => bytes.push(0),
                        b'x' => {
                            let hi = self.next_byte()?;
                            let lo = self.next_byte()?;
                            let value = hex_value(hi)
                                .zip(hex_value(lo))
                                .map(|(h, l)| h << 4 | l)
                                .ok_or(YsonError::UnexpectedByte { byte: hi, offset: self.pos - 2 })?;
                            bytes.push(value);
                        }
                        other => {
                            self.pos -= 1;
                            return Err(self.unexpected(other));
                        }
                    }
                }
                byte => bytes.push(byte),
            }
        }
        String::from_utf8(bytes).map_err(|_| YsonError::InvalidUtf8(start))
    }

    fn parse_literal(&mut self) -> Result<Yson, YsonError> {
        let start = self.pos;
        self.pos += 1;
        let body_start = self.pos;
        while matches!(self.peek(), Some(b'-' | b'+' | b'a'..=b'z')) {
            self.pos += 1;
        }
        let literal = String::from_utf8_lossy(&self.input[body_start..self.pos]).into_owned();
        match literal.as_str() {
            "true" => Ok(Yson::Bool(true)),
            "false" => Ok(Yson::Bool(false)),
            "nan" => Ok(Yson::Double(f64::NAN)),
            "inf" | "+inf" => Ok(Yson::Double(f64::INFINITY)),
            "-inf" => Ok(Yson::Double(f64::NEG_INFINITY)),
            // A prefix of a valid literal cut off by the end of the buffer.
            _ if self.pos == self.input.len()
                && ["true", "false", "nan", "inf", "+inf", "-inf"]
                    .iter()
                    .any(|known| known.starts_with(literal.as_str())) =>
            {
                Err(YsonError::UnexpectedEof)
            }
            _ => Err(YsonError::UnknownLiteral { literal, offset: start }),
        }
    }

    fn parse_number(&mut self) -> Result<Yson, YsonError> {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(b'-' | b'+' | b'.' | b'e' | b'E' | b'0'..=b'9')
        ) {
            self.pos += 1;
        }
        let literal = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
        // A number cut off by the end of a partial buffer (`-`, `1e`) may still be valid.
        let cut_off = !self.complete && self.pos == self.input.len();
        let invalid = || {
            if cut_off {
                YsonError::UnexpectedEof
            } else {
                YsonError::InvalidNumber { literal: literal.clone(), offset: start }
            }
        };

        if self.peek() == Some(b'u') {
            self.pos += 1;
            return literal.parse::<u64>().map(Yson::Uint64).map_err(|_| invalid());
        }

        if literal.contains(['.', 'e', 'E']) {
            literal.parse::<f64>().map(Yson::Double).map_err(|_| invalid())
        } else {
            literal.parse::<i64>().map(Yson::Int64).map_err(|_| invalid())
        }
    }
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::yson::to_string;

    fn round_trip(value: Yson) {
        let text = to_string(&value);
        assert_eq!(from_slice(text.as_bytes()).unwrap(), value, "text: {text}");
    }

    #[test]
    fn test_round_trip_empty_map() {
        round_trip(Yson::map());
    }

    #[test]
    fn test_round_trip_nested_map() {
        let mut inner = YsonMap::new();
        inner.insert("account".into(), Yson::from("sys"));
        inner.insert("replication_factor".into(), Yson::Int64(3));
        let mut outer = YsonMap::new();
        outer.insert("attributes".into(), Yson::Map(inner));
        outer.insert("path".into(), Yson::from("//home/table"));
        round_trip(Yson::Map(outer));
    }

    #[test]
    fn test_round_trip_map_with_list() {
        let mut map = YsonMap::new();
        map.insert(
            "columns".into(),
            Yson::List(vec![Yson::from("a"), Yson::from("b"), Yson::Entity]),
        );
        round_trip(Yson::Map(map));
    }

    #[test]
    fn test_round_trip_int_and_string() {
        let mut map = YsonMap::new();
        map.insert("count".into(), Yson::Int64(-42));
        map.insert("name".into(), Yson::from("\u{43f}\u{440}\u{438}\tx\"y\""));
        map.insert("offset".into(), Yson::Uint64(u64::MAX));
        map.insert("ratio".into(), Yson::Double(0.25));
        round_trip(Yson::Map(map));
    }

    #[test]
    fn test_parse_loose_syntax() {
        let value = from_slice(b" { key = value ; \"list\" = [ 1 ; 2u ; %false ; ] ; } ").unwrap();
        assert_eq!(value.get("key").and_then(Yson::as_str), Some("value"));
        assert_eq!(
            value.get("list"),
            Some(&Yson::List(vec![Yson::Int64(1), Yson::Uint64(2), Yson::Bool(false)]))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(from_slice(b"{\"a\"=1"), Err(YsonError::UnexpectedEof)));
        assert!(matches!(from_slice(b"1 2"), Err(YsonError::TrailingData(2))));
        assert!(matches!(from_slice(b"<a=1>2"), Err(YsonError::Attributes(0))));
        assert!(matches!(from_slice(b"%maybe"), Err(YsonError::UnknownLiteral { .. })));
        assert!(matches!(from_slice(b"1.2.3"), Err(YsonError::InvalidNumber { .. })));
    }

    #[test]
    fn test_fragment_items() {
        let buf = b"{\"a\"=1};\n{\"a\"=2};\n{\"a\"=";
        let (first, used) = next_fragment_item(buf, false).unwrap().unwrap();
        assert_eq!(first.get("a"), Some(&Yson::Int64(1)));

        let (second, used2) = next_fragment_item(&buf[used..], false).unwrap().unwrap();
        assert_eq!(second.get("a"), Some(&Yson::Int64(2)));

        assert!(next_fragment_item(&buf[used + used2..], false).unwrap().is_none());
        assert!(next_fragment_item(&buf[used + used2..], true).is_err());
    }

    #[test]
    fn test_fragment_waits_for_cut_off_number() {
        let partials: [&[u8]; 4] = [b"{\"a\"=-", b"{\"a\"=1e", b"{\"a\"=1e-", b"[+"];
        for partial in partials {
            assert!(
                next_fragment_item(partial, false).unwrap().is_none(),
                "{:?}",
                String::from_utf8_lossy(partial)
            );
        }
        assert!(matches!(
            next_fragment_item(b"{\"a\"=-", true),
            Err(YsonError::UnexpectedEof)
        ));
        assert!(matches!(
            next_fragment_item(b"{\"a\"=1e}", false),
            Err(YsonError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_fragment_split_at_every_offset() {
        let text: &[u8] =
            b"{\"k\"=-17;\"d\"=1e-07;\"s\"=\"a;b\\\"c\"};\n[%true;-2.5e+10;12u];\n{\"n\"={\"m\"=[#;-0.5]}};\n";
        let mut expected = Vec::new();
        let mut rest = text;
        while let Some((item, used)) = next_fragment_item(rest, true).unwrap() {
            expected.push(item);
            rest = &rest[used..];
        }
        assert_eq!(expected.len(), 3);

        for split in 0..=text.len() {
            let mut buf = text[..split].to_vec();
            let mut seen = Vec::new();
            while let Some((item, used)) = next_fragment_item(&buf, false).unwrap() {
                seen.push(item);
                buf.drain(..used);
            }
            buf.extend_from_slice(&text[split..]);
            while let Some((item, used)) = next_fragment_item(&buf, true).unwrap() {
                seen.push(item);
                buf.drain(..used);
            }
            assert_eq!(seen, expected, "split at {split}");
        }
    }

    #[test]
    fn test_nesting_limit() {
        let deep = vec![b'['; 200_000];
        assert!(matches!(
            from_slice(&deep),
            Err(YsonError::NestingTooDeep(offset)) if offset == MAX_DEPTH
        ));
        assert!(matches!(
            next_fragment_item(&deep, false),
            Err(YsonError::NestingTooDeep(_))
        ));

        let mut ok = vec![b'['; MAX_DEPTH];
        ok.extend(vec![b']'; MAX_DEPTH]);
        assert!(from_slice(&ok).is_ok());
    }

    #[test]
    fn test_fragment_scalar_waits_for_separator() {
        assert!(next_fragment_item(b"12", false).unwrap().is_none());
        assert!(next_fragment_item(b"%tr", false).unwrap().is_none());
        let (value, used) = next_fragment_item(b"12", true).unwrap().unwrap();
        assert_eq!((value, used), (Yson::Int64(12), 2));
    }
}
