use crate::{ParseError, WireType, WireValue, types::MAX_DEPTH};

/// Parse one text-format value.
///
/// Unannotated integers are `int32` and numbers with a fraction or exponent
/// are `double`; array and dictionary element types are inferred from the
/// first element, so empty containers need an `@TYPE` annotation.
pub fn parse(text: &str) -> Result<WireValue, ParseError> {
    let mut parser = Parser {
        src: text,
        pos: 0,
        depth: 0,
    };
    let value = parser.value(None)?;
    parser.skip_ws();
    if parser.pos < text.len() {
        return Err(ParseError::Trailing(parser.pos));
    }
    Ok(value)
}

/// Type named by a keyword prefix such as `uint32 7`.
fn keyword_type(word: &str) -> Option<WireType> {
    Some(match word {
        "boolean" => WireType::Bool,
        "byte" => WireType::Byte,
        "int16" => WireType::Int16,
        "uint16" => WireType::UInt16,
        "int32" => WireType::Int32,
        "uint32" => WireType::UInt32,
        "int64" => WireType::Int64,
        "uint64" => WireType::UInt64,
        "handle" => WireType::Handle,
        "double" => WireType::Double,
        "string" => WireType::String,
        "objectpath" => WireType::ObjectPath,
        "signature" => WireType::Signature,
        _ => return None,
    })
}

/// Build an integer of type `ty` if `n` fits.
fn int_value(ty: &WireType, n: i128) -> Option<WireValue> {
    Some(match ty {
        WireType::Byte => WireValue::Byte(u8::try_from(n).ok()?),
        WireType::Int16 => WireValue::Int16(i16::try_from(n).ok()?),
        WireType::UInt16 => WireValue::UInt16(u16::try_from(n).ok()?),
        WireType::Int32 => WireValue::Int32(i32::try_from(n).ok()?),
        WireType::UInt32 => WireValue::UInt32(u32::try_from(n).ok()?),
        WireType::Int64 => WireValue::Int64(i64::try_from(n).ok()?),
        WireType::UInt64 => WireValue::UInt64(u64::try_from(n).ok()?),
        WireType::Handle => WireValue::Handle(i32::try_from(n).ok()?),
        _ => return None,
    })
}

/// Decimal or `0x` hex integer with an optional sign.
fn parse_int(text: &str) -> Option<i128> {
    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if !body.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let magnitude = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        Some(hex) => i128::from_str_radix(hex, 16).ok()?,
        None => body.parse::<i128>().ok()?,
    };
    Some(if negative { -magnitude } else { magnitude })
}

/// Cursor over the input.
struct Parser<'a> {
    /// Whole input.
    src: &'a str,
    /// Byte offset of the cursor.
    pos: usize,
    /// Current container nesting.
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Unconsumed input.
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    /// Next character without consuming it.
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consume one character.
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Skip whitespace.
    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Consume `c` after optional whitespace, if it is next.
    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.bump();
            return true;
        }
        false
    }

    /// Require `c` after optional whitespace.
    fn expect(&mut self, c: char) -> Result<(), ParseError> {
        if self.eat(c) {
            return Ok(());
        }
        Err(self.unexpected())
    }

    /// Error describing whatever is at the cursor.
    fn unexpected(&self) -> ParseError {
        match self.peek() {
            Some(found) => ParseError::Unexpected {
                found,
                pos: self.pos,
            },
            None => ParseError::UnexpectedEnd(self.pos),
        }
    }

    /// The identifier at the cursor, not consumed.
    fn peek_word(&self) -> &'a str {
        let rest = self.rest();
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        &rest[..end]
    }

    /// Parse a value, checking it against `expected` when that is definite.
    fn value(&mut self, expected: Option<&WireType>) -> Result<WireValue, ParseError> {
        self.skip_ws();
        let start = self.pos;
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::TooDeep(start));
        }
        let expected = expected.filter(|t| t.is_definite());
        self.depth += 1;
        let value = self.dispatch(expected);
        self.depth -= 1;
        let value = value?;
        if let Some(want) = expected {
            let found = value.wire_type();
            if found != *want {
                return Err(ParseError::TypeMismatch {
                    expected: want.to_string(),
                    found: found.to_string(),
                    pos: start,
                });
            }
        }
        Ok(value)
    }

    /// Choose a production from the next character.
    fn dispatch(&mut self, expected: Option<&WireType>) -> Result<WireValue, ParseError> {
        let start = self.pos;
        let Some(c) = self.peek() else {
            return Err(ParseError::UnexpectedEnd(start));
        };
        if c == '@' {
            self.bump();
            let (ty, used) = WireType::parse_prefix(self.rest())
                .map_err(|source| ParseError::Annotation { pos: start, source })?;
            self.pos += used;
            return self.value(Some(&ty));
        }
        if let Some(WireType::Maybe(inner)) = expected
            && !matches!(self.peek_word(), "just" | "nothing")
        {
            let value = self.value(Some(inner))?;
            return Ok(WireValue::Maybe {
                ty: (**inner).clone(),
                value: Some(Box::new(value)),
            });
        }
        match c {
            '<' => {
                self.bump();
                let inner = self.value(None)?;
                self.expect('>')?;
                Ok(WireValue::variant(inner))
            }
            '[' => self.array(expected),
            '{' => self.dict(expected),
            '(' => self.tuple(expected),
            '\'' | '"' => {
                let s = self.string()?;
                Ok(match expected {
                    Some(WireType::ObjectPath) => WireValue::ObjectPath(s),
                    Some(WireType::Signature) => WireValue::Signature(s),
                    _ => WireValue::String(s),
                })
            }
            'b' if matches!(self.rest().as_bytes().get(1), Some(b'\'' | b'"')) => {
                self.bump();
                self.bytestring()
            }
            '0'..='9' | '-' | '+' | '.' => self.number(expected),
            c if c.is_ascii_alphabetic() => self.keyword(expected),
            _ => Err(self.unexpected()),
        }
    }

    /// `true`, `false`, `just`, `nothing` and type keywords.
    fn keyword(&mut self, expected: Option<&WireType>) -> Result<WireValue, ParseError> {
        let start = self.pos;
        let word = self.peek_word();
        self.pos += word.len();
        match word {
            "true" => Ok(WireValue::Bool(true)),
            "false" => Ok(WireValue::Bool(false)),
            "nothing" => match expected {
                Some(WireType::Maybe(inner)) => Ok(WireValue::Maybe {
                    ty: (**inner).clone(),
                    value: None,
                }),
                _ => Err(ParseError::NeedsAnnotation(start)),
            },
            "just" => {
                let inner = match expected {
                    Some(WireType::Maybe(inner)) => Some(inner.as_ref()),
                    _ => None,
                };
                let value = self.value(inner)?;
                Ok(WireValue::Maybe {
                    ty: value.wire_type(),
                    value: Some(Box::new(value)),
                })
            }
            _ => match keyword_type(word) {
                Some(ty) => self.value(Some(&ty)),
                None => Err(ParseError::UnknownKeyword {
                    word: word.to_string(),
                    pos: start,
                }),
            },
        }
    }

    /// Integer or floating point literal.
    fn number(&mut self, expected: Option<&WireType>) -> Result<WireValue, ParseError> {
        let start = self.pos;
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let len = bytes
            .iter()
            .enumerate()
            .take_while(|&(i, &b)| {
                b.is_ascii_alphanumeric()
                    || b == b'.'
                    || ((b == b'-' || b == b'+')
                        && (i == 0 || matches!(bytes[i - 1], b'e' | b'E')))
            })
            .count();
        let text = &rest[..len];
        self.pos += len;
        let invalid = || ParseError::InvalidNumber {
            text: text.to_string(),
            pos: start,
        };
        let digits = text.trim_start_matches(['-', '+']);
        let is_hex = digits.starts_with("0x") || digits.starts_with("0X");
        let is_float = !is_hex && text.contains(['.', 'e', 'E']);
        let target = match expected {
            Some(ty) if ty.is_integer() || *ty == WireType::Double => ty.clone(),
            _ if is_float => WireType::Double,
            _ => WireType::Int32,
        };
        if target == WireType::Double {
            let value = if is_hex {
                #[allow(clippy::cast_precision_loss)]
                let f = parse_int(text).ok_or_else(invalid)? as f64;
                f
            } else {
                text.parse::<f64>().map_err(|_| invalid())?
            };
            return Ok(WireValue::Double(value));
        }
        if is_float {
            return Err(invalid());
        }
        let n = parse_int(text).ok_or_else(invalid)?;
        int_value(&target, n).ok_or_else(|| ParseError::OutOfRange {
            text: text.to_string(),
            ty: target.to_string(),
            pos: start,
        })
    }

    /// Decode one escape sequence after the backslash.
    fn escape(&mut self) -> Result<char, ParseError> {
        let start = self.pos;
        let c = self.bump().ok_or(ParseError::UnexpectedEnd(self.pos))?;
        Ok(match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            '\\' | '\'' | '"' => c,
            'u' | 'U' => {
                let width = if c == 'u' { 4 } else { 8 };
                let hex = self.rest().get(..width).ok_or(ParseError::InvalidEscape(start))?;
                let code =
                    u32::from_str_radix(hex, 16).map_err(|_| ParseError::InvalidEscape(start))?;
                self.pos += width;
                char::from_u32(code).ok_or(ParseError::InvalidEscape(start))?
            }
            _ => return Err(ParseError::InvalidEscape(start)),
        })
    }

    /// Quoted string; the cursor is on the opening quote.
    fn string(&mut self) -> Result<String, ParseError> {
        let quote = self.bump().ok_or(ParseError::UnexpectedEnd(self.pos))?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(ParseError::UnexpectedEnd(self.pos)),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.escape()?),
                Some(c) => out.push(c),
            }
        }
    }

    /// `b'..'` byte string; the cursor is on the opening quote.
    fn bytestring(&mut self) -> Result<WireValue, ParseError> {
        let quote = self.bump().ok_or(ParseError::UnexpectedEnd(self.pos))?;
        let mut out = Vec::new();
        loop {
            match self.bump() {
                None => return Err(ParseError::UnexpectedEnd(self.pos)),
                Some(c) if c == quote => return Ok(WireValue::bytestring(&out)),
                Some('\\') if self.peek() == Some('x') => {
                    let start = self.pos;
                    self.bump();
                    let hex = self.rest().get(..2).ok_or(ParseError::InvalidEscape(start))?;
                    let b = u8::from_str_radix(hex, 16)
                        .map_err(|_| ParseError::InvalidEscape(start))?;
                    self.pos += 2;
                    out.push(b);
                }
                Some('\\') => {
                    let c = self.escape()?;
                    out.extend_from_slice(c.encode_utf8(&mut [0; 4]).as_bytes());
                }
                Some(c) => out.extend_from_slice(c.encode_utf8(&mut [0; 4]).as_bytes()),
            }
        }
    }

    /// `[a, b, ...]`
    fn array(&mut self, expected: Option<&WireType>) -> Result<WireValue, ParseError> {
        let start = self.pos;
        self.bump();
        let mut elem = match expected {
            Some(WireType::Array(elem)) => Some((**elem).clone()),
            _ => None,
        };
        let mut items = Vec::new();
        if !self.eat(']') {
            loop {
                let item = self.value(elem.as_ref())?;
                if elem.is_none() {
                    elem = Some(item.wire_type());
                }
                items.push(item);
                if !self.eat(',') {
                    self.expect(']')?;
                    break;
                }
            }
        }
        let elem = elem.ok_or(ParseError::NeedsAnnotation(start))?;
        Ok(WireValue::Array { elem, items })
    }

    /// `{k: v, ...}` dictionaries and `{k, v}` single entries.
    fn dict(&mut self, expected: Option<&WireType>) -> Result<WireValue, ParseError> {
        let start = self.pos;
        self.bump();
        let (key_ty, value_ty) = match expected {
            Some(WireType::Array(inner)) => match inner.as_ref() {
                WireType::DictEntry(k, v) => (Some((**k).clone()), Some((**v).clone())),
                _ => (None, None),
            },
            Some(WireType::DictEntry(k, v)) => (Some((**k).clone()), Some((**v).clone())),
            _ => (None, None),
        };
        if self.eat('}') {
            return match (key_ty, value_ty) {
                (Some(k), Some(v)) => Ok(WireValue::array(
                    WireType::DictEntry(Box::new(k), Box::new(v)),
                    Vec::new(),
                )),
                _ => Err(ParseError::NeedsAnnotation(start)),
            };
        }
        let key = self.value(key_ty.as_ref())?;
        let key_ty = key_ty.unwrap_or_else(|| key.wire_type());
        if !key_ty.is_basic() {
            return Err(ParseError::TypeMismatch {
                expected: "a basic type".to_string(),
                found: key_ty.to_string(),
                pos: start + 1,
            });
        }
        if self.eat(',') {
            let value = self.value(value_ty.as_ref())?;
            self.expect('}')?;
            return Ok(WireValue::DictEntry(Box::new(key), Box::new(value)));
        }
        self.expect(':')?;
        let value = self.value(value_ty.as_ref())?;
        let value_ty = value_ty.unwrap_or_else(|| value.wire_type());
        let mut items = vec![WireValue::DictEntry(Box::new(key), Box::new(value))];
        while self.eat(',') {
            let key = self.value(Some(&key_ty))?;
            self.expect(':')?;
            let value = self.value(Some(&value_ty))?;
            items.push(WireValue::DictEntry(Box::new(key), Box::new(value)));
        }
        self.expect('}')?;
        Ok(WireValue::array(
            WireType::DictEntry(Box::new(key_ty), Box::new(value_ty)),
            items,
        ))
    }

    /// `()`, `(a,)`, `(a, b)`
    fn tuple(&mut self, expected: Option<&WireType>) -> Result<WireValue, ParseError> {
        self.bump();
        let types = match expected {
            Some(WireType::Tuple(types)) => Some(types.as_slice()),
            _ => None,
        };
        let mut items = Vec::new();
        if self.eat(')') {
            return Ok(WireValue::Tuple(items));
        }
        loop {
            let ty = types.and_then(|t| t.get(items.len()));
            items.push(self.value(ty)?);
            if !self.eat(',') {
                self.expect(')')?;
                break;
            }
            if self.eat(')') {
                break;
            }
        }
        Ok(WireValue::Tuple(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_and_defaults() {
        assert_eq!(parse("true").unwrap(), WireValue::Bool(true));
        assert_eq!(parse(" 42 ").unwrap(), WireValue::Int32(42));
        assert_eq!(parse("-0x10").unwrap(), WireValue::Int32(-16));
        assert_eq!(parse("1.5").unwrap(), WireValue::Double(1.5));
        assert_eq!(parse("2e3").unwrap(), WireValue::Double(2000.0));
        assert_eq!(parse("uint64 7").unwrap(), WireValue::UInt64(7));
        assert_eq!(parse("@y 255").unwrap(), WireValue::Byte(255));
        assert_eq!(parse("double 3").unwrap(), WireValue::Double(3.0));
        assert_eq!(
            parse("objectpath '/a/b'").unwrap(),
            WireValue::ObjectPath("/a/b".into())
        );
    }

    #[test]
    fn strings_and_escapes() {
        assert_eq!(
            parse(r#""a\né\'""#).unwrap(),
            WireValue::String("a\n\u{e9}'".into())
        );
        assert_eq!(parse("'é'").unwrap(), WireValue::String("é".into()));
        assert_eq!(
            parse(r"b'a\x00b'").unwrap(),
            WireValue::bytestring(&[b'a', 0, b'b'])
        );
        assert!(matches!(parse(r"'\q'"), Err(ParseError::InvalidEscape(_))));
    }

    #[test]
    fn containers() {
        assert_eq!(
            parse("[1, 2]").unwrap(),
            WireValue::array(WireType::Int32, vec![WireValue::Int32(1), WireValue::Int32(2)])
        );
        assert_eq!(
            parse("@ax [1]").unwrap(),
            WireValue::array(WireType::Int64, vec![WireValue::Int64(1)])
        );
        assert_eq!(parse("()").unwrap(), WireValue::Tuple(Vec::new()));
        assert_eq!(
            parse("(1,)").unwrap(),
            WireValue::Tuple(vec![WireValue::Int32(1)])
        );
        assert_eq!(
            parse("{'a': <5>}").unwrap(),
            WireValue::vardict([("a", WireValue::Int32(5))])
        );
        assert_eq!(
            parse("{1, 'x'}").unwrap(),
            WireValue::DictEntry(
                Box::new(WireValue::Int32(1)),
                Box::new(WireValue::String("x".into()))
            )
        );
        assert_eq!(
            parse("@a{sv} {}").unwrap(),
            WireValue::array(
                WireType::DictEntry(Box::new(WireType::String), Box::new(WireType::Variant)),
                Vec::new()
            )
        );
    }

    #[test]
    fn maybes() {
        assert_eq!(
            parse("@mi nothing").unwrap(),
            WireValue::Maybe {
                ty: WireType::Int32,
                value: None
            }
        );
        assert_eq!(
            parse("just 'x'").unwrap(),
            WireValue::Maybe {
                ty: WireType::String,
                value: Some(Box::new(WireValue::String("x".into())))
            }
        );
        assert_eq!(parse("@mu 3").unwrap().wire_type().to_string(), "mu");
    }

    #[test]
    fn errors_carry_positions() {
        assert_eq!(parse("[]"), Err(ParseError::NeedsAnnotation(0)));
        assert_eq!(parse("nothing"), Err(ParseError::NeedsAnnotation(0)));
        assert_eq!(parse("1 2"), Err(ParseError::Trailing(2)));
        assert_eq!(parse("[1,"), Err(ParseError::UnexpectedEnd(3)));
        assert!(matches!(
            parse("byte 300"),
            Err(ParseError::OutOfRange { .. })
        ));
        assert!(matches!(
            parse("[1, 'a']"),
            Err(ParseError::TypeMismatch { pos: 4, .. })
        ));
        assert!(matches!(
            parse("frobnicate"),
            Err(ParseError::UnknownKeyword { .. })
        ));
        assert!(matches!(
            parse("@(q 1"),
            Err(ParseError::Annotation { pos: 0, .. })
        ));
        let deep = format!("{}1{}", "<".repeat(100), ">".repeat(100));
        assert!(matches!(parse(&deep), Err(ParseError::TooDeep(_))));
    }
}
