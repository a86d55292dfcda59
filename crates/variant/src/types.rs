//! Wire type strings.

use std::fmt::{Display, Formatter, Result as FmtResult, Write};

use crate::SignatureError;

/// Containers may not nest deeper than this.
pub const MAX_DEPTH: usize = 64;

/// A parsed wire type string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WireType {
    /// `b`
    Bool,
    /// `y`
    Byte,
    /// `n`
    Int16,
    /// `q`
    UInt16,
    /// `i`
    Int32,
    /// `u`
    UInt32,
    /// `x`
    Int64,
    /// `t`
    UInt64,
    /// `h`
    Handle,
    /// `d`
    Double,
    /// `s`
    String,
    /// `o`
    ObjectPath,
    /// `g`
    Signature,
    /// `v`
    Variant,
    /// `mT`
    Maybe(Box<WireType>),
    /// `aT`
    Array(Box<WireType>),
    /// `(T...)`
    Tuple(Vec<WireType>),
    /// `{KT}`
    DictEntry(Box<WireType>, Box<WireType>),
    /// `*`, any type.
    AnyType,
    /// `?`, any basic type.
    AnyBasic,
    /// `r`, any tuple.
    AnyTuple,
}

impl WireType {
    /// Parse a complete type string.
    pub fn parse(s: &str) -> Result<Self, SignatureError> {
        let (ty, used) = Self::parse_prefix(s)?;
        if used != s.len() {
            return Err(SignatureError::Trailing(used));
        }
        Ok(ty)
    }

    /// Parse one type from the start of `s`, returning it with the number of
    /// bytes consumed.
    pub fn parse_prefix(s: &str) -> Result<(Self, usize), SignatureError> {
        if s.is_empty() {
            return Err(SignatureError::Empty);
        }
        parse_at(s.as_bytes(), 0, 0)
    }

    /// True when `s` is exactly one valid type string.
    pub fn is_valid(s: &str) -> bool {
        Self::parse(s).is_ok()
    }

    /// `a{sv}`
    pub fn vardict() -> Self {
        Self::Array(Box::new(Self::DictEntry(
            Box::new(Self::String),
            Box::new(Self::Variant),
        )))
    }

    /// Basic types may key a dictionary.
    pub fn is_basic(&self) -> bool {
        matches!(
            self,
            Self::Bool
                | Self::Byte
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
                | Self::Handle
                | Self::Double
                | Self::String
                | Self::ObjectPath
                | Self::Signature
                | Self::AnyBasic
        )
    }

    /// False when the type contains `*`, `?` or `r` anywhere.
    pub fn is_definite(&self) -> bool {
        match self {
            Self::AnyType | Self::AnyBasic | Self::AnyTuple => false,
            Self::Maybe(inner) | Self::Array(inner) => inner.is_definite(),
            Self::Tuple(items) => items.iter().all(Self::is_definite),
            Self::DictEntry(k, v) => k.is_definite() && v.is_definite(),
            _ => true,
        }
    }

    /// Integer types, including `y`.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Byte
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
                | Self::Handle
        )
    }

    /// The single-character code of a basic or variant type.
    fn code(&self) -> Option<char> {
        Some(match self {
            Self::Bool => 'b',
            Self::Byte => 'y',
            Self::Int16 => 'n',
            Self::UInt16 => 'q',
            Self::Int32 => 'i',
            Self::UInt32 => 'u',
            Self::Int64 => 'x',
            Self::UInt64 => 't',
            Self::Handle => 'h',
            Self::Double => 'd',
            Self::String => 's',
            Self::ObjectPath => 'o',
            Self::Signature => 'g',
            Self::Variant => 'v',
            Self::AnyType => '*',
            Self::AnyBasic => '?',
            Self::AnyTuple => 'r',
            Self::Maybe(_) | Self::Array(_) | Self::Tuple(_) | Self::DictEntry(..) => return None,
        })
    }
}

/// Map a single-character code to its type.
fn simple(c: u8) -> Option<WireType> {
    Some(match c {
        b'b' => WireType::Bool,
        b'y' => WireType::Byte,
        b'n' => WireType::Int16,
        b'q' => WireType::UInt16,
        b'i' => WireType::Int32,
        b'u' => WireType::UInt32,
        b'x' => WireType::Int64,
        b't' => WireType::UInt64,
        b'h' => WireType::Handle,
        b'd' => WireType::Double,
        b's' => WireType::String,
        b'o' => WireType::ObjectPath,
        b'g' => WireType::Signature,
        b'v' => WireType::Variant,
        b'*' => WireType::AnyType,
        b'?' => WireType::AnyBasic,
        b'r' => WireType::AnyTuple,
        _ => return None,
    })
}

/// Recursive descent over the type grammar.
fn parse_at(bytes: &[u8], pos: usize, depth: usize) -> Result<(WireType, usize), SignatureError> {
    if depth > MAX_DEPTH {
        return Err(SignatureError::TooDeep(MAX_DEPTH));
    }
    let Some(&c) = bytes.get(pos) else {
        return Err(SignatureError::UnexpectedEnd(pos));
    };
    if let Some(ty) = simple(c) {
        return Ok((ty, pos + 1));
    }
    match c {
        b'm' => {
            let (inner, next) = parse_at(bytes, pos + 1, depth + 1)?;
            Ok((WireType::Maybe(Box::new(inner)), next))
        }
        b'a' => {
            let (inner, next) = parse_at(bytes, pos + 1, depth + 1)?;
            Ok((WireType::Array(Box::new(inner)), next))
        }
        b'(' => {
            let mut items = Vec::new();
            let mut p = pos + 1;
            loop {
                match bytes.get(p) {
                    Some(b')') => return Ok((WireType::Tuple(items), p + 1)),
                    Some(_) => {
                        let (ty, next) = parse_at(bytes, p, depth + 1)?;
                        items.push(ty);
                        p = next;
                    }
                    None => return Err(SignatureError::UnexpectedEnd(p)),
                }
            }
        }
        b'{' => {
            let (key, next) = parse_at(bytes, pos + 1, depth + 1)?;
            if !key.is_basic() {
                return Err(SignatureError::NonBasicKey(pos + 1));
            }
            let (value, next) = parse_at(bytes, next, depth + 1)?;
            match bytes.get(next) {
                Some(b'}') => Ok((
                    WireType::DictEntry(Box::new(key), Box::new(value)),
                    next + 1,
                )),
                Some(&other) => Err(SignatureError::UnexpectedChar {
                    ch: char::from(other),
                    pos: next,
                }),
                None => Err(SignatureError::UnexpectedEnd(next)),
            }
        }
        other => Err(SignatureError::UnexpectedChar {
            ch: char::from(other),
            pos,
        }),
    }
}

impl Display for WireType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if let Some(c) = self.code() {
            return f.write_char(c);
        }
        match self {
            Self::Maybe(inner) => write!(f, "m{inner}"),
            Self::Array(inner) => write!(f, "a{inner}"),
            Self::Tuple(items) => {
                f.write_char('(')?;
                for item in items {
                    write!(f, "{item}")?;
                }
                f.write_char(')')
            }
            Self::DictEntry(k, v) => write!(f, "{{{k}{v}}}"),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_prints_nested_types() {
        for s in ["i", "as", "a{sv}", "(ia{sv}mv)", "aay", "()", "m(ss)", "a{?*}", "r"] {
            let ty = WireType::parse(s).unwrap();
            assert_eq!(ty.to_string(), s);
        }
        assert_eq!(WireType::parse("a{sv}").unwrap(), WireType::vardict());
    }

    #[test]
    fn rejects_malformed_types() {
        assert_eq!(WireType::parse(""), Err(SignatureError::Empty));
        assert_eq!(WireType::parse("a"), Err(SignatureError::UnexpectedEnd(1)));
        assert_eq!(WireType::parse("{vs}"), Err(SignatureError::NonBasicKey(1)));
        assert_eq!(WireType::parse("ii"), Err(SignatureError::Trailing(1)));
        assert!(matches!(
            WireType::parse("bogus-schema"),
            Err(SignatureError::UnexpectedChar { .. } | SignatureError::Trailing(_))
        ));
        assert!(!WireType::is_valid("(i"));
        assert!(matches!(
            WireType::parse(&format!("{}i", "a".repeat(100))),
            Err(SignatureError::TooDeep(_))
        ));
    }

    #[test]
    fn prefix_reports_consumed_length() {
        let (ty, used) = WireType::parse_prefix("a{sv} rest").unwrap();
        assert_eq!(ty, WireType::vardict());
        assert_eq!(used, 5);
    }

    #[test]
    fn definiteness() {
        assert!(WireType::parse("a{sv}").unwrap().is_definite());
        assert!(!WireType::parse("a*").unwrap().is_definite());
        assert!(!WireType::parse("(ir)").unwrap().is_definite());
    }
}
