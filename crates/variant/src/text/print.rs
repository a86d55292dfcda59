use std::fmt::{Display, Formatter, Result as FmtResult, Write};

use crate::{WireType, WireValue, wire::terminated_bytes};

impl Display for WireValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "byte 0x{v:02x}"),
            Self::Int16(v) => write!(f, "int16 {v}"),
            Self::UInt16(v) => write!(f, "uint16 {v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "uint32 {v}"),
            Self::Int64(v) => write!(f, "int64 {v}"),
            Self::UInt64(v) => write!(f, "uint64 {v}"),
            Self::Handle(v) => write!(f, "handle {v}"),
            // Debug keeps a fraction or exponent, so the literal stays a double.
            Self::Double(v) => write!(f, "{v:?}"),
            Self::String(s) => quoted(f, s),
            Self::ObjectPath(s) => {
                f.write_str("objectpath ")?;
                quoted(f, s)
            }
            Self::Signature(s) => {
                f.write_str("signature ")?;
                quoted(f, s)
            }
            Self::Variant(inner) => write!(f, "<{inner}>"),
            Self::Maybe { ty, value: None } => write!(f, "@m{ty} nothing"),
            Self::Maybe {
                value: Some(inner), ..
            } => write!(f, "just {inner}"),
            Self::Array { elem, items } => array(f, elem, items),
            Self::Tuple(items) => match items.as_slice() {
                [one] => write!(f, "({one},)"),
                _ => {
                    f.write_char('(')?;
                    list(f, items)?;
                    f.write_char(')')
                }
            },
            Self::DictEntry(k, v) => write!(f, "{{{k}, {v}}}"),
        }
    }
}

/// Comma separated items.
fn list(f: &mut Formatter<'_>, items: &[WireValue]) -> FmtResult {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Arrays print as dictionaries or byte strings where those forms apply.
fn array(f: &mut Formatter<'_>, elem: &WireType, items: &[WireValue]) -> FmtResult {
    if items.is_empty() {
        return match elem {
            WireType::DictEntry(..) => write!(f, "@a{elem} {{}}"),
            _ => write!(f, "@a{elem} []"),
        };
    }
    if let Some(bytes) = terminated_bytes(items) {
        return bytestring(f, bytes);
    }
    let entries: Option<Vec<_>> = items
        .iter()
        .map(|item| match item {
            WireValue::DictEntry(k, v) => Some((k, v)),
            _ => None,
        })
        .collect();
    if let Some(entries) = entries {
        f.write_char('{')?;
        for (i, (k, v)) in entries.into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        return f.write_char('}');
    }
    f.write_char('[')?;
    list(f, items)?;
    f.write_char(']')
}

/// `b'..'` with non-printable bytes hex escaped.
fn bytestring(f: &mut Formatter<'_>, bytes: Vec<u8>) -> FmtResult {
    f.write_str("b'")?;
    for b in bytes {
        match b {
            b'\'' => f.write_str("\\'")?,
            b'\\' => f.write_str("\\\\")?,
            b'\n' => f.write_str("\\n")?,
            b'\t' => f.write_str("\\t")?,
            b'\r' => f.write_str("\\r")?,
            0x20..=0x7e => f.write_char(char::from(b))?,
            _ => write!(f, "\\x{b:02x}")?,
        }
    }
    f.write_char('\'')
}

/// Single-quoted string with escapes for quotes, backslashes and controls.
fn quoted(f: &mut Formatter<'_>, s: &str) -> FmtResult {
    f.write_char('\'')?;
    for c in s.chars() {
        match c {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c if c.is_control() => write!(f, "\\u{:04x}", u32::from(c))?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('\'')
}

#[cfg(test)]
mod tests {
    use crate::text::parse;

    use super::*;

    fn reparses(text: &str) {
        let value = parse(text).unwrap();
        let printed = value.to_string();
        assert_eq!(parse(&printed).unwrap(), value, "{text} printed as {printed}");
    }

    #[test]
    fn defaults_print_bare() {
        assert_eq!(WireValue::Int32(-4).to_string(), "-4");
        assert_eq!(WireValue::Double(1.0).to_string(), "1.0");
        assert_eq!(WireValue::Bool(false).to_string(), "false");
        assert_eq!(WireValue::String("it's".into()).to_string(), r"'it\'s'");
    }

    #[test]
    fn other_widths_are_annotated() {
        assert_eq!(WireValue::UInt32(7).to_string(), "uint32 7");
        assert_eq!(WireValue::Byte(10).to_string(), "byte 0x0a");
        assert_eq!(
            WireValue::array(WireType::Int64, Vec::new()).to_string(),
            "@ax []"
        );
        assert_eq!(
            WireValue::array(
                WireType::DictEntry(Box::new(WireType::String), Box::new(WireType::Variant)),
                Vec::new()
            )
            .to_string(),
            "@a{sv} {}"
        );
    }

    #[test]
    fn containers_print_in_text_grammar() {
        assert_eq!(
            WireValue::vardict([("a", WireValue::Int32(5))]).to_string(),
            "{'a': <5>}"
        );
        assert_eq!(WireValue::bytestring(b"hi\n").to_string(), r"b'hi\n'");
        assert_eq!(
            WireValue::Tuple(vec![WireValue::Int32(1)]).to_string(),
            "(1,)"
        );
        assert_eq!(WireValue::Tuple(Vec::new()).to_string(), "()");
    }

    #[test]
    fn printed_values_reparse() {
        for text in [
            "true",
            "int16 -3",
            "uint64 18446744073709551615",
            "-2.5e-8",
            r"'tab\there \u0001'",
            "b'\\xff\\x01'",
            "[<1>, <'a'>]",
            "@aay []",
            "[b'a', b'']",
            "{'k': <[1, 2]>, 'j': <@as []>}",
            "(1, 'x', (true,), ())",
            "@mmi just nothing",
            "[just 1, nothing]",
            "{1, <objectpath '/x'>}",
            "@ay [0x00, 0x01]",
        ] {
            reparses(text);
        }
    }
}
