use std::collections::BTreeMap;

use tracing::warn;

use crate::{Value, WireType, WireValue, text, wire::terminated_bytes};

/// Convert a wire value into a dynamic value. Never fails: parts that have no
/// local representation become [`Value::Unsupported`].
pub fn decode(wire: &WireValue) -> Value {
    match wire {
        WireValue::Bool(v) => Value::Bool(*v),
        WireValue::Byte(v) => Value::Byte(*v),
        WireValue::Int16(v) => Value::Int16(*v),
        WireValue::UInt16(v) => Value::UInt16(*v),
        WireValue::Int32(v) => Value::Int32(*v),
        WireValue::UInt32(v) => Value::UInt32(*v),
        WireValue::Int64(v) => Value::Int64(*v),
        WireValue::UInt64(v) => Value::UInt64(*v),
        WireValue::Double(v) => Value::Double(*v),
        WireValue::String(s) => Value::String(s.clone()),
        WireValue::Variant(inner) => Value::boxed(decode(inner)),
        WireValue::Array { elem, items } => decode_array(elem, items),
        WireValue::Tuple(items) => Value::Tuple(items.iter().map(decode).collect()),
        other => {
            warn!(wire_type = %other.wire_type(), "unsupported wire value");
            Value::Unsupported
        }
    }
}

/// Parse a text-format literal and decode it. Empty input yields `None`, as
/// does malformed input (logged).
pub fn decode_from_text(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    match text::parse(text) {
        Ok(wire) => Some(decode(&wire)),
        Err(err) => {
            warn!(%err, text, "cannot parse variant text");
            None
        }
    }
}

/// Arrays pick a dedicated form from their element type.
fn decode_array(elem: &WireType, items: &[WireValue]) -> Value {
    let decoded = match elem {
        WireType::String => strings(items).map(Value::StringArray),
        WireType::Byte => byte_string(items).map(Value::ByteString),
        WireType::Array(inner) if **inner == WireType::Byte => items
            .iter()
            .map(|item| match item {
                WireValue::Array { items, .. } => byte_string(items),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(Value::ByteStringArray),
        WireType::DictEntry(k, v) if **k == WireType::String && **v == WireType::Variant => {
            vardict(items).map(Value::Dict)
        }
        _ => None,
    };
    decoded.unwrap_or_else(|| Value::Array(items.iter().map(decode).collect()))
}

/// Elements of an `as`.
fn strings(items: &[WireValue]) -> Option<Vec<String>> {
    items
        .iter()
        .map(|item| match item {
            WireValue::String(s) => Some(s.clone()),
            _ => None,
        })
        .collect()
}

/// Content of an empty or NUL-terminated `ay`. Other byte arrays keep every
/// byte by decoding as a plain [`Value::Array`].
fn byte_string(items: &[WireValue]) -> Option<Vec<u8>> {
    if items.is_empty() {
        return Some(Vec::new());
    }
    terminated_bytes(items)
}

/// Entries of an `a{sv}`, values unwrapped to their payloads.
fn vardict(items: &[WireValue]) -> Option<BTreeMap<String, Value>> {
    items
        .iter()
        .map(|item| match item {
            WireValue::DictEntry(k, v) => {
                let key = k.as_str()?.to_string();
                let value = match v.as_ref() {
                    WireValue::Variant(payload) => decode(payload),
                    other => decode(other),
                };
                Some((key, value))
            }
            _ => None,
        })
        .collect()
}
