use tracing::{debug, warn};

use crate::{Value, WireType, WireValue, convert};

/// Convert a dynamic value into a wire value, choosing wire types by tag.
///
/// Returns `None` for [`Value::Unsupported`] and for containers holding an
/// unencodable descendant.
pub fn encode(value: &Value) -> Option<WireValue> {
    let encoded = encode_value(value);
    if encoded.is_none() {
        warn!(kind = value.kind(), "value cannot be encoded");
    }
    encoded
}

/// Encode `value` against the type string `schema`.
///
/// An invalid schema, a schema kind that cannot direct encoding, or a value
/// that does not convert losslessly all fall back to [`encode`].
pub fn encode_with_schema(value: &Value, schema: &str) -> Option<WireValue> {
    let ty = match WireType::parse(schema) {
        Ok(ty) => ty,
        Err(err) => {
            debug!(schema, %err, "invalid schema, encoding without it");
            return encode(value);
        }
    };
    encode_as(value, &ty).or_else(|| {
        debug!(schema, kind = value.kind(), "value does not match schema");
        encode(value)
    })
}

/// Unlogged worker for [`encode`].
fn encode_value(value: &Value) -> Option<WireValue> {
    Some(match value {
        Value::Bool(v) => WireValue::Bool(*v),
        Value::Byte(v) => WireValue::Byte(*v),
        Value::Int16(v) => WireValue::Int16(*v),
        Value::UInt16(v) => WireValue::UInt16(*v),
        Value::Int32(v) => WireValue::Int32(*v),
        Value::UInt32(v) => WireValue::UInt32(*v),
        Value::Int64(v) => WireValue::Int64(*v),
        Value::UInt64(v) => WireValue::UInt64(*v),
        Value::Double(v) => WireValue::Double(*v),
        Value::String(s) => WireValue::String(s.clone()),
        Value::StringArray(items) => WireValue::string_array(items.iter().cloned()),
        Value::ByteString(bytes) => WireValue::bytestring(bytes),
        Value::ByteStringArray(items) => WireValue::array(
            WireType::Array(Box::new(WireType::Byte)),
            items.iter().map(|b| WireValue::bytestring(b)).collect(),
        ),
        Value::VariantBox(inner) => WireValue::variant(encode_value(inner)?),
        Value::Dict(map) => {
            let entries = map
                .iter()
                .map(|(k, v)| Some((k.as_str(), encode_value(v)?)))
                .collect::<Option<Vec<_>>>()?;
            WireValue::vardict(entries)
        }
        Value::Array(items) => {
            let items = items.iter().map(encode_value).collect::<Option<Vec<_>>>()?;
            homogeneous_array(items)
        }
        Value::Tuple(items) => {
            WireValue::Tuple(items.iter().map(encode_value).collect::<Option<Vec<_>>>()?)
        }
        Value::Unsupported => return None,
    })
}

/// `aT` when all elements share `T`; otherwise (or when empty) `av`.
fn homogeneous_array(items: Vec<WireValue>) -> WireValue {
    let mut types = items.iter().map(WireValue::wire_type);
    let Some(first) = types.next() else {
        return WireValue::array(WireType::Variant, items);
    };
    if types.all(|t| t == first) {
        return WireValue::array(first, items);
    }
    WireValue::array(
        WireType::Variant,
        items.into_iter().map(WireValue::variant).collect(),
    )
}

/// Schema-directed worker; `None` means "fall back".
fn encode_as(value: &Value, ty: &WireType) -> Option<WireValue> {
    match ty {
        WireType::Bool
        | WireType::Byte
        | WireType::Int16
        | WireType::UInt16
        | WireType::Int32
        | WireType::UInt32
        | WireType::Int64
        | WireType::UInt64
        | WireType::Double
        | WireType::String => convert::to_scalar(value, ty),
        WireType::Variant => encode_value(value).map(WireValue::variant),
        WireType::Array(_) if *ty == WireType::vardict() => match value.innermost() {
            dict @ Value::Dict(_) => encode_value(dict),
            _ => None,
        },
        WireType::Array(elem) => {
            let items = value.list_items()?;
            let encoded = items
                .iter()
                .map(|item| encode_as(item, elem))
                .collect::<Option<Vec<_>>>()?;
            Some(WireValue::array((**elem).clone(), encoded))
        }
        WireType::Tuple(types) => {
            let items = value.list_items()?;
            // A short input keeps the schema for the positions it has.
            if items.len() > types.len() {
                return None;
            }
            let encoded = items
                .iter()
                .zip(types)
                .map(|(item, ty)| encode_as(item, ty))
                .collect::<Option<Vec<_>>>()?;
            Some(WireValue::Tuple(encoded))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn arrays_pick_a_common_type() {
        let same = Value::Array(vec![Value::Int64(1), Value::Int64(2)]);
        assert_eq!(encode(&same).unwrap().wire_type().to_string(), "ax");
        let empty = Value::Array(Vec::new());
        assert_eq!(encode(&empty).unwrap().wire_type().to_string(), "av");
        let mixed = Value::Array(vec![Value::Int32(1), Value::from("a")]);
        assert_eq!(
            encode(&mixed),
            Some(WireValue::array(
                WireType::Variant,
                vec![
                    WireValue::variant(WireValue::Int32(1)),
                    WireValue::variant(WireValue::String("a".into())),
                ]
            ))
        );
    }

    #[test]
    fn unsupported_poisons_its_container() {
        assert_eq!(encode(&Value::Unsupported), None);
        let mut map = BTreeMap::new();
        map.insert("k".to_string(), Value::Tuple(vec![Value::Unsupported]));
        assert_eq!(encode(&Value::Dict(map)), None);
    }

    #[test]
    fn bogus_schema_matches_plain_encoding() {
        let v = Value::Tuple(vec![Value::Int32(1), Value::from("x")]);
        assert_eq!(encode_with_schema(&v, "bogus-schema"), encode(&v));
    }

    #[test]
    fn array_schema_converts_elements() {
        let v = Value::Array(vec![Value::Int32(1), Value::Int32(2)]);
        let wire = encode_with_schema(&v, "ai").unwrap();
        assert_eq!(wire.to_string(), "[1, 2]");
        let wire = encode_with_schema(&v, "at").unwrap();
        assert_eq!(wire.wire_type().to_string(), "at");
    }

    #[test]
    fn array_schema_is_all_or_nothing() {
        let v = Value::Array(vec![Value::Int32(1), Value::Int32(-1)]);
        let wire = encode_with_schema(&v, "au").unwrap();
        assert_eq!(wire, encode(&v).unwrap());
        assert_eq!(wire.wire_type().to_string(), "ai");
    }

    #[test]
    fn tuple_schema_applies_positionally() {
        let v = Value::Tuple(vec![Value::Int32(1), Value::Int32(2)]);
        assert_eq!(
            encode_with_schema(&v, "(xx)"),
            Some(WireValue::Tuple(vec![WireValue::Int64(1), WireValue::Int64(2)]))
        );
        // Schema exhausted before the input: fall back.
        assert_eq!(encode_with_schema(&v, "(x)"), encode(&v));
        // Input exhausted first: the converted prefix keeps its schema types.
        assert_eq!(
            encode_with_schema(&v, "(xxx)"),
            Some(WireValue::Tuple(vec![WireValue::Int64(1), WireValue::Int64(2)]))
        );
        assert_eq!(
            encode_with_schema(&Value::Tuple(vec![Value::Int32(1)]), "(uu)"),
            Some(WireValue::Tuple(vec![WireValue::UInt32(1)]))
        );
    }

    #[test]
    fn tuple_schema_position_failure_falls_back() {
        let v = Value::Tuple(vec![Value::Int32(1), Value::Int32(-1)]);
        assert_eq!(encode_with_schema(&v, "(uu)"), encode(&v));
    }

    #[test]
    fn variant_schema_wraps_once() {
        assert_eq!(
            encode_with_schema(&Value::Int32(3), "v"),
            Some(WireValue::variant(WireValue::Int32(3)))
        );
    }

    #[test]
    fn vardict_schema_requires_a_dict() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), Value::Bool(true));
        let dict = Value::Dict(map);
        assert_eq!(encode_with_schema(&dict, "a{sv}"), encode(&dict));
        assert_eq!(
            encode_with_schema(&Value::Int32(1), "a{sv}"),
            Some(WireValue::Int32(1))
        );
    }

    #[test]
    fn string_arrays_follow_element_schema() {
        let v = Value::StringArray(vec!["1".into(), "2".into()]);
        assert_eq!(
            encode_with_schema(&v, "ay"),
            Some(WireValue::array(
                WireType::Byte,
                vec![WireValue::Byte(1), WireValue::Byte(2)]
            ))
        );
    }

    #[test]
    fn opaque_schema_kinds_fall_back() {
        let v = Value::Int32(4);
        assert_eq!(encode_with_schema(&v, "h"), Some(WireValue::Int32(4)));
        assert_eq!(encode_with_schema(&v, "mi"), Some(WireValue::Int32(4)));
        assert_eq!(encode_with_schema(&v, "*"), Some(WireValue::Int32(4)));
    }
}
