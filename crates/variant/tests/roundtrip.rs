use std::collections::BTreeMap;

use appmenu_variant::{
    Value, WireType, WireValue, decode, decode_from_text, encode, encode_with_schema, parse_text,
};
use proptest::prelude::*;

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<u8>().prop_map(Value::Byte),
        any::<i16>().prop_map(Value::Int16),
        any::<u16>().prop_map(Value::UInt16),
        any::<i32>().prop_map(Value::Int32),
        any::<u32>().prop_map(Value::UInt32),
        any::<i64>().prop_map(Value::Int64),
        any::<u64>().prop_map(Value::UInt64),
        any::<i32>().prop_map(|i| Value::Double(f64::from(i) / 4.0)),
        "[a-z0-9 '\\\\\"\n\t\u{e9}]{0,8}".prop_map(Value::String),
    ]
}

fn nul_free_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(1u8..=255, 0..6)
}

/// Byte arrays that do not look like a terminated byte string: they end in a
/// non-NUL byte and may hold NULs anywhere before it.
fn unterminated_bytes() -> impl Strategy<Value = Vec<Value>> {
    (prop::collection::vec(prop_oneof![Just(0u8), any::<u8>()], 0..6), 1u8..=255).prop_map(
        |(mut bytes, last)| {
            bytes.push(last);
            bytes.into_iter().map(Value::Byte).collect()
        },
    )
}

/// Arrays hold one scalar kind that has no dedicated array form.
fn scalar_array() -> impl Strategy<Value = Value> {
    prop_oneof![
        unterminated_bytes(),
        prop::collection::vec(any::<bool>().prop_map(Value::Bool), 0..4),
        prop::collection::vec(any::<i32>().prop_map(Value::Int32), 0..4),
        prop::collection::vec(any::<u64>().prop_map(Value::UInt64), 0..4),
        prop::collection::vec(any::<i16>().prop_map(|i| Value::Double(f64::from(i))), 0..4),
    ]
    .prop_map(Value::Array)
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => scalar(),
        1 => prop::collection::vec("[a-z]{0,4}", 0..4).prop_map(Value::StringArray),
        1 => nul_free_bytes().prop_map(Value::ByteString),
        1 => prop::collection::vec(nul_free_bytes(), 0..3).prop_map(Value::ByteStringArray),
        1 => scalar_array(),
    ]
}

fn canonical() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(Value::boxed),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Tuple),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4).prop_map(Value::Dict),
        ]
    })
}

proptest! {
    #[test]
    fn decode_inverts_encode(v in canonical()) {
        let wire = encode(&v).expect("canonical values encode");
        prop_assert_eq!(decode(&wire), v);
    }

    #[test]
    fn printed_text_reparses(v in canonical()) {
        let wire = encode(&v).expect("canonical values encode");
        let printed = wire.to_string();
        prop_assert_eq!(parse_text(&printed).expect("printed text parses"), wire);
    }

    #[test]
    fn byte_arrays_survive_on_the_wire(
        bytes in prop::collection::vec(prop_oneof![Just(0u8), any::<u8>()], 0..8)
    ) {
        let v = Value::Array(bytes.into_iter().map(Value::Byte).collect());
        let wire = encode(&v).expect("byte arrays encode");
        let back = decode(&wire);
        prop_assert_eq!(encode(&back), Some(wire));
    }

    #[test]
    fn invalid_schema_is_ignored(v in canonical()) {
        prop_assert_eq!(encode_with_schema(&v, "bogus-schema"), encode(&v));
    }
}

#[test]
fn dict_literal_decodes_to_payloads() {
    let mut expected = BTreeMap::new();
    expected.insert("a".to_string(), Value::Int32(5));
    assert_eq!(
        decode_from_text(r#"{"a": <int32 5>}"#),
        Some(Value::Dict(expected))
    );
}

#[test]
fn interior_nul_bytes_are_kept() {
    let v = Value::Array(vec![Value::Byte(1), Value::Byte(0), Value::Byte(2)]);
    assert_eq!(decode(&encode(&v).unwrap()), v);
}

#[test]
fn empty_text_is_absent() {
    assert_eq!(decode_from_text(""), None);
}

#[test]
fn int_array_schema() {
    let v = decode_from_text("[1, 2]").unwrap();
    let wire = encode_with_schema(&v, "ai").unwrap();
    assert_eq!(wire.wire_type(), WireType::parse("ai").unwrap());
    assert_eq!(wire.to_string(), "[1, 2]");
}

#[test]
fn uint_array_schema_rejects_negative_elements() {
    let v = Value::Array(vec![Value::Int32(3), Value::Int32(-3)]);
    assert_eq!(
        encode_with_schema(&v, "au"),
        Some(WireValue::array(
            WireType::Int32,
            vec![WireValue::Int32(3), WireValue::Int32(-3)]
        ))
    );
    let v = Value::Array(vec![Value::Int32(3), Value::Int32(4)]);
    assert_eq!(
        encode_with_schema(&v, "au"),
        Some(WireValue::array(
            WireType::UInt32,
            vec![WireValue::UInt32(3), WireValue::UInt32(4)]
        ))
    );
}

#[test]
fn action_parameter_from_text() {
    // A menu item target written as text, sent against the action's declared
    // parameter type.
    let target = decode_from_text("('open', 3)").unwrap();
    let wire = encode_with_schema(&target, "(su)").unwrap();
    assert_eq!(wire.to_string(), "('open', uint32 3)");
}
