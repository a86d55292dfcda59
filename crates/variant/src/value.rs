//! The local dynamic value exchanged with remote menus and actions.

use std::{borrow::Cow, collections::BTreeMap};

use serde::Serialize;

/// A dynamically typed value decoded from (or destined for) the wire.
///
/// `Array` holds elements that share one wire type; `Tuple` holds positional,
/// independently typed elements. `VariantBox` is exactly one level of
/// type-erased wrapping and is never flattened implicitly.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// `b`
    Bool(bool),
    /// `y`
    Byte(u8),
    /// `n`
    Int16(i16),
    /// `q`
    UInt16(u16),
    /// `i`
    Int32(i32),
    /// `u`
    UInt32(u32),
    /// `x`
    Int64(i64),
    /// `t`
    UInt64(u64),
    /// `d`
    Double(f64),
    /// `s`
    String(String),
    /// `as`
    StringArray(Vec<String>),
    /// `ay`, without the trailing NUL.
    ByteString(Vec<u8>),
    /// `aay`
    ByteStringArray(Vec<Vec<u8>>),
    /// `v`
    VariantBox(Box<Value>),
    /// `a{sv}`
    Dict(BTreeMap<String, Value>),
    /// Any other homogeneous array.
    Array(Vec<Value>),
    /// Any tuple.
    Tuple(Vec<Value>),
    /// A wire value this bridge does not represent.
    Unsupported,
}

impl Value {
    /// Wrap a value one level as type-erased.
    pub fn boxed(inner: Self) -> Self {
        Self::VariantBox(Box::new(inner))
    }

    /// Strip exactly one level of `VariantBox`, if present.
    pub fn unboxed(&self) -> &Self {
        match self {
            Self::VariantBox(inner) => inner,
            other => other,
        }
    }

    /// Strip every level of `VariantBox`.
    pub fn innermost(&self) -> &Self {
        let mut cur = self;
        while let Self::VariantBox(inner) = cur {
            cur = inner;
        }
        cur
    }

    /// Short tag name, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Byte(_) => "byte",
            Self::Int16(_) => "int16",
            Self::UInt16(_) => "uint16",
            Self::Int32(_) => "int32",
            Self::UInt32(_) => "uint32",
            Self::Int64(_) => "int64",
            Self::UInt64(_) => "uint64",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::StringArray(_) => "string-array",
            Self::ByteString(_) => "bytestring",
            Self::ByteStringArray(_) => "bytestring-array",
            Self::VariantBox(_) => "variant",
            Self::Dict(_) => "dict",
            Self::Array(_) => "array",
            Self::Tuple(_) => "tuple",
            Self::Unsupported => "unsupported",
        }
    }

    /// View list-like values as a sequence of elements.
    ///
    /// `Array` and `Tuple` are borrowed; `StringArray` and `ByteStringArray`
    /// are expanded into `String`/`ByteString` elements. Wrapping variants
    /// are looked through.
    pub fn list_items(&self) -> Option<Cow<'_, [Self]>> {
        match self.innermost() {
            Self::Array(items) | Self::Tuple(items) => Some(Cow::Borrowed(items.as_slice())),
            Self::StringArray(items) => Some(Cow::Owned(
                items.iter().cloned().map(Self::String).collect(),
            )),
            Self::ByteStringArray(items) => Some(Cow::Owned(
                items.iter().cloned().map(Self::ByteString).collect(),
            )),
            _ => None,
        }
    }

    /// Borrow the map of a `Dict`, looking through wrapping variants.
    pub fn as_dict(&self) -> Option<&BTreeMap<String, Self>> {
        match self.innermost() {
            Self::Dict(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow the text of a `String`, looking through wrapping variants.
    pub fn as_str(&self) -> Option<&str> {
        match self.innermost() {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::UInt32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}
