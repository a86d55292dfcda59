//! Concrete typed values as they travel on the wire.

use std::iter;

use crate::WireType;

/// A typed wire value.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
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
    /// `h`, an index into the message's file descriptor list.
    Handle(i32),
    /// `d`
    Double(f64),
    /// `s`
    String(String),
    /// `o`
    ObjectPath(String),
    /// `g`
    Signature(String),
    /// `v`
    Variant(Box<WireValue>),
    /// `mT`
    Maybe {
        /// Element type `T`.
        ty: WireType,
        /// Payload, absent for `nothing`.
        value: Option<Box<WireValue>>,
    },
    /// `aT`
    Array {
        /// Element type `T`.
        elem: WireType,
        /// Elements, each of type `elem`.
        items: Vec<WireValue>,
    },
    /// `(T...)`
    Tuple(Vec<WireValue>),
    /// `{KT}`
    DictEntry(Box<WireValue>, Box<WireValue>),
}

impl WireValue {
    /// The type of this value.
    pub fn wire_type(&self) -> WireType {
        match self {
            Self::Bool(_) => WireType::Bool,
            Self::Byte(_) => WireType::Byte,
            Self::Int16(_) => WireType::Int16,
            Self::UInt16(_) => WireType::UInt16,
            Self::Int32(_) => WireType::Int32,
            Self::UInt32(_) => WireType::UInt32,
            Self::Int64(_) => WireType::Int64,
            Self::UInt64(_) => WireType::UInt64,
            Self::Handle(_) => WireType::Handle,
            Self::Double(_) => WireType::Double,
            Self::String(_) => WireType::String,
            Self::ObjectPath(_) => WireType::ObjectPath,
            Self::Signature(_) => WireType::Signature,
            Self::Variant(_) => WireType::Variant,
            Self::Maybe { ty, .. } => WireType::Maybe(Box::new(ty.clone())),
            Self::Array { elem, .. } => WireType::Array(Box::new(elem.clone())),
            Self::Tuple(items) => WireType::Tuple(items.iter().map(Self::wire_type).collect()),
            Self::DictEntry(k, v) => {
                WireType::DictEntry(Box::new(k.wire_type()), Box::new(v.wire_type()))
            }
        }
    }

    /// Wrap one level as `v`.
    pub fn variant(inner: Self) -> Self {
        Self::Variant(Box::new(inner))
    }

    /// An array with an explicit element type.
    pub fn array(elem: WireType, items: Vec<Self>) -> Self {
        Self::Array { elem, items }
    }

    /// `ay` carrying `bytes` followed by a terminating NUL.
    pub fn bytestring(bytes: &[u8]) -> Self {
        let items = bytes
            .iter()
            .copied()
            .chain(iter::once(0))
            .map(Self::Byte)
            .collect();
        Self::array(WireType::Byte, items)
    }

    /// `as`
    pub fn string_array<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::array(
            WireType::String,
            items.into_iter().map(|s| Self::String(s.into())).collect(),
        )
    }

    /// `a{sv}` with every value wrapped as a variant.
    pub fn vardict<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Self)>,
        K: Into<String>,
    {
        let items = entries
            .into_iter()
            .map(|(k, v)| {
                Self::DictEntry(Box::new(Self::String(k.into())), Box::new(Self::variant(v)))
            })
            .collect();
        Self::array(
            WireType::DictEntry(Box::new(WireType::String), Box::new(WireType::Variant)),
            items,
        )
    }

    /// Borrow the text of `s`, `o` or `g` values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::ObjectPath(s) | Self::Signature(s) => Some(s),
            _ => None,
        }
    }
}

/// Bytes of an `ay` that ends in its only NUL, without the terminator.
pub(crate) fn terminated_bytes(items: &[WireValue]) -> Option<Vec<u8>> {
    let (last, body) = items.split_last()?;
    if *last != WireValue::Byte(0) {
        return None;
    }
    body.iter()
        .map(|item| match item {
            WireValue::Byte(b) if *b != 0 => Some(*b),
            _ => None,
        })
        .collect()
}
