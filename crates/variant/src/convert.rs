//! Lossless scalar conversions used by schema-directed encoding.

use crate::{Value, WireType, WireValue};

/// A scalar reduced to one of three carriers.
enum Scalar<'a> {
    /// Any integer or bool, widened.
    Int(i128),
    /// A double.
    Float(f64),
    /// Text.
    Text(&'a str),
}

impl<'a> Scalar<'a> {
    /// Reduce `value`, looking through every variant level.
    fn of(value: &'a Value) -> Option<Self> {
        Some(match value.innermost() {
            Value::Bool(b) => Self::Int(i128::from(*b)),
            Value::Byte(v) => Self::Int(i128::from(*v)),
            Value::Int16(v) => Self::Int(i128::from(*v)),
            Value::UInt16(v) => Self::Int(i128::from(*v)),
            Value::Int32(v) => Self::Int(i128::from(*v)),
            Value::UInt32(v) => Self::Int(i128::from(*v)),
            Value::Int64(v) => Self::Int(i128::from(*v)),
            Value::UInt64(v) => Self::Int(i128::from(*v)),
            Value::Double(v) => Self::Float(*v),
            Value::String(s) => Self::Text(s),
            _ => return None,
        })
    }

    /// Integer view: doubles only when integral.
    fn as_int(&self) -> Option<i128> {
        match *self {
            Self::Int(i) => Some(i),
            Self::Float(f) if f.is_finite() && f.fract() == 0.0 => {
                #[allow(clippy::cast_possible_truncation)]
                let i = f as i128;
                Some(i)
            }
            Self::Float(_) => None,
            Self::Text(s) => s.parse().ok(),
        }
    }
}

/// Convert `value` to the scalar wire type `ty` without loss of information.
///
/// Returns `None` when `ty` is not one of `b y n q i u x t d s` or when the
/// value does not fit.
pub fn to_scalar(value: &Value, ty: &WireType) -> Option<WireValue> {
    if matches!(ty, WireType::String) {
        return to_text(value.innermost()).map(WireValue::String);
    }
    let scalar = Scalar::of(value)?;
    Some(match ty {
        WireType::Bool => match (&scalar, value.innermost()) {
            (_, Value::Bool(b)) => WireValue::Bool(*b),
            (Scalar::Text(s), _) => WireValue::Bool(s.parse().ok()?),
            _ => match scalar.as_int()? {
                0 => WireValue::Bool(false),
                1 => WireValue::Bool(true),
                _ => return None,
            },
        },
        WireType::Byte => WireValue::Byte(u8::try_from(scalar.as_int()?).ok()?),
        WireType::Int16 => WireValue::Int16(i16::try_from(scalar.as_int()?).ok()?),
        WireType::UInt16 => WireValue::UInt16(u16::try_from(scalar.as_int()?).ok()?),
        WireType::Int32 => WireValue::Int32(i32::try_from(scalar.as_int()?).ok()?),
        WireType::UInt32 => WireValue::UInt32(u32::try_from(scalar.as_int()?).ok()?),
        WireType::Int64 => WireValue::Int64(i64::try_from(scalar.as_int()?).ok()?),
        WireType::UInt64 => WireValue::UInt64(u64::try_from(scalar.as_int()?).ok()?),
        WireType::Double => WireValue::Double(to_double(&scalar)?),
        _ => return None,
    })
}

/// Exact double for the scalar, if one exists.
fn to_double(scalar: &Scalar<'_>) -> Option<f64> {
    match *scalar {
        Scalar::Float(f) => Some(f),
        Scalar::Text(s) => s.parse().ok(),
        Scalar::Int(i) => {
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            let (f, back) = {
                let f = i as f64;
                (f, f as i128)
            };
            (back == i).then_some(f)
        }
    }
}

/// Display form of any scalar.
fn to_text(value: &Value) -> Option<String> {
    Some(match value {
        Value::Bool(b) => b.to_string(),
        Value::Byte(v) => v.to_string(),
        Value::Int16(v) => v.to_string(),
        Value::UInt16(v) => v.to_string(),
        Value::Int32(v) => v.to_string(),
        Value::UInt32(v) => v.to_string(),
        Value::Int64(v) => v.to_string(),
        Value::UInt64(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        Value::String(s) => s.clone(),
        _ => return None,
    })
}
