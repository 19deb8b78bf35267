//! Runtime values bound to statement parameters and read back from rows.

use crate::mapping::{FieldType, ScalarType};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A runtime value exchanged with the relational store.
///
/// `Null` is the store-native null sentinel; it never compares equal to any
/// concrete value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit floating point.
    Float64(f64),
    /// UTF-8 string.
    String(String),
    /// Binary data.
    Bytes(Vec<u8>),
}

/// A value could not be converted to the requested scalar type.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot convert {value} to {target:?}: {reason}")]
pub struct CoercionError {
    /// Rendering of the offending value.
    pub value: String,
    /// The requested type.
    pub target: ScalarType,
    /// Why the conversion failed.
    pub reason: String,
}

impl CoercionError {
    /// Create a new coercion error.
    pub fn new(value: impl fmt::Display, target: ScalarType, reason: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            target,
            reason: reason.into(),
        }
    }
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The scalar type of this value, `None` for null.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ScalarType::Bool),
            Value::Int32(_) => Some(ScalarType::Int32),
            Value::Int64(_) => Some(ScalarType::Int64),
            Value::Float64(_) => Some(ScalarType::Float64),
            Value::String(_) => Some(ScalarType::String),
            Value::Bytes(_) => Some(ScalarType::Bytes),
        }
    }

    /// Try to get as string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as i64, widening 32-bit integers.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(i) => Some(*i),
            Value::Int32(i) => Some(*i as i64),
            _ => None,
        }
    }

    /// Convert this value to `target`.
    ///
    /// Null stays null for every target. Conversions that would lose
    /// information (overflow, fractional parts, non-numeric text, invalid
    /// UTF-8) fail instead of truncating.
    pub fn coerce(self, target: ScalarType) -> Result<Value, CoercionError> {
        if self.scalar_type() == Some(target) || self.is_null() {
            return Ok(self);
        }

        let fail = |value: &Value, reason: &str| Err(CoercionError::new(value, target, reason));

        match (self, target) {
            (Value::Bool(b), ScalarType::Int32) => Ok(Value::Int32(b as i32)),
            (Value::Bool(b), ScalarType::Int64) => Ok(Value::Int64(b as i64)),
            (Value::Bool(b), ScalarType::Float64) => Ok(Value::Float64(if b { 1.0 } else { 0.0 })),
            (Value::Bool(b), ScalarType::String) => Ok(Value::String(b.to_string())),

            (Value::Int32(i), ScalarType::Int64) => Ok(Value::Int64(i as i64)),
            (Value::Int32(i), ScalarType::Float64) => Ok(Value::Float64(i as f64)),
            (Value::Int32(i), ScalarType::String) => Ok(Value::String(i.to_string())),
            (v @ Value::Int32(_), ScalarType::Bool) | (v @ Value::Int64(_), ScalarType::Bool) => {
                match v.as_i64() {
                    Some(0) => Ok(Value::Bool(false)),
                    Some(1) => Ok(Value::Bool(true)),
                    _ => fail(&v, "only 0 and 1 map to booleans"),
                }
            }

            (v @ Value::Int64(_), ScalarType::Int32) => match v.as_i64().map(i32::try_from) {
                Some(Ok(i)) => Ok(Value::Int32(i)),
                _ => fail(&v, "out of range"),
            },
            (Value::Int64(i), ScalarType::Float64) => Ok(Value::Float64(i as f64)),
            (Value::Int64(i), ScalarType::String) => Ok(Value::String(i.to_string())),

            (v @ Value::Float64(f), ScalarType::Int32) => {
                if f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 {
                    Ok(Value::Int32(f as i32))
                } else {
                    fail(&v, "not an integral value in range")
                }
            }
            (v @ Value::Float64(f), ScalarType::Int64) => {
                // i64::MAX is not exactly representable; the bound is exclusive.
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                    Ok(Value::Int64(f as i64))
                } else {
                    fail(&v, "not an integral value in range")
                }
            }
            (Value::Float64(f), ScalarType::String) => Ok(Value::String(f.to_string())),

            (v @ Value::String(_), ScalarType::Bool) => {
                let parsed = v.as_str().map(|s| s.trim().to_ascii_lowercase());
                match parsed.as_deref() {
                    Some("true") | Some("1") => Ok(Value::Bool(true)),
                    Some("false") | Some("0") => Ok(Value::Bool(false)),
                    _ => fail(&v, "not a boolean literal"),
                }
            }
            (v @ Value::String(_), ScalarType::Int32) => {
                match v.as_str().map(|s| s.trim().parse::<i32>()) {
                    Some(Ok(i)) => Ok(Value::Int32(i)),
                    _ => fail(&v, "not an integer"),
                }
            }
            (v @ Value::String(_), ScalarType::Int64) => {
                match v.as_str().map(|s| s.trim().parse::<i64>()) {
                    Some(Ok(i)) => Ok(Value::Int64(i)),
                    _ => fail(&v, "not an integer"),
                }
            }
            (v @ Value::String(_), ScalarType::Float64) => {
                match v.as_str().map(|s| s.trim().parse::<f64>()) {
                    Some(Ok(f)) => Ok(Value::Float64(f)),
                    _ => fail(&v, "not a number"),
                }
            }
            (Value::String(s), ScalarType::Bytes) => Ok(Value::Bytes(s.into_bytes())),

            (Value::Bytes(b), ScalarType::String) => match String::from_utf8(b) {
                Ok(s) => Ok(Value::String(s)),
                Err(e) => Err(CoercionError::new(
                    format!("<{} bytes>", e.as_bytes().len()),
                    target,
                    "invalid UTF-8",
                )),
            },

            (v, _) => fail(&v, "no conversion defined"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int32(i) => write!(f, "{}", i),
            Value::Int64(i) => write!(f, "{}", i),
            Value::Float64(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

/// Conversion from a store value into a Rust field type.
pub trait FromValue: Sized {
    /// The scalar type values are coerced to before conversion.
    const SCALAR: ScalarType;

    /// Whether null converts to a value of this type.
    const NULLABLE: bool = false;

    /// The declared field type for this Rust type.
    fn field_type() -> FieldType {
        if Self::NULLABLE {
            FieldType::OptionalScalar(Self::SCALAR)
        } else {
            FieldType::Scalar(Self::SCALAR)
        }
    }

    /// Convert `value`, coercing it to [`Self::SCALAR`] first.
    fn from_value(value: Value) -> Result<Self, CoercionError>;
}

macro_rules! impl_from_value {
    ($ty:ty, $scalar:ident) => {
        impl FromValue for $ty {
            const SCALAR: ScalarType = ScalarType::$scalar;

            fn from_value(value: Value) -> Result<Self, CoercionError> {
                match value.coerce(ScalarType::$scalar)? {
                    Value::$scalar(v) => Ok(v),
                    other => Err(CoercionError::new(
                        other,
                        ScalarType::$scalar,
                        "value is absent",
                    )),
                }
            }
        }
    };
}

impl_from_value!(bool, Bool);
impl_from_value!(i32, Int32);
impl_from_value!(i64, Int64);
impl_from_value!(f64, Float64);
impl_from_value!(String, String);
impl_from_value!(Vec<u8>, Bytes);

impl<T: FromValue> FromValue for Option<T> {
    const SCALAR: ScalarType = T::SCALAR;
    const NULLABLE: bool = true;

    fn from_value(value: Value) -> Result<Self, CoercionError> {
        match value {
            Value::Null => Ok(None),
            v => T::from_value(v).map(Some),
        }
    }
}

// Conversion implementations
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}
