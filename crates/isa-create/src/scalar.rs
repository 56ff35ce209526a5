use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use isa_core::errors::{ErrorInfo, IsaError};
use serde::{ser, Deserialize, Serialize, Serializer};

const NON_FINITE: &str = "isa_create.non_finite_number";

/// Numeric factor value.
///
/// Integers and floats are kept apart: `5` and `5.0` are different numbers.
/// Floats compare by bit pattern (all NaNs collapse to one value) so the type
/// can be used as a set member and map key.
///
/// NaN and the infinities have no JSON form. Serializing them fails, and
/// deserialization (including YAML `.nan`/`.inf`) rejects them.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(try_from = "NumberRecord")]
pub enum Number {
    /// Whole number.
    Int(i64),
    /// Floating point number.
    Float(f64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberRecord {
    Int(i64),
    Float(f64),
}

impl TryFrom<NumberRecord> for Number {
    type Error = IsaError;

    fn try_from(record: NumberRecord) -> Result<Self, Self::Error> {
        match record {
            NumberRecord::Int(value) => Ok(Number::Int(value)),
            NumberRecord::Float(value) => Number::finite(value),
        }
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Number::Int(value) => serializer.serialize_i64(value),
            Number::Float(value) if value.is_finite() => serializer.serialize_f64(value),
            Number::Float(value) => Err(ser::Error::custom(non_finite(value))),
        }
    }
}

fn non_finite(value: f64) -> ErrorInfo {
    ErrorInfo::new(NON_FINITE, "non-finite float has no portable encoding")
        .with_context("value", value.to_string())
}

impl Number {
    /// Wraps a float, rejecting NaN and the infinities.
    pub fn finite(value: f64) -> Result<Self, IsaError> {
        if value.is_finite() {
            Ok(Number::Float(value))
        } else {
            Err(IsaError::Design(non_finite(value)))
        }
    }

    /// Whether the number has a JSON encoding.
    pub fn is_finite(&self) -> bool {
        match *self {
            Number::Int(_) => true,
            Number::Float(value) => value.is_finite(),
        }
    }

    fn float_bits(value: f64) -> u64 {
        if value.is_nan() {
            f64::NAN.to_bits()
        } else {
            value.to_bits()
        }
    }

    /// Returns the number widened to `f64`.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(value) => value as f64,
            Number::Float(value) => value,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a.cmp(b),
            (Number::Float(a), Number::Float(b)) => {
                let a = f64::from_bits(Self::float_bits(*a));
                let b = f64::from_bits(Self::float_bits(*b));
                a.total_cmp(&b)
            }
            (Number::Int(_), Number::Float(_)) => Ordering::Less,
            (Number::Float(_), Number::Int(_)) => Ordering::Greater,
        }
    }
}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match *self {
            Number::Int(value) => {
                state.write_u8(0);
                value.hash(state);
            }
            Number::Float(value) => {
                state.write_u8(1);
                Self::float_bits(value).hash(state);
            }
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Int(value) => write!(f, "{value}"),
            // Integral floats keep a trailing `.0` so they never render like an Int.
            Number::Float(value) if value.is_finite() && value.fract() == 0.0 => {
                write!(f, "{value:.1}")
            }
            Number::Float(value) => write!(f, "{value}"),
        }
    }
}

/// Value a factor can take: free text or a number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Textual value, e.g. an agent name or a `low`/`high` level.
    Text(String),
    /// Numeric value, e.g. a dose or a duration.
    Number(Number),
}

impl Scalar {
    /// Returns the text payload, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(text) => Some(text),
            Scalar::Number(_) => None,
        }
    }

    /// Returns the numeric payload, if any.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Scalar::Text(_) => None,
            Scalar::Number(number) => Some(*number),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(text) => f.write_str(text),
            Scalar::Number(number) => number.fmt(f),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<Number> for Scalar {
    fn from(value: Number) -> Self {
        Scalar::Number(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(Number::Int(value))
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Number(Number::Int(i64::from(value)))
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Scalar::Number(Number::Int(i64::from(value)))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(Number::Float(value))
    }
}
