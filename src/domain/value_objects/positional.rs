//! Decoding helpers for values Kraken encodes as JSON arrays
//!
//! Several results carry tuples such as `["52523.00000", "1.199", 1616663113]`
//! (price, volume, timestamp). [`Positional`] checks the array length up front and
//! turns each slot into a typed value, reporting the slot index on failure.

use crate::domain::errors::DecodeError;
use crate::domain::value_objects::amount::Amount;
use serde::de::{self, Deserialize, Deserializer};
use serde_json::Value;

/// A validated view over a positionally-encoded array
#[derive(Debug, Clone, Copy)]
pub struct Positional<'a> {
    what: &'static str,
    items: &'a [Value],
}

impl<'a> Positional<'a> {
    /// Wrap `items`, requiring at least `min_len` entries
    pub fn new(what: &'static str, items: &'a [Value], min_len: usize) -> Result<Self, DecodeError> {
        if items.len() < min_len {
            return Err(DecodeError::LengthMismatch {
                what,
                expected: min_len,
                actual: items.len(),
            });
        }
        Ok(Self { what, items })
    }

    pub fn from_value(what: &'static str, value: &'a Value, min_len: usize) -> Result<Self, DecodeError> {
        match value {
            Value::Array(items) => Self::new(what, items, min_len),
            other => Err(DecodeError::NotAnArray {
                what,
                value: other.to_string(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn get(&self, index: usize) -> Result<&'a Value, DecodeError> {
        self.items.get(index).ok_or(DecodeError::LengthMismatch {
            what: self.what,
            expected: index + 1,
            actual: self.items.len(),
        })
    }

    /// Numeric string or JSON number
    pub fn amount(&self, index: usize) -> Result<Amount, DecodeError> {
        let value = self.get(index)?;
        let parsed = match value {
            Value::String(s) => s.parse::<Amount>().ok(),
            Value::Number(n) => n.as_f64().and_then(|f| Amount::new(f).ok()),
            _ => None,
        };
        parsed.ok_or_else(|| DecodeError::InvalidNumber {
            what: self.what,
            index,
            value: value.to_string(),
        })
    }

    /// Integer as a JSON number or a numeric string
    pub fn integer(&self, index: usize) -> Result<i64, DecodeError> {
        let value = self.get(index)?;
        integer_from(value).ok_or_else(|| DecodeError::InvalidNumber {
            what: self.what,
            index,
            value: value.to_string(),
        })
    }

    /// Fractional unix timestamp, e.g. `1616663113.1234`
    pub fn timestamp(&self, index: usize) -> Result<f64, DecodeError> {
        Ok(self.amount(index)?.value())
    }

    pub fn string(&self, index: usize) -> Result<&'a str, DecodeError> {
        let value = self.get(index)?;
        value.as_str().ok_or_else(|| DecodeError::UnexpectedType {
            what: self.what,
            index,
            expected: "a string",
            value: value.to_string(),
        })
    }

    /// Trailing slot that older responses omit
    pub fn optional_integer(&self, index: usize) -> Result<Option<i64>, DecodeError> {
        if index >= self.items.len() {
            return Ok(None);
        }
        self.integer(index).map(Some)
    }

    pub fn unexpected(&self, index: usize, expected: &'static str) -> DecodeError {
        DecodeError::UnexpectedType {
            what: self.what,
            index,
            expected,
            value: self.items.get(index).map(Value::to_string).unwrap_or_default(),
        }
    }
}

fn integer_from(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Read an integer field such as `last`, which Kraken sends as a number or a string
pub fn integer_field(what: &'static str, object: &Value, field: &str) -> Result<i64, DecodeError> {
    let value = object.get(field).ok_or_else(|| DecodeError::MissingField {
        what,
        field: field.to_string(),
    })?;
    integer_from(value).ok_or_else(|| DecodeError::InvalidNumber {
        what,
        index: 0,
        value: value.to_string(),
    })
}

/// Shared `Deserialize` body for tuple types: read the array, then convert it
pub fn deserialize_positional<'de, D, T>(
    deserializer: D,
    convert: impl FnOnce(&[Value]) -> Result<T, DecodeError>,
) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Vec::<Value>::deserialize(deserializer)?;
    convert(&items).map_err(de::Error::custom)
}
