//! Attribute value types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Value extracted from (or rendered into) path segments
///
/// Plain matches produce strings. Converters may produce numbers, repeated
/// attributes produce arrays and key/value rules produce objects. Objects are
/// ordered so that generation is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<AttributeValue>),
    Object(BTreeMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Render a scalar as a single path segment
    ///
    /// Only strings, numbers and booleans are segment-coercible. Integral
    /// numbers render without a fractional part (`7`, not `7.0`).
    pub fn to_segment(&self) -> Option<String> {
        match self {
            AttributeValue::String(s) => Some(s.clone()),
            AttributeValue::Number(n) => Some(format_number(*n)),
            AttributeValue::Bool(b) => Some(b.to_string()),
            AttributeValue::Null | AttributeValue::Array(_) | AttributeValue::Object(_) => None,
        }
    }

    /// Convert value to boolean
    pub fn to_bool(&self) -> bool {
        match self {
            AttributeValue::Bool(b) => *b,
            AttributeValue::Number(n) => *n != 0.0,
            AttributeValue::String(s) => !s.is_empty(),
            AttributeValue::Array(arr) => !arr.is_empty(),
            AttributeValue::Object(obj) => !obj.is_empty(),
            AttributeValue::Null => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, AttributeValue>> {
        match self {
            AttributeValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Append `other`, turning `self` into an array if it is not one already
    ///
    /// Array contributions are spliced in element by element.
    pub fn append(&mut self, other: AttributeValue) {
        let mut items = match std::mem::replace(self, AttributeValue::Null) {
            AttributeValue::Array(items) => items,
            scalar => vec![scalar],
        };

        match other {
            AttributeValue::Array(more) => items.extend(more),
            single => items.push(single),
        }

        *self = AttributeValue::Array(items);
    }
}

fn format_number(n: f64) -> String {
    // Integral values print without ".0"
    if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Array(arr) => {
                let items: Vec<String> = arr.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            AttributeValue::Object(obj) => {
                let pairs: Vec<String> = obj.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", pairs.join(", "))
            }
            AttributeValue::Null => Ok(()),
            scalar => f.write_str(&scalar.to_segment().unwrap_or_default()),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        AttributeValue::Number(n)
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        AttributeValue::Number(n as f64)
    }
}

impl From<i32> for AttributeValue {
    fn from(n: i32) -> Self {
        AttributeValue::Number(n as f64)
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl<T: Into<AttributeValue>> From<Vec<T>> for AttributeValue {
    fn from(items: Vec<T>) -> Self {
        AttributeValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, AttributeValue>> for AttributeValue {
    fn from(map: BTreeMap<String, AttributeValue>) -> Self {
        AttributeValue::Object(map)
    }
}

impl<K: Into<String>, V: Into<AttributeValue>> FromIterator<(K, V)> for AttributeValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        AttributeValue::Object(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
