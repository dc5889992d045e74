//! Value converters
//!
//! `to_value` turns a matched segment (plus its regex captures) into an
//! attribute value. A failing `to_value` ends the repetition loop of its rule
//! without failing the whole match. `to_path` renders a value back into a
//! segment during generation.

use crate::pattern::Captures;
use crate::value::AttributeValue;
use anyhow::{anyhow, bail, Context};
use serde::Deserialize;
use std::sync::Arc;

/// Segment-to-value conversion
pub type ToValue = Arc<dyn Fn(&str, &Captures) -> anyhow::Result<AttributeValue> + Send + Sync>;

/// Value-to-segment conversion
pub type ToPath = Arc<dyn Fn(&AttributeValue) -> anyhow::Result<String> + Send + Sync>;

/// Built-in converters, selectable from configuration with `convert = "integer"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Converter {
    /// Signed 64-bit integers
    Integer,
    /// Finite floating point numbers
    Number,
}

impl Converter {
    pub fn to_value(self) -> ToValue {
        match self {
            Converter::Integer => Arc::new(parse_integer),
            Converter::Number => Arc::new(parse_number),
        }
    }

    pub fn to_path(self) -> ToPath {
        match self {
            Converter::Integer => Arc::new(render_integer),
            Converter::Number => Arc::new(render_number),
        }
    }
}

fn parse_integer(raw: &str, _captures: &Captures) -> anyhow::Result<AttributeValue> {
    let n: i64 = raw
        .parse()
        .with_context(|| format!("`{}` is not an integer", raw))?;
    Ok(AttributeValue::from(n))
}

fn parse_number(raw: &str, _captures: &Captures) -> anyhow::Result<AttributeValue> {
    let n: f64 = raw
        .parse()
        .with_context(|| format!("`{}` is not a number", raw))?;
    if !n.is_finite() {
        bail!("`{}` is not a finite number", raw);
    }
    Ok(AttributeValue::from(n))
}

fn render_integer(value: &AttributeValue) -> anyhow::Result<String> {
    match value {
        AttributeValue::Number(n) if n.fract() == 0.0 && fits_i64(*n) => Ok(format!("{}", *n as i64)),
        AttributeValue::String(s) if s.parse::<i64>().is_ok() => Ok(s.clone()),
        other => Err(anyhow!("`{}` is not an integer", other)),
    }
}

/// `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive
fn fits_i64(n: f64) -> bool {
    n >= i64::MIN as f64 && n < i64::MAX as f64
}

fn render_number(value: &AttributeValue) -> anyhow::Result<String> {
    match value {
        AttributeValue::Number(n) if n.is_finite() => Ok(value.to_string()),
        AttributeValue::String(s) if s.parse::<f64>().is_ok_and(f64::is_finite) => Ok(s.clone()),
        other => Err(anyhow!("`{}` is not a number", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("42", Some(42.0))]
    #[case("-7", Some(-7.0))]
    #[case("4.2", None)]
    #[case("abc", None)]
    fn test_integer_to_value(#[case] raw: &str, #[case] expected: Option<f64>) {
        let convert = Converter::Integer.to_value();
        let result = convert(raw, &vec![]).ok().and_then(|v| v.as_f64());
        assert_eq!(result, expected);
    }

    #[rstest]
    #[case("4.5", Some(4.5))]
    #[case("inf", None)]
    #[case("NaN", None)]
    fn test_number_to_value(#[case] raw: &str, #[case] expected: Option<f64>) {
        let convert = Converter::Number.to_value();
        let result = convert(raw, &vec![]).ok().and_then(|v| v.as_f64());
        assert_eq!(result, expected);
    }

    #[test]
    fn test_to_path() {
        let integer = Converter::Integer.to_path();
        assert_eq!(integer(&AttributeValue::from(7)).unwrap(), "7");
        assert_eq!(integer(&AttributeValue::from("12")).unwrap(), "12");
        assert!(integer(&AttributeValue::from(1.5)).is_err());
        assert!(integer(&AttributeValue::from(1e300)).is_err());
        assert!(integer(&AttributeValue::from(-1e19)).is_err());

        let number = Converter::Number.to_path();
        assert_eq!(number(&AttributeValue::from(1.5)).unwrap(), "1.5");
        assert_eq!(number(&AttributeValue::from(3)).unwrap(), "3");
        assert!(number(&AttributeValue::from(true)).is_err());
    }
}
