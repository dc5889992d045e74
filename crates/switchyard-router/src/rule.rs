//! Compiled attribute rules
//!
//! Matching is greedy and never backtracks: a rule takes as many repetitions
//! as it can (up to `max`) and the following segments have to live with
//! whatever is left.

use crate::convert::{ToPath, ToValue};
use crate::error::GenerateError;
use crate::key::AttributeKey;
use crate::pattern::PatternList;
use crate::value::AttributeValue;
use std::collections::BTreeMap;
use std::fmt;

/// Attribute rule with resolved patterns and validated quantities
#[derive(Clone)]
pub struct AttributeRule {
    pub(crate) name: AttributeKey,
    pub(crate) min: usize,
    /// `None` when unbounded
    pub(crate) max: Option<usize>,
    pub(crate) key: Option<PatternList>,
    pub(crate) value: PatternList,
    pub(crate) array: bool,
    pub(crate) to_value: Option<ToValue>,
    pub(crate) to_path: Option<ToPath>,
}

/// Result of applying a rule at some position
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch {
    /// Segments consumed (two per repetition for key/value rules)
    pub consumed: usize,
    /// `None` when zero repetitions matched
    pub value: Option<AttributeValue>,
}

struct Repetition {
    key: Option<String>,
    value: AttributeValue,
}

impl AttributeRule {
    pub fn name(&self) -> &AttributeKey {
        &self.name
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> Option<usize> {
        self.max
    }

    fn below_max(&self, count: usize) -> bool {
        self.max.map_or(true, |max| count < max)
    }

    fn within_bounds(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }

    /// Apply the rule to `segments`, starting at the first one
    ///
    /// Returns `None` when fewer than `min` repetitions match.
    pub fn match_segments(&self, segments: &[&str]) -> Option<RuleMatch> {
        let mut found: Vec<Repetition> = Vec::new();
        let mut consumed = 0;

        while self.below_max(found.len()) && consumed < segments.len() {
            let candidate = segments[consumed];

            let (key, raw, width) = match &self.key {
                Some(key_patterns) => {
                    if key_patterns.match_value(candidate).is_none() {
                        break;
                    }
                    // A key already taken ends the run
                    if found.iter().any(|rep| rep.key.as_deref() == Some(candidate)) {
                        break;
                    }
                    match segments.get(consumed + 1) {
                        Some(raw) => (Some(candidate.to_string()), *raw, 2),
                        None => break,
                    }
                }
                None => (None, candidate, 1),
            };

            let Some(captures) = self.value.match_value(raw) else {
                break;
            };

            let value = match &self.to_value {
                Some(to_value) => match to_value(raw, &captures) {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::debug!(attribute = %self.name, segment = raw, error = %e, "value conversion stopped repetition");
                        break;
                    }
                },
                None => AttributeValue::String(raw.to_string()),
            };

            found.push(Repetition { key, value });
            consumed += width;
        }

        if found.len() < self.min {
            return None;
        }

        Some(RuleMatch {
            consumed,
            value: self.materialize(found),
        })
    }

    fn materialize(&self, found: Vec<Repetition>) -> Option<AttributeValue> {
        if found.is_empty() {
            return None;
        }

        if self.key.is_some() {
            let object: BTreeMap<String, AttributeValue> = found
                .into_iter()
                .filter_map(|rep| rep.key.map(|key| (key, rep.value)))
                .collect();
            return Some(AttributeValue::Object(object));
        }

        let mut values: Vec<AttributeValue> = found.into_iter().map(|rep| rep.value).collect();
        if values.len() == 1 && !self.array {
            values.pop()
        } else {
            Some(AttributeValue::Array(values))
        }
    }

    /// Render `value` into path segments, appending to `out`
    ///
    /// A missing value is only acceptable when the rule allows zero
    /// repetitions.
    pub fn render(&self, value: Option<&AttributeValue>, out: &mut Vec<String>) -> Result<(), GenerateError> {
        let name = self.name.to_string();

        let Some(value) = value else {
            return if self.min == 0 {
                Ok(())
            } else {
                Err(GenerateError::MissingAttribute(name))
            };
        };

        let mut rendered = Vec::new();
        let count = if self.key.is_some() {
            let object = value
                .as_object()
                .ok_or_else(|| GenerateError::ExpectedObject(name.clone()))?;
            for (key, item) in object {
                rendered.push(self.check_segment(key.clone())?);
                rendered.push(self.render_one(item)?);
            }
            object.len()
        } else {
            match value {
                AttributeValue::Array(items) => {
                    for item in items {
                        rendered.push(self.render_one(item)?);
                    }
                    items.len()
                }
                scalar => {
                    rendered.push(self.render_one(scalar)?);
                    1
                }
            }
        };

        if !self.within_bounds(count) {
            return Err(GenerateError::Quantity {
                name,
                count,
                expected: self.describe_quantity(),
            });
        }

        out.extend(rendered);
        Ok(())
    }

    /// Render this rule's share of values it shares with other rules of the
    /// same name, returning how many of `items` it used
    ///
    /// `reserved` items are left for the rules that follow; the `last` rule
    /// has to use everything that remains.
    pub(crate) fn render_share(
        &self,
        items: &[&AttributeValue],
        reserved: usize,
        last: bool,
        out: &mut Vec<String>,
    ) -> Result<usize, GenerateError> {
        if self.key.is_some() {
            let used = match items.first() {
                Some(&object) if matches!(object, AttributeValue::Object(_)) && items.len() > reserved => {
                    self.render(Some(object), out)?;
                    1
                }
                _ => {
                    self.render(None, out)?;
                    0
                }
            };
            if last && items.len() > used {
                return Err(GenerateError::Quantity {
                    name: self.name.to_string(),
                    count: items.len(),
                    expected: self.describe_quantity(),
                });
            }
            return Ok(used);
        }

        let available = items.len().saturating_sub(reserved);
        let count = if last {
            items.len()
        } else {
            self.max.map_or(available, |max| max.min(available))
        };

        if !self.within_bounds(count) {
            return Err(GenerateError::Quantity {
                name: self.name.to_string(),
                count,
                expected: self.describe_quantity(),
            });
        }

        let rendered = items[..count]
            .iter()
            .map(|item| self.render_one(item))
            .collect::<Result<Vec<_>, _>>()?;
        out.extend(rendered);
        Ok(count)
    }

    fn render_one(&self, value: &AttributeValue) -> Result<String, GenerateError> {
        let segment = match &self.to_path {
            Some(to_path) => to_path(value).map_err(|e| GenerateError::Converter {
                name: self.name.to_string(),
                reason: e.to_string(),
            })?,
            None => value
                .to_segment()
                .ok_or_else(|| GenerateError::NotRenderable(self.name.to_string()))?,
        };

        self.check_segment(segment)
    }

    fn check_segment(&self, segment: String) -> Result<String, GenerateError> {
        if segment.is_empty() {
            return Err(GenerateError::EmptySegment(self.name.to_string()));
        }
        if segment.contains('/') {
            return Err(GenerateError::SeparatorInSegment(self.name.to_string()));
        }
        Ok(segment)
    }

    fn describe_quantity(&self) -> String {
        match self.max {
            Some(max) if max == self.min => format!("exactly {}", max),
            Some(max) => format!("{} to {}", self.min, max),
            None => format!("at least {}", self.min),
        }
    }
}

impl fmt::Debug for AttributeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeRule")
            .field("name", &self.name)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("key", &self.key)
            .field("value", &self.value)
            .field("array", &self.array)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Converter;
    use crate::pattern::{PatternRegistry, PatternSource};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn patterns(source: impl Into<PatternSource>) -> PatternList {
        PatternList::resolve(&source.into(), &PatternRegistry::new()).unwrap()
    }

    fn rule(min: usize, max: Option<usize>) -> AttributeRule {
        AttributeRule {
            name: "x".into(),
            min,
            max,
            key: None,
            value: patterns(PatternSource::regex(r"^[a-z]+$").unwrap()),
            array: false,
            to_value: None,
            to_path: None,
        }
    }

    #[rstest]
    #[case(&["a", "b"], true)]
    #[case(&["a"], false)]
    #[case(&["a", "b", "c", "d"], true)]
    fn test_quantifier_bounds(#[case] segments: &[&str], #[case] matches: bool) {
        let result = rule(2, Some(3)).match_segments(segments);
        assert_eq!(result.is_some(), matches);
    }

    #[test]
    fn test_greedy_stops_at_max() {
        let result = rule(2, Some(3)).match_segments(&["a", "b", "c", "d"]).unwrap();

        assert_eq!(result.consumed, 3);
        assert_eq!(result.value, Some(vec!["a", "b", "c"].into()));
    }

    #[test]
    fn test_stops_at_first_mismatch() {
        let result = rule(1, None).match_segments(&["a", "b", "1", "c"]).unwrap();
        assert_eq!(result.consumed, 2);
    }

    #[test]
    fn test_single_value_collapses_unless_array() {
        let scalar = rule(1, Some(1)).match_segments(&["a"]).unwrap();
        assert_eq!(scalar.value, Some("a".into()));

        let mut array_rule = rule(1, Some(1));
        array_rule.array = true;
        let array = array_rule.match_segments(&["a"]).unwrap();
        assert_eq!(array.value, Some(vec!["a"].into()));
    }

    #[test]
    fn test_zero_repetitions_contribute_nothing() {
        let result = rule(0, Some(1)).match_segments(&["1"]).unwrap();
        assert_eq!(result, RuleMatch { consumed: 0, value: None });
    }

    #[test]
    fn test_key_value_rule_builds_object() {
        let mut pairs = rule(1, Some(2));
        pairs.key = Some(patterns(vec!["id", "name"]));
        pairs.value = patterns(PatternSource::regex(".").unwrap());

        let result = pairs.match_segments(&["id", "42", "name", "x"]).unwrap();

        assert_eq!(result.consumed, 4);
        assert_eq!(
            result.value,
            Some([("id", "42"), ("name", "x")].into_iter().collect())
        );
    }

    #[test]
    fn test_key_without_value_segment_stops() {
        let mut pairs = rule(1, Some(2));
        pairs.key = Some(patterns(vec!["id", "name"]));
        pairs.value = patterns(PatternSource::regex(".").unwrap());

        let result = pairs.match_segments(&["id", "42", "name"]).unwrap();
        assert_eq!(result.consumed, 2);
    }

    #[test]
    fn test_repeated_key_stops_expansion() {
        let mut pairs = rule(1, None);
        pairs.key = Some(patterns(PatternSource::regex("^[a-z]+$").unwrap()));
        pairs.value = patterns(PatternSource::regex(r"\d+").unwrap());

        let result = pairs.match_segments(&["id", "1", "id", "2"]).unwrap();
        assert_eq!(result.consumed, 2);
        assert_eq!(result.value, Some([("id", "1")].into_iter().collect()));

        pairs.min = 2;
        assert!(pairs.match_segments(&["id", "1", "id", "2"]).is_none());

        let result = pairs.match_segments(&["id", "1", "page", "2"]).unwrap();
        let mut out = Vec::new();
        pairs.render(result.value.as_ref(), &mut out).unwrap();
        assert_eq!(out, vec!["id", "1", "page", "2"]);
    }

    #[test]
    fn test_to_value_failure_stops_expansion() {
        let mut numbers = rule(1, None);
        numbers.value = patterns(PatternSource::regex(".").unwrap());
        numbers.to_value = Some(Converter::Integer.to_value());

        let result = numbers.match_segments(&["1", "2", "x", "3"]).unwrap();

        assert_eq!(result.consumed, 2);
        assert_eq!(result.value, Some(vec![1, 2].into()));
        assert!(numbers.match_segments(&["x"]).is_none());
    }

    #[test]
    fn test_render_scalar_and_array() {
        let mut out = Vec::new();
        rule(1, Some(3))
            .render(Some(&vec!["a", "b"].into()), &mut out)
            .unwrap();
        rule(1, Some(1)).render(Some(&"c".into()), &mut out).unwrap();

        assert_eq!(out, vec!["a", "b", "c"]);
    }

    #[rstest]
    #[case(Some(AttributeValue::from(vec!["a"])), "attribute `x` has 1 repetition(s), expected 2 to 3")]
    #[case(Some(AttributeValue::from(vec!["a", "b", "c", "d"])), "attribute `x` has 4 repetition(s), expected 2 to 3")]
    #[case(None, "missing attribute `x`")]
    #[case(Some(AttributeValue::from("")), "attribute `x` rendered an empty segment")]
    #[case(Some(AttributeValue::from(vec!["a", "b/c"])), "attribute `x` rendered a segment containing '/'")]
    #[case(Some(AttributeValue::Null), "a value of `x` cannot be rendered as a segment")]
    fn test_render_errors(#[case] value: Option<AttributeValue>, #[case] message: &str) {
        let mut out = Vec::new();
        let error = rule(2, Some(3)).render(value.as_ref(), &mut out).unwrap_err();

        assert_eq!(error.to_string(), format!("cannot generate path: {}", message));
        assert!(out.is_empty());
    }

    #[test]
    fn test_render_missing_optional() {
        let mut out = Vec::new();
        rule(0, Some(1)).render(None, &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_render_object() {
        let mut pairs = rule(1, None);
        pairs.key = Some(patterns(vec!["id", "name"]));

        let mut out = Vec::new();
        let value: AttributeValue = [("name", "x"), ("id", "42")].into_iter().collect();
        pairs.render(Some(&value), &mut out).unwrap();

        assert_eq!(out, vec!["id", "42", "name", "x"]);
        assert!(pairs.render(Some(&"flat".into()), &mut out).is_err());
    }

    #[test]
    fn test_render_uses_to_path() {
        let mut numbers = rule(1, Some(1));
        numbers.to_path = Some(Converter::Integer.to_path());

        let mut out = Vec::new();
        numbers.render(Some(&AttributeValue::from(7)), &mut out).unwrap();
        assert_eq!(out, vec!["7"]);

        let error = numbers.render(Some(&AttributeValue::from(1.5)), &mut out).unwrap_err();
        assert!(matches!(error, GenerateError::Converter { .. }));
    }

    #[test]
    fn test_render_share_leaves_room_for_later_rules() {
        let values: Vec<AttributeValue> = vec!["a".into(), "b".into(), "c".into()];
        let items: Vec<&AttributeValue> = values.iter().collect();

        let mut out = Vec::new();
        let used = rule(1, Some(3)).render_share(&items, 1, false, &mut out).unwrap();
        assert_eq!(used, 2);

        let used = rule(1, Some(1)).render_share(&items[2..], 0, true, &mut out).unwrap();
        assert_eq!(used, 1);
        assert_eq!(out, vec!["a", "b", "c"]);

        let error = rule(1, Some(1)).render_share(&items, 0, true, &mut out).unwrap_err();
        assert!(matches!(error, GenerateError::Quantity { count: 3, .. }));
    }
}
