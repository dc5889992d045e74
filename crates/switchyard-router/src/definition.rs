//! Route definitions
//!
//! A definition is an ordered list of nodes. Literal nodes match one segment
//! exactly; attribute nodes describe a quantified rule that captures one or
//! more segments into a named attribute.

use crate::convert::{Converter, ToPath, ToValue};
use crate::error::RouteError;
use crate::key::AttributeKey;
use crate::pattern::{PatternConfig, PatternSource};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Upper bound on the number of repetitions of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Limited(i64),
    Unbounded,
}

/// One node of a route definition
#[derive(Debug, Clone)]
pub enum DefinitionNode {
    Literal(String),
    Attribute(AttributeDefinition),
}

impl From<&str> for DefinitionNode {
    fn from(literal: &str) -> Self {
        DefinitionNode::Literal(literal.to_string())
    }
}

impl From<String> for DefinitionNode {
    fn from(literal: String) -> Self {
        DefinitionNode::Literal(literal)
    }
}

impl From<AttributeDefinition> for DefinitionNode {
    fn from(attribute: AttributeDefinition) -> Self {
        DefinitionNode::Attribute(attribute)
    }
}

/// Quantified attribute rule, before compilation
///
/// Defaults: `min = 1`, `max = min`, no key pattern, scalar output.
///
/// # Examples
///
/// ```
/// use switchyard_router::{AttributeDefinition, PatternSource};
///
/// // One to three numeric segments, always collected into an array
/// let ids = AttributeDefinition::new("ids", PatternSource::regex(r"^\d+$").unwrap())
///     .with_max(3)
///     .with_array(true);
///
/// assert_eq!(ids.min, 1);
/// ```
#[derive(Clone)]
pub struct AttributeDefinition {
    pub name: AttributeKey,
    pub min: i64,
    /// `None` means "same as `min`"
    pub max: Option<Bound>,
    pub key: Option<PatternSource>,
    /// Required; `None` is rejected at compile time
    pub value: Option<PatternSource>,
    pub array: bool,
    pub to_value: Option<ToValue>,
    pub to_path: Option<ToPath>,
}

impl AttributeDefinition {
    pub fn new(name: impl Into<AttributeKey>, value: impl Into<PatternSource>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::unvalued(name)
        }
    }

    /// Definition without a value pattern yet
    pub fn unvalued(name: impl Into<AttributeKey>) -> Self {
        Self {
            name: name.into(),
            min: 1,
            max: None,
            key: None,
            value: None,
            array: false,
            to_value: None,
            to_path: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<PatternSource>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_min(mut self, min: i64) -> Self {
        self.min = min;
        self
    }

    pub fn with_max(mut self, max: i64) -> Self {
        self.max = Some(Bound::Limited(max));
        self
    }

    pub fn with_unbounded_max(mut self) -> Self {
        self.max = Some(Bound::Unbounded);
        self
    }

    /// `min = 0, max = 1`
    pub fn optional(self) -> Self {
        self.with_min(0).with_max(1)
    }

    /// Each repetition consumes a key segment followed by a value segment
    pub fn with_key(mut self, key: impl Into<PatternSource>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Always produce an array, even for a single repetition
    pub fn with_array(mut self, array: bool) -> Self {
        self.array = array;
        self
    }

    pub fn with_to_value<F>(mut self, to_value: F) -> Self
    where
        F: Fn(&str, &crate::Captures) -> anyhow::Result<crate::AttributeValue> + Send + Sync + 'static,
    {
        self.to_value = Some(Arc::new(to_value));
        self
    }

    pub fn with_to_path<F>(mut self, to_path: F) -> Self
    where
        F: Fn(&crate::AttributeValue) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        self.to_path = Some(Arc::new(to_path));
        self
    }

    /// Install both directions of a built-in converter
    pub fn with_converter(mut self, converter: Converter) -> Self {
        self.to_value = Some(converter.to_value());
        self.to_path = Some(converter.to_path());
        self
    }
}

impl fmt::Debug for AttributeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeDefinition")
            .field("name", &self.name)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("key", &self.key)
            .field("value", &self.value)
            .field("array", &self.array)
            .field("to_value", &self.to_value.is_some())
            .field("to_path", &self.to_path.is_some())
            .finish()
    }
}

// ============================================================================
// Configuration
// ============================================================================

fn default_min() -> i64 {
    1
}

/// Definition node as written in a routes file: a literal string or a table
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DefinitionNodeConfig {
    Literal(String),
    Attribute(AttributeConfig),
}

/// Attribute table of a routes file
///
/// ```toml
/// definition = ["product", { name = "id", value = { regex = '^\d+$' }, convert = "integer" }]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AttributeConfig {
    pub name: String,
    #[serde(default = "default_min")]
    pub min: i64,
    #[serde(default)]
    pub max: Option<i64>,
    /// Takes precedence over `max`
    #[serde(default)]
    pub unbounded: bool,
    #[serde(default)]
    pub key: Option<PatternConfig>,
    #[serde(default)]
    pub value: Option<PatternConfig>,
    #[serde(default)]
    pub array: bool,
    #[serde(default)]
    pub convert: Option<Converter>,
}

impl DefinitionNodeConfig {
    pub fn to_node(&self) -> Result<DefinitionNode, RouteError> {
        match self {
            DefinitionNodeConfig::Literal(literal) => Ok(DefinitionNode::Literal(literal.clone())),
            DefinitionNodeConfig::Attribute(attribute) => attribute.to_definition().map(DefinitionNode::Attribute),
        }
    }
}

impl AttributeConfig {
    pub fn to_definition(&self) -> Result<AttributeDefinition, RouteError> {
        let mut definition = AttributeDefinition::unvalued(self.name.as_str())
            .with_min(self.min)
            .with_array(self.array);

        definition.max = match (self.unbounded, self.max) {
            (true, _) => Some(Bound::Unbounded),
            (false, max) => max.map(Bound::Limited),
        };
        definition.key = self.key.as_ref().map(PatternConfig::to_source).transpose()?;
        definition.value = self.value.as_ref().map(PatternConfig::to_source).transpose()?;

        Ok(match self.convert {
            Some(converter) => definition.with_converter(converter),
            None => definition,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder_defaults() {
        let definition = AttributeDefinition::new("id", "x");

        assert_eq!(definition.name, AttributeKey::from("id"));
        assert_eq!(definition.min, 1);
        assert_eq!(definition.max, None);
        assert!(!definition.array);
        assert!(definition.key.is_none());
    }

    #[test]
    fn test_optional() {
        let definition = AttributeDefinition::new("page", "x").optional();
        assert_eq!(definition.min, 0);
        assert_eq!(definition.max, Some(Bound::Limited(1)));
    }

    #[test]
    fn test_nodes_from_toml() {
        #[derive(Deserialize)]
        struct Doc {
            definition: Vec<DefinitionNodeConfig>,
        }

        let doc: Doc = toml::from_str(
            r#"
            definition = [
                "product",
                { name = "id", value = { regex = '^\d+$' }, convert = "integer" },
                { name = "rest", min = 0, unbounded = true, value = { regex = '.' } },
            ]
            "#,
        )
        .unwrap();

        assert_eq!(doc.definition.len(), 3);
        assert_eq!(doc.definition[0], DefinitionNodeConfig::Literal("product".into()));

        let nodes: Vec<DefinitionNode> = doc
            .definition
            .iter()
            .map(DefinitionNodeConfig::to_node)
            .collect::<Result<_, _>>()
            .unwrap();

        match &nodes[1] {
            DefinitionNode::Attribute(id) => {
                assert_eq!(id.min, 1);
                assert!(id.to_value.is_some());
                assert!(id.to_path.is_some());
            }
            other => panic!("expected attribute, got {:?}", other),
        }
        match &nodes[2] {
            DefinitionNode::Attribute(rest) => {
                assert_eq!(rest.min, 0);
                assert_eq!(rest.max, Some(Bound::Unbounded));
            }
            other => panic!("expected attribute, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_value_survives_parsing() {
        let config = AttributeConfig {
            name: "id".into(),
            min: 1,
            max: None,
            unbounded: false,
            key: None,
            value: None,
            array: false,
            convert: None,
        };

        assert!(config.to_definition().unwrap().value.is_none());
    }
}
