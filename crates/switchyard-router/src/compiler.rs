//! Route definition compiler
//!
//! Validates a definition and resolves its pattern sources into a
//! [`CompiledRoute`]. Compiled routes are immutable and cheap to share.

use crate::attributes::AttributeMap;
use crate::definition::{AttributeDefinition, Bound, DefinitionNode};
use crate::error::{GenerateError, RouteError};
use crate::key::AttributeKey;
use crate::pattern::{PatternList, PatternRegistry};
use crate::rule::AttributeRule;
use crate::value::AttributeValue;

/// One compiled step of a route
#[derive(Debug, Clone)]
pub enum Segment {
    Literal(String),
    Attribute(AttributeRule),
}

/// Validated, pattern-resolved route definition
#[derive(Debug, Clone, Default)]
pub struct CompiledRoute {
    segments: Vec<Segment>,
}

impl CompiledRoute {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Walk the compiled segments over `segments`
    ///
    /// Matched attributes are appended to `local`. Returns how many segments
    /// were consumed, or `None` on the first literal or rule that fails.
    pub fn match_segments(&self, segments: &[&str], local: &mut AttributeMap) -> Option<usize> {
        self.walk(segments, local, false)
    }

    /// Like [`match_segments`](Self::match_segments), but running out of
    /// path before the definition ends is a success
    ///
    /// Definition steps after the end of the path are skipped, so their
    /// attributes are absent.
    pub fn match_prefix(&self, segments: &[&str], local: &mut AttributeMap) -> Option<usize> {
        self.walk(segments, local, true)
    }

    fn walk(&self, segments: &[&str], local: &mut AttributeMap, prefix: bool) -> Option<usize> {
        let mut position = 0;

        for segment in &self.segments {
            if prefix && position == segments.len() {
                break;
            }

            position = match segment {
                Segment::Literal(literal) => {
                    let current = segments.get(position)?;
                    (*current == literal.as_str()).then_some(position + 1)?
                }
                Segment::Attribute(rule) => {
                    let matched = rule.match_segments(&segments[position..])?;
                    if let Some(value) = matched.value {
                        local.append(rule.name().clone(), value);
                    }
                    position + matched.consumed
                }
            };
        }

        Some(position)
    }

    /// Render the compiled segments, appending to `out`
    pub fn render(&self, attributes: &AttributeMap, out: &mut Vec<String>) -> Result<(), GenerateError> {
        render_chain(&[self], attributes, out)
    }
}

/// Render a parent-first chain of compiled routes as one path
///
/// An attribute name used by several rules holds the values of all of them,
/// appended in match order. Each of those rules takes its own share of the
/// values: as many as it can, keeping enough for the `min` of the rules after
/// it. The last one takes the rest.
pub(crate) fn render_chain(
    chain: &[&CompiledRoute],
    attributes: &AttributeMap,
    out: &mut Vec<String>,
) -> Result<(), GenerateError> {
    let segments: Vec<&Segment> = chain.iter().flat_map(|route| route.segments.iter()).collect();
    let mut rendered = Vec::new();
    let mut taken: Vec<(&AttributeKey, usize)> = Vec::new();

    for (position, segment) in segments.iter().enumerate() {
        let rule = match segment {
            Segment::Literal(literal) => {
                rendered.push(literal.clone());
                continue;
            }
            Segment::Attribute(rule) => rule,
        };

        let value = attributes.get(rule.name());
        let later: Vec<&AttributeRule> = segments[position + 1..]
            .iter()
            .filter_map(|segment| match segment {
                Segment::Attribute(other) if other.name() == rule.name() => Some(other),
                _ => None,
            })
            .collect();
        let started = taken.iter().position(|(name, _)| *name == rule.name());

        let shared = started.is_some() || !later.is_empty();
        let Some(value) = value.filter(|_| shared) else {
            rule.render(value, &mut rendered)?;
            continue;
        };

        let index = started.unwrap_or_else(|| {
            taken.push((rule.name(), 0));
            taken.len() - 1
        });
        let items = shared_items(value);
        let start = taken[index].1.min(items.len());
        let reserved: usize = later.iter().map(|other| other.min()).sum();

        taken[index].1 += rule.render_share(&items[start..], reserved, later.is_empty(), &mut rendered)?;
    }

    out.extend(rendered);
    Ok(())
}

fn shared_items(value: &AttributeValue) -> Vec<&AttributeValue> {
    match value {
        AttributeValue::Array(items) => items.iter().collect(),
        single => vec![single],
    }
}

/// Compile a definition, resolving named pattern sets through `registry`
///
/// # Examples
///
/// ```
/// use switchyard_router::{compile, AttributeDefinition, DefinitionNode, PatternRegistry, PatternSource};
///
/// let definition = vec![
///     DefinitionNode::from("product"),
///     AttributeDefinition::new("id", PatternSource::regex(r"^\d+$").unwrap()).into(),
/// ];
/// let compiled = compile(&definition, &PatternRegistry::new()).unwrap();
/// assert_eq!(compiled.segments().len(), 2);
///
/// assert!(compile(&[DefinitionNode::from("")], &PatternRegistry::new()).is_err());
/// ```
pub fn compile(definition: &[DefinitionNode], registry: &PatternRegistry) -> Result<CompiledRoute, RouteError> {
    let segments = definition
        .iter()
        .map(|node| compile_node(node, registry))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(segments = segments.len(), "compiled route definition");

    Ok(CompiledRoute { segments })
}

fn compile_node(node: &DefinitionNode, registry: &PatternRegistry) -> Result<Segment, RouteError> {
    match node {
        DefinitionNode::Literal(literal) if literal.is_empty() => Err(RouteError::EmptyLiteral),
        DefinitionNode::Literal(literal) if literal.contains('/') => {
            Err(RouteError::SeparatorInLiteral(literal.clone()))
        }
        DefinitionNode::Literal(literal) => Ok(Segment::Literal(literal.clone())),
        DefinitionNode::Attribute(attribute) => compile_attribute(attribute, registry).map(Segment::Attribute),
    }
}

fn compile_attribute(attribute: &AttributeDefinition, registry: &PatternRegistry) -> Result<AttributeRule, RouteError> {
    if matches!(&attribute.name, AttributeKey::Name(name) if name.is_empty()) {
        return Err(RouteError::InvalidName);
    }
    let name = attribute.name.to_string();

    if attribute.min < 0 {
        return Err(RouteError::NegativeMin {
            name,
            min: attribute.min,
        });
    }

    let max = match attribute.max.unwrap_or(Bound::Limited(attribute.min)) {
        Bound::Limited(max) if max < attribute.min => {
            return Err(RouteError::MaxBelowMin {
                name,
                min: attribute.min,
                max,
            })
        }
        Bound::Limited(max) => Some(to_count(max)),
        Bound::Unbounded => None,
    };

    let value = attribute
        .value
        .as_ref()
        .ok_or_else(|| RouteError::MissingValuePattern(name.clone()))?;

    Ok(AttributeRule {
        name: attribute.name.clone(),
        min: to_count(attribute.min),
        max,
        key: attribute
            .key
            .as_ref()
            .map(|key| PatternList::resolve(key, registry))
            .transpose()?,
        value: PatternList::resolve(value, registry)?,
        array: attribute.array,
        to_value: attribute.to_value.clone(),
        to_path: attribute.to_path.clone(),
    })
}

// Only called on validated, non-negative counts
fn to_count(n: i64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}
