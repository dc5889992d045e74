//! Segment patterns
//!
//! A pattern list tests one path segment at a time. Literal patterns match on
//! exact (case-sensitive) equality, regex patterns follow `regex` crate
//! semantics. Pattern sources may nest and may refer to named sets in a
//! [`PatternRegistry`]; both are flattened when a route is compiled.

use crate::error::RouteError;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;

/// Capture groups 1..n of a regex match (empty for literal matches)
pub type Captures = Vec<Option<String>>;

/// User-facing pattern description
#[derive(Debug, Clone)]
pub enum PatternSource {
    Literal(String),
    Regex(Regex),
    /// Nested list, flattened in order
    Group(Vec<PatternSource>),
    /// Reference to a named set in a [`PatternRegistry`]
    Set(String),
}

impl PatternSource {
    /// Compile a regex pattern source
    pub fn regex(pattern: &str) -> Result<Self, RouteError> {
        Regex::new(pattern)
            .map(PatternSource::Regex)
            .map_err(|e| RouteError::InvalidRegex {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn set(name: impl Into<String>) -> Self {
        PatternSource::Set(name.into())
    }
}

impl From<&str> for PatternSource {
    fn from(literal: &str) -> Self {
        PatternSource::Literal(literal.to_string())
    }
}

impl From<String> for PatternSource {
    fn from(literal: String) -> Self {
        PatternSource::Literal(literal)
    }
}

impl From<Regex> for PatternSource {
    fn from(regex: Regex) -> Self {
        PatternSource::Regex(regex)
    }
}

impl<T: Into<PatternSource>> From<Vec<T>> for PatternSource {
    fn from(items: Vec<T>) -> Self {
        PatternSource::Group(items.into_iter().map(Into::into).collect())
    }
}

/// Named pattern sets shared between route definitions
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    sets: HashMap<String, PatternSource>,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration
    pub fn with_set(mut self, name: impl Into<String>, source: impl Into<PatternSource>) -> Self {
        self.insert(name, source);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<PatternSource>) {
        self.sets.insert(name.into(), source.into());
    }

    pub fn get(&self, name: &str) -> Option<&PatternSource> {
        self.sets.get(name)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

#[derive(Debug, Clone)]
enum Pattern {
    Literal(String),
    Regex(Regex),
}

/// Flattened, ready-to-match pattern list
#[derive(Debug, Clone)]
pub struct PatternList {
    patterns: Vec<Pattern>,
}

impl PatternList {
    /// Flatten a source into a pattern list
    ///
    /// Fails when a named set is unknown, when sets refer to themselves
    /// (directly or through other sets) or when nothing is left after
    /// flattening.
    pub fn resolve(source: &PatternSource, registry: &PatternRegistry) -> Result<Self, RouteError> {
        let mut patterns = Vec::new();
        let mut visiting = Vec::new();
        flatten(source, registry, &mut visiting, &mut patterns)?;

        if patterns.is_empty() {
            return Err(RouteError::EmptyPatternList);
        }

        Ok(Self { patterns })
    }

    /// Match one segment, returning the captures of the first matching pattern
    ///
    /// `None` means no pattern matched. A literal match yields empty captures.
    ///
    /// # Examples
    ///
    /// ```
    /// use switchyard_router::{PatternList, PatternRegistry, PatternSource};
    ///
    /// let source = PatternSource::Group(vec![
    ///     "new".into(),
    ///     PatternSource::regex(r"^(\d+)$").unwrap(),
    /// ]);
    /// let list = PatternList::resolve(&source, &PatternRegistry::new()).unwrap();
    ///
    /// assert_eq!(list.match_value("new"), Some(vec![]));
    /// assert_eq!(list.match_value("42"), Some(vec![Some("42".to_string())]));
    /// assert_eq!(list.match_value("New"), None);
    /// ```
    pub fn match_value(&self, text: &str) -> Option<Captures> {
        self.patterns.iter().find_map(|pattern| match pattern {
            Pattern::Literal(literal) => (literal == text).then(Vec::new),
            Pattern::Regex(regex) => regex.captures(text).map(|caps| {
                caps.iter()
                    .skip(1)
                    .map(|group| group.map(|m| m.as_str().to_string()))
                    .collect()
            }),
        })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn flatten(
    source: &PatternSource,
    registry: &PatternRegistry,
    visiting: &mut Vec<String>,
    out: &mut Vec<Pattern>,
) -> Result<(), RouteError> {
    match source {
        PatternSource::Literal(literal) => out.push(Pattern::Literal(literal.clone())),
        PatternSource::Regex(regex) => out.push(Pattern::Regex(regex.clone())),
        PatternSource::Group(items) => {
            for item in items {
                flatten(item, registry, visiting, out)?;
            }
        }
        PatternSource::Set(name) => {
            if visiting.iter().any(|seen| seen == name) {
                return Err(RouteError::CircularReference(name.clone()));
            }
            let set = registry
                .get(name)
                .ok_or_else(|| RouteError::UnknownPatternSet(name.clone()))?;

            visiting.push(name.clone());
            flatten(set, registry, visiting, out)?;
            visiting.pop();
        }
    }

    Ok(())
}

// ============================================================================
// Configuration
// ============================================================================

/// Declarative pattern as written in a routes file
///
/// ```toml
/// value = "new"                      # literal
/// value = { regex = '^\d+$' }        # regex
/// value = { set = "slug" }           # named set
/// value = ["new", { regex = '^\d+$' }]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PatternConfig {
    Literal(String),
    Regex { regex: String },
    Set { set: String },
    List(Vec<PatternConfig>),
}

impl PatternConfig {
    /// Turn the declaration into a source, compiling regexes
    pub fn to_source(&self) -> Result<PatternSource, RouteError> {
        match self {
            PatternConfig::Literal(literal) => Ok(PatternSource::Literal(literal.clone())),
            PatternConfig::Regex { regex } => PatternSource::regex(regex),
            PatternConfig::Set { set } => Ok(PatternSource::Set(set.clone())),
            PatternConfig::List(items) => items
                .iter()
                .map(PatternConfig::to_source)
                .collect::<Result<Vec<_>, _>>()
                .map(PatternSource::Group),
        }
    }
}
