//! Single-level path matcher
//!
//! A [`PathFilter`] is a compiled definition plus a [`RouteKind`], with no
//! parent. [`Route`](crate::Route) builds on it to add parent chaining.

use crate::attributes::AttributeMap;
use crate::compiler::{compile, CompiledRoute};
use crate::definition::DefinitionNode;
use crate::error::{GenerateError, RouteError};
use crate::path::{join_segments, remaining_path, split_segments};
use crate::pattern::PatternRegistry;
use serde::Deserialize;

/// Whether a match may leave segments unconsumed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    /// Matches a prefix; leftover segments become the remaining path
    Directory,
    /// Must consume every segment
    #[default]
    Exact,
}

/// Successful standalone match
#[derive(Debug, Clone, PartialEq)]
pub struct PathMatch {
    pub attributes: AttributeMap,
    /// `""` when everything was consumed, otherwise `/`-prefixed
    pub remaining: String,
}

/// Self-contained matcher over one definition
#[derive(Debug, Clone)]
pub struct PathFilter {
    kind: RouteKind,
    compiled: CompiledRoute,
}

impl PathFilter {
    pub fn new(kind: RouteKind, definition: &[DefinitionNode]) -> Result<Self, RouteError> {
        Self::with_registry(kind, definition, &PatternRegistry::new())
    }

    pub fn with_registry(
        kind: RouteKind,
        definition: &[DefinitionNode],
        registry: &PatternRegistry,
    ) -> Result<Self, RouteError> {
        Ok(Self {
            kind,
            compiled: compile(definition, registry)?,
        })
    }

    pub fn directory(definition: &[DefinitionNode]) -> Result<Self, RouteError> {
        Self::new(RouteKind::Directory, definition)
    }

    pub fn exact(definition: &[DefinitionNode]) -> Result<Self, RouteError> {
        Self::new(RouteKind::Exact, definition)
    }

    pub fn kind(&self) -> RouteKind {
        self.kind
    }

    pub fn compiled(&self) -> &CompiledRoute {
        &self.compiled
    }

    /// Match a whole path against this filter alone
    ///
    /// # Examples
    ///
    /// ```
    /// use switchyard_router::{AttributeDefinition, PathFilter, PatternSource};
    ///
    /// let filter = PathFilter::directory(&[
    ///     "files".into(),
    ///     AttributeDefinition::new("bucket", PatternSource::regex("^[a-z]+$").unwrap()).into(),
    /// ]).unwrap();
    ///
    /// let found = filter.match_path("/files/photos/2024/beach.jpg").unwrap();
    /// assert_eq!(found.attributes.get("bucket").and_then(|v| v.as_str()), Some("photos"));
    /// assert_eq!(found.remaining, "/2024/beach.jpg");
    /// ```
    pub fn match_path(&self, path: &str) -> Option<PathMatch> {
        let segments = split_segments(path);
        let mut attributes = AttributeMap::new();
        let end = self.match_from(&segments, 0, &mut attributes)?;

        Some(PathMatch {
            attributes,
            remaining: remaining_path(&segments[end..]),
        })
    }

    /// Match starting at `start`, returning the index after the match
    ///
    /// Exact filters need their whole definition and must reach the end of
    /// `segments`. Directory filters succeed on any matched prefix of their
    /// definition and leave trailing segments unconsumed.
    pub(crate) fn match_from(&self, segments: &[&str], start: usize, local: &mut AttributeMap) -> Option<usize> {
        let rest = &segments[start..];

        match self.kind {
            RouteKind::Exact => {
                let consumed = self.compiled.match_segments(rest, local)?;
                (consumed == rest.len()).then_some(start + consumed)
            }
            RouteKind::Directory => Some(start + self.compiled.match_prefix(rest, local)?),
        }
    }

    /// Render attributes into a path using this filter's definition only
    pub fn generate(&self, attributes: &AttributeMap) -> Result<String, GenerateError> {
        let mut out = Vec::new();
        self.compiled.render(attributes, &mut out)?;
        Ok(join_segments(&out))
    }
}
