//! Routes with parent chaining
//!
//! A [`Route`] is a [`PathFilter`] with an optional parent. Matching and
//! generation run the parent first, so a child only sees (and only renders)
//! the part of the path after its parent's prefix.

use crate::attributes::AttributeMap;
use crate::compiler::render_chain;
use crate::definition::DefinitionNode;
use crate::error::{GenerateError, RouteError};
use crate::filter::{PathFilter, RouteKind};
use crate::path::{join_segments, remaining_path, split_segments};
use crate::pattern::PatternRegistry;
use std::sync::Arc;

// ============================================================================
// Route Implementation
// ============================================================================

/// Compiled route definition with an optional shared parent
///
/// Routes are immutable once built. Parents are shared through `Arc`, so many
/// children can hang off one prefix route.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use switchyard_router::{AttributeDefinition, AttributeMap, PatternSource, Route};
///
/// let admin = Arc::new(Route::directory(&["admin".into()]).unwrap());
/// let product = Route::exact(&[
///     "product".into(),
///     AttributeDefinition::new("id", PatternSource::regex(r"^\d+$").unwrap()).into(),
/// ])
/// .unwrap()
/// .with_parent(admin);
///
/// let mut attributes = AttributeMap::new();
/// assert_eq!(product.match_path("/admin/product/7", &mut attributes), Some(String::new()));
/// assert_eq!(attributes.get("id").and_then(|v| v.as_str()), Some("7"));
///
/// assert_eq!(product.generate(&attributes).unwrap(), "/admin/product/7");
/// ```
#[derive(Debug, Clone)]
pub struct Route {
    filter: PathFilter,
    parent: Option<Arc<Route>>,
    name: Option<String>,
}

impl Route {
    pub fn new(kind: RouteKind, definition: &[DefinitionNode]) -> Result<Self, RouteError> {
        Self::with_registry(kind, definition, &PatternRegistry::new())
    }

    /// Compile with named pattern sets available
    pub fn with_registry(
        kind: RouteKind,
        definition: &[DefinitionNode],
        registry: &PatternRegistry,
    ) -> Result<Self, RouteError> {
        Ok(Self::from_filter(PathFilter::with_registry(kind, definition, registry)?))
    }

    pub fn from_filter(filter: PathFilter) -> Self {
        Self {
            filter,
            parent: None,
            name: None,
        }
    }

    pub fn directory(definition: &[DefinitionNode]) -> Result<Self, RouteError> {
        Self::new(RouteKind::Directory, definition)
    }

    pub fn exact(definition: &[DefinitionNode]) -> Result<Self, RouteError> {
        Self::new(RouteKind::Exact, definition)
    }

    /// Builder: set parent route
    pub fn with_parent(mut self, parent: Arc<Route>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Builder: set route name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn kind(&self) -> RouteKind {
        self.filter.kind()
    }

    pub fn parent(&self) -> Option<&Arc<Route>> {
        self.parent.as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn filter(&self) -> &PathFilter {
        &self.filter
    }

    /// Match `path`, writing attributes into `attributes` on success
    ///
    /// Returns the remaining path: `""` when everything was consumed,
    /// otherwise a `/`-prefixed path (directory routes only). On failure
    /// `attributes` is left untouched.
    pub fn match_path(&self, path: &str, attributes: &mut AttributeMap) -> Option<String> {
        let segments = split_segments(path);
        let mut local = AttributeMap::new();

        let Some(end) = self.match_from(&segments, &mut local) else {
            tracing::debug!(route = self.name.as_deref().unwrap_or("<anonymous>"), path, "no match");
            return None;
        };

        attributes.merge(local);
        Some(remaining_path(&segments[end..]))
    }

    fn match_from(&self, segments: &[&str], local: &mut AttributeMap) -> Option<usize> {
        let start = match &self.parent {
            Some(parent) => parent.match_from(segments, local)?,
            None => 0,
        };

        self.filter.match_from(segments, start, local)
    }

    /// Render `attributes` back into a path, parent prefix first
    ///
    /// Fails without partial output if any attribute along the chain cannot
    /// be rendered. An empty result renders as `/`.
    pub fn generate(&self, attributes: &AttributeMap) -> Result<String, GenerateError> {
        let mut out = Vec::new();
        self.render_into(attributes, &mut out)?;
        Ok(join_segments(&out))
    }

    fn render_into(&self, attributes: &AttributeMap, out: &mut Vec<String>) -> Result<(), GenerateError> {
        let mut chain = vec![self.filter.compiled()];
        let mut current = self;
        while let Some(parent) = &current.parent {
            chain.push(parent.filter.compiled());
            current = &**parent;
        }
        chain.reverse();

        render_chain(&chain, attributes, out)
    }
}
