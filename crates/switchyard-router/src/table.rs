//! Declarative route tables
//!
//! A [`RoutesConfig`] names pattern sets and routes. [`RouteTable::from_config`]
//! compiles them, resolving parents by name, and offers reverse routing with
//! [`RouteTable::generate`].

use crate::attributes::AttributeMap;
use crate::definition::{DefinitionNode, DefinitionNodeConfig};
use crate::error::{GenerateError, RouteError};
use crate::filter::RouteKind;
use crate::pattern::{PatternConfig, PatternRegistry};
use crate::route::Route;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// `[routing]` section of a configuration file
///
/// ```toml
/// [routing.patterns]
/// id = { regex = '^\d+$' }
///
/// [[routing.routes]]
/// name = "admin"
/// kind = "directory"
/// definition = ["admin"]
///
/// [[routing.routes]]
/// name = "product"
/// parent = "admin"
/// definition = ["product", { name = "id", value = { set = "id" } }]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RoutesConfig {
    #[serde(default)]
    pub patterns: BTreeMap<String, PatternConfig>,
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteConfig {
    pub name: String,
    #[serde(default)]
    pub kind: RouteKind,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub definition: Vec<DefinitionNodeConfig>,
}

/// Named, compiled routes in declaration order
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Arc<Route>>,
    index: HashMap<String, usize>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every route of `config`
    ///
    /// Parents are compiled before their children regardless of declaration
    /// order. Unknown parents, parent cycles and duplicate names are errors.
    pub fn from_config(config: &RoutesConfig) -> Result<Self, RouteError> {
        let mut registry = PatternRegistry::new();
        for (name, pattern) in &config.patterns {
            registry.insert(name.as_str(), pattern.to_source()?);
        }

        let mut declared: HashMap<&str, &RouteConfig> = HashMap::new();
        for route in &config.routes {
            if declared.insert(route.name.as_str(), route).is_some() {
                return Err(RouteError::DuplicateRoute(route.name.clone()));
            }
        }

        let mut builder = TableBuilder {
            declared,
            registry: &registry,
            compiled: HashMap::new(),
            visiting: Vec::new(),
        };
        for route in &config.routes {
            builder.build(&route.name)?;
        }

        let mut compiled = builder.compiled;
        let mut table = RouteTable::new();
        for route in &config.routes {
            if let Some(built) = compiled.remove(route.name.as_str()) {
                table.insert(built)?;
            }
        }

        tracing::debug!(routes = table.len(), patterns = registry.len(), "built route table");
        Ok(table)
    }

    /// Add a named route
    pub fn insert(&mut self, route: Arc<Route>) -> Result<(), RouteError> {
        let name = route.name().unwrap_or_default().to_string();
        if self.index.contains_key(&name) {
            return Err(RouteError::DuplicateRoute(name));
        }

        self.index.insert(name, self.routes.len());
        self.routes.push(route);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Route>> {
        self.index.get(name).map(|&i| &self.routes[i])
    }

    /// Routes in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Reverse routing by name
    ///
    /// # Examples
    ///
    /// ```
    /// use switchyard_router::{AttributeMap, RouteTable, RoutesConfig};
    ///
    /// let config: RoutesConfig = toml::from_str(r#"
    ///     [[routes]]
    ///     name = "user"
    ///     definition = ["users", { name = "id", value = { regex = '^\d+$' } }]
    /// "#).unwrap();
    /// let table = RouteTable::from_config(&config).unwrap();
    ///
    /// let attributes: AttributeMap = [("id", "42")].into_iter().collect();
    /// assert_eq!(table.generate("user", &attributes).unwrap(), "/users/42");
    /// ```
    pub fn generate(&self, name: &str, attributes: &AttributeMap) -> Result<String, GenerateError> {
        self.get(name)
            .ok_or_else(|| GenerateError::UnknownRoute(name.to_string()))?
            .generate(attributes)
    }
}

struct TableBuilder<'a> {
    declared: HashMap<&'a str, &'a RouteConfig>,
    registry: &'a PatternRegistry,
    compiled: HashMap<&'a str, Arc<Route>>,
    visiting: Vec<&'a str>,
}

impl<'a> TableBuilder<'a> {
    fn build(&mut self, name: &'a str) -> Result<Arc<Route>, RouteError> {
        if let Some(route) = self.compiled.get(name) {
            return Ok(route.clone());
        }
        if self.visiting.contains(&name) {
            return Err(RouteError::CircularParent(name.to_string()));
        }

        let config = self.declared[name];
        self.visiting.push(name);

        let parent = match &config.parent {
            Some(parent) if !self.declared.contains_key(parent.as_str()) => {
                return Err(RouteError::UnknownParent {
                    route: name.to_string(),
                    parent: parent.clone(),
                })
            }
            Some(parent) => Some(self.build(parent.as_str())?),
            None => None,
        };

        let definition = config
            .definition
            .iter()
            .map(DefinitionNodeConfig::to_node)
            .collect::<Result<Vec<DefinitionNode>, _>>()?;

        let mut route = Route::with_registry(config.kind, &definition, self.registry)?.with_name(name);
        if let Some(parent) = parent {
            route = route.with_parent(parent);
        }

        self.visiting.pop();
        let route = Arc::new(route);
        self.compiled.insert(name, route.clone());
        Ok(route)
    }
}
