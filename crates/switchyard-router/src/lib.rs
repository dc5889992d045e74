//! # Switchyard Router
//!
//! Pattern-based path routing that turns request paths into structured
//! attributes and renders attributes back into paths:
//! - Literal segments (`admin`), matched exactly and case-sensitively
//! - Quantified attributes (`min`/`max` repetitions, optional, unbounded)
//! - Key/value attributes (`/id/42/name/x` → `{id: "42", name: "x"}`)
//! - Regex patterns with captures, nested pattern groups and named sets
//! - Parent routes shared through `Arc`, matched and rendered prefix first
//! - Declarative route tables loaded from TOML with reverse routing by name
//!
//! ## Matching Model
//!
//! - **Greedy, no backtracking**: each attribute takes as many repetitions as
//!   it can before the next segment is considered
//! - **Transactional**: a failed match never writes to the caller's map
//! - **Immutable**: compiled routes are `Send + Sync` and need no locking
//!
//! ## Example
//!
//! ```
//! use switchyard_router::{AttributeDefinition, AttributeMap, PatternSource, Route};
//!
//! let route = Route::exact(&[
//!     "users".into(),
//!     AttributeDefinition::new("id", PatternSource::regex(r"^\d+$").unwrap()).into(),
//! ])
//! .unwrap();
//!
//! let mut attributes = AttributeMap::new();
//! assert!(route.match_path("/users/123", &mut attributes).is_some());
//! assert_eq!(attributes.get("id").and_then(|v| v.as_str()), Some("123"));
//! assert_eq!(route.generate(&attributes).unwrap(), "/users/123");
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod attributes;
mod compiler;
mod convert;
mod definition;
mod error;
mod filter;
mod key;
pub mod path;
mod pattern;
mod route;
mod rule;
mod table;
mod value;

// ============================================================================
// Public API
// ============================================================================

pub use attributes::AttributeMap;
pub use compiler::{compile, CompiledRoute, Segment};
pub use convert::{Converter, ToPath, ToValue};
pub use definition::{AttributeConfig, AttributeDefinition, Bound, DefinitionNode, DefinitionNodeConfig};
pub use error::{GenerateError, RouteError};
pub use filter::{PathFilter, PathMatch, RouteKind};
pub use key::{path_key, AttributeKey, UniqueKey};
pub use pattern::{Captures, PatternConfig, PatternList, PatternRegistry, PatternSource};
pub use route::Route;
pub use rule::{AttributeRule, RuleMatch};
pub use table::{RouteConfig, RouteTable, RoutesConfig};
pub use value::AttributeValue;
