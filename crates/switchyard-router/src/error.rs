//! Error types for route construction and path generation
//!
//! Construction errors are raised once, when a definition is compiled or a
//! route table is assembled. Matching never errors: a path that does not fit
//! a route is simply `None`.

use thiserror::Error;

/// Structural problems detected while compiling route definitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("literal segments must not be empty")]
    EmptyLiteral,

    #[error("literal segment `{0}` contains the path separator")]
    SeparatorInLiteral(String),

    #[error("attribute names must not be empty")]
    InvalidName,

    #[error("attribute `{name}` has a negative minimum ({min})")]
    NegativeMin { name: String, min: i64 },

    #[error("attribute `{name}` has a maximum ({max}) below its minimum ({min})")]
    MaxBelowMin { name: String, min: i64, max: i64 },

    #[error("attribute `{0}` has no value pattern")]
    MissingValuePattern(String),

    #[error("pattern list is empty")]
    EmptyPatternList,

    #[error("pattern set `{0}` refers to itself")]
    CircularReference(String),

    #[error("unknown pattern set `{0}`")]
    UnknownPatternSet(String),

    #[error("invalid regex `{pattern}`: {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("route `{route}` names unknown parent `{parent}`")]
    UnknownParent { route: String, parent: String },

    #[error("route `{0}` is its own ancestor")]
    CircularParent(String),

    #[error("route `{0}` is declared more than once")]
    DuplicateRoute(String),
}

/// Failure to render attributes back into a path
///
/// Generation is all-or-nothing: when any attribute cannot be rendered no
/// partial path is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("cannot generate path: missing attribute `{0}`")]
    MissingAttribute(String),

    #[error("cannot generate path: attribute `{name}` has {count} repetition(s), expected {expected}")]
    Quantity {
        name: String,
        count: usize,
        expected: String,
    },

    #[error("cannot generate path: attribute `{0}` expects an object of key/value pairs")]
    ExpectedObject(String),

    #[error("cannot generate path: a value of `{0}` cannot be rendered as a segment")]
    NotRenderable(String),

    #[error("cannot generate path: attribute `{0}` rendered an empty segment")]
    EmptySegment(String),

    #[error("cannot generate path: attribute `{0}` rendered a segment containing '/'")]
    SeparatorInSegment(String),

    #[error("cannot generate path: converter for `{name}` failed: {reason}")]
    Converter { name: String, reason: String },

    #[error("cannot generate path: unknown route `{0}`")]
    UnknownRoute(String),
}
