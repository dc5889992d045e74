// Switchyard - request dispatch for HTTP servers
// Route predicates, controller chains and controller lists over switchyard-router

pub mod controller;
pub mod chain;
pub mod list;

// Predicates
pub mod method_filter;
mod route_filter;

// Boundary types
pub mod request;
pub mod response;

// Application
pub mod application;
pub mod config;

// Re-export core types
pub use controller::{
    controller_fn,
    Controller, FnController,
    Outcome, ResponseTransform, Transform, TransformOutcome,
};
pub use chain::ControllerChain;
pub use list::ControllerList;
pub use method_filter::MethodFilter;
pub use request::Request;
pub use response::Response;
pub use application::Application;
pub use config::{AppConfig, Config, LoggingConfig, ServerConfig};

// Re-export the routing engine
pub use switchyard_router as router;
pub use switchyard_router::{
    path_key, AttributeDefinition, AttributeKey, AttributeMap, AttributeValue,
    DefinitionNode, PathFilter, PatternSource, Route, RouteKind, RouteTable,
};

// Re-export commonly used types from dependencies
pub use axum::http::{Method, StatusCode};
