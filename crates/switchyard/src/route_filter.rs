// File: src/route_filter.rs
// Purpose: Routes and path filters as controller predicates

use crate::controller::{Controller, Outcome};
use crate::request::Request;
use anyhow::Result;
use async_trait::async_trait;
use switchyard_router::{path_key, AttributeMap, AttributeValue, PathFilter, Route, RouteKind};

/// Path a predicate should match: the remaining path left by an enclosing
/// directory match, or the request path
fn target_path(request: &Request, attributes: &AttributeMap) -> String {
    match attributes.get(path_key()) {
        Some(AttributeValue::String(remaining)) => remaining.clone(),
        _ => request.path().to_string(),
    }
}

#[async_trait]
impl Controller for Route {
    async fn call(&self, request: &mut Request, attributes: &mut AttributeMap) -> Result<Outcome> {
        let path = target_path(request, attributes);

        let Some(remaining) = self.match_path(&path, attributes) else {
            return Ok(Outcome::Reject);
        };

        if self.kind() == RouteKind::Directory {
            attributes.insert(path_key().clone(), remaining);
        }
        Ok(Outcome::Continue)
    }
}

#[async_trait]
impl Controller for PathFilter {
    async fn call(&self, request: &mut Request, attributes: &mut AttributeMap) -> Result<Outcome> {
        let path = target_path(request, attributes);

        let Some(found) = self.match_path(&path) else {
            return Ok(Outcome::Reject);
        };

        attributes.merge(found.attributes);
        if self.kind() == RouteKind::Directory {
            attributes.insert(path_key().clone(), found.remaining);
        }
        Ok(Outcome::Continue)
    }
}
