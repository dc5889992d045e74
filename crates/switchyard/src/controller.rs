// File: src/controller.rs
// Purpose: Controller trait, controller outcomes and response transforms

use crate::request::Request;
use crate::response::Response;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use switchyard_router::AttributeMap;

// ============================================================================
// Outcomes
// ============================================================================

/// What a controller decided about a request
#[derive(Debug)]
pub enum Outcome {
    /// Handle the request with this response
    Respond(Response),
    /// Not handled here; let the next controller try
    Continue,
    /// Abort the enclosing chain
    Reject,
    /// Post-process whatever response the rest of the pipeline produces
    Transform(Transform),
}

impl Outcome {
    /// Wrap a transform closure
    pub fn transform<F>(f: F) -> Self
    where
        F: FnMut(&mut Response) -> Result<TransformOutcome> + Send + 'static,
    {
        Outcome::Transform(Transform::from_fn(f))
    }

    pub fn is_respond(&self) -> bool {
        matches!(self, Outcome::Respond(_))
    }
}

impl From<Response> for Outcome {
    fn from(response: Response) -> Self {
        Outcome::Respond(response)
    }
}

/// `true` continues, `false` rejects
impl From<bool> for Outcome {
    fn from(pass: bool) -> Self {
        if pass {
            Outcome::Continue
        } else {
            Outcome::Reject
        }
    }
}

/// Nested compositions report `Some` as a response and `None` as pass-through
impl From<Option<Response>> for Outcome {
    fn from(response: Option<Response>) -> Self {
        response.map_or(Outcome::Continue, Outcome::Respond)
    }
}

/// What a transform decided about a response
#[derive(Debug)]
pub enum TransformOutcome {
    /// Use this response instead
    Replace(Response),
    /// Keep the (possibly mutated) current response
    Keep,
    /// Drop the response altogether
    Reject,
}

impl From<Response> for TransformOutcome {
    fn from(response: Response) -> Self {
        TransformOutcome::Replace(response)
    }
}

impl From<bool> for TransformOutcome {
    fn from(keep: bool) -> Self {
        if keep {
            TransformOutcome::Keep
        } else {
            TransformOutcome::Reject
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// A unit of request handling
///
/// Controllers receive the request and the attribute map of the current
/// dispatch. They may read and write attributes; failures are propagated to
/// the caller as errors.
#[async_trait]
pub trait Controller: Send + Sync {
    async fn call(&self, request: &mut Request, attributes: &mut AttributeMap) -> Result<Outcome>;
}

#[async_trait]
impl<T: Controller + ?Sized> Controller for Arc<T> {
    async fn call(&self, request: &mut Request, attributes: &mut AttributeMap) -> Result<Outcome> {
        (**self).call(request, attributes).await
    }
}

#[async_trait]
impl<T: Controller + ?Sized> Controller for Box<T> {
    async fn call(&self, request: &mut Request, attributes: &mut AttributeMap) -> Result<Outcome> {
        (**self).call(request, attributes).await
    }
}

/// Post-processing step registered by a controller
///
/// Takes `&mut self` so a list can run the same transform against several
/// candidate responses.
#[async_trait]
pub trait ResponseTransform: Send {
    async fn transform(&mut self, response: &mut Response) -> Result<TransformOutcome>;
}

// ============================================================================
// Adapters
// ============================================================================

/// Boxed response transform carried by [`Outcome::Transform`]
pub struct Transform(Box<dyn ResponseTransform>);

impl Transform {
    pub fn new(transform: impl ResponseTransform + 'static) -> Self {
        Self(Box::new(transform))
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnMut(&mut Response) -> Result<TransformOutcome> + Send + 'static,
    {
        Self::new(FnTransform(f))
    }

    pub async fn apply(&mut self, response: &mut Response) -> Result<TransformOutcome> {
        self.0.transform(response).await
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transform(..)")
    }
}

struct FnTransform<F>(F);

#[async_trait]
impl<F> ResponseTransform for FnTransform<F>
where
    F: FnMut(&mut Response) -> Result<TransformOutcome> + Send,
{
    async fn transform(&mut self, response: &mut Response) -> Result<TransformOutcome> {
        (self.0)(response)
    }
}

/// Controller backed by a synchronous closure
pub struct FnController<F>(F);

/// Turn a closure into a [`Controller`]
///
/// ```
/// use switchyard::{controller_fn, Outcome, Response};
///
/// let hello = controller_fn(|_request, _attributes| Ok(Outcome::Respond(Response::ok())));
/// # let _ = hello;
/// ```
pub fn controller_fn<F>(f: F) -> FnController<F>
where
    F: Fn(&mut Request, &mut AttributeMap) -> Result<Outcome> + Send + Sync,
{
    FnController(f)
}

#[async_trait]
impl<F> Controller for FnController<F>
where
    F: Fn(&mut Request, &mut AttributeMap) -> Result<Outcome> + Send + Sync,
{
    async fn call(&self, request: &mut Request, attributes: &mut AttributeMap) -> Result<Outcome> {
        (self.0)(request, attributes)
    }
}
