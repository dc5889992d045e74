// File: src/chain.rs
// Purpose: Sequential controller composition

use crate::controller::{Controller, Outcome, Transform, TransformOutcome};
use crate::request::Request;
use crate::response::Response;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use switchyard_router::AttributeMap;
use tracing::trace;

/// Controllers run in order over one shared attribute map
///
/// - `Respond` stops the forward pass
/// - `Continue` moves on to the next controller
/// - `Reject` ends the chain with no response; pending transforms never run
/// - `Transform` registers a post-processing step
///
/// Once a response exists, transforms are unwound most recent first. Any
/// transform may replace the response or reject it, which ends the chain with
/// no response.
#[derive(Clone, Default)]
pub struct ControllerChain {
    controllers: Vec<Arc<dyn Controller>>,
}

impl ControllerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append a controller
    pub fn with(mut self, controller: impl Controller + 'static) -> Self {
        self.push(controller);
        self
    }

    pub fn push(&mut self, controller: impl Controller + 'static) {
        self.controllers.push(Arc::new(controller));
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Top-level dispatch with a fresh attribute map
    pub async fn handle(&self, request: &mut Request) -> Result<Option<Response>> {
        let mut attributes = AttributeMap::new();
        self.dispatch(request, &mut attributes).await
    }

    /// Run the chain against a caller-provided attribute map
    pub async fn dispatch(&self, request: &mut Request, attributes: &mut AttributeMap) -> Result<Option<Response>> {
        let mut transforms: Vec<Transform> = Vec::new();
        let mut response = None;

        for (index, controller) in self.controllers.iter().enumerate() {
            match controller.call(request, attributes).await? {
                Outcome::Respond(r) => {
                    trace!(index, "chain controller responded");
                    response = Some(r);
                    break;
                }
                Outcome::Transform(t) => {
                    trace!(index, "chain controller registered a transform");
                    transforms.push(t);
                }
                Outcome::Continue => {}
                Outcome::Reject => {
                    trace!(index, "chain rejected");
                    return Ok(None);
                }
            }
        }

        let Some(mut response) = response else {
            return Ok(None);
        };

        while let Some(mut transform) = transforms.pop() {
            match transform.apply(&mut response).await? {
                TransformOutcome::Replace(replacement) => response = replacement,
                TransformOutcome::Keep => {}
                TransformOutcome::Reject => {
                    trace!(pending = transforms.len(), "chain transform rejected the response");
                    return Ok(None);
                }
            }
        }

        Ok(Some(response))
    }
}

#[async_trait]
impl Controller for ControllerChain {
    async fn call(&self, request: &mut Request, attributes: &mut AttributeMap) -> Result<Outcome> {
        Ok(self.dispatch(request, attributes).await?.into())
    }
}
