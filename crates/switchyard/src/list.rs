// File: src/list.rs
// Purpose: Independent controller composition

use crate::controller::{Controller, Outcome, Transform, TransformOutcome};
use crate::request::Request;
use crate::response::Response;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use switchyard_router::AttributeMap;
use tracing::trace;

/// Controllers tried one after another, each in its own attribute scope
///
/// Every entry sees the incoming attributes through an inherited scope; what
/// an entry writes is invisible to the other entries and to the caller.
/// `Continue` and `Reject` both move on to the next entry. Transforms collect
/// across entries, and every candidate response is passed through all of the
/// transforms collected so far (most recent first). A transform rejecting a
/// candidate sends the list on to the next entry. The first candidate that
/// survives is the result.
#[derive(Clone, Default)]
pub struct ControllerList {
    controllers: Vec<Arc<dyn Controller>>,
}

impl ControllerList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append an entry
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
        self.dispatch(request, &AttributeMap::new()).await
    }

    /// Run the entries against a snapshot of `attributes`
    pub async fn dispatch(&self, request: &mut Request, attributes: &AttributeMap) -> Result<Option<Response>> {
        let snapshot = Arc::new(attributes.clone());
        let mut transforms: Vec<Transform> = Vec::new();

        for (index, controller) in self.controllers.iter().enumerate() {
            let mut scope = AttributeMap::inheriting(snapshot.clone());

            let mut response = match controller.call(request, &mut scope).await? {
                Outcome::Respond(r) => r,
                Outcome::Transform(t) => {
                    trace!(index, "list entry registered a transform");
                    transforms.push(t);
                    continue;
                }
                Outcome::Continue | Outcome::Reject => continue,
            };

            let mut survived = true;
            for transform in transforms.iter_mut().rev() {
                match transform.apply(&mut response).await? {
                    TransformOutcome::Replace(replacement) => response = replacement,
                    TransformOutcome::Keep => {}
                    TransformOutcome::Reject => {
                        survived = false;
                        break;
                    }
                }
            }

            if survived {
                trace!(index, "list entry responded");
                return Ok(Some(response));
            }
            trace!(index, "list candidate rejected by a transform");
        }

        Ok(None)
    }
}

#[async_trait]
impl Controller for ControllerList {
    async fn call(&self, request: &mut Request, attributes: &mut AttributeMap) -> Result<Outcome> {
        Ok(self.dispatch(request, attributes).await?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ControllerChain;
    use crate::controller::controller_fn;
    use axum::http::StatusCode;
    use pretty_assertions::assert_eq;

    fn respond(status: StatusCode) -> impl Controller {
        controller_fn(move |_, _| Ok(Outcome::Respond(Response::new(status))))
    }

    #[tokio::test]
    async fn test_first_response_wins() {
        let list = ControllerList::new()
            .with(controller_fn(|_, _| Ok(Outcome::Reject)))
            .with(controller_fn(|_, _| Ok(Outcome::Continue)))
            .with(respond(StatusCode::OK))
            .with(respond(StatusCode::ACCEPTED));

        let response = list.handle(&mut Request::get("/")).await.unwrap().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rejected_candidate_falls_through() {
        let list = ControllerList::new()
            .with(
                ControllerChain::new()
                    .with(controller_fn(|_, _| Ok(Outcome::transform(|_| Ok(TransformOutcome::Reject)))))
                    .with(respond(StatusCode::NOT_FOUND)),
            )
            .with(respond(StatusCode::OK));

        let response = list.handle(&mut Request::get("/")).await.unwrap().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_transforms_apply_to_later_entries() {
        let list = ControllerList::new()
            .with(controller_fn(|_, _| {
                Ok(Outcome::transform(|response| {
                    if response.status() == StatusCode::NOT_FOUND {
                        return Ok(TransformOutcome::Reject);
                    }
                    *response = response.clone().with_header("x-checked", "yes");
                    Ok(TransformOutcome::Keep)
                }))
            }))
            .with(respond(StatusCode::NOT_FOUND))
            .with(respond(StatusCode::OK));

        let response = list.handle(&mut Request::get("/")).await.unwrap().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("x-checked").unwrap(), "yes");
    }

    #[tokio::test]
    async fn test_last_rejected_candidate_is_none() {
        let list = ControllerList::new()
            .with(controller_fn(|_, _| Ok(Outcome::transform(|_| Ok(TransformOutcome::Reject)))))
            .with(respond(StatusCode::OK));

        assert!(list.handle(&mut Request::get("/")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_entries_get_isolated_scopes() {
        let list = ControllerList::new()
            .with(controller_fn(|_, attributes| {
                attributes.insert("user", "mallory");
                attributes.insert("lang", "xx");
                Ok(Outcome::Continue)
            }))
            .with(controller_fn(|_, attributes| {
                let user = attributes.get("user").map(|v| v.to_string());
                let lang = attributes.get("lang").map(|v| v.to_string()).unwrap_or_default();
                assert_eq!(user, None);
                Ok(Outcome::Respond(Response::text(StatusCode::OK, lang)))
            }));

        let mut request = Request::get("/");
        let mut attributes: AttributeMap = [("lang", "en")].into_iter().collect();
        let before = attributes.clone();

        let outcome = list.call(&mut request, &mut attributes).await.unwrap();

        match outcome {
            Outcome::Respond(response) => assert_eq!(response.body_str(), Some("en")),
            other => panic!("expected a response, got {:?}", other),
        }
        assert_eq!(attributes, before);
    }

    #[tokio::test]
    async fn test_errors_propagate() {
        let list = ControllerList::new()
            .with(controller_fn(|_, _| Err(anyhow::anyhow!("entry failed"))))
            .with(respond(StatusCode::OK));

        assert!(list.handle(&mut Request::get("/")).await.is_err());
    }
}
