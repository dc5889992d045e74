use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Map, Value as JsonValue};
use switchyard::{AttributeMap, Controller, Outcome, Request, Response, StatusCode};

/// Responds with the matched route name and its named attributes as JSON
///
/// ```json
/// {"route": "product", "path": "/admin/product/7", "attributes": {"id": 7}}
/// ```
pub struct EchoController {
    route: String,
}

impl EchoController {
    pub fn new(route: impl Into<String>) -> Self {
        Self { route: route.into() }
    }
}

/// Named attributes of the whole scope chain; unique keys are internal and skipped
pub fn attributes_to_json(attributes: &AttributeMap) -> Result<JsonValue> {
    let mut object = Map::new();
    for (key, value) in attributes.flatten().iter() {
        if let Some(name) = key.as_name() {
            object.insert(name.to_string(), serde_json::to_value(value)?);
        }
    }
    Ok(JsonValue::Object(object))
}

#[async_trait]
impl Controller for EchoController {
    async fn call(&self, request: &mut Request, attributes: &mut AttributeMap) -> Result<Outcome> {
        let body = json!({
            "route": self.route,
            "path": request.path(),
            "attributes": attributes_to_json(attributes)?,
        });

        Ok(Outcome::Respond(Response::json(StatusCode::OK, &body)?))
    }
}
