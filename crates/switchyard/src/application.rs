// File: src/application.rs
// Purpose: Top-level dispatch from request to response

use crate::config::AppConfig;
use crate::controller::{Controller, Outcome};
use crate::request::Request;
use crate::response::Response;
use anyhow::{Context, Result};
use axum::http::StatusCode;
use std::sync::Arc;
use std::time::Instant;
use switchyard_router::AttributeMap;
use tracing::{error, info};

/// Runs one composed controller per request
///
/// Unhandled requests get the configured fallback status; controller failures
/// are logged and answered with `500`.
#[derive(Clone)]
pub struct Application {
    controller: Arc<dyn Controller>,
    fallback: StatusCode,
}

impl Application {
    pub fn new(controller: impl Controller + 'static, config: &AppConfig) -> Result<Self> {
        let fallback = StatusCode::from_u16(config.fallback_status)
            .with_context(|| format!("Invalid fallback status: {}", config.fallback_status))?;

        Ok(Self {
            controller: Arc::new(controller),
            fallback,
        })
    }

    pub fn fallback_status(&self) -> StatusCode {
        self.fallback
    }

    /// Dispatch `request` with a fresh attribute map
    pub async fn handle(&self, mut request: Request) -> Response {
        let started = Instant::now();
        let mut attributes = AttributeMap::new();

        let response = match self.controller.call(&mut request, &mut attributes).await {
            Ok(Outcome::Respond(response)) => response,
            Ok(Outcome::Continue | Outcome::Reject | Outcome::Transform(_)) => self.unhandled(),
            Err(e) => {
                error!(method = %request.method(), path = request.path(), error = ?e, "controller failed");
                Response::text(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        };

        info!(
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            remote = %request.remote_address(),
            method = %request.method(),
            path = request.path(),
            status = response.status().as_u16(),
            "request"
        );

        response
    }

    fn unhandled(&self) -> Response {
        let reason = self.fallback.canonical_reason().unwrap_or("Unhandled");
        Response::text(self.fallback, reason)
    }
}
