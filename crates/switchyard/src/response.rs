// File: src/response.rs
// Purpose: Response boundary type produced by controllers

use anyhow::{Context, Result};
use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use serde::Serialize;

// -- Shared helpers --

fn header_pair(key: &str, value: &str) -> Option<(HeaderName, HeaderValue)> {
    match (
        HeaderName::from_bytes(key.as_bytes()),
        HeaderValue::from_str(value),
    ) {
        (Ok(name), Ok(val)) => Some((name, val)),
        _ => None,
    }
}

// ============================================================================
// Response
// ============================================================================

/// Response produced by a controller
///
/// The dispatch layer never looks inside; transforms may rewrite it freely.
/// Invalid header names or values passed to the builders are ignored.
///
/// ```
/// use switchyard::Response;
/// use axum::http::StatusCode;
///
/// let response = Response::text(StatusCode::OK, "hello").with_header("x-served-by", "switchyard");
/// assert_eq!(response.body_str(), Some("hello"));
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    trailers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// Empty response with the given status
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            trailers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// Plain text body with a UTF-8 content type
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status)
            .with_header(header::CONTENT_TYPE.as_str(), "text/plain; charset=utf-8")
            .with_body(body.into())
    }

    /// JSON body serialized with serde_json
    pub fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value).context("Failed to serialize response body")?;
        Ok(Self::new(status)
            .with_header(header::CONTENT_TYPE.as_str(), "application/json")
            .with_body(body))
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a header, replacing existing values
    pub fn with_header(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let Some((name, val)) = header_pair(key.as_ref(), value.as_ref()) {
            self.headers.insert(name, val);
        }
        self
    }

    /// Add a header value, keeping existing values
    pub fn add_header(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let Some((name, val)) = header_pair(key.as_ref(), value.as_ref()) {
            self.headers.append(name, val);
        }
        self
    }

    pub fn with_trailer(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let Some((name, val)) = header_pair(key.as_ref(), value.as_ref()) {
            self.trailers.insert(name, val);
        }
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn trailers(&self) -> &HeaderMap {
        &self.trailers
    }

    pub fn trailers_mut(&mut self) -> &mut HeaderMap {
        &mut self.trailers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as UTF-8, if it is valid UTF-8
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Copy headers and trailers from `source` onto `target`
    ///
    /// Values are appended, so multi-valued headers keep every value.
    pub fn transfer(source: &Response, target: &mut Response) {
        for (name, value) in source.headers.iter() {
            target.headers.append(name.clone(), value.clone());
        }
        for (name, value) in source.trailers.iter() {
            target.trailers.append(name.clone(), value.clone());
        }
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::ok()
    }
}

impl IntoResponse for Response {
    // Trailers need a streaming body and are not forwarded here
    fn into_response(self) -> axum::response::Response {
        (self.status, self.headers, Body::from(self.body)).into_response()
    }
}
