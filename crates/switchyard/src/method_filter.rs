// File: src/method_filter.rs
// Purpose: Controller predicate on the HTTP method

use crate::controller::{Controller, Outcome};
use crate::request::Request;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use axum::http::Method;
use switchyard_router::AttributeMap;

/// Continues for the listed methods, rejects everything else
///
/// ```
/// use switchyard::MethodFilter;
/// use axum::http::Method;
///
/// let filter = MethodFilter::new(["get", "HEAD"]).unwrap();
/// assert!(filter.allows(&Method::GET));
/// assert!(!filter.allows(&Method::POST));
/// ```
#[derive(Debug, Clone)]
pub struct MethodFilter {
    methods: Vec<Method>,
}

impl MethodFilter {
    /// Method names are case-insensitive; empty or invalid tokens are errors
    pub fn new<I, S>(methods: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let methods = methods
            .into_iter()
            .map(|name| {
                let upper = name.as_ref().trim().to_ascii_uppercase();
                if upper.is_empty() {
                    bail!("HTTP method names must not be empty");
                }
                Method::from_bytes(upper.as_bytes())
                    .with_context(|| format!("Invalid HTTP method: {:?}", name.as_ref()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { methods })
    }

    pub fn allows(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }
}

#[async_trait]
impl Controller for MethodFilter {
    async fn call(&self, request: &mut Request, _attributes: &mut AttributeMap) -> Result<Outcome> {
        Ok(self.allows(request.method()).into())
    }
}
