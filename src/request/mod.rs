//! Read-only view over a failed request
//!
//! The host framework records what went wrong on the request before it is
//! forwarded to the error controller: a [`RequestAttributes`] map in the
//! request extensions and, optionally, the [`RequestError`] itself.

use axum::{body::Body, extract::Query, http::Request};
use serde_json::{Map, Value};
use std::error::Error;
use std::sync::Arc;

/// Attribute holding the status code of the failed request
pub const ERROR_STATUS_CODE: &str = "meshestra.error.status_code";
/// Attribute holding an explicit error message
pub const ERROR_MESSAGE: &str = "meshestra.error.message";
/// Attribute holding the URI of the request that failed
pub const ERROR_REQUEST_URI: &str = "meshestra.error.request_uri";

/// Named request attributes, stored in the request extensions
#[derive(Debug, Clone, Default)]
pub struct RequestAttributes(Map<String, Value>);

impl RequestAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }
}

/// The failure that caused the request to be forwarded to the error path
#[derive(Debug, Clone)]
pub struct RequestError {
    error: Arc<dyn Error + Send + Sync>,
    type_name: &'static str,
}

impl RequestError {
    pub fn new<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            error: Arc::new(error),
            type_name: std::any::type_name::<E>(),
        }
    }

    pub fn error(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.error.as_ref()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// Adapter exposing attribute, parameter and header lookup over a request
#[derive(Clone, Copy)]
pub struct WebRequest<'a> {
    request: &'a Request<Body>,
}

impl<'a> WebRequest<'a> {
    pub fn new(request: &'a Request<Body>) -> Self {
        Self { request }
    }

    /// Look up a request attribute
    pub fn attribute(&self, name: &str) -> Option<&'a Value> {
        self.request
            .extensions()
            .get::<RequestAttributes>()
            .and_then(|attributes| attributes.get(name))
    }

    /// First value of a query parameter
    pub fn parameter(&self, name: &str) -> Option<String> {
        let Ok(Query(pairs)) = Query::<Vec<(String, String)>>::try_from_uri(self.request.uri())
        else {
            return None;
        };
        pairs
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn header(&self, name: &str) -> Option<&'a str> {
        self.request
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
    }

    pub fn error(&self) -> Option<&'a RequestError> {
        self.request.extensions().get::<RequestError>()
    }

    pub fn path(&self) -> &'a str {
        self.request.uri().path()
    }
}

/// Populate a request the way the framework does before forwarding it to the error path
pub trait ErrorRequestExt: Sized {
    fn with_error_attribute(self, name: &str, value: impl Into<Value>) -> Self;

    fn with_error<E>(self, error: E) -> Self
    where
        E: Error + Send + Sync + 'static;

    fn with_error_status(self, status: impl Into<Value>) -> Self {
        self.with_error_attribute(ERROR_STATUS_CODE, status)
    }
}

impl ErrorRequestExt for Request<Body> {
    fn with_error_attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        let extensions = self.extensions_mut();
        match extensions.get_mut::<RequestAttributes>() {
            Some(attributes) => attributes.insert(name, value),
            None => {
                let mut attributes = RequestAttributes::new();
                attributes.insert(name, value);
                extensions.insert(attributes);
            }
        }
        self
    }

    fn with_error<E>(mut self, error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.extensions_mut().insert(RequestError::new(error));
        self
    }
}
