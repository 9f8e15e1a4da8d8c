use crate::attributes::Model;
use crate::error::ResolverError;
use axum::{body::Body, http::Request, http::StatusCode};
use serde::Serialize;
use std::sync::Arc;

mod chain;
mod template;

pub use chain::ResolverChain;
pub use template::TemplateErrorViewResolver;

/// Order value of a resolver registered without one
pub const LOWEST_PRECEDENCE: i32 = i32::MAX;
pub const HIGHEST_PRECEDENCE: i32 = i32::MIN;

/// A view name and the model it should be rendered with
///
/// Serializes as `{ "view_name": ..., "model": {...} }` for template engines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelAndView {
    pub view_name: String,
    pub model: Model,
    /// Overrides the response status when set
    #[serde(skip)]
    pub status: Option<StatusCode>,
}

impl ModelAndView {
    pub fn new(view_name: impl Into<String>, model: Model) -> Self {
        Self {
            view_name: view_name.into(),
            model,
            status: None,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }
}

/// Resolves the view that renders a given error status
///
/// Return `Ok(None)` to decline and let the next resolver try. An `Err` is
/// not swallowed: it aborts the resolution and reaches the caller.
///
/// Closures with the matching signature implement this trait.
pub trait ErrorViewResolver: Send + Sync + 'static {
    fn resolve_error_view(
        &self,
        request: &Request<Body>,
        status: StatusCode,
        model: &Model,
    ) -> Result<Option<ModelAndView>, ResolverError>;
}

impl<F> ErrorViewResolver for F
where
    F: Fn(&Request<Body>, StatusCode, &Model) -> Result<Option<ModelAndView>, ResolverError>
        + Send
        + Sync
        + 'static,
{
    fn resolve_error_view(
        &self,
        request: &Request<Body>,
        status: StatusCode,
        model: &Model,
    ) -> Result<Option<ModelAndView>, ResolverError> {
        self(request, status, model)
    }
}

/// A resolver together with its declared order
#[derive(Clone)]
pub struct ResolverRegistration {
    resolver: Arc<dyn ErrorViewResolver>,
    order: Option<i32>,
}

impl ResolverRegistration {
    /// Register a resolver without an explicit order; it sorts after ordered ones
    pub fn new<R: ErrorViewResolver>(resolver: R) -> Self {
        Self {
            resolver: Arc::new(resolver),
            order: None,
        }
    }

    /// Register a resolver with an order; lower values are consulted first
    pub fn with_order<R: ErrorViewResolver>(order: i32, resolver: R) -> Self {
        Self {
            resolver: Arc::new(resolver),
            order: Some(order),
        }
    }

    /// Effective order used for sorting
    pub fn order(&self) -> i32 {
        self.order.unwrap_or(LOWEST_PRECEDENCE)
    }

    pub fn resolver(&self) -> &dyn ErrorViewResolver {
        self.resolver.as_ref()
    }
}

impl std::fmt::Debug for ResolverRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverRegistration")
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}
