//! Error controller
//!
//! [`ErrorController`] turns a failed request into an error response. It
//! reads the status recorded by the framework, collects the error
//! attributes, and asks the [`ResolverChain`] for a view. When every
//! resolver declines, HTML clients get the default `error` view and
//! everything else gets the attributes as JSON.
//!
//! # Example
//!
//! ```rust,no_run
//! use meshestra_error::prelude::*;
//!
//! let controller = ErrorController::builder()
//!     .error_attributes(DefaultErrorAttributes)
//!     .resolver_with_order(0, TemplateErrorViewResolver::new(["error/404"]))
//!     .build()
//!     .expect("error controller configuration");
//!
//! let app: Router = Router::new()
//!     .route("/", get(|| async { StatusCode::NOT_FOUND }))
//!     .layer(ErrorPageLayer::new(controller.clone()))
//!     .merge(controller.into_router());
//! ```

use crate::attributes::{ErrorAttributes, Model};
use crate::config::{ErrorProperties, IncludeStacktrace};
use crate::error::{ErrorDispatchError, Result};
use crate::exception::{ExceptionFilter, FallbackExceptionFilter};
use crate::request::{ERROR_STATUS_CODE, WebRequest};
use crate::resolver::{ErrorViewResolver, ModelAndView, ResolverChain, ResolverRegistration};
use crate::view::{DEFAULT_ERROR_VIEW, ViewRenderer, WhitelabelViewRenderer};
use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::any,
};
use serde_json::Value;
use std::sync::Arc;

mod layer;

pub use layer::{ErrorPageLayer, ErrorPageMiddleware};

/// Query parameter requesting stack trace detail
pub const TRACE_PARAMETER: &str = "trace";

/// Dispatches failed requests to error views or JSON error bodies
#[derive(Clone)]
pub struct ErrorController {
    error_attributes: Arc<dyn ErrorAttributes>,
    resolvers: ResolverChain,
    properties: ErrorProperties,
    renderer: Option<Arc<dyn ViewRenderer>>,
    exception_filter: Arc<dyn ExceptionFilter>,
}

impl ErrorController {
    /// Create a controller from an attribute collector and an optional resolver list
    ///
    /// Fails when `error_attributes` is `None`.
    pub fn new(
        error_attributes: Option<Arc<dyn ErrorAttributes>>,
        resolvers: Option<Vec<ResolverRegistration>>,
    ) -> Result<Self> {
        ErrorControllerBuilder {
            error_attributes,
            resolvers,
            ..Default::default()
        }
        .build()
    }

    pub fn builder() -> ErrorControllerBuilder {
        ErrorControllerBuilder::new()
    }

    pub fn properties(&self) -> &ErrorProperties {
        &self.properties
    }

    pub fn resolvers(&self) -> &ResolverChain {
        &self.resolvers
    }

    /// Status recorded for the failed request
    ///
    /// A missing attribute, or one that is not an integer naming a known
    /// HTTP status, yields 500.
    pub fn status(&self, request: &Request<Body>) -> StatusCode {
        let Some(value) = WebRequest::new(request).attribute(ERROR_STATUS_CODE) else {
            return StatusCode::INTERNAL_SERVER_ERROR;
        };

        parse_status(value).unwrap_or_else(|| {
            tracing::warn!(status = %value, "Ignoring malformed error status attribute");
            StatusCode::INTERNAL_SERVER_ERROR
        })
    }

    /// Whether the `trace` query parameter asks for stack trace detail
    ///
    /// Any value other than a case-insensitive `false` counts as a request,
    /// including `0` and `no`.
    pub fn trace_parameter(&self, request: &Request<Body>) -> bool {
        match WebRequest::new(request).parameter(TRACE_PARAMETER) {
            Some(value) => value.to_lowercase() != "false",
            None => false,
        }
    }

    pub fn error_attributes(&self, request: &Request<Body>, include_stack_trace: bool) -> Model {
        self.error_attributes
            .error_attributes(WebRequest::new(request), include_stack_trace)
    }

    /// Ask the resolver chain for a view; `Ok(None)` means use the default representation
    pub fn resolve_error_view(
        &self,
        request: &Request<Body>,
        status: StatusCode,
        model: &Model,
    ) -> Result<Option<ModelAndView>> {
        self.resolvers.resolve(request, status, model)
    }

    pub fn include_stack_trace(&self, request: &Request<Body>) -> bool {
        match self.properties.include_stacktrace {
            IncludeStacktrace::Never => false,
            IncludeStacktrace::Always => true,
            IncludeStacktrace::OnTraceParam => self.trace_parameter(request),
        }
    }

    /// Render the error as an HTML page
    pub fn error_html(&self, request: &Request<Body>) -> Result<Response> {
        let status = self.status(request);
        let model = self.error_attributes(request, self.include_stack_trace(request));

        let view = match self.resolve_error_view(request, status, &model)? {
            Some(view) => view,
            None => ModelAndView::new(DEFAULT_ERROR_VIEW, model),
        };
        let page = self.render(&view)?;

        Ok((view.status.unwrap_or(status), page).into_response())
    }

    /// Render the error attributes as a JSON body
    pub fn error_json(&self, request: &Request<Body>) -> Response {
        let status = self.status(request);
        let body = self.error_attributes(request, self.include_stack_trace(request));

        (status, Json(body)).into_response()
    }

    /// Pick HTML or JSON from the `Accept` header
    pub fn handle(&self, request: &Request<Body>) -> Result<Response> {
        let accepts_html = WebRequest::new(request)
            .header(header::ACCEPT.as_str())
            .is_some_and(|accept| accept.contains("text/html"));

        if accepts_html {
            self.error_html(request)
        } else {
            Ok(self.error_json(request))
        }
    }

    /// Like [`handle`](Self::handle), with failures answered by the exception filter
    pub fn dispatch(&self, request: &Request<Body>) -> Response {
        self.handle(request)
            .unwrap_or_else(|e| self.exception_filter.catch(Box::new(e)))
    }

    /// Router serving this controller on the configured error path
    pub fn into_router(self) -> Router {
        let path = self.properties.path.clone();
        Router::new()
            .route(&path, any(handle_error))
            .with_state(Arc::new(self))
    }

    fn render(&self, view: &ModelAndView) -> Result<Html<String>> {
        if view.view_name == DEFAULT_ERROR_VIEW && self.properties.whitelabel_enabled {
            return WhitelabelViewRenderer.render(view);
        }

        match &self.renderer {
            Some(renderer) => renderer.render(view),
            None => Err(ErrorDispatchError::render(
                &view.view_name,
                "no view renderer configured",
            )),
        }
    }
}

async fn handle_error(
    State(controller): State<Arc<ErrorController>>,
    request: Request<Body>,
) -> Response {
    controller.dispatch(&request)
}

fn parse_status(value: &Value) -> Option<StatusCode> {
    let code = u16::try_from(value.as_u64()?).ok()?;
    let status = StatusCode::from_u16(code).ok()?;
    status.canonical_reason().map(|_| status)
}

/// Builder for [`ErrorController`]
#[derive(Default)]
pub struct ErrorControllerBuilder {
    error_attributes: Option<Arc<dyn ErrorAttributes>>,
    resolvers: Option<Vec<ResolverRegistration>>,
    properties: ErrorProperties,
    renderer: Option<Arc<dyn ViewRenderer>>,
    exception_filter: Option<Arc<dyn ExceptionFilter>>,
}

impl ErrorControllerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error_attributes<A: ErrorAttributes>(mut self, error_attributes: A) -> Self {
        self.error_attributes = Some(Arc::new(error_attributes));
        self
    }

    /// Replace the resolver list; `None` means no resolvers
    pub fn resolvers(mut self, resolvers: Option<Vec<ResolverRegistration>>) -> Self {
        self.resolvers = resolvers;
        self
    }

    /// Add a resolver without an explicit order
    pub fn resolver<R: ErrorViewResolver>(self, resolver: R) -> Self {
        self.registration(ResolverRegistration::new(resolver))
    }

    pub fn resolver_with_order<R: ErrorViewResolver>(self, order: i32, resolver: R) -> Self {
        self.registration(ResolverRegistration::with_order(order, resolver))
    }

    pub fn registration(mut self, registration: ResolverRegistration) -> Self {
        self.resolvers.get_or_insert_with(Vec::new).push(registration);
        self
    }

    pub fn properties(mut self, properties: ErrorProperties) -> Self {
        self.properties = properties;
        self
    }

    pub fn renderer<V: ViewRenderer>(mut self, renderer: V) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    pub fn exception_filter<F: ExceptionFilter>(mut self, filter: F) -> Self {
        self.exception_filter = Some(Arc::new(filter));
        self
    }

    /// Build the controller, sorting the resolver chain once
    pub fn build(self) -> Result<ErrorController> {
        let error_attributes = self
            .error_attributes
            .ok_or(ErrorDispatchError::MissingErrorAttributes)?;
        let resolvers = ResolverChain::new(self.resolvers);

        tracing::debug!(
            resolvers = resolvers.len(),
            path = %self.properties.path,
            "Built error controller"
        );

        Ok(ErrorController {
            error_attributes,
            resolvers,
            properties: self.properties,
            renderer: self.renderer,
            exception_filter: self
                .exception_filter
                .unwrap_or_else(|| Arc::new(FallbackExceptionFilter)),
        })
    }
}
