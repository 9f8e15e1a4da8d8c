//! # Meshestra Error
//!
//! Error-response dispatch for Meshestra web applications.
//!
//! When a request fails, the framework records the status (and optionally
//! the error) on the request and forwards it to the [`ErrorController`].
//! The controller collects diagnostic attributes, then walks an ordered
//! chain of [`ErrorViewResolver`]s. The first resolver that produces a
//! view wins; if they all decline, HTML clients get the default `error`
//! page and everyone else gets a JSON body.
//!
//! ## Features
//!
//! - **Ordered resolver chain**: resolvers carry an explicit order, sorted once at startup
//! - **Template lookup**: `error/404` then `error/4xx` via [`TemplateErrorViewResolver`]
//! - **Whitelabel page**: a minimal built-in HTML page for the default view
//! - **Tower integration**: [`ErrorPageLayer`] turns bare error statuses into error pages
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use meshestra_error::prelude::*;
//!
//! #[tokio::main]
//! async fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     let properties = ErrorProperties::from_config(&ConfigService::new())
//!         .expect("invalid error configuration");
//!
//!     let controller = ErrorController::builder()
//!         .error_attributes(DefaultErrorAttributes)
//!         .resolver_with_order(10, TemplateErrorViewResolver::new(["error/404", "error/5xx"]))
//!         .properties(properties)
//!         .build()
//!         .expect("failed to build error controller");
//!
//!     let app: Router = Router::new()
//!         .route("/users/{id}", get(|| async { StatusCode::NOT_FOUND }))
//!         .layer(ErrorPageLayer::new(controller.clone()))
//!         .merge(controller.into_router());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod attributes;
pub mod config;
pub mod controller;
pub mod error;
pub mod exception;
pub mod request;
pub mod resolver;
pub mod view;

// Re-export core types
pub use attributes::{DefaultErrorAttributes, ErrorAttributes, Model};
pub use config::{ConfigService, ErrorProperties, IncludeStacktrace};
pub use controller::{ErrorController, ErrorControllerBuilder, ErrorPageLayer};
pub use error::{ErrorDispatchError, ResolverError, Result};
pub use request::{ErrorRequestExt, RequestAttributes, RequestError, WebRequest};
pub use resolver::{
    ErrorViewResolver, ModelAndView, ResolverChain, ResolverRegistration,
    TemplateErrorViewResolver,
};
pub use view::{ViewRenderer, WhitelabelViewRenderer};

// Re-export commonly used types from dependencies
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use meshestra_error::prelude::*;
/// ```
pub mod prelude {
    pub use crate::attributes::{DefaultErrorAttributes, ErrorAttributes, Model};
    pub use crate::config::{ConfigService, ErrorProperties, IncludeStacktrace};
    pub use crate::controller::{ErrorController, ErrorControllerBuilder, ErrorPageLayer};
    pub use crate::error::{ErrorDispatchError, ResolverError, Result};
    pub use crate::exception::{ExceptionFilter, FallbackExceptionFilter};
    pub use crate::request::{
        ERROR_MESSAGE, ERROR_REQUEST_URI, ERROR_STATUS_CODE, ErrorRequestExt, WebRequest,
    };
    pub use crate::resolver::{
        ErrorViewResolver, ModelAndView, ResolverChain, ResolverRegistration,
        TemplateErrorViewResolver,
    };
    pub use crate::view::{DEFAULT_ERROR_VIEW, ViewRenderer, WhitelabelViewRenderer};
    pub use axum::{
        Json, Router,
        body::Body,
        http::{Request, StatusCode},
        response::{Html, IntoResponse, Response},
        routing::get,
    };
    pub use std::sync::Arc;
}
