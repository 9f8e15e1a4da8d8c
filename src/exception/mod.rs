use axum::response::Response;
use std::error::Error;

mod fallback;

pub use fallback::FallbackExceptionFilter;

/// The ExceptionFilter trait
///
/// Filters handle errors raised while producing a response.
/// They must return a valid Response.
pub trait ExceptionFilter: Send + Sync + 'static {
    /// Catch an exception and return a response
    fn catch(&self, error: Box<dyn Error + Send + Sync>) -> Response;
}
