use crate::exception::ExceptionFilter;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::error::Error;

const FALLBACK_PAGE: &str = "<html><body><h1>500 Internal Server Error</h1>\
     <p>An error occurred while rendering the error page.</p></body></html>";

/// Last-resort filter for failures inside the error controller itself
///
/// Always answers with a fixed 500 page and never consults resolvers or
/// renderers again, so error handling cannot loop.
#[derive(Clone, Default)]
pub struct FallbackExceptionFilter;

impl ExceptionFilter for FallbackExceptionFilter {
    fn catch(&self, error: Box<dyn Error + Send + Sync>) -> Response {
        tracing::error!(error = %error, "Error dispatch failed, serving fallback page");

        (StatusCode::INTERNAL_SERVER_ERROR, Html(FALLBACK_PAGE)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorDispatchError;

    #[tokio::test]
    async fn test_fallback_page() {
        let error = ErrorDispatchError::render("error/404", "gone");
        let response = FallbackExceptionFilter.catch(Box::new(error));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&body).contains("500 Internal Server Error"));
    }
}
