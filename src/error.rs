use thiserror::Error;

pub type Result<T> = std::result::Result<T, ErrorDispatchError>;

/// A type-erased failure raised by an error-view resolver or a view renderer
pub type ResolverError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ErrorDispatchError {
    #[error("ErrorAttributes must not be null")]
    MissingErrorAttributes,

    #[error("Error view resolver failed: {0}")]
    Resolver(#[source] ResolverError),

    #[error("Failed to render view '{view}': {message}")]
    Render { view: String, message: String },

    #[error("Invalid configuration for {key}: {message}")]
    Config { key: String, message: String },
}

impl ErrorDispatchError {
    /// Create a render failure error
    pub fn render(view: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Render {
            view: view.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for ErrorDispatchError {
    fn into_response(self) -> axum::response::Response {
        (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            self.to_string(),
        )
            .into_response()
    }
}
