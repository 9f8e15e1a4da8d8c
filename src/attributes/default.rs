use crate::attributes::{ErrorAttributes, Model};
use crate::request::{ERROR_MESSAGE, ERROR_REQUEST_URI, ERROR_STATUS_CODE, WebRequest};
use axum::http::StatusCode;
use serde_json::Value;
use std::error::Error;

/// Status reported when the framework did not record one
const UNKNOWN_STATUS: u16 = 999;

/// The built-in error attribute collector
#[derive(Clone, Default)]
pub struct DefaultErrorAttributes;

impl ErrorAttributes for DefaultErrorAttributes {
    fn error_attributes(&self, request: WebRequest<'_>, include_stack_trace: bool) -> Model {
        let mut model = Model::new();
        model.insert(
            "timestamp".to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
        add_status(&mut model, request);
        add_error_details(&mut model, request, include_stack_trace);
        add_path(&mut model, request);
        model
    }
}

fn add_status(model: &mut Model, request: WebRequest<'_>) {
    let Some(status) = request.attribute(ERROR_STATUS_CODE) else {
        model.insert("status".to_string(), Value::from(UNKNOWN_STATUS));
        model.insert("error".to_string(), Value::from("None"));
        return;
    };

    model.insert("status".to_string(), status.clone());
    let reason = status
        .as_u64()
        .and_then(|code| u16::try_from(code).ok())
        .and_then(|code| StatusCode::from_u16(code).ok())
        .and_then(|code| code.canonical_reason());
    let error = match reason {
        Some(reason) => reason.to_string(),
        None => format!("Http Status {}", status),
    };
    model.insert("error".to_string(), Value::String(error));
}

fn add_error_details(model: &mut Model, request: WebRequest<'_>, include_stack_trace: bool) {
    let error = request.error();

    if let Some(error) = error {
        model.insert(
            "exception".to_string(),
            Value::from(error.type_name()),
        );
        if include_stack_trace {
            model.insert("trace".to_string(), Value::String(stack_trace(error.error())));
        }
    }

    let message = match request.attribute(ERROR_MESSAGE) {
        Some(Value::String(message)) if !message.is_empty() => message.clone(),
        _ => match error {
            Some(error) => error.error().to_string(),
            None => "No message available".to_string(),
        },
    };
    model.insert("message".to_string(), Value::String(message));
}

fn add_path(model: &mut Model, request: WebRequest<'_>) {
    let path = match request.attribute(ERROR_REQUEST_URI) {
        Some(Value::String(uri)) => uri.as_str(),
        _ => request.path(),
    };
    model.insert("path".to_string(), Value::from(path));
}

/// Render an error and its source chain, one cause per line
fn stack_trace(error: &(dyn Error + 'static)) -> String {
    let mut trace = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        trace.push_str("\nCaused by: ");
        trace.push_str(&cause.to_string());
        source = cause.source();
    }
    trace
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ErrorRequestExt;
    use axum::{body::Body, http::Request};
    use serde_json::json;

    #[derive(Debug, thiserror::Error)]
    #[error("query failed")]
    struct QueryError {
        #[source]
        source: std::io::Error,
    }

    fn request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[test]
    fn test_required_keys() {
        let req = request("/users/1").with_error_status(404);
        let model = DefaultErrorAttributes.error_attributes(WebRequest::new(&req), false);

        assert!(model.contains_key("timestamp"));
        assert_eq!(model["status"], json!(404));
        assert_eq!(model["error"], json!("Not Found"));
        assert_eq!(model["message"], json!("No message available"));
        assert_eq!(model["path"], json!("/users/1"));
        assert!(!model.contains_key("trace"));
        assert!(!model.contains_key("exception"));
    }

    #[test]
    fn test_missing_status() {
        let req = request("/");
        let model = DefaultErrorAttributes.error_attributes(WebRequest::new(&req), false);

        assert_eq!(model["status"], json!(999));
        assert_eq!(model["error"], json!("None"));
    }

    #[test]
    fn test_unknown_status_code() {
        let req = request("/").with_error_status(42);
        let model = DefaultErrorAttributes.error_attributes(WebRequest::new(&req), false);

        assert_eq!(model["status"], json!(42));
        assert_eq!(model["error"], json!("Http Status 42"));
    }

    #[test]
    fn test_trace_only_when_requested() {
        let req = request("/orders")
            .with_error_status(500)
            .with_error(QueryError {
                source: std::io::Error::other("connection reset"),
            });

        let without = DefaultErrorAttributes.error_attributes(WebRequest::new(&req), false);
        assert!(!without.contains_key("trace"));
        assert_eq!(without["message"], json!("query failed"));

        let with = DefaultErrorAttributes.error_attributes(WebRequest::new(&req), true);
        assert_eq!(
            with["trace"],
            json!("query failed\nCaused by: connection reset")
        );
        assert!(with["exception"].as_str().unwrap().ends_with("QueryError"));
    }

    #[test]
    fn test_message_and_uri_attributes_win() {
        let req = request("/error")
            .with_error_status(400)
            .with_error_attribute(ERROR_MESSAGE, "bad input")
            .with_error_attribute(ERROR_REQUEST_URI, "/forms/submit")
            .with_error(std::io::Error::other("ignored"));

        let model = DefaultErrorAttributes.error_attributes(WebRequest::new(&req), false);
        assert_eq!(model["message"], json!("bad input"));
        assert_eq!(model["path"], json!("/forms/submit"));
    }
}
