use crate::attributes::Model;
use crate::error::{ErrorDispatchError, Result};
use crate::resolver::ModelAndView;
use crate::view::{DEFAULT_ERROR_VIEW, ViewRenderer};
use axum::response::Html;
use maud::html;
use serde_json::Value;

/// Minimal built-in page for the default `error` view
#[derive(Clone, Default)]
pub struct WhitelabelViewRenderer;

impl ViewRenderer for WhitelabelViewRenderer {
    fn render(&self, view: &ModelAndView) -> Result<Html<String>> {
        if view.view_name != DEFAULT_ERROR_VIEW {
            return Err(ErrorDispatchError::render(
                &view.view_name,
                "the whitelabel page only renders the default error view",
            ));
        }

        let model = &view.model;
        let page = html! {
            html {
                body {
                    h1 { "Whitelabel Error Page" }
                    p {
                        "This application has no explicit error view, "
                        "so you are seeing this as a fallback."
                    }
                    div id="created" { (text(model, "timestamp")) }
                    div {
                        "There was an unexpected error (type=" (text(model, "error"))
                        ", status=" (text(model, "status")) ")."
                    }
                    div { (text(model, "message")) }
                    @if model.contains_key("trace") {
                        div style="white-space:pre-wrap;" { (text(model, "trace")) }
                    }
                }
            }
        };
        Ok(Html(page.into_string()))
    }
}

/// Plain text of a model entry; missing entries render empty
fn text(model: &Model, key: &str) -> String {
    match model.get(key) {
        Some(Value::String(value)) => value.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
