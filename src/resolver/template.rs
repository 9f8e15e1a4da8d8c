use crate::attributes::Model;
use crate::error::ResolverError;
use crate::resolver::{ErrorViewResolver, ModelAndView};
use axum::{body::Body, http::Request, http::StatusCode};
use std::collections::HashSet;

/// Resolves `error/<code>` or `error/<series>xx` among known template names
///
/// With templates `error/404` and `error/5xx`, a 404 renders `error/404`,
/// a 503 renders `error/5xx` and a 400 is declined.
#[derive(Debug, Clone, Default)]
pub struct TemplateErrorViewResolver {
    templates: HashSet<String>,
}

impl TemplateErrorViewResolver {
    pub fn new<I, S>(templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            templates: templates.into_iter().map(Into::into).collect(),
        }
    }

    fn lookup(&self, view_name: String, model: &Model) -> Option<ModelAndView> {
        self.templates
            .contains(&view_name)
            .then(|| ModelAndView::new(view_name, model.clone()))
    }
}

impl ErrorViewResolver for TemplateErrorViewResolver {
    fn resolve_error_view(
        &self,
        _request: &Request<Body>,
        status: StatusCode,
        model: &Model,
    ) -> Result<Option<ModelAndView>, ResolverError> {
        let exact = self.lookup(format!("error/{}", status.as_u16()), model);
        if exact.is_some() {
            return Ok(exact);
        }

        let series = if status.is_client_error() {
            Some("4xx")
        } else if status.is_server_error() {
            Some("5xx")
        } else {
            None
        };
        Ok(series.and_then(|series| self.lookup(format!("error/{}", series), model)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(resolver: &TemplateErrorViewResolver, status: StatusCode) -> Option<String> {
        let request = Request::builder().body(Body::empty()).unwrap();
        resolver
            .resolve_error_view(&request, status, &Model::new())
            .unwrap()
            .map(|view| view.view_name)
    }

    #[test]
    fn test_exact_code_before_series() {
        let resolver = TemplateErrorViewResolver::new(["error/404", "error/4xx", "error/5xx"]);

        assert_eq!(resolve(&resolver, StatusCode::NOT_FOUND).as_deref(), Some("error/404"));
        assert_eq!(resolve(&resolver, StatusCode::CONFLICT).as_deref(), Some("error/4xx"));
        assert_eq!(
            resolve(&resolver, StatusCode::BAD_GATEWAY).as_deref(),
            Some("error/5xx")
        );
    }

    #[test]
    fn test_declines_unknown() {
        let resolver = TemplateErrorViewResolver::new(["error/404"]);

        assert_eq!(resolve(&resolver, StatusCode::BAD_REQUEST), None);
        assert_eq!(resolve(&resolver, StatusCode::MOVED_PERMANENTLY), None);
        assert_eq!(resolve(&TemplateErrorViewResolver::default(), StatusCode::NOT_FOUND), None);
    }

    #[test]
    fn test_model_is_passed_through() {
        let resolver = TemplateErrorViewResolver::new(["error/500"]);
        let mut model = Model::new();
        model.insert("message".to_string(), json!("boom"));
        let request = Request::builder().body(Body::empty()).unwrap();

        let view = resolver
            .resolve_error_view(&request, StatusCode::INTERNAL_SERVER_ERROR, &model)
            .unwrap()
            .unwrap();
        assert_eq!(view.model, model);
        assert_eq!(view.status, None);
    }
}
