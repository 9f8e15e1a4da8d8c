use crate::attributes::Model;
use crate::error::{ErrorDispatchError, Result};
use crate::resolver::{ModelAndView, ResolverRegistration};
use axum::{body::Body, http::Request, http::StatusCode};
use std::sync::Arc;

/// Ordered, immutable sequence of error-view resolvers
///
/// Sorted once on construction and shared read-only between requests.
#[derive(Clone, Debug)]
pub struct ResolverChain {
    resolvers: Arc<[ResolverRegistration]>,
}

impl Default for ResolverChain {
    fn default() -> Self {
        Self::new(None)
    }
}

impl From<Vec<ResolverRegistration>> for ResolverChain {
    fn from(resolvers: Vec<ResolverRegistration>) -> Self {
        Self::new(Some(resolvers))
    }
}

impl ResolverChain {
    /// Build a chain; `None` yields an empty chain that always declines
    ///
    /// Registrations are stably sorted by order, so equal orders keep
    /// their input order and unordered registrations come last.
    pub fn new(resolvers: Option<Vec<ResolverRegistration>>) -> Self {
        let mut sorted = resolvers.unwrap_or_default();
        sorted.sort_by_key(ResolverRegistration::order);
        Self {
            resolvers: Arc::from(sorted),
        }
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolverRegistration> {
        self.resolvers.iter()
    }

    /// Consult resolvers in order until one produces a view
    ///
    /// Returns `Ok(None)` when every resolver declines. A resolver failure
    /// stops the walk and is returned as [`ErrorDispatchError::Resolver`].
    pub fn resolve(
        &self,
        request: &Request<Body>,
        status: StatusCode,
        model: &Model,
    ) -> Result<Option<ModelAndView>> {
        for (index, registration) in self.resolvers.iter().enumerate() {
            tracing::debug!(
                index,
                order = registration.order(),
                %status,
                "Consulting error view resolver"
            );
            let resolved = registration
                .resolver()
                .resolve_error_view(request, status, model)
                .map_err(ErrorDispatchError::Resolver)?;

            if let Some(view) = resolved {
                tracing::debug!(index, view = %view.view_name, "Resolved error view");
                return Ok(Some(view));
            }
        }

        tracing::debug!(resolvers = self.resolvers.len(), %status, "No error view resolved");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolverError;
    use crate::resolver::ErrorViewResolver;
    use std::sync::Mutex;

    type Calls = Arc<Mutex<Vec<&'static str>>>;

    struct RecordingResolver {
        name: &'static str,
        view: Option<&'static str>,
        calls: Calls,
    }

    impl ErrorViewResolver for RecordingResolver {
        fn resolve_error_view(
            &self,
            _request: &Request<Body>,
            _status: StatusCode,
            model: &Model,
        ) -> std::result::Result<Option<ModelAndView>, ResolverError> {
            self.calls.lock().unwrap().push(self.name);
            Ok(self.view.map(|view| ModelAndView::new(view, model.clone())))
        }
    }

    fn recording(
        name: &'static str,
        view: Option<&'static str>,
        calls: &Calls,
    ) -> RecordingResolver {
        RecordingResolver {
            name,
            view,
            calls: Arc::clone(calls),
        }
    }

    fn request() -> Request<Body> {
        Request::builder().uri("/error").body(Body::empty()).unwrap()
    }

    fn names(chain: &ResolverChain, calls: &Calls) -> Vec<&'static str> {
        calls.lock().unwrap().clear();
        for registration in chain.iter() {
            let _ = registration
                .resolver()
                .resolve_error_view(&request(), StatusCode::OK, &Model::new());
        }
        calls.lock().unwrap().clone()
    }

    #[test]
    fn test_absent_and_empty_chains_decline() {
        for chain in [ResolverChain::new(None), ResolverChain::new(Some(Vec::new()))] {
            assert!(chain.is_empty());
            for status in [StatusCode::NOT_FOUND, StatusCode::INTERNAL_SERVER_ERROR] {
                let resolved = chain.resolve(&request(), status, &Model::new()).unwrap();
                assert_eq!(resolved, None);
            }
        }
    }

    #[test]
    fn test_first_resolved_view_short_circuits() {
        let calls = Calls::default();
        let chain = ResolverChain::new(Some(vec![
            ResolverRegistration::with_order(10, recording("r1", None, &calls)),
            ResolverRegistration::with_order(5, recording("r2", Some("X"), &calls)),
            ResolverRegistration::with_order(1, recording("r3", None, &calls)),
        ]));

        let resolved = chain
            .resolve(&request(), StatusCode::NOT_FOUND, &Model::new())
            .unwrap()
            .unwrap();

        assert_eq!(resolved.view_name, "X");
        assert_eq!(*calls.lock().unwrap(), vec!["r3", "r2"]);
    }

    #[test]
    fn test_sort_is_stable_and_unordered_last() {
        let calls = Calls::default();
        let chain = ResolverChain::new(Some(vec![
            ResolverRegistration::new(recording("unordered-a", None, &calls)),
            ResolverRegistration::with_order(3, recording("first-3", None, &calls)),
            ResolverRegistration::new(recording("unordered-b", None, &calls)),
            ResolverRegistration::with_order(3, recording("second-3", None, &calls)),
            ResolverRegistration::with_order(-1, recording("negative", None, &calls)),
        ]));

        assert_eq!(
            names(&chain, &calls),
            vec!["negative", "first-3", "second-3", "unordered-a", "unordered-b"]
        );
    }

    #[test]
    fn test_chain_is_detached_from_input() {
        let calls = Calls::default();
        let mut input = vec![ResolverRegistration::new(recording("only", None, &calls))];
        let chain = ResolverChain::from(input.clone());

        input.push(ResolverRegistration::with_order(0, recording("late", Some("late"), &calls)));
        input.clear();

        assert_eq!(chain.len(), 1);
        assert_eq!(names(&chain, &calls), vec!["only"]);
    }

    #[test]
    fn test_resolver_failure_propagates() {
        let calls = Calls::default();
        let failing = |_: &Request<Body>,
                       _: StatusCode,
                       _: &Model|
         -> std::result::Result<Option<ModelAndView>, ResolverError> {
            Err("template lookup failed".into())
        };
        let chain = ResolverChain::new(Some(vec![
            ResolverRegistration::with_order(1, failing),
            ResolverRegistration::with_order(2, recording("after", Some("never"), &calls)),
        ]));

        let err = chain
            .resolve(&request(), StatusCode::BAD_REQUEST, &Model::new())
            .unwrap_err();

        assert!(matches!(err, ErrorDispatchError::Resolver(_)));
        assert!(calls.lock().unwrap().is_empty());
    }
}
