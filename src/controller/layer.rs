use crate::controller::ErrorController;
use crate::request::{ERROR_REQUEST_URI, ErrorRequestExt};
use axum::{
    body::{Body, HttpBody},
    http::{Request, header},
    response::Response,
};
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Tower Layer that forwards bodiless error responses to an [`ErrorController`]
///
/// A handler returning a bare `StatusCode::NOT_FOUND` gets the controller's
/// page or JSON body instead. Headers set by the handler, such as
/// `WWW-Authenticate` or `Retry-After`, are kept on the replacement.
/// Responses that already carry a body pass through.
#[derive(Clone)]
pub struct ErrorPageLayer {
    controller: Arc<ErrorController>,
}

impl ErrorPageLayer {
    pub fn new(controller: ErrorController) -> Self {
        Self {
            controller: Arc::new(controller),
        }
    }
}

impl<S> Layer<S> for ErrorPageLayer {
    type Service = ErrorPageMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ErrorPageMiddleware {
            inner,
            controller: self.controller.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ErrorPageMiddleware<S> {
    inner: S,
    controller: Arc<ErrorController>,
}

impl<S> Service<Request<Body>> for ErrorPageMiddleware<S>
where
    S: Service<Request<Body>, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let controller = self.controller.clone();
        let mut inner = self.inner.clone();

        // Only the head of the request is needed to forward it
        let uri = request.uri().clone();
        let method = request.method().clone();
        let headers = request.headers().clone();

        Box::pin(async move {
            let response = inner.call(request).await?;

            let status = response.status();
            let bodiless = response.body().size_hint().exact() == Some(0);
            let is_error = status.is_client_error() || status.is_server_error();
            if !is_error || !bodiless || uri.path() == controller.properties().path {
                return Ok(response);
            }

            tracing::debug!(
                %method,
                %uri,
                %status,
                "Forwarding error response to error controller"
            );

            let mut forward = Request::new(Body::empty());
            *forward.method_mut() = method;
            *forward.headers_mut() = headers;
            *forward.uri_mut() = uri.clone();
            let forward = forward
                .with_error_status(status.as_u16())
                .with_error_attribute(ERROR_REQUEST_URI, uri.path());

            let mut dispatched = controller.dispatch(&forward);
            for (name, value) in response.headers() {
                if name == header::CONTENT_TYPE || name == header::CONTENT_LENGTH {
                    continue;
                }
                dispatched.headers_mut().append(name.clone(), value.clone());
            }
            Ok(dispatched)
        })
    }
}
