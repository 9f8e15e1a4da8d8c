use crate::request::WebRequest;
use serde_json::{Map, Value};

mod default;

pub use default::DefaultErrorAttributes;

/// Named error attributes handed to views and resolvers
pub type Model = Map<String, Value>;

/// Collects the diagnostic attributes describing a failed request
///
/// Implementations must provide at least `timestamp`, `status`, `error`,
/// `message` and `path`. `trace` is only added when `include_stack_trace` is set.
pub trait ErrorAttributes: Send + Sync + 'static {
    fn error_attributes(&self, request: WebRequest<'_>, include_stack_trace: bool) -> Model;
}
