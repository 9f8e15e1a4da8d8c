use crate::error::Result;
use crate::resolver::ModelAndView;
use axum::response::Html;

mod whitelabel;

pub use whitelabel::WhitelabelViewRenderer;

/// View rendered when no resolver produced one
pub const DEFAULT_ERROR_VIEW: &str = "error";

/// Turns a resolved view into HTML
///
/// This is where a templating engine plugs in.
pub trait ViewRenderer: Send + Sync + 'static {
    fn render(&self, view: &ModelAndView) -> Result<Html<String>>;
}
