use crate::error::internal_error_response;
use axum::response::Response;
use std::any::Any;

/// Response hook for `tower_http::catch_panic::CatchPanicLayer::custom`.
///
/// The panic payload is logged, never returned to the caller.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic payload"
    };

    tracing::error!(panic = %detail, "Handler panicked");

    internal_error_response()
}
