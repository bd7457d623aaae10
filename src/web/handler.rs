//! The handler abstraction the gate wraps.

use super::{ReqContext, Response};

/// A request handler.
///
/// Implemented for any `Fn(&ReqContext) -> Response` closure that is safe to
/// share across request threads.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use access_gate::web::{Handler, ReqContext, Response, status};
/// use serde_json::json;
///
/// let handler: Arc<dyn Handler> =
///     Arc::new(|_ctx: &ReqContext| Response::json(status::OK, json!({"ok": true})));
/// ```
pub trait Handler: Send + Sync {
    /// Handles one request.
    fn handle(&self, ctx: &ReqContext) -> Response;
}

impl<F> Handler for F
where
    F: Fn(&ReqContext) -> Response + Send + Sync,
{
    fn handle(&self, ctx: &ReqContext) -> Response {
        self(ctx)
    }
}
