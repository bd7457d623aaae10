use std::fmt;

use crate::web::ReqContext;

/// Request-bound emitter for the gate's structured log records.
///
/// `GateLog` borrows the request context, so it cannot outlive the request
/// it reports on. Every record carries the request ID for tracing.
///
/// Field names are part of the log contract operators search on:
/// `accessErrorID`, `userID`, `permissions` and `error`.
#[derive(Debug, Clone, Copy)]
pub struct GateLog<'a> {
    ctx: &'a ReqContext,
}

impl<'a> GateLog<'a> {
    /// Creates a log emitter for one request.
    pub fn new(ctx: &'a ReqContext) -> Self {
        Self { ctx }
    }

    /// Records an engine failure.
    ///
    /// The requirement is not part of this record.
    pub fn evaluation_error(&self, err: &dyn fmt::Display, access_error_id: &str) {
        tracing::error!(
            request_id = %self.ctx.request_id(),
            error = %err,
            accessErrorID = %access_error_id,
            "Error from access control system"
        );
    }

    /// Records a denial decided by the engine.
    pub fn access_denied(&self, access_error_id: &str, permissions: &str) {
        tracing::info!(
            request_id = %self.ctx.request_id(),
            userID = self.ctx.user().user_id,
            accessErrorID = %access_error_id,
            permissions = %permissions,
            "Access denied"
        );
    }

    /// Records a requirement that could not be injected for this request.
    pub fn injection_failed(&self, err: &dyn fmt::Display) {
        tracing::error!(
            request_id = %self.ctx.request_id(),
            error = %err,
            "Internal server error"
        );
    }

    /// Records a granted request.
    pub fn access_granted(&self) {
        tracing::debug!(
            request_id = %self.ctx.request_id(),
            userID = self.ctx.user().user_id,
            "Access granted"
        );
    }
}
