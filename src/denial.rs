//! Denial handling.
//!
//! When a request is stopped by the engine, the user gets the same response
//! whether the engine said no or the engine failed while checking. Only the
//! server-side log tells the two apart, and the access error id ties that
//! log record to what the user saw.

use std::sync::Arc;

use serde_json::{Value, json};

use crate::audit::{AccessEvent, AccessOutcome, AuditSink};
use crate::config::GateConfig;
use crate::correlation::CorrelationIdGenerator;
use crate::error::{ConfigError, EvaluationError};
use crate::evaluator::Evaluator;
use crate::logging::GateLog;
use crate::web::{ReqContext, Response, status};

/// Title of the API denial body.
pub const ACCESS_DENIED_TITLE: &str = "Access denied";

/// Returns the user-facing denial message embedding `access_error_id`.
pub fn access_denied_message(access_error_id: &str) -> String {
    format!(
        "Your user account does not have permissions to do the action. \
         We recorded your attempt with log message {access_error_id}. \
         Contact your administrator for help."
    )
}

/// Returns the JSON body of an API denial.
///
/// # Examples
///
/// ```
/// use access_gate::access_denied_body;
///
/// let body = access_denied_body("ACE0000000001");
/// assert_eq!(body["title"], "Access denied");
/// assert_eq!(body["accessErrorId"], "ACE0000000001");
/// ```
pub fn access_denied_body(access_error_id: &str) -> Value {
    json!({
        "title": ACCESS_DENIED_TITLE,
        "message": access_denied_message(access_error_id),
        "accessErrorId": access_error_id,
    })
}

/// Logs a stopped request and shapes the response the user sees.
#[derive(Clone)]
pub struct DenialHandler {
    config: GateConfig,
    ids: CorrelationIdGenerator,
    audit: Option<Arc<dyn AuditSink>>,
}

impl DenialHandler {
    /// Creates a denial handler.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `config` fails
    /// [`GateConfig::validate`].
    pub fn new(config: GateConfig, ids: CorrelationIdGenerator) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_validated(config, ids))
    }

    /// Creates a denial handler from a config the caller already validated.
    pub(crate) fn from_validated(config: GateConfig, ids: CorrelationIdGenerator) -> Self {
        Self {
            config,
            ids,
            audit: None,
        }
    }

    /// Records every denial to `sink` as well as to the log.
    pub fn with_audit(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    /// Handles a request the engine did not grant.
    ///
    /// `err` is the engine failure, or `None` for a plain denial. Engine
    /// failures are logged at error level without the requirement; plain
    /// denials are logged at info level with it. The response is the same
    /// in both cases: a redirect home for browser requests, a 403 JSON body
    /// for API requests.
    pub fn deny(
        &self,
        ctx: &ReqContext,
        evaluator: &dyn Evaluator,
        err: Option<&EvaluationError>,
    ) -> Response {
        let id = self.ids.new_id();
        let log = GateLog::new(ctx);

        let event = match err {
            Some(err) => {
                log.evaluation_error(err, &id);
                self.event(ctx, AccessOutcome::Error)
            }
            None => {
                let permissions = evaluator.describe();
                log.access_denied(&id, &permissions);
                self.event(ctx, AccessOutcome::Denied)
                    .with_permissions(permissions)
            }
        };
        if let Some(sink) = &self.audit {
            sink.record(event.with_access_error_id(id.as_str()));
        }

        // TODO: carry a notice through the redirect once the frontend can show one.
        if !ctx.is_api_request(&self.config.api_path_prefix) {
            return Response::redirect(self.config.home_path());
        }

        Response::json(status::FORBIDDEN, access_denied_body(&id))
    }

    fn event(&self, ctx: &ReqContext, outcome: AccessOutcome) -> AccessEvent {
        AccessEvent::new(ctx.request_id(), ctx.user().user_id, ctx.org_id(), outcome)
    }
}
