use std::sync::Arc;

use serde_json::json;

use crate::{
    audit::{AccessEvent, AccessOutcome, AuditSink},
    config::GateConfig,
    correlation::CorrelationIdGenerator,
    denial::DenialHandler,
    engine::{AccessControl, evaluate},
    error::ConfigError,
    evaluator::Evaluator,
    logging::GateLog,
    scope::ScopeParams,
    web::{Handler, ReqContext, Response, status},
};

/// Message of the body returned when a requirement cannot be injected.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// The access-control enforcement gate.
///
/// `AccessGate` wraps protected handlers so that each request is checked
/// against a permission requirement before the handler runs. Whether access
/// control is enabled is read from the engine once per
/// [`protect`](AccessGate::protect) call, never per request.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use access_gate::{
///     AccessControl, AccessGate, EvaluationError, Evaluator, eval_permission,
///     web::{Handler, ReqContext, Response, SignedInUser, status},
/// };
/// use serde_json::json;
///
/// struct AllowAll;
///
/// impl AccessControl for AllowAll {
///     fn is_disabled(&self) -> bool {
///         false
///     }
///
///     fn evaluate(
///         &self,
///         _ctx: &ReqContext,
///         _user: &SignedInUser,
///         _evaluator: &dyn Evaluator,
///     ) -> Result<bool, EvaluationError> {
///         Ok(true)
///     }
/// }
///
/// let gate = AccessGate::new(Arc::new(AllowAll));
/// let guarded = gate.protect(
///     Arc::new(|_ctx: &ReqContext| Response::json(status::OK, json!({"ok": true}))),
///     eval_permission("dashboards:read", &["dashboards:id:{:id}"]),
/// );
///
/// let user = SignedInUser { user_id: 1, org_id: 1, login: "alice".to_string() };
/// let mut ctx = ReqContext::new("req-1", "/api/dashboards/id/42", user);
/// ctx.add_url_param(":id", "42");
///
/// assert_eq!(guarded.handle(&ctx).status(), status::OK);
/// ```
#[derive(Clone)]
pub struct AccessGate {
    ac: Arc<dyn AccessControl>,
    config: GateConfig,
    ids: CorrelationIdGenerator,
    audit: Option<Arc<dyn AuditSink>>,
}

impl AccessGate {
    /// Creates a gate backed by the given engine, with default config and
    /// an OS-random id generator.
    pub fn new(ac: Arc<dyn AccessControl>) -> Self {
        Self {
            ac,
            config: GateConfig::default(),
            ids: CorrelationIdGenerator::new(),
            audit: None,
        }
    }

    /// Replaces the gate configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `config` fails
    /// [`GateConfig::validate`]; the gate never serves with such a config.
    pub fn with_config(mut self, config: GateConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Replaces the access error id generator.
    pub fn with_id_generator(mut self, ids: CorrelationIdGenerator) -> Self {
        self.ids = ids;
        self
    }

    /// Records every stopped request to `sink`.
    pub fn with_audit(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    /// Wraps `handler` so it only runs when `evaluator` is satisfied.
    ///
    /// If the engine reports access control disabled, `handler` itself is
    /// returned: no wrapping, no checks, no logging. That decision holds
    /// for the lifetime of the returned handler.
    ///
    /// Otherwise the returned handler, per request:
    /// 1. Resolves scope parameters and injects them into `evaluator`;
    ///    injection failure answers 500 without consulting the engine.
    /// 2. Asks the engine; if granted, calls `handler` and returns its
    ///    response.
    /// 3. Otherwise returns the denial response and never calls `handler`.
    pub fn protect(
        &self,
        handler: Arc<dyn Handler>,
        evaluator: Arc<dyn Evaluator>,
    ) -> Arc<dyn Handler> {
        if self.ac.is_disabled() {
            return handler;
        }

        let mut denial = DenialHandler::from_validated(self.config.clone(), self.ids.clone());
        if let Some(sink) = &self.audit {
            denial = denial.with_audit(Arc::clone(sink));
        }

        Arc::new(GuardedHandler {
            ac: Arc::clone(&self.ac),
            evaluator,
            inner: handler,
            denial,
            audit: self.audit.clone(),
        })
    }
}

/// A protected handler behind the gate.
///
/// Holds no per-request state and can serve any number of requests
/// concurrently.
pub struct GuardedHandler {
    ac: Arc<dyn AccessControl>,
    evaluator: Arc<dyn Evaluator>,
    inner: Arc<dyn Handler>,
    denial: DenialHandler,
    audit: Option<Arc<dyn AuditSink>>,
}

impl Handler for GuardedHandler {
    fn handle(&self, ctx: &ReqContext) -> Response {
        let log = GateLog::new(ctx);
        let params = ScopeParams::resolve(ctx);

        let injected = match self.evaluator.inject(&params) {
            Ok(injected) => injected,
            Err(err) => {
                log.injection_failed(&err);
                if let Some(sink) = &self.audit {
                    sink.record(AccessEvent::new(
                        ctx.request_id(),
                        ctx.user().user_id,
                        ctx.org_id(),
                        AccessOutcome::InjectionFailed,
                    ));
                }
                return internal_error_response();
            }
        };

        let decision = evaluate(self.ac.as_ref(), ctx, injected.as_ref());
        if decision.is_granted() {
            log.access_granted();
            return self.inner.handle(ctx);
        }
        self.denial.deny(ctx, injected.as_ref(), decision.error())
    }
}

/// Returns the generic 500 response used when a requirement cannot be
/// injected.
pub fn internal_error_response() -> Response {
    Response::json(
        status::INTERNAL_SERVER_ERROR,
        json!({ "message": INTERNAL_ERROR_MESSAGE }),
    )
}
