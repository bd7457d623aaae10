//! Integration tests for the gate's request flow.
//!
//! These tests drive guarded handlers the way framework glue would and
//! check both sides of every denial: the response the user sees and the
//! log record an operator searches for.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use access_gate::audit::{AccessOutcome, AuditTrail};
use access_gate::web::{Handler, ReqContext, Response, SignedInUser, status};
use access_gate::{
    ACCESS_ERROR_ID_PREFIX, AccessControl, AccessGate, CorrelationIdGenerator, EvaluationError,
    Evaluator, GateConfig, RandomSource, RandomSourceError, access_denied_body, eval_all,
    eval_permission,
};
use serde_json::json;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::Registry;

// ---------------------------------------------------------------------------
// Log capture
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Captured {
    level: Level,
    fields: Vec<(String, String)>,
}

impl Captured {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn message(&self) -> &str {
        self.field("message").unwrap_or_default()
    }
}

struct FieldVisitor<'a>(&'a mut Vec<(String, String)>);

impl Visit for FieldVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

#[derive(Clone, Default)]
struct CaptureLayer {
    events: Arc<Mutex<Vec<Captured>>>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = Vec::new();
        event.record(&mut FieldVisitor(&mut fields));
        self.events.lock().unwrap().push(Captured {
            level: *event.metadata().level(),
            fields,
        });
    }
}

/// Runs `f` with a subscriber that records every event on this thread.
fn capture<R>(f: impl FnOnce() -> R) -> (R, Vec<Captured>) {
    let layer = CaptureLayer::default();
    let events = Arc::clone(&layer.events);
    let subscriber = Registry::default().with(layer);
    let out = tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    (out, captured)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

struct ScriptedEngine {
    disabled: bool,
    result: Result<bool, EvaluationError>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl ScriptedEngine {
    fn returning(result: Result<bool, EvaluationError>) -> Arc<Self> {
        Arc::new(Self {
            disabled: false,
            result,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn disabled() -> Arc<Self> {
        Arc::new(Self {
            disabled: true,
            result: Ok(false),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AccessControl for ScriptedEngine {
    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn evaluate(
        &self,
        _ctx: &ReqContext,
        _user: &SignedInUser,
        evaluator: &dyn Evaluator,
    ) -> Result<bool, EvaluationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(evaluator.describe());
        self.result.clone()
    }
}

/// Always yields the same byte, so every id is predictable.
struct Constant(u8);

impl RandomSource for Constant {
    fn try_fill(&self, dest: &mut [u8]) -> Result<(), RandomSourceError> {
        dest.fill(self.0);
        Ok(())
    }
}

fn protected() -> (Arc<dyn Handler>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let handler: Arc<dyn Handler> = Arc::new(move |ctx: &ReqContext| {
        counter.fetch_add(1, Ordering::SeqCst);
        Response::json(status::OK, json!({ "dashboard": ctx.url_param("id") }))
    });
    (handler, calls)
}

fn request(path: &str) -> ReqContext {
    let mut ctx = ReqContext::new(
        "req-42",
        path,
        SignedInUser {
            user_id: 5,
            org_id: 7,
            login: "editor".to_string(),
        },
    );
    ctx.add_url_param(":id", "42");
    ctx
}

fn dashboard_requirement() -> Arc<dyn Evaluator> {
    eval_all(vec![
        eval_permission("orgs:read", &["orgs:{org_id}"]),
        eval_permission("dashboards:write", &["dashboards:id:{:id}"]),
    ])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn granted_request_reaches_handler_once() {
    let engine = ScriptedEngine::returning(Ok(true));
    let (handler, calls) = protected();
    let guarded = AccessGate::new(engine.clone()).protect(handler, dashboard_requirement());

    let (resp, events) = capture(|| guarded.handle(&request("/api/dashboards/id/42")));

    assert_eq!(resp, Response::json(status::OK, json!({ "dashboard": "42" })));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(engine.calls(), 1);
    assert!(events.iter().all(|e| e.field("accessErrorID").is_none()));
}

#[test]
fn requirement_is_injected_before_evaluation() {
    let engine = ScriptedEngine::returning(Ok(true));
    let (handler, _) = protected();
    let guarded = AccessGate::new(engine.clone()).protect(handler, dashboard_requirement());

    guarded.handle(&request("/api/dashboards/id/42"));

    let seen = engine.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].contains("orgs:7"));
    assert!(seen[0].contains("dashboards:id:42"));
    assert!(!seen[0].contains('{'));
}

#[test]
fn api_denial_is_403_and_logged_with_matching_id() {
    let engine = ScriptedEngine::returning(Ok(false));
    let (handler, calls) = protected();
    let guarded = AccessGate::new(engine).protect(handler, dashboard_requirement());

    let (resp, events) = capture(|| guarded.handle(&request("/api/dashboards/id/42")));

    assert_eq!(resp.status(), status::FORBIDDEN);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let body = resp.json_body().unwrap();
    let id = body["accessErrorId"].as_str().unwrap();
    assert!(id.starts_with(ACCESS_ERROR_ID_PREFIX));
    assert_eq!(body, &access_denied_body(id));

    let denied = events
        .iter()
        .find(|e| e.message() == "Access denied")
        .expect("denial logged");
    assert_eq!(denied.level, Level::INFO);
    assert_eq!(denied.field("accessErrorID"), Some(id));
    assert_eq!(denied.field("userID"), Some("5"));
    assert_eq!(denied.field("request_id"), Some("req-42"));
    assert_eq!(
        denied.field("permissions"),
        Some("all(action:orgs:read scopes:orgs:7 action:dashboards:write scopes:dashboards:id:42)")
    );
}

#[test]
fn api_engine_error_is_403_and_logged_at_error() {
    let engine = ScriptedEngine::returning(Err(EvaluationError::Engine(
        "permission store unavailable".to_string(),
    )));
    let (handler, calls) = protected();
    let guarded = AccessGate::new(engine).protect(handler, dashboard_requirement());

    let (resp, events) = capture(|| guarded.handle(&request("/api/dashboards/id/42")));

    assert_eq!(resp.status(), status::FORBIDDEN);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let body = resp.json_body().unwrap();
    let id = body["accessErrorId"].as_str().unwrap();
    assert!(body["message"].as_str().unwrap().contains(id));

    let failed = events
        .iter()
        .find(|e| e.message() == "Error from access control system")
        .expect("engine error logged");
    assert_eq!(failed.level, Level::ERROR);
    assert_eq!(failed.field("accessErrorID"), Some(id));
    assert_eq!(
        failed.field("error"),
        Some("access control engine failure: permission store unavailable")
    );
    assert!(failed.field("permissions").is_none());
    assert!(events.iter().all(|e| e.message() != "Access denied"));
}

#[test]
fn denial_and_engine_error_responses_are_identical() {
    let ids = CorrelationIdGenerator::with_source(Arc::new(Constant(3)));
    let requirement = dashboard_requirement();

    let denied_gate =
        AccessGate::new(ScriptedEngine::returning(Ok(false))).with_id_generator(ids.clone());
    let failed_gate = AccessGate::new(ScriptedEngine::returning(Err(EvaluationError::Cancelled)))
        .with_id_generator(ids);

    let (handler, _) = protected();
    let denied = denied_gate.protect(Arc::clone(&handler), Arc::clone(&requirement));
    let failed = failed_gate.protect(handler, requirement);

    let ctx = request("/api/dashboards/id/42");
    let denied_resp = denied.handle(&ctx);
    let failed_resp = failed.handle(&ctx);

    assert_eq!(denied_resp, failed_resp);
    assert_eq!(
        serde_json::to_vec(denied_resp.json_body().unwrap()).unwrap(),
        serde_json::to_vec(failed_resp.json_body().unwrap()).unwrap()
    );
}

#[test]
fn browser_denial_redirects_without_body() {
    let config = GateConfig {
        app_sub_url: "/monitoring".to_string(),
        ..GateConfig::default()
    };
    let (handler, calls) = protected();
    let guarded = AccessGate::new(ScriptedEngine::returning(Ok(false)))
        .with_config(config)
        .unwrap()
        .protect(handler, dashboard_requirement());

    let resp = guarded.handle(&request("/d/42/overview"));

    assert_eq!(resp, Response::redirect("/monitoring/"));
    assert!(resp.json_body().is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn browser_engine_error_also_redirects() {
    let (handler, _) = protected();
    let guarded = AccessGate::new(ScriptedEngine::returning(Err(
        EvaluationError::DeadlineExceeded,
    )))
    .protect(handler, dashboard_requirement());

    let resp = guarded.handle(&request("/d/42/overview"));
    assert_eq!(resp, Response::redirect("/"));
}

#[test]
fn custom_api_prefix_controls_classification() {
    let config = GateConfig {
        api_path_prefix: "/v2".to_string(),
        ..GateConfig::default()
    };
    let (handler, _) = protected();
    let guarded = AccessGate::new(ScriptedEngine::returning(Ok(false)))
        .with_config(config)
        .unwrap()
        .protect(handler, dashboard_requirement());

    assert_eq!(guarded.handle(&request("/v2/dashboards/42")).status(), status::FORBIDDEN);
    assert_eq!(guarded.handle(&request("/api/dashboards/42")).status(), status::FOUND);
}

#[test]
fn invalid_configs_never_reach_the_denial_path() {
    let off_site = GateConfig {
        app_sub_url: "//evil.example".to_string(),
        ..GateConfig::default()
    };
    let every_path_is_api = GateConfig {
        app_sub_url: "monitor".to_string(),
        api_path_prefix: String::new(),
    };

    for config in [off_site, every_path_is_api] {
        let result = AccessGate::new(ScriptedEngine::returning(Ok(false))).with_config(config);
        assert!(result.is_err());
    }

    let (handler, _) = protected();
    let guarded = AccessGate::new(ScriptedEngine::returning(Ok(false)))
        .protect(handler, dashboard_requirement());
    assert_eq!(guarded.handle(&request("/d/1")), Response::redirect("/"));
}

#[test]
fn injection_failure_is_500_without_engine_or_denial_log() {
    let engine = ScriptedEngine::returning(Ok(true));
    let (handler, calls) = protected();
    let guarded = AccessGate::new(engine.clone()).protect(
        handler,
        eval_permission("teams:read", &["teams:id:{:teamId}"]),
    );

    let (resp, events) = capture(|| guarded.handle(&request("/api/teams/1")));

    assert_eq!(resp.status(), status::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.json_body(), Some(&json!({ "message": "Internal server error" })));
    assert_eq!(engine.calls(), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let failure = events
        .iter()
        .find(|e| e.level == Level::ERROR)
        .expect("injection failure logged");
    assert_eq!(failure.message(), "Internal server error");
    assert!(failure.field("error").unwrap().contains("teamId"));
    assert!(events.iter().all(|e| e.field("accessErrorID").is_none()));
}

#[test]
fn disabled_gate_returns_same_handler_and_never_logs() {
    let engine = ScriptedEngine::disabled();
    let (handler, calls) = protected();

    let (resp, events) = capture(|| {
        let guarded = AccessGate::new(engine.clone())
            .protect(Arc::clone(&handler), eval_permission("a", &["{:unresolvable}"]));
        assert!(Arc::ptr_eq(&guarded, &handler));
        guarded.handle(&request("/api/anything"))
    });

    assert_eq!(resp.status(), status::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(engine.calls(), 0);
    assert!(events.is_empty());
}

#[test]
fn audit_trail_mirrors_denials() {
    let trail = Arc::new(AuditTrail::new());
    let (handler, _) = protected();
    let guarded = AccessGate::new(ScriptedEngine::returning(Ok(false)))
        .with_audit(trail.clone())
        .protect(handler, dashboard_requirement());

    let resp = guarded.handle(&request("/api/dashboards/id/42"));
    let id = resp.json_body().unwrap()["accessErrorId"]
        .as_str()
        .unwrap()
        .to_string();

    let events = trail.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome(), AccessOutcome::Denied);
    assert_eq!(events[0].access_error_id(), Some(id.as_str()));
    assert_eq!(events[0].request_id(), "req-42");
    assert_eq!(events[0].org_id(), 7);
}

#[test]
fn audit_trail_records_injection_failures_without_id() {
    let trail = Arc::new(AuditTrail::new());
    let (handler, _) = protected();
    let guarded = AccessGate::new(ScriptedEngine::returning(Ok(true)))
        .with_audit(trail.clone())
        .protect(handler, eval_permission("a", &["{:missing}"]));

    guarded.handle(&request("/api/x"));

    let events = trail.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome(), AccessOutcome::InjectionFailed);
    assert!(events[0].access_error_id().is_none());
}

#[test]
fn guarded_handler_serves_concurrent_requests() {
    let engine = ScriptedEngine::returning(Ok(true));
    let (handler, calls) = protected();
    let guarded = AccessGate::new(engine.clone()).protect(handler, dashboard_requirement());

    let threads: Vec<_> = (0..8)
        .map(|i| {
            let guarded = Arc::clone(&guarded);
            std::thread::spawn(move || {
                let mut ctx = ReqContext::new(
                    format!("req-{i}"),
                    "/api/dashboards",
                    SignedInUser {
                        user_id: i,
                        org_id: i,
                        login: format!("user-{i}"),
                    },
                );
                ctx.add_url_param(":id", i.to_string());
                guarded.handle(&ctx).status()
            })
        })
        .collect();

    for thread in threads {
        assert_eq!(thread.join().unwrap(), status::OK);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 8);

    let mut seen = engine.seen.lock().unwrap().clone();
    seen.sort();
    assert_eq!(seen.len(), 8);
    assert!(seen.iter().any(|d| d.contains("orgs:3") && d.contains("dashboards:id:3")));
}
