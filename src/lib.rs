//! Access-control enforcement gate for protected request handlers.
//!
//! This crate sits in front of request handlers in a multi-tenant service
//! and decides, per request, whether the signed-in user may proceed:
//! - **Requirements**: Permission expressions with scope templates filled in
//!   from the request's org and URL parameters
//! - **Engine**: An external access-control engine makes the decision
//! - **Denials**: Uniform, information-minimal responses tied to server
//!   logs by an access error id
//!
//! # Core Types
//!
//! - [`AccessGate`]: Builder that wraps handlers with enforcement
//! - [`Evaluator`]: A permission requirement ([`eval_permission`],
//!   [`eval_all`], [`eval_any`])
//! - [`AccessControl`]: The engine seam
//! - [`ScopeParams`]: Request-derived template parameters
//! - [`DenialHandler`]: Logs and shapes denials
//! - [`CorrelationIdGenerator`]: Access error ids
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use access_gate::{
//!     AccessControl, AccessGate, EvaluationError, Evaluator, eval_permission,
//!     web::{Handler, ReqContext, Response, SignedInUser, status},
//! };
//! use serde_json::json;
//!
//! struct DenyAll;
//!
//! impl AccessControl for DenyAll {
//!     fn is_disabled(&self) -> bool {
//!         false
//!     }
//!
//!     fn evaluate(
//!         &self,
//!         _ctx: &ReqContext,
//!         _user: &SignedInUser,
//!         _evaluator: &dyn Evaluator,
//!     ) -> Result<bool, EvaluationError> {
//!         Ok(false)
//!     }
//! }
//!
//! let guarded = AccessGate::new(Arc::new(DenyAll)).protect(
//!     Arc::new(|_ctx: &ReqContext| Response::json(status::OK, json!({}))),
//!     eval_permission("orgs:write", &["orgs:{org_id}"]),
//! );
//!
//! let user = SignedInUser { user_id: 1, org_id: 7, login: "alice".to_string() };
//! let resp = guarded.handle(&ReqContext::new("req-1", "/api/orgs/7", user));
//!
//! assert_eq!(resp.status(), status::FORBIDDEN);
//! assert_eq!(resp.json_body().unwrap()["title"], "Access denied");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod audit;
mod config;
mod correlation;
mod denial;
mod engine;
mod error;
mod evaluator;
mod gate;
mod logging;
mod scope;
pub mod web;

pub use config::{DEFAULT_API_PATH_PREFIX, GateConfig};
pub use correlation::{
    ACCESS_ERROR_ID_DIGITS, ACCESS_ERROR_ID_PREFIX, CorrelationIdGenerator, OsRandom, RandomSource,
    new_id,
};
pub use denial::{ACCESS_DENIED_TITLE, DenialHandler, access_denied_body, access_denied_message};
pub use engine::{AccessControl, Decision, evaluate};
pub use error::{ConfigError, EvaluationError, InjectionError, RandomSourceError};
pub use evaluator::{All, Any, Evaluator, Permission, eval_all, eval_any, eval_permission};
pub use gate::{AccessGate, GuardedHandler, INTERNAL_ERROR_MESSAGE, internal_error_response};
pub use logging::GateLog;
pub use scope::{ORG_ID_PLACEHOLDER, ScopeParams, inject_template};
