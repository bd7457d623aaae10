//! Per-request context handed to the gate by framework glue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// The signed-in user resolved by the identity layer.
///
/// The gate never inspects this beyond logging `user_id`; it is passed
/// unchanged to the access-control engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedInUser {
    /// Numeric user identifier
    pub user_id: i64,
    /// The org the user is currently acting in
    pub org_id: i64,
    /// Login name
    pub login: String,
}

/// Request context for one inbound request.
///
/// `ReqContext` holds simple, owned data so it does not couple the gate to a
/// specific framework's request types. Framework-specific middleware builds
/// one after routing and identity resolution have run.
///
/// Cloning a context shares its cancellation flag: cancelling any clone
/// cancels them all.
///
/// # Examples
///
/// ```
/// use access_gate::web::{ReqContext, SignedInUser};
///
/// let user = SignedInUser { user_id: 3, org_id: 7, login: "alice".to_string() };
/// let mut ctx = ReqContext::new("req-1", "/api/dashboards/id/42", user);
/// ctx.add_url_param(":id", "42");
///
/// assert_eq!(ctx.org_id(), 7);
/// assert_eq!(ctx.url_param("id"), Some("42"));
/// assert!(ctx.is_api_request("/api"));
/// ```
#[derive(Debug, Clone)]
pub struct ReqContext {
    request_id: String,
    path: String,
    user: SignedInUser,
    org_id: i64,
    /// Matched route parameters, in route-definition order
    url_params: Vec<(String, String)>,
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl ReqContext {
    /// Creates a context for `user` requesting `path`.
    ///
    /// The current org defaults to the user's org.
    pub fn new(request_id: impl Into<String>, path: impl Into<String>, user: SignedInUser) -> Self {
        let org_id = user.org_id;
        Self {
            request_id: request_id.into(),
            path: path.into(),
            user,
            org_id,
            url_params: Vec::new(),
            deadline: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Overrides the current org for this request.
    pub fn set_org_id(&mut self, org_id: i64) {
        self.org_id = org_id;
    }

    /// Records a matched route parameter.
    ///
    /// Parameters keep insertion order. Adding a name twice replaces the
    /// earlier value in place.
    pub fn add_url_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.url_params.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.url_params.push((name, value)),
        }
    }

    /// Sets the instant after which evaluation should give up.
    pub fn set_deadline(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
    }

    /// Marks the request as cancelled.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called on this
    /// context or any clone of it.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns true when a deadline was set and has passed.
    pub fn deadline_exceeded(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Returns the request identifier.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the signed-in user.
    pub fn user(&self) -> &SignedInUser {
        &self.user
    }

    /// Returns the current org.
    pub fn org_id(&self) -> i64 {
        self.org_id
    }

    /// Returns the matched route parameters in route-definition order.
    pub fn url_params(&self) -> &[(String, String)] {
        &self.url_params
    }

    /// Looks up a route parameter. A leading `:` on either side is ignored.
    pub fn url_param(&self, name: &str) -> Option<&str> {
        let wanted = name.trim_start_matches(':');
        self.url_params
            .iter()
            .find(|(n, _)| n.trim_start_matches(':') == wanted)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true when the path falls under `api_prefix`.
    ///
    /// API requests get JSON denials; everything else is treated as a
    /// browser navigation and redirected.
    pub fn is_api_request(&self, api_prefix: &str) -> bool {
        self.path.starts_with(api_prefix)
    }
}
