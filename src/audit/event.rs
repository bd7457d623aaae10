//! Access event schema.

use std::fmt;

/// Why the gate stopped a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    /// The engine decided the principal lacks the permission.
    Denied,
    /// The engine failed while deciding.
    Error,
    /// The requirement could not be injected for this request.
    InjectionFailed,
}

impl fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessOutcome::Denied => write!(f, "denied"),
            AccessOutcome::Error => write!(f, "error"),
            AccessOutcome::InjectionFailed => write!(f, "injection_failed"),
        }
    }
}

/// A record of one request the gate stopped.
///
/// # Example
///
/// ```
/// use access_gate::audit::{AccessEvent, AccessOutcome};
///
/// let event = AccessEvent::new("req-123", 4, 1, AccessOutcome::Denied)
///     .with_access_error_id("ACE0123456789")
///     .with_permissions("action:users:read scopes:users:*");
///
/// assert_eq!(event.access_error_id(), Some("ACE0123456789"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessEvent {
    request_id: String,
    user_id: i64,
    org_id: i64,
    outcome: AccessOutcome,
    /// Id shown to the user; absent for injection failures
    access_error_id: Option<String>,
    /// Requirement description; only set for plain denials
    permissions: Option<String>,
}

impl AccessEvent {
    /// Creates an event with the required fields.
    pub fn new(
        request_id: impl Into<String>,
        user_id: i64,
        org_id: i64,
        outcome: AccessOutcome,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            user_id,
            org_id,
            outcome,
            access_error_id: None,
            permissions: None,
        }
    }

    /// Sets the access error id shown to the user.
    pub fn with_access_error_id(mut self, id: impl Into<String>) -> Self {
        self.access_error_id = Some(id.into());
        self
    }

    /// Sets the requirement description.
    pub fn with_permissions(mut self, permissions: impl Into<String>) -> Self {
        self.permissions = Some(permissions.into());
        self
    }

    /// Returns the request identifier.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the user the request was made by.
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Returns the org the request was made in.
    pub fn org_id(&self) -> i64 {
        self.org_id
    }

    /// Returns why the request was stopped.
    pub fn outcome(&self) -> AccessOutcome {
        self.outcome
    }

    /// Returns the access error id, if set.
    pub fn access_error_id(&self) -> Option<&str> {
        self.access_error_id.as_deref()
    }

    /// Returns the requirement description, if set.
    pub fn permissions(&self) -> Option<&str> {
        self.permissions.as_deref()
    }
}

impl fmt::Display for AccessEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AccessEvent[outcome={}, request_id={}, user_id={}, org_id={}",
            self.outcome, self.request_id, self.user_id, self.org_id
        )?;

        if let Some(id) = &self.access_error_id {
            write!(f, ", access_error_id={}", id)?;
        }
        if let Some(permissions) = &self.permissions {
            write!(f, ", permissions={}", permissions)?;
        }

        write!(f, "]")
    }
}
