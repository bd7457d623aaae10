//! Framework-neutral responses produced by handlers and by the gate.

use serde_json::Value;

/// HTTP status codes the gate produces.
pub mod status {
    /// 200 OK
    pub const OK: u16 = 200;
    /// 302 Found
    pub const FOUND: u16 = 302;
    /// 403 Forbidden
    pub const FORBIDDEN: u16 = 403;
    /// 500 Internal Server Error
    pub const INTERNAL_SERVER_ERROR: u16 = 500;
}

/// A response ready to be written by the HTTP layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// A JSON body with a status code.
    Json {
        /// HTTP status code
        status: u16,
        /// Response body
        body: Value,
    },
    /// A redirect with no body.
    Redirect {
        /// HTTP status code
        status: u16,
        /// Target of the `Location` header
        location: String,
    },
}

impl Response {
    /// Creates a JSON response.
    pub fn json(status: u16, body: Value) -> Self {
        Response::Json { status, body }
    }

    /// Creates a `302 Found` redirect.
    pub fn redirect(location: impl Into<String>) -> Self {
        Response::Redirect {
            status: status::FOUND,
            location: location.into(),
        }
    }

    /// Returns the status code.
    pub fn status(&self) -> u16 {
        match self {
            Response::Json { status, .. } | Response::Redirect { status, .. } => *status,
        }
    }

    /// Returns the JSON body, or `None` for redirects.
    pub fn json_body(&self) -> Option<&Value> {
        match self {
            Response::Json { body, .. } => Some(body),
            Response::Redirect { .. } => None,
        }
    }

    /// Returns the redirect target, or `None` for JSON responses.
    pub fn location(&self) -> Option<&str> {
        match self {
            Response::Redirect { location, .. } => Some(location),
            Response::Json { .. } => None,
        }
    }
}
