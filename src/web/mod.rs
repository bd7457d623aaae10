//! Web framework integration surface.
//!
//! This module is the boundary between HTTP frameworks and the gate. It
//! contains no framework-specific code. Framework glue is expected to:
//! 1. Build a [`ReqContext`] after routing and identity resolution
//! 2. Call the guarded [`Handler`]
//! 3. Write the returned [`Response`] back to the client
//!
//! # Example Flow
//!
//! ```ignore
//! // In a framework-specific integration (e.g., axum, actix):
//! let mut ctx = ReqContext::new(request_id, req.uri().path(), signed_in_user);
//! for (name, value) in matched_path_params {
//!     ctx.add_url_param(name, value);
//! }
//! let response = guarded.handle(&ctx);
//! ```

mod context;
mod handler;
mod response;

pub use context::{ReqContext, SignedInUser};
pub use handler::Handler;
pub use response::{Response, status};
