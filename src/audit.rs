//! Audit records of gate decisions.
//!
//! This module provides:
//! - `AccessEvent`: Structured record of a denied or failed request
//! - `AuditSink`: Destination for access events
//! - `AuditTrail`: Thread-safe in-memory sink
//!
//! Events follow the same information rules as the gate's logs: the
//! requirement description is only recorded for plain denials, never for
//! engine errors.

mod event;
mod trail;

pub use event::{AccessEvent, AccessOutcome};
pub use trail::{AuditSink, AuditTrail};
