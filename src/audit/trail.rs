//! Audit sinks.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::AccessEvent;

/// Destination for access events.
///
/// Sinks are shared by every request the gate handles, so they must be safe
/// to call concurrently.
pub trait AuditSink: Send + Sync {
    /// Records one event.
    fn record(&self, event: AccessEvent);
}

/// In-memory recorder for access events.
///
/// Useful for tests and for hosts that forward events in batches. A
/// persistent audit log would implement [`AuditSink`] itself.
///
/// # Example
///
/// ```
/// use access_gate::audit::{AccessEvent, AccessOutcome, AuditSink, AuditTrail};
///
/// let trail = AuditTrail::new();
/// trail.record(AccessEvent::new("req-123", 1, 1, AccessOutcome::Denied));
///
/// assert_eq!(trail.events().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct AuditTrail {
    events: Mutex<Vec<AccessEvent>>,
}

impl AuditTrail {
    /// Creates a new empty audit trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded events, oldest first.
    pub fn events(&self) -> Vec<AccessEvent> {
        self.lock().clone()
    }

    /// Returns the number of recorded events.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Clears all recorded events.
    pub fn clear(&self) {
        self.lock().clear();
    }

    // A panic while holding the lock cannot leave the Vec half-written.
    fn lock(&self) -> MutexGuard<'_, Vec<AccessEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AuditSink for AuditTrail {
    fn record(&self, event: AccessEvent) {
        self.lock().push(event);
    }
}
