//! The access-control engine seam and the evaluation step.

use crate::error::EvaluationError;
use crate::evaluator::Evaluator;
use crate::web::{ReqContext, SignedInUser};

/// The external access-control engine.
///
/// The engine owns the process-wide disable switch and the matching of a
/// principal's granted permissions against a requirement. Retries, caching
/// and timeouts are its responsibility.
pub trait AccessControl: Send + Sync {
    /// Returns true when access control is switched off for the process.
    fn is_disabled(&self) -> bool;

    /// Decides whether `user` satisfies `evaluator`.
    ///
    /// `ctx` carries the request's cancellation state. An engine that
    /// observes [`ReqContext::is_cancelled`] or
    /// [`ReqContext::deadline_exceeded`] must return an error rather than a
    /// decision.
    ///
    /// # Errors
    ///
    /// Returns an [`EvaluationError`] when the engine cannot reach a
    /// decision.
    fn evaluate(
        &self,
        ctx: &ReqContext,
        user: &SignedInUser,
        evaluator: &dyn Evaluator,
    ) -> Result<bool, EvaluationError>;
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The principal may proceed.
    Granted,
    /// The engine decided the principal lacks the permission.
    Denied,
    /// The engine failed to decide.
    Failed(EvaluationError),
}

impl Decision {
    /// Returns true only for [`Decision::Granted`].
    pub fn is_granted(&self) -> bool {
        matches!(self, Decision::Granted)
    }

    /// Returns the engine error, if evaluation failed.
    pub fn error(&self) -> Option<&EvaluationError> {
        match self {
            Decision::Failed(err) => Some(err),
            Decision::Granted | Decision::Denied => None,
        }
    }
}

/// Asks the engine about an injected requirement for the request's user.
///
/// An error always wins over the boolean: an engine returning `Err` is
/// [`Decision::Failed`] regardless of anything else.
pub fn evaluate(ac: &dyn AccessControl, ctx: &ReqContext, evaluator: &dyn Evaluator) -> Decision {
    match ac.evaluate(ctx, ctx.user(), evaluator) {
        Ok(true) => Decision::Granted,
        Ok(false) => Decision::Denied,
        Err(err) => Decision::Failed(err),
    }
}
