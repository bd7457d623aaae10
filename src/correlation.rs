//! Access error identifiers.
//!
//! Every denial gets an id that is shown to the user and written to the log
//! record for the same event, so an operator can find the server-side entry
//! behind a user's report. Ids are digits only, which reads back over the
//! phone or in a screenshot with less ambiguity than alphanumerics.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::RandomSourceError;

/// Prefix of every access error id.
pub const ACCESS_ERROR_ID_PREFIX: &str = "ACE";
/// Number of random digits following the prefix.
pub const ACCESS_ERROR_ID_DIGITS: usize = 10;

/// Upper bound on refills when the source keeps yielding rejected bytes.
const MAX_FILL_ROUNDS: usize = 8;
/// Bytes at or above this value are rejected to keep digits unbiased.
const DIGIT_REJECTION_BOUND: u8 = 250;

/// A source of random bytes.
///
/// Must be safe to call from many request threads at once.
pub trait RandomSource: Send + Sync {
    /// Fills `dest` with random bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RandomSourceError`] when no bytes could be produced.
    fn try_fill(&self, dest: &mut [u8]) -> Result<(), RandomSourceError>;
}

/// The operating system's random source.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn try_fill(&self, dest: &mut [u8]) -> Result<(), RandomSourceError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|err| RandomSourceError(err.to_string()))
    }
}

/// Generator for access error ids.
///
/// # Examples
///
/// ```
/// use access_gate::CorrelationIdGenerator;
///
/// let id = CorrelationIdGenerator::new().new_id();
/// assert!(id.starts_with("ACE"));
/// assert_eq!(id.len(), 13);
/// ```
#[derive(Clone)]
pub struct CorrelationIdGenerator {
    source: Arc<dyn RandomSource>,
}

impl CorrelationIdGenerator {
    /// Creates a generator backed by [`OsRandom`].
    pub fn new() -> Self {
        Self::with_source(Arc::new(OsRandom))
    }

    /// Creates a generator backed by `source`.
    pub fn with_source(source: Arc<dyn RandomSource>) -> Self {
        Self { source }
    }

    /// Returns a new id: the prefix and ten random digits.
    ///
    /// If the random source fails, the digits are the current Unix time in
    /// nanoseconds instead. The id is never empty and always carries the
    /// prefix. Uniqueness is best effort.
    pub fn new_id(&self) -> String {
        let digits = match random_digits(self.source.as_ref(), ACCESS_ERROR_ID_DIGITS) {
            Ok(digits) => digits,
            Err(err) => {
                tracing::debug!(error = %err, "random source failed, using timestamp for access error id");
                timestamp_digits()
            }
        };
        format!("{ACCESS_ERROR_ID_PREFIX}{digits}")
    }
}

impl Default for CorrelationIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns a new id from the operating system's random source.
pub fn new_id() -> String {
    CorrelationIdGenerator::new().new_id()
}

fn random_digits(source: &dyn RandomSource, len: usize) -> Result<String, RandomSourceError> {
    let mut out = String::with_capacity(len);
    let mut buf = [0u8; 16];

    for _ in 0..MAX_FILL_ROUNDS {
        source.try_fill(&mut buf)?;
        for byte in buf {
            if byte < DIGIT_REJECTION_BOUND {
                out.push(char::from(b'0' + byte % 10));
                if out.len() == len {
                    return Ok(out);
                }
            }
        }
    }

    Err(RandomSourceError(
        "random source yielded too few usable bytes".to_string(),
    ))
}

fn timestamp_digits() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default()
        .to_string()
}
