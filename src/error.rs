use thiserror::Error;

/// Errors raised while substituting scope parameters into a requirement.
///
/// An injection failure means the requirement could not be made concrete
/// for this request. The gate answers it as an internal server error; it is
/// never treated as an access denial.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InjectionError {
    /// The template referenced a placeholder the resolver does not know.
    #[error("unknown scope placeholder '{{{placeholder}}}' in '{template}'")]
    UnknownPlaceholder {
        /// The placeholder name, without braces
        placeholder: String,
        /// The template being rendered
        template: String,
    },
    /// The template referenced a URL parameter the route did not match.
    #[error("url parameter '{name}' required by '{template}' is missing")]
    MissingUrlParam {
        /// The URL parameter name
        name: String,
        /// The template being rendered
        template: String,
    },
    /// An opening brace was never closed.
    #[error("unterminated placeholder in '{template}'")]
    UnterminatedPlaceholder {
        /// The template being rendered
        template: String,
    },
    /// A closing brace appeared without a matching opening brace.
    #[error("unmatched '}}' in '{template}'")]
    UnmatchedBrace {
        /// The template being rendered
        template: String,
    },
}

/// Errors reported by the access-control engine while evaluating.
///
/// The gate routes every variant to the denial handler. Callers never see
/// which variant occurred; only the error-level log record does.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// The engine failed internally (store lookup, cache, resolver).
    #[error("access control engine failure: {0}")]
    Engine(String),
    /// The request was cancelled before the engine finished.
    #[error("evaluation cancelled")]
    Cancelled,
    /// The request deadline passed before the engine finished.
    #[error("evaluation deadline exceeded")]
    DeadlineExceeded,
}

/// The random source could not produce bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("random source failure: {0}")]
pub struct RandomSourceError(pub String);

/// Errors raised while loading or validating [`GateConfig`](crate::GateConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("gate config io error: {0}")]
    Io(String),
    /// The config file is not valid TOML for the expected schema.
    #[error("gate config parse error: {0}")]
    Parse(String),
    /// The config parsed but holds an invalid value.
    #[error("invalid gate config: {0}")]
    Invalid(String),
}
