//! Errors that abort rule registration or evaluation.
//!
//! These never describe invalid data. Invalid data is reported as
//! [`ValidationError`](crate::ValidationError)s inside a successful evaluation.

use crate::path::FieldPath;

/// Boxed error produced by a fallible caller-supplied closure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while registering rules.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The property name is neither empty nor a plain member identifier.
    #[error("invalid property path '{0}': expected an identifier or an empty path")]
    InvalidPropertyPath(String),

    /// A pattern given to a string rule is not a valid regular expression.
    #[error("invalid pattern '{pattern}'")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// The parser error.
        #[source]
        source: regex::Error,
    },
}

/// Errors that stop an evaluation before it completes.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// The cancellation token fired before or during evaluation.
    #[error("validation was cancelled")]
    Cancelled,

    /// A caller-supplied condition failed to produce an answer.
    #[error("rule for '{path}' failed to evaluate")]
    Predicate {
        /// Path of the rule whose condition failed.
        path: FieldPath,
        /// The error returned by the condition.
        #[source]
        source: BoxError,
    },

    /// An async-only rule was reached through synchronous evaluation.
    #[error("rule for '{path}' is asynchronous and requires validate_async")]
    RequiresAsync {
        /// Path of the async rule.
        path: FieldPath,
    },
}

impl RuleError {
    /// Returns true if this error is a cancellation signal.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RuleError::Cancelled)
    }

    pub(crate) fn predicate(path: &FieldPath, source: impl Into<BoxError>) -> Self {
        RuleError::Predicate {
            path: path.clone(),
            source: source.into(),
        }
    }
}
