//! Error types.
//!
//! Validation failures ([`ValidationError`], [`ValidationErrors`]) are data;
//! [`ConfigError`] and [`RuleError`] are the errors that abort registration
//! or evaluation.

mod rule_error;
mod validation_error;

pub use rule_error::{BoxError, ConfigError, RuleError};
pub use validation_error::{ValidationError, ValidationErrors};
