//! Per-rule validation outcomes.
//!
//! A [`Validator`](crate::Validator) returns one [`ValidationResult`] for every
//! rule it evaluated. [`ValidationReport`] adds whole-report queries on top of
//! that list.

use indexmap::IndexMap;
use serde_json::{json, Value};
use stillwater::prelude::*;
use stillwater::Validation;

use crate::error::{ValidationError, ValidationErrors};
use crate::path::FieldPath;

/// The errors one rule produced, in detection order.
///
/// A result is valid when it holds no errors. Nested validators produce
/// results of their own which are folded in with [`merge`](Self::merge),
/// prefixing every nested path.
///
/// # Example
///
/// ```rust
/// use inquest::{FieldPath, ValidationResult};
///
/// let mut nested = ValidationResult::new();
/// nested.add_error(FieldPath::from_field("Name"), "required");
///
/// let mut result = ValidationResult::new();
/// result.merge(&FieldPath::from_field("Wife"), nested);
///
/// assert!(!result.is_valid());
/// assert_eq!(result.errors()[0].path.to_string(), "Wife.Name");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Creates an empty (valid) result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no error has been recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the recorded errors in detection order.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Records an error at `path`.
    pub fn add_error(&mut self, path: FieldPath, message: impl Into<String>) {
        self.errors.push(ValidationError::new(path, message));
    }

    /// Appends every error of `other`, with `prefix` prepended to its path.
    pub fn merge(&mut self, prefix: &FieldPath, other: ValidationResult) {
        self.errors
            .extend(other.errors.into_iter().map(|error| error.prefixed(prefix)));
    }

    /// Merges each result of `others` in order under the same prefix.
    pub fn merge_all<I>(&mut self, prefix: &FieldPath, others: I)
    where
        I: IntoIterator<Item = ValidationResult>,
    {
        for other in others {
            self.merge(prefix, other);
        }
    }

    /// Consumes the result and returns its errors.
    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl Semigroup for ValidationResult {
    fn combine(mut self, other: Self) -> Self {
        self.errors.extend(other.errors);
        self
    }
}

/// Queries over the list of results returned by one evaluation.
///
/// Implemented for `[ValidationResult]`, so it is available on the
/// `Vec<ValidationResult>` that `validate`/`validate_async` return.
///
/// # Example
///
/// ```rust
/// use inquest::{rule_for, ValidationReport, Validator};
///
/// struct Signup { email: String }
///
/// let mut validator = Validator::<Signup>::new();
/// rule_for!(validator, email)
///     .unwrap()
///     .must(|email| email.contains('@'))
///     .message("must contain @");
///
/// let results = validator.validate(&Signup { email: "nope".into() }).unwrap();
/// assert!(!results.is_valid());
/// assert_eq!(results.by_path()["email"], vec!["must contain @"]);
/// ```
pub trait ValidationReport {
    /// Returns true if every result is valid.
    fn is_valid(&self) -> bool;

    /// Iterates over all errors of all results, in result order.
    fn errors(&self) -> Box<dyn Iterator<Item = &ValidationError> + '_>;

    /// Returns the total number of errors.
    fn error_count(&self) -> usize;

    /// Groups messages by rendered path, keeping first-seen path order.
    fn by_path(&self) -> IndexMap<String, Vec<&str>>;

    /// Renders the report as `{"valid": bool, "errors": [{"path", "message"}]}`.
    fn to_json(&self) -> Value;

    /// Returns `Err` with every error if any result is invalid.
    fn ensure_valid(&self) -> Result<(), ValidationErrors>;

    /// Returns the report as a stillwater `Validation`.
    fn to_validation(&self) -> Validation<(), ValidationErrors>;
}

impl ValidationReport for [ValidationResult] {
    fn is_valid(&self) -> bool {
        self.iter().all(ValidationResult::is_valid)
    }

    fn errors(&self) -> Box<dyn Iterator<Item = &ValidationError> + '_> {
        Box::new(self.iter().flat_map(|result| result.errors().iter()))
    }

    fn error_count(&self) -> usize {
        self.iter().map(|result| result.errors().len()).sum()
    }

    fn by_path(&self) -> IndexMap<String, Vec<&str>> {
        let mut grouped: IndexMap<String, Vec<&str>> = IndexMap::new();
        for error in self.errors() {
            grouped
                .entry(error.path.to_string())
                .or_default()
                .push(error.message.as_str());
        }
        grouped
    }

    fn to_json(&self) -> Value {
        let errors: Vec<Value> = self
            .errors()
            .map(|error| {
                json!({
                    "path": error.path.to_string(),
                    "message": error.message,
                })
            })
            .collect();

        json!({
            "valid": errors.is_empty(),
            "errors": errors,
        })
    }

    fn ensure_valid(&self) -> Result<(), ValidationErrors> {
        match ValidationErrors::from_vec(self.errors().cloned().collect()) {
            Some(errors) => Err(errors),
            None => Ok(()),
        }
    }

    fn to_validation(&self) -> Validation<(), ValidationErrors> {
        Validation::from_result(self.ensure_valid())
    }
}
