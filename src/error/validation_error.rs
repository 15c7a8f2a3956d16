//! Validation failure types.
//!
//! This module provides [`ValidationError`] for a single failed rule and
//! [`ValidationErrors`] for a non-empty collection of them.

use std::fmt::{self, Display};

use stillwater::prelude::*;

use crate::path::FieldPath;

/// A single validation failure tied to a field path.
///
/// `ValidationError` is immutable once created: it records **where** the
/// failing value lives, the property of the rule that reported it, and the
/// resolved message.
///
/// For errors coming out of a nested validator, `property` names the rule of
/// the outermost validator (`Children` for `Children[2].Name`), which is what
/// form bindings usually key on. It is empty when that rule targets the whole
/// instance.
///
/// # Example
///
/// ```rust
/// use inquest::{FieldPath, ValidationError};
///
/// let error = ValidationError::new(
///     FieldPath::from_field("Email"),
///     "Email already exists.",
/// );
///
/// assert_eq!(error.path.to_string(), "Email");
/// assert_eq!(error.property, "Email");
/// assert_eq!(error.to_string(), "Email: Email already exists.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The path to the value that failed validation.
    pub path: FieldPath,
    /// Property name of the top-level rule that reported the error.
    pub property: String,
    /// Human-readable error message.
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error with the given path and message.
    ///
    /// The property is the leading member of `path`.
    pub fn new(path: FieldPath, message: impl Into<String>) -> Self {
        let property = path.head().unwrap_or_default().to_string();
        Self {
            path,
            property,
            message: message.into(),
        }
    }

    /// Moves this error under `prefix`, the path of an enclosing rule.
    ///
    /// The property becomes the enclosing rule's own property.
    pub fn prefixed(self, prefix: &FieldPath) -> Self {
        Self {
            path: prefix.join(&self.path),
            property: prefix.head().unwrap_or_default().to_string(),
            message: self.message,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationError>();
    assert_sync::<ValidationError>();
};

/// A non-empty collection of validation errors.
///
/// `ValidationErrors` is what an invalid instance turns into when the caller
/// wants a single error value (for `?` propagation or `Validation` chaining).
/// It wraps a `NonEmptyVec<ValidationError>` so a failure always carries at
/// least one error.
///
/// # Combining Errors
///
/// ```rust
/// use inquest::{FieldPath, ValidationError, ValidationErrors};
/// use stillwater::prelude::*;
///
/// let name = ValidationErrors::single(
///     ValidationError::new(FieldPath::from_field("Name"), "required")
/// );
/// let email = ValidationErrors::single(
///     ValidationError::new(FieldPath::from_field("Email"), "invalid format")
/// );
///
/// assert_eq!(name.combine(email).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(NonEmptyVec<ValidationError>);

impl ValidationErrors {
    /// Creates a `ValidationErrors` containing a single error.
    pub fn single(error: ValidationError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Creates a `ValidationErrors` from a `NonEmptyVec` of errors.
    pub fn from_non_empty(errors: NonEmptyVec<ValidationError>) -> Self {
        Self(errors)
    }

    /// Creates a `ValidationErrors` from a `Vec`, or `None` if it is empty.
    pub fn from_vec(errors: Vec<ValidationError>) -> Option<Self> {
        NonEmptyVec::from_vec(errors).map(Self)
    }

    /// Returns the number of errors in this collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the collection is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the contained errors.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Returns all errors at the specified path.
    pub fn at_path(&self, path: &FieldPath) -> Vec<&ValidationError> {
        self.0.iter().filter(|e| &e.path == path).collect()
    }

    /// Returns the first error in the collection.
    pub fn first(&self) -> &ValidationError {
        self.0.head()
    }

    /// Converts this collection into a `Vec<ValidationError>`.
    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0.into_vec()
    }
}

impl Semigroup for ValidationErrors {
    fn combine(self, other: Self) -> Self {
        ValidationErrors(self.0.combine(other.0))
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} error(s):", self.len())?;
        for (i, error) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationErrors>();
    assert_sync::<ValidationErrors>();
};

#[cfg(test)]
mod tests {
    use super::*;

    fn error(field: &str, message: &str) -> ValidationError {
        ValidationError::new(FieldPath::from_field(field), message)
    }

    #[test]
    fn test_validation_error_display() {
        assert_eq!(error("Email", "invalid").to_string(), "Email: invalid");
        assert_eq!(
            ValidationError::new(FieldPath::root(), "bad instance").to_string(),
            "(root): bad instance"
        );
    }

    #[test]
    fn test_prefixed_keeps_message() {
        let nested = error("Name", "required");
        assert_eq!(nested.property, "Name");

        let moved = nested.prefixed(&FieldPath::from_field("Children").push_index(3));
        assert_eq!(moved.path.to_string(), "Children[3].Name");
        assert_eq!(moved.property, "Children");
        assert_eq!(moved.message, "required");
    }

    #[test]
    fn test_root_prefix_clears_property() {
        let moved = error("Name", "required").prefixed(&FieldPath::root());
        assert_eq!(moved.path.to_string(), "Name");
        assert_eq!(moved.property, "");
    }

    #[test]
    fn test_from_vec_rejects_empty() {
        assert!(ValidationErrors::from_vec(Vec::new()).is_none());
        let errors = ValidationErrors::from_vec(vec![error("a", "1"), error("b", "2")]).unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.first().message, "1");
    }

    #[test]
    fn test_at_path() {
        let errors = ValidationErrors::single(error("a", "1"))
            .combine(ValidationErrors::single(error("a", "2")))
            .combine(ValidationErrors::single(error("b", "3")));

        assert_eq!(errors.at_path(&FieldPath::from_field("a")).len(), 2);
        assert_eq!(errors.at_path(&FieldPath::from_field("b")).len(), 1);
    }

    #[test]
    fn test_display_lists_every_error() {
        let errors = ValidationErrors::single(error("Name", "required"))
            .combine(ValidationErrors::single(error("Email", "invalid")));
        let display = errors.to_string();

        assert!(display.contains("2 error(s)"));
        assert!(display.contains("1. Name: required"));
        assert!(display.contains("2. Email: invalid"));
    }

    #[test]
    fn test_combine_preserves_order() {
        let left = ValidationErrors::single(error("x", "1"))
            .combine(ValidationErrors::single(error("x", "2")))
            .combine(ValidationErrors::single(error("x", "3")));
        let messages: Vec<_> = left.into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["1", "2", "3"]);
    }
}
