//! Ready-made conditions for common property checks.
//!
//! Each helper registers one rule with a descriptive message such as
//! `"5 is not greater than 10"`. The message is a fallback: a `message*` call
//! right after the helper replaces it.
//!
//! # Example
//!
//! ```rust
//! use inquest::{rule_for, ComparisonRules, StringRules, ValidationReport, Validator};
//!
//! struct Item { price: f64, sku: String }
//!
//! let mut validator = Validator::<Item>::new();
//! rule_for!(validator, price).unwrap().greater_than(0.0).less_than(1000.0);
//! rule_for!(validator, sku).unwrap().not_empty().message("sku is required");
//!
//! let item = Item { price: -1.5, sku: String::new() };
//! let results = validator.validate(&item).unwrap();
//! assert_eq!(results.by_path()["price"], vec!["-1.5 is not greater than 0"]);
//! assert_eq!(results.by_path()["sku"], vec!["sku is required"]);
//! ```

use std::fmt::Display;

use regex::Regex;

use crate::builder::{CollectionRuleBuilder, RuleBuilder};
use crate::error::ConfigError;
use crate::validator::RuleKind;

/// Ordering checks for numeric (or otherwise ordered) properties.
pub trait ComparisonRules<P>: Sized {
    /// Fails unless the value is strictly greater than `bound`.
    fn greater_than(self, bound: P) -> Self;

    /// Fails unless `value >= bound`.
    fn greater_than_or_equal(self, bound: P) -> Self;

    /// Fails unless the value is strictly less than `bound`.
    fn less_than(self, bound: P) -> Self;

    /// Fails unless `value <= bound`.
    fn less_than_or_equal(self, bound: P) -> Self;

    /// Fails unless the value equals `expected`.
    fn equal_to(self, expected: P) -> Self;

    /// Fails unless `min <= value <= max`.
    fn between(self, min: P, max: P) -> Self;

    /// Fails unless the value is greater than `P::default()`.
    fn is_positive(self) -> Self;

    /// Fails unless the value is less than `P::default()`.
    fn is_negative(self) -> Self;
}

impl<'v, T, P, K> ComparisonRules<P> for RuleBuilder<'v, T, P, K>
where
    T: Sync + 'static,
    P: PartialOrd + Display + Clone + Default + Send + Sync + 'static,
    K: RuleKind,
{
    fn greater_than(self, bound: P) -> Self {
        let shown = bound.clone();
        self.must_with_default_message(
            move |value, _| *value > bound,
            move |value, _| format!("{} is not greater than {}", value, shown),
        )
    }

    fn greater_than_or_equal(self, bound: P) -> Self {
        let shown = bound.clone();
        self.must_with_default_message(
            move |value, _| *value >= bound,
            move |value, _| format!("{} is not greater than or equal to {}", value, shown),
        )
    }

    fn less_than(self, bound: P) -> Self {
        let shown = bound.clone();
        self.must_with_default_message(
            move |value, _| *value < bound,
            move |value, _| format!("{} is not less than {}", value, shown),
        )
    }

    fn less_than_or_equal(self, bound: P) -> Self {
        let shown = bound.clone();
        self.must_with_default_message(
            move |value, _| *value <= bound,
            move |value, _| format!("{} is not less than or equal to {}", value, shown),
        )
    }

    fn equal_to(self, expected: P) -> Self {
        let shown = expected.clone();
        self.must_with_default_message(
            move |value, _| *value == expected,
            move |value, _| format!("{} is not equal to {}", value, shown),
        )
    }

    fn between(self, min: P, max: P) -> Self {
        let (shown_min, shown_max) = (min.clone(), max.clone());
        self.must_with_default_message(
            move |value, _| *value >= min && *value <= max,
            move |value, _| format!("{} is not between {} and {}", value, shown_min, shown_max),
        )
    }

    fn is_positive(self) -> Self {
        self.must_with_default_message(
            |value, _| *value > P::default(),
            |value, _| format!("{} is not positive", value),
        )
    }

    fn is_negative(self) -> Self {
        self.must_with_default_message(
            |value, _| *value < P::default(),
            |value, _| format!("{} is not negative", value),
        )
    }
}

/// Membership checks against a fixed set of values.
pub trait ChoiceRules<P>: Sized {
    /// Fails unless the value is one of `allowed`.
    fn is_one_of<I>(self, allowed: I) -> Self
    where
        I: IntoIterator<Item = P>;

    /// Fails if the value is one of `disallowed`.
    fn is_not_one_of<I>(self, disallowed: I) -> Self
    where
        I: IntoIterator<Item = P>;
}

impl<'v, T, P, K> ChoiceRules<P> for RuleBuilder<'v, T, P, K>
where
    T: Sync + 'static,
    P: PartialEq + Display + Send + Sync + 'static,
    K: RuleKind,
{
    fn is_one_of<I>(self, allowed: I) -> Self
    where
        I: IntoIterator<Item = P>,
    {
        let allowed: Vec<P> = allowed.into_iter().collect();
        self.must_with_default_message(
            move |value, _| allowed.contains(value),
            |value, _| format!("{} is not an allowed value", value),
        )
    }

    fn is_not_one_of<I>(self, disallowed: I) -> Self
    where
        I: IntoIterator<Item = P>,
    {
        let disallowed: Vec<P> = disallowed.into_iter().collect();
        self.must_with_default_message(
            move |value, _| !disallowed.contains(value),
            |value, _| format!("{} is an unallowed value", value),
        )
    }
}

/// Checks for string properties. Lengths count `char`s.
pub trait StringRules: Sized {
    /// Fails if the string is empty. Whitespace counts as content.
    fn not_empty(self) -> Self;

    /// Fails if the string is empty or only whitespace.
    fn not_blank(self) -> Self;

    /// Fails if the string has fewer than `min` chars.
    fn min_len(self, min: usize) -> Self;

    /// Fails if the string has more than `max` chars.
    fn max_len(self, max: usize) -> Self;

    /// Fails unless the char count is within `min..=max`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::{rule_for, StringRules, ValidationReport, Validator};
    ///
    /// struct Pin { code: String }
    ///
    /// let mut validator = Validator::<Pin>::new();
    /// rule_for!(validator, code).unwrap().len_between(4, 6);
    ///
    /// let results = validator.validate(&Pin { code: "123".into() }).unwrap();
    /// assert_eq!(results.by_path()["code"], vec!["123 must be between 4 and 6 characters"]);
    /// ```
    fn len_between(self, min: usize, max: usize) -> Self;

    /// Fails unless the string contains `needle`.
    fn contains(self, needle: impl Into<String>) -> Self;

    /// Fails unless the string starts with `prefix`.
    fn starts_with(self, prefix: impl Into<String>) -> Self;

    /// Fails unless the string ends with `suffix`.
    fn ends_with(self, suffix: impl Into<String>) -> Self;

    /// Fails unless the string matches the regular expression `pattern`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPattern` if `pattern` does not compile.
    fn matches(self, pattern: &str) -> Result<Self, ConfigError>;
}

impl<'v, T, P, K> StringRules for RuleBuilder<'v, T, P, K>
where
    T: Sync + 'static,
    P: AsRef<str> + ?Sized + Sync + 'static,
    K: RuleKind,
{
    fn not_empty(self) -> Self {
        self.must_with_default_message(
            |value, _| !value.as_ref().is_empty(),
            |_, _| "must not be empty".to_string(),
        )
    }

    fn not_blank(self) -> Self {
        self.must_with_default_message(
            |value, _| !value.as_ref().trim().is_empty(),
            |_, _| "must not be blank".to_string(),
        )
    }

    fn min_len(self, min: usize) -> Self {
        self.must_with_default_message(
            move |value, _| value.as_ref().chars().count() >= min,
            move |value, _| format!("{} is below the min length {}", value.as_ref(), min),
        )
    }

    fn max_len(self, max: usize) -> Self {
        self.must_with_default_message(
            move |value, _| value.as_ref().chars().count() <= max,
            move |value, _| format!("{} is above the max length {}", value.as_ref(), max),
        )
    }

    fn len_between(self, min: usize, max: usize) -> Self {
        self.must_with_default_message(
            move |value, _| (min..=max).contains(&value.as_ref().chars().count()),
            move |value, _| {
                format!(
                    "{} must be between {} and {} characters",
                    value.as_ref(),
                    min,
                    max
                )
            },
        )
    }

    fn contains(self, needle: impl Into<String>) -> Self {
        let needle = needle.into();
        let shown = needle.clone();
        self.must_with_default_message(
            move |value, _| value.as_ref().contains(needle.as_str()),
            move |value, _| format!("'{}' must contain '{}'", value.as_ref(), shown),
        )
    }

    fn starts_with(self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let shown = prefix.clone();
        self.must_with_default_message(
            move |value, _| value.as_ref().starts_with(prefix.as_str()),
            move |value, _| format!("'{}' must start with '{}'", value.as_ref(), shown),
        )
    }

    fn ends_with(self, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        let shown = suffix.clone();
        self.must_with_default_message(
            move |value, _| value.as_ref().ends_with(suffix.as_str()),
            move |value, _| format!("'{}' must end with '{}'", value.as_ref(), shown),
        )
    }

    fn matches(self, pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        let shown = pattern.to_string();
        Ok(self.must_with_default_message(
            move |value, _| regex.is_match(value.as_ref()),
            move |value, _| {
                format!(
                    "'{}' does not match the expected pattern: '{}'",
                    value.as_ref(),
                    shown
                )
            },
        ))
    }
}

/// Size checks for collection properties.
pub trait CollectionRules: Sized {
    /// Fails if the collection has no items.
    fn not_empty(self) -> Self;

    /// Fails if the collection has fewer than `count` items.
    fn has_at_least(self, count: usize) -> Self;
}

impl<'v, T, I, K> CollectionRules for CollectionRuleBuilder<'v, T, I, K>
where
    T: Sync + 'static,
    I: Sync + 'static,
    K: RuleKind,
{
    fn not_empty(self) -> Self {
        self.must_with_default_message(
            |items, _| !items.is_empty(),
            |_, _| "Collection must contain at least one element".to_string(),
        )
    }

    fn has_at_least(self, count: usize) -> Self {
        self.must_with_default_message(
            move |items, _| items.len() >= count,
            move |_, _| format!("Collection must contain at least {} elements", count),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ValidationReport;
    use crate::{rule_for, rules_for, Validator};

    struct Reading {
        value: i32,
    }

    fn messages(validator: &Validator<Reading>, value: i32) -> Vec<String> {
        validator
            .validate(&Reading { value })
            .unwrap()
            .errors()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn test_comparison_messages() {
        let mut validator = Validator::<Reading>::new();
        rule_for!(validator, value)
            .unwrap()
            .greater_than(10)
            .is_negative();

        assert_eq!(
            messages(&validator, 5),
            vec!["value: 5 is not greater than 10", "value: 5 is not negative"]
        );
        assert_eq!(messages(&validator, 11), vec!["value: 11 is not negative"]);
    }

    #[test]
    fn test_between_is_inclusive() {
        let mut validator = Validator::<Reading>::new();
        rule_for!(validator, value).unwrap().between(1, 3);

        assert!(messages(&validator, 1).is_empty());
        assert!(messages(&validator, 3).is_empty());
        assert_eq!(messages(&validator, 4), vec!["value: 4 is not between 1 and 3"]);
    }

    #[test]
    fn test_custom_message_replaces_fallback() {
        let mut validator = Validator::<Reading>::new();
        rule_for!(validator, value)
            .unwrap()
            .is_positive()
            .message("must be positive")
            .less_than_or_equal(100);

        assert_eq!(messages(&validator, 0), vec!["value: must be positive"]);
        assert_eq!(
            messages(&validator, 101),
            vec!["value: 101 is not less than or equal to 100"]
        );
    }

    #[test]
    fn test_choice_rules() {
        let mut validator = Validator::<Reading>::new();
        rule_for!(validator, value)
            .unwrap()
            .is_one_of([1, 2, 3])
            .is_not_one_of(vec![2]);

        assert!(messages(&validator, 1).is_empty());
        assert_eq!(messages(&validator, 2), vec!["value: 2 is an unallowed value"]);
        assert_eq!(messages(&validator, 9), vec!["value: 9 is not an allowed value"]);
    }

    struct Profile {
        handle: String,
        tags: Vec<String>,
    }

    fn profile(handle: &str, tags: &[&str]) -> Profile {
        Profile {
            handle: handle.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_string_rules() {
        let mut validator = Validator::<Profile>::new();
        rule_for!(validator, handle)
            .unwrap()
            .min_len(3)
            .max_len(8)
            .starts_with("@")
            .matches("^@[a-z]+$")
            .unwrap();

        let results = validator.validate(&profile("@ann", &[])).unwrap();
        assert!(results.is_valid());

        let results = validator.validate(&profile("x", &[])).unwrap();
        let grouped = results.by_path();
        assert_eq!(
            grouped["handle"],
            vec![
                "x is below the min length 3",
                "'x' must start with '@'",
                "'x' does not match the expected pattern: '^@[a-z]+$'",
            ]
        );
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let mut validator = Validator::<Profile>::new();
        let err = rule_for!(validator, handle)
            .unwrap()
            .matches("(unclosed")
            .err()
            .unwrap();

        assert!(matches!(
            err,
            ConfigError::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"
        ));
    }

    #[test]
    fn test_collection_rules() {
        let mut validator = Validator::<Profile>::new();
        rules_for!(validator, tags).unwrap().not_empty().has_at_least(2);

        let results = validator.validate(&profile("@ann", &[])).unwrap();
        assert_eq!(
            results.by_path()["tags"],
            vec![
                "Collection must contain at least one element",
                "Collection must contain at least 2 elements",
            ]
        );

        let results = validator.validate(&profile("@ann", &["a", "b"])).unwrap();
        assert!(results.is_valid());
    }
}
