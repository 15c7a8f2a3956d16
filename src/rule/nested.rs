//! Nested validator dispatch.
//!
//! A rule on a parent type recurses into a validator for the property's type
//! through the object-safe [`NestedValidator`] / [`AsyncNestedValidator`]
//! traits. The crate-private [`NestedDispatch`] adapters decide how the
//! property is walked (whole value, optional value, each item) and under which
//! prefix the nested results are merged.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::RuleError;
use crate::path::FieldPath;
use crate::result::ValidationResult;

/// A validator usable from async evaluation of a parent rule.
///
/// Implemented by every [`Validator`](crate::Validator). Implement it yourself
/// to plug a hand-written check into `set_validator_async`.
#[async_trait]
pub trait AsyncNestedValidator<C>: Send + Sync {
    /// Validates `instance`, returning one result per evaluated rule.
    async fn validate_async(
        &self,
        instance: &C,
        cancel: &CancellationToken,
    ) -> Result<Vec<ValidationResult>, RuleError>;
}

/// A validator usable from both sync and async evaluation of a parent rule.
///
/// Implemented by synchronous validators only, so an async-only validator
/// cannot be nested under a rule that may run synchronously.
pub trait NestedValidator<C>: AsyncNestedValidator<C> {
    /// Validates `instance`, returning one result per evaluated rule.
    fn validate(&self, instance: &C) -> Result<Vec<ValidationResult>, RuleError>;
}

/// A type-erased nested validator.
pub(crate) enum Delegate<C> {
    Full(Arc<dyn NestedValidator<C>>),
    AsyncOnly(Arc<dyn AsyncNestedValidator<C>>),
}

impl<C> Delegate<C>
where
    C: Sync,
{
    fn validate(&self, path: &FieldPath, value: &C) -> Result<Vec<ValidationResult>, RuleError> {
        match self {
            Delegate::Full(validator) => validator.validate(value),
            Delegate::AsyncOnly(_) => Err(RuleError::RequiresAsync { path: path.clone() }),
        }
    }

    async fn validate_async(
        &self,
        value: &C,
        cancel: &CancellationToken,
    ) -> Result<Vec<ValidationResult>, RuleError> {
        match self {
            Delegate::Full(validator) => validator.validate_async(value, cancel).await,
            Delegate::AsyncOnly(validator) => validator.validate_async(value, cancel).await,
        }
    }
}

/// How a property value is handed to a nested validator.
#[async_trait]
pub(crate) trait NestedDispatch<P: ?Sized>: Send + Sync {
    fn validate(
        &self,
        path: &FieldPath,
        value: &P,
        into: &mut ValidationResult,
    ) -> Result<(), RuleError>;

    async fn validate_async(
        &self,
        path: &FieldPath,
        value: &P,
        cancel: &CancellationToken,
        into: &mut ValidationResult,
    ) -> Result<(), RuleError>;
}

/// Validates the property as a single value, merged under the rule's path.
pub(crate) struct WholeValue<C>(pub(crate) Delegate<C>);

#[async_trait]
impl<C> NestedDispatch<C> for WholeValue<C>
where
    C: Sync + 'static,
{
    fn validate(
        &self,
        path: &FieldPath,
        value: &C,
        into: &mut ValidationResult,
    ) -> Result<(), RuleError> {
        into.merge_all(path, self.0.validate(path, value)?);
        Ok(())
    }

    async fn validate_async(
        &self,
        path: &FieldPath,
        value: &C,
        cancel: &CancellationToken,
        into: &mut ValidationResult,
    ) -> Result<(), RuleError> {
        into.merge_all(path, self.0.validate_async(value, cancel).await?);
        Ok(())
    }
}

/// Validates a present value; `None` is skipped.
pub(crate) struct OptionalValue<C>(pub(crate) Delegate<C>);

#[async_trait]
impl<C> NestedDispatch<Option<C>> for OptionalValue<C>
where
    C: Sync + 'static,
{
    fn validate(
        &self,
        path: &FieldPath,
        value: &Option<C>,
        into: &mut ValidationResult,
    ) -> Result<(), RuleError> {
        if let Some(value) = value {
            into.merge_all(path, self.0.validate(path, value)?);
        }
        Ok(())
    }

    async fn validate_async(
        &self,
        path: &FieldPath,
        value: &Option<C>,
        cancel: &CancellationToken,
        into: &mut ValidationResult,
    ) -> Result<(), RuleError> {
        if let Some(value) = value {
            into.merge_all(path, self.0.validate_async(value, cancel).await?);
        }
        Ok(())
    }
}

/// Validates every item, merging item `i` under `path[i]`.
pub(crate) struct EachItem<I>(pub(crate) Delegate<I>);

#[async_trait]
impl<I> NestedDispatch<[I]> for EachItem<I>
where
    I: Sync + 'static,
{
    fn validate(
        &self,
        path: &FieldPath,
        items: &[I],
        into: &mut ValidationResult,
    ) -> Result<(), RuleError> {
        for (index, item) in items.iter().enumerate() {
            into.merge_all(&path.push_index(index), self.0.validate(path, item)?);
        }
        Ok(())
    }

    async fn validate_async(
        &self,
        path: &FieldPath,
        items: &[I],
        cancel: &CancellationToken,
        into: &mut ValidationResult,
    ) -> Result<(), RuleError> {
        for (index, item) in items.iter().enumerate() {
            let nested = self.0.validate_async(item, cancel).await?;
            into.merge_all(&path.push_index(index), nested);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Child {
        name: String,
    }

    fn child(name: &str) -> Child {
        Child {
            name: name.to_string(),
        }
    }

    struct NameRequired;

    impl NameRequired {
        fn check(&self, child: &Child) -> Vec<ValidationResult> {
            let mut result = ValidationResult::new();
            if child.name.is_empty() {
                result.add_error(FieldPath::from_field("Name"), "required");
            }
            vec![result]
        }
    }

    #[async_trait]
    impl AsyncNestedValidator<Child> for NameRequired {
        async fn validate_async(
            &self,
            instance: &Child,
            _cancel: &CancellationToken,
        ) -> Result<Vec<ValidationResult>, RuleError> {
            Ok(self.check(instance))
        }
    }

    impl NestedValidator<Child> for NameRequired {
        fn validate(&self, instance: &Child) -> Result<Vec<ValidationResult>, RuleError> {
            Ok(self.check(instance))
        }
    }

    fn full() -> Delegate<Child> {
        Delegate::Full(Arc::new(NameRequired))
    }

    fn async_only() -> Delegate<Child> {
        Delegate::AsyncOnly(Arc::new(NameRequired))
    }

    fn rendered(result: &ValidationResult) -> Vec<String> {
        result.errors().iter().map(|e| e.path.to_string()).collect()
    }

    #[test]
    fn test_whole_value_prefixes_with_rule_path() {
        let dispatch = WholeValue(full());
        let mut result = ValidationResult::new();

        dispatch
            .validate(&FieldPath::from_field("Wife"), &child(""), &mut result)
            .unwrap();

        assert_eq!(rendered(&result), vec!["Wife.Name"]);
    }

    #[test]
    fn test_whole_value_at_root_keeps_nested_paths() {
        let dispatch = WholeValue(full());
        let mut result = ValidationResult::new();

        dispatch
            .validate(&FieldPath::root(), &child(""), &mut result)
            .unwrap();

        assert_eq!(rendered(&result), vec!["Name"]);
    }

    #[test]
    fn test_optional_value_skips_none() {
        let dispatch = OptionalValue(full());
        let path = FieldPath::from_field("Spouse");

        let mut result = ValidationResult::new();
        dispatch.validate(&path, &None, &mut result).unwrap();
        assert!(result.is_valid());

        dispatch.validate(&path, &Some(child("")), &mut result).unwrap();
        assert_eq!(rendered(&result), vec!["Spouse.Name"]);
    }

    #[test]
    fn test_each_item_indexes_paths() {
        let dispatch = EachItem(full());
        let children = vec![child("Bo"), child(""), child("")];
        let mut result = ValidationResult::new();

        dispatch
            .validate(&FieldPath::from_field("Children"), &children[..], &mut result)
            .unwrap();

        assert_eq!(
            rendered(&result),
            vec!["Children[1].Name", "Children[2].Name"]
        );
    }

    #[test]
    fn test_async_only_delegate_refuses_sync_path() {
        let dispatch = WholeValue(async_only());
        let mut result = ValidationResult::new();

        let err = dispatch
            .validate(&FieldPath::from_field("Wife"), &child(""), &mut result)
            .unwrap_err();

        assert!(matches!(err, RuleError::RequiresAsync { .. }));
    }

    #[tokio::test]
    async fn test_async_only_delegate_runs_async() {
        let dispatch = EachItem(async_only());
        let children = vec![child("")];
        let mut result = ValidationResult::new();

        dispatch
            .validate_async(
                &FieldPath::from_field("Children"),
                &children[..],
                &CancellationToken::new(),
                &mut result,
            )
            .await
            .unwrap();

        assert_eq!(rendered(&result), vec!["Children[0].Name"]);
    }
}
