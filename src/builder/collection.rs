//! Fluent rule construction for collection properties.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::cascade::CascadeMode;
use crate::error::BoxError;
use crate::path::FieldPath;
use crate::rule::{AsyncNestedValidator, Delegate, EachItem, NestedValidator};
use crate::validator::{AsyncRules, RuleKind};

use super::RuleBuilder;

/// Builds the rules of a collection property.
///
/// Conditions see the whole collection as a slice.
/// [`set_validator`](Self::set_validator) validates each item instead,
/// reporting item `i` under `Path[i]`.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use inquest::{rule_for, rules_for, ValidationReport, Validator};
///
/// struct Child { name: String }
/// struct Parent { children: Vec<Child> }
///
/// let mut child = Validator::<Child>::new();
/// rule_for!(child, name)
///     .unwrap()
///     .must(|name| !name.is_empty())
///     .message("name is required");
///
/// let mut parent = Validator::<Parent>::new();
/// rules_for!(parent, children)
///     .unwrap()
///     .must(|children| children.len() <= 3)
///     .set_validator(Arc::new(child));
///
/// let family = Parent {
///     children: vec![Child { name: "Bo".into() }, Child { name: String::new() }],
/// };
/// let results = parent.validate(&family).unwrap();
/// assert_eq!(results.by_path()["children[1].name"], vec!["name is required"]);
/// ```
pub struct CollectionRuleBuilder<'v, T, I, K = crate::validator::SyncRules> {
    inner: RuleBuilder<'v, T, [I], K>,
}

impl<'v, T, I, K> CollectionRuleBuilder<'v, T, I, K>
where
    T: Sync + 'static,
    I: Sync + 'static,
    K: RuleKind,
{
    pub(crate) fn new(inner: RuleBuilder<'v, T, [I], K>) -> Self {
        Self { inner }
    }

    /// Returns the path this builder's rules report under.
    pub fn path(&self) -> &FieldPath {
        self.inner.path()
    }

    /// Adds a rule over the whole collection.
    pub fn must<F>(self, condition: F) -> Self
    where
        F: Fn(&[I]) -> bool + Send + Sync + 'static,
    {
        Self::new(self.inner.must(condition))
    }

    /// Adds a rule over the whole collection and the instance.
    pub fn must_with<F>(self, condition: F) -> Self
    where
        F: Fn(&[I], &T) -> bool + Send + Sync + 'static,
    {
        Self::new(self.inner.must_with(condition))
    }

    /// Adds a rule over the collection whose condition may fail.
    pub fn try_must<F, E>(self, condition: F) -> Self
    where
        F: Fn(&[I], &T) -> Result<bool, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self::new(self.inner.try_must(condition))
    }

    pub(crate) fn must_with_default_message<F, M>(self, condition: F, render: M) -> Self
    where
        F: Fn(&[I], &T) -> bool + Send + Sync + 'static,
        M: Fn(&[I], &T) -> String + Send + Sync + 'static,
    {
        Self::new(self.inner.must_with_default_message(condition, render))
    }

    /// Sets the message of the oldest rule in the chain that has none yet.
    pub fn message(self, message: impl Into<String>) -> Self {
        Self::new(self.inner.message(message))
    }

    /// Like [`message`](Self::message), rendered from the collection.
    pub fn message_for<F>(self, render: F) -> Self
    where
        F: Fn(&[I]) -> String + Send + Sync + 'static,
    {
        Self::new(self.inner.message_for(render))
    }

    /// Like [`message`](Self::message), rendered from the collection and the
    /// instance.
    pub fn message_with<F>(self, render: F) -> Self
    where
        F: Fn(&[I], &T) -> String + Send + Sync + 'static,
    {
        Self::new(self.inner.message_with(render))
    }

    /// Like [`message`](Self::message), rendered each time the rule fails.
    pub fn message_lazy<F>(self, render: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self::new(self.inner.message_lazy(render))
    }

    /// Guards the rules added since the last guard, see [`RuleBuilder::when`].
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::new(self.inner.when(predicate))
    }

    /// Overrides the validator's cascade mode for this property.
    pub fn cascade(self, mode: CascadeMode) -> Self {
        Self::new(self.inner.cascade(mode))
    }

    /// Validates every item with `validator`.
    pub fn set_validator<V>(self, validator: Arc<V>) -> Self
    where
        V: NestedValidator<I> + 'static,
    {
        Self::new(
            self.inner
                .push_nested(Box::new(EachItem(Delegate::Full(validator)))),
        )
    }
}

impl<'v, T, I> CollectionRuleBuilder<'v, T, I, AsyncRules>
where
    T: Sync + 'static,
    I: Sync + 'static,
{
    /// Adds an asynchronous rule over the whole collection.
    pub fn must_async<F>(self, condition: F) -> Self
    where
        F: for<'a> Fn(&'a [I], &'a CancellationToken) -> BoxFuture<'a, bool>
            + Send
            + Sync
            + 'static,
    {
        Self::new(self.inner.must_async(condition))
    }

    /// Adds an asynchronous rule over the collection and the instance.
    pub fn must_async_with<F>(self, condition: F) -> Self
    where
        F: for<'a> Fn(&'a [I], &'a T, &'a CancellationToken) -> BoxFuture<'a, bool>
            + Send
            + Sync
            + 'static,
    {
        Self::new(self.inner.must_async_with(condition))
    }

    /// Adds an asynchronous rule whose condition may fail. An `Err` aborts
    /// validation with `RuleError::Predicate`.
    pub fn try_must_async<F>(self, condition: F) -> Self
    where
        F: for<'a> Fn(
                &'a [I],
                &'a T,
                &'a CancellationToken,
            ) -> BoxFuture<'a, Result<bool, BoxError>>
            + Send
            + Sync
            + 'static,
    {
        Self::new(self.inner.try_must_async(condition))
    }

    /// Guards the rules added since the last guard with an asynchronous
    /// predicate.
    pub fn when_async<F>(self, predicate: F) -> Self
    where
        F: for<'a> Fn(&'a T, &'a CancellationToken) -> BoxFuture<'a, bool> + Send + Sync + 'static,
    {
        Self::new(self.inner.when_async(predicate))
    }

    /// Validates every item with a validator that may only run asynchronously.
    pub fn set_validator_async<V>(self, validator: Arc<V>) -> Self
    where
        V: AsyncNestedValidator<I> + 'static,
    {
        Self::new(
            self.inner
                .push_nested(Box::new(EachItem(Delegate::AsyncOnly(validator)))),
        )
    }
}
