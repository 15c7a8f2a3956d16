//! Fluent rule construction for a single property.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::cascade::CascadeMode;
use crate::error::BoxError;
use crate::path::FieldPath;
use crate::rule::{
    async_check, message_fn, sync_check, Accessor, AsyncNestedValidator, Check, Delegate, Guard,
    MessageFn, MessageSlot, NestedDispatch, NestedValidator, OptionalValue, PropertyRule,
    WholeValue,
};
use crate::validator::{AsyncRules, RuleKind, Validator};

/// Builds the rules of one property.
///
/// Obtained from [`Validator::rule_for`] (or the [`rule_for!`](crate::rule_for)
/// macro). Every `must*` call registers one rule on the validator right away;
/// the remaining methods configure rules this builder already created.
///
/// # Example
///
/// ```rust
/// use inquest::{rule_for, ValidationReport, Validator};
///
/// struct Person { name: String, age: u32 }
///
/// let mut validator = Validator::<Person>::new();
/// rule_for!(validator, name)
///     .unwrap()
///     .must(|name| !name.is_empty())
///     .message("name is required")
///     .must(|name| name.len() <= 10)
///     .message_for(|name| format!("'{}' is too long", name));
/// rule_for!(validator, age)
///     .unwrap()
///     .must_with(|age, person| *age >= 18 || person.name == "Bo")
///     .when(|person| !person.name.is_empty());
///
/// let person = Person { name: "Bartholomew Jr".into(), age: 9 };
/// let results = validator.validate(&person).unwrap();
/// assert_eq!(results.by_path()["name"], vec!["'Bartholomew Jr' is too long"]);
/// assert_eq!(results.by_path()["age"], vec!["Validation error."]);
/// ```
pub struct RuleBuilder<'v, T, P: ?Sized, K = crate::validator::SyncRules> {
    validator: &'v mut Validator<T, K>,
    path: FieldPath,
    accessor: Accessor<T, P>,
    /// Index of this builder's first rule in the validator.
    first_rule: usize,
    /// Index of the first rule a chained `when` applies to.
    batch_start: usize,
    /// Set once a `when` closed the batch; the next rule starts a new one.
    batch_guarded: bool,
    messages: Vec<MessageSlot<T, P>>,
    cascade: Option<CascadeMode>,
}

impl<'v, T, P, K> RuleBuilder<'v, T, P, K>
where
    T: Sync + 'static,
    P: ?Sized + Sync + 'static,
    K: RuleKind,
{
    pub(crate) fn new(
        validator: &'v mut Validator<T, K>,
        path: FieldPath,
        accessor: Accessor<T, P>,
    ) -> Self {
        let first_rule = validator.len();
        Self {
            validator,
            path,
            accessor,
            first_rule,
            batch_start: first_rule,
            batch_guarded: false,
            messages: Vec::new(),
            cascade: None,
        }
    }

    /// Returns the path this builder's rules report under.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Adds a rule that fails when `condition` returns false for the property.
    pub fn must<F>(self, condition: F) -> Self
    where
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        self.push_check(sync_check(move |value, _| Ok(condition(value))), None)
    }

    /// Adds a rule whose condition also sees the whole instance.
    pub fn must_with<F>(self, condition: F) -> Self
    where
        F: Fn(&P, &T) -> bool + Send + Sync + 'static,
    {
        self.push_check(sync_check(move |value, instance| Ok(condition(value, instance))), None)
    }

    /// Adds a rule whose condition may fail to produce an answer.
    ///
    /// An `Err` from `condition` aborts the evaluation with
    /// [`RuleError::Predicate`](crate::RuleError::Predicate); it is never
    /// turned into a validation error.
    pub fn try_must<F, E>(self, condition: F) -> Self
    where
        F: Fn(&P, &T) -> Result<bool, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.push_check(
            sync_check(move |value, instance| condition(value, instance).map_err(Into::into)),
            None,
        )
    }

    /// Adds a rule carrying a message that applies until `message*` sets one.
    pub(crate) fn must_with_default_message<F, M>(self, condition: F, render: M) -> Self
    where
        F: Fn(&P, &T) -> bool + Send + Sync + 'static,
        M: Fn(&P, &T) -> String + Send + Sync + 'static,
    {
        self.push_check(
            sync_check(move |value, instance| Ok(condition(value, instance))),
            Some(message_fn(render)),
        )
    }

    /// Sets a fixed message on the newest rule that has none.
    pub fn message(self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.set_message(message_fn(move |_, _| message.clone()))
    }

    /// Sets a message computed from the property value.
    pub fn message_for<F>(self, render: F) -> Self
    where
        F: Fn(&P) -> String + Send + Sync + 'static,
    {
        self.set_message(message_fn(move |value, _| render(value)))
    }

    /// Sets a message computed from the property value and the instance.
    pub fn message_with<F>(self, render: F) -> Self
    where
        F: Fn(&P, &T) -> String + Send + Sync + 'static,
    {
        self.set_message(message_fn(render))
    }

    /// Sets a message computed only when the rule fails.
    pub fn message_lazy<F>(self, render: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.set_message(message_fn(move |_, _| render()))
    }

    /// Makes every rule added since the previous `when` conditional.
    ///
    /// While `predicate` is false for the instance, those rules contribute
    /// empty results and never count as failed. Consecutive `when` and
    /// `when_async` calls stack on the same rules; all of them must hold,
    /// and they are checked in the order they were added.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.guard(Guard::sync(predicate));
        self
    }

    /// Overrides the cascade mode of every rule of this builder.
    ///
    /// Applies to rules already added and to rules added afterwards.
    pub fn cascade(mut self, mode: CascadeMode) -> Self {
        self.cascade = Some(mode);
        self.validator.set_cascade_mode_from(self.first_rule, mode);
        self
    }

    /// Recurses into `validator` for the property value.
    ///
    /// The rule itself always passes; nested errors are reported under this
    /// builder's path, e.g. `Wife.Name`. With an empty path the nested paths
    /// are kept as they are.
    pub fn set_validator<V>(self, validator: Arc<V>) -> Self
    where
        P: Sized,
        V: NestedValidator<P> + 'static,
    {
        self.push_nested(Box::new(WholeValue(Delegate::Full(validator))))
    }

    pub(crate) fn push_check(
        mut self,
        check: Check<T, P>,
        fallback: Option<MessageFn<T, P>>,
    ) -> Self {
        self.open_batch();
        let mut rule = PropertyRule::new(self.path.clone(), Arc::clone(&self.accessor), check)
            .with_cascade_mode(self.cascade);
        if let Some(fallback) = fallback {
            rule = rule.with_fallback(fallback);
        }
        self.messages.push(rule.message_slot());
        self.validator.push_rule(Box::new(rule));
        self
    }

    pub(crate) fn push_nested(mut self, nested: Box<dyn NestedDispatch<P>>) -> Self {
        self.open_batch();
        let rule = PropertyRule::new(self.path.clone(), Arc::clone(&self.accessor), Check::Always)
            .with_nested(nested)
            .with_cascade_mode(self.cascade);
        self.validator.push_rule(Box::new(rule));
        self
    }

    pub(crate) fn guard(&mut self, guard: Guard<T>) {
        self.validator.chain_guard_from(self.batch_start, guard);
        self.batch_guarded = true;
    }

    fn open_batch(&mut self) {
        if self.batch_guarded {
            self.batch_start = self.validator.len();
            self.batch_guarded = false;
        }
    }

    fn set_message(self, render: MessageFn<T, P>) -> Self {
        if let Some(slot) = self.messages.iter().rev().find(|slot| slot.get().is_none()) {
            let _ = slot.set(render);
        }
        self
    }
}

impl<'v, T, C, K> RuleBuilder<'v, T, Option<C>, K>
where
    T: Sync + 'static,
    C: Sync + 'static,
    K: RuleKind,
{
    /// Recurses into `validator` when the property holds a value.
    ///
    /// `None` is skipped without producing errors.
    pub fn set_optional_validator<V>(self, validator: Arc<V>) -> Self
    where
        V: NestedValidator<C> + 'static,
    {
        self.push_nested(Box::new(OptionalValue(Delegate::Full(validator))))
    }
}

impl<'v, T, P> RuleBuilder<'v, T, P, AsyncRules>
where
    T: Sync + 'static,
    P: ?Sized + Sync + 'static,
{
    /// Adds a rule with an asynchronous condition.
    ///
    /// The condition is raced against the cancellation token; it also
    /// receives the token to forward into its own I/O.
    ///
    /// # Example
    ///
    /// ```rust
    /// use futures::FutureExt;
    /// use inquest::{rule_for, ValidationReport, Validator};
    /// use tokio_util::sync::CancellationToken;
    ///
    /// struct Account { email: String }
    ///
    /// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
    /// let mut validator = Validator::<Account>::new_async();
    /// rule_for!(validator, email)
    ///     .unwrap()
    ///     .must_async(|email, _cancel| {
    ///         let taken = email == "ann@example.com";
    ///         async move { !taken }.boxed()
    ///     })
    ///     .message_for(|email| format!("{} already exists", email));
    ///
    /// let account = Account { email: "ann@example.com".into() };
    /// let results = validator
    ///     .validate_async(&account, &CancellationToken::new())
    ///     .await
    ///     .unwrap();
    /// assert_eq!(results.by_path()["email"], vec!["ann@example.com already exists"]);
    /// # });
    /// ```
    pub fn must_async<F>(self, condition: F) -> Self
    where
        F: for<'a> Fn(&'a P, &'a CancellationToken) -> BoxFuture<'a, bool> + Send + Sync + 'static,
    {
        self.push_check(
            async_check(move |value, _, cancel| {
                condition(value, cancel).map(Ok::<bool, BoxError>).boxed()
            }),
            None,
        )
    }

    /// Adds an asynchronous rule whose condition also sees the instance.
    pub fn must_async_with<F>(self, condition: F) -> Self
    where
        F: for<'a> Fn(&'a P, &'a T, &'a CancellationToken) -> BoxFuture<'a, bool>
            + Send
            + Sync
            + 'static,
    {
        self.push_check(
            async_check(move |value, instance, cancel| {
                condition(value, instance, cancel)
                    .map(Ok::<bool, BoxError>)
                    .boxed()
            }),
            None,
        )
    }

    /// Adds an asynchronous rule whose condition may fail to produce an answer.
    pub fn try_must_async<F>(self, condition: F) -> Self
    where
        F: for<'a> Fn(&'a P, &'a T, &'a CancellationToken) -> BoxFuture<'a, Result<bool, BoxError>>
            + Send
            + Sync
            + 'static,
    {
        self.push_check(async_check(condition), None)
    }

    /// Like [`when`](Self::when) with an asynchronous predicate.
    pub fn when_async<F>(mut self, predicate: F) -> Self
    where
        F: for<'a> Fn(&'a T, &'a CancellationToken) -> BoxFuture<'a, bool> + Send + Sync + 'static,
    {
        self.guard(Guard::asynchronous(predicate));
        self
    }

    /// Recurses into a validator that may only run asynchronously.
    pub fn set_validator_async<V>(self, validator: Arc<V>) -> Self
    where
        P: Sized,
        V: AsyncNestedValidator<P> + 'static,
    {
        self.push_nested(Box::new(WholeValue(Delegate::AsyncOnly(validator))))
    }
}

impl<'v, T, C> RuleBuilder<'v, T, Option<C>, AsyncRules>
where
    T: Sync + 'static,
    C: Sync + 'static,
{
    /// Like [`set_optional_validator`](Self::set_optional_validator) for
    /// validators that may only run asynchronously.
    pub fn set_optional_validator_async<V>(self, validator: Arc<V>) -> Self
    where
        V: AsyncNestedValidator<C> + 'static,
    {
        self.push_nested(Box::new(OptionalValue(Delegate::AsyncOnly(validator))))
    }
}
