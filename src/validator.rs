//! The rule registry and its evaluation loop.
//!
//! A [`Validator`] owns the ordered rules registered for one instance type.
//! Evaluation walks them in registration order, applying the cascade mode of
//! each rule, and returns one [`ValidationResult`] per rule that ran.

use std::fmt;
use std::marker::PhantomData;

use async_trait::async_trait;
use futures::future::BoxFuture;
use rayon::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::builder::{CollectionRuleBuilder, RuleBuilder};
use crate::cascade::{CascadeMode, CascadeState};
use crate::error::{ConfigError, RuleError};
use crate::path::FieldPath;
use crate::result::ValidationResult;
use crate::rule::{accessor, AsyncNestedValidator, ConditionalRule, Guard, NestedValidator, Rule};

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::SyncRules {}
    impl Sealed for super::AsyncRules {}
}

/// Marks which kinds of rules a [`Validator`] accepts.
///
/// Sealed: the only kinds are [`SyncRules`] and [`AsyncRules`].
pub trait RuleKind: sealed::Sealed + Send + Sync + 'static {}

/// Validators holding only synchronous conditions and guards.
///
/// They can be evaluated with both [`Validator::validate`] and
/// [`Validator::validate_async`], and nested anywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncRules;

/// Validators that may hold asynchronous conditions and guards.
///
/// They can only be evaluated with [`Validator::validate_async`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AsyncRules;

impl RuleKind for SyncRules {}
impl RuleKind for AsyncRules {}

/// An ordered set of rules for instances of `T`.
///
/// Build it once, then reuse it: evaluation keeps all per-call state on the
/// stack, so one validator can be shared across threads and evaluated
/// concurrently.
///
/// # Example
///
/// ```rust
/// use inquest::{rule_for, CascadeMode, ValidationReport, Validator};
///
/// struct Order { quantity: i32, note: String }
///
/// let mut validator = Validator::<Order>::new().with_cascade_mode(CascadeMode::Stop);
/// rule_for!(validator, quantity)
///     .unwrap()
///     .must(|q| *q > 0)
///     .message("quantity must be positive")
///     .must(|q| *q % 2 == 0)
///     .message("quantity must be even");
///
/// let results = validator.validate(&Order { quantity: -3, note: String::new() }).unwrap();
/// assert_eq!(results.error_count(), 1);
/// assert_eq!(results.by_path()["quantity"], vec!["quantity must be positive"]);
/// ```
pub struct Validator<T, K = SyncRules> {
    rules: Vec<Box<dyn Rule<T>>>,
    cascade_mode: CascadeMode,
    kind: PhantomData<K>,
}

impl<T> Validator<T, SyncRules>
where
    T: Sync + 'static,
{
    /// Creates an empty validator for synchronous rules.
    pub fn new() -> Self {
        Self::with_kind()
    }

    /// Creates an empty validator that accepts asynchronous rules.
    ///
    /// `Validator::<T>::new_async()` names the instance type only; the result
    /// is a `Validator<T, AsyncRules>`.
    pub fn new_async() -> Validator<T, AsyncRules> {
        Validator::with_kind()
    }

    /// Evaluates every rule against `instance` in registration order.
    ///
    /// Returns one result per rule that ran; rules skipped by cascade
    /// contribute nothing. Invalid data is reported inside `Ok`.
    ///
    /// # Errors
    ///
    /// Returns `RuleError::Predicate` if a fallible condition failed.
    pub fn validate(&self, instance: &T) -> Result<Vec<ValidationResult>, RuleError> {
        self.run(instance)
    }

    /// Validates independent instances in parallel.
    ///
    /// Each instance is still evaluated sequentially; the returned list is in
    /// the order of `instances`.
    pub fn validate_batch(
        &self,
        instances: &[T],
    ) -> Vec<Result<Vec<ValidationResult>, RuleError>> {
        instances
            .par_iter()
            .map(|instance| self.run(instance))
            .collect()
    }

    /// Turns this validator into one that also accepts asynchronous rules.
    pub fn into_async(self) -> Validator<T, AsyncRules> {
        Validator {
            rules: self.rules,
            cascade_mode: self.cascade_mode,
            kind: PhantomData,
        }
    }
}

impl<T> Default for Validator<T, SyncRules>
where
    T: Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Validator<T, AsyncRules>
where
    T: Sync + 'static,
{
    /// Like [`when`](Self::when) with an asynchronous predicate.
    pub fn when_async<F, C>(
        &mut self,
        predicate: F,
        configure: C,
    ) -> Result<WhenHandle<'_, T, AsyncRules>, ConfigError>
    where
        F: for<'a> Fn(&'a T, &'a CancellationToken) -> BoxFuture<'a, bool> + Send + Sync + 'static,
        C: FnOnce(&mut Self) -> Result<(), ConfigError>,
    {
        self.guarded_block(Guard::asynchronous(predicate), configure)
    }
}

impl<T, K> Validator<T, K>
where
    T: Sync + 'static,
    K: RuleKind,
{
    fn with_kind() -> Self {
        Self {
            rules: Vec::new(),
            cascade_mode: CascadeMode::default(),
            kind: PhantomData,
        }
    }

    /// Sets the default cascade mode, consuming and returning the validator.
    pub fn with_cascade_mode(mut self, mode: CascadeMode) -> Self {
        self.cascade_mode = mode;
        self
    }

    /// Sets the default cascade mode used by rules without an override.
    pub fn set_cascade_mode(&mut self, mode: CascadeMode) {
        self.cascade_mode = mode;
    }

    /// Returns the default cascade mode.
    pub fn cascade_mode(&self) -> CascadeMode {
        self.cascade_mode
    }

    /// Returns the number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rule has been registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Starts building rules for the property `accessor` borrows.
    ///
    /// `name` is the path errors are reported under. It must be a plain
    /// member identifier, or empty when `accessor` returns the instance itself
    /// (or a value it embeds) so nested errors keep their own paths.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPropertyPath` if `name` is neither empty
    /// nor an identifier.
    pub fn rule_for<P, F>(
        &mut self,
        name: &str,
        access: F,
    ) -> Result<RuleBuilder<'_, T, P, K>, ConfigError>
    where
        P: ?Sized + Sync + 'static,
        F: Fn(&T) -> &P + Send + Sync + 'static,
    {
        let path = FieldPath::property(name)?;
        Ok(RuleBuilder::new(self, path, accessor(access)))
    }

    /// Starts building rules for a collection property.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPropertyPath` under the same conditions
    /// as [`rule_for`](Self::rule_for).
    pub fn rules_for<I, F>(
        &mut self,
        name: &str,
        access: F,
    ) -> Result<CollectionRuleBuilder<'_, T, I, K>, ConfigError>
    where
        I: Sync + 'static,
        F: Fn(&T) -> &[I] + Send + Sync + 'static,
    {
        Ok(CollectionRuleBuilder::new(
            self.rule_for::<[I], F>(name, access)?,
        ))
    }

    /// Registers a block of rules that only apply while `predicate` holds.
    ///
    /// `configure` runs immediately; every rule it registers is guarded by
    /// `predicate`. If `configure` fails, the rules it added are discarded.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::{rule_for, CascadeMode, ValidationReport, Validator};
    ///
    /// struct Shipment { express: bool, carrier: String }
    ///
    /// let mut validator = Validator::<Shipment>::new();
    /// validator
    ///     .when(|s| s.express, |v| {
    ///         rule_for!(v, carrier)?
    ///             .must(|c| !c.is_empty())
    ///             .message("express shipments need a carrier");
    ///         Ok(())
    ///     })
    ///     .unwrap()
    ///     .set_cascade_mode(CascadeMode::Stop);
    ///
    /// let standard = Shipment { express: false, carrier: String::new() };
    /// assert!(validator.validate(&standard).unwrap().is_valid());
    ///
    /// let express = Shipment { express: true, carrier: String::new() };
    /// assert!(!validator.validate(&express).unwrap().is_valid());
    /// ```
    pub fn when<F, C>(
        &mut self,
        predicate: F,
        configure: C,
    ) -> Result<WhenHandle<'_, T, K>, ConfigError>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
        C: FnOnce(&mut Self) -> Result<(), ConfigError>,
    {
        self.guarded_block(Guard::sync(predicate), configure)
    }

    /// Evaluates every rule against `instance`, awaiting asynchronous ones.
    ///
    /// Produces the same results as [`validate`](Validator::validate) for
    /// validators without asynchronous rules.
    ///
    /// # Errors
    ///
    /// Returns `RuleError::Cancelled` if `cancel` fires before or during the
    /// evaluation, and `RuleError::Predicate` if a fallible condition failed.
    pub async fn validate_async(
        &self,
        instance: &T,
        cancel: &CancellationToken,
    ) -> Result<Vec<ValidationResult>, RuleError> {
        self.run_async(instance, cancel).await
    }

    pub(crate) fn push_rule(&mut self, rule: Box<dyn Rule<T>>) {
        self.rules.push(rule);
    }

    /// Wraps every rule from `start` onward in a guard.
    pub(crate) fn guard_from(&mut self, start: usize, guard: Guard<T>) {
        let tail = self.rules.split_off(start);
        self.rules.extend(tail.into_iter().map(|rule| {
            Box::new(ConditionalRule::new(guard.clone(), rule)) as Box<dyn Rule<T>>
        }));
    }

    /// Adds `guard` after the chained guards of every rule from `start` on.
    pub(crate) fn chain_guard_from(&mut self, start: usize, guard: Guard<T>) {
        let tail = self.rules.split_off(start);
        self.rules
            .extend(tail.into_iter().map(|rule| rule.and_when(guard.clone())));
    }

    pub(crate) fn set_cascade_mode_from(&mut self, start: usize, mode: CascadeMode) {
        for rule in &mut self.rules[start..] {
            rule.set_cascade_mode(mode);
        }
    }

    fn guarded_block<C>(
        &mut self,
        guard: Guard<T>,
        configure: C,
    ) -> Result<WhenHandle<'_, T, K>, ConfigError>
    where
        C: FnOnce(&mut Self) -> Result<(), ConfigError>,
    {
        let start = self.rules.len();
        if let Err(err) = configure(self) {
            self.rules.truncate(start);
            return Err(err);
        }
        self.guard_from(start, guard);
        Ok(WhenHandle {
            validator: self,
            start,
        })
    }

    fn run(&self, instance: &T) -> Result<Vec<ValidationResult>, RuleError> {
        let mut state = CascadeState::new();
        let mut results = Vec::with_capacity(self.rules.len());

        for rule in &self.rules {
            let mode = rule.cascade_mode().unwrap_or(self.cascade_mode);
            if state.skips(rule.path(), mode) {
                trace!(path = %rule.path(), "skipping rule after earlier failure on path");
                continue;
            }

            let result = rule.validate(instance)?;
            state.record(rule.path(), &result);
            results.push(result);
        }

        Ok(results)
    }

    async fn run_async(
        &self,
        instance: &T,
        cancel: &CancellationToken,
    ) -> Result<Vec<ValidationResult>, RuleError> {
        let mut state = CascadeState::new();
        let mut results = Vec::with_capacity(self.rules.len());

        for rule in &self.rules {
            if cancel.is_cancelled() {
                debug!(evaluated = results.len(), "validation cancelled");
                return Err(RuleError::Cancelled);
            }

            let mode = rule.cascade_mode().unwrap_or(self.cascade_mode);
            if state.skips(rule.path(), mode) {
                trace!(path = %rule.path(), "skipping rule after earlier failure on path");
                continue;
            }

            let result = rule.validate_async(instance, cancel).await?;
            state.record(rule.path(), &result);
            results.push(result);
        }

        if cancel.is_cancelled() {
            debug!(evaluated = results.len(), "validation cancelled");
            return Err(RuleError::Cancelled);
        }

        Ok(results)
    }
}

impl<T, K> fmt::Debug for Validator<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("rules", &self.rules.len())
            .field("cascade_mode", &self.cascade_mode)
            .finish()
    }
}

/// Handle to the rules registered by one [`Validator::when`] block.
pub struct WhenHandle<'v, T, K> {
    validator: &'v mut Validator<T, K>,
    start: usize,
}

impl<'v, T, K> WhenHandle<'v, T, K>
where
    T: Sync + 'static,
    K: RuleKind,
{
    /// Overrides the cascade mode of every rule the block registered.
    pub fn set_cascade_mode(self, mode: CascadeMode) -> &'v mut Validator<T, K> {
        self.validator.set_cascade_mode_from(self.start, mode);
        self.validator
    }

    /// Returns the number of rules the block registered.
    pub fn len(&self) -> usize {
        self.validator.len() - self.start
    }

    /// Returns true if the block registered no rules.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<C, K> AsyncNestedValidator<C> for Validator<C, K>
where
    C: Sync + 'static,
    K: RuleKind,
{
    async fn validate_async(
        &self,
        instance: &C,
        cancel: &CancellationToken,
    ) -> Result<Vec<ValidationResult>, RuleError> {
        self.run_async(instance, cancel).await
    }
}

impl<C> NestedValidator<C> for Validator<C, SyncRules>
where
    C: Sync + 'static,
{
    fn validate(&self, instance: &C) -> Result<Vec<ValidationResult>, RuleError> {
        self.run(instance)
    }
}

/// Starts a [`RuleBuilder`] for a field, named after the field.
///
/// `rule_for!(validator, email)` is
/// `validator.rule_for("email", |instance| &instance.email)`.
#[macro_export]
macro_rules! rule_for {
    ($validator:expr, $field:ident) => {
        $validator.rule_for(stringify!($field), |instance| &instance.$field)
    };
}

/// Starts a [`CollectionRuleBuilder`] for a `Vec` or array field.
///
/// `rules_for!(validator, children)` is
/// `validator.rules_for("children", |instance| &instance.children[..])`.
#[macro_export]
macro_rules! rules_for {
    ($validator:expr, $field:ident) => {
        $validator.rules_for(stringify!($field), |instance| &instance.$field[..])
    };
}
