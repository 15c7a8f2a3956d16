//! Guarded rules.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::cascade::CascadeMode;
use crate::error::RuleError;
use crate::path::FieldPath;
use crate::result::ValidationResult;

use super::{until_cancelled, Rule};

type SyncPredicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
type AsyncPredicate<T> =
    Arc<dyn for<'a> Fn(&'a T, &'a CancellationToken) -> BoxFuture<'a, bool> + Send + Sync>;

/// A predicate over the whole instance deciding whether a rule applies.
///
/// One guard is shared by every rule of a grouped `when` block.
pub(crate) enum Guard<T> {
    Sync(SyncPredicate<T>),
    Async(AsyncPredicate<T>),
}

impl<T> Guard<T> {
    pub(crate) fn sync<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Guard::Sync(Arc::new(predicate))
    }

    pub(crate) fn asynchronous<F>(predicate: F) -> Self
    where
        F: for<'a> Fn(&'a T, &'a CancellationToken) -> BoxFuture<'a, bool> + Send + Sync + 'static,
    {
        Guard::Async(Arc::new(predicate))
    }

    fn allows(&self, instance: &T, path: &FieldPath) -> Result<bool, RuleError> {
        match self {
            Guard::Sync(predicate) => Ok(predicate(instance)),
            Guard::Async(_) => Err(RuleError::RequiresAsync { path: path.clone() }),
        }
    }

    async fn allows_async(
        &self,
        instance: &T,
        cancel: &CancellationToken,
    ) -> Result<bool, RuleError> {
        match self {
            Guard::Sync(predicate) => Ok(predicate(instance)),
            Guard::Async(predicate) => until_cancelled(cancel, predicate(instance, cancel)).await,
        }
    }
}

impl<T> Clone for Guard<T> {
    fn clone(&self) -> Self {
        match self {
            Guard::Sync(predicate) => Guard::Sync(Arc::clone(predicate)),
            Guard::Async(predicate) => Guard::Async(Arc::clone(predicate)),
        }
    }
}

/// Runs `inner` only when every guard allows it.
///
/// Guards are checked in order and the first rejection stops the check. A
/// rejected guard yields an empty result: the rule is not applicable, which
/// is different from having failed. Path and cascade mode are the inner
/// rule's, so configuration applied after wrapping still reaches it.
pub(crate) struct ConditionalRule<T> {
    guards: Vec<Guard<T>>,
    inner: Box<dyn Rule<T>>,
}

impl<T> ConditionalRule<T> {
    pub(crate) fn new(guard: Guard<T>, inner: Box<dyn Rule<T>>) -> Self {
        Self {
            guards: vec![guard],
            inner,
        }
    }
}

#[async_trait]
impl<T> Rule<T> for ConditionalRule<T>
where
    T: Sync + 'static,
{
    fn path(&self) -> &FieldPath {
        self.inner.path()
    }

    fn cascade_mode(&self) -> Option<CascadeMode> {
        self.inner.cascade_mode()
    }

    fn set_cascade_mode(&mut self, mode: CascadeMode) {
        self.inner.set_cascade_mode(mode);
    }

    fn and_when(mut self: Box<Self>, guard: Guard<T>) -> Box<dyn Rule<T>> {
        self.guards.push(guard);
        self
    }

    fn validate(&self, instance: &T) -> Result<ValidationResult, RuleError> {
        for guard in &self.guards {
            if !guard.allows(instance, self.path())? {
                trace!(path = %self.path(), "guard rejected instance, rule not applied");
                return Ok(ValidationResult::new());
            }
        }
        self.inner.validate(instance)
    }

    async fn validate_async(
        &self,
        instance: &T,
        cancel: &CancellationToken,
    ) -> Result<ValidationResult, RuleError> {
        for guard in &self.guards {
            if !guard.allows_async(instance, cancel).await? {
                trace!(path = %self.path(), "guard rejected instance, rule not applied");
                return Ok(ValidationResult::new());
            }
        }
        self.inner.validate_async(instance, cancel).await
    }
}
