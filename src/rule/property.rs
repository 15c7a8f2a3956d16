//! Property-level rules.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cascade::CascadeMode;
use crate::error::{BoxError, RuleError};
use crate::path::FieldPath;
use crate::result::ValidationResult;

use super::{until_cancelled, ConditionalRule, Guard, NestedDispatch, Rule, DEFAULT_MESSAGE};

/// Borrows the validated property out of an instance.
pub(crate) type Accessor<T, P> = Arc<dyn Fn(&T) -> &P + Send + Sync>;

/// Renders the error message of a failed rule.
pub(crate) type MessageFn<T, P> = Arc<dyn Fn(&P, &T) -> String + Send + Sync>;

/// Write-once message slot shared between a rule and the builder that made it.
pub(crate) type MessageSlot<T, P> = Arc<OnceLock<MessageFn<T, P>>>;

type SyncCondition<T, P> = Box<dyn Fn(&P, &T) -> Result<bool, BoxError> + Send + Sync>;
type AsyncCondition<T, P> = Box<
    dyn for<'a> Fn(&'a P, &'a T, &'a CancellationToken) -> BoxFuture<'a, Result<bool, BoxError>>
        + Send
        + Sync,
>;

/// The condition deciding whether a property passes.
pub(crate) enum Check<T, P: ?Sized> {
    /// Always passes; used by rules that only recurse into a nested validator.
    Always,
    Sync(SyncCondition<T, P>),
    Async(AsyncCondition<T, P>),
}

pub(crate) fn accessor<T, P, F>(access: F) -> Accessor<T, P>
where
    P: ?Sized,
    F: Fn(&T) -> &P + Send + Sync + 'static,
{
    Arc::new(access)
}

pub(crate) fn sync_check<T, P, F>(condition: F) -> Check<T, P>
where
    P: ?Sized,
    F: Fn(&P, &T) -> Result<bool, BoxError> + Send + Sync + 'static,
{
    Check::Sync(Box::new(condition))
}

pub(crate) fn async_check<T, P, F>(condition: F) -> Check<T, P>
where
    P: ?Sized,
    F: for<'a> Fn(&'a P, &'a T, &'a CancellationToken) -> BoxFuture<'a, Result<bool, BoxError>>
        + Send
        + Sync
        + 'static,
{
    Check::Async(Box::new(condition))
}

pub(crate) fn message_fn<T, P, F>(render: F) -> MessageFn<T, P>
where
    P: ?Sized,
    F: Fn(&P, &T) -> String + Send + Sync + 'static,
{
    Arc::new(render)
}

/// A rule bound to one property of `T`.
///
/// Evaluation extracts the property, runs the condition, records at most one
/// error at `path`, then recurses into the nested validator if one is
/// attached. Nested recursion runs even when the condition failed.
pub(crate) struct PropertyRule<T, P: ?Sized> {
    path: FieldPath,
    accessor: Accessor<T, P>,
    check: Check<T, P>,
    message: MessageSlot<T, P>,
    fallback: Option<MessageFn<T, P>>,
    nested: Option<Box<dyn NestedDispatch<P>>>,
    cascade_mode: Option<CascadeMode>,
}

impl<T, P: ?Sized> PropertyRule<T, P> {
    pub(crate) fn new(path: FieldPath, accessor: Accessor<T, P>, check: Check<T, P>) -> Self {
        Self {
            path,
            accessor,
            check,
            message: Arc::new(OnceLock::new()),
            fallback: None,
            nested: None,
            cascade_mode: None,
        }
    }

    pub(crate) fn with_fallback(mut self, fallback: MessageFn<T, P>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub(crate) fn with_nested(mut self, nested: Box<dyn NestedDispatch<P>>) -> Self {
        self.nested = Some(nested);
        self
    }

    pub(crate) fn with_cascade_mode(mut self, mode: Option<CascadeMode>) -> Self {
        self.cascade_mode = mode;
        self
    }

    /// Returns a handle to this rule's message slot.
    pub(crate) fn message_slot(&self) -> MessageSlot<T, P> {
        Arc::clone(&self.message)
    }

    fn render_message(&self, value: &P, instance: &T) -> String {
        match self.message.get().or(self.fallback.as_ref()) {
            Some(render) => render(value, instance),
            None => DEFAULT_MESSAGE.to_string(),
        }
    }

    fn record_outcome(&self, passed: bool, value: &P, instance: &T) -> ValidationResult {
        let mut result = ValidationResult::new();
        if !passed {
            let message = self.render_message(value, instance);
            debug!(path = %self.path, %message, "rule failed");
            result.add_error(self.path.clone(), message);
        }
        result
    }
}

#[async_trait]
impl<T, P> Rule<T> for PropertyRule<T, P>
where
    T: Sync + 'static,
    P: Sync + ?Sized + 'static,
{
    fn path(&self) -> &FieldPath {
        &self.path
    }

    fn cascade_mode(&self) -> Option<CascadeMode> {
        self.cascade_mode
    }

    fn set_cascade_mode(&mut self, mode: CascadeMode) {
        self.cascade_mode = Some(mode);
    }

    fn and_when(self: Box<Self>, guard: Guard<T>) -> Box<dyn Rule<T>> {
        Box::new(ConditionalRule::new(guard, self))
    }

    fn validate(&self, instance: &T) -> Result<ValidationResult, RuleError> {
        let value = (self.accessor)(instance);

        let passed = match &self.check {
            Check::Always => true,
            Check::Sync(condition) => {
                condition(value, instance).map_err(|err| RuleError::predicate(&self.path, err))?
            }
            Check::Async(_) => {
                return Err(RuleError::RequiresAsync {
                    path: self.path.clone(),
                })
            }
        };

        let mut result = self.record_outcome(passed, value, instance);
        if let Some(nested) = &self.nested {
            nested.validate(&self.path, value, &mut result)?;
        }
        Ok(result)
    }

    async fn validate_async(
        &self,
        instance: &T,
        cancel: &CancellationToken,
    ) -> Result<ValidationResult, RuleError> {
        let value = (self.accessor)(instance);

        let passed = match &self.check {
            Check::Always => true,
            Check::Sync(condition) => {
                condition(value, instance).map_err(|err| RuleError::predicate(&self.path, err))?
            }
            Check::Async(condition) => until_cancelled(cancel, condition(value, instance, cancel))
                .await?
                .map_err(|err| RuleError::predicate(&self.path, err))?,
        };

        let mut result = self.record_outcome(passed, value, instance);
        if let Some(nested) = &self.nested {
            nested
                .validate_async(&self.path, value, cancel, &mut result)
                .await?;
        }
        Ok(result)
    }
}
