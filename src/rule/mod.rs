//! Executable rules.
//!
//! Every registration on a [`Validator`](crate::Validator) becomes one boxed
//! [`Rule`]. A [`PropertyRule`] checks a single property and may recurse into
//! a nested validator; a [`ConditionalRule`] puts a guard in front of another
//! rule.

mod conditional;
mod nested;
mod property;

use std::future::Future;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::cascade::CascadeMode;
use crate::error::RuleError;
use crate::path::FieldPath;
use crate::result::ValidationResult;

pub use nested::{AsyncNestedValidator, NestedValidator};

pub(crate) use conditional::{ConditionalRule, Guard};
pub(crate) use nested::{Delegate, EachItem, NestedDispatch, OptionalValue, WholeValue};
pub(crate) use property::{
    accessor, async_check, message_fn, sync_check, Accessor, Check, MessageFn, MessageSlot,
    PropertyRule,
};

/// Message used when a failing rule has neither a custom nor a default message.
pub const DEFAULT_MESSAGE: &str = "Validation error.";

/// One unit of work in a validator's ordered rule list.
#[async_trait]
pub(crate) trait Rule<T>: Send + Sync {
    /// Path that errors and cascade decisions are attributed to.
    fn path(&self) -> &FieldPath;

    /// Cascade override, if one was configured for this rule.
    fn cascade_mode(&self) -> Option<CascadeMode>;

    fn set_cascade_mode(&mut self, mode: CascadeMode);

    /// Adds a chained guard, checked after the ones already chained.
    fn and_when(self: Box<Self>, guard: Guard<T>) -> Box<dyn Rule<T>>;

    fn validate(&self, instance: &T) -> Result<ValidationResult, RuleError>;

    async fn validate_async(
        &self,
        instance: &T,
        cancel: &CancellationToken,
    ) -> Result<ValidationResult, RuleError>;
}

/// Drives `future` to completion unless `cancel` fires first.
pub(crate) async fn until_cancelled<F>(
    cancel: &CancellationToken,
    future: F,
) -> Result<F::Output, RuleError>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RuleError::Cancelled),
        output = future => Ok(output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_until_cancelled_returns_output() {
        let cancel = CancellationToken::new();
        let output = until_cancelled(&cancel, async { 7 }).await.unwrap();
        assert_eq!(output, 7);
    }

    #[tokio::test]
    async fn test_until_cancelled_prefers_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = until_cancelled(&cancel, async { 7 }).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_until_cancelled_interrupts_pending_future() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let err = until_cancelled(&cancel, std::future::pending::<()>())
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
