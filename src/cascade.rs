//! Cascade control between rules that share a path.

use std::collections::HashSet;

use crate::path::FieldPath;
use crate::result::ValidationResult;

/// Whether later rules on a path still run once an earlier one failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CascadeMode {
    /// Every rule runs regardless of earlier failures on the same path.
    #[default]
    Continue,
    /// After the first failure on a path, later rules for that path are skipped.
    Stop,
}

/// Failed-path bookkeeping for a single evaluation pass.
///
/// Lives on the stack of one `validate`/`validate_async` call, so a
/// validator never carries state between calls and nested validators never
/// see their parent's failures.
#[derive(Debug, Default)]
pub(crate) struct CascadeState {
    failed: HashSet<FieldPath>,
}

impl CascadeState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns true if a rule on `path` running under `mode` must be skipped.
    pub(crate) fn skips(&self, path: &FieldPath, mode: CascadeMode) -> bool {
        mode == CascadeMode::Stop && self.failed.contains(path)
    }

    /// Marks `path` failed if `result` holds any error.
    pub(crate) fn record(&mut self, path: &FieldPath, result: &ValidationResult) {
        if !result.is_valid() {
            self.failed.insert(path.clone());
        }
    }
}
