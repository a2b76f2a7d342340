//! Error types for the hook pipeline.

/// Failure raised by a single hook or test body.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HookError {
    #[error("hook failed: {reason}")]
    Failed { reason: String },

    #[error("hook deferred completion but dropped its context without settling")]
    Unsettled,
}

impl HookError {
    /// Shorthand for `Failed { reason }`.
    pub fn failed(reason: impl Into<String>) -> Self {
        HookError::Failed {
            reason: reason.into(),
        }
    }
}

/// A hook failure classified by the pipeline stage it occurred in.
///
/// `Before`, `Body` and `After` wrap the underlying [`HookError`];
/// `DoubleCompletion` is a local diagnostic only and never becomes the
/// terminal outcome of a test invocation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StageError {
    #[error("before hook #{index} failed: {source}")]
    Before {
        index: usize,
        #[source]
        source: HookError,
    },

    #[error("test body failed: {source}")]
    Body {
        #[source]
        source: HookError,
    },

    #[error("after hook #{index} failed: {source}")]
    After {
        index: usize,
        #[source]
        source: HookError,
    },

    #[error("end called twice")]
    DoubleCompletion,
}

impl StageError {
    /// The underlying hook error, if this stage error carries one.
    pub fn source_error(&self) -> Option<&HookError> {
        match self {
            StageError::Before { source, .. }
            | StageError::Body { source }
            | StageError::After { source, .. } => Some(source),
            StageError::DoubleCompletion => None,
        }
    }
}
