//! The hook contract and the context handed to every hook.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{HookError, StageError};
use crate::hooks::executor::{ExecutionOutcome, OutcomeCell};
use crate::host::Assert;

/// What a hook's returned future resolves the stage with.
///
/// A hook can instead (or additionally) settle the stage through the context
/// primitives [`HookContext::next`], [`HookContext::next_add`] and
/// [`HookContext::end`]; the first settlement wins. Returning `Deferred`
/// settles nothing and leaves the outcome to a primitive call, which may
/// happen later from a spawned task.
#[derive(Debug, Clone)]
pub enum HookOutcome {
    /// Resolve the stage with the argument tuple unchanged.
    Continue,
    /// Resolve the stage, replacing the argument tuple.
    Next(Vec<serde_json::Value>),
    /// Resolve the stage, appending to the argument tuple.
    NextAdd(Vec<serde_json::Value>),
    /// Do not resolve; a context primitive will settle the stage.
    Deferred,
}

/// Trait for before-hooks, after-hooks and test bodies.
///
/// Implementations usually come from [`from_fn`]; a named type is only worth
/// it for reusable fixtures shared across pipelines.
#[async_trait]
pub trait Hook: Send + Sync {
    async fn run(&self, t: HookContext) -> Result<HookOutcome, HookError>;
}

/// The augmented `t` passed to hooks and test bodies.
///
/// Forwards the host assertion surface (`pass`, `plan`, and the raw
/// [`Assert`] via [`assert`](Self::assert)) and adds the stage-completion
/// primitives. Cloneable so a hook can move a copy into a spawned task and
/// settle the stage later.
#[derive(Clone)]
pub struct HookContext {
    assert: Arc<dyn Assert>,
    args: Arc<Vec<serde_json::Value>>,
    cell: Arc<OutcomeCell>,
}

impl HookContext {
    pub(crate) fn new(
        assert: Arc<dyn Assert>,
        args: Arc<Vec<serde_json::Value>>,
        cell: Arc<OutcomeCell>,
    ) -> Self {
        Self { assert, args, cell }
    }

    /// The argument tuple as it stood when this hook was invoked.
    pub fn args(&self) -> &[serde_json::Value] {
        &self.args
    }

    /// Convenience accessor for a single tuple position.
    pub fn arg(&self, index: usize) -> Option<&serde_json::Value> {
        self.args.get(index)
    }

    /// The underlying host assertion object.
    pub fn assert(&self) -> &Arc<dyn Assert> {
        &self.assert
    }

    /// Record a passing assertion on the host.
    pub fn pass(&self, message: &str) {
        self.assert.pass(message);
    }

    /// Declare the expected number of assertions on the host.
    pub fn plan(&self, count: usize) {
        self.assert.plan(count);
    }

    /// Resolve this stage, replacing the argument tuple with `values`.
    ///
    /// Ignored if the stage already settled (first settlement wins).
    pub fn next(&self, values: Vec<serde_json::Value>) {
        if !self.cell.settle(ExecutionOutcome::Success(values)) {
            tracing::debug!("next called after stage settled; ignoring");
        }
    }

    /// Resolve this stage, appending `values` to the argument tuple.
    ///
    /// Ignored if the stage already settled (first settlement wins).
    pub fn next_add(&self, values: Vec<serde_json::Value>) {
        let mut next = self.args.to_vec();
        next.extend(values);
        if !self.cell.settle(ExecutionOutcome::Success(next)) {
            tracing::debug!("next_add called after stage settled; ignoring");
        }
    }

    /// Resolve this stage with the tuple unchanged, or fail it with `err`.
    ///
    /// A second `end` for the same stage is reported to the host as a local
    /// `DoubleCompletion` diagnostic and otherwise ignored.
    pub fn end(&self, err: Option<HookError>) {
        let outcome = match err {
            None => ExecutionOutcome::Success(self.args.to_vec()),
            Some(error) => ExecutionOutcome::Failure {
                error,
                args: self.args.to_vec(),
            },
        };
        if !self.cell.settle(outcome) {
            tracing::warn!("end called twice within one stage");
            self.assert.error(&StageError::DoubleCompletion);
        }
    }
}

/// A [`Hook`] built from an async closure.
pub struct FnHook<F> {
    f: F,
}

/// Wrap an async closure as a [`Hook`].
///
/// ```no_run
/// use around::hooks::{from_fn, HookOutcome};
///
/// let hook = from_fn(|t| async move {
///     t.pass("before called");
///     Ok(HookOutcome::Next(vec![serde_json::json!(100)]))
/// });
/// ```
pub fn from_fn<F, Fut>(f: F) -> FnHook<F>
where
    F: Fn(HookContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HookOutcome, HookError>> + Send,
{
    FnHook { f }
}

#[async_trait]
impl<F, Fut> Hook for FnHook<F>
where
    F: Fn(HookContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HookOutcome, HookError>> + Send,
{
    async fn run(&self, t: HookContext) -> Result<HookOutcome, HookError> {
        (self.f)(t).await
    }
}
