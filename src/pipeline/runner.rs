//! Invocation protocol: before-chain, body, forced after-chain, one-shot
//! completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::StageError;
use crate::hooks::executor::{execute, ExecutionOutcome};
use crate::hooks::Hook;
use crate::host::{Assert, RegisterMode};
use crate::pipeline::builder::HookList;

/// One-shot latch guarding the host's completion signal.
///
/// The first [`signal`](Self::signal) forwards to [`Assert::end`]; any later
/// signal is converted into a local `DoubleCompletion` diagnostic so the
/// host's bookkeeping can never see two completions for one invocation.
pub struct CompletionLatch {
    assert: Arc<dyn Assert>,
    closed: AtomicBool,
}

impl CompletionLatch {
    pub fn new(assert: Arc<dyn Assert>) -> Self {
        Self {
            assert,
            closed: AtomicBool::new(false),
        }
    }

    /// Fire the completion signal, failing the test if `err` is `Some`.
    pub fn signal(&self, err: Option<StageError>) {
        if self.closed.swap(true, Ordering::SeqCst) {
            tracing::warn!("completion signalled twice; reporting locally");
            self.assert.error(&StageError::DoubleCompletion);
            return;
        }
        self.assert.end(err);
    }
}

/// One registered test: its name, registration mode, hook chains and body.
///
/// Built by [`Pipeline::test`](crate::pipeline::Pipeline::test) and handed to
/// the registrar; the host drives [`run`](Self::run) when it executes the
/// test.
pub struct TestEntry {
    name: String,
    mode: RegisterMode,
    before: HookList,
    after: HookList,
    body: Arc<dyn Hook>,
}

impl TestEntry {
    pub(crate) fn new(
        name: String,
        mode: RegisterMode,
        before: HookList,
        after: HookList,
        body: Arc<dyn Hook>,
    ) -> Self {
        Self {
            name,
            mode,
            before,
            after,
            body,
        }
    }

    /// The (label-prefixed) test name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Which host registration variant this test targets.
    pub fn mode(&self) -> RegisterMode {
        self.mode
    }

    /// Execute the invocation protocol against one host assertion object.
    ///
    /// Before-hooks run in order and short-circuit on failure, skipping the
    /// body. After-hooks are forced: each runs no matter what failed earlier.
    /// A non-last after-hook failure becomes a diagnostic; a failure of the
    /// last after-hook overrides any carried error. Completion fires exactly
    /// once, with whichever error is still standing.
    pub async fn run(&self, assert: Arc<dyn Assert>) {
        let latch = CompletionLatch::new(Arc::clone(&assert));
        let mut args: Vec<serde_json::Value> = Vec::new();
        let mut carried: Option<StageError> = None;

        for (index, hook) in self.before.iter().enumerate() {
            match execute(hook.as_ref(), Arc::clone(&assert), args.clone()).await {
                ExecutionOutcome::Success(next) => args = next,
                ExecutionOutcome::Failure {
                    error,
                    args: at_failure,
                } => {
                    tracing::debug!(test = %self.name, index, "before hook failed; skipping body");
                    args = at_failure;
                    carried = Some(StageError::Before {
                        index,
                        source: error,
                    });
                    break;
                }
            }
        }

        if carried.is_none() {
            match execute(self.body.as_ref(), Arc::clone(&assert), args.clone()).await {
                // The body's tuple changes are not threaded onward; the
                // after-chain starts from the tuple as the body saw it.
                ExecutionOutcome::Success(_) => {}
                ExecutionOutcome::Failure { error, .. } => {
                    tracing::debug!(test = %self.name, "test body failed");
                    carried = Some(StageError::Body { source: error });
                }
            }
        }

        let last = self.after.len().checked_sub(1);
        for (index, hook) in self.after.iter().enumerate() {
            match execute(hook.as_ref(), Arc::clone(&assert), args.clone()).await {
                ExecutionOutcome::Success(next) => args = next,
                ExecutionOutcome::Failure {
                    error,
                    args: at_failure,
                } => {
                    args = at_failure;
                    let failure = StageError::After {
                        index,
                        source: error,
                    };
                    if Some(index) == last {
                        // The terminal position always wins.
                        carried = Some(failure);
                    } else {
                        tracing::warn!(test = %self.name, index, "after hook failed; recorded as diagnostic");
                        assert.error(&failure);
                    }
                }
            }
        }

        latch.signal(carried);
    }
}
