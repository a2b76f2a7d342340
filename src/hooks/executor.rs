//! Normalizes every hook calling style into one asynchronous outcome.
//!
//! A hook may settle its stage by calling a context primitive, by returning a
//! resolving [`HookOutcome`](crate::hooks::HookOutcome), or by returning an
//! error. All three paths funnel into a single-assignment [`OutcomeCell`]:
//! the first settlement wins, so a hook that both calls `next` and returns a
//! value cannot double-resolve the stage.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;

use crate::error::HookError;
use crate::hooks::hook::{Hook, HookContext, HookOutcome};
use crate::host::Assert;

/// Final result of running one hook (or the test body).
#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    /// The stage succeeded; carry this argument tuple forward.
    Success(Vec<serde_json::Value>),
    /// The stage failed; `args` is the tuple as it stood at invocation.
    Failure {
        error: HookError,
        args: Vec<serde_json::Value>,
    },
}

impl ExecutionOutcome {
    /// The argument tuple carried by either variant.
    pub fn args(&self) -> &[serde_json::Value] {
        match self {
            ExecutionOutcome::Success(args) => args,
            ExecutionOutcome::Failure { args, .. } => args,
        }
    }
}

/// Single-assignment result cell shared between a hook's context and the
/// executor. Writes after the first are rejected.
pub(crate) struct OutcomeCell {
    tx: Mutex<Option<oneshot::Sender<ExecutionOutcome>>>,
}

impl OutcomeCell {
    pub(crate) fn new() -> (Arc<Self>, oneshot::Receiver<ExecutionOutcome>) {
        let (tx, rx) = oneshot::channel();
        let cell = Arc::new(Self {
            tx: Mutex::new(Some(tx)),
        });
        (cell, rx)
    }

    /// Attempt to settle the cell. Returns `false` if it already settled.
    pub(crate) fn settle(&self, outcome: ExecutionOutcome) -> bool {
        let tx = self
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match tx {
            // The receiver outlives every settle call, so send only fails if
            // the executor itself was dropped; nothing left to report then.
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }
}

/// Run one hook against the current argument tuple.
///
/// The hook receives an immutable snapshot of `args`; a failure always
/// carries that snapshot, never a partially updated tuple.
pub(crate) async fn execute(
    hook: &dyn Hook,
    assert: Arc<dyn Assert>,
    args: Vec<serde_json::Value>,
) -> ExecutionOutcome {
    let (cell, outcome_rx) = OutcomeCell::new();
    let snapshot = Arc::new(args);
    let ctx = HookContext::new(assert, Arc::clone(&snapshot), Arc::clone(&cell));

    match hook.run(ctx).await {
        Ok(HookOutcome::Deferred) => {
            // A context primitive settles the stage, possibly from a task
            // the hook spawned. We only wait.
        }
        Ok(HookOutcome::Continue) => {
            cell.settle(ExecutionOutcome::Success(snapshot.to_vec()));
        }
        Ok(HookOutcome::Next(values)) => {
            cell.settle(ExecutionOutcome::Success(values));
        }
        Ok(HookOutcome::NextAdd(values)) => {
            let mut next = snapshot.to_vec();
            next.extend(values);
            cell.settle(ExecutionOutcome::Success(next));
        }
        Err(error) => {
            cell.settle(ExecutionOutcome::Failure {
                error,
                args: snapshot.to_vec(),
            });
        }
    }

    // Release the executor's own cell reference; once the hook's context
    // clones are gone too, the receiver below observes sender closure
    // instead of waiting forever.
    drop(cell);

    match outcome_rx.await {
        Ok(outcome) => outcome,
        // Every context clone was dropped without a settlement. The outcome
        // can never arrive, so surface it instead of hanging.
        Err(_) => ExecutionOutcome::Failure {
            error: HookError::Unsettled,
            args: snapshot.to_vec(),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::hooks::hook::from_fn;
    use crate::testing::{AssertCall, RecordingAssert};

    fn assert_stub() -> Arc<RecordingAssert> {
        Arc::new(RecordingAssert::new())
    }

    #[tokio::test]
    async fn test_continue_keeps_tuple() {
        let hook = from_fn(|_t| async { Ok(HookOutcome::Continue) });
        let outcome = execute(&hook, assert_stub(), vec![json!(1)]).await;
        match outcome {
            ExecutionOutcome::Success(args) => assert_eq!(args, vec![json!(1)]),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_returned_next_replaces_tuple() {
        let hook = from_fn(|_t| async { Ok(HookOutcome::Next(vec![json!(200)])) });
        let outcome = execute(&hook, assert_stub(), vec![json!(100)]).await;
        assert_eq!(outcome.args(), &[json!(200)]);
    }

    #[tokio::test]
    async fn test_returned_next_add_appends() {
        let hook = from_fn(|_t| async { Ok(HookOutcome::NextAdd(vec![json!(200)])) });
        let outcome = execute(&hook, assert_stub(), vec![json!(100)]).await;
        assert_eq!(outcome.args(), &[json!(100), json!(200)]);
    }

    #[tokio::test]
    async fn test_primitive_next_resolves() {
        let hook = from_fn(|t: HookContext| async move {
            t.next(vec![json!("a")]);
            Ok(HookOutcome::Deferred)
        });
        let outcome = execute(&hook, assert_stub(), Vec::new()).await;
        assert_eq!(outcome.args(), &[json!("a")]);
    }

    #[tokio::test]
    async fn test_primitive_next_add_appends() {
        let hook = from_fn(|t: HookContext| async move {
            t.next_add(vec![json!(200)]);
            Ok(HookOutcome::Deferred)
        });
        let outcome = execute(&hook, assert_stub(), vec![json!(100)]).await;
        assert_eq!(outcome.args(), &[json!(100), json!(200)]);
    }

    #[tokio::test]
    async fn test_error_return_carries_snapshot() {
        let hook = from_fn(|t: HookContext| async move {
            // Attempted replacement must not leak into the failure.
            drop(t);
            Err(HookError::failed("boom"))
        });
        let outcome = execute(&hook, assert_stub(), vec![json!(7)]).await;
        match outcome {
            ExecutionOutcome::Failure { error, args } => {
                assert_eq!(error.to_string(), "hook failed: boom");
                assert_eq!(args, vec![json!(7)]);
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_primitive_end_with_error_fails() {
        let hook = from_fn(|t: HookContext| async move {
            t.end(Some(HookError::failed("e1")));
            Ok(HookOutcome::Deferred)
        });
        let outcome = execute(&hook, assert_stub(), vec![json!(1)]).await;
        match outcome {
            ExecutionOutcome::Failure { args, .. } => assert_eq!(args, vec![json!(1)]),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_first_settlement_wins() {
        // Primitive fires before the return value is inspected, so the
        // returned replacement loses.
        let hook = from_fn(|t: HookContext| async move {
            t.next(vec![json!(1)]);
            Ok(HookOutcome::Next(vec![json!(2)]))
        });
        let outcome = execute(&hook, assert_stub(), Vec::new()).await;
        assert_eq!(outcome.args(), &[json!(1)]);
    }

    #[tokio::test]
    async fn test_deferred_settlement_from_spawned_task() {
        let hook = from_fn(|t: HookContext| async move {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                t.next(vec![json!(42)]);
            });
            Ok(HookOutcome::Deferred)
        });
        let outcome = execute(&hook, assert_stub(), Vec::new()).await;
        assert_eq!(outcome.args(), &[json!(42)]);
    }

    #[tokio::test]
    async fn test_deferred_without_settlement_is_a_failure() {
        // The context is dropped with the hook's future, so the outcome can
        // never arrive.
        let hook = from_fn(|_t| async { Ok(HookOutcome::Deferred) });
        let outcome = execute(&hook, assert_stub(), Vec::new()).await;
        assert!(matches!(
            outcome,
            ExecutionOutcome::Failure {
                error: HookError::Unsettled,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_deferred_context_dropped_in_task_is_a_failure() {
        // The last context clone goes away only after the hook has already
        // returned; the executor must notice instead of waiting forever.
        let hook = from_fn(|t: HookContext| async move {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                drop(t);
            });
            Ok(HookOutcome::Deferred)
        });
        let outcome = execute(&hook, assert_stub(), vec![json!(3)]).await;
        match outcome {
            ExecutionOutcome::Failure {
                error: HookError::Unsettled,
                args,
            } => assert_eq!(args, vec![json!(3)]),
            other => panic!("expected unsettled failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_double_end_reports_local_diagnostic() {
        let hook = from_fn(|t: HookContext| async move {
            t.end(None);
            t.end(None);
            Ok(HookOutcome::Deferred)
        });
        let assert = assert_stub();
        let outcome = execute(&hook, Arc::clone(&assert) as Arc<dyn Assert>, Vec::new()).await;
        assert!(matches!(outcome, ExecutionOutcome::Success(_)));
        assert_eq!(
            assert.calls(),
            vec![AssertCall::Error("end called twice".into())]
        );
    }
}
