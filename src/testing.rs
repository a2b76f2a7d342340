//! Recording stubs for exercising pipelines without a real test host.
//!
//! Provides:
//! - [`RecordingAssert`]: captures the ordered `pass`/`plan`/`error`/`end`
//!   calls a pipeline makes against the host assertion object
//! - [`RecordingRegistrar`]: captures registered [`TestEntry`]s so a test can
//!   drive them itself
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use around::pipeline::Pipeline;
//! use around::hooks::{from_fn, HookOutcome};
//! use around::testing::{RecordingAssert, RecordingRegistrar};
//!
//! # async fn demo() {
//! let reg = Arc::new(RecordingRegistrar::new());
//! let p = Pipeline::new(reg.clone());
//! p.test("case", from_fn(|t| async move { t.end(None); Ok(HookOutcome::Deferred) }));
//!
//! let assert = Arc::new(RecordingAssert::new());
//! for entry in reg.take() {
//!     entry.run(assert.clone()).await;
//! }
//! assert_eq!(assert.end_count(), 1);
//! # }
//! ```

use std::sync::{Mutex, PoisonError};

use crate::error::StageError;
use crate::host::{Assert, Registrar};
use crate::pipeline::TestEntry;

/// One call observed by [`RecordingAssert`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssertCall {
    Pass(String),
    Plan(usize),
    /// A non-fatal diagnostic, stored as its display form.
    Error(String),
    /// A completion signal; `Some` carries the terminal error's display form.
    End(Option<String>),
}

/// An [`Assert`] that records every call for later inspection.
#[derive(Default)]
pub struct RecordingAssert {
    calls: Mutex<Vec<AssertCall>>,
}

impl RecordingAssert {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: AssertCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    /// All observed calls, in order.
    pub fn calls(&self) -> Vec<AssertCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The diagnostics recorded via `error`, in order.
    pub fn errors(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                AssertCall::Error(msg) => Some(msg),
                _ => None,
            })
            .collect()
    }

    /// How many times `end` was called.
    pub fn end_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, AssertCall::End(_)))
            .count()
    }

    /// The argument of the first `end` call, if any happened.
    ///
    /// `Some(None)` means completion fired with no error.
    pub fn ended_with(&self) -> Option<Option<String>> {
        self.calls().into_iter().find_map(|c| match c {
            AssertCall::End(err) => Some(err),
            _ => None,
        })
    }
}

impl Assert for RecordingAssert {
    fn pass(&self, message: &str) {
        self.push(AssertCall::Pass(message.to_string()));
    }

    fn plan(&self, count: usize) {
        self.push(AssertCall::Plan(count));
    }

    fn error(&self, err: &StageError) {
        self.push(AssertCall::Error(err.to_string()));
    }

    fn end(&self, err: Option<StageError>) {
        self.push(AssertCall::End(err.map(|e| e.to_string())));
    }
}

/// A [`Registrar`] that stores entries instead of scheduling them.
#[derive(Default)]
pub struct RecordingRegistrar {
    entries: Mutex<Vec<TestEntry>>,
}

impl RecordingRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every entry registered so far, in order.
    pub fn take(&self) -> Vec<TestEntry> {
        std::mem::take(
            &mut *self
                .entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Registrar for RecordingRegistrar {
    fn register(&self, entry: TestEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}
