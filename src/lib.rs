//! Composable before/after lifecycle hooks around individual test cases.
//!
//! `around` wraps one test-case invocation with ordered before- and
//! after-stages, threads an argument tuple from stage to stage, and
//! guarantees the host's completion signal fires exactly once no matter how
//! many stages succeed, fail, or resolve asynchronously.
//!
//! # Architecture
//!
//! ```text
//! Pipeline (immutable, chainable)
//!   .before(h1).before(h2)        ordered before-chain
//!   .after(h3)                    ordered after-chain (forced)
//!   .test(name, body)  ──────►  Registrar (host boundary)
//!                                     │ host drives the test
//!                                     ▼
//!                               TestEntry::run(assert)
//!                                 before-chain → body → after-chain
//!                                 CompletionLatch → Assert::end (once)
//! ```
//!
//! Before-hooks run in registration order and thread the argument tuple
//! forward; a failure short-circuits the remaining before-hooks and the body.
//! After-hooks always run — an earlier failure does not stop teardown — and
//! a non-last after-hook failure is demoted to a diagnostic while the chain
//! continues. The terminal error is the earliest before/body failure unless
//! the *last* after-hook fails, which always overrides.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use around::hooks::{from_fn, HookOutcome};
//! use around::pipeline::Pipeline;
//! use around::testing::RecordingRegistrar;
//! use serde_json::json;
//!
//! let registrar = Arc::new(RecordingRegistrar::new());
//! let block = Pipeline::new(registrar)
//!     .before(from_fn(|t| async move {
//!         t.next(vec![json!(100)]);
//!         Ok(HookOutcome::Deferred)
//!     }))
//!     .after(from_fn(|t| async move {
//!         t.pass("after called");
//!         t.end(None);
//!         Ok(HookOutcome::Deferred)
//!     }));
//!
//! block.test("passing values", from_fn(|t| async move {
//!     assert_eq!(t.arg(0), Some(&json!(100)));
//!     t.end(None);
//!     Ok(HookOutcome::Deferred)
//! }));
//! ```

pub mod error;
pub mod hooks;
pub mod host;
pub mod pipeline;
pub mod testing;

pub use error::{HookError, StageError};
pub use pipeline::Pipeline;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::error::{HookError, StageError};
    pub use crate::hooks::{from_fn, ExecutionOutcome, Hook, HookContext, HookOutcome};
    pub use crate::host::{Assert, RegisterMode, Registrar};
    pub use crate::pipeline::{CompletionLatch, Pipeline, TestEntry};
}
