//! Boundary traits for the underlying test-registration host.
//!
//! The pipeline does not run tests itself. It hands each registered test to a
//! [`Registrar`] and, when the host later drives the test, reports assertions
//! and the final completion signal through an [`Assert`] object. Both traits
//! are intentionally minimal so any harness (or a recording stub, see
//! [`crate::testing`]) can sit behind them.

use crate::error::StageError;
use crate::pipeline::TestEntry;

/// Which registration variant of the host a test should use.
///
/// Stands in for `test`, `test.only` and `test.skip` on callback-style hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RegisterMode {
    /// Register normally.
    #[default]
    Normal,
    /// Register as exclusive: only these tests run.
    Only,
    /// Register but do not execute.
    Skip,
}

/// The host's test registration surface.
///
/// Registration must be side-effect free with respect to hook execution: no
/// hook runs until the host drives [`TestEntry::run`].
pub trait Registrar: Send + Sync {
    fn register(&self, entry: TestEntry);
}

/// The host's per-test assertion object.
///
/// The pipeline forwards `pass` and `plan` unchanged, reports non-fatal
/// failures through `error`, and fires `end` exactly once per invocation
/// (guarded by the completion latch).
pub trait Assert: Send + Sync {
    /// Record a passing assertion.
    fn pass(&self, message: &str);

    /// Declare the expected number of assertions.
    fn plan(&self, count: usize);

    /// Record a non-fatal error diagnostic.
    fn error(&self, err: &StageError);

    /// Signal completion of the test, failing it if `err` is `Some`.
    fn end(&self, err: Option<StageError>);
}
