//! Hooks and their execution model.
//!
//! A [`Hook`] is one before-stage, after-stage or test-body function. Three
//! completion styles are supported and normalized by the executor into one
//! [`ExecutionOutcome`]:
//!
//! - **continuation**: call [`HookContext::next`], [`HookContext::next_add`]
//!   or [`HookContext::end`] (possibly later, from a spawned task) and return
//!   [`HookOutcome::Deferred`];
//! - **resolving return**: return [`HookOutcome::Continue`], `Next` or
//!   `NextAdd` without touching the primitives;
//! - **failing return**: return an `Err`, which fails the stage carrying the
//!   argument tuple as it stood at invocation.
//!
//! If a hook mixes styles, the first settlement wins.

pub mod executor;
pub mod hook;

pub use executor::ExecutionOutcome;
pub use hook::{from_fn, FnHook, Hook, HookContext, HookOutcome};
