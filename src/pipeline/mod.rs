//! Pipeline construction and the per-invocation runner.
//!
//! A [`Pipeline`] is a value: `before`/`after`/`only`/`skip` return a new
//! pipeline and never mutate the receiver, so a shared base can branch into
//! independent variants. [`Pipeline::test`] registers a [`TestEntry`] with
//! the host; all hook execution happens when the host drives
//! [`TestEntry::run`].

pub mod builder;
pub mod runner;

pub use builder::{HookList, Pipeline};
pub use runner::{CompletionLatch, TestEntry};
