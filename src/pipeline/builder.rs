//! Immutable, chainable pipeline construction.

use std::fmt;
use std::sync::Arc;

use crate::hooks::Hook;
use crate::host::{RegisterMode, Registrar};
use crate::pipeline::runner::TestEntry;

/// Ordered sequence of hooks. Insertion order is execution order.
///
/// Appending produces a new list; the hooks themselves are shared between
/// the old and new list rather than copied.
#[derive(Clone, Default)]
pub struct HookList {
    hooks: Arc<Vec<Arc<dyn Hook>>>,
}

impl HookList {
    /// A new list with `hook` appended. The receiver is unchanged.
    pub fn appended(&self, hook: Arc<dyn Hook>) -> HookList {
        let mut hooks = Vec::with_capacity(self.hooks.len() + 1);
        hooks.extend(self.hooks.iter().cloned());
        hooks.push(hook);
        HookList {
            hooks: Arc::new(hooks),
        }
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Hook>> {
        self.hooks.iter()
    }
}

impl fmt::Debug for HookList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookList").field("len", &self.len()).finish()
    }
}

/// An immutable composition of before/after hooks bound to a registrar.
///
/// Every builder call returns a *new* pipeline; the receiver never changes.
/// That makes a shared base pipeline safe to branch into independent
/// variants:
///
/// ```no_run
/// # use std::sync::Arc;
/// # use around::pipeline::Pipeline;
/// # use around::hooks::{from_fn, HookOutcome};
/// # use around::testing::RecordingRegistrar;
/// let base = Pipeline::new(Arc::new(RecordingRegistrar::new()))
///     .before(from_fn(|t| async move { t.next(vec![]); Ok(HookOutcome::Deferred) }));
/// let with_teardown = base.after(from_fn(|t| async move { t.end(None); Ok(HookOutcome::Deferred) }));
/// // `base` still has no after-hooks.
/// # let _ = (base, with_teardown);
/// ```
#[derive(Clone)]
pub struct Pipeline {
    registrar: Arc<dyn Registrar>,
    label: Option<String>,
    mode: RegisterMode,
    before: HookList,
    after: HookList,
}

impl Pipeline {
    /// A pipeline with empty hook lists bound to `registrar`.
    pub fn new(registrar: Arc<dyn Registrar>) -> Self {
        Self {
            registrar,
            label: None,
            mode: RegisterMode::Normal,
            before: HookList::default(),
            after: HookList::default(),
        }
    }

    /// Prefix every registered test name with `"<label> "`.
    ///
    /// The label survives `before`/`after`/`only`/`skip` chaining.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// A new pipeline with `hook` appended to the before-chain.
    pub fn before(&self, hook: impl Hook + 'static) -> Pipeline {
        Pipeline {
            before: self.before.appended(Arc::new(hook)),
            after: self.after.clone(),
            registrar: Arc::clone(&self.registrar),
            label: self.label.clone(),
            mode: self.mode,
        }
    }

    /// A new pipeline with `hook` appended to the after-chain.
    pub fn after(&self, hook: impl Hook + 'static) -> Pipeline {
        Pipeline {
            before: self.before.clone(),
            after: self.after.appended(Arc::new(hook)),
            registrar: Arc::clone(&self.registrar),
            label: self.label.clone(),
            mode: self.mode,
        }
    }

    /// A new pipeline registering through the host's exclusive variant.
    pub fn only(&self) -> Pipeline {
        self.with_mode(RegisterMode::Only)
    }

    /// A new pipeline registering through the host's skip variant.
    pub fn skip(&self) -> Pipeline {
        self.with_mode(RegisterMode::Skip)
    }

    fn with_mode(&self, mode: RegisterMode) -> Pipeline {
        Pipeline {
            before: self.before.clone(),
            after: self.after.clone(),
            registrar: Arc::clone(&self.registrar),
            label: self.label.clone(),
            mode,
        }
    }

    /// The registration mode derived tests will use.
    pub fn mode(&self) -> RegisterMode {
        self.mode
    }

    /// The configured name prefix, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Register one test with the host. No hook runs until the host drives
    /// the returned entry.
    pub fn test(&self, name: impl Into<String>, body: impl Hook + 'static) {
        let name = name.into();
        let name = match &self.label {
            Some(label) => format!("{label} {name}"),
            None => name,
        };
        tracing::debug!(test = %name, before = self.before.len(), after = self.after.len(), "registering test");
        self.registrar.register(TestEntry::new(
            name,
            self.mode,
            self.before.clone(),
            self.after.clone(),
            Arc::new(body),
        ));
    }
}
