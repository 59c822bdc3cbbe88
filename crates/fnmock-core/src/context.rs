//! Test-context resolution.
//!
//! Mock state is scoped per test case. The interceptor has to find out which
//! test a call belongs to without being handed anything but the call's
//! arguments, so resolution goes through a [`ContextResolver`]:
//!
//! - [`ScopedResolver`] (default): the test enters an explicit context with
//!   [`TestContext::enter`] or [`test_context!`](crate::test_context), which
//!   is kept on a thread-local stack. The outermost entry wins, so helpers
//!   that enter their own context still resolve to the top-level test.
//! - [`CallChainResolver`](crate::chain::CallChainResolver): inspects the
//!   call chain for a frame that looks like a test function.
//! - [`FallbackResolver`]: tries one resolver, then another.
//!
//! Work handed to other threads keeps its attribution by re-entering the
//! context there with [`TestId::enter`] or [`TestContext::run`].

use crate::errors::ResolutionError;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Opaque identity of a test case, usually its fully qualified name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TestId(Arc<str>);

impl TestId {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Make this test the active context on the current thread until the
    /// guard is dropped.
    #[must_use = "the context is left as soon as the guard is dropped"]
    pub fn enter(&self) -> ContextGuard {
        let token = NEXT_TOKEN.with(|next| {
            let token = next.get();
            next.set(token.wrapping_add(1));
            token
        });
        SCOPES.with(|scopes| scopes.borrow_mut().push((token, self.clone())));
        ContextGuard {
            token,
            _not_send: PhantomData,
        }
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

thread_local! {
    /// Active contexts, oldest first, each tagged with its guard's token.
    static SCOPES: RefCell<Vec<(u64, TestId)>> = const { RefCell::new(Vec::new()) };
    static NEXT_TOKEN: Cell<u64> = const { Cell::new(0) };
}

/// Entry points for the thread-local test context.
pub struct TestContext;

impl TestContext {
    #[must_use = "the context is left as soon as the guard is dropped"]
    pub fn enter(name: impl Into<Arc<str>>) -> ContextGuard {
        TestId::new(name).enter()
    }

    /// The outermost active context on this thread.
    pub fn current() -> Option<TestId> {
        SCOPES
            .try_with(|scopes| scopes.borrow().first().map(|(_, test)| test.clone()))
            .ok()
            .flatten()
    }

    /// Number of nested contexts active on this thread.
    pub fn depth() -> usize {
        SCOPES.try_with(|scopes| scopes.borrow().len()).unwrap_or(0)
    }

    /// Run `f` with `test` as the active context.
    pub fn run<R>(test: &TestId, f: impl FnOnce() -> R) -> R {
        let _guard = test.enter();
        f()
    }
}

/// Leaves a test context when dropped. Not `Send`: a context belongs to the
/// thread that entered it. Guards may be dropped in any order; each one
/// removes only the entry it pushed.
#[derive(Debug)]
pub struct ContextGuard {
    token: u64,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let _ = SCOPES.try_with(|scopes| {
            let mut scopes = scopes.borrow_mut();
            if let Some(at) = scopes.iter().rposition(|(token, _)| *token == self.token) {
                scopes.remove(at);
            }
        });
    }
}

/// Enter a test context named after the calling module and `name`.
///
/// ```ignore
/// let _ctx = test_context!("greet_returns_fake_output");
/// ```
#[macro_export]
macro_rules! test_context {
    ($name:expr) => {
        $crate::TestContext::enter(::std::format!("{}::{}", ::std::module_path!(), $name))
    };
}

/// Determines which test case the current call belongs to.
pub trait ContextResolver: Send + Sync + fmt::Debug {
    fn resolve(&self) -> Result<TestId, ResolutionError>;
}

/// Resolves from the thread-local context stack.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScopedResolver;

impl ContextResolver for ScopedResolver {
    fn resolve(&self) -> Result<TestId, ResolutionError> {
        TestContext::current().ok_or(ResolutionError::NoScope)
    }
}

/// Tries `primary`, then `secondary`. The secondary's error is reported when
/// both fail.
#[derive(Debug)]
pub struct FallbackResolver {
    primary: Arc<dyn ContextResolver>,
    secondary: Arc<dyn ContextResolver>,
}

impl FallbackResolver {
    pub fn new(primary: Arc<dyn ContextResolver>, secondary: Arc<dyn ContextResolver>) -> Self {
        Self { primary, secondary }
    }
}

impl ContextResolver for FallbackResolver {
    fn resolve(&self) -> Result<TestId, ResolutionError> {
        self.primary
            .resolve()
            .or_else(|_| self.secondary.resolve())
    }
}

#[cfg(test)]
#[path = "../tests/context_tests.rs"]
mod tests;
