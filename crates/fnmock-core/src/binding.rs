//! Function bindings: the interceptor installed in a slot.
//!
//! A [`FunctionBinding`] owns the original callable of one [`FnSlot`], the
//! proxy installed in its place, and one [`CallQueue`] per test that is
//! currently mocking the function. It lives from the first mock request for
//! the slot until the last test releases it, at which point the original is
//! put back and the registry entry is dropped.
//!
//! # Locking
//!
//! The binding's own mutex guards the test-to-queue map and nothing else. It
//! is never held while the original function runs or while values are
//! compared, so concurrent calls from different tests do not serialize on
//! it. Restoring the original happens under this lock, which is what keeps a
//! restore from racing a concurrent registration.

use crate::context::{ContextResolver, TestId};
use crate::errors::RegisterError;
use crate::queue::CallQueue;
use crate::registry::RegistryShared;
use crate::slot::{Callable, FnSlot, OwnerId};
use fnmock_common::{Signature, Value};
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, trace};

#[derive(Default)]
struct BindingState {
    queues: FxHashMap<TestId, Arc<CallQueue>>,
    /// Set once the original has been restored. A retired binding accepts no
    /// new queues; callers go back to the registry for a fresh one.
    retired: bool,
}

/// Outcome of [`FunctionBinding::register_queue`].
pub(crate) enum Registration {
    Registered(Arc<CallQueue>),
    Retired,
}

pub struct FunctionBinding {
    slot: &'static FnSlot,
    original: Callable,
    proxy: Callable,
    owner: OwnerId,
    resolver: Arc<dyn ContextResolver>,
    registry: Weak<RegistryShared>,
    state: Mutex<BindingState>,
}

impl FunctionBinding {
    /// Build a binding for `slot` and install its proxy.
    pub(crate) fn install(
        slot: &'static FnSlot,
        owner: OwnerId,
        resolver: Arc<dyn ContextResolver>,
        registry: Weak<RegistryShared>,
    ) -> Result<Arc<Self>, RegisterError> {
        let original = slot.original();
        let binding = Arc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            let fallback = Arc::clone(&original);
            let proxy: Callable = Arc::new(move |args: Vec<Value>| match weak.upgrade() {
                Some(binding) => binding.dispatch(args),
                None => fallback(args),
            });
            Self {
                slot,
                original,
                proxy,
                owner,
                resolver,
                registry,
                state: Mutex::new(BindingState::default()),
            }
        });

        slot.install_proxy(Arc::clone(&binding.proxy), owner)
            .map_err(|_| RegisterError::Intercepted {
                function: slot.shared_name(),
            })?;
        debug!(function = slot.name(), fn_id = slot.id().get(), "FunctionBinding::install");
        Ok(binding)
    }

    pub fn name(&self) -> &str {
        self.slot.name()
    }

    pub fn signature(&self) -> &Signature {
        self.slot.signature()
    }

    pub fn slot(&self) -> &'static FnSlot {
        self.slot
    }

    /// Number of tests currently holding a queue on this binding.
    pub fn active_tests(&self) -> usize {
        self.state().queues.len()
    }

    fn state(&self) -> MutexGuard<'_, BindingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn register_queue(&self, test: TestId) -> Result<Registration, RegisterError> {
        let mut state = self.state();
        if state.retired {
            return Ok(Registration::Retired);
        }
        if state.queues.contains_key(&test) {
            return Err(RegisterError::Duplicate {
                function: self.slot.shared_name(),
                test,
            });
        }
        let queue = Arc::new(CallQueue::new(
            self.slot.shared_name(),
            self.slot.signature().clone(),
            test.clone(),
        ));
        state.queues.insert(test.clone(), Arc::clone(&queue));
        debug!(function = self.name(), %test, active = state.queues.len(), "FunctionBinding::register_queue");
        Ok(Registration::Registered(queue))
    }

    /// Drop `test`'s queue. Restores the original and leaves the registry
    /// once no queue remains. Returns whether the original was restored.
    pub(crate) fn unregister_queue(&self, test: &TestId) -> bool {
        let mut state = self.state();
        state.queues.remove(test);
        debug!(function = self.name(), %test, active = state.queues.len(), "FunctionBinding::unregister_queue");
        if !state.queues.is_empty() || state.retired {
            return false;
        }

        state.retired = true;
        self.slot.restore(Arc::clone(&self.original), self.owner);
        if let Some(registry) = self.registry.upgrade() {
            registry.release(self);
        }
        debug!(function = self.name(), "FunctionBinding restored original");
        true
    }

    fn queue_for(&self, test: &TestId) -> Option<Arc<CallQueue>> {
        self.state().queues.get(test).cloned()
    }

    /// The proxy body.
    fn dispatch(&self, args: Vec<Value>) -> Vec<Value> {
        let test = match self.resolver.resolve() {
            Ok(test) => test,
            Err(err) => {
                trace!(function = self.name(), %err, "dispatch: fall-through, unresolved test");
                return (self.original)(args);
            }
        };
        let Some(queue) = self.queue_for(&test) else {
            trace!(function = self.name(), %test, "dispatch: fall-through, no queue");
            return (self.original)(args);
        };
        match queue.record(&args) {
            Some(out) => {
                trace!(function = self.name(), %test, "dispatch: fake output");
                out
            }
            None => {
                trace!(function = self.name(), %test, "dispatch: fall-through, no fake output");
                (self.original)(args)
            }
        }
    }
}

impl std::fmt::Debug for FunctionBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionBinding")
            .field("function", &self.name())
            .field("owner", &self.owner)
            .field("active_tests", &self.active_tests())
            .finish()
    }
}
