//! Mock registry.
//!
//! The registry maps each intercepted slot's [`FnId`] to its
//! [`FunctionBinding`], so a slot is wrapped at most once however many tests
//! mock it. Its mutex is held only for lookup, insert and delete.
//!
//! There is no implicit global registry. A test suite keeps one in its own
//! `static` and hands it to every test that mocks functions:
//!
//! ```ignore
//! static MOCKS: LazyLock<MockRegistry> = LazyLock::new(MockRegistry::new);
//!
//! #[test]
//! fn greets() -> Result<(), MockError> {
//!     let _ctx = test_context!("greets");
//!     let greet = MOCKS.mock(&GREET)?;
//!     greet.want(Call::with(args!["Ann"]).returns(args!["hi Ann", Value::nil_error()]))?;
//!     assert_eq!(GREET.call(args!["Ann"])?[0].as_str(), Some("hi Ann"));
//!     greet.verify()?;
//!     Ok(())
//! }
//! ```
//!
//! The registry is populated on the first mock of a slot and drained back to
//! empty once every binding has been released.

use crate::binding::{FunctionBinding, Registration};
use crate::config::{ConfigError, MockConfig};
use crate::context::{ContextResolver, ScopedResolver};
use crate::errors::RegisterError;
use crate::mock::MockFn;
use crate::report::Reporter;
use crate::slot::{FnId, FnSlot, OwnerId};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) struct RegistryShared {
    owner: OwnerId,
    resolver: Arc<dyn ContextResolver>,
    reporter: Reporter,
    config: MockConfig,
    bindings: Mutex<FxHashMap<FnId, Arc<FunctionBinding>>>,
}

impl RegistryShared {
    fn bindings(&self) -> MutexGuard<'_, FxHashMap<FnId, Arc<FunctionBinding>>> {
        self.bindings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remove `binding`'s entry. The binding has already checked that no
    /// queue remains; this only deletes the map entry, and only if it still
    /// points at `binding`.
    pub(crate) fn release(&self, binding: &FunctionBinding) {
        let id = binding.slot().id();
        let mut bindings = self.bindings();
        if bindings
            .get(&id)
            .is_some_and(|entry| std::ptr::eq(Arc::as_ptr(entry), binding))
        {
            bindings.remove(&id);
            debug!(function = binding.name(), remaining = bindings.len(), "MockRegistry::release");
        }
    }
}

/// Cheap-to-clone handle on a registry.
#[derive(Clone)]
pub struct MockRegistry {
    shared: Arc<RegistryShared>,
}

impl Default for MockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRegistry {
    /// A registry configured from the environment.
    ///
    /// An environment that yields an unusable configuration (for instance an
    /// invalid test-name pattern) is reported and replaced by the defaults.
    pub fn new() -> Self {
        Self::with_config(MockConfig::from_env()).unwrap_or_else(|err| {
            warn!(%err, "invalid fnmock configuration, using defaults");
            Self::from_parts(MockConfig::default(), Arc::new(ScopedResolver))
        })
    }

    pub fn with_config(config: MockConfig) -> Result<Self, ConfigError> {
        let resolver = config.build_resolver()?;
        Ok(Self::from_parts(config, resolver))
    }

    /// A registry with an explicitly injected resolver. The config's
    /// context strategy is ignored.
    pub fn with_resolver(config: MockConfig, resolver: Arc<dyn ContextResolver>) -> Self {
        Self::from_parts(config, resolver)
    }

    fn from_parts(config: MockConfig, resolver: Arc<dyn ContextResolver>) -> Self {
        let owner = OwnerId(NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed));
        Self {
            shared: Arc::new(RegistryShared {
                owner,
                resolver,
                reporter: Reporter::from_mode(config.color),
                config,
                bindings: Mutex::new(FxHashMap::default()),
            }),
        }
    }

    pub fn config(&self) -> &MockConfig {
        &self.shared.config
    }

    pub fn reporter(&self) -> Reporter {
        self.shared.reporter
    }

    /// The binding for `slot`, creating it and installing its proxy on first
    /// use. Idempotent while the binding is alive. Only `mock` calls this,
    /// so every binding it creates gets a queue that can release it.
    pub(crate) fn acquire(
        &self,
        slot: &'static FnSlot,
    ) -> Result<Arc<FunctionBinding>, RegisterError> {
        let mut bindings = self.shared.bindings();
        if let Some(binding) = bindings.get(&slot.id()) {
            return Ok(Arc::clone(binding));
        }
        let binding = FunctionBinding::install(
            slot,
            self.shared.owner,
            Arc::clone(&self.shared.resolver),
            Arc::downgrade(&self.shared),
        )?;
        bindings.insert(slot.id(), Arc::clone(&binding));
        debug!(function = slot.name(), bindings = bindings.len(), "MockRegistry::acquire");
        Ok(binding)
    }

    /// Begin mocking `slot` for the current test.
    pub fn mock(&self, slot: &'static FnSlot) -> Result<MockFn, RegisterError> {
        let test = self.shared.resolver.resolve()?;
        loop {
            let binding = self.acquire(slot)?;
            match binding.register_queue(test.clone())? {
                Registration::Registered(queue) => {
                    return Ok(MockFn::new(binding, queue, self.shared.reporter));
                }
                // Lost a race with the last release; the entry is gone now.
                Registration::Retired => continue,
            }
        }
    }

    /// Like [`mock`](Self::mock), panicking with a rendered message on error.
    pub fn must_mock(&self, slot: &'static FnSlot) -> MockFn {
        match self.mock(slot) {
            Ok(mock) => mock,
            Err(err) => panic!("{}", self.shared.reporter.register(&err)),
        }
    }

    pub fn is_mocked(&self, slot: &FnSlot) -> bool {
        self.shared.bindings().contains_key(&slot.id())
    }

    /// Number of live bindings.
    pub fn len(&self) -> usize {
        self.shared.bindings().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for MockRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockRegistry")
            .field("owner", &self.shared.owner)
            .field("resolver", &self.shared.resolver)
            .field("bindings", &self.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../tests/registry_tests.rs"]
mod tests;
