//! Mockable function slots.
//!
//! A [`FnSlot`] stands in for a function-typed variable: call sites go
//! through [`FnSlot::call`], and the mock registry swaps the installed
//! callable for an interceptor without touching those call sites.
//!
//! ```ignore
//! static GREET: LazyLock<FnSlot> = LazyLock::new(|| {
//!     FnSlot::new(
//!         "greet",
//!         Signature::new([ValueType::Str], [ValueType::Str, ValueType::Error]),
//!         |args| {
//!             let name = args[0].as_str().unwrap_or_default();
//!             args![format!("hello {name}"), Value::nil_error()]
//!         },
//!     )
//! });
//!
//! let out = GREET.call(args!["Ann"])?;
//! ```
//!
//! The installed callable is either the original or a proxy, never anything
//! else. It is replaced exactly twice per interception: once when the proxy
//! is installed and once when the original is restored.

use crate::errors::CallError;
use fnmock_common::{Signature, Value, coerce_tuple};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::trace;

/// A function body operating on tagged values.
pub type Callable = Arc<dyn Fn(Vec<Value>) -> Vec<Value> + Send + Sync>;

static NEXT_FN_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a slot, used as the registry key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FnId(u64);

impl FnId {
    fn next() -> Self {
        Self(NEXT_FN_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Identity of the registry whose proxy currently occupies a slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct OwnerId(pub(crate) u64);

struct Installed {
    callable: Callable,
    owner: Option<OwnerId>,
}

pub struct FnSlot {
    id: FnId,
    name: Arc<str>,
    signature: Signature,
    original: Callable,
    installed: RwLock<Installed>,
}

impl FnSlot {
    pub fn new<F>(name: impl Into<Arc<str>>, signature: Signature, body: F) -> Self
    where
        F: Fn(Vec<Value>) -> Vec<Value> + Send + Sync + 'static,
    {
        let original: Callable = Arc::new(body);
        Self {
            id: FnId::next(),
            name: name.into(),
            signature,
            installed: RwLock::new(Installed {
                callable: Arc::clone(&original),
                owner: None,
            }),
            original,
        }
    }

    pub const fn id(&self) -> FnId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    pub const fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Invoke whatever is currently installed.
    ///
    /// Arguments are coerced to the declared parameter types first, the way a
    /// statically typed call site would convert them. The slot lock is not
    /// held while the callable runs.
    pub fn call(&self, args: Vec<Value>) -> Result<Vec<Value>, CallError> {
        let args = self.check_args(args)?;
        let callable = self.current();
        Ok(callable(args))
    }

    /// Invoke the original body, bypassing any installed proxy.
    pub fn call_original(&self, args: Vec<Value>) -> Result<Vec<Value>, CallError> {
        let args = self.check_args(args)?;
        Ok((self.original)(args))
    }

    pub fn is_intercepted(&self) -> bool {
        self.read().owner.is_some()
    }

    pub(crate) fn original(&self) -> Callable {
        Arc::clone(&self.original)
    }

    fn current(&self) -> Callable {
        Arc::clone(&self.read().callable)
    }

    /// Swap `proxy` in. Fails when a proxy is already installed.
    pub(crate) fn install_proxy(&self, proxy: Callable, owner: OwnerId) -> Result<(), OwnerId> {
        let mut installed = self.installed.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = installed.owner {
            return Err(existing);
        }
        installed.callable = proxy;
        installed.owner = Some(owner);
        trace!(function = %self.name, owner = owner.0, "FnSlot::install_proxy");
        Ok(())
    }

    /// Put `original` back. Only the owner that installed the proxy may restore.
    pub(crate) fn restore(&self, original: Callable, owner: OwnerId) {
        let mut installed = self.installed.write().unwrap_or_else(PoisonError::into_inner);
        if installed.owner != Some(owner) {
            return;
        }
        installed.callable = original;
        installed.owner = None;
        trace!(function = %self.name, owner = owner.0, "FnSlot::restore");
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Installed> {
        self.installed.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_args(&self, args: Vec<Value>) -> Result<Vec<Value>, CallError> {
        let want = self.signature.num_in();
        if args.len() != want {
            return Err(CallError::Arity {
                function: self.shared_name(),
                want,
                got: args.len(),
            });
        }
        coerce_tuple(args, self.signature.params()).map_err(|(index, err)| {
            CallError::TypeMismatch {
                function: self.shared_name(),
                index,
                want: err.want,
                got: err.got,
            }
        })
    }
}

impl fmt::Debug for FnSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSlot")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("intercepted", &self.is_intercepted())
            .finish()
    }
}

#[cfg(test)]
#[path = "../tests/slot_tests.rs"]
mod tests;
