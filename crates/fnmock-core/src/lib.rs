//! Runtime function mocking for tests.
//!
//! A function that tests may need to fake is declared as a [`FnSlot`]. Tests
//! ask a [`MockRegistry`] to mock the slot, which swaps an interceptor in
//! without changing any call site. Each test then declares expected calls
//! with [`Call`], exercises the code under test, verifies, and releases.
//!
//! | Module | Contents |
//! |--------|----------|
//! | `slot` | [`FnSlot`], the swappable function variable |
//! | `context`, `chain` | Which test is running ([`TestContext`], [`CallChainResolver`]) |
//! | `registry` | [`MockRegistry`], one binding per slot |
//! | `binding` | [`FunctionBinding`]: original, proxy and per-test queues |
//! | `queue` | [`CallQueue`]: declared expectations and recorded calls |
//! | `mock`, `call` | [`MockFn`] handle and the [`Call`] builder |
//! | `errors`, `report` | Error taxonomy and its colored rendering |
//! | `config` | [`MockConfig`] from code, JSON or the environment |

// Function variables
pub mod slot;
pub use slot::{Callable, FnId, FnSlot};

// Test-context resolution
pub mod context;
pub use context::{
    ContextGuard, ContextResolver, FallbackResolver, ScopedResolver, TestContext, TestId,
};
pub mod chain;
pub use chain::{
    BacktraceSource, CallChainResolver, CapturedChain, ChainConventions, Frame, FrameSource,
};

// Interception
pub mod registry;
pub use registry::MockRegistry;
pub mod binding;
pub use binding::FunctionBinding;
pub mod queue;
pub use queue::{CallQueue, QueuePhase};
pub mod call;
pub use call::Call;
pub mod mock;
pub use mock::MockFn;

// Errors and their rendering
pub mod errors;
pub use errors::{
    CallError, DeclareError, Direction, Mismatch, MismatchList, MockError, RegisterError,
    ResolutionError, VerifyError,
};
pub mod report;
pub use report::Reporter;

// Configuration
pub mod config;
pub use config::{ColorMode, ConfigError, ContextStrategy, MockConfig};

pub use fnmock_common::{Signature, Value, ValueType, args};
