//! Runtime function mocking for tests.
//!
//! Production code calls mockable functions through a [`FnSlot`]. A test
//! obtains a [`MockFn`] for the slot from a [`MockRegistry`], declares the
//! calls it expects with [`Call`], runs the code under test and verifies:
//!
//! ```ignore
//! use fnmock::{Call, FnSlot, MockConfig, MockRegistry, Signature, Value, ValueType, args, test_context};
//! use std::sync::LazyLock;
//!
//! static GREET: LazyLock<FnSlot> = LazyLock::new(|| {
//!     FnSlot::new(
//!         "greet",
//!         Signature::new([ValueType::Str], [ValueType::Str, ValueType::Error]),
//!         |args| args![format!("hello {}", args[0].as_str().unwrap_or_default()), Value::nil_error()],
//!     )
//! });
//! static MOCKS: LazyLock<MockRegistry> = LazyLock::new(MockRegistry::new);
//!
//! #[test]
//! fn test_greets_ann() -> anyhow::Result<()> {
//!     let _ctx = test_context!("test_greets_ann");
//!     let greet = MOCKS.mock(&GREET)?;
//!     greet.want(Call::with(args!["Ann"]).returns(args!["hi Ann", Value::nil_error()]))?;
//!     assert_eq!(GREET.call(args!["Ann"])?[0].as_str(), Some("hi Ann"));
//!     greet.verify()?;
//!     Ok(())
//! }
//! ```
//!
//! Set `FNMOCK_LOG=trace` and call [`tracing_config::init_tracing`] to see
//! every interception decision.

// Value model
pub use fnmock_common::{
    CoerceError, Data, FloatKind, IntKind, Signature, Value, ValueType, coerce, structurally_equal,
};

// Slots, context and the registry
pub use fnmock_core::{
    Callable, ContextGuard, ContextResolver, FallbackResolver, FnId, FnSlot, ScopedResolver,
    TestContext, TestId,
};
pub use fnmock_core::{
    BacktraceSource, CallChainResolver, CapturedChain, ChainConventions, Frame, FrameSource,
};
pub use fnmock_core::{Call, CallQueue, FunctionBinding, MockFn, MockRegistry, QueuePhase};

// Errors and reporting
pub use fnmock_core::{
    CallError, DeclareError, Direction, Mismatch, MismatchList, MockError, RegisterError,
    ResolutionError, Reporter, VerifyError,
};

// Configuration
pub use fnmock_core::{ColorMode, ConfigError, ContextStrategy, MockConfig};

pub use fnmock_core::{args, test_context};

pub mod tracing_config;
