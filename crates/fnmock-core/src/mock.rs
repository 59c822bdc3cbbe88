//! The handle a test holds while it mocks a function.

use crate::binding::FunctionBinding;
use crate::call::Call;
use crate::context::TestId;
use crate::errors::{DeclareError, VerifyError};
use crate::queue::{CallQueue, QueuePhase};
use crate::report::Reporter;
use fnmock_common::Value;
use std::sync::Arc;

/// One test's hold on a mocked function.
///
/// Dropping the handle releases it, as does [`done`](Self::done). When the
/// last test holding a function releases it, the original is restored.
#[must_use = "dropping the handle ends the mock immediately"]
pub struct MockFn {
    binding: Arc<FunctionBinding>,
    queue: Arc<CallQueue>,
    reporter: Reporter,
    released: bool,
}

impl MockFn {
    pub(crate) fn new(binding: Arc<FunctionBinding>, queue: Arc<CallQueue>, reporter: Reporter) -> Self {
        Self {
            binding,
            queue,
            reporter,
            released: false,
        }
    }

    pub fn name(&self) -> &str {
        self.binding.name()
    }

    pub fn test_id(&self) -> &TestId {
        self.queue.test()
    }

    /// Declare the next expected call.
    pub fn want(&self, call: Call) -> Result<(), DeclareError> {
        self.queue.declare(call)
    }

    /// Declare the next expected call, panicking on an invalid declaration.
    pub fn must_want(&self, call: Call) {
        if let Err(err) = self.want(call) {
            panic!("{}", self.reporter.declare(&err));
        }
    }

    /// Check the recorded calls against the declarations, then reset.
    pub fn verify(&self) -> Result<(), VerifyError> {
        self.queue.verify_and_reset()
    }

    /// Like [`verify`](Self::verify), panicking with every discrepancy.
    pub fn assert_verified(&self) {
        if let Err(err) = self.verify() {
            panic!("{}", self.reporter.verify(&err));
        }
    }

    /// Calls recorded since the last verification.
    pub fn calls(&self) -> Vec<Vec<Value>> {
        self.queue.calls()
    }

    pub fn pending(&self) -> usize {
        self.queue.pending()
    }

    pub fn phase(&self) -> QueuePhase {
        self.queue.phase()
    }

    /// Release this test's hold. Returns whether the original function was
    /// restored, i.e. whether this was the last hold.
    pub fn done(mut self) -> bool {
        self.release()
    }

    fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;
        self.binding.unregister_queue(self.queue.test())
    }
}

impl Drop for MockFn {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for MockFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockFn")
            .field("function", &self.name())
            .field("test", self.test_id())
            .field("released", &self.released)
            .finish()
    }
}
