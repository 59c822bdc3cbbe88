//! Per-test call expectation queues.
//!
//! A [`CallQueue`] belongs to one test and one function binding. It holds the
//! declared expectations in order, the log of calls the interceptor actually
//! saw, and a cursor counting dispatched calls.
//!
//! ```text
//! Empty --declare--> Declaring --call--> Replaying --verify--> Empty
//! ```
//!
//! Declarations may keep arriving while replaying; only verification resets.

use crate::call::Call;
use crate::context::TestId;
use crate::errors::{DeclareError, Direction, Mismatch, MismatchList, VerifyError};
use fnmock_common::{Signature, Value, coerce_tuple, structurally_equal};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

#[derive(Debug, Default)]
struct Expectation {
    /// `None`: the input of this call is not checked.
    input: Option<Vec<Value>>,
    /// `None`: this call falls through to the original function.
    output: Option<Vec<Value>>,
}

#[derive(Debug, Default)]
struct QueueState {
    expected: Vec<Expectation>,
    actual: Vec<Vec<Value>>,
    cursor: usize,
}

/// Lifecycle phase of a queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QueuePhase {
    Empty,
    Declaring,
    Replaying,
}

#[derive(Debug)]
pub struct CallQueue {
    function: Arc<str>,
    signature: Signature,
    test: TestId,
    state: Mutex<QueueState>,
}

impl CallQueue {
    pub(crate) fn new(function: Arc<str>, signature: Signature, test: TestId) -> Self {
        Self {
            function,
            signature,
            test,
            state: Mutex::new(QueueState::default()),
        }
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub const fn test(&self) -> &TestId {
        &self.test
    }

    fn state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate `call` against the signature and append it.
    ///
    /// Values are coerced here, once, so dispatch never has to.
    pub fn declare(&self, call: Call) -> Result<(), DeclareError> {
        let (input, output) = call.into_parts();

        if let Some(input) = &input {
            self.check_arity(input.len(), self.signature.num_in(), Direction::In)?;
        }
        if let Some(output) = &output {
            self.check_arity(output.len(), self.signature.num_out(), Direction::Out)?;
        }
        let input = input
            .map(|values| self.coerce(values, Direction::In))
            .transpose()?;
        let output = output
            .map(|values| self.coerce(values, Direction::Out))
            .transpose()?;

        let mut state = self.state();
        state.expected.push(Expectation { input, output });
        trace!(
            function = %self.function,
            test = %self.test,
            declared = state.expected.len(),
            "CallQueue::declare"
        );
        Ok(())
    }

    fn check_arity(&self, got: usize, want: usize, direction: Direction) -> Result<(), DeclareError> {
        if got == want {
            return Ok(());
        }
        Err(DeclareError::Arity {
            function: Arc::clone(&self.function),
            direction,
            want,
            got,
        })
    }

    fn coerce(&self, values: Vec<Value>, direction: Direction) -> Result<Vec<Value>, DeclareError> {
        let types = match direction {
            Direction::In => self.signature.params(),
            Direction::Out => self.signature.results(),
        };
        coerce_tuple(values, types).map_err(|(index, err)| DeclareError::TypeMismatch {
            function: Arc::clone(&self.function),
            direction,
            index,
            want: err.want,
            got: err.got,
        })
    }

    /// Log a real call and hand out the next fake output, if one is queued.
    ///
    /// The cursor advances on every call, faked or not.
    pub(crate) fn record(&self, args: &[Value]) -> Option<Vec<Value>> {
        let mut state = self.state();
        state.actual.push(args.to_vec());
        let cursor = state.cursor;
        state.cursor += 1;
        state
            .expected
            .get_mut(cursor)
            .and_then(|expectation| expectation.output.take())
    }

    /// Compare the recorded calls against the declared expectations, then
    /// reset the queue to empty whatever the outcome.
    pub fn verify_and_reset(&self) -> Result<(), VerifyError> {
        let state = std::mem::take(&mut *self.state());
        debug!(
            function = %self.function,
            test = %self.test,
            declared = state.expected.len(),
            actual = state.actual.len(),
            "CallQueue::verify_and_reset"
        );

        let (want, got) = (state.expected.len(), state.actual.len());
        if want != got {
            return Err(VerifyError::CallCount {
                function: Arc::clone(&self.function),
                want,
                got,
            });
        }

        let mut mismatches = MismatchList::default();
        for (call, (expectation, actual)) in state.expected.iter().zip(&state.actual).enumerate() {
            let Some(expected) = &expectation.input else {
                continue;
            };
            if expected.len() != actual.len() {
                mismatches.push(Mismatch::ArgumentArity {
                    function: Arc::clone(&self.function),
                    call,
                    want: expected.len(),
                    got: actual.len(),
                });
            }
            for (arg, (want, got)) in expected.iter().zip(actual).enumerate() {
                if !structurally_equal(want, got) {
                    mismatches.push(Mismatch::ArgumentValue {
                        function: Arc::clone(&self.function),
                        call,
                        arg,
                        want: want.clone(),
                        got: got.clone(),
                    });
                }
            }
        }

        if mismatches.is_empty() {
            Ok(())
        } else {
            Err(VerifyError::Mismatches(mismatches))
        }
    }

    /// Snapshot of the calls recorded so far.
    pub fn calls(&self) -> Vec<Vec<Value>> {
        self.state().actual.clone()
    }

    /// Declared expectations not yet reached by a call.
    pub fn pending(&self) -> usize {
        let state = self.state();
        state.expected.len().saturating_sub(state.cursor)
    }

    pub fn phase(&self) -> QueuePhase {
        let state = self.state();
        if state.cursor > 0 {
            QueuePhase::Replaying
        } else if !state.expected.is_empty() {
            QueuePhase::Declaring
        } else {
            QueuePhase::Empty
        }
    }
}

#[cfg(test)]
#[path = "../tests/queue_tests.rs"]
mod tests;
