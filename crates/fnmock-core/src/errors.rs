//! Error taxonomy for mocking.
//!
//! Declaration-time errors ([`DeclareError`]) are returned as soon as an
//! expectation is declared. Verification-time discrepancies ([`Mismatch`])
//! are collected into a [`MismatchList`] so one verification reports all of
//! them. [`ResolutionError`] never reaches a mocked call site: the proxy
//! falls through to the original function instead.
//!
//! `Display` output is plain text; [`crate::report::Reporter`] renders the
//! same errors with terminal colors.

use crate::config::ConfigError;
use fnmock_common::{Value, ValueType};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::context::TestId;

/// Which side of a call a declared tuple describes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => f.write_str("input"),
            Self::Out => f.write_str("output"),
        }
    }
}

/// An expectation was declared with values that do not fit the signature.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeclareError {
    #[error("{function:?} {direction} declared with wrong number of values; want {want}, got {got}")]
    Arity {
        function: Arc<str>,
        direction: Direction,
        want: usize,
        got: usize,
    },

    #[error("{function:?} {direction} value #{index} has wrong type; want {want}, got {got}")]
    TypeMismatch {
        function: Arc<str>,
        direction: Direction,
        index: usize,
        want: ValueType,
        got: ValueType,
    },
}

/// The currently running test case could not be identified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("no test context is active on this thread")]
    NoScope,

    #[error("no test frame found among {frames} call-chain frames")]
    NoTestFrame { frames: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegisterError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("test \"{test}\" already holds a mock of {function:?}")]
    Duplicate { function: Arc<str>, test: TestId },

    #[error("{function:?} is already intercepted by another registry")]
    Intercepted { function: Arc<str> },
}

/// A function slot was called with arguments that do not fit its signature.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    #[error("{function:?} called with wrong number of arguments; want {want}, got {got}")]
    Arity {
        function: Arc<str>,
        want: usize,
        got: usize,
    },

    #[error("{function:?} argument #{index} has wrong type; want {want}, got {got}")]
    TypeMismatch {
        function: Arc<str>,
        index: usize,
        want: ValueType,
        got: ValueType,
    },
}

/// One discrepancy between a declared input and a recorded call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Mismatch {
    #[error("inconsistent number of arguments passed to call #{call} of {function:?}; want {want}, got {got}")]
    ArgumentArity {
        function: Arc<str>,
        call: usize,
        want: usize,
        got: usize,
    },

    #[error("unexpected value for argument #{arg} of call #{call} to {function:?}; want {want}, got {got}")]
    ArgumentValue {
        function: Arc<str>,
        call: usize,
        arg: usize,
        want: Value,
        got: Value,
    },
}

/// Every mismatch found by one verification, in call order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MismatchList {
    list: Vec<Mismatch>,
}

impl MismatchList {
    pub fn push(&mut self, mismatch: Mismatch) {
        self.list.push(mismatch);
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Mismatch> {
        self.list.iter()
    }

    pub fn as_slice(&self) -> &[Mismatch] {
        &self.list
    }
}

impl<'a> IntoIterator for &'a MismatchList {
    type Item = &'a Mismatch;
    type IntoIter = std::slice::Iter<'a, Mismatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.iter()
    }
}

impl fmt::Display for MismatchList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, m) in self.list.iter().enumerate() {
            writeln!(f, "#{i}: {m}")?;
        }
        Ok(())
    }
}

impl std::error::Error for MismatchList {}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VerifyError {
    #[error("inconsistent number of calls to {function:?}; want {want}, got {got}")]
    CallCount {
        function: Arc<str>,
        want: usize,
        got: usize,
    },

    #[error("{0}")]
    Mismatches(MismatchList),
}

impl VerifyError {
    /// The individual mismatches, empty for a call-count error.
    pub fn mismatches(&self) -> &[Mismatch] {
        match self {
            Self::CallCount { .. } => &[],
            Self::Mismatches(list) => list.as_slice(),
        }
    }
}

/// Umbrella error so tests can use `?` across every mocking operation.
#[derive(Debug, Error)]
pub enum MockError {
    #[error(transparent)]
    Register(#[from] RegisterError),

    #[error(transparent)]
    Declare(#[from] DeclareError),

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error(transparent)]
    Call(#[from] CallError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
#[path = "../tests/errors_tests.rs"]
mod tests;
