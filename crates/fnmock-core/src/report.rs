//! Colored rendering of mocking errors.
//!
//! Counts and indices are yellow, types and values cyan, function names
//! bold. With color off the output matches each error's `Display`, prefixed
//! with `fnmock: `.

use crate::config::ColorMode;
use crate::errors::{CallError, DeclareError, Mismatch, MockError, RegisterError, VerifyError};
use colored::Colorize;
use fnmock_common::{Value, ValueType};
use std::io::IsTerminal;

const PREFIX: &str = "fnmock: ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub const fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn from_mode(mode: ColorMode) -> Self {
        let color = match mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => {
                std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
            }
        };
        Self::new(color)
    }

    pub const fn is_colored(&self) -> bool {
        self.color
    }

    pub fn render(&self, err: &MockError) -> String {
        match err {
            MockError::Register(e) => self.register(e),
            MockError::Declare(e) => self.declare(e),
            MockError::Verify(e) => self.verify(e),
            MockError::Call(e) => self.call(e),
            MockError::Config(e) => format!("{PREFIX}{e}"),
        }
    }

    pub fn register(&self, err: &RegisterError) -> String {
        match err {
            RegisterError::Resolution(e) => format!("{PREFIX}{e}"),
            RegisterError::Duplicate { function, test } => format!(
                "{PREFIX}test {} already holds a mock of {}",
                self.name(test.as_str()),
                self.name(function)
            ),
            RegisterError::Intercepted { function } => format!(
                "{PREFIX}{} is already intercepted by another registry",
                self.name(function)
            ),
        }
    }

    pub fn declare(&self, err: &DeclareError) -> String {
        match err {
            DeclareError::Arity {
                function,
                direction,
                want,
                got,
            } => format!(
                "{PREFIX}{} {direction} declared with wrong number of values; want {}, got {}",
                self.name(function),
                self.count(*want),
                self.count(*got)
            ),
            DeclareError::TypeMismatch {
                function,
                direction,
                index,
                want,
                got,
            } => format!(
                "{PREFIX}{} {direction} value {} has wrong type; want {}, got {}",
                self.name(function),
                self.index(*index),
                self.ty(want),
                self.ty(got)
            ),
        }
    }

    pub fn call(&self, err: &CallError) -> String {
        match err {
            CallError::Arity {
                function,
                want,
                got,
            } => format!(
                "{PREFIX}{} called with wrong number of arguments; want {}, got {}",
                self.name(function),
                self.count(*want),
                self.count(*got)
            ),
            CallError::TypeMismatch {
                function,
                index,
                want,
                got,
            } => format!(
                "{PREFIX}{} argument {} has wrong type; want {}, got {}",
                self.name(function),
                self.index(*index),
                self.ty(want),
                self.ty(got)
            ),
        }
    }

    /// A call-count error on one line, or one numbered line per mismatch.
    pub fn verify(&self, err: &VerifyError) -> String {
        match err {
            VerifyError::CallCount {
                function,
                want,
                got,
            } => format!(
                "{PREFIX}inconsistent number of calls to {}; want {}, got {}",
                self.name(function),
                self.count(*want),
                self.count(*got)
            ),
            VerifyError::Mismatches(list) => {
                let mut out = String::new();
                for (i, m) in list.iter().enumerate() {
                    out.push_str(&format!("#{i}: {}\n", self.mismatch(m)));
                }
                out
            }
        }
    }

    pub fn mismatch(&self, m: &Mismatch) -> String {
        match m {
            Mismatch::ArgumentArity {
                function,
                call,
                want,
                got,
            } => format!(
                "{PREFIX}inconsistent number of arguments passed to call {} of {}; want {}, got {}",
                self.index(*call),
                self.name(function),
                self.count(*want),
                self.count(*got)
            ),
            Mismatch::ArgumentValue {
                function,
                call,
                arg,
                want,
                got,
            } => format!(
                "{PREFIX}unexpected value for argument {} of call {} to {}; want {}, got {}",
                self.index(*arg),
                self.index(*call),
                self.name(function),
                self.value(want),
                self.value(got)
            ),
        }
    }

    fn name(&self, name: &str) -> String {
        let quoted = format!("{name:?}");
        if self.color { quoted.bold().to_string() } else { quoted }
    }

    fn count(&self, n: usize) -> String {
        let text = n.to_string();
        if self.color { text.yellow().to_string() } else { text }
    }

    fn index(&self, i: usize) -> String {
        let text = format!("#{i}");
        if self.color { text.yellow().to_string() } else { text }
    }

    fn ty(&self, ty: &ValueType) -> String {
        let text = ty.to_string();
        if self.color { text.cyan().to_string() } else { text }
    }

    fn value(&self, value: &Value) -> String {
        let text = value.to_string();
        if self.color { text.cyan().to_string() } else { text }
    }
}

#[cfg(test)]
#[path = "../tests/report_tests.rs"]
mod tests;
