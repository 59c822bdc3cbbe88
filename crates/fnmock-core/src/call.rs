//! Builder for declared expectations.

use fnmock_common::Value;

/// One expected call: an optional expected input and an optional fake output.
///
/// | Constructor | Input checked | Original called |
/// |-------------|---------------|-----------------|
/// | `Call::any()` | no | yes |
/// | `Call::with(args)` | yes | yes |
/// | `Call::returning(out)` | no | no |
/// | `Call::with(args).returns(out)` | yes | no |
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Call {
    input: Option<Vec<Value>>,
    output: Option<Vec<Value>>,
}

impl Call {
    /// A call whose input is not checked and which falls through.
    pub fn any() -> Self {
        Self::default()
    }

    /// A call expected to receive `args`.
    pub fn with(args: impl IntoIterator<Item = Value>) -> Self {
        Self {
            input: Some(args.into_iter().collect()),
            output: None,
        }
    }

    /// A call answered with `values` instead of the original function.
    pub fn returning(values: impl IntoIterator<Item = Value>) -> Self {
        Self::any().returns(values)
    }

    pub fn returns(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.output = Some(values.into_iter().collect());
        self
    }

    pub fn input(&self) -> Option<&[Value]> {
        self.input.as_deref()
    }

    pub fn output(&self) -> Option<&[Value]> {
        self.output.as_deref()
    }

    pub(crate) fn into_parts(self) -> (Option<Vec<Value>>, Option<Vec<Value>>) {
        (self.input, self.output)
    }
}
