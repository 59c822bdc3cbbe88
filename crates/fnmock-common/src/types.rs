//! Runtime type descriptors for mocked function signatures.
//!
//! Every [`Value`](crate::Value) carries a `ValueType`, and every function
//! slot declares the `ValueType`s of its parameters and results. The
//! coercion engine ([`crate::coerce`]) converts between them.
//!
//! | Descriptor | Zero value | Display |
//! |------------|------------|---------|
//! | `Bool` | `false` | `bool` |
//! | `Int(kind)` | `0` | `i32`, `u8`, ... |
//! | `Float(kind)` | `0.0` | `f32`, `f64` |
//! | `Str` | `""` | `str` |
//! | `Bytes` | `[]` | `bytes` |
//! | `List(T)` | `[]` | `[T]` |
//! | `Map(T)` | `{}` | `map[str]T` |
//! | `Error` | nil | `error` |
//! | `Any` | nil | `any` |
//! | `Named` | underlying zero | the name |
//! | `Nil` | nil | `nil` |

use std::fmt;
use std::sync::Arc;

/// Width and signedness of an integer type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl IntKind {
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    /// Smallest representable value, widened to `i128`.
    pub const fn min(self) -> i128 {
        match self {
            Self::I8 => i8::MIN as i128,
            Self::I16 => i16::MIN as i128,
            Self::I32 => i32::MIN as i128,
            Self::I64 => i64::MIN as i128,
            Self::U8 | Self::U16 | Self::U32 | Self::U64 => 0,
        }
    }

    /// Largest representable value, widened to `i128`.
    pub const fn max(self) -> i128 {
        match self {
            Self::I8 => i8::MAX as i128,
            Self::I16 => i16::MAX as i128,
            Self::I32 => i32::MAX as i128,
            Self::I64 => i64::MAX as i128,
            Self::U8 => u8::MAX as i128,
            Self::U16 => u16::MAX as i128,
            Self::U32 => u32::MAX as i128,
            Self::U64 => u64::MAX as i128,
        }
    }

    pub const fn contains(self, v: i128) -> bool {
        v >= self.min() && v <= self.max()
    }

    const fn name(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FloatKind {
    F32,
    F64,
}

/// Runtime type descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    Int(IntKind),
    Float(FloatKind),
    Str,
    Bytes,
    /// Homogeneous list of the element type.
    List(Box<ValueType>),
    /// String-keyed map with values of the given type.
    Map(Box<ValueType>),
    /// Error result slot. Either nil (no error) or a message.
    Error,
    /// Accepts any value; the value keeps its own dynamic type.
    Any,
    /// A distinct named type sharing the representation of `underlying`.
    Named {
        name: Arc<str>,
        underlying: Box<ValueType>,
    },
    /// The type of the untyped nil literal. Only ever appears on values.
    Nil,
}

impl ValueType {
    pub const I8: Self = Self::Int(IntKind::I8);
    pub const I16: Self = Self::Int(IntKind::I16);
    pub const I32: Self = Self::Int(IntKind::I32);
    pub const I64: Self = Self::Int(IntKind::I64);
    pub const U8: Self = Self::Int(IntKind::U8);
    pub const U16: Self = Self::Int(IntKind::U16);
    pub const U32: Self = Self::Int(IntKind::U32);
    pub const U64: Self = Self::Int(IntKind::U64);
    pub const F32: Self = Self::Float(FloatKind::F32);
    pub const F64: Self = Self::Float(FloatKind::F64);

    pub fn list(elem: ValueType) -> Self {
        Self::List(Box::new(elem))
    }

    pub fn map(value: ValueType) -> Self {
        Self::Map(Box::new(value))
    }

    pub fn named(name: impl Into<Arc<str>>, underlying: ValueType) -> Self {
        Self::Named {
            name: name.into(),
            underlying: Box::new(underlying),
        }
    }

    /// Strip every `Named` layer.
    pub fn underlying(&self) -> &ValueType {
        let mut ty = self;
        while let Self::Named { underlying, .. } = ty {
            ty = underlying;
        }
        ty
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.underlying(), Self::Int(_) | Self::Float(_))
    }

    /// Whether nil is a legal (non-zero-materialized) value of this type.
    pub fn is_nullable(&self) -> bool {
        matches!(self.underlying(), Self::Error | Self::Any | Self::Nil)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int(kind) => f.write_str(kind.name()),
            Self::Float(FloatKind::F32) => f.write_str("f32"),
            Self::Float(FloatKind::F64) => f.write_str("f64"),
            Self::Str => f.write_str("str"),
            Self::Bytes => f.write_str("bytes"),
            Self::List(elem) => write!(f, "[{elem}]"),
            Self::Map(value) => write!(f, "map[str]{value}"),
            Self::Error => f.write_str("error"),
            Self::Any => f.write_str("any"),
            Self::Named { name, .. } => f.write_str(name),
            Self::Nil => f.write_str("nil"),
        }
    }
}

/// Parameter and result types of a mockable function.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Signature {
    params: Vec<ValueType>,
    results: Vec<ValueType>,
}

impl Signature {
    pub fn new(
        params: impl IntoIterator<Item = ValueType>,
        results: impl IntoIterator<Item = ValueType>,
    ) -> Self {
        Self {
            params: params.into_iter().collect(),
            results: results.into_iter().collect(),
        }
    }

    pub fn params(&self) -> &[ValueType] {
        &self.params
    }

    pub fn results(&self) -> &[ValueType] {
        &self.results
    }

    pub fn num_in(&self) -> usize {
        self.params.len()
    }

    pub fn num_out(&self) -> usize {
        self.results.len()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fn(")?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{p}")?;
        }
        f.write_str(")")?;
        match self.results.as_slice() {
            [] => Ok(()),
            [single] => write!(f, " -> {single}"),
            many => {
                f.write_str(" -> (")?;
                for (i, r) in many.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{r}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/types_tests.rs"]
mod tests;
