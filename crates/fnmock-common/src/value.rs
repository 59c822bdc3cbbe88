//! Tagged runtime values exchanged with mocked functions.
//!
//! A [`Value`] pairs a [`ValueType`] with its data. Arguments recorded by an
//! interceptor, expected inputs and fake outputs are all `Value`s, so the
//! comparator and the coercion engine never need dynamic dispatch.

use crate::limits::MAX_DISPLAY_ELEMENTS;
use crate::types::{FloatKind, IntKind, ValueType};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Payload of a [`Value`].
///
/// Integers of every width are stored widened to `i128`; the owning value's
/// type records the declared width.
#[derive(Clone, Debug, PartialEq)]
pub enum Data {
    Nil,
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Error(Arc<str>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Value {
    ty: ValueType,
    data: Data,
}

impl Value {
    pub(crate) const fn from_parts(ty: ValueType, data: Data) -> Self {
        Self { ty, data }
    }

    /// The untyped nil literal. Coerces to the zero value of any type.
    pub const fn nil() -> Self {
        Self::from_parts(ValueType::Nil, Data::Nil)
    }

    /// A non-nil error result carrying `message`.
    pub fn error(message: impl Into<Arc<str>>) -> Self {
        Self::from_parts(ValueType::Error, Data::Error(message.into()))
    }

    /// The "no error" result.
    pub const fn nil_error() -> Self {
        Self::from_parts(ValueType::Error, Data::Nil)
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::from_parts(ValueType::Bytes, Data::Bytes(bytes.into()))
    }

    /// Label `value` with a named type whose underlying type is `value`'s type.
    pub fn named(name: impl Into<Arc<str>>, value: impl Into<Value>) -> Self {
        let value = value.into();
        Self::from_parts(ValueType::named(name, value.ty), value.data)
    }

    /// A list with an explicit element type. Items are not converted here;
    /// coercion checks each of them against `elem`.
    pub fn list_of(elem: ValueType, items: impl IntoIterator<Item = Value>) -> Self {
        Self::from_parts(ValueType::list(elem), Data::List(items.into_iter().collect()))
    }

    /// A list whose element type is inferred: the common type of all items,
    /// or `any` when the items disagree or there are none.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        let items: Vec<Value> = items.into_iter().collect();
        let elem = common_type(items.iter().map(|v| &v.ty));
        Self::from_parts(ValueType::list(elem), Data::List(items))
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let entries: IndexMap<String, Value> =
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let elem = common_type(entries.values().map(|v| &v.ty));
        Self::from_parts(ValueType::map(elem), Data::Map(entries))
    }

    /// The zero value of `ty`.
    pub fn zero(ty: &ValueType) -> Self {
        let data = match ty.underlying() {
            ValueType::Bool => Data::Bool(false),
            ValueType::Int(_) => Data::Int(0),
            ValueType::Float(_) => Data::Float(0.0),
            ValueType::Str => Data::Str(String::new()),
            ValueType::Bytes => Data::Bytes(Vec::new()),
            ValueType::List(_) => Data::List(Vec::new()),
            ValueType::Map(_) => Data::Map(IndexMap::new()),
            ValueType::Error | ValueType::Any | ValueType::Nil => Data::Nil,
            ValueType::Named { .. } => unreachable!("underlying() strips Named"),
        };
        Self::from_parts(ty.clone(), data)
    }

    pub const fn ty(&self) -> &ValueType {
        &self.ty
    }

    pub const fn data(&self) -> &Data {
        &self.data
    }

    pub fn into_parts(self) -> (ValueType, Data) {
        (self.ty, self.data)
    }

    /// Same data, different type label.
    pub(crate) fn relabel(self, ty: ValueType) -> Self {
        Self::from_parts(ty, self.data)
    }

    pub const fn is_nil(&self) -> bool {
        matches!(self.data, Data::Nil)
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self.data {
            Data::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub const fn as_int(&self) -> Option<i128> {
        match self.data {
            Data::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_int().and_then(|v| i64::try_from(v).ok())
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_int().and_then(|v| u64::try_from(v).ok())
    }

    pub const fn as_f64(&self) -> Option<f64> {
        match self.data {
            Data::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.data {
            Data::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.data {
            Data::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match &self.data {
            Data::List(items) => Some(items),
            _ => None,
        }
    }

    pub const fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match &self.data {
            Data::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// The error message of a non-nil error value.
    pub fn as_error(&self) -> Option<&str> {
        match &self.data {
            Data::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

fn common_type<'a>(mut types: impl Iterator<Item = &'a ValueType>) -> ValueType {
    let Some(first) = types.next() else {
        return ValueType::Any;
    };
    if types.all(|t| t == first) {
        first.clone()
    } else {
        ValueType::Any
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::from_parts(ValueType::Bool, Data::Bool(v))
    }
}

macro_rules! impl_from_int {
    ($($t:ty => $kind:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::from_parts(ValueType::Int(IntKind::$kind), Data::Int(i128::from(v)))
                }
            }
        )*
    };
}

impl_from_int! {
    i8 => I8, i16 => I16, i32 => I32, i64 => I64,
    u8 => U8, u16 => U16, u32 => U32, u64 => U64,
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Self::from_parts(ValueType::U64, Data::Int(v as i128))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::from_parts(ValueType::Float(FloatKind::F32), Data::Float(f64::from(v)))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::from_parts(ValueType::Float(FloatKind::F64), Data::Float(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::from_parts(ValueType::Str, Data::Str(v.to_string()))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::from_parts(ValueType::Str, Data::Str(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or_else(Self::nil, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::list(items.into_iter().map(Into::into))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Data::Nil => f.write_str("nil"),
            Data::Bool(b) => write!(f, "{b}"),
            Data::Int(v) => write!(f, "{v}"),
            Data::Float(v) => write!(f, "{v:?}"),
            Data::Str(s) => write!(f, "{s:?}"),
            Data::Bytes(b) => {
                f.write_str("b\"")?;
                for byte in b.iter().take(MAX_DISPLAY_ELEMENTS * 4) {
                    write!(f, "{}", std::ascii::escape_default(*byte))?;
                }
                if b.len() > MAX_DISPLAY_ELEMENTS * 4 {
                    f.write_str("...")?;
                }
                f.write_str("\"")
            }
            Data::List(items) => {
                f.write_str("[")?;
                write_elided(f, items.iter(), items.len(), |f, v| write!(f, "{v}"))?;
                f.write_str("]")
            }
            Data::Map(entries) => {
                f.write_str("{")?;
                write_elided(f, entries.iter(), entries.len(), |f, (k, v)| {
                    write!(f, "{k:?}: {v}")
                })?;
                f.write_str("}")
            }
            Data::Error(msg) => write!(f, "error({msg:?})"),
        }
    }
}

fn write_elided<I, T>(
    f: &mut fmt::Formatter<'_>,
    items: I,
    len: usize,
    mut each: impl FnMut(&mut fmt::Formatter<'_>, T) -> fmt::Result,
) -> fmt::Result
where
    I: Iterator<Item = T>,
{
    for (i, item) in items.take(MAX_DISPLAY_ELEMENTS).enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        each(f, item)?;
    }
    if len > MAX_DISPLAY_ELEMENTS {
        write!(f, ", ... {} more", len - MAX_DISPLAY_ELEMENTS)?;
    }
    Ok(())
}

/// Build a `Vec<Value>` from heterogeneous expressions.
///
/// ```ignore
/// let out = args!["hi Ann", Value::nil_error()];
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($e:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($e)),+]
    };
}

#[cfg(test)]
#[path = "../tests/value_tests.rs"]
mod tests;
