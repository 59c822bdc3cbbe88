//! Type coercion engine.
//!
//! Converts a supplied [`Value`] into a target [`ValueType`] or reports why
//! it cannot. Rules, tried in order:
//!
//! 1. Identical non-container type: unchanged.
//! 2. Untyped nil: zero value of the target.
//! 3. Target `any`: the value keeps its own dynamic type.
//! 4. Named types sharing an underlying type (or a named type and its
//!    underlying type): relabelled.
//! 5. Numeric to numeric: converted when representable. Integers are
//!    range-checked; floats convert to integers only when integral.
//! 6. `str` to `bytes` always; `bytes` to `str` when valid UTF-8.
//! 7. Lists and maps: element-wise, even when the types already match,
//!    since [`Value::list_of`] does not check its items.
//!
//! Anything else is a [`CoerceError`].

use crate::types::{FloatKind, IntKind, ValueType};
use crate::value::{Data, Value};
use indexmap::IndexMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert {got} to {want}")]
pub struct CoerceError {
    pub want: ValueType,
    pub got: ValueType,
}

impl CoerceError {
    fn new(want: &ValueType, got: &ValueType) -> Self {
        Self {
            want: want.clone(),
            got: got.clone(),
        }
    }
}

/// Convert `value` to `target`.
pub fn coerce(value: Value, target: &ValueType) -> Result<Value, CoerceError> {
    let container = matches!(target.underlying(), ValueType::List(_) | ValueType::Map(_));
    if value.ty() == target && !container {
        return Ok(value);
    }
    if *value.ty() == ValueType::Nil {
        return Ok(Value::zero(target));
    }
    if *target == ValueType::Any {
        return Ok(value);
    }

    let got = value.ty().clone();
    let want_u = target.underlying();
    let got_u = got.underlying();

    if want_u == got_u && !container {
        return Ok(value.relabel(target.clone()));
    }

    let (_, data) = value.into_parts();
    let data = match (want_u, data) {
        (ValueType::Int(kind), Data::Int(v)) => {
            coerce_int(*kind, v).ok_or_else(|| CoerceError::new(target, &got))?
        }
        (ValueType::Int(kind), Data::Float(v)) => {
            float_to_int(*kind, v).ok_or_else(|| CoerceError::new(target, &got))?
        }
        (ValueType::Float(kind), Data::Int(v)) => Data::Float(narrow_float(*kind, v as f64)),
        (ValueType::Float(kind), Data::Float(v)) => Data::Float(narrow_float(*kind, v)),
        (ValueType::Bytes, Data::Str(s)) => Data::Bytes(s.into_bytes()),
        (ValueType::Str, Data::Bytes(b)) => {
            Data::Str(String::from_utf8(b).map_err(|_| CoerceError::new(target, &got))?)
        }
        (ValueType::List(elem), Data::List(items)) => {
            let items = items
                .into_iter()
                .map(|item| coerce(item, elem))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| CoerceError::new(target, &got))?;
            Data::List(items)
        }
        (ValueType::Map(elem), Data::Map(entries)) => {
            let entries = entries
                .into_iter()
                .map(|(k, v)| coerce(v, elem).map(|v| (k, v)))
                .collect::<Result<IndexMap<String, Value>, _>>()
                .map_err(|_| CoerceError::new(target, &got))?;
            Data::Map(entries)
        }
        _ => return Err(CoerceError::new(target, &got)),
    };
    Ok(Value::from_parts(target.clone(), data))
}

/// Coerce a whole tuple against `types`, reporting the first failing index.
///
/// The caller checks arity; values beyond `types` pass through unchanged.
pub fn coerce_tuple(
    values: Vec<Value>,
    types: &[ValueType],
) -> Result<Vec<Value>, (usize, CoerceError)> {
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            let target = types.get(i).unwrap_or(&ValueType::Any);
            coerce(v, target).map_err(|e| (i, e))
        })
        .collect()
}

fn coerce_int(kind: IntKind, v: i128) -> Option<Data> {
    kind.contains(v).then_some(Data::Int(v))
}

fn float_to_int(kind: IntKind, v: f64) -> Option<Data> {
    if !v.is_finite() || v.fract() != 0.0 {
        return None;
    }
    // Out-of-range floats saturate in the cast; the range check rejects them.
    let widened = v as i128;
    (widened as f64 == v && kind.contains(widened)).then_some(Data::Int(widened))
}

fn narrow_float(kind: FloatKind, v: f64) -> f64 {
    match kind {
        FloatKind::F32 => f64::from(v as f32),
        FloatKind::F64 => v,
    }
}

#[cfg(test)]
#[path = "../tests/coerce_tests.rs"]
mod tests;
