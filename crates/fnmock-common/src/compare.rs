//! Structural equality over [`Value`]s.
//!
//! Two values are equal when their types are identical and their data is
//! equal, recursing through lists and maps. Map comparison ignores entry
//! order. `NaN` is never equal to anything, itself included.

use crate::value::{Data, Value};

/// Compare an expected value against an actual one.
pub fn structurally_equal(want: &Value, got: &Value) -> bool {
    if want.ty() != got.ty() {
        return false;
    }
    data_equal(want.data(), got.data())
}

fn data_equal(want: &Data, got: &Data) -> bool {
    match (want, got) {
        (Data::Nil, Data::Nil) => true,
        (Data::Bool(a), Data::Bool(b)) => a == b,
        (Data::Int(a), Data::Int(b)) => a == b,
        (Data::Float(a), Data::Float(b)) => a == b,
        (Data::Str(a), Data::Str(b)) => a == b,
        (Data::Bytes(a), Data::Bytes(b)) => a == b,
        (Data::Error(a), Data::Error(b)) => a == b,
        (Data::List(a), Data::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| structurally_equal(x, y))
        }
        (Data::Map(a), Data::Map(b)) => {
            a.len() == b.len()
                && a.iter().all(|(k, x)| {
                    b.get(k)
                        .is_some_and(|y| structurally_equal(x, y))
                })
        }
        _ => false,
    }
}

#[cfg(test)]
#[path = "../tests/compare_tests.rs"]
mod tests;
