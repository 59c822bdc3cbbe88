use super::*;
use crate::errors::{Direction, MismatchList, ResolutionError};
use crate::context::TestId;
use std::sync::Arc;

fn plain() -> Reporter {
    Reporter::new(false)
}

fn greet() -> Arc<str> {
    "greet".into()
}

#[test]
fn test_plain_output_is_prefixed_display() {
    let err = DeclareError::Arity {
        function: greet(),
        direction: Direction::In,
        want: 1,
        got: 0,
    };
    assert_eq!(plain().declare(&err), format!("fnmock: {err}"));

    let err = CallError::TypeMismatch {
        function: greet(),
        index: 0,
        want: ValueType::Str,
        got: ValueType::I32,
    };
    assert_eq!(plain().call(&err), format!("fnmock: {err}"));

    let err = RegisterError::Duplicate {
        function: greet(),
        test: TestId::new("t"),
    };
    assert_eq!(plain().register(&err), format!("fnmock: {err}"));
}

#[test]
fn test_verify_lists_each_mismatch() {
    let mut list = MismatchList::default();
    list.push(Mismatch::ArgumentValue {
        function: greet(),
        call: 0,
        arg: 0,
        want: Value::from("Ann"),
        got: Value::from("Bob"),
    });
    list.push(Mismatch::ArgumentArity {
        function: greet(),
        call: 1,
        want: 1,
        got: 2,
    });
    let text = plain().verify(&VerifyError::Mismatches(list));
    assert_eq!(
        text,
        "#0: fnmock: unexpected value for argument #0 of call #0 to \"greet\"; want \"Ann\", got \"Bob\"\n\
         #1: fnmock: inconsistent number of arguments passed to call #1 of \"greet\"; want 1, got 2\n"
    );
}

#[test]
fn test_render_dispatches_on_kind() {
    let err = MockError::from(VerifyError::CallCount {
        function: greet(),
        want: 2,
        got: 1,
    });
    assert_eq!(
        plain().render(&err),
        "fnmock: inconsistent number of calls to \"greet\"; want 2, got 1"
    );
    let err = MockError::from(RegisterError::from(ResolutionError::NoScope));
    assert_eq!(
        plain().render(&err),
        "fnmock: no test context is active on this thread"
    );
}

#[test]
fn test_colored_output_keeps_text() {
    let err = VerifyError::CallCount {
        function: greet(),
        want: 2,
        got: 1,
    };
    let text = Reporter::new(true).verify(&err);
    assert!(text.starts_with("fnmock: inconsistent number of calls to "));
    assert!(text.contains("\"greet\""));
}

#[test]
fn test_from_mode() {
    assert!(Reporter::from_mode(ColorMode::Always).is_colored());
    assert!(!Reporter::from_mode(ColorMode::Never).is_colored());
}
