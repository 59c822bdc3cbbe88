//! End-to-end mocking scenarios through the public API.

use anyhow::Result;
use fnmock::{
    Call, ColorMode, DeclareError, Direction, FnSlot, Mismatch, MockConfig, MockError,
    MockRegistry, Signature, TestContext, Value, ValueType, VerifyError, args, test_context,
};
use std::sync::LazyLock;

static MOCKS: LazyLock<MockRegistry> = LazyLock::new(|| {
    MockRegistry::with_config(MockConfig {
        color: ColorMode::Never,
        ..MockConfig::default()
    })
    .expect("default configuration is valid")
});

fn greet_body(args: Vec<Value>) -> Vec<Value> {
    match args[0].as_str() {
        Some("") | None => args!["", Value::error("empty name")],
        Some(name) => args![format!("hello {name}"), Value::nil_error()],
    }
}

fn greet_signature() -> Signature {
    Signature::new([ValueType::Str], [ValueType::Str, ValueType::Error])
}

/// Shared by every test in this file; each test gets its own queue.
static GREET: LazyLock<FnSlot> = LazyLock::new(|| FnSlot::new("greet", greet_signature(), greet_body));

static GREET_ROUND_TRIP: LazyLock<FnSlot> =
    LazyLock::new(|| FnSlot::new("greet_round_trip", greet_signature(), greet_body));

static SET_TEMPERATURE: LazyLock<FnSlot> = LazyLock::new(|| {
    FnSlot::new(
        "set_temperature",
        Signature::new(
            [ValueType::named("Celsius", ValueType::F64)],
            [ValueType::Bool],
        ),
        |args| args![args[0].as_f64().is_some_and(|c| c < 100.0)],
    )
});

fn greeting(name: &str) -> Result<(String, Option<String>)> {
    let out = GREET.call(args![name])?;
    Ok((
        out[0].as_str().unwrap_or_default().to_string(),
        out[1].as_error().map(str::to_string),
    ))
}

#[test]
fn test_greet_returns_declared_output() -> Result<()> {
    let _ctx = test_context!("test_greet_returns_declared_output");
    let greet = MOCKS.mock(&GREET)?;
    greet.want(Call::with(args!["Ann"]).returns(args!["hi Ann", Value::nil_error()]))?;

    assert_eq!(greeting("Ann")?, ("hi Ann".to_string(), None));
    greet.verify()?;
    Ok(())
}

#[test]
fn test_greet_reports_argument_mismatch() -> Result<()> {
    let _ctx = test_context!("test_greet_reports_argument_mismatch");
    let greet = MOCKS.mock(&GREET)?;
    greet.want(Call::with(args!["Ann"]).returns(args!["hi Ann", Value::nil_error()]))?;

    greeting("Bob")?;
    let err = greet.verify().expect_err("Bob is not Ann");
    match &err.mismatches()[..] {
        [
            Mismatch::ArgumentValue {
                call: 0,
                arg: 0,
                want,
                got,
                ..
            },
        ] => {
            assert_eq!(want, &Value::from("Ann"));
            assert_eq!(got, &Value::from("Bob"));
        }
        other => panic!("unexpected mismatches: {other:?}"),
    }
    Ok(())
}

#[test]
fn test_greet_reports_call_count() -> Result<()> {
    let _ctx = test_context!("test_greet_reports_call_count");
    let greet = MOCKS.mock(&GREET)?;
    greet.want(Call::with(args!["Ann"]).returns(args!["hi Ann", Value::nil_error()]))?;
    greet.want(Call::with(args!["Ann"]).returns(args!["hi Ann", Value::nil_error()]))?;

    greeting("Ann")?;
    assert!(matches!(
        greet.verify(),
        Err(VerifyError::CallCount { want: 2, got: 1, .. })
    ));
    Ok(())
}

#[test]
fn test_fake_outputs_are_replayed_in_order() -> Result<()> {
    let _ctx = test_context!("test_fake_outputs_are_replayed_in_order");
    let greet = MOCKS.mock(&GREET)?;
    let names = ["Ann", "Bob", "Cy", "Di", "Ed"];
    for (i, name) in names.iter().enumerate() {
        greet.want(Call::with(args![*name]).returns(args![format!("reply {i}"), Value::nil_error()]))?;
    }
    assert_eq!(greet.pending(), names.len());

    for (i, name) in names.iter().enumerate() {
        assert_eq!(greeting(name)?.0, format!("reply {i}"));
    }
    assert_eq!(greet.pending(), 0);
    greet.verify()?;
    Ok(())
}

#[test]
fn test_calls_beyond_fake_outputs_fall_through() -> Result<()> {
    let _ctx = test_context!("test_calls_beyond_fake_outputs_fall_through");
    let greet = MOCKS.mock(&GREET)?;
    greet.want(Call::returning(args!["faked", Value::nil_error()]))?;
    greet.want(Call::with(args!["Bob"]))?;

    assert_eq!(greeting("Ann")?.0, "faked");
    assert_eq!(greeting("Bob")?.0, "hello Bob");
    assert_eq!(greeting("")?, (String::new(), Some("empty name".to_string())));

    // Three calls against two declarations.
    assert!(matches!(
        greet.verify(),
        Err(VerifyError::CallCount { want: 2, got: 3, .. })
    ));
    Ok(())
}

#[test]
fn test_expectation_without_input_is_not_compared() -> Result<()> {
    let _ctx = test_context!("test_expectation_without_input_is_not_compared");
    let greet = MOCKS.mock(&GREET)?;
    greet.want(Call::any())?;
    greet.want(Call::returning(args!["whatever", Value::nil_error()]))?;

    greeting("first")?;
    greeting("second")?;
    greet.verify()?;

    // The call count is still checked.
    greet.want(Call::any())?;
    assert!(greet.verify().is_err());
    Ok(())
}

#[test]
fn test_arity_errors_fail_at_declaration() -> Result<()> {
    let _ctx = test_context!("test_arity_errors_fail_at_declaration");
    let greet = MOCKS.mock(&GREET)?;

    let err = greet
        .want(Call::with(args!["Ann", "Bob"]))
        .expect_err("two inputs for a one-parameter function");
    assert!(matches!(
        err,
        DeclareError::Arity {
            direction: Direction::In,
            want: 1,
            got: 2,
            ..
        }
    ));

    let err = greet
        .want(Call::returning(args!["only one"]))
        .expect_err("one output for a two-result function");
    assert!(matches!(err, DeclareError::Arity { direction: Direction::Out, .. }));

    assert!(greet.calls().is_empty());
    assert_eq!(greet.pending(), 0);
    Ok(())
}

#[test]
fn test_type_errors_fail_at_declaration() -> Result<()> {
    let _ctx = test_context!("test_type_errors_fail_at_declaration");
    let greet = MOCKS.mock(&GREET)?;
    let err = greet
        .want(Call::with(args![7i32]))
        .expect_err("an integer is not a string");
    assert!(matches!(err, DeclareError::TypeMismatch { index: 0, .. }));
    Ok(())
}

#[test]
fn test_declared_values_convert_to_named_types() -> Result<()> {
    let _ctx = test_context!("test_declared_values_convert_to_named_types");
    let set = MOCKS.mock(&SET_TEMPERATURE)?;
    set.want(Call::with(args![21.5f64]).returns(args![false]))?;
    set.want(Call::with(args![Value::named("Celsius", 30i32)]))?;

    let out = SET_TEMPERATURE.call(args![21.5f32])?;
    assert_eq!(out, args![false]);
    let out = SET_TEMPERATURE.call(args![30i64])?;
    assert_eq!(out, args![true]);
    set.verify()?;
    Ok(())
}

#[test]
fn test_mocking_and_unmocking_is_invisible() -> Result<()> {
    let names = ["Ann", "", "Zoë"];
    let before: Vec<_> = names
        .iter()
        .map(|n| GREET_ROUND_TRIP.call(args![*n]))
        .collect::<Result<_, _>>()?;

    {
        let _ctx = test_context!("test_mocking_and_unmocking_is_invisible");
        let greet = MOCKS.mock(&GREET_ROUND_TRIP)?;
        assert!(GREET_ROUND_TRIP.is_intercepted());
        assert!(greet.done());
    }

    let after: Vec<_> = names
        .iter()
        .map(|n| GREET_ROUND_TRIP.call(args![*n]))
        .collect::<Result<_, _>>()?;
    assert_eq!(before, after);
    assert!(!GREET_ROUND_TRIP.is_intercepted());
    assert!(!MOCKS.is_mocked(&GREET_ROUND_TRIP));
    Ok(())
}

#[test]
fn test_calls_outside_any_test_fall_through() -> Result<()> {
    let _ctx = test_context!("test_calls_outside_any_test_fall_through");
    let greet = MOCKS.mock(&GREET)?;
    greet.want(Call::returning(args!["faked", Value::nil_error()]))?;

    let unattributed = std::thread::spawn(|| greeting("Ann"))
        .join()
        .expect("thread")?;
    assert_eq!(unattributed.0, "hello Ann");
    assert!(greet.calls().is_empty());

    assert_eq!(greeting("Ann")?.0, "faked");
    greet.verify()?;
    Ok(())
}

#[test]
fn test_helper_contexts_resolve_to_the_outer_test() -> Result<()> {
    fn helper() -> Result<String> {
        let _ctx = TestContext::enter("helper_that_looks_like_a_test");
        Ok(greeting("Ann")?.0)
    }

    let _ctx = test_context!("test_helper_contexts_resolve_to_the_outer_test");
    let greet = MOCKS.mock(&GREET)?;
    greet.want(Call::returning(args!["outer", Value::nil_error()]))?;
    assert_eq!(helper()?, "outer");
    greet.verify()?;
    Ok(())
}

#[test]
fn test_mock_error_collects_every_failure_kind() {
    fn run() -> Result<(), MockError> {
        let _ctx = test_context!("test_mock_error_collects_every_failure_kind");
        let greet = MOCKS.mock(&GREET)?;
        greet.want(Call::with(args!["Ann"]))?;
        GREET.call(args!["Bob"])?;
        greet.verify()?;
        Ok(())
    }

    let err = run().expect_err("Bob is not Ann");
    assert!(matches!(err, MockError::Verify(VerifyError::Mismatches(_))));
    assert_eq!(
        MOCKS.reporter().render(&err),
        "#0: fnmock: unexpected value for argument #0 of call #0 to \"greet\"; want \"Ann\", got \"Bob\"\n"
    );
}

#[test]
#[should_panic(expected = "unexpected value for argument #0 of call #0 to \"greet\"")]
fn test_assert_verified_panics_with_mismatches() {
    let _ctx = test_context!("test_assert_verified_panics_with_mismatches");
    let greet = MOCKS.must_mock(&GREET);
    greet.must_want(Call::with(args!["Ann"]));
    let _ = GREET.call(args!["Bob"]);
    greet.assert_verified();
}

#[test]
#[should_panic(expected = "input declared with wrong number of values; want 1, got 0")]
fn test_must_want_panics_on_bad_declaration() {
    let _ctx = test_context!("test_must_want_panics_on_bad_declaration");
    let greet = MOCKS.must_mock(&GREET);
    greet.must_want(Call::with(args![]));
}
