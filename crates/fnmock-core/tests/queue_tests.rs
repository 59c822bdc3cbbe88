use super::*;
use fnmock_common::{ValueType, args};

fn greet_queue() -> CallQueue {
    CallQueue::new(
        "greet".into(),
        Signature::new([ValueType::Str], [ValueType::Str, ValueType::Error]),
        TestId::new("suite::test_greet"),
    )
}

fn ann() -> Call {
    Call::with(args!["Ann"]).returns(args!["hi Ann", Value::nil_error()])
}

#[test]
fn test_phases() {
    let queue = greet_queue();
    assert_eq!(queue.phase(), QueuePhase::Empty);

    queue.declare(ann()).expect("declare");
    assert_eq!(queue.phase(), QueuePhase::Declaring);

    queue.record(&args!["Ann"]);
    assert_eq!(queue.phase(), QueuePhase::Replaying);

    // Declaring more while replaying is allowed.
    queue.declare(Call::any()).expect("declare");
    assert_eq!(queue.phase(), QueuePhase::Replaying);

    let _ = queue.verify_and_reset();
    assert_eq!(queue.phase(), QueuePhase::Empty);
}

#[test]
fn test_declare_checks_input_arity() {
    let queue = greet_queue();
    let err = queue.declare(Call::with(args!["Ann", "Bob"])).expect_err("arity");
    assert_eq!(
        err,
        DeclareError::Arity {
            function: "greet".into(),
            direction: Direction::In,
            want: 1,
            got: 2,
        }
    );
    assert_eq!(queue.phase(), QueuePhase::Empty);
}

#[test]
fn test_declare_checks_output_arity() {
    let queue = greet_queue();
    let err = queue
        .declare(Call::with(args!["Ann"]).returns(args!["hi"]))
        .expect_err("arity");
    assert!(matches!(
        err,
        DeclareError::Arity {
            direction: Direction::Out,
            want: 2,
            got: 1,
            ..
        }
    ));
}

#[test]
fn test_declare_reports_input_before_output() {
    let queue = greet_queue();
    let err = queue
        .declare(Call::with(args![]).returns(args![]))
        .expect_err("arity");
    assert!(matches!(err, DeclareError::Arity { direction: Direction::In, .. }));
}

#[test]
fn test_declare_checks_types() {
    let queue = greet_queue();
    let err = queue.declare(Call::with(args![42i32])).expect_err("type");
    assert_eq!(
        err,
        DeclareError::TypeMismatch {
            function: "greet".into(),
            direction: Direction::In,
            index: 0,
            want: ValueType::Str,
            got: ValueType::I32,
        }
    );

    let err = queue
        .declare(Call::returning(args!["hi", true]))
        .expect_err("type");
    assert!(matches!(
        err,
        DeclareError::TypeMismatch {
            direction: Direction::Out,
            index: 1,
            ..
        }
    ));
}

#[test]
fn test_declared_values_are_coerced() {
    let queue = CallQueue::new(
        "scale".into(),
        Signature::new([ValueType::I64], [ValueType::F64]),
        TestId::new("t"),
    );
    queue
        .declare(Call::with(args![3i32]).returns(args![2i32]))
        .expect("declare");
    let out = queue.record(&args![3i64]).expect("fake output");
    assert_eq!(out, args![2.0f64]);
    queue.verify_and_reset().expect("verify");
}

#[test]
fn test_record_hands_out_outputs_in_order() {
    let queue = greet_queue();
    queue.declare(ann()).expect("declare");
    queue.declare(Call::with(args!["Bob"])).expect("declare");
    queue
        .declare(Call::returning(args!["hey", Value::error("busy")]))
        .expect("declare");
    assert_eq!(queue.pending(), 3);

    assert_eq!(
        queue.record(&args!["Ann"]),
        Some(args!["hi Ann", Value::nil_error()])
    );
    assert_eq!(queue.record(&args!["Bob"]), None);
    assert_eq!(
        queue.record(&args!["Cy"]),
        Some(args!["hey", Value::error("busy")])
    );
    assert_eq!(queue.pending(), 0);

    // Beyond the declarations every call falls through.
    assert_eq!(queue.record(&args!["Di"]), None);
    assert_eq!(queue.calls().len(), 4);
}

#[test]
fn test_empty_output_on_zero_result_function_is_a_fake() {
    let queue = CallQueue::new(
        "log".into(),
        Signature::new([ValueType::Str], []),
        TestId::new("t"),
    );
    queue.declare(Call::returning(args![])).expect("declare");
    assert_eq!(queue.record(&args!["line"]), Some(vec![]));
}

#[test]
fn test_verify_matching_calls() {
    let queue = greet_queue();
    queue.declare(ann()).expect("declare");
    queue.declare(Call::any()).expect("declare");
    queue.record(&args!["Ann"]);
    queue.record(&args!["anyone"]);
    assert_eq!(queue.verify_and_reset(), Ok(()));
}

#[test]
fn test_verify_call_count() {
    let queue = greet_queue();
    queue.declare(ann()).expect("declare");
    queue.declare(ann()).expect("declare");
    queue.record(&args!["Ann"]);

    assert_eq!(
        queue.verify_and_reset(),
        Err(VerifyError::CallCount {
            function: "greet".into(),
            want: 2,
            got: 1,
        })
    );
    // The queue was reset regardless.
    assert_eq!(queue.verify_and_reset(), Ok(()));
}

#[test]
fn test_verify_collects_every_mismatch() {
    let queue = greet_queue();
    queue.declare(ann()).expect("declare");
    queue.declare(Call::with(args!["Cy"])).expect("declare");
    queue.declare(Call::with(args!["Di"])).expect("declare");
    queue.record(&args!["Bob"]);
    queue.record(&args!["Cy"]);
    queue.record(&[]);

    let err = queue.verify_and_reset().expect_err("mismatches");
    assert_eq!(
        err.mismatches(),
        &[
            Mismatch::ArgumentValue {
                function: "greet".into(),
                call: 0,
                arg: 0,
                want: Value::from("Ann"),
                got: Value::from("Bob"),
            },
            Mismatch::ArgumentArity {
                function: "greet".into(),
                call: 2,
                want: 1,
                got: 0,
            },
        ]
    );
    assert_eq!(queue.phase(), QueuePhase::Empty);
}

#[test]
fn test_pending_never_underflows() {
    let queue = greet_queue();
    queue.record(&args!["Ann"]);
    queue.record(&args!["Bob"]);
    assert_eq!(queue.pending(), 0);
    assert_eq!(queue.calls(), vec![args!["Ann"], args!["Bob"]]);
}

#[test]
fn test_concurrent_records_are_all_logged() {
    use rayon::prelude::*;

    let queue = greet_queue();
    for _ in 0..64 {
        queue
            .declare(Call::returning(args!["hi", Value::nil_error()]))
            .expect("declare");
    }
    let faked = (0..64)
        .into_par_iter()
        .filter(|i| queue.record(&args![format!("n{i}")]).is_some())
        .count();
    assert_eq!(faked, 64);
    assert_eq!(queue.calls().len(), 64);
    assert_eq!(queue.verify_and_reset(), Ok(()));
}
