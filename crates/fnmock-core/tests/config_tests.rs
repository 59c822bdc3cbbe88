use super::*;
use crate::errors::ResolutionError;
use rustc_hash::FxHashMap;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: FxHashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_defaults() {
    let config = MockConfig::default();
    assert_eq!(config.context, ContextStrategy::Scoped);
    assert_eq!(config.color, ColorMode::Auto);
    assert_eq!(config.chain_window, 10);
    assert_eq!(MockConfig::from_lookup(|_| None), config);
}

#[test]
fn test_from_lookup_reads_every_variable() {
    let config = MockConfig::from_lookup(lookup(&[
        ("FNMOCK_CONTEXT", "call-chain"),
        ("FNMOCK_COLOR", "never"),
        ("FNMOCK_CHAIN_WINDOW", "32"),
        ("FNMOCK_TEST_FILE_PATTERN", r"^spec/"),
        ("FNMOCK_TEST_SYMBOL_PATTERN", r"::it_\w+$"),
    ]));
    assert_eq!(config.context, ContextStrategy::CallChain);
    assert_eq!(config.color, ColorMode::Never);
    assert_eq!(config.chain_window, 32);
    assert_eq!(config.test_file_pattern, "^spec/");
    assert_eq!(config.test_symbol_pattern, r"::it_\w+$");
}

#[test]
fn test_from_lookup_ignores_bad_values() {
    let config = MockConfig::from_lookup(lookup(&[
        ("FNMOCK_CONTEXT", "psychic"),
        ("FNMOCK_COLOR", "sometimes"),
        ("FNMOCK_CHAIN_WINDOW", "0"),
    ]));
    assert_eq!(config, MockConfig::default());
}

#[test]
fn test_strategy_and_color_parsing() {
    assert_eq!("Auto".parse::<ContextStrategy>(), Ok(ContextStrategy::Auto));
    assert_eq!("call_chain".parse::<ContextStrategy>(), Ok(ContextStrategy::CallChain));
    assert!("chain".parse::<ContextStrategy>().is_err());
    assert_eq!("off".parse::<ColorMode>(), Ok(ColorMode::Never));
    assert_eq!(" always ".parse::<ColorMode>(), Ok(ColorMode::Always));
}

#[test]
fn test_from_json() {
    let config = MockConfig::from_json(r#"{"context": "auto", "chainWindow": 4}"#).expect("json");
    assert_eq!(config.context, ContextStrategy::Auto);
    assert_eq!(config.chain_window, 4);
    assert_eq!(config.color, ColorMode::Auto);
    assert_eq!(config.test_file_pattern, DEFAULT_TEST_FILE_PATTERN);
}

#[test]
fn test_from_json_rejects_bad_input() {
    assert!(matches!(
        MockConfig::from_json(r#"{"chainWindow": 0}"#),
        Err(ConfigError::ZeroWindow)
    ));
    assert!(matches!(
        MockConfig::from_json(r#"{"context": "psychic"}"#),
        Err(ConfigError::Json(_))
    ));
}

#[test]
fn test_invalid_pattern_is_reported() {
    let config = MockConfig {
        test_symbol_pattern: "(unclosed".to_string(),
        ..MockConfig::default()
    };
    let err = config.conventions().expect_err("bad pattern");
    assert!(matches!(err, ConfigError::Pattern { which: "test-symbol", .. }));
    assert!(err.to_string().contains("(unclosed"));

    let config = MockConfig {
        context: ContextStrategy::CallChain,
        ..config
    };
    assert!(config.build_resolver().is_err());
}

#[test]
fn test_default_patterns() {
    let conventions = MockConfig::default().conventions().expect("conventions");
    let frame = |symbol: &str, file: &str| crate::chain::Frame::new(symbol, Some(file));
    assert!(conventions.is_test_frame(&frame("suite::test_greets", "tests/suite.rs")));
    assert!(conventions.is_test_frame(&frame(
        "fnmock_core::queue::tests::phases",
        "crates/x/tests/queue_tests.rs"
    )));
    assert!(conventions.is_test_frame(&frame("app::test_a", "src/app_test.rs")));
    assert!(!conventions.is_test_frame(&frame("app::greet", "src/app.rs")));
    assert!(!conventions.is_test_frame(&frame("suite::helper", "tests/suite.rs")));
}

#[test]
fn test_scoped_resolver_is_default() {
    let resolver = MockConfig::default().build_resolver().expect("resolver");
    assert_eq!(resolver.resolve(), Err(ResolutionError::NoScope));
}
