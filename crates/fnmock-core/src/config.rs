//! Registry configuration.
//!
//! Options come from three places, most specific first:
//!
//! - `MockConfig` built in code and passed to [`MockRegistry::with_config`]
//! - JSON via [`MockConfig::from_json`] (camelCase keys)
//! - Environment variables via [`MockConfig::from_env`]:
//!
//! | Variable | Values |
//! |----------|--------|
//! | `FNMOCK_CONTEXT` | `scoped` (default), `call-chain`, `auto` |
//! | `FNMOCK_COLOR` | `auto` (default), `always`, `never` |
//! | `FNMOCK_CHAIN_WINDOW` | frames per call-chain window |
//! | `FNMOCK_TEST_FILE_PATTERN` | regex matched against frame file paths |
//! | `FNMOCK_TEST_SYMBOL_PATTERN` | regex matched against frame symbols |
//!
//! [`MockRegistry::with_config`]: crate::MockRegistry::with_config

use crate::chain::{BacktraceSource, CallChainResolver, ChainConventions};
use crate::context::{ContextResolver, FallbackResolver, ScopedResolver};
use fnmock_common::limits::DEFAULT_CHAIN_WINDOW;
use regex::Regex;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Frame files under a `tests/` directory, or named `*_test.rs`/`*_tests.rs`.
pub const DEFAULT_TEST_FILE_PATTERN: &str = r"(^|[/\\])tests[/\\].+\.rs$|_tests?\.rs$";

/// `test_*` functions, or functions inside a `*tests` module or test crate.
pub const DEFAULT_TEST_SYMBOL_PATTERN: &str = r"(^|::)test_\w+$|(^|::|_)tests::\w+$";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid fnmock configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid {which} pattern {pattern:?}: {source}")]
    Pattern {
        which: &'static str,
        pattern: String,
        source: regex::Error,
    },

    #[error("call-chain window must be at least 1")]
    ZeroWindow,
}

/// How the interceptor determines the running test.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContextStrategy {
    /// Explicit thread-local contexts only.
    #[default]
    Scoped,
    /// Call-chain inspection only.
    CallChain,
    /// Scoped first, then call-chain.
    Auto,
}

impl FromStr for ContextStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scoped" => Ok(Self::Scoped),
            "call-chain" | "callchain" | "call_chain" => Ok(Self::CallChain),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown context strategy '{other}'")),
        }
    }
}

/// Whether rendered errors carry terminal colors.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorMode {
    /// Color when stderr is a terminal and `NO_COLOR` is unset.
    #[default]
    Auto,
    Always,
    Never,
}

impl FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" | "on" | "true" => Ok(Self::Always),
            "never" | "off" | "false" => Ok(Self::Never),
            other => Err(format!("unknown color mode '{other}'")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MockConfig {
    pub context: ContextStrategy,
    pub color: ColorMode,
    pub chain_window: usize,
    pub test_file_pattern: String,
    pub test_symbol_pattern: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            context: ContextStrategy::default(),
            color: ColorMode::default(),
            chain_window: DEFAULT_CHAIN_WINDOW,
            test_file_pattern: DEFAULT_TEST_FILE_PATTERN.to_string(),
            test_symbol_pattern: DEFAULT_TEST_SYMBOL_PATTERN.to_string(),
        }
    }
}

impl MockConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup. Unparseable values
    /// are reported and leave the default in place.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = lookup("FNMOCK_CONTEXT") {
            match raw.parse() {
                Ok(context) => config.context = context,
                Err(err) => warn!(%err, "ignoring FNMOCK_CONTEXT"),
            }
        }
        if let Some(raw) = lookup("FNMOCK_COLOR") {
            match raw.parse() {
                Ok(color) => config.color = color,
                Err(err) => warn!(%err, "ignoring FNMOCK_COLOR"),
            }
        }
        if let Some(raw) = lookup("FNMOCK_CHAIN_WINDOW") {
            match raw.trim().parse::<usize>() {
                Ok(window) if window > 0 => config.chain_window = window,
                _ => warn!(value = %raw, "ignoring FNMOCK_CHAIN_WINDOW"),
            }
        }
        if let Some(pattern) = lookup("FNMOCK_TEST_FILE_PATTERN") {
            config.test_file_pattern = pattern;
        }
        if let Some(pattern) = lookup("FNMOCK_TEST_SYMBOL_PATTERN") {
            config.test_symbol_pattern = pattern;
        }
        config
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        if config.chain_window == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        Ok(config)
    }

    pub fn conventions(&self) -> Result<ChainConventions, ConfigError> {
        let test_file = compile("test-file", &self.test_file_pattern)?;
        let test_symbol = compile("test-symbol", &self.test_symbol_pattern)?;
        Ok(ChainConventions::new(test_file, test_symbol))
    }

    /// The resolver this configuration asks for.
    pub fn build_resolver(&self) -> Result<Arc<dyn ContextResolver>, ConfigError> {
        if self.chain_window == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        let chain = || -> Result<Arc<dyn ContextResolver>, ConfigError> {
            Ok(Arc::new(
                CallChainResolver::new(Box::new(BacktraceSource), self.conventions()?)
                    .with_window(self.chain_window),
            ))
        };
        let resolver: Arc<dyn ContextResolver> = match self.context {
            ContextStrategy::Scoped => Arc::new(ScopedResolver),
            ContextStrategy::CallChain => chain()?,
            ContextStrategy::Auto => {
                Arc::new(FallbackResolver::new(Arc::new(ScopedResolver), chain()?))
            }
        };
        Ok(resolver)
    }
}

fn compile(which: &'static str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::Pattern {
        which,
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
#[path = "../tests/config_tests.rs"]
mod tests;
