//! Tracing bootstrap for debugging interception.
//!
//! Output format is chosen by `FNMOCK_LOG_FORMAT`:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `tree`: indented spans via `tracing-tree`
//! - `json`: one JSON object per event
//!
//! ```bash
//! FNMOCK_LOG=fnmock_core=trace cargo test
//! FNMOCK_LOG=debug FNMOCK_LOG_FORMAT=tree cargo test -- --nocapture
//! ```
//!
//! Nothing is installed unless `FNMOCK_LOG` or `RUST_LOG` is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Tree,
    Json,
}

impl LogFormat {
    /// Parse a `FNMOCK_LOG_FORMAT` value. Unknown values mean `Text`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("FNMOCK_LOG_FORMAT").unwrap_or_default())
    }
}

/// `FNMOCK_LOG` wins over `RUST_LOG`; both use `RUST_LOG` syntax.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("FNMOCK_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Install the global subscriber, writing to stderr.
///
/// Returns whether a subscriber was installed by this call. Safe to call
/// from every test: later calls, or calls after another subscriber was set,
/// do nothing.
pub fn init_tracing() -> bool {
    if std::env::var_os("FNMOCK_LOG").is_none() && std::env::var_os("RUST_LOG").is_none() {
        return false;
    }

    let filter = build_filter();
    match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_targets(true);
            Registry::default().with(filter).with(tree_layer).try_init().is_ok()
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).try_init().is_ok()
        }
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
    }
}

#[cfg(test)]
#[path = "tests/tracing_config_tests.rs"]
mod tests;
