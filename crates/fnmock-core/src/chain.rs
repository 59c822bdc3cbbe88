//! Call-chain based test resolution.
//!
//! [`CallChainResolver`] walks the current call chain and picks the
//! outermost frame that sits in a test file and is named like a test
//! function. A [`FrameSource`] captures the chain once per resolution, and
//! the resolver pages through it window by window until a short window comes
//! back, so deep chains are never cut off at an arbitrary depth.
//!
//! This depends entirely on naming conventions. Explicit scoping through
//! [`TestContext`](crate::context::TestContext) is the default for that
//! reason; the chain resolver is opt-in via
//! [`ContextStrategy`](crate::config::ContextStrategy).

use crate::context::{ContextResolver, TestId};
use crate::errors::ResolutionError;
use fnmock_common::limits::DEFAULT_CHAIN_WINDOW;
use regex::Regex;
use std::backtrace::Backtrace;
use std::fmt;
use std::sync::LazyLock;
use tracing::trace;

/// One frame of a call chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub symbol: String,
    pub file: Option<String>,
}

impl Frame {
    pub fn new(symbol: impl Into<String>, file: Option<&str>) -> Self {
        Self {
            symbol: symbol.into(),
            file: file.map(str::to_string),
        }
    }
}

/// A call chain captured at one point in time, innermost frame first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CapturedChain {
    frames: Vec<Frame>,
}

impl CapturedChain {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Up to `window` frames, skipping the `skip` innermost ones.
    pub fn window(&self, skip: usize, window: usize) -> &[Frame] {
        let start = skip.min(self.frames.len());
        let end = start.saturating_add(window).min(self.frames.len());
        &self.frames[start..end]
    }
}

/// Captures the current call chain.
pub trait FrameSource: Send + Sync + fmt::Debug {
    fn capture(&self) -> CapturedChain;
}

/// Frames from `std::backtrace`. Needs debug info for symbols and files.
#[derive(Debug, Default, Clone, Copy)]
pub struct BacktraceSource;

impl FrameSource for BacktraceSource {
    fn capture(&self) -> CapturedChain {
        let captured = Backtrace::force_capture().to_string();
        CapturedChain::new(parse_backtrace(&captured))
    }
}

static FRAME_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+:\s+(\S.*?)\s*$").expect("valid frame regex"));
static LOCATION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*at\s+(.+?)(?::\d+)?(?::\d+)?\s*$").expect("valid location regex")
});
static SYMBOL_HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"::h[0-9a-f]{16}$").expect("valid hash regex"));

/// Parse the `Display` form of a `std::backtrace::Backtrace`.
///
/// ```text
///    3: my_tests::test_greets
///              at ./tests/my_tests.rs:12:5
/// ```
pub fn parse_backtrace(text: &str) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();
    for line in text.lines() {
        if let Some(caps) = FRAME_LINE.captures(line) {
            frames.push(Frame::new(&caps[1], None));
        } else if let Some(caps) = LOCATION_LINE.captures(line) {
            if let Some(last) = frames.last_mut().filter(|f| f.file.is_none()) {
                last.file = Some(caps[1].to_string());
            }
        }
    }
    frames
}

/// Strip the symbol hash and any trailing closure segments, so a test's
/// closures resolve to the test itself.
pub fn normalize_symbol(symbol: &str) -> &str {
    let mut sym = match SYMBOL_HASH.find(symbol) {
        Some(m) => &symbol[..m.start()],
        None => symbol,
    };
    while let Some(stripped) = sym.strip_suffix("::{{closure}}") {
        sym = stripped;
    }
    sym
}

/// Naming conventions that mark a frame as a test function.
#[derive(Clone, Debug)]
pub struct ChainConventions {
    test_file: Regex,
    test_symbol: Regex,
}

impl ChainConventions {
    pub fn new(test_file: Regex, test_symbol: Regex) -> Self {
        Self {
            test_file,
            test_symbol,
        }
    }

    /// Whether `frame` is in a test file and named like a test function.
    pub fn is_test_frame(&self, frame: &Frame) -> bool {
        let Some(file) = frame.file.as_deref() else {
            return false;
        };
        self.test_file.is_match(file) && self.test_symbol.is_match(normalize_symbol(&frame.symbol))
    }
}

#[derive(Debug)]
pub struct CallChainResolver {
    source: Box<dyn FrameSource>,
    conventions: ChainConventions,
    window: usize,
}

impl CallChainResolver {
    pub fn new(source: Box<dyn FrameSource>, conventions: ChainConventions) -> Self {
        Self {
            source,
            conventions,
            window: DEFAULT_CHAIN_WINDOW,
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window.max(1);
        self
    }

    /// Every frame of the chain, innermost first. The chain is captured
    /// once and read back in windows.
    pub fn collect_frames(&self) -> Vec<Frame> {
        let chain = self.source.capture();
        let mut frames = Vec::with_capacity(chain.len());
        loop {
            let batch = chain.window(frames.len(), self.window);
            frames.extend_from_slice(batch);
            if batch.len() < self.window {
                break;
            }
        }
        trace!(frames = frames.len(), window = self.window, "CallChainResolver::collect_frames");
        frames
    }
}

impl ContextResolver for CallChainResolver {
    fn resolve(&self) -> Result<TestId, ResolutionError> {
        let frames = self.collect_frames();
        frames
            .iter()
            .rev()
            .find(|frame| self.conventions.is_test_frame(frame))
            .map(|frame| TestId::new(normalize_symbol(&frame.symbol)))
            .ok_or(ResolutionError::NoTestFrame {
                frames: frames.len(),
            })
    }
}

#[cfg(test)]
#[path = "../tests/chain_tests.rs"]
mod tests;
