//! Centralized limits shared across the fnmock crates.

/// Number of call-chain frames fetched per window when resolving the
/// enclosing test from a stack walk.
///
/// Walking continues window after window until a short window is returned,
/// so this only trades capture cost against the number of captures.
pub const DEFAULT_CHAIN_WINDOW: usize = 10;

/// Maximum number of list or map elements rendered by `Display` before the
/// remainder is elided.
pub const MAX_DISPLAY_ELEMENTS: usize = 16;
