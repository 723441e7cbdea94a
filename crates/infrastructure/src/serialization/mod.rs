//! Deterministic JSON serialization for settings files and CLI output.
//!
//! Output uses 2-space indentation and ends with a newline, so saved
//! settings diff cleanly and printed results are stable.

mod json;

pub use json::*;
