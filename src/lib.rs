//! Purpose: Library crate backing the `extract-body` CLI and its tests.
//! Exports: `core` (report lookup, extraction pipeline, errors).
//! Role: Keeps the pipeline testable without spawning the binary.
//! Invariants: Library code never writes to stdout or stderr.
pub mod core;
mod json;

pub use crate::core::error::{Error, ErrorKind, to_exit_code};
pub use crate::core::extract::{InputSource, extract_body, extract_from};
