//! Purpose: Internal JSON parsing boundary shared by the extractor.
//! Exports: `parse` module with decode helpers.
//! Role: Single seam for parser implementation so callsites avoid ad hoc decode logic.
//! Invariants: Both the outer report and the inner body decode through this module.

pub(crate) mod parse;
