// Core modules implementing report lookup, body extraction, and error modeling.
pub mod document;
pub mod error;
pub mod extract;
