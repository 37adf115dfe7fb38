//! Purpose: Read an error report and decode the response body it captured.
//! Exports: `InputSource`, `read_input`, `parse_outer`, `decode_body`, `extract_body`, `extract_from`.
//! Role: Straight-line pipeline behind the CLI; no retries, no fallbacks.
//! Invariants: Every failure returns an `Error`; nothing is printed here.
//! Invariants: The input is read once and the handle is dropped before decoding.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::core::document::{body_field, value_type};
use crate::core::error::{Error, ErrorKind};
use crate::json::parse;

const STDIN_MARKER: &str = "-";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// `-` selects standard input; anything else is a file path.
    pub fn from_arg(arg: impl Into<PathBuf>) -> Self {
        let path = arg.into();
        if path.as_os_str() == STDIN_MARKER {
            InputSource::Stdin
        } else {
            InputSource::File(path)
        }
    }

    fn path(&self) -> Option<&Path> {
        match self {
            InputSource::Stdin => None,
            InputSource::File(path) => Some(path),
        }
    }
}

pub fn read_input(source: &InputSource) -> Result<String, Error> {
    let text = match source {
        InputSource::Stdin => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|err| Error::from_io(err, Path::new("<stdin>")))?;
            text
        }
        InputSource::File(path) => fs::read_to_string(path).map_err(|err| {
            let err = Error::from_io(err, path);
            let message = match err.kind() {
                ErrorKind::NotFound => "input file not found",
                ErrorKind::Permission => "input file is not readable",
                _ => "failed to read input file",
            };
            err.with_message(message)
        })?,
    };
    debug!(source = ?source, bytes = text.len(), "read input");
    Ok(text)
}

pub fn parse_outer(text: &str) -> Result<Value, Error> {
    parse::from_str(text).map_err(|err| {
        Error::new(ErrorKind::InvalidJson)
            .with_message("input is not valid JSON")
            .with_hint(parse::hint_for_error(&err, "report"))
            .with_source(err)
    })
}

pub fn decode_body(body: &str) -> Result<Value, Error> {
    parse::from_str(body).map_err(|err| {
        Error::new(ErrorKind::InvalidBody)
            .with_message("`latestResponseData.body` does not contain valid JSON")
            .with_hint(parse::hint_for_error(&err, "latestResponseData.body"))
            .with_source(err)
    })
}

pub fn extract_body(text: &str) -> Result<Value, Error> {
    let outer = parse_outer(text)?;
    let body = body_field(&outer)?;
    debug!(body_len = body.len(), "located response body");
    let inner = decode_body(body)?;
    debug!(kind = value_type(&inner), "decoded response body");
    Ok(inner)
}

/// Runs the whole pipeline, attaching the input path to any failure past the read.
pub fn extract_from(source: &InputSource) -> Result<Value, Error> {
    let text = read_input(source)?;
    extract_body(&text).map_err(|err| match source.path() {
        Some(path) if err.path().is_none() => err.with_path(path),
        _ => err,
    })
}
