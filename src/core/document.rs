//! Purpose: Locate the JSON-encoded response body inside an error report.
//! Exports: `BODY_PATH`, `body_field`.
//! Role: The only place that knows the report shape.
//! Invariants: Only key presence and value types along `BODY_PATH` are checked.

use serde_json::Value;

use crate::core::error::{Error, ErrorKind};

/// Keys walked from the outer document down to the encoded body.
pub const BODY_PATH: [&str; 2] = ["latestResponseData", "body"];

pub fn body_field(outer: &Value) -> Result<&str, Error> {
    let mut current = outer;
    let mut walked = String::new();
    for key in BODY_PATH {
        let Some(map) = current.as_object() else {
            return Err(Error::new(ErrorKind::MissingField).with_message(format!(
                "expected an object at `{}`, found {}",
                display_path(&walked),
                value_type(current)
            )));
        };
        if !walked.is_empty() {
            walked.push('.');
        }
        walked.push_str(key);
        current = map.get(key).ok_or_else(|| {
            Error::new(ErrorKind::MissingField).with_message(format!("missing key `{walked}`"))
        })?;
    }

    current.as_str().ok_or_else(|| {
        Error::new(ErrorKind::InvalidBody).with_message(format!(
            "expected a JSON-encoded string at `{walked}`, found {}",
            value_type(current)
        ))
    })
}

pub(crate) fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn display_path(walked: &str) -> &str {
    if walked.is_empty() { "<root>" } else { walked }
}
