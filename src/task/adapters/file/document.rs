//! Markdown task documents with a YAML front-matter block.
//!
//! A document looks like:
//!
//! ```text
//! ---
//! taskKey: T1
//! status: PENDING_REVIEW
//! reviews:
//! - by: alice
//!   from: DRAFT
//!   to: PENDING_REVIEW
//!   ...
//! ---
//!
//! Free-form body.
//! ```

use crate::task::domain::{TaskKey, TaskRecord};
use minijinja::{Environment, context};
use serde_yaml::{Mapping, Value};
use thiserror::Error;

const DELIMITER: &str = "---";
const TASK_KEY_FIELD: &str = "taskKey";

const DEFAULT_BODY_TEMPLATE: &str = "# {{ task_key }}{% if title %}: {{ title }}{% endif %}\n\n\
Review lifecycle record. The metadata block above is maintained by devflow;\n\
edit the body freely.\n";

/// Errors raised while decoding or encoding a task document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocumentError {
    /// The opening delimiter is not followed by a closing one.
    #[error("front matter is not terminated by '---'")]
    UnterminatedFrontMatter,

    /// The front matter is not valid YAML for a task record.
    #[error("invalid front matter: {0}")]
    InvalidMetadata(String),

    /// The front matter names a different task than the document location.
    #[error("front matter names task '{found}' but document belongs to '{expected}'")]
    KeyMismatch {
        /// Key derived from the document location.
        expected: String,
        /// Key found in the front matter.
        found: String,
    },

    /// The record could not be serialised.
    #[error("failed to encode front matter: {0}")]
    Encode(String),

    /// The default body template failed to render.
    #[error("failed to render document body: {0}")]
    Template(String),
}

/// Splits a document into its raw front matter and body.
///
/// Documents without an opening delimiter have no front matter.
///
/// # Errors
///
/// Returns [`DocumentError::UnterminatedFrontMatter`] when the block is
/// opened but never closed.
pub fn split_front_matter(contents: &str) -> Result<(Option<&str>, &str), DocumentError> {
    let Some(after_open) = contents
        .strip_prefix(DELIMITER)
        .and_then(strip_line_break)
    else {
        return Ok((None, contents));
    };

    if let Some(after_close) = after_open.strip_prefix(DELIMITER) {
        return closing_tail(after_close).map(|body| (Some(""), body));
    }

    let mut remainder = after_open;
    let mut consumed = 0;
    while let Some((head, tail)) = remainder.split_once("\n---") {
        consumed += head.len() + 1;
        if let Ok(body) = closing_tail(tail) {
            let (yaml, _) = after_open.split_at(consumed);
            return Ok((Some(yaml), body));
        }
        consumed += DELIMITER.len();
        remainder = tail;
    }

    Err(DocumentError::UnterminatedFrontMatter)
}

fn strip_line_break(value: &str) -> Option<&str> {
    value
        .strip_prefix("\r\n")
        .or_else(|| value.strip_prefix('\n'))
}

/// Accepts the text following a closing delimiter and returns the body.
fn closing_tail(tail: &str) -> Result<&str, DocumentError> {
    if tail.is_empty() {
        return Ok(tail);
    }
    let body = strip_line_break(tail).ok_or(DocumentError::UnterminatedFrontMatter)?;
    Ok(strip_line_break(body).unwrap_or(body))
}

/// Decodes a document stored for `task_key`.
///
/// Missing metadata fields take their defaults: a document without a
/// `status` is a draft, and a document without `taskKey` adopts the key it
/// is stored under.
///
/// # Errors
///
/// Returns [`DocumentError`] when the front matter is unterminated, is not a
/// YAML mapping, fails to deserialize, or names a different task.
pub fn decode(task_key: &TaskKey, contents: &str) -> Result<TaskRecord, DocumentError> {
    let (front_matter, body) = split_front_matter(contents)?;
    let mut metadata = match front_matter.map(serde_yaml::from_str::<Value>).transpose() {
        Ok(Some(Value::Mapping(mapping))) => mapping,
        Ok(Some(Value::Null) | None) => Mapping::new(),
        Ok(Some(_)) => {
            return Err(DocumentError::InvalidMetadata(
                "front matter must be a mapping".to_owned(),
            ));
        }
        Err(err) => return Err(DocumentError::InvalidMetadata(err.to_string())),
    };

    match metadata.get(TASK_KEY_FIELD) {
        None => {
            metadata.insert(
                Value::String(TASK_KEY_FIELD.to_owned()),
                Value::String(task_key.as_str().to_owned()),
            );
        }
        Some(Value::String(found)) if found.trim() == task_key.as_str() => {}
        Some(other) => {
            return Err(DocumentError::KeyMismatch {
                expected: task_key.to_string(),
                found: describe(other),
            });
        }
    }

    let mut record: TaskRecord = serde_yaml::from_value(Value::Mapping(metadata))
        .map_err(|err| DocumentError::InvalidMetadata(err.to_string()))?;
    body.clone_into(&mut record.body);
    Ok(record)
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => serde_yaml::to_string(other)
            .map(|text| text.trim_end().to_owned())
            .unwrap_or_default(),
    }
}

/// Encodes a record as a document.
///
/// Records with an empty body receive a rendered default body.
///
/// # Errors
///
/// Returns [`DocumentError::Encode`] when the metadata cannot be serialised
/// or [`DocumentError::Template`] when the default body fails to render.
pub fn encode(record: &TaskRecord) -> Result<String, DocumentError> {
    let yaml =
        serde_yaml::to_string(record).map_err(|err| DocumentError::Encode(err.to_string()))?;
    let body = if record.body.is_empty() {
        default_body(record)?
    } else {
        record.body.clone()
    };
    Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n\n{body}"))
}

/// Renders the body written into a newly created document.
///
/// # Errors
///
/// Returns [`DocumentError::Template`] when rendering fails.
pub fn default_body(record: &TaskRecord) -> Result<String, DocumentError> {
    let environment = Environment::new();
    environment
        .render_str(
            DEFAULT_BODY_TEMPLATE,
            context! {
                task_key => record.task_key.as_str(),
                title => record.title.as_deref(),
            },
        )
        .map_err(|err| DocumentError::Template(err.to_string()))
}
