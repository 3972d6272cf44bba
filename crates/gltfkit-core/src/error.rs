//! Error types for model traversal, typed views and byte codecs.

use thiserror::Error;

use crate::aliased_span::SpanError;

/// Errors raised while resolving, editing or encoding a [`Model`](crate::Model).
///
/// Reference errors are raised at the point of dereference; a model may hold
/// dangling indices until they are traversed.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("{kind} index {index} out of range (have {len})")]
    IndexOutOfRange {
        kind: &'static str,
        index: u32,
        len: usize,
    },

    #[error("Missing reference: {0}")]
    MissingReference(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Insufficient capacity: {0}")]
    Capacity(String),

    #[error("Out of bounds: {0}")]
    OutOfBounds(String),

    #[error("Span error: {0}")]
    Span(#[from] SpanError),

    #[error("Invalid base64: {0}")]
    Base64(String),

    #[error("Invalid data URI: {0}")]
    DataUri(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
