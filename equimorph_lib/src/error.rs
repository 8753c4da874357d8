//! The `error` module contains `EquimorphError`, the error enumeration used to communicate
//! library errors.

use std::convert::From;
use thiserror::Error;

/// The list of errors that the library can generate.
#[derive(Error, Debug)]
pub enum EquimorphError {
    #[error("IO error: {0}")]
    IO(std::io::Error),

    /// An error indicating that JSON parsing failed.
    #[error("JSON error occurred: {0}")]
    JSON(serde_json::Error),

    /// An error indicating that the caller passed an invalid argument to a library API.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An error indicating that the source text would not parse.
    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        line: u32,
        column: u32,
        message: String,
    },

    /// An error indicating that a requested transform does not exist in the registry.
    #[error("transform not found: {0}")]
    TransformNotFound(String),

    /// An error indicating that the transform registry contains no transforms.
    #[error("transform registry contains no transforms")]
    NoTransforms,

    /// An error indicating that cross-tree node correlation found no structural match.
    #[error("node correlation mismatch: no structural match for {kind} at {line}:{column}")]
    NodeNotFound {
        kind: String,
        line: u32,
        column: u32,
    },

    /// An error indicating that cross-tree node correlation found more than one structural
    /// match at the same position.
    #[error("node correlation mismatch: ambiguous structural match for {kind} at {line}:{column}")]
    AmbiguousNode {
        kind: String,
        line: u32,
        column: u32,
    },

    /// An error indicating that a tree edit could not locate its anchor node.
    #[error("tree edit failed: {0}")]
    Edit(String),
}

impl From<std::io::Error> for EquimorphError {
    fn from(e: std::io::Error) -> Self {
        EquimorphError::IO(e)
    }
}

impl From<serde_json::Error> for EquimorphError {
    fn from(e: serde_json::Error) -> Self {
        EquimorphError::JSON(e)
    }
}
