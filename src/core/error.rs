// Copyright @yucwang 2026

use std::fmt;

/// Failure raised while committing an appearance model. Commit never
/// recovers locally: every error aborts the call and leaves the model in
/// the state it had before the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitError {
    /// A required reference (volume, transfer function) was missing or the
    /// model was queried before its first commit.
    Configuration(&'static str),
    /// Building a native sampling resource failed.
    Resource(String),
}

impl fmt::Display for CommitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitError::Configuration(what) => {
                write!(f, "volumetric model configuration error: {}", what)
            }
            CommitError::Resource(what) => {
                write!(f, "volumetric model resource error: {}", what)
            }
        }
    }
}

impl std::error::Error for CommitError {}
