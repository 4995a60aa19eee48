//! Attribute layer error types

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Malformed content read from an attribute file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot parse {content:?} as {expected}")]
pub struct ParseError {
    pub content: String,
    pub expected: &'static str,
}

impl ParseError {
    pub fn new(content: impl Into<String>, expected: &'static str) -> Self {
        Self {
            content: content.into(),
            expected,
        }
    }
}

/// Errors from attribute reads and writes
#[derive(Error, Debug)]
pub enum AttrError {
    /// Attribute file missing, unreadable or unwritable
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Attribute content did not decode
    #[error("attribute {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: ParseError,
    },

    /// Value or cache entry kind does not match the requested kind
    #[error("attribute {name}: expected {expected}, found {found}")]
    Mismatch {
        name: String,
        expected: String,
        found: String,
    },
}

impl AttrError {
    /// True when the underlying file does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, AttrError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

pub type Result<T> = std::result::Result<T, AttrError>;
