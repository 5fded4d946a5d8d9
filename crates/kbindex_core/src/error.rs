use std::fmt;

use kbindex_graph::NoteId;

/// Fatal pipeline failures. Recoverable conditions (a headless cluster,
/// a cluster smaller than the cap, an empty graph) are not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Strict resolution only: a reference names a note that does not
    /// exist. Carries both the referencing note and the dangling target.
    UnresolvedReference { note: NoteId, reference: String },
    /// Rejected before any graph work begins.
    InvalidConfiguration(String),
    /// Corpus enumeration or note read failure.
    Io(String),
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::UnresolvedReference { note, reference } => {
                write!(f, "unresolved reference \"{}\" in note \"{}\"", reference, note)
            }
            IndexError::InvalidConfiguration(message) => {
                write!(f, "invalid configuration: {}", message)
            }
            IndexError::Io(message) => write!(f, "io error: {}", message),
        }
    }
}

impl std::error::Error for IndexError {}
