use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Stable string key for a note within one indexing run. Path-derived
/// (`Concepts/Topic`) in folder-scoped vaults, bare stem (`Topic`) in flat
/// ones. Ordering is plain byte order; every deterministic tie-break in the
/// pipeline leans on it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        NoteId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// True when the identifier sits under `prefix` (`Concepts/` style) or
    /// equals it exactly.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        NoteId(value.to_string())
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        NoteId(value)
    }
}

impl Borrow<str> for NoteId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NoteId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Whether a node is backed by note content or only by references to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    /// Enumerated from the corpus; may have outbound edges.
    Note,
    /// Created for a referenced-but-absent target under permissive
    /// resolution. Never a source, so out-degree stays zero.
    Stub,
}

/// A node of the link graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteNode {
    pub id: NoteId,
    pub kind: NoteKind,
}

impl NoteNode {
    pub fn new(id: impl Into<NoteId>, kind: NoteKind) -> Self {
        NoteNode {
            id: id.into(),
            kind,
        }
    }

    pub fn is_stub(&self) -> bool {
        self.kind == NoteKind::Stub
    }
}
