//! Collaborator seams. The pipeline never touches the filesystem or a
//! markup syntax itself; it consumes these two traits and resolves the
//! resulting tokens by identity. Vault integrations implement both.

use kbindex_graph::NoteId;

use crate::error::IndexError;

/// Corpus enumeration. One entry per note, identifiers unique within a
/// run; read failures surface as `IndexError::Io`.
pub trait NoteSource {
    fn list_notes(&self) -> Result<Vec<(NoteId, String)>, IndexError>;
}

/// Reference-token extraction from note text. Order of appearance is
/// preserved and duplicates are allowed; the graph builder deduplicates at
/// the edge level. Tokens are target identifiers, already normalized by
/// the collaborator.
pub trait ReferenceExtractor {
    fn extract(&self, text: &str) -> Vec<String>;
}

/// In-memory corpus, mainly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryCorpus {
    notes: Vec<(NoteId, String)>,
}

impl MemoryCorpus {
    pub fn new(notes: Vec<(NoteId, String)>) -> Self {
        MemoryCorpus { notes }
    }

    pub fn of(notes: &[(&str, &str)]) -> Self {
        MemoryCorpus {
            notes: notes
                .iter()
                .map(|(id, text)| (NoteId::from(*id), text.to_string()))
                .collect(),
        }
    }
}

impl NoteSource for MemoryCorpus {
    fn list_notes(&self) -> Result<Vec<(NoteId, String)>, IndexError> {
        Ok(self.notes.clone())
    }
}

/// Extractor for corpora that store references directly: every non-empty
/// line of a note body is one target identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineReferences;

impl ReferenceExtractor for LineReferences {
    fn extract(&self, text: &str) -> Vec<String> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}
