use kbindex_graph::{LinkGraph, NoteId, NoteKind};

use crate::config::{IndexConfig, ResolutionPolicy};
use crate::error::IndexError;
use crate::source::{NoteSource, ReferenceExtractor};

/// Builds the directed link graph for one run.
///
/// Two passes over the enumerated corpus: every note becomes a `Note` node
/// first, then references are resolved by identity against that set. A
/// token matching no note is fatal under strict resolution and a stub node
/// under permissive resolution. The designated index note never enters the
/// graph, neither as a source nor as a target. Self-references and
/// duplicate references are dropped silently.
pub fn build_link_graph(
    source: &dyn NoteSource,
    extractor: &dyn ReferenceExtractor,
    config: &IndexConfig,
) -> Result<LinkGraph, IndexError> {
    config.validate()?;

    let notes = source.list_notes()?;
    let mut graph = LinkGraph::new();

    for (id, _) in &notes {
        if id.as_str() == config.index_name {
            continue;
        }
        graph.ensure_note(id.clone(), NoteKind::Note);
    }

    for (id, text) in &notes {
        if id.as_str() == config.index_name {
            continue;
        }
        for token in extractor.extract(text) {
            if token == config.index_name {
                continue;
            }
            if token == *id.as_str() {
                continue;
            }
            if config.resolution == ResolutionPolicy::Strict && !graph.contains(&token) {
                return Err(IndexError::UnresolvedReference {
                    note: id.clone(),
                    reference: token,
                });
            }
            graph.add_edge(id.clone(), NoteId::from(token));
        }
    }

    Ok(graph)
}
