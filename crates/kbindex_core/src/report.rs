use serde::{Deserialize, Serialize};

use kbindex_graph::{LinkGraph, NoteId};

/// Default inbound-link ceiling below which a note counts as underlinked.
pub const UNDERLINKED_MAX: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCount {
    pub id: NoteId,
    pub inlinks: usize,
}

/// Inbound-link census of the whole graph, stubs included: a stub with
/// many inlinks is exactly the note worth writing next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkReport {
    pub underlinked_max: usize,
    pub underlinked: Vec<LinkCount>,
    pub sufficiently_linked: Vec<LinkCount>,
}

/// Split every node by inbound degree: at most `underlinked_max` inlinks
/// on one side, more on the other. Both groups come back ordered by
/// ascending inlink count, then identifier.
pub fn link_report(graph: &LinkGraph, underlinked_max: usize) -> LinkReport {
    let incoming = graph.in_adjacency();
    let mut underlinked = Vec::new();
    let mut sufficiently_linked = Vec::new();

    for (id, sources) in &incoming {
        let count = LinkCount {
            id: id.clone(),
            inlinks: sources.len(),
        };
        if count.inlinks <= underlinked_max {
            underlinked.push(count);
        } else {
            sufficiently_linked.push(count);
        }
    }

    underlinked.sort_by(|a, b| a.inlinks.cmp(&b.inlinks).then_with(|| a.id.cmp(&b.id)));
    sufficiently_linked.sort_by(|a, b| a.inlinks.cmp(&b.inlinks).then_with(|| a.id.cmp(&b.id)));

    LinkReport {
        underlinked_max,
        underlinked,
        sufficiently_linked,
    }
}
