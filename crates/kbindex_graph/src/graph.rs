use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::node::{NoteId, NoteKind, NoteNode};

/// One directed reference: `source` mentions `target`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkEdge {
    pub source: NoteId,
    pub target: NoteId,
}

impl LinkEdge {
    pub fn new(source: impl Into<NoteId>, target: impl Into<NoteId>) -> Self {
        LinkEdge {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Directed link graph over note identifiers.
///
/// Nodes live in a `BTreeMap` and edges in a `BTreeSet`, so iteration order
/// is the identifier order and duplicate references collapse structurally.
/// Self-loops are rejected at insertion; the edge set is the single source
/// of truth for degrees and adjacency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkGraph {
    nodes: BTreeMap<NoteId, NoteNode>,
    edges: BTreeSet<LinkEdge>,
}

impl LinkGraph {
    pub fn new() -> Self {
        LinkGraph {
            nodes: BTreeMap::new(),
            edges: BTreeSet::new(),
        }
    }

    /// Idempotent node insertion. A `Note` registration upgrades an existing
    /// `Stub` in place (identifier equality is the whole identity story).
    /// Returns true if the node was newly inserted.
    pub fn ensure_note(&mut self, id: impl Into<NoteId>, kind: NoteKind) -> bool {
        use std::collections::btree_map::Entry;

        let id = id.into();
        match self.nodes.entry(id) {
            Entry::Vacant(entry) => {
                let node = NoteNode::new(entry.key().clone(), kind);
                entry.insert(node);
                true
            }
            Entry::Occupied(mut entry) => {
                if kind == NoteKind::Note {
                    entry.get_mut().kind = NoteKind::Note;
                }
                false
            }
        }
    }

    /// Insert a directed edge. Self-references are dropped and duplicates
    /// collapse; absent endpoints are created as stubs, so callers enforcing
    /// strict resolution must check targets before calling. Returns true if
    /// the edge was newly inserted.
    pub fn add_edge(&mut self, source: impl Into<NoteId>, target: impl Into<NoteId>) -> bool {
        let source = source.into();
        let target = target.into();
        if source == target {
            return false;
        }
        self.ensure_note(source.clone(), NoteKind::Stub);
        self.ensure_note(target.clone(), NoteKind::Stub);
        self.edges.insert(LinkEdge { source, target })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&NoteNode> {
        self.nodes.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter_nodes(&self) -> impl Iterator<Item = &NoteNode> {
        self.nodes.values()
    }

    pub fn iter_edges(&self) -> impl Iterator<Item = &LinkEdge> {
        self.edges.iter()
    }

    pub fn note_ids(&self) -> impl Iterator<Item = &NoteId> {
        self.nodes.keys()
    }

    pub fn stub_count(&self) -> usize {
        self.nodes.values().filter(|node| node.is_stub()).count()
    }

    pub fn in_degree(&self, id: &NoteId) -> usize {
        self.edges.iter().filter(|edge| &edge.target == id).count()
    }

    pub fn out_degree(&self, id: &NoteId) -> usize {
        self.edges.iter().filter(|edge| &edge.source == id).count()
    }

    /// Directed adjacency (source -> targets), identifier-ordered.
    pub fn out_adjacency(&self) -> BTreeMap<NoteId, BTreeSet<NoteId>> {
        let mut adjacency: BTreeMap<NoteId, BTreeSet<NoteId>> = BTreeMap::new();
        for id in self.nodes.keys() {
            adjacency.insert(id.clone(), BTreeSet::new());
        }
        for edge in &self.edges {
            adjacency
                .entry(edge.source.clone())
                .or_default()
                .insert(edge.target.clone());
        }
        adjacency
    }

    /// Reverse adjacency (target -> sources), identifier-ordered.
    pub fn in_adjacency(&self) -> BTreeMap<NoteId, BTreeSet<NoteId>> {
        let mut adjacency: BTreeMap<NoteId, BTreeSet<NoteId>> = BTreeMap::new();
        for id in self.nodes.keys() {
            adjacency.insert(id.clone(), BTreeSet::new());
        }
        for edge in &self.edges {
            adjacency
                .entry(edge.target.clone())
                .or_default()
                .insert(edge.source.clone());
        }
        adjacency
    }

    /// Undirected projection as an adjacency map: an edge in either
    /// direction yields one connection. Clustering operates on this view.
    pub fn undirected_adjacency(&self) -> BTreeMap<NoteId, BTreeSet<NoteId>> {
        let mut adjacency: BTreeMap<NoteId, BTreeSet<NoteId>> = BTreeMap::new();
        for id in self.nodes.keys() {
            adjacency.insert(id.clone(), BTreeSet::new());
        }
        for edge in &self.edges {
            adjacency
                .entry(edge.source.clone())
                .or_default()
                .insert(edge.target.clone());
            adjacency
                .entry(edge.target.clone())
                .or_default()
                .insert(edge.source.clone());
        }
        adjacency
    }

    /// Subgraph induced by `members`: the member nodes (kinds preserved)
    /// plus every edge with both endpoints inside the set.
    pub fn induced_subgraph(&self, members: &BTreeSet<NoteId>) -> LinkGraph {
        let nodes = self
            .nodes
            .iter()
            .filter(|(id, _)| members.contains(*id))
            .map(|(id, node)| (id.clone(), node.clone()))
            .collect();
        let edges = self
            .edges
            .iter()
            .filter(|edge| members.contains(&edge.source) && members.contains(&edge.target))
            .cloned()
            .collect();
        LinkGraph { nodes, edges }
    }
}

impl Default for LinkGraph {
    fn default() -> Self {
        Self::new()
    }
}
