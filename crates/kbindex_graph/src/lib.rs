pub mod graph;
pub mod node;

// Re-export main types for convenience
pub use graph::{LinkEdge, LinkGraph};
pub use node::{NoteId, NoteKind, NoteNode};
