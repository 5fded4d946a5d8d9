//! Obsidian-flavored vault collaborator for the index pipeline.
//!
//! Everything the core treats as external lives here: walking a vault of
//! markdown notes, pulling `[[wikilinks]]` out of their text, and turning
//! link targets into the note identifiers the graph builder resolves by
//! identity. No graph logic, no rendering.

pub mod catalog;
pub mod wikilink;

// Re-export main types for convenience
pub use catalog::{scan_vault, NoteRecord, ScanOptions, VaultCatalog};
pub use wikilink::{
    extract_wikilinks, file_stem_title, is_attachment_target, normalize_target, WikiLink,
};
