//! Vault scanning and target resolution.
//!
//! A [`VaultCatalog`] is an immutable snapshot of the markdown notes under a
//! vault root. It doubles as the pipeline's note source and reference
//! extractor: extraction resolves every wikilink target to a canonical note
//! identifier before the graph builder sees it.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use kbindex_core::{IndexError, NoteSource, ReferenceExtractor, DEFAULT_INDEX_NAME};
use kbindex_graph::NoteId;

use crate::wikilink::{extract_wikilinks, file_stem_title, is_attachment_target, normalize_target};

/// One markdown note loaded from the vault.
#[derive(Debug, Clone)]
pub struct NoteRecord {
    /// Identifier: path relative to the vault root, extension dropped.
    pub id: NoteId,
    /// Path relative to the vault root, forward-slash normalized.
    pub rel_path: String,
    /// File stem, the name bare wikilinks resolve against.
    pub title: String,
    /// Note body as UTF-8 text.
    pub text: String,
    /// SHA-256 hex digest of the raw file bytes.
    pub sha256: String,
}

/// What to scan and how to resolve what the scan cannot find.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Folders (relative to the vault root) to scan. Empty means the whole
    /// vault. Folders that do not exist contribute nothing.
    pub folders: Vec<String>,
    /// Identifier of the generated index note. Resolution keeps it verbatim
    /// so the builder can recognize and drop it.
    pub index_name: String,
    /// Folder that unresolved bare titles are placed under.
    pub namespace: Option<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            folders: Vec::new(),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            namespace: None,
        }
    }
}

/// Immutable view of a vault's notes plus the title indexes used for
/// resolution.
#[derive(Debug, Clone)]
pub struct VaultCatalog {
    root: PathBuf,
    index_name: String,
    namespace: Option<String>,
    notes: BTreeMap<NoteId, NoteRecord>,
    title_exact: BTreeMap<String, BTreeSet<NoteId>>,
    title_casefold: BTreeMap<String, BTreeSet<NoteId>>,
}

/// Load every markdown note under `root`, sorted by path.
pub fn scan_vault(root: &Path, options: ScanOptions) -> Result<VaultCatalog, IndexError> {
    if options.folders.iter().any(|folder| folder.trim().is_empty()) {
        return Err(IndexError::InvalidConfiguration(
            "folder names must not be empty".to_string(),
        ));
    }
    let root = root
        .canonicalize()
        .map_err(|err| IndexError::Io(format!("canonicalize {}: {}", root.display(), err)))?;

    let mut paths = Vec::new();
    if options.folders.is_empty() {
        collect_md_paths(&root, &mut paths)?;
    } else {
        for folder in &options.folders {
            let scoped = root.join(folder);
            if scoped.is_dir() {
                collect_md_paths(&scoped, &mut paths)?;
            }
        }
    }
    paths.sort();

    let mut notes = BTreeMap::new();
    let mut title_exact: BTreeMap<String, BTreeSet<NoteId>> = BTreeMap::new();
    let mut title_casefold: BTreeMap<String, BTreeSet<NoteId>> = BTreeMap::new();
    for path in paths {
        let bytes =
            fs::read(&path).map_err(|err| IndexError::Io(format!("read {}: {}", path.display(), err)))?;
        let rel = path
            .strip_prefix(&root)
            .ok()
            .map(normalize_path)
            .unwrap_or_else(|| normalize_path(&path));
        let id = NoteId::new(rel.trim_end_matches(".md"));
        // The generated index never joins the corpus.
        if id.as_str() == options.index_name {
            continue;
        }
        let title = file_stem_title(&rel);
        title_exact.entry(title.clone()).or_default().insert(id.clone());
        title_casefold
            .entry(title.to_lowercase())
            .or_default()
            .insert(id.clone());
        notes.insert(
            id.clone(),
            NoteRecord {
                id,
                rel_path: rel,
                title,
                text: String::from_utf8_lossy(&bytes).into_owned(),
                sha256: sha256_hex(&bytes),
            },
        );
    }

    Ok(VaultCatalog {
        root,
        index_name: options.index_name,
        namespace: options.namespace,
        notes,
        title_exact,
        title_casefold,
    })
}

/// Recursively collect `.md` paths, skipping hidden entries such as
/// `.obsidian` and `.trash`.
fn collect_md_paths(path: &Path, out: &mut Vec<PathBuf>) -> Result<(), IndexError> {
    if path.is_file() {
        if path.extension().and_then(|ext| ext.to_str()) == Some("md") {
            out.push(path.to_path_buf());
        }
        return Ok(());
    }

    if !path.is_dir() {
        return Ok(());
    }

    let mut entries = Vec::new();
    for entry in
        fs::read_dir(path).map_err(|err| IndexError::Io(format!("read_dir {}: {}", path.display(), err)))?
    {
        let entry = entry.map_err(|err| IndexError::Io(format!("dir entry: {}", err)))?;
        entries.push(entry.path());
    }
    entries.sort();

    for entry_path in entries {
        let hidden = entry_path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with('.'));
        if hidden {
            continue;
        }
        if entry_path.is_dir() {
            collect_md_paths(&entry_path, out)?;
        } else if entry_path.extension().and_then(|ext| ext.to_str()) == Some("md") {
            out.push(entry_path);
        }
    }
    Ok(())
}

impl VaultCatalog {
    /// The canonicalized vault root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.notes.contains_key(id)
    }

    pub fn note(&self, id: &str) -> Option<&NoteRecord> {
        self.notes.get(id)
    }

    /// Notes in identifier order.
    pub fn iter_notes(&self) -> impl Iterator<Item = &NoteRecord> {
        self.notes.values()
    }

    /// Map a raw wikilink target to its canonical note identifier.
    ///
    /// Resolution order: exact identifier, exact title, case-insensitive
    /// title, then inference. Ambiguous titles resolve to the smallest
    /// identifier. Unresolved bare titles land under the namespace folder
    /// when one is set; path-like targets and the index name pass through
    /// unchanged. Returns `None` only for targets that normalize to nothing.
    pub fn resolve_target(&self, raw_target: &str) -> Option<NoteId> {
        let normalized = normalize_target(raw_target);
        let normalized = normalized
            .strip_suffix(".md")
            .or_else(|| normalized.strip_suffix(".MD"))
            .unwrap_or(&normalized)
            .to_string();
        if normalized.is_empty() {
            return None;
        }

        let candidate = NoteId::new(normalized.as_str());
        if self.notes.contains_key(&candidate) {
            return Some(candidate);
        }

        if !normalized.contains('/') {
            if let Some(ids) = self.title_exact.get(&normalized) {
                if let Some(first) = ids.iter().next() {
                    return Some(first.clone());
                }
            }
            if let Some(ids) = self.title_casefold.get(&normalized.to_lowercase()) {
                if let Some(first) = ids.iter().next() {
                    return Some(first.clone());
                }
            }
        }

        if normalized == self.index_name {
            return Some(candidate);
        }
        match &self.namespace {
            Some(folder) if !normalized.contains('/') => {
                Some(NoteId::new(format!("{}/{}", folder, normalized)))
            }
            _ => Some(candidate),
        }
    }

    /// Content digest of the whole catalog: SHA-256 over every note's
    /// identifier and file digest, in identifier order.
    pub fn corpus_hash(&self) -> String {
        let mut hasher = Sha256::new();
        for (id, record) in &self.notes {
            hasher.update(id.as_str().as_bytes());
            hasher.update([0u8]);
            hasher.update(record.sha256.as_bytes());
            hasher.update([b'\n']);
        }
        hex::encode(hasher.finalize())
    }
}

impl NoteSource for VaultCatalog {
    fn list_notes(&self) -> Result<Vec<(NoteId, String)>, IndexError> {
        Ok(self
            .notes
            .values()
            .map(|record| (record.id.clone(), record.text.clone()))
            .collect())
    }
}

impl ReferenceExtractor for VaultCatalog {
    fn extract(&self, text: &str) -> Vec<String> {
        let mut references = Vec::new();
        for link in extract_wikilinks(text) {
            if is_attachment_target(&link.target) {
                continue;
            }
            if let Some(id) = self.resolve_target(&link.target) {
                references.push(id.into_string());
            }
        }
        references
    }
}

/// Normalize path separators to forward slashes.
fn normalize_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
