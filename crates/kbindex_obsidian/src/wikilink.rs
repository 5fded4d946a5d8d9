//! Wikilink syntax: `[[target]]`, `[[target|alias]]`, `[[target#heading]]`,
//! `![[embed]]`, and their combinations. Links never span lines.

use std::path::Path;

/// One parsed wikilink occurrence, in order of appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiLink {
    /// Text before any `|` or `#`, trimmed. Never empty.
    pub target: String,
    /// Display alias after `|`, if present.
    pub alias: Option<String>,
    /// Heading fragment after `#`, if present. A heading reference still
    /// targets the note itself.
    pub heading: Option<String>,
    /// True for `![[...]]` embeds.
    pub embed: bool,
}

/// Scan markdown text for wikilinks. Unclosed or empty brackets are
/// ignored; duplicates are preserved for the caller to collapse.
pub fn extract_wikilinks(text: &str) -> Vec<WikiLink> {
    let mut links = Vec::new();
    for line in text.lines() {
        let mut cursor = 0usize;
        while let Some(found) = line[cursor..].find("[[") {
            let start = cursor + found;
            let embed = start > 0 && line.as_bytes()[start - 1] == b'!';
            let body_start = start + 2;
            let Some(close) = line[body_start..].find("]]") else {
                break;
            };
            let inner = &line[body_start..body_start + close];
            if let Some(link) = parse_inner(inner, embed) {
                links.push(link);
            }
            cursor = body_start + close + 2;
        }
    }
    links
}

fn parse_inner(inner: &str, embed: bool) -> Option<WikiLink> {
    let trimmed = inner.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (left, alias) = match trimmed.split_once('|') {
        Some((left, alias)) => (left.trim(), non_empty(alias)),
        None => (trimmed, None),
    };
    let (target, heading) = match left.split_once('#') {
        Some((target, heading)) => (target.trim(), non_empty(heading)),
        None => (left, None),
    };
    if target.is_empty() {
        return None;
    }

    Some(WikiLink {
        target: target.to_string(),
        alias,
        heading,
        embed,
    })
}

fn non_empty(part: &str) -> Option<String> {
    let trimmed = part.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Canonical form of a link target: trimmed, forward slashes, no leading
/// `./` or `/`, internal whitespace runs collapsed to single spaces.
pub fn normalize_target(target: &str) -> String {
    let slashed = target.trim().replace('\\', "/");
    let stripped = slashed.trim_start_matches("./").trim_start_matches('/');
    let mut out = String::with_capacity(stripped.len());
    let mut last_was_space = false;
    for ch in stripped.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out.trim_end().to_string()
}

/// The note title a path implies: its file stem.
pub fn file_stem_title(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Attachment extensions that never resolve to notes.
const ATTACHMENT_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "webp", "bmp", "pdf", "mp3", "mp4", "wav", "webm", "zip",
    "canvas",
];

/// True when a target names a binary attachment rather than a note.
pub fn is_attachment_target(target: &str) -> bool {
    match target.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => {
            let extension = extension.to_ascii_lowercase();
            ATTACHMENT_EXTENSIONS.iter().any(|known| *known == extension)
        }
        _ => false,
    }
}
