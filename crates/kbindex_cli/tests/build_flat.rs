use std::fs;
use std::path::Path;

use kbindex_cli::{build_vault_index, BuildRequest, Overrides};

fn write_note(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, text).expect("write note");
}

/// A links B, B links back, C links A. One cluster, A is the hub.
fn scenario_vault(root: &Path) {
    write_note(root, "A.md", "[[B]]\n");
    write_note(root, "B.md", "[[A]]\n");
    write_note(root, "C.md", "[[A]]\n");
}

fn request(root: &Path) -> BuildRequest {
    BuildRequest {
        vault: root.to_path_buf(),
        out: None,
        dry_run: false,
        flags: Overrides::default(),
    }
}

const SCENARIO_DOCUMENT: &str = "# Main Index\n\n\
    This index is automated, any edits will be overwritten on next regeneration.\n\n\
    ---\n\n\
    ## [[A]]\n\
    - [[B]]\n\
    - [[C]]\n\n";

#[test]
fn flat_build_writes_the_expected_document() {
    let dir = tempfile::tempdir().expect("tempdir");
    scenario_vault(dir.path());

    let outcome = build_vault_index(&request(dir.path())).expect("build");
    assert!(outcome.written);
    assert_eq!(outcome.out_path, dir.path().join("Index.md"));
    assert_eq!(outcome.note_count, 3);
    assert_eq!(outcome.stub_count, 0);
    assert_eq!(outcome.edge_count, 3);
    assert_eq!(outcome.tree.section_count(), 1);

    let written = fs::read_to_string(dir.path().join("Index.md")).expect("read index");
    assert_eq!(written, SCENARIO_DOCUMENT);
}

#[test]
fn rebuilding_over_an_existing_index_is_stable() {
    let dir = tempfile::tempdir().expect("tempdir");
    scenario_vault(dir.path());

    build_vault_index(&request(dir.path())).expect("first build");
    let second = build_vault_index(&request(dir.path())).expect("second build");

    // The generated note must not feed back into the next run.
    assert_eq!(second.note_count, 3);
    assert_eq!(second.document, SCENARIO_DOCUMENT);
}

#[test]
fn dry_run_renders_without_writing() {
    let dir = tempfile::tempdir().expect("tempdir");
    scenario_vault(dir.path());

    let mut request = request(dir.path());
    request.dry_run = true;
    let outcome = build_vault_index(&request).expect("build");

    assert!(!outcome.written);
    assert!(!dir.path().join("Index.md").exists());
    assert_eq!(outcome.document, SCENARIO_DOCUMENT);
}

#[test]
fn missing_targets_become_stub_headers() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_note(dir.path(), "A.md", "[[Ghost]]\n");

    let outcome = build_vault_index(&request(dir.path())).expect("build");
    assert_eq!(outcome.note_count, 1);
    assert_eq!(outcome.stub_count, 1);
    assert_eq!(outcome.edge_count, 1);
    // The unwritten topic collects the votes and heads its section.
    assert!(outcome.document.contains("## [[Ghost]]\n- [[A]]\n\n"));
}

#[test]
fn strict_mode_names_the_missing_target() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_note(dir.path(), "A.md", "[[Ghost]]\n");

    let mut request = request(dir.path());
    request.flags.strict = true;
    let err = build_vault_index(&request).expect_err("strict build must fail");

    assert!(err.contains("unresolved reference"));
    assert!(err.contains("Ghost"));
    assert!(err.contains("in note \"A\""));
    assert!(!dir.path().join("Index.md").exists());
}

#[test]
fn config_file_cap_applies_and_flags_win() {
    let dir = tempfile::tempdir().expect("tempdir");
    scenario_vault(dir.path());
    write_note(dir.path(), "kbindex.toml", "[index]\ncap = 1\n");

    let capped = build_vault_index(&request(dir.path())).expect("capped build");
    assert!(capped.document.contains("## [[A]]\n\n"));
    assert!(!capped.document.contains("- [[B]]"));

    let mut request = request(dir.path());
    request.flags.cap = Some(4);
    let full = build_vault_index(&request).expect("full build");
    assert_eq!(full.document, SCENARIO_DOCUMENT);
}

#[test]
fn custom_index_name_changes_output_and_exclusion() {
    let dir = tempfile::tempdir().expect("tempdir");
    scenario_vault(dir.path());
    write_note(dir.path(), "D.md", "[[Atlas]]\n[[A]]\n");

    let mut request = request(dir.path());
    request.flags.index_name = Some("Atlas".to_string());
    let outcome = build_vault_index(&request).expect("build");

    assert_eq!(outcome.out_path, dir.path().join("Atlas.md"));
    assert!(dir.path().join("Atlas.md").exists());
    assert!(!dir.path().join("Index.md").exists());
    // Links to the index note itself contribute nothing.
    assert_eq!(outcome.stub_count, 0);
    assert_eq!(outcome.edge_count, 4);

    let second = build_vault_index(&request).expect("rebuild");
    assert_eq!(second.note_count, 4);
}

#[test]
fn out_flag_redirects_the_document() {
    let dir = tempfile::tempdir().expect("tempdir");
    scenario_vault(dir.path());

    let mut request = request(dir.path());
    request.out = Some(dir.path().join("custom.md"));
    let outcome = build_vault_index(&request).expect("build");

    assert_eq!(outcome.out_path, dir.path().join("custom.md"));
    assert!(!dir.path().join("Index.md").exists());
    let written = fs::read_to_string(dir.path().join("custom.md")).expect("read custom");
    assert_eq!(written, SCENARIO_DOCUMENT);
}
