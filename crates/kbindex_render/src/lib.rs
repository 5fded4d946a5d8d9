//! Markdown rendering of the assembled index.
//!
//! The document format is the legacy generator's, byte for byte on flat
//! trees: title, regeneration notice, a rule, then one section per cluster
//! with wikilinked members. Nested trees deepen the heading marker one
//! level per descent. The renderer is a pure tree-to-string fold; writing
//! the file is the caller's job.

use kbindex_core::{IndexSection, IndexTree, LinkCount, LinkReport, SectionEntries, SectionHeading};

/// Legacy document title.
pub const DEFAULT_TITLE: &str = "Main Index";
/// Legacy warning line under the title.
pub const DEFAULT_NOTICE: &str =
    "This index is automated, any edits will be overwritten on next regeneration.";

/// Deepest heading marker markdown allows.
const MAX_HEADING_DEPTH: usize = 6;

/// Document framing. Defaults reproduce the legacy generator.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub title: String,
    pub notice: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            title: DEFAULT_TITLE.to_string(),
            notice: DEFAULT_NOTICE.to_string(),
        }
    }
}

/// Render the whole index document.
pub fn render_index(tree: &IndexTree, options: &RenderOptions) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", options.title));
    out.push_str(&format!("{}\n\n", options.notice));
    out.push_str("---\n\n");
    for section in &tree.sections {
        render_section(section, 0, &mut out);
    }
    out
}

fn render_section(section: &IndexSection, depth: usize, out: &mut String) {
    let marker = "#".repeat((depth + 2).min(MAX_HEADING_DEPTH));
    match &section.heading {
        SectionHeading::Note(id) => out.push_str(&format!("{} [[{}]]\n", marker, id)),
        // The bucket is not a note; linking it would invite someone to
        // create "Other.md".
        SectionHeading::Unclustered => {
            out.push_str(&format!("{} {}\n", marker, section.heading.label()))
        }
    }
    match &section.entries {
        SectionEntries::Notes(members) => {
            for member in members {
                out.push_str(&format!("- [[{}]]\n", member));
            }
            out.push('\n');
        }
        SectionEntries::Nested(subtree) => {
            out.push('\n');
            for child in &subtree.sections {
                render_section(child, depth + 1, out);
            }
        }
    }
}

/// Render the inbound-link census as plain markdown.
pub fn render_link_report(report: &LinkReport) -> String {
    let mut out = String::new();
    out.push_str("# Link Report\n\n");
    out.push_str(&format!(
        "Underlinked (in-degree <= {}):\n\n",
        report.underlinked_max
    ));
    push_group(&report.underlinked, &mut out);
    out.push_str("Sufficiently linked:\n\n");
    push_group(&report.sufficiently_linked, &mut out);
    out
}

fn push_group(group: &[LinkCount], out: &mut String) {
    if group.is_empty() {
        out.push_str("(none)\n\n");
        return;
    }
    for count in group {
        out.push_str(&format!("- [[{}]] (in-links: {})\n", count.id, count.inlinks));
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbindex_graph::NoteId;

    fn section(header: &str, members: &[&str]) -> IndexSection {
        IndexSection {
            heading: SectionHeading::Note(NoteId::new(header)),
            entries: SectionEntries::Notes(members.iter().copied().map(NoteId::new).collect()),
        }
    }

    #[test]
    fn flat_document_matches_the_legacy_format() {
        let tree = IndexTree {
            sections: vec![
                section("Graph Theory", &["Euler Paths", "Hamiltonian Cycles"]),
                section("Writing", &["Drafting"]),
            ],
        };
        let out = render_index(&tree, &RenderOptions::default());
        assert_eq!(
            out,
            "# Main Index\n\n\
             This index is automated, any edits will be overwritten on next regeneration.\n\n\
             ---\n\n\
             ## [[Graph Theory]]\n\
             - [[Euler Paths]]\n\
             - [[Hamiltonian Cycles]]\n\n\
             ## [[Writing]]\n\
             - [[Drafting]]\n\n"
        );
    }

    #[test]
    fn empty_tree_is_just_the_preamble() {
        let out = render_index(&IndexTree::empty(), &RenderOptions::default());
        assert_eq!(
            out,
            "# Main Index\n\n\
             This index is automated, any edits will be overwritten on next regeneration.\n\n\
             ---\n\n"
        );
    }

    #[test]
    fn custom_title_and_notice() {
        let options = RenderOptions {
            title: "Fiction Index".to_string(),
            notice: "Generated nightly.".to_string(),
        };
        let out = render_index(&IndexTree::empty(), &options);
        assert!(out.starts_with("# Fiction Index\n\nGenerated nightly.\n\n---\n\n"));
    }

    #[test]
    fn nested_sections_deepen_the_heading() {
        let tree = IndexTree {
            sections: vec![IndexSection {
                heading: SectionHeading::Note(NoteId::new("Top")),
                entries: SectionEntries::Nested(IndexTree {
                    sections: vec![section("Sub", &["Leaf"])],
                }),
            }],
        };
        let out = render_index(&tree, &RenderOptions::default());
        assert!(out.contains("## [[Top]]\n\n### [[Sub]]\n- [[Leaf]]\n\n"));
    }

    #[test]
    fn heading_depth_caps_at_six_markers() {
        let mut tree = IndexTree {
            sections: vec![section("Leaf", &["Member"])],
        };
        for level in (0..6).rev() {
            tree = IndexTree {
                sections: vec![IndexSection {
                    heading: SectionHeading::Note(NoteId::new(format!("Level {}", level))),
                    entries: SectionEntries::Nested(tree),
                }],
            };
        }
        let out = render_index(&tree, &RenderOptions::default());
        assert!(out.contains("###### [[Level 4]]"));
        assert!(out.contains("###### [[Leaf]]"));
        assert!(!out.contains("#######"));
    }

    #[test]
    fn other_renders_as_a_plain_heading() {
        let tree = IndexTree {
            sections: vec![
                section("Named", &["A"]),
                IndexSection {
                    heading: SectionHeading::Unclustered,
                    entries: SectionEntries::Notes(vec![NoteId::new("Stray")]),
                },
            ],
        };
        let out = render_index(&tree, &RenderOptions::default());
        assert!(out.contains("## Other\n- [[Stray]]\n\n"));
        assert!(!out.contains("[[Other]]"));
    }

    #[test]
    fn link_report_lists_both_groups() {
        let report = LinkReport {
            underlinked_max: 2,
            underlinked: vec![
                LinkCount {
                    id: NoteId::new("Lonely"),
                    inlinks: 0,
                },
                LinkCount {
                    id: NoteId::new("Almost"),
                    inlinks: 2,
                },
            ],
            sufficiently_linked: vec![LinkCount {
                id: NoteId::new("Hub"),
                inlinks: 5,
            }],
        };
        let out = render_link_report(&report);
        assert_eq!(
            out,
            "# Link Report\n\n\
             Underlinked (in-degree <= 2):\n\n\
             - [[Lonely]] (in-links: 0)\n\
             - [[Almost]] (in-links: 2)\n\n\
             Sufficiently linked:\n\n\
             - [[Hub]] (in-links: 5)\n\n"
        );
    }

    #[test]
    fn empty_report_groups_say_none() {
        let report = LinkReport {
            underlinked_max: 2,
            underlinked: Vec::new(),
            sufficiently_linked: Vec::new(),
        };
        let out = render_link_report(&report);
        assert!(out.contains("Underlinked (in-degree <= 2):\n\n(none)\n\n"));
        assert!(out.contains("Sufficiently linked:\n\n(none)\n\n"));
    }
}
