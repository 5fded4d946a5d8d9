//! Index assembly: clusters in, navigable tree out.
//!
//! Flat mode reproduces the original generator: one section per cluster,
//! holding only the elected representatives, clusters ordered biggest
//! first so the larger topics surface at the top of the document. Nested
//! mode gives each cluster a single header when the candidate field
//! supports one, pools everything headless into the reserved "Other"
//! bucket, and can refine headed sections by re-running detection on the
//! member slice, bounded by the recursion policy.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use kbindex_graph::{LinkGraph, NoteId};

use crate::community::CommunityDetector;
use crate::config::{AssemblyMode, CandidateFilter, IndexConfig, RecursionPolicy};
use crate::error::IndexError;
use crate::rank::{select_header, vote_rank};

/// Reserved label for members of headless clusters.
pub const OTHER_LABEL: &str = "Other";

/// What a section is titled with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionHeading {
    /// A real (or stub) node from the graph.
    Note(NoteId),
    /// The reserved bucket; not a note, never linked.
    Unclustered,
}

impl SectionHeading {
    pub fn label(&self) -> &str {
        match self {
            SectionHeading::Note(id) => id.as_str(),
            SectionHeading::Unclustered => OTHER_LABEL,
        }
    }
}

/// Section body: flat members or a refined subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionEntries {
    Notes(Vec<NoteId>),
    Nested(IndexTree),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSection {
    pub heading: SectionHeading,
    pub entries: SectionEntries,
}

/// The assembled index. Section order is part of the contract: descending
/// cluster size with stable ties, the unclustered bucket last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexTree {
    pub sections: Vec<IndexSection>,
}

impl IndexTree {
    pub fn empty() -> Self {
        IndexTree {
            sections: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Every identifier mentioned anywhere in the tree, headers included.
    pub fn mentioned_ids(&self) -> BTreeSet<&NoteId> {
        let mut ids = BTreeSet::new();
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids<'tree>(&'tree self, ids: &mut BTreeSet<&'tree NoteId>) {
        for section in &self.sections {
            if let SectionHeading::Note(id) = &section.heading {
                ids.insert(id);
            }
            match &section.entries {
                SectionEntries::Notes(members) => ids.extend(members.iter()),
                SectionEntries::Nested(tree) => tree.collect_ids(ids),
            }
        }
    }
}

/// Run detection + ranking + assembly over a built graph.
pub fn assemble(graph: &LinkGraph, config: &IndexConfig) -> Result<IndexTree, IndexError> {
    config.validate()?;
    let detector = config.strategy.detector();
    match config.mode {
        AssemblyMode::Flat => assemble_flat(graph, detector.as_ref(), config.representative_cap),
        AssemblyMode::Nested => Ok(assemble_nested(
            graph,
            detector.as_ref(),
            &config.candidate_filter,
            &config.recursion,
            0,
        )),
    }
}

fn assemble_flat(
    graph: &LinkGraph,
    detector: &dyn CommunityDetector,
    cap: usize,
) -> Result<IndexTree, IndexError> {
    let mut sections = Vec::new();
    for cluster in detector.detect(graph) {
        let subgraph = graph.induced_subgraph(&cluster);
        let mut elected = vote_rank(&subgraph, cap)?;
        if elected.is_empty() {
            // Nothing voted for anything: isolated notes stay out of the
            // index.
            continue;
        }
        let header = elected.remove(0);
        sections.push(IndexSection {
            heading: SectionHeading::Note(header),
            entries: SectionEntries::Notes(elected),
        });
    }
    Ok(IndexTree { sections })
}

fn assemble_nested(
    slice: &LinkGraph,
    detector: &dyn CommunityDetector,
    filter: &CandidateFilter,
    recursion: &RecursionPolicy,
    depth: usize,
) -> IndexTree {
    let mut sections = Vec::new();
    let mut other: BTreeSet<NoteId> = BTreeSet::new();

    for cluster in detector.detect(slice) {
        let subgraph = slice.induced_subgraph(&cluster);
        match select_header(&subgraph, filter) {
            None => {
                // Accumulated across clusters, never overwritten.
                other.extend(cluster);
            }
            Some(header) => {
                let mut members = cluster;
                members.remove(&header);
                let entries = if recursion.enabled
                    && depth < recursion.max_depth
                    && members.len() >= recursion.min_cluster_size
                {
                    let child = slice.induced_subgraph(&members);
                    SectionEntries::Nested(assemble_nested(
                        &child,
                        detector,
                        filter,
                        recursion,
                        depth + 1,
                    ))
                } else {
                    SectionEntries::Notes(members.into_iter().collect())
                };
                sections.push(IndexSection {
                    heading: SectionHeading::Note(header),
                    entries,
                });
            }
        }
    }

    if !other.is_empty() {
        sections.push(IndexSection {
            heading: SectionHeading::Unclustered,
            entries: SectionEntries::Notes(other.into_iter().collect()),
        });
    }

    IndexTree { sections }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_link_graph;
    use crate::config::DetectionStrategy;
    use crate::source::{LineReferences, MemoryCorpus};
    use kbindex_graph::NoteKind;

    fn graph_with_edges(nodes: &[&str], edges: &[(&str, &str)]) -> LinkGraph {
        let mut graph = LinkGraph::new();
        for node in nodes {
            graph.ensure_note(*node, NoteKind::Note);
        }
        for (source, target) in edges {
            graph.add_edge(*source, *target);
        }
        graph
    }

    fn flat_config() -> IndexConfig {
        IndexConfig::default()
    }

    fn nested_config() -> IndexConfig {
        IndexConfig {
            mode: AssemblyMode::Nested,
            strategy: DetectionStrategy::GreedyModularity,
            ..IndexConfig::default()
        }
    }

    fn section_header(section: &IndexSection) -> &str {
        section.heading.label()
    }

    fn section_notes(section: &IndexSection) -> Vec<&str> {
        match &section.entries {
            SectionEntries::Notes(members) => members.iter().map(|id| id.as_str()).collect(),
            SectionEntries::Nested(_) => panic!("expected flat entries"),
        }
    }

    #[test]
    fn empty_graph_assembles_an_empty_tree() {
        let tree = assemble(&LinkGraph::new(), &flat_config()).unwrap();
        assert!(tree.is_empty());
        let tree = assemble(&LinkGraph::new(), &nested_config()).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn concrete_scenario_flat_tree() {
        let corpus = MemoryCorpus::of(&[("A", "B"), ("B", "A"), ("C", "A")]);
        let graph = build_link_graph(&corpus, &LineReferences, &flat_config()).unwrap();
        let tree = assemble(&graph, &flat_config()).unwrap();
        assert_eq!(tree.section_count(), 1);
        assert_eq!(section_header(&tree.sections[0]), "A");
        assert_eq!(section_notes(&tree.sections[0]), vec!["B", "C"]);
    }

    #[test]
    fn flat_sections_follow_cluster_size_not_score() {
        // Two components: a 4-note chain and a 2-note pair with heavier
        // mutual linking. Size, not centrality mass, orders the sections.
        let graph = graph_with_edges(
            &["A", "B", "C", "D", "X", "Y"],
            &[("A", "B"), ("B", "C"), ("C", "D"), ("D", "A"), ("X", "Y"), ("Y", "X")],
        );
        let tree = assemble(&graph, &flat_config()).unwrap();
        assert_eq!(tree.section_count(), 2);
        let first: BTreeSet<&NoteId> = match &tree.sections[0].entries {
            SectionEntries::Notes(notes) => notes.iter().collect(),
            SectionEntries::Nested(_) => panic!("flat mode"),
        };
        assert_eq!(first.len() + 1, 4);
    }

    #[test]
    fn flat_sections_cap_their_representatives() {
        let graph = graph_with_edges(
            &["Hub", "a", "b", "c", "d", "e", "f"],
            &[
                ("a", "Hub"),
                ("b", "Hub"),
                ("c", "Hub"),
                ("d", "Hub"),
                ("e", "Hub"),
                ("f", "Hub"),
                ("Hub", "a"),
            ],
        );
        let config = IndexConfig {
            representative_cap: 3,
            ..IndexConfig::default()
        };
        let tree = assemble(&graph, &config).unwrap();
        assert_eq!(tree.section_count(), 1);
        assert_eq!(section_header(&tree.sections[0]), "Hub");
        // Header plus two more: exactly the cap.
        assert_eq!(section_notes(&tree.sections[0]).len(), 2);
    }

    #[test]
    fn isolated_singletons_are_skipped_in_flat_mode() {
        let graph = graph_with_edges(&["A", "B", "Lonely"], &[("A", "B"), ("B", "A")]);
        let tree = assemble(&graph, &flat_config()).unwrap();
        assert_eq!(tree.section_count(), 1);
        assert!(!tree.mentioned_ids().contains(&NoteId::from("Lonely")));
    }

    #[test]
    fn flat_assembly_is_deterministic() {
        let graph = graph_with_edges(
            &["A", "B", "C", "D", "E", "F"],
            &[("A", "B"), ("B", "C"), ("C", "A"), ("D", "E"), ("E", "F"), ("F", "D")],
        );
        let first = assemble(&graph, &flat_config()).unwrap();
        let second = assemble(&graph, &flat_config()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn headless_clusters_pool_into_other() {
        // Two two-note clusters: too thin a candidate field for a header
        // either way, so everything lands in the bucket, accumulated.
        let graph = graph_with_edges(
            &["A", "B", "X", "Y"],
            &[("A", "B"), ("B", "A"), ("X", "Y"), ("Y", "X")],
        );
        let config = IndexConfig {
            recursion: RecursionPolicy {
                enabled: false,
                ..RecursionPolicy::default()
            },
            ..nested_config()
        };
        let tree = assemble(&graph, &config).unwrap();
        assert_eq!(tree.section_count(), 1);
        assert_eq!(tree.sections[0].heading, SectionHeading::Unclustered);
        assert_eq!(section_notes(&tree.sections[0]), vec!["A", "B", "X", "Y"]);
    }

    #[test]
    fn other_bucket_renders_after_headed_sections() {
        let graph = graph_with_edges(
            &["A", "B", "C", "D", "X", "Y"],
            &[
                ("A", "B"),
                ("B", "A"),
                ("C", "A"),
                ("D", "A"),
                ("X", "Y"),
                ("Y", "X"),
            ],
        );
        let config = IndexConfig {
            recursion: RecursionPolicy {
                enabled: false,
                ..RecursionPolicy::default()
            },
            ..nested_config()
        };
        let tree = assemble(&graph, &config).unwrap();
        assert_eq!(tree.section_count(), 2);
        assert!(matches!(tree.sections[0].heading, SectionHeading::Note(_)));
        assert_eq!(tree.sections[1].heading, SectionHeading::Unclustered);
    }

    #[test]
    fn nested_member_lists_exclude_the_header() {
        let graph = graph_with_edges(
            &["A", "B", "C", "D"],
            &[("B", "A"), ("C", "A"), ("D", "A"), ("A", "B")],
        );
        let config = IndexConfig {
            recursion: RecursionPolicy {
                enabled: false,
                ..RecursionPolicy::default()
            },
            ..nested_config()
        };
        let tree = assemble(&graph, &config).unwrap();
        assert_eq!(tree.section_count(), 1);
        let header = section_header(&tree.sections[0]).to_string();
        let members = section_notes(&tree.sections[0]);
        assert!(!members.contains(&header.as_str()));
        assert_eq!(members.len(), 3);
    }

    #[test]
    fn recursion_depth_is_bounded() {
        fn max_depth(tree: &IndexTree) -> usize {
            tree.sections
                .iter()
                .map(|section| match &section.entries {
                    SectionEntries::Notes(_) => 0,
                    SectionEntries::Nested(child) => 1 + max_depth(child),
                })
                .max()
                .unwrap_or(0)
        }

        // A dense clique keeps re-detecting as one community; only the
        // bounds stop the descent.
        let ids: Vec<String> = (0..10).map(|i| format!("Concepts/N{:02}", i)).collect();
        let mut graph = LinkGraph::new();
        for id in &ids {
            graph.ensure_note(id.as_str(), NoteKind::Note);
        }
        for source in &ids {
            for target in &ids {
                graph.add_edge(source.as_str(), target.as_str());
            }
        }

        let config = IndexConfig {
            candidate_filter: CandidateFilter::namespace("Concepts"),
            recursion: RecursionPolicy {
                enabled: true,
                min_cluster_size: 2,
                max_depth: 2,
            },
            ..nested_config()
        };
        let tree = assemble(&graph, &config).unwrap();
        assert!(max_depth(&tree) <= 2);
        assert!(max_depth(&tree) >= 1, "the clique is big enough to refine");
    }

    #[test]
    fn small_member_sets_stay_flat() {
        let graph = graph_with_edges(
            &["A", "B", "C", "D"],
            &[("B", "A"), ("C", "A"), ("D", "A"), ("A", "B")],
        );
        let config = IndexConfig {
            recursion: RecursionPolicy {
                enabled: true,
                min_cluster_size: 6,
                max_depth: 3,
            },
            ..nested_config()
        };
        let tree = assemble(&graph, &config).unwrap();
        // Three members < floor of six: no refinement happens.
        assert!(matches!(tree.sections[0].entries, SectionEntries::Notes(_)));
    }

    #[test]
    fn assemble_rejects_invalid_configuration_up_front() {
        let graph = graph_with_edges(&["A"], &[]);
        let mut config = nested_config();
        config.recursion.min_cluster_size = 0;
        let err = assemble(&graph, &config).unwrap_err();
        assert!(matches!(err, IndexError::InvalidConfiguration(_)));
    }

    #[test]
    fn every_mentioned_id_is_a_graph_node() {
        let corpus = MemoryCorpus::of(&[
            ("A", "B\nMissing"),
            ("B", "A\nC"),
            ("C", "A"),
        ]);
        let config = flat_config();
        let graph = build_link_graph(&corpus, &LineReferences, &config).unwrap();
        let tree = assemble(&graph, &config).unwrap();
        for id in tree.mentioned_ids() {
            assert!(graph.contains(id.as_str()));
        }
    }
}
