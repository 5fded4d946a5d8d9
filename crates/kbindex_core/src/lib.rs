pub mod assemble;
pub mod builder;
pub mod community;
pub mod config;
pub mod error;
pub mod rank;
pub mod report;
pub mod source;

// Re-export main types for convenience
pub use assemble::{
    assemble, IndexSection, IndexTree, SectionEntries, SectionHeading, OTHER_LABEL,
};
pub use builder::build_link_graph;
pub use community::{Cluster, CommunityDetector, GreedyModularity, LabelPropagation};
pub use config::{
    AssemblyMode, CandidateFilter, DetectionStrategy, IndexConfig, RecursionPolicy,
    ResolutionPolicy, DEFAULT_INDEX_NAME, DEFAULT_MAX_RECURSION_DEPTH, DEFAULT_MIN_RECURSION_SIZE,
    DEFAULT_REPRESENTATIVE_CAP,
};
pub use error::IndexError;
pub use rank::{page_rank, select_header, vote_rank, HEADER_CANDIDATE_THRESHOLD};
pub use report::{link_report, LinkCount, LinkReport, UNDERLINKED_MAX};
pub use source::{LineReferences, MemoryCorpus, NoteSource, ReferenceExtractor};
