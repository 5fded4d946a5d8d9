use serde::{Deserialize, Serialize};

use kbindex_graph::NoteId;

use crate::community::{CommunityDetector, GreedyModularity, LabelPropagation};
use crate::error::IndexError;

/// Default representative cap per cluster.
pub const DEFAULT_REPRESENTATIVE_CAP: usize = 4;
/// Identifier of the generated index note, excluded from every graph.
pub const DEFAULT_INDEX_NAME: &str = "Index";
/// Default recursion floor: member sets smaller than this stay flat.
pub const DEFAULT_MIN_RECURSION_SIZE: usize = 6;
/// Default recursion ceiling: one refinement level below the root.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 1;

/// How a reference to a note that does not exist is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionPolicy {
    /// Abort the run with `UnresolvedReference`.
    Strict,
    /// Create a stub node on first encounter. The default: a topic can
    /// accumulate inbound references before any note about it exists.
    Permissive,
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        ResolutionPolicy::Permissive
    }
}

/// Shape of the assembled index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssemblyMode {
    /// One section per cluster, ranked representatives only.
    Flat,
    /// Header-per-cluster sections with an "Other" bucket, optionally
    /// refined by recursion.
    Nested,
}

impl AssemblyMode {
    pub fn name(&self) -> &'static str {
        match self {
            AssemblyMode::Flat => "flat",
            AssemblyMode::Nested => "nested",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "flat" => Some(AssemblyMode::Flat),
            "nested" => Some(AssemblyMode::Nested),
            _ => None,
        }
    }
}

impl Default for AssemblyMode {
    fn default() -> Self {
        AssemblyMode::Flat
    }
}

/// Which community-detection strategy partitions the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionStrategy {
    LabelPropagation,
    GreedyModularity,
}

impl DetectionStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            DetectionStrategy::LabelPropagation => "label-propagation",
            DetectionStrategy::GreedyModularity => "greedy-modularity",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "label-propagation" => Some(DetectionStrategy::LabelPropagation),
            "greedy-modularity" => Some(DetectionStrategy::GreedyModularity),
            _ => None,
        }
    }

    pub fn detector(&self) -> Box<dyn CommunityDetector> {
        match self {
            DetectionStrategy::LabelPropagation => Box::new(LabelPropagation),
            DetectionStrategy::GreedyModularity => Box::new(GreedyModularity),
        }
    }
}

impl Default for DetectionStrategy {
    fn default() -> Self {
        DetectionStrategy::LabelPropagation
    }
}

/// Restricts header eligibility in nested mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateFilter {
    /// Every node qualifies.
    Any,
    /// Only identifiers under the given prefix qualify, e.g. `Concepts/`.
    Prefix(String),
}

impl CandidateFilter {
    pub fn admits(&self, id: &NoteId) -> bool {
        match self {
            CandidateFilter::Any => true,
            CandidateFilter::Prefix(prefix) => id.starts_with(prefix),
        }
    }

    /// Prefix filter over a namespace folder name (`Concepts` becomes
    /// `Concepts/`).
    pub fn namespace(folder: &str) -> Self {
        let trimmed = folder.trim_end_matches('/');
        CandidateFilter::Prefix(format!("{}/", trimmed))
    }
}

impl Default for CandidateFilter {
    fn default() -> Self {
        CandidateFilter::Any
    }
}

/// Explicit termination bounds for hierarchical refinement. The original
/// design left this open ("continue until no longer viable"); these bounds
/// make descent provably finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecursionPolicy {
    pub enabled: bool,
    /// Member sets below this size are emitted flat instead of refined.
    pub min_cluster_size: usize,
    /// Refinement levels below the root; 1 reproduces the reference
    /// behavior.
    pub max_depth: usize,
}

impl Default for RecursionPolicy {
    fn default() -> Self {
        RecursionPolicy {
            enabled: true,
            min_cluster_size: DEFAULT_MIN_RECURSION_SIZE,
            max_depth: DEFAULT_MAX_RECURSION_DEPTH,
        }
    }
}

/// Immutable configuration for one pipeline run. Passed through every
/// stage explicitly; nothing here mutates mid-run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    pub resolution: ResolutionPolicy,
    pub mode: AssemblyMode,
    pub strategy: DetectionStrategy,
    pub representative_cap: usize,
    pub candidate_filter: CandidateFilter,
    pub recursion: RecursionPolicy,
    /// Identifier (and file stem) of the generated index note.
    pub index_name: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            resolution: ResolutionPolicy::default(),
            mode: AssemblyMode::default(),
            strategy: DetectionStrategy::default(),
            representative_cap: DEFAULT_REPRESENTATIVE_CAP,
            candidate_filter: CandidateFilter::default(),
            recursion: RecursionPolicy::default(),
            index_name: DEFAULT_INDEX_NAME.to_string(),
        }
    }
}

impl IndexConfig {
    /// Rejects contract violations before any graph work begins.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.representative_cap == 0 {
            return Err(IndexError::InvalidConfiguration(
                "representative cap must be positive".to_string(),
            ));
        }
        if self.index_name.trim().is_empty() {
            return Err(IndexError::InvalidConfiguration(
                "index name must not be empty".to_string(),
            ));
        }
        if self.recursion.enabled {
            if self.recursion.min_cluster_size == 0 {
                return Err(IndexError::InvalidConfiguration(
                    "minimum recursion size must be positive".to_string(),
                ));
            }
            if self.recursion.max_depth == 0 {
                return Err(IndexError::InvalidConfiguration(
                    "maximum recursion depth must be positive".to_string(),
                ));
            }
        }
        if let CandidateFilter::Prefix(prefix) = &self.candidate_filter {
            if prefix.is_empty() {
                return Err(IndexError::InvalidConfiguration(
                    "candidate prefix must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}
