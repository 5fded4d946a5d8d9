//! Shared orchestration behind the CLI commands: merge configuration from
//! flags and `kbindex.toml`, scan the vault, build the graph, and hand
//! each command a typed outcome. main.rs only parses flags and prints.

use std::fs;
use std::path::{Path, PathBuf};

use kbindex_core::{
    assemble, build_link_graph, link_report, AssemblyMode, CandidateFilter, DetectionStrategy,
    IndexConfig, IndexTree, LinkReport, RecursionPolicy, ResolutionPolicy, DEFAULT_INDEX_NAME,
    DEFAULT_MAX_RECURSION_DEPTH, DEFAULT_MIN_RECURSION_SIZE, DEFAULT_REPRESENTATIVE_CAP,
    UNDERLINKED_MAX,
};
use kbindex_graph::LinkGraph;
use kbindex_obsidian::{scan_vault, ScanOptions, VaultCatalog};
use kbindex_render::{render_index, RenderOptions};

use crate::vault_config::{load_vault_config, VaultConfig};

/// Flag-level overrides. `None` defers to `kbindex.toml`, then to the
/// built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub mode: Option<String>,
    pub cap: Option<usize>,
    pub strategy: Option<String>,
    pub namespace: Option<String>,
    pub folders: Option<Vec<String>>,
    pub index_name: Option<String>,
    pub no_recurse: bool,
    pub min_recurse: Option<usize>,
    pub max_depth: Option<usize>,
    pub strict: bool,
}

/// Fully merged settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: IndexConfig,
    pub scan: ScanOptions,
}

/// Merge precedence: flag, then file, then default. Validates the result
/// before any vault work starts.
pub fn resolve_settings(file: &VaultConfig, flags: &Overrides) -> Result<Settings, String> {
    let mode = match flags.mode.as_deref().or(file.mode.as_deref()) {
        Some(name) => {
            AssemblyMode::from_name(name).ok_or_else(|| format!("unknown mode: {}", name))?
        }
        None => AssemblyMode::default(),
    };
    let strategy = match flags.strategy.as_deref().or(file.strategy.as_deref()) {
        Some(name) => DetectionStrategy::from_name(name)
            .ok_or_else(|| format!("unknown strategy: {}", name))?,
        // The hierarchical layout grew out of the modularity-based
        // generator; keep that pairing unless told otherwise.
        None => match mode {
            AssemblyMode::Flat => DetectionStrategy::LabelPropagation,
            AssemblyMode::Nested => DetectionStrategy::GreedyModularity,
        },
    };

    let namespace = flags.namespace.clone().or_else(|| file.namespace.clone());
    let candidate_filter = match (mode, namespace.as_deref()) {
        (AssemblyMode::Nested, Some(folder)) => CandidateFilter::namespace(folder),
        _ => CandidateFilter::Any,
    };

    let recursion = RecursionPolicy {
        enabled: if flags.no_recurse {
            false
        } else {
            file.recurse.unwrap_or(true)
        },
        min_cluster_size: flags
            .min_recurse
            .or(file.min_recurse)
            .unwrap_or(DEFAULT_MIN_RECURSION_SIZE),
        max_depth: flags
            .max_depth
            .or(file.max_depth)
            .unwrap_or(DEFAULT_MAX_RECURSION_DEPTH),
    };

    let index_name = flags
        .index_name
        .clone()
        .or_else(|| file.index_name.clone())
        .unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string());
    let resolution = if flags.strict || file.strict.unwrap_or(false) {
        ResolutionPolicy::Strict
    } else {
        ResolutionPolicy::Permissive
    };

    let config = IndexConfig {
        resolution,
        mode,
        strategy,
        representative_cap: flags.cap.or(file.cap).unwrap_or(DEFAULT_REPRESENTATIVE_CAP),
        candidate_filter,
        recursion,
        index_name: index_name.clone(),
    };
    config.validate().map_err(|err| err.to_string())?;

    let scan = ScanOptions {
        folders: flags
            .folders
            .clone()
            .or_else(|| file.folders.clone())
            .unwrap_or_default(),
        index_name,
        namespace,
    };

    Ok(Settings { config, scan })
}

fn load_settings(vault: &Path, flags: &Overrides) -> Result<Settings, String> {
    let file = load_vault_config(vault)?;
    resolve_settings(&file, flags)
}

fn scan_and_graph(
    vault: &Path,
    settings: &Settings,
) -> Result<(VaultCatalog, LinkGraph), String> {
    let catalog = scan_vault(vault, settings.scan.clone()).map_err(|err| err.to_string())?;
    let graph =
        build_link_graph(&catalog, &catalog, &settings.config).map_err(|err| err.to_string())?;
    Ok((catalog, graph))
}

#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub vault: PathBuf,
    /// Target file; defaults to `<vault>/<index-name>.md`.
    pub out: Option<PathBuf>,
    /// Render without writing.
    pub dry_run: bool,
    pub flags: Overrides,
}

#[derive(Debug)]
pub struct BuildOutcome {
    pub out_path: PathBuf,
    pub written: bool,
    pub document: String,
    pub tree: IndexTree,
    pub note_count: usize,
    pub stub_count: usize,
    pub edge_count: usize,
    pub mode: AssemblyMode,
    pub strategy: DetectionStrategy,
}

/// Scan, build, assemble, render, and (unless dry-running) write.
pub fn build_vault_index(request: &BuildRequest) -> Result<BuildOutcome, String> {
    let settings = load_settings(&request.vault, &request.flags)?;
    let (_catalog, graph) = scan_and_graph(&request.vault, &settings)?;
    let tree = assemble(&graph, &settings.config).map_err(|err| err.to_string())?;
    let document = render_index(&tree, &RenderOptions::default());

    let out_path = match &request.out {
        Some(path) => path.clone(),
        None => request
            .vault
            .join(format!("{}.md", settings.config.index_name)),
    };
    let written = !request.dry_run;
    if written {
        fs::write(&out_path, &document)
            .map_err(|err| format!("write {}: {}", out_path.display(), err))?;
    }

    Ok(BuildOutcome {
        out_path,
        written,
        document,
        note_count: graph.node_count() - graph.stub_count(),
        stub_count: graph.stub_count(),
        edge_count: graph.edge_count(),
        mode: settings.config.mode,
        strategy: settings.config.strategy,
        tree,
    })
}

#[derive(Debug, Clone)]
pub struct LinksRequest {
    pub vault: PathBuf,
    /// Inbound-link ceiling; defaults to [`UNDERLINKED_MAX`].
    pub underlinked_max: Option<usize>,
    pub flags: Overrides,
}

/// Build the graph and census its inbound links.
pub fn vault_link_report(request: &LinksRequest) -> Result<LinkReport, String> {
    let settings = load_settings(&request.vault, &request.flags)?;
    let (_catalog, graph) = scan_and_graph(&request.vault, &settings)?;
    Ok(link_report(
        &graph,
        request.underlinked_max.unwrap_or(UNDERLINKED_MAX),
    ))
}

#[derive(Debug, Clone)]
pub struct StatsRequest {
    pub vault: PathBuf,
    pub flags: Overrides,
}

#[derive(Debug, Clone)]
pub struct StrategyStats {
    pub strategy: DetectionStrategy,
    pub cluster_count: usize,
    /// Cluster sizes, largest first.
    pub sizes: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct StatsOutcome {
    pub note_count: usize,
    pub stub_count: usize,
    pub edge_count: usize,
    pub corpus_hash: String,
    /// `kbindex.toml` path when one supplied values for this run.
    pub config_source: Option<PathBuf>,
    pub strategies: Vec<StrategyStats>,
}

/// Counts, per-strategy cluster shapes, and the corpus digest.
pub fn vault_stats(request: &StatsRequest) -> Result<StatsOutcome, String> {
    let file = load_vault_config(&request.vault)?;
    let settings = resolve_settings(&file, &request.flags)?;
    let (catalog, graph) = scan_and_graph(&request.vault, &settings)?;

    let mut strategies = Vec::new();
    for strategy in [
        DetectionStrategy::LabelPropagation,
        DetectionStrategy::GreedyModularity,
    ] {
        let sizes: Vec<usize> = strategy
            .detector()
            .detect(&graph)
            .iter()
            .map(|cluster| cluster.len())
            .collect();
        strategies.push(StrategyStats {
            strategy,
            cluster_count: sizes.len(),
            sizes,
        });
    }

    Ok(StatsOutcome {
        note_count: graph.node_count() - graph.stub_count(),
        stub_count: graph.stub_count(),
        edge_count: graph.edge_count(),
        corpus_hash: catalog.corpus_hash(),
        config_source: file.source,
        strategies,
    })
}
