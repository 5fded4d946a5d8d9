use std::path::PathBuf;

use clap::{Parser, Subcommand};

use kbindex_cli::{
    build_vault_index, vault_link_report, vault_stats, BuildRequest, LinksRequest, Overrides,
    StatsRequest,
};
use kbindex_render::render_link_report;

#[derive(Parser)]
#[command(
    name = "kbindex",
    version,
    about = "Link-graph index generator for markdown vaults"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index document and write it into the vault
    Build(BuildArgs),
    /// Report underlinked and sufficiently linked notes
    Links(LinksArgs),
    /// Graph and cluster statistics for the vault
    Stats(StatsArgs),
}

#[derive(Parser)]
struct BuildArgs {
    /// Vault root directory
    #[arg(long, value_name = "DIR")]
    vault: PathBuf,

    /// Output file (default: <vault>/<index-name>.md)
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Index shape: flat|nested
    #[arg(long, value_name = "MODE")]
    mode: Option<String>,

    /// Representatives kept per cluster
    #[arg(long, value_name = "N")]
    cap: Option<usize>,

    /// Community detection strategy: label-propagation|greedy-modularity
    #[arg(long, value_name = "NAME")]
    strategy: Option<String>,

    /// Folder whose notes are eligible as section headers (nested mode)
    #[arg(long, value_name = "FOLDER")]
    namespace: Option<String>,

    /// Folders to scan, comma-separated (default: the whole vault)
    #[arg(long, value_delimiter = ',', value_name = "FOLDERS")]
    folders: Option<Vec<String>>,

    /// Name of the generated index note
    #[arg(long, value_name = "NAME")]
    index_name: Option<String>,

    /// Do not refine nested sections by re-running detection
    #[arg(long)]
    no_recurse: bool,

    /// Smallest member set worth refining
    #[arg(long, value_name = "N")]
    min_recurse: Option<usize>,

    /// Refinement levels below the root
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Fail on references to notes that do not exist
    #[arg(long)]
    strict: bool,

    /// Print the document instead of writing it
    #[arg(long)]
    dry_run: bool,

    /// Output JSON instead of key=value lines
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct LinksArgs {
    /// Vault root directory
    #[arg(long, value_name = "DIR")]
    vault: PathBuf,

    /// Inbound-link ceiling below which a note counts as underlinked
    #[arg(long, value_name = "N")]
    underlinked_max: Option<usize>,

    /// Folders to scan, comma-separated (default: the whole vault)
    #[arg(long, value_delimiter = ',', value_name = "FOLDERS")]
    folders: Option<Vec<String>>,

    /// Name of the generated index note
    #[arg(long, value_name = "NAME")]
    index_name: Option<String>,

    /// Fail on references to notes that do not exist
    #[arg(long)]
    strict: bool,

    /// Output JSON instead of the markdown report
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct StatsArgs {
    /// Vault root directory
    #[arg(long, value_name = "DIR")]
    vault: PathBuf,

    /// Folders to scan, comma-separated (default: the whole vault)
    #[arg(long, value_delimiter = ',', value_name = "FOLDERS")]
    folders: Option<Vec<String>>,

    /// Name of the generated index note
    #[arg(long, value_name = "NAME")]
    index_name: Option<String>,

    /// Fail on references to notes that do not exist
    #[arg(long)]
    strict: bool,

    /// Output JSON instead of key=value lines
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Build(args) => run_build(args),
        Commands::Links(args) => run_links(args),
        Commands::Stats(args) => run_stats(args),
    };
    if let Err(err) = result {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn run_build(args: BuildArgs) -> Result<(), String> {
    let request = BuildRequest {
        vault: args.vault,
        out: args.out,
        dry_run: args.dry_run,
        flags: Overrides {
            mode: args.mode,
            cap: args.cap,
            strategy: args.strategy,
            namespace: args.namespace,
            folders: args.folders,
            index_name: args.index_name,
            no_recurse: args.no_recurse,
            min_recurse: args.min_recurse,
            max_depth: args.max_depth,
            strict: args.strict,
        },
    };
    let outcome = build_vault_index(&request)?;

    if args.json {
        let json = serde_json::to_string_pretty(&serde_json::json!({
            "out": outcome.out_path.display().to_string(),
            "written": outcome.written,
            "mode": outcome.mode.name(),
            "strategy": outcome.strategy.name(),
            "notes": outcome.note_count,
            "stubs": outcome.stub_count,
            "edges": outcome.edge_count,
            "sections": outcome.tree.section_count(),
            "generated_at": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            "tree": outcome.tree,
        }))
        .map_err(|err| format!("json encode: {}", err))?;
        println!("{}", json);
        return Ok(());
    }

    if !outcome.written {
        print!("{}", outcome.document);
        return Ok(());
    }

    println!("out={}", outcome.out_path.display());
    println!("mode={}", outcome.mode.name());
    println!("strategy={}", outcome.strategy.name());
    println!("notes={}", outcome.note_count);
    println!("stubs={}", outcome.stub_count);
    println!("edges={}", outcome.edge_count);
    println!("sections={}", outcome.tree.section_count());
    Ok(())
}

fn run_links(args: LinksArgs) -> Result<(), String> {
    let request = LinksRequest {
        vault: args.vault,
        underlinked_max: args.underlinked_max,
        flags: Overrides {
            folders: args.folders,
            index_name: args.index_name,
            strict: args.strict,
            ..Overrides::default()
        },
    };
    let report = vault_link_report(&request)?;

    if args.json {
        let json = serde_json::to_string_pretty(&serde_json::json!({
            "underlinked_max": report.underlinked_max,
            "underlinked": report.underlinked,
            "sufficiently_linked": report.sufficiently_linked,
        }))
        .map_err(|err| format!("json encode: {}", err))?;
        println!("{}", json);
        return Ok(());
    }

    print!("{}", render_link_report(&report));
    Ok(())
}

fn run_stats(args: StatsArgs) -> Result<(), String> {
    let request = StatsRequest {
        vault: args.vault,
        flags: Overrides {
            folders: args.folders,
            index_name: args.index_name,
            strict: args.strict,
            ..Overrides::default()
        },
    };
    let stats = vault_stats(&request)?;

    if args.json {
        let strategies: Vec<serde_json::Value> = stats
            .strategies
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "strategy": entry.strategy.name(),
                    "clusters": entry.cluster_count,
                    "sizes": entry.sizes,
                })
            })
            .collect();
        let json = serde_json::to_string_pretty(&serde_json::json!({
            "notes": stats.note_count,
            "stubs": stats.stub_count,
            "edges": stats.edge_count,
            "corpus_sha256": stats.corpus_hash,
            "config_source": stats
                .config_source
                .as_ref()
                .map(|path| path.display().to_string()),
            "strategies": strategies,
        }))
        .map_err(|err| format!("json encode: {}", err))?;
        println!("{}", json);
        return Ok(());
    }

    println!("notes={}", stats.note_count);
    println!("stubs={}", stats.stub_count);
    println!("edges={}", stats.edge_count);
    println!("corpus_sha256={}", stats.corpus_hash);
    if let Some(source) = stats.config_source.as_ref() {
        println!("config_source={}", source.display());
    }
    for entry in &stats.strategies {
        let key = entry.strategy.name().replace('-', "_");
        let sizes: Vec<String> = entry.sizes.iter().map(|size| size.to_string()).collect();
        println!("clusters_{}={}", key, entry.cluster_count);
        println!("sizes_{}={}", key, sizes.join(","));
    }
    Ok(())
}
