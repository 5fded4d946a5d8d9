use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Vault-local configuration file, read from the vault root.
pub const VAULT_CONFIG_FILE: &str = "kbindex.toml";

/// Values found in `kbindex.toml`. Everything is optional: flags override
/// file values, file values override the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VaultConfig {
    pub mode: Option<String>,
    pub cap: Option<usize>,
    pub strategy: Option<String>,
    pub namespace: Option<String>,
    pub folders: Option<Vec<String>>,
    pub index_name: Option<String>,
    pub recurse: Option<bool>,
    pub min_recurse: Option<usize>,
    pub max_depth: Option<usize>,
    pub strict: Option<bool>,
    /// Which file supplied the values, when one was present.
    pub source: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct KbindexToml {
    index: Option<KbindexTomlIndex>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct KbindexTomlIndex {
    mode: Option<String>,
    cap: Option<usize>,
    strategy: Option<String>,
    namespace: Option<String>,
    folders: Option<Vec<String>>,
    index_name: Option<String>,
    recurse: Option<bool>,
    min_recurse: Option<usize>,
    max_depth: Option<usize>,
    strict: Option<bool>,
}

/// Read `kbindex.toml` from the vault root. A missing file is an empty
/// config, not an error.
pub fn load_vault_config(vault: &Path) -> Result<VaultConfig, String> {
    let path = vault.join(VAULT_CONFIG_FILE);
    if !path.exists() {
        return Ok(VaultConfig::default());
    }

    let raw = std::fs::read_to_string(&path)
        .map_err(|err| format!("read {}: {}", path.display(), err))?;
    let parsed: KbindexToml =
        toml::from_str(&raw).map_err(|err| format!("parse {}: {}", path.display(), err))?;
    let section = parsed.index.unwrap_or_default();

    Ok(VaultConfig {
        mode: section.mode,
        cap: section.cap,
        strategy: section.strategy,
        namespace: section.namespace,
        folders: section.folders,
        index_name: section.index_name,
        recurse: section.recurse,
        min_recurse: section.min_recurse,
        max_depth: section.max_depth,
        strict: section.strict,
        source: Some(path),
    })
}
