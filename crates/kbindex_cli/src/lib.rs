//! Command implementations behind the `kbindex` binary. main.rs owns flag
//! parsing and printing; everything that does work lives here so the
//! integration tests can call it directly.

pub mod pipeline;
pub mod vault_config;

pub use pipeline::{
    build_vault_index, resolve_settings, vault_link_report, vault_stats, BuildOutcome,
    BuildRequest, LinksRequest, Overrides, Settings, StatsOutcome, StatsRequest, StrategyStats,
};
pub use vault_config::{load_vault_config, VaultConfig, VAULT_CONFIG_FILE};
