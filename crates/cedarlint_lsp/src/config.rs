//! Configuration management for LSP server.

use tracing::{error, info};

use cedarlint_core::CedarLintConfig;

use crate::state::BackendState;

/// Reloads configuration from the workspace root and applies it.
///
/// Cached results are dropped since they may have been computed against a
/// different schema.
pub fn reload_config(state: &BackendState) {
    let root = match state.workspace_root.read() {
        Ok(g) => g.clone(),
        Err(e) => {
            error!("Workspace root lock poisoned: {}", e);
            return;
        }
    };

    let config = match root.as_ref().and_then(CedarLintConfig::discover) {
        Some(config_path) => {
            info!("Found config file: {}", config_path.display());
            match CedarLintConfig::from_file(&config_path) {
                Ok(config) => {
                    info!("Loaded configuration from workspace");
                    config
                }
                Err(e) => {
                    error!("Failed to load config: {}", e);
                    return;
                }
            }
        }
        None => CedarLintConfig::default(),
    };

    apply_config(state, config);
}

fn apply_config(state: &BackendState, config: CedarLintConfig) {
    state.resolver.apply_config(&config);
    state.validator.set_cache_enabled(config.cache);
    state.validator.clear_cache();

    match state.config.write() {
        Ok(mut current) => *current = config,
        Err(e) => error!("Config lock poisoned: {}", e),
    }
}
