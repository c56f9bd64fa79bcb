//! Loads the static YAML config and injects API tokens from the environment.
//!
//! The YAML file never carries secrets. `SOURCE_API_TOKEN` and
//! `SINK_API_TOKEN` are read here (after `.env` has been loaded by `main`); a
//! missing token is logged and the corresponding client sends no
//! `Authorization` header.
//!
//! ```yaml
//! staging_dir: ./tmp-files        # optional
//! source:
//!   api_base_url: https://docs.example.com/api
//!   docs_base_url: https://docs.example.com/doc
//!   page_limit: 100               # optional
//! sink:
//!   api_url: https://kb.example.com/api/v1
//!   knowledge_collection_id: kc-123
//!   mappings:                     # optional
//!     HR_Team: [kc-hr]
//! ```

use anyhow::{Context, Result};
use docs_bucket_core::config::BucketConfig;
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

pub const SOURCE_TOKEN_ENV: &str = "SOURCE_API_TOKEN";
pub const SINK_TOKEN_ENV: &str = "SINK_API_TOKEN";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BucketConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let content = fs::read_to_string(path_ref).map_err(|e| {
        error!(error = %e, config_path = ?path_ref, "Failed to read config file");
        anyhow::anyhow!("Failed to read config file {:?}: {}", path_ref, e)
    })?;

    let mut config: BucketConfig = match serde_yaml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    config.source.api_token = token_from_env(SOURCE_TOKEN_ENV);
    config.sink.api_token = token_from_env(SINK_TOKEN_ENV);

    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", path_ref.display()))?;

    config.trace_loaded();
    Ok(config)
}

fn token_from_env(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(token) if !token.trim().is_empty() => Some(token),
        _ => {
            warn!(env = name, "API token not set, requests will be unauthenticated");
            None
        }
    }
}
