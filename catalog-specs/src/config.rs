//! Configuration loaded with figment.
//!
//! Sources, later ones overriding earlier ones:
//! 1. Built-in defaults
//! 2. An optional config file (TOML, YAML or JSON, chosen by extension)
//! 3. Environment variables prefixed with `CATALOG_SPECS_`

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SpecsError};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "CATALOG_SPECS_";

/// Runtime settings for the specification engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecsConfig {
    /// Directory of template seed files loaded at startup.
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for SpecsConfig {
    fn default() -> Self {
        Self {
            templates_dir: None,
            log_filter: default_log_filter(),
        }
    }
}

impl SpecsConfig {
    /// Load configuration from defaults, an optional file, and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: SpecsConfig = Self::figment(path)?.extract()?;
        debug!(?config, "loaded configuration");
        Ok(config)
    }

    /// The merged provider chain, for callers that embed this config in their own.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(SpecsConfig::default()));

        if let Some(path) = path {
            figment = match path.extension().and_then(|e| e.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => {
                    return Err(SpecsError::UnsupportedConfigFormat {
                        path: path.to_path_buf(),
                    })
                }
            };
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }
}
