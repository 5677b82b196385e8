use super::schema::JobfillConfig;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Invalid site pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("backend.base_url '{0}' is not an absolute http(s) URL")]
    InvalidBackendUrl(String),
    #[error("dropdown.page_size must be at least 1")]
    ZeroPageSize,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Files `load_default` looks at, first hit wins.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./jobfill.yaml")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".jobfill").join("config.yaml"));
        }
        paths
    }

    pub async fn load_default() -> Result<JobfillConfig, ConfigError> {
        match Self::search_paths().into_iter().find(|p| p.exists()) {
            Some(path) => Self::load_from(&path).await,
            None => {
                debug!("No config file found, using defaults");
                Ok(JobfillConfig::default())
            }
        }
    }

    /// Read and validate one file. An empty file means all defaults.
    pub async fn load_from(path: &Path) -> Result<JobfillConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let config = if content.trim().is_empty() {
            JobfillConfig::default()
        } else {
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        };

        Self::validate(&config)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject settings that would only fail later, mid-run.
    pub fn validate(config: &JobfillConfig) -> Result<(), ConfigError> {
        for pattern in &config.sites.patterns {
            Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }

        let base = &config.backend.base_url;
        match Url::parse(base) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(ConfigError::InvalidBackendUrl(base.clone())),
        }

        if config.dropdown.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        Ok(())
    }
}
