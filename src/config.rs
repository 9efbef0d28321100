//! Configuration for armory.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (ARMORY_REPOSITORY_URL, ARMORY_REPOSITORY_ID,
//!    ARMORY_LOCAL_REPOSITORY)
//! 2. Config file (.armory/config.yaml)
//! 3. Defaults (~/.armory/repository for the local cache; no remote
//!    repository unless one is configured)
//!
//! Config file discovery:
//! - Searches current directory and parents for .armory/config.yaml
//! - Paths in the config file are relative to the config file's parent
//!   directory
//!
//! The settings resolved here are wiring material for callers constructing
//! the real repository handles; the operations themselves only ever see the
//! handles.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<std::result::Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub repository: Option<RepositoryConfig>,
    #[serde(default)]
    pub local: Option<LocalConfig>,
}

/// Remote repository section of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositoryConfig {
    pub id: Option<String>,
    pub url: Option<String>,
    pub unique_versions: Option<bool>,
}

/// Local repository section of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalConfig {
    /// Local repository cache directory (relative to the config file)
    pub repository: Option<String>,
}

/// Remote repository settings for redeployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySettings {
    pub id: String,
    pub url: String,
    pub unique_versions: bool,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Remote repository to redeploy to, when one is configured
    pub repository: Option<RepositorySettings>,
    /// Absolute path of the local repository cache
    pub local_repository: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".armory").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Resolve repository settings from file section + environment overrides
fn resolve_repository(file_section: Option<&RepositoryConfig>) -> Option<RepositorySettings> {
    let env_url = std::env::var("ARMORY_REPOSITORY_URL").ok();
    let file_url = file_section.and_then(|r| r.url.clone());
    let url = env_url.or(file_url)?;

    let id = std::env::var("ARMORY_REPOSITORY_ID")
        .ok()
        .or_else(|| file_section.and_then(|r| r.id.clone()))
        .unwrap_or_else(|| "remote".to_string());

    let unique_versions = file_section
        .and_then(|r| r.unique_versions)
        .unwrap_or(true);

    Some(RepositorySettings {
        id,
        url,
        unique_versions,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_local = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".armory")
        .join("repository");

    let config_file = find_config_file();

    let (repository, local_repository) = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;

        // Base directory is the parent of .armory/
        let base_dir = config_path
            .parent()
            .and_then(|p| p.parent())
            .unwrap_or(Path::new("."));

        let repository = resolve_repository(config.repository.as_ref());

        let local_repository = if let Ok(env_local) = std::env::var("ARMORY_LOCAL_REPOSITORY") {
            PathBuf::from(env_local)
        } else if let Some(local_path) = config.local.as_ref().and_then(|l| l.repository.as_ref())
        {
            resolve_path(base_dir, local_path)
        } else {
            default_local
        };

        (repository, local_repository)
    } else {
        let repository = resolve_repository(None);
        let local_repository = std::env::var("ARMORY_LOCAL_REPOSITORY")
            .map(PathBuf::from)
            .unwrap_or(default_local);

        (repository, local_repository)
    };

    Ok(ResolvedConfig {
        repository,
        local_repository,
        config_file,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
