use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "unidex";
const CONFIG_FILE: &str = "config.json";
const RESOURCES_DIR: &str = "resources";

/// Environment variable overriding the resource directory
pub const RESOURCES_ENV: &str = "UNIDEX_RESOURCES";

/// Application configuration stored in the app data directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the generated resources; defaults to
    /// `<app data>/resources`
    #[serde(default)]
    pub resources_dir: Option<PathBuf>,

    /// Load chunks on the rayon pool when search needs all of them
    #[serde(default = "default_parallel_loading")]
    pub parallel_loading: bool,

    /// Entries in the daemon's search result cache
    #[serde(default = "default_query_cache_size")]
    pub query_cache_size: usize,
}

fn default_parallel_loading() -> bool {
    true
}

fn default_query_cache_size() -> usize {
    128
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            resources_dir: None,
            parallel_loading: default_parallel_loading(),
            query_cache_size: default_query_cache_size(),
        }
    }
}

impl AppConfig {
    /// Load config from the app data directory, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&get_config_path()?)
    }

    /// Load config from an explicit file, or return default if not found
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    /// Save config to the app data directory
    pub fn save(&self) -> Result<()> {
        let config_path = get_config_path()?;
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Resource directory: CLI flag, then `UNIDEX_RESOURCES`, then this
    /// config, then `<app data>/resources`
    pub fn resolve_resources_dir(&self, cli: Option<&Path>) -> Result<PathBuf> {
        let env = std::env::var_os(RESOURCES_ENV).map(PathBuf::from);
        self.resolve_resources_dir_with(cli, env)
    }

    fn resolve_resources_dir_with(&self, cli: Option<&Path>, env: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = cli {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = env.filter(|d| !d.as_os_str().is_empty()) {
            return Ok(dir);
        }
        if let Some(dir) = &self.resources_dir {
            return Ok(dir.clone());
        }
        Ok(get_app_data_dir()?.join(RESOURCES_DIR))
    }
}

/// Get the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    let app_dir = get_app_data_dir()?;
    Ok(app_dir.join(CONFIG_FILE))
}

/// Get the application data directory
pub fn get_app_data_dir() -> Result<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
        dirs::data_dir()
    };

    let base = base.context("Could not determine app data directory")?;
    let app_dir = base.join(APP_NAME);

    fs::create_dir_all(&app_dir)?;
    Ok(app_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert!(config.resources_dir.is_none());
        assert!(config.parallel_loading);
        assert_eq!(config.query_cache_size, 128);
    }

    #[test]
    fn test_app_config_partial_json() {
        // Should use defaults for missing fields
        let json = r#"{"parallel_loading": false}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert!(!config.parallel_loading);
        assert_eq!(config.query_cache_size, 128);
    }

    #[test]
    fn test_app_config_empty_json() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_from_missing_and_present() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        assert_eq!(AppConfig::load_from(&path).unwrap(), AppConfig::default());

        fs::write(&path, r#"{"resources_dir": "/srv/ucd", "query_cache_size": 4}"#).unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.resources_dir, Some(PathBuf::from("/srv/ucd")));
        assert_eq!(config.query_cache_size, 4);

        fs::write(&path, "{broken").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_resources_dir_precedence() {
        let config = AppConfig {
            resources_dir: Some(PathBuf::from("/from/config")),
            ..AppConfig::default()
        };
        let cli = Path::new("/from/cli");
        let env = Some(PathBuf::from("/from/env"));

        assert_eq!(
            config.resolve_resources_dir_with(Some(cli), env.clone()).unwrap(),
            PathBuf::from("/from/cli")
        );
        assert_eq!(
            config.resolve_resources_dir_with(None, env).unwrap(),
            PathBuf::from("/from/env")
        );
        assert_eq!(
            config.resolve_resources_dir_with(None, None).unwrap(),
            PathBuf::from("/from/config")
        );
    }
}
