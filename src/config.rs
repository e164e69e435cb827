use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `source.base_url`
pub const SOURCE_URL_ENV: &str = "DEXCACHE_SOURCE_URL";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub source: SourceConfig,
  #[serde(default)]
  pub database: DatabaseConfig,
  #[serde(default)]
  pub server: ServerConfig,
  #[serde(default)]
  pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
  /// Listing endpoint; detail urls come from the listing itself
  #[serde(default = "default_base_url")]
  pub base_url: String,
  /// Deadline for a single remote call
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for SourceConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

fn default_base_url() -> String {
  "https://pokeapi.co/api/v2/pokemon".to_string()
}

fn default_timeout_secs() -> u64 {
  30
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
  /// SQLite file (default: $XDG_DATA_HOME/dexcache/catalog.db)
  pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_bind")]
  pub bind: SocketAddr,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      bind: default_bind(),
    }
  }
}

fn default_bind() -> SocketAddr {
  SocketAddr::from(([0, 0, 0, 0], 8000))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
  /// Directory for daily rolling log files; console only when unset
  pub dir: Option<PathBuf>,
}

impl Config {
  /// Resolve, read and parse the configuration, then apply the environment.
  ///
  /// An explicit path must exist. Without one, the first of `candidate_paths`
  /// that exists is used, and defaults apply when none does.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let mut config = match Self::locate(explicit_path)? {
      Some(path) => {
        let contents = std::fs::read_to_string(&path)
          .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;
        Self::parse(&contents)
          .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?
      }
      None => Config::default(),
    };

    config.apply_source_override(std::env::var(SOURCE_URL_ENV).ok());
    Ok(config)
  }

  /// `./dexcache.yaml`, then `$XDG_CONFIG_HOME/dexcache/config.yaml`.
  fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("dexcache.yaml")];
    paths.extend(dirs::config_dir().map(|dir| dir.join("dexcache").join("config.yaml")));
    paths
  }

  fn locate(explicit_path: Option<&Path>) -> Result<Option<PathBuf>> {
    match explicit_path {
      Some(p) if p.exists() => Ok(Some(p.to_path_buf())),
      Some(p) => Err(eyre!("Config file not found: {}", p.display())),
      None => Ok(Self::candidate_paths().into_iter().find(|p| p.exists())),
    }
  }

  /// Empty or whitespace-only YAML yields the defaults.
  fn parse(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
    if contents.trim().is_empty() {
      return Ok(Config::default());
    }
    serde_yaml::from_str(contents)
  }

  /// Replace `source.base_url` with a non-blank override.
  fn apply_source_override(&mut self, url: Option<String>) {
    if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
      self.source.base_url = url;
    }
  }

  /// Database file, falling back to the platform data directory
  pub fn database_path(&self) -> Result<PathBuf> {
    match &self.database.path {
      Some(p) => Ok(p.clone()),
      None => crate::store::default_path(),
    }
  }
}
