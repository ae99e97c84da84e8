use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Public CoinGecko API root
pub const DEFAULT_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "COINGECKO_API_URL";

/// Environment variable holding the optional API key
pub const API_KEY_ENV: &str = "COINGECKO_API_KEY";

#[derive(Debug, Clone)]
pub struct Config {
  pub api: ApiConfig,
  /// Quote currency for prices, market caps and volumes
  pub vs_currency: String,
  /// Custom title for header (defaults to "coin9s" if not set)
  pub title: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub url: String,
  pub api_key: Option<String>,
}

/// On-disk config. Every field is optional; the file itself is too.
#[derive(Debug, Clone, Default, Deserialize)]
struct FileConfig {
  vs_currency: Option<String>,
  title: Option<String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      api: ApiConfig {
        url: DEFAULT_API_URL.to_string(),
        api_key: None,
      },
      vs_currency: "usd".to_string(),
      title: None,
    }
  }
}

impl Config {
  /// Load configuration from an optional file, then apply environment overrides.
  ///
  /// Search order for the file:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./coin9s.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/coin9s/config.yaml
  ///
  /// No file at all is fine: defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let file = match path {
      Some(p) => Self::read_file(&p)?,
      None => FileConfig::default(),
    };

    Ok(Self::from_file(file).with_env(|name| std::env::var(name).ok()))
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("coin9s.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("coin9s").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn read_file(path: &Path) -> Result<FileConfig> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<FileConfig> {
    if contents.trim().is_empty() {
      return Ok(FileConfig::default());
    }
    Ok(serde_yaml::from_str(contents)?)
  }

  fn from_file(file: FileConfig) -> Self {
    let defaults = Self::default();
    Self {
      vs_currency: file
        .vs_currency
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .unwrap_or(defaults.vs_currency),
      title: file.title,
      ..defaults
    }
  }

  /// Apply `COINGECKO_API_URL` and `COINGECKO_API_KEY`.
  ///
  /// Empty values count as unset.
  fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty(API_URL_ENV) {
      self.api.url = url.trim().trim_end_matches('/').to_string();
    }
    self.api.api_key = non_empty(API_KEY_ENV);
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    move |name| map.get(name).cloned()
  }

  #[test]
  fn test_defaults() {
    let config = Config::from_file(FileConfig::default()).with_env(env(&[]));
    assert_eq!(config.api.url, DEFAULT_API_URL);
    assert_eq!(config.api.api_key, None);
    assert_eq!(config.vs_currency, "usd");
  }

  #[test]
  fn test_env_overrides() {
    let config = Config::default().with_env(env(&[
      (API_URL_ENV, "https://pro-api.coingecko.com/api/v3/"),
      (API_KEY_ENV, "secret"),
    ]));
    assert_eq!(config.api.url, "https://pro-api.coingecko.com/api/v3");
    assert_eq!(config.api.api_key.as_deref(), Some("secret"));
  }

  #[test]
  fn test_empty_env_values_are_ignored() {
    let config = Config::default().with_env(env(&[(API_URL_ENV, ""), (API_KEY_ENV, "  ")]));
    assert_eq!(config.api.url, DEFAULT_API_URL);
    assert_eq!(config.api.api_key, None);
  }

  #[test]
  fn test_parse_file() {
    let file = Config::parse("vs_currency: EUR\ntitle: My Coins\n").unwrap();
    let config = Config::from_file(file);
    assert_eq!(config.vs_currency, "eur");
    assert_eq!(config.title.as_deref(), Some("My Coins"));
  }

  #[test]
  fn test_parse_empty_file() {
    let file = Config::parse("").unwrap();
    assert!(file.vs_currency.is_none());
  }
}
