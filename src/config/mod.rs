use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::Chain;

pub const DEFAULT_GAS_BUFFER: u64 = 100_000;
pub const DEFAULT_INTERVAL_SECS: u64 = 300;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub chain: Option<Chain>,
    pub batcher_contract: Option<String>,
    pub infura_key: Option<String>,
    /// Full node URL; takes precedence over the Infura key
    pub rpc_url: Option<String>,
    pub gas_buffer: Option<u64>,
    pub interval_secs: Option<u64>,
}

impl Config {
    pub fn gas_buffer(&self) -> u64 {
        self.gas_buffer.unwrap_or(DEFAULT_GAS_BUFFER)
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_INTERVAL_SECS)
    }
}

/// Load the config from `explicit` or the discovered path.
///
/// A missing file yields the defaults; an unparsable one is reported and ignored.
pub fn load(explicit: Option<&Path>) -> Config {
    let Some(path) = explicit.map(Path::to_path_buf).or_else(config_path) else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    match parse(&content) {
        Ok(config) => {
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), "ignoring unparsable config: {err}");
            Config::default()
        }
    }
}

pub fn parse(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(content)
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("TICKER_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("ticker").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("ticker").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "ticker", "ticker")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = parse(
            r#"
            chain = "sepolia"
            batcher_contract = "0x613d088F2e5a2ED91635016483dAFa3cd47a8964"
            infura_key = "abc"
            gas_buffer = 50000
            interval_secs = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.chain, Some(Chain::Sepolia));
        assert_eq!(config.infura_key.as_deref(), Some("abc"));
        assert_eq!(config.gas_buffer(), 50_000);
        assert_eq!(config.interval_secs(), 60);
        assert!(config.rpc_url.is_none());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse("").unwrap();
        assert!(config.chain.is_none());
        assert_eq!(config.gas_buffer(), DEFAULT_GAS_BUFFER);
        assert_eq!(config.interval_secs(), DEFAULT_INTERVAL_SECS);
    }

    #[test]
    fn test_zero_interval_falls_back() {
        let config = parse("interval_secs = 0").unwrap();
        assert_eq!(config.interval_secs(), DEFAULT_INTERVAL_SECS);
    }

    #[test]
    fn test_unknown_chain_rejected() {
        assert!(parse(r#"chain = "holesky""#).is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_default() {
        let config = load(Some(Path::new("/nonexistent/ticker/config.toml")));
        assert!(config.infura_key.is_none());
    }
}
