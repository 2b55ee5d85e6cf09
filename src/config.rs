//! Configuration management for keelchain

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub validator: ValidatorConfig,
}

#[derive(Debug, Deserialize)]
pub struct NetworkConfig {
    /// Address and port the REST API binds to.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Endpoint advertised to peers; derived from `bind` when unset.
    #[serde(default)]
    pub public_endpoint: Option<String>,
    #[serde(default)]
    pub seed_peers: Vec<String>,
    #[serde(default = "default_gossip_interval")]
    pub gossip_interval_secs: u64,
    #[serde(default = "default_discovery_interval")]
    pub discovery_interval_secs: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_peer_timeout")]
    pub peer_timeout_secs: u64,
    /// When set, fetched chains must pass linkage and signature checks
    /// before replacing the local chain.
    #[serde(default)]
    pub validate_imported_chains: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            public_endpoint: None,
            seed_peers: Vec::new(),
            gossip_interval_secs: default_gossip_interval(),
            discovery_interval_secs: default_discovery_interval(),
            poll_interval_secs: default_poll_interval(),
            peer_timeout_secs: default_peer_timeout(),
            validate_imported_chains: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ValidatorConfig {
    /// Key-pair file; defaults to `~/.keelchain/key.pem`.
    #[serde(default)]
    pub key_path: Option<PathBuf>,
}

/// Loads configuration from the given path, or sane defaults when the file
/// is absent.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = path.unwrap_or_else(|| Path::new("config.toml"));
    let config: Config = if path.exists() {
        toml::from_str(&fs::read_to_string(path)?)?
    } else {
        Config::default()
    };

    // Validate critical values
    if config.network.bind.is_empty() {
        return Err("network.bind must not be empty".into());
    }
    if config.network.poll_interval_secs == 0 {
        return Err("network.poll_interval_secs must be positive".into());
    }
    if config.network.peer_timeout_secs == 0 {
        return Err("network.peer_timeout_secs must be positive".into());
    }

    Ok(config)
}

fn default_bind() -> String {
    "127.0.0.1:8081".to_string()
}

fn default_gossip_interval() -> u64 {
    30
}

fn default_discovery_interval() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    2
}

fn default_peer_timeout() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_when_file_absent() {
        let config = load_config(Some(Path::new("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.network.bind, "127.0.0.1:8081");
        assert_eq!(config.network.poll_interval_secs, 2);
        assert!(!config.network.validate_imported_chains);
        assert!(config.network.seed_peers.is_empty());
    }

    #[test]
    fn test_parse_with_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[network]
bind = "0.0.0.0:9000"
seed_peers = ["http://seed:8081"]
validate_imported_chains = true
"#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.network.bind, "0.0.0.0:9000");
        assert_eq!(config.network.seed_peers, vec!["http://seed:8081"]);
        assert!(config.network.validate_imported_chains);
        // Untouched fields keep defaults
        assert_eq!(config.network.gossip_interval_secs, 30);
    }

    #[test]
    fn test_rejects_zero_poll_interval() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[network]\npoll_interval_secs = 0\n").unwrap();
        assert!(load_config(Some(file.path())).is_err());
    }
}
