use crate::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_DIRECTORY_HOST, DEFAULT_DIRECTORY_PORT,
    DEFAULT_MAX_PEER_CONNECTIONS, DEFAULT_PEER_BIND_ADDRESS,
};
use crate::core_network::PeerServerOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub directory_host: String,
    pub directory_port: u16,
    pub peer_bind_address: String,
    /// Files requested by peers are looked up under this directory.
    pub shared_dir: PathBuf,
    pub transfer_buffer_size: Option<usize>, // Optional to allow default value
    pub max_peer_connections: Option<usize>,
    /// Unset means connects may block indefinitely.
    pub connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            directory_host: String::from(DEFAULT_DIRECTORY_HOST),
            directory_port: DEFAULT_DIRECTORY_PORT,
            peer_bind_address: String::from(DEFAULT_PEER_BIND_ADDRESS),
            shared_dir: PathBuf::from("."),
            transfer_buffer_size: Some(DEFAULT_CHUNK_SIZE), // Default 4 KB
            max_peer_connections: Some(DEFAULT_MAX_PEER_CONNECTIONS),
            connect_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn chunk_size(&self) -> usize {
        self.transfer_buffer_size
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_CHUNK_SIZE)
    }

    pub fn max_connections(&self) -> usize {
        self.max_peer_connections
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_MAX_PEER_CONNECTIONS)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    pub fn peer_server_options(&self) -> PeerServerOptions {
        PeerServerOptions {
            bind_address: self.peer_bind_address.clone(),
            shared_dir: self.shared_dir.clone(),
            chunk_size: self.chunk_size(),
            max_connections: self.max_connections(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path))?;
        Ok(config)
    }
}
