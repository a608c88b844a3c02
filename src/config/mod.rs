//! Persistent CLI configuration.
//!
//! Stored as JSON at `~/.config/solana/ingl/config.json` unless
//! `INGL_CONFIG_PATH` points elsewhere. Missing keys fall back to defaults.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;

use crate::constants::{
    CONFIG_DIR, CONFIG_FILE_NAME, CONFIG_PATH_ENV, DEFAULT_INGL_PROGRAM_ID,
    DEFAULT_KEYPAIR_FILE_NAME, DEFAULT_NETWORK, DEVNET_RPC_URL, MAINNET_RPC_URL, TESTNET_RPC_URL,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invalid public key for {field}: {value}")]
    InvalidPubkey { field: String, value: String },
    #[error("Invalid network: {0}, expected devnet, testnet, mainnet or an http(s) URL")]
    InvalidNetwork(String),
    #[error("Could not determine the home directory")]
    MissingHomeDir,
    #[error("Unknown config key: {0}, expected program_id, network or keypair_path")]
    UnknownKey(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ProgramId,
    Network,
    KeypairPath,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 3] = [
        ConfigKey::ProgramId,
        ConfigKey::Network,
        ConfigKey::KeypairPath,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::ProgramId => "program_id",
            ConfigKey::Network => "network",
            ConfigKey::KeypairPath => "keypair_path",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_lowercase().replace('-', "_");
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.name() == normalized)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

/// Values as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keypair_path: Option<String>,
}

/// Config directory, `~/.config/solana/ingl`.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    dirs_next::home_dir()
        .map(|home| home.join(CONFIG_DIR))
        .ok_or(ConfigError::MissingHomeDir)
}

/// Config file location, honoring `INGL_CONFIG_PATH`.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    match env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Ok(config_dir()?.join(CONFIG_FILE_NAME)),
    }
}

/// Keypair used when none is configured.
pub fn default_keypair_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(DEFAULT_KEYPAIR_FILE_NAME))
}

impl CliConfig {
    /// Loads the config file; a missing file yields the empty config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let config_str = fs::read_to_string(path)?;
        let config: CliConfig = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        match key {
            ConfigKey::ProgramId => self.program_id.as_deref(),
            ConfigKey::Network => self.network.as_deref(),
            ConfigKey::KeypairPath => self.keypair_path.as_deref(),
        }
    }

    /// Validates and stores `value` under `key`.
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<(), ConfigError> {
        match key {
            ConfigKey::ProgramId => {
                parse_pubkey(key.name(), value)?;
                self.program_id = Some(value.to_string());
            }
            ConfigKey::Network => {
                Network::from_str(value)?;
                self.network = Some(value.to_string());
            }
            ConfigKey::KeypairPath => self.keypair_path = Some(value.to_string()),
        }
        Ok(())
    }

    /// Applies per-invocation overrides and defaults.
    pub fn resolve(&self, overrides: &ConfigOverrides) -> Result<ResolvedConfig, ConfigError> {
        let program_id = match overrides.program_id.as_deref().or(self.program_id.as_deref()) {
            Some(value) => parse_pubkey(ConfigKey::ProgramId.name(), value)?,
            None => DEFAULT_INGL_PROGRAM_ID,
        };
        let network = Network::from_str(
            overrides
                .network
                .as_deref()
                .or(self.network.as_deref())
                .unwrap_or(DEFAULT_NETWORK),
        )?;
        let keypair_path = match overrides.keypair_path.as_deref().or(self.keypair_path.as_deref()) {
            Some(value) => value.to_string(),
            None => default_keypair_path()?.to_string_lossy().into_owned(),
        };

        Ok(ResolvedConfig {
            program_id,
            rpc_url: network.rpc_url().to_string(),
            explorer_suffix: network.explorer_suffix().to_string(),
            keypair_path,
        })
    }
}

fn parse_pubkey(field: &str, value: &str) -> Result<Pubkey, ConfigError> {
    Pubkey::from_str(value).map_err(|_| ConfigError::InvalidPubkey {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Values given on the command line for a single invocation.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub program_id: Option<String>,
    pub network: Option<String>,
    pub keypair_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Network {
    Devnet,
    Testnet,
    Mainnet,
    Custom(String),
}

impl Network {
    pub fn rpc_url(&self) -> &str {
        match self {
            Network::Devnet => DEVNET_RPC_URL,
            Network::Testnet => TESTNET_RPC_URL,
            Network::Mainnet => MAINNET_RPC_URL,
            Network::Custom(url) => url.as_str(),
        }
    }

    pub fn explorer_suffix(&self) -> &'static str {
        match self.rpc_url() {
            DEVNET_RPC_URL => "?cluster=devnet",
            TESTNET_RPC_URL => "?cluster=testnet",
            _ => "",
        }
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "devnet" => Ok(Network::Devnet),
            "testnet" => Ok(Network::Testnet),
            "mainnet" | "mainnet-beta" => Ok(Network::Mainnet),
            _ if s.starts_with("http://") || s.starts_with("https://") => {
                Ok(Network::Custom(s.to_string()))
            }
            _ => Err(ConfigError::InvalidNetwork(s.to_string())),
        }
    }
}

/// Effective settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub program_id: Pubkey,
    pub rpc_url: String,
    pub explorer_suffix: String,
    pub keypair_path: String,
}
