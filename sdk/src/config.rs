//! SDK configuration and the process-wide network selection

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::core::{
    SdkError, SdkResult, DEFAULT_MAX_FILE_BYTES, FORMS_ENDPOINT, LAMPORTS_PER_SOL,
    PINATA_API_URL, PINATA_GATEWAY_URL,
};
use crate::prelude::*;

/// Solana cluster the user works against
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    #[serde(rename = "mainnet-beta")]
    MainnetBeta,
    #[default]
    #[serde(rename = "devnet")]
    Devnet,
    #[serde(rename = "testnet")]
    Testnet,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::MainnetBeta, Network::Devnet, Network::Testnet];

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::MainnetBeta => "mainnet-beta",
            Network::Devnet => "devnet",
            Network::Testnet => "testnet",
        }
    }

    /// Public RPC endpoint of the cluster
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Network::Devnet => "https://api.devnet.solana.com",
            Network::Testnet => "https://api.testnet.solana.com",
        }
    }

    /// Faucet airdrops exist everywhere except mainnet
    pub fn supports_airdrop(&self) -> bool {
        !matches!(self, Network::MainnetBeta)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "mainnet-beta" | "mainnet" => Ok(Network::MainnetBeta),
            "devnet" => Ok(Network::Devnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(SdkError::Config(format!(
                "unknown network {:?}, expected mainnet-beta, devnet or testnet",
                other
            ))),
        }
    }
}

/// Pinning gateway credentials and limits
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinningConfig {
    pub api_key: String,
    pub secret_api_key: String,
    pub api_url: String,
    pub gateway_url: String,
    pub max_file_bytes: u64,
}

impl Default for PinningConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            secret_api_key: String::new(),
            api_url: PINATA_API_URL.to_string(),
            gateway_url: PINATA_GATEWAY_URL.to_string(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

impl PinningConfig {
    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.secret_api_key.is_empty()
    }
}

/// Contact form backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    pub endpoint: String,
    pub form_id: String,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            endpoint: FORMS_ENDPOINT.to_string(),
            form_id: String::new(),
        }
    }
}

/// SDK configuration loaded from TOML
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    /// Explicit RPC endpoint, otherwise the selected network's public one
    pub rpc_url: Option<String>,

    /// Transaction commitment level
    pub commitment: String,

    /// Upper bound on waiting for a confirmation, in seconds
    pub confirm_timeout_secs: u64,

    /// Recipient of the "send SOL" tool
    pub creator_address: Option<String>,

    /// Lamports requested per airdrop
    pub airdrop_lamports: u64,

    /// Where the selected network is persisted
    pub settings_path: Option<PathBuf>,

    pub pinning: PinningConfig,

    pub forms: FormsConfig,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            commitment: "confirmed".to_string(),
            confirm_timeout_secs: 60,
            creator_address: None,
            airdrop_lamports: LAMPORTS_PER_SOL,
            settings_path: None,
            pinning: PinningConfig::default(),
            forms: FormsConfig::default(),
        }
    }
}

impl SdkConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SdkError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let config: SdkConfig = toml::from_str(&content).map_err(|e| {
            SdkError::Config(format!("Failed to parse config file {}: {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> SdkResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| SdkError::Config(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content).map_err(|e| {
            SdkError::Config(format!("Failed to write config file {}: {}", path.display(), e))
        })?;
        Ok(())
    }

    pub fn validate(&self) -> SdkResult<()> {
        self.commitment_config()?;

        if self.confirm_timeout_secs == 0 {
            return Err(SdkError::Config(
                "confirm_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.airdrop_lamports == 0 {
            return Err(SdkError::Config(
                "airdrop_lamports must be greater than 0".to_string(),
            ));
        }

        if self.pinning.max_file_bytes == 0 {
            return Err(SdkError::Config(
                "pinning.max_file_bytes must be greater than 0".to_string(),
            ));
        }

        if let Some(address) = &self.creator_address {
            Pubkey::from_str(address).map_err(|e| {
                SdkError::Config(format!("creator_address {:?} is invalid: {}", address, e))
            })?;
        }

        Ok(())
    }

    pub fn commitment_config(&self) -> SdkResult<CommitmentConfig> {
        CommitmentConfig::from_str(&self.commitment).map_err(|_| {
            SdkError::Config(format!("unknown commitment level {:?}", self.commitment))
        })
    }

    /// RPC endpoint to use for `network`
    pub fn rpc_url_for(&self, network: Network) -> String {
        self.rpc_url
            .clone()
            .unwrap_or_else(|| network.default_rpc_url().to_string())
    }

    pub fn creator_pubkey(&self) -> SdkResult<Pubkey> {
        let address = self
            .creator_address
            .as_deref()
            .ok_or_else(|| SdkError::Config("creator_address is not set".to_string()))?;
        Pubkey::from_str(address)
            .map_err(|e| SdkError::Config(format!("creator_address {:?} is invalid: {}", address, e)))
    }

    /// Overlay `PINATA_API_KEY` / `PINATA_SECRET_API_KEY` when present
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("PINATA_API_KEY") {
            self.pinning.api_key = key;
        }
        if let Ok(secret) = std::env::var("PINATA_SECRET_API_KEY") {
            self.pinning.secret_api_key = secret;
        }
        self
    }

    pub fn with_rpc_url(mut self, url: String) -> Self {
        self.rpc_url = Some(url);
        self
    }

    pub fn with_creator_address(mut self, address: String) -> Self {
        self.creator_address = Some(address);
        self
    }

    pub fn with_settings_path(mut self, path: PathBuf) -> Self {
        self.settings_path = Some(path);
        self
    }

    /// Settings file location, `~/.config/tokenforge/settings.json` by default
    pub fn resolved_settings_path(&self) -> PathBuf {
        self.settings_path
            .clone()
            .unwrap_or_else(default_settings_path)
    }
}

pub fn default_settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
        .join(".config")
        .join("tokenforge")
        .join("settings.json")
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedSettings {
    #[serde(rename = "networkConfiguration", default)]
    network: Network,
}

/// Selected network, persisted to disk and observable.
///
/// One instance is installed per process with [`NetworkStore::init_global`];
/// tests and embedders may also own private instances.
pub struct NetworkStore {
    path: PathBuf,
    sender: watch::Sender<Network>,
}

static GLOBAL_NETWORK: OnceLock<NetworkStore> = OnceLock::new();

impl NetworkStore {
    /// Read the persisted selection, falling back to devnet
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let network = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<PersistedSettings>(&content) {
                Ok(settings) => settings.network,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring unreadable settings file");
                    Network::default()
                }
            },
            Err(_) => Network::default(),
        };
        debug!(%network, path = %path.display(), "Loaded network selection");
        let (sender, _) = watch::channel(network);
        Self { path, sender }
    }

    /// Install the process-wide store; later calls return the first instance
    pub fn init_global(path: impl Into<PathBuf>) -> &'static NetworkStore {
        let path = path.into();
        GLOBAL_NETWORK.get_or_init(|| NetworkStore::open(path))
    }

    pub fn global() -> Option<&'static NetworkStore> {
        GLOBAL_NETWORK.get()
    }

    pub fn get(&self) -> Network {
        *self.sender.borrow()
    }

    /// Persist and broadcast a new selection
    pub fn set(&self, network: Network) -> SdkResult<()> {
        let settings = PersistedSettings { network };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&settings)?)?;
        self.sender.send_replace(network);
        debug!(%network, "Network selection changed");
        Ok(())
    }

    pub fn subscribe(&self) -> watch::Receiver<Network> {
        self.sender.subscribe()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
