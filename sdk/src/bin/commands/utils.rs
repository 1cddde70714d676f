// Shared state and output helpers for CLI commands

use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use solana_sdk::pubkey::Pubkey;
use tokenforge_sdk::{
    KeypairWallet, Network, NetworkStore, NotificationCenter, NotificationKind, SdkConfig,
    SolanaRpc, WalletTools,
};
use tokio::sync::watch;

/// Everything a command needs, built once from the global flags
pub struct CliContext {
    pub config: SdkConfig,
    pub notifications: Arc<NotificationCenter>,
    store: &'static NetworkStore,
    network_override: Option<Network>,
    wallet_path: String,
}

impl CliContext {
    pub fn new(
        config: SdkConfig,
        store: &'static NetworkStore,
        network_override: Option<Network>,
        wallet_path: &str,
    ) -> Self {
        Self {
            config,
            notifications: Arc::new(NotificationCenter::new()),
            store,
            network_override,
            wallet_path: wallet_path.to_string(),
        }
    }

    pub fn store(&self) -> &'static NetworkStore {
        self.store
    }

    /// Network for this run: the --network flag, else the persisted selection
    pub fn network(&self) -> Network {
        self.network_override.unwrap_or_else(|| self.store.get())
    }

    fn network_receiver(&self) -> watch::Receiver<Network> {
        match self.network_override {
            Some(network) => watch::channel(network).1,
            None => self.store.subscribe(),
        }
    }

    pub fn rpc(&self) -> Result<Arc<SolanaRpc>> {
        let commitment = self.config.commitment_config()?;
        let url = self.config.rpc_url_for(self.network());
        Ok(Arc::new(
            SolanaRpc::new(&url, commitment)
                .with_confirm_timeout(Duration::from_secs(self.config.confirm_timeout_secs)),
        ))
    }

    /// Wallet from the keypair file; left disconnected if the file is unusable
    pub fn wallet(&self) -> Arc<KeypairWallet> {
        match KeypairWallet::from_file(&self.wallet_path) {
            Ok(wallet) => Arc::new(wallet),
            Err(e) => {
                warn(&e.to_string());
                Arc::new(KeypairWallet::disconnected())
            }
        }
    }

    pub fn tools(&self) -> Result<WalletTools> {
        Ok(WalletTools::new(
            self.rpc()?,
            self.wallet(),
            self.notifications.clone(),
            self.network_receiver(),
        ))
    }

    /// Print pending notifications in the order they were raised
    pub fn print_notifications(&self) {
        let network = self.network();
        for notification in self.notifications.active(Instant::now()).iter().rev() {
            match notification.kind {
                NotificationKind::Success => success(&notification.message),
                NotificationKind::Info => info(&notification.message),
                NotificationKind::Error => error(&notification.message),
            }
            if let Some(description) = &notification.description {
                println!("     {}", description);
            }
            if let (Some(link), Some(short)) = (
                notification.explorer_link(network),
                notification.short_txid(),
            ) {
                println!("     {} {}", short, link);
            }
        }
    }
}

/// Parse a pubkey from string
pub fn parse_pubkey(s: &str) -> Result<Pubkey> {
    Pubkey::from_str(s.trim()).context("Invalid public key")
}

/// Print success message with checkmark
pub fn success(msg: &str) {
    println!("[OK] {}", msg);
}

/// Print info message
pub fn info(msg: &str) {
    println!("[INFO] {}", msg);
}

/// Print warning message
pub fn warn(msg: &str) {
    eprintln!("[WARN] {}", msg);
}

/// Print error message
pub fn error(msg: &str) {
    eprintln!("[ERROR] {}", msg);
}
