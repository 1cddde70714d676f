//! Wallet utilities around token creation: airdrop, transfers, balance and
//! metadata lookup/update.
//!
//! Every operation reports its outcome through the [`NotificationCenter`] and
//! also returns it, so callers can either render toasts or inspect results.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use solana_sdk::{instruction::Instruction, message::Message, transaction::Transaction};
use tokio::sync::watch;
use tracing::{info, warn};

const METADATA_FETCH_TIMEOUT_SECS: u64 = 10;

use crate::{
    client::{ChainRpc, WalletAdapter},
    config::Network,
    core::{SdkError, SdkResult, TokenMetadataInfo, SOL_DECIMALS},
    instructions::{parse_metadata_account, sol_to_lamports, transfer_sol, update_metadata, MetadataChanges},
    math::from_base_units,
    notify::{Notice, NotificationCenter},
    prelude::*,
    protocol::PdaBuilder,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AirdropOutcome {
    pub signature: Signature,
    /// Wallet balance after the airdrop landed, in lamports
    pub balance: u64,
}

#[derive(Debug, Deserialize)]
struct OffChainDocument {
    #[serde(default)]
    image: Option<String>,
}

/// Wallet-facing operations sharing one RPC, wallet and notification sink
pub struct WalletTools {
    rpc: Arc<dyn ChainRpc>,
    wallet: Arc<dyn WalletAdapter>,
    notifications: Arc<NotificationCenter>,
    network: watch::Receiver<Network>,
    http: reqwest::Client,
    pda: PdaBuilder,
}

impl WalletTools {
    pub fn new(
        rpc: Arc<dyn ChainRpc>,
        wallet: Arc<dyn WalletAdapter>,
        notifications: Arc<NotificationCenter>,
        network: watch::Receiver<Network>,
    ) -> Self {
        Self {
            rpc,
            wallet,
            notifications,
            network,
            http: http_client(),
            pda: PdaBuilder::new(),
        }
    }

    /// Metadata addresses derived so far
    pub fn cached_addresses(&self) -> usize {
        self.pda.cached_entries()
    }

    pub fn network(&self) -> Network {
        *self.network.borrow()
    }

    fn connected(&self) -> SdkResult<Pubkey> {
        self.wallet
            .public_key()
            .ok_or_else(|| SdkError::Wallet("Wallet not connected!".to_string()))
    }

    fn report<T>(&self, result: SdkResult<T>, failure: &str) -> SdkResult<T> {
        if let Err(e) = &result {
            let mut notice = Notice::error(failure).with_description(e.to_string());
            if let Some(sig) = e.signature() {
                notice = notice.with_txid(sig);
            }
            self.notifications.notify(notice);
        }
        result
    }

    /// Request `lamports` for the connected wallet. Refused on mainnet.
    pub async fn airdrop(&self, lamports: u64) -> SdkResult<AirdropOutcome> {
        let result = self.airdrop_inner(lamports).await;
        if let Ok(outcome) = &result {
            self.notifications.notify(
                Notice::success(format!(
                    "Airdrop of {} SOL successful!",
                    from_base_units(lamports, SOL_DECIMALS)
                ))
                .with_txid(outcome.signature),
            );
        }
        self.report(result, "Airdrop failed!")
    }

    async fn airdrop_inner(&self, lamports: u64) -> SdkResult<AirdropOutcome> {
        let network = self.network();
        if !network.supports_airdrop() {
            return Err(SdkError::Validation(format!(
                "airdrops are not available on {}",
                network
            )));
        }
        let address = self.connected()?;
        let blockhash = self.rpc.latest_blockhash().await?;
        let signature = self.rpc.request_airdrop(&address, lamports).await?;
        self.rpc.confirm_transaction(&signature, &blockhash).await?;
        let balance = self.rpc.balance(&address).await?;
        info!(%address, %signature, lamports, balance, "Airdrop confirmed");
        Ok(AirdropOutcome { signature, balance })
    }

    /// Send a SOL amount typed by the user to `recipient`
    pub async fn send_sol(&self, recipient: &Pubkey, amount: &str) -> SdkResult<Signature> {
        let result = self.send_sol_inner(recipient, amount).await;
        if let Ok(signature) = &result {
            self.notifications.notify(
                Notice::success(format!("Successfully sent {} SOL", amount.trim()))
                    .with_txid(*signature),
            );
        }
        self.report(result, "Transaction Failed!")
    }

    async fn send_sol_inner(&self, recipient: &Pubkey, amount: &str) -> SdkResult<Signature> {
        let payer = self.connected()?;
        let lamports = sol_to_lamports(amount)?;
        let instruction = transfer_sol(&payer, recipient, lamports)?;
        let signature = self.sign_send_confirm(&payer, &[instruction]).await?;
        info!(from = %payer, to = %recipient, lamports, %signature, "SOL transfer confirmed");
        Ok(signature)
    }

    /// Support the project: transfer to the configured creator address
    pub async fn support_creator(
        &self,
        creator_address: Option<&str>,
        amount: &str,
    ) -> SdkResult<Signature> {
        let recipient = match creator_address.map(str::trim).filter(|a| !a.is_empty()) {
            Some(address) => Pubkey::from_str(address).map_err(|e| {
                SdkError::Config(format!("creator address {:?} is invalid: {}", address, e))
            }),
            None => Err(SdkError::Config(
                "Creator address not set in environment!".to_string(),
            )),
        };
        match recipient {
            Ok(recipient) => self.send_sol(&recipient, amount).await,
            Err(e) => self.report(Err(e), "Transaction Failed!"),
        }
    }

    /// Balance of the connected wallet in lamports
    pub async fn balance(&self) -> SdkResult<u64> {
        let address = self.connected()?;
        self.rpc.balance(&address).await
    }

    /// Look up on-chain metadata for `mint` plus the image from its document
    pub async fn fetch_token_metadata(&self, mint: &str) -> SdkResult<TokenMetadataInfo> {
        let result = self.fetch_token_metadata_inner(mint).await;
        if result.is_ok() {
            self.notifications
                .notify(Notice::success("Token Metadata Fetched Successfully!"));
        }
        self.report(result, "Failed to fetch metadata")
    }

    async fn fetch_token_metadata_inner(&self, mint: &str) -> SdkResult<TokenMetadataInfo> {
        let mint = parse_mint(mint)?;
        let (_, mut info) = self.load_metadata(&mint).await?;
        info.image = self.fetch_image(&info.uri).await;
        Ok(info)
    }

    async fn load_metadata(
        &self,
        mint: &Pubkey,
    ) -> SdkResult<(mpl_token_metadata::accounts::Metadata, TokenMetadataInfo)> {
        let (address, _) = self.pda.metadata(mint);
        let data = self
            .rpc
            .account_data(&address)
            .await?
            .ok_or_else(|| SdkError::AccountNotFound("Metadata account not found.".to_string()))?;
        parse_metadata_account(&address, mint, &data)
    }

    /// Image link of the off-chain document, `None` if it cannot be read
    async fn fetch_image(&self, uri: &str) -> Option<String> {
        if uri.is_empty() {
            return None;
        }
        let response = match self.http.get(uri).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(%uri, error = %e, "Could not fetch metadata document");
                return None;
            }
        };
        match response.json::<OffChainDocument>().await {
            Ok(document) => document.image.filter(|image| !image.is_empty()),
            Err(e) => {
                warn!(%uri, error = %e, "Metadata document is not valid JSON");
                None
            }
        }
    }

    /// Change name, symbol or uri of a mint the connected wallet controls
    pub async fn update_token_metadata(
        &self,
        mint: &str,
        changes: &MetadataChanges,
    ) -> SdkResult<Signature> {
        let result = self.update_token_metadata_inner(mint, changes).await;
        if let Ok(signature) = &result {
            self.notifications
                .notify(Notice::success("Token metadata updated").with_txid(*signature));
        }
        self.report(result, "Metadata update failed!")
    }

    async fn update_token_metadata_inner(
        &self,
        mint: &str,
        changes: &MetadataChanges,
    ) -> SdkResult<Signature> {
        let authority = self.connected()?;
        let mint = parse_mint(mint)?;
        let (current, loaded) = self.load_metadata(&mint).await?;
        let instruction = update_metadata(&authority, &loaded.metadata_account, &current, changes)?;
        let signature = self.sign_send_confirm(&authority, &[instruction]).await?;
        info!(%mint, %signature, "Metadata updated");
        Ok(signature)
    }

    async fn sign_send_confirm(
        &self,
        payer: &Pubkey,
        instructions: &[Instruction],
    ) -> SdkResult<Signature> {
        let blockhash = self.rpc.latest_blockhash().await?;
        let message = Message::new_with_blockhash(instructions, Some(payer), &blockhash.blockhash);
        let transaction = Transaction::new_unsigned(message);
        let signature = self
            .wallet
            .sign_and_send_transaction(transaction, self.rpc.as_ref())
            .await?;
        self.rpc.confirm_transaction(&signature, &blockhash).await?;
        Ok(signature)
    }
}

fn parse_mint(mint: &str) -> SdkResult<Pubkey> {
    let mint = mint.trim();
    if mint.is_empty() {
        return Err(SdkError::Validation("Please enter a token address.".to_string()));
    }
    Pubkey::from_str(mint)
        .map_err(|e| SdkError::Validation(format!("{:?} is not a valid address: {}", mint, e)))
}

/// Client for off-chain documents; a gateway that never answers must not stall a lookup
fn http_client() -> reqwest::Client {
    match reqwest::Client::builder()
        .timeout(Duration::from_secs(METADATA_FETCH_TIMEOUT_SECS))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "HTTP client setup failed, metadata fetches will run without a timeout");
            reqwest::Client::new()
        }
    }
}
