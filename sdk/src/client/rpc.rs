use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{commitment_config::CommitmentConfig, transaction::Transaction};
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::core::{BlockhashInfo, SdkError, SdkResult};
use crate::prelude::*;

/// Blockchain RPC collaborator
#[async_trait]
pub trait ChainRpc: Send + Sync {
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> SdkResult<u64>;

    async fn latest_blockhash(&self) -> SdkResult<BlockhashInfo>;

    /// Submit a fully signed transaction
    async fn send_transaction(&self, transaction: &Transaction) -> SdkResult<Signature>;

    /// Wait until `signature` lands or `blockhash` expires
    async fn confirm_transaction(
        &self,
        signature: &Signature,
        blockhash: &BlockhashInfo,
    ) -> SdkResult<()>;

    /// Raw account data, `None` when the account does not exist
    async fn account_data(&self, address: &Pubkey) -> SdkResult<Option<Vec<u8>>>;

    async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> SdkResult<Signature>;

    async fn balance(&self, address: &Pubkey) -> SdkResult<u64>;
}

/// [`ChainRpc`] over a Solana JSON-RPC endpoint
pub struct SolanaRpc {
    rpc: Arc<RpcClient>,
    commitment: CommitmentConfig,
    confirm_timeout: Duration,
    poll_interval: Duration,
}

impl SolanaRpc {
    pub fn new(rpc_url: &str, commitment: CommitmentConfig) -> Self {
        Self::with_client(
            Arc::new(RpcClient::new_with_commitment(rpc_url.to_string(), commitment)),
            commitment,
        )
    }

    pub fn with_client(rpc: Arc<RpcClient>, commitment: CommitmentConfig) -> Self {
        Self {
            rpc,
            commitment,
            confirm_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
        }
    }

    pub fn with_confirm_timeout(mut self, timeout: Duration) -> Self {
        self.confirm_timeout = timeout;
        self
    }

    /// Get the RPC client
    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    /// Get the RPC endpoint URL
    pub fn rpc_url(&self) -> String {
        self.rpc.url()
    }
}

#[async_trait]
impl ChainRpc for SolanaRpc {
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> SdkResult<u64> {
        Ok(self
            .rpc
            .get_minimum_balance_for_rent_exemption(data_len)
            .await?)
    }

    async fn latest_blockhash(&self) -> SdkResult<BlockhashInfo> {
        let (blockhash, last_valid_block_height) = self
            .rpc
            .get_latest_blockhash_with_commitment(self.commitment)
            .await?;
        Ok(BlockhashInfo {
            blockhash,
            last_valid_block_height,
        })
    }

    async fn send_transaction(&self, transaction: &Transaction) -> SdkResult<Signature> {
        self.rpc
            .send_transaction(transaction)
            .await
            .map_err(|e| SdkError::Broadcast {
                message: e.to_string(),
                signature: transaction.signatures.first().copied(),
            })
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
        blockhash: &BlockhashInfo,
    ) -> SdkResult<()> {
        let deadline = Instant::now() + self.confirm_timeout;
        let confirmation_error = |message: String| SdkError::Confirmation {
            message,
            signature: *signature,
        };

        loop {
            let status = self
                .rpc
                .get_signature_status_with_commitment(signature, self.commitment)
                .await
                .map_err(|e| confirmation_error(e.to_string()))?;

            match status {
                Some(Ok(())) => {
                    debug!(%signature, "Transaction confirmed");
                    return Ok(());
                }
                Some(Err(err)) => return Err(confirmation_error(err.to_string())),
                None => {}
            }

            let block_height = self
                .rpc
                .get_block_height_with_commitment(self.commitment)
                .await
                .map_err(|e| confirmation_error(e.to_string()))?;
            if block_height > blockhash.last_valid_block_height {
                return Err(confirmation_error(format!(
                    "blockhash expired at block height {}",
                    blockhash.last_valid_block_height
                )));
            }

            if Instant::now() >= deadline {
                warn!(%signature, "Gave up waiting for confirmation");
                return Err(confirmation_error(format!(
                    "not confirmed within {}s",
                    self.confirm_timeout.as_secs()
                )));
            }

            sleep(self.poll_interval).await;
        }
    }

    async fn account_data(&self, address: &Pubkey) -> SdkResult<Option<Vec<u8>>> {
        let response = self
            .rpc
            .get_account_with_commitment(address, self.commitment)
            .await?;
        Ok(response.value.map(|account| account.data))
    }

    async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> SdkResult<Signature> {
        Ok(self.rpc.request_airdrop(address, lamports).await?)
    }

    async fn balance(&self, address: &Pubkey) -> SdkResult<u64> {
        Ok(self.rpc.get_balance(address).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_and_timeout() {
        let rpc = SolanaRpc::new("http://localhost:8899", CommitmentConfig::confirmed())
            .with_confirm_timeout(Duration::from_secs(5));
        assert_eq!(rpc.rpc_url(), "http://localhost:8899");
        assert_eq!(rpc.confirm_timeout, Duration::from_secs(5));
        assert_eq!(rpc.rpc().commitment(), CommitmentConfig::confirmed());
    }
}
