//! In-memory collaborators for exercising the SDK without a cluster or gateway
//!
//! Every call is recorded so tests can assert on ordering and on calls that
//! must never happen.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use solana_sdk::{hash::Hash, transaction::Transaction};

use crate::{
    client::ChainRpc,
    core::{BlockhashInfo, SdkError, SdkResult},
    pinning::PinningService,
    prelude::*,
};

/// Rent the mock reports for any account size
pub const MOCK_RENT_LAMPORTS: u64 = 1_461_600;

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Fake [`ChainRpc`]: sent transactions land instantly unless told otherwise
#[derive(Default)]
pub struct MockChain {
    calls: Mutex<Vec<&'static str>>,
    sent: Mutex<Vec<Transaction>>,
    accounts: Mutex<HashMap<Pubkey, Vec<u8>>>,
    balances: Mutex<HashMap<Pubkey, u64>>,
    failing: Mutex<HashSet<&'static str>>,
    send_delay: Mutex<Option<Duration>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the named method fail, e.g. `"send_transaction"`
    pub fn fail_on(&self, method: &'static str) {
        lock(&self.failing).insert(method);
    }

    pub fn set_send_delay(&self, delay: Duration) {
        *lock(&self.send_delay) = Some(delay);
    }

    pub fn set_account(&self, address: Pubkey, data: Vec<u8>) {
        lock(&self.accounts).insert(address, data);
    }

    pub fn set_balance(&self, address: Pubkey, lamports: u64) {
        lock(&self.balances).insert(address, lamports);
    }

    /// Method names in call order
    pub fn calls(&self) -> Vec<&'static str> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn sent_transactions(&self) -> Vec<Transaction> {
        lock(&self.sent).clone()
    }

    fn record(&self, method: &'static str) -> SdkResult<()> {
        lock(&self.calls).push(method);
        if lock(&self.failing).contains(method) {
            return Err(SdkError::Rpc(format!("{} unavailable", method)));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainRpc for MockChain {
    async fn minimum_balance_for_rent_exemption(&self, _data_len: usize) -> SdkResult<u64> {
        self.record("minimum_balance_for_rent_exemption")?;
        Ok(MOCK_RENT_LAMPORTS)
    }

    async fn latest_blockhash(&self) -> SdkResult<BlockhashInfo> {
        self.record("latest_blockhash")?;
        Ok(BlockhashInfo {
            blockhash: Hash::new_unique(),
            last_valid_block_height: 1_000,
        })
    }

    async fn send_transaction(&self, transaction: &Transaction) -> SdkResult<Signature> {
        let delay = *lock(&self.send_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let signature = transaction.signatures.first().copied();
        self.record("send_transaction")
            .map_err(|e| SdkError::Broadcast {
                message: e.to_string(),
                signature,
            })?;
        if !transaction.is_signed() {
            return Err(SdkError::Broadcast {
                message: "transaction is missing signatures".to_string(),
                signature,
            });
        }
        lock(&self.sent).push(transaction.clone());
        Ok(signature.unwrap_or_default())
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
        _blockhash: &BlockhashInfo,
    ) -> SdkResult<()> {
        self.record("confirm_transaction")
            .map_err(|e| SdkError::Confirmation {
                message: e.to_string(),
                signature: *signature,
            })
    }

    async fn account_data(&self, address: &Pubkey) -> SdkResult<Option<Vec<u8>>> {
        self.record("account_data")?;
        Ok(lock(&self.accounts).get(address).cloned())
    }

    async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> SdkResult<Signature> {
        self.record("request_airdrop")?;
        *lock(&self.balances).entry(*address).or_insert(0) += lamports;
        Ok(Signature::new_unique())
    }

    async fn balance(&self, address: &Pubkey) -> SdkResult<u64> {
        self.record("balance")?;
        Ok(lock(&self.balances).get(address).copied().unwrap_or(0))
    }
}

/// Fake [`PinningService`] handing out sequential gateway URLs
#[derive(Default)]
pub struct MockPinning {
    file_calls: AtomicUsize,
    json_calls: AtomicUsize,
    fail_files: Mutex<bool>,
    fail_json: Mutex<bool>,
    documents: Mutex<Vec<serde_json::Value>>,
    file_delay: Mutex<Option<Duration>>,
}

impl MockPinning {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_files(&self, fail: bool) {
        *lock(&self.fail_files) = fail;
    }

    /// Hold every file pin for `delay` before answering
    pub fn set_file_delay(&self, delay: Duration) {
        *lock(&self.file_delay) = Some(delay);
    }

    pub fn fail_json(&self, fail: bool) {
        *lock(&self.fail_json) = fail;
    }

    pub fn file_calls(&self) -> usize {
        self.file_calls.load(Ordering::SeqCst)
    }

    pub fn json_calls(&self) -> usize {
        self.json_calls.load(Ordering::SeqCst)
    }

    /// JSON documents pinned so far
    pub fn documents(&self) -> Vec<serde_json::Value> {
        lock(&self.documents).clone()
    }
}

#[async_trait]
impl PinningService for MockPinning {
    async fn pin_file(
        &self,
        file_name: &str,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> SdkResult<String> {
        let n = self.file_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let delay = *lock(&self.file_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *lock(&self.fail_files) {
            return Err(SdkError::Rpc("pinning service returned 413".to_string()));
        }
        Ok(format!("https://gateway.test/ipfs/file-{}-{}", n, file_name))
    }

    async fn pin_json(&self, document: &serde_json::Value) -> SdkResult<String> {
        let n = self.json_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if *lock(&self.fail_json) {
            return Err(SdkError::Rpc("pinning service returned 503".to_string()));
        }
        lock(&self.documents).push(document.clone());
        Ok(format!("https://gateway.test/ipfs/json-{}", n))
    }
}
