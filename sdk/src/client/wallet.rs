use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use solana_sdk::{
    signature::{read_keypair_file, Keypair},
    signer::Signer,
    transaction::Transaction,
};
use tokio::sync::watch;
use tracing::{debug, info};

use super::ChainRpc;
use crate::core::{SdkError, SdkResult};
use crate::prelude::*;

/// Wallet collaborator: owns the user's key material and signs on request
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    /// Connected account, `None` while disconnected
    fn public_key(&self) -> Option<Pubkey>;

    /// Add the wallet signature and broadcast through `rpc`.
    ///
    /// `transaction` may already carry other partial signatures (a fresh mint
    /// keypair for instance); they are preserved.
    async fn sign_and_send_transaction(
        &self,
        transaction: Transaction,
        rpc: &dyn ChainRpc,
    ) -> SdkResult<Signature>;
}

/// Wallet backed by a local keypair that can be connected and disconnected
pub struct KeypairWallet {
    keypair: Mutex<Option<Arc<Keypair>>>,
    state: watch::Sender<Option<Pubkey>>,
}

impl KeypairWallet {
    pub fn disconnected() -> Self {
        let (state, _) = watch::channel(None);
        Self {
            keypair: Mutex::new(None),
            state,
        }
    }

    pub fn new(keypair: Keypair) -> Self {
        let wallet = Self::disconnected();
        wallet.connect(keypair);
        wallet
    }

    /// Load a keypair file, expanding a leading `~`
    pub fn from_file(path: &str) -> SdkResult<Self> {
        Ok(Self::new(load_keypair(path)?))
    }

    pub fn connect(&self, keypair: Keypair) {
        let pubkey = keypair.pubkey();
        *self.lock() = Some(Arc::new(keypair));
        self.state.send_replace(Some(pubkey));
        info!(wallet = %pubkey, "Wallet connected");
    }

    pub fn disconnect(&self) {
        *self.lock() = None;
        self.state.send_replace(None);
        info!("Wallet disconnected");
    }

    /// Connection state changes
    pub fn subscribe(&self) -> watch::Receiver<Option<Pubkey>> {
        self.state.subscribe()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Arc<Keypair>>> {
        self.keypair
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl WalletAdapter for KeypairWallet {
    fn public_key(&self) -> Option<Pubkey> {
        *self.state.borrow()
    }

    async fn sign_and_send_transaction(
        &self,
        mut transaction: Transaction,
        rpc: &dyn ChainRpc,
    ) -> SdkResult<Signature> {
        let keypair = self
            .lock()
            .clone()
            .ok_or_else(|| SdkError::Wallet("Wallet not connected!".to_string()))?;

        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[keypair.as_ref()], blockhash)
            .map_err(|e| SdkError::Wallet(format!("Signing rejected: {}", e)))?;

        if !transaction.is_signed() {
            return Err(SdkError::Wallet(
                "Transaction requires signatures the wallet cannot provide".to_string(),
            ));
        }

        debug!(wallet = %keypair.pubkey(), "Transaction signed");
        rpc.send_transaction(&transaction).await
    }
}

/// Load a keypair from a file path, expanding ~ if needed
pub fn load_keypair(path: &str) -> SdkResult<Keypair> {
    let expanded_path = if path.starts_with('~') {
        let home = std::env::var("HOME")
            .map_err(|_| SdkError::Wallet("HOME environment variable not set".to_string()))?;
        path.replacen('~', &home, 1)
    } else {
        path.to_string()
    };

    read_keypair_file(Path::new(&expanded_path)).map_err(|e| {
        SdkError::Wallet(format!("Failed to load keypair from {}: {}", expanded_path, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockChain;
    use solana_sdk::{hash::Hash, message::Message, system_instruction};

    fn transfer_from(payer: &Pubkey) -> Transaction {
        let ix = system_instruction::transfer(payer, &Pubkey::new_unique(), 1);
        Transaction::new_unsigned(Message::new_with_blockhash(
            &[ix],
            Some(payer),
            &Hash::new_unique(),
        ))
    }

    #[test]
    fn test_sign_and_send() {
        let keypair = Keypair::new();
        let tx = transfer_from(&keypair.pubkey());
        let wallet = KeypairWallet::new(keypair);
        let chain = MockChain::new();

        let signature =
            tokio_test::block_on(wallet.sign_and_send_transaction(tx, &chain)).unwrap();
        let sent = chain.sent_transactions();
        assert_eq!(sent[0].signatures[0], signature);
        assert!(sent[0].verify().is_ok());
    }

    #[test]
    fn test_disconnected_wallet_refuses_to_sign() {
        let keypair = Keypair::new();
        let tx = transfer_from(&keypair.pubkey());
        let wallet = KeypairWallet::new(keypair);
        wallet.disconnect();
        let chain = MockChain::new();

        let err = tokio_test::block_on(wallet.sign_and_send_transaction(tx, &chain)).unwrap_err();
        assert_eq!(err.to_string(), "Wallet error: Wallet not connected!");
        assert_eq!(chain.call_count(), 0);
    }

    #[test]
    fn test_foreign_payer_cannot_be_completed() {
        let tx = transfer_from(&Pubkey::new_unique());
        let wallet = KeypairWallet::new(Keypair::new());
        let chain = MockChain::new();

        let err = tokio_test::block_on(wallet.sign_and_send_transaction(tx, &chain)).unwrap_err();
        assert!(matches!(err, SdkError::Wallet(_)));
        assert!(chain.sent_transactions().is_empty());
    }

    #[test]
    fn test_connection_state_is_observable() {
        let wallet = KeypairWallet::disconnected();
        let mut rx = wallet.subscribe();
        assert_eq!(wallet.public_key(), None);

        let keypair = Keypair::new();
        let pubkey = keypair.pubkey();
        wallet.connect(keypair);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Some(pubkey));
        assert_eq!(wallet.public_key(), Some(pubkey));

        wallet.disconnect();
        assert_eq!(*rx.borrow_and_update(), None);
        assert_eq!(wallet.public_key(), None);
    }

    #[test]
    fn test_missing_keypair_file() {
        let err = load_keypair("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SdkError::Wallet(_)));
    }

    #[test]
    fn test_keypair_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("id.json");
        let keypair = Keypair::new();
        solana_sdk::signature::write_keypair_file(&keypair, &path).unwrap();

        let wallet = KeypairWallet::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(wallet.public_key(), Some(keypair.pubkey()));
    }
}
