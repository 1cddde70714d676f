//! TokenForge SDK
//!
//! Create SPL tokens with Metaplex metadata without writing code:
//! - Image upload and metadata publishing through a pinning gateway
//! - One-transaction mint creation (account, supply, metadata)
//! - A three-step creation wizard with cooperative cancellation
//! - Wallet utilities: airdrop, SOL transfer, metadata lookup and update

pub mod client;
pub mod config;
pub mod core;
pub mod explorer;
pub mod forms;
pub mod instructions;
pub mod math;
pub mod notify;
pub mod pinning;
pub mod prelude;
pub mod protocol;
pub mod testing;
pub mod tools;
pub mod wizard;

pub use crate::core::{
    DraftField, ErrorKind, MetadataDocument, MintResult, SdkError, SdkResult, TokenDraft,
    TokenMetadataInfo, WizardStep,
};
pub use client::{ChainRpc, KeypairWallet, SolanaRpc, WalletAdapter};
pub use config::{Network, NetworkStore, SdkConfig};
pub use notify::{Notice, Notification, NotificationCenter, NotificationKind};
pub use pinning::{MediaUploader, MetadataPublisher, PinataClient, PinningService};
pub use tools::WalletTools;
pub use wizard::{ReviewSummary, WizardController};
