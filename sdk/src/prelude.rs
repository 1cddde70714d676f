//! Prelude module for common imports
//!
//! Everything comes from solana-sdk; the token, associated-token and metadata
//! crates are referenced by path where they are used.

pub use solana_sdk::{pubkey::Pubkey, signature::Signature};
