pub mod rpc;
pub mod wallet;

pub use rpc::{ChainRpc, SolanaRpc};
pub use wallet::{load_keypair, KeypairWallet, WalletAdapter};
