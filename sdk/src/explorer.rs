//! Block explorer links

use crate::{config::Network, core::EXPLORER_BASE_URL, prelude::*};

pub fn address_url(address: &Pubkey, network: Network) -> String {
    format!(
        "{}/address/{}?cluster={}",
        EXPLORER_BASE_URL, address, network
    )
}

pub fn tx_url(signature: &Signature, network: Network) -> String {
    format!("{}/tx/{}?cluster={}", EXPLORER_BASE_URL, signature, network)
}

/// `5VERv8NM...Kdw3JTeQ` style shortening used in toasts
pub fn truncate_signature(signature: &str) -> String {
    let chars: Vec<char> = signature.chars().collect();
    if chars.len() <= 16 {
        return signature.to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 8..].iter().collect();
    format!("{}...{}", head, tail)
}
