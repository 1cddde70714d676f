use std::collections::HashMap;
use std::sync::RwLock;

use crate::core::{associated_token_program_id, metadata_program_id, seeds, token_program_id};
use crate::prelude::*;

/// PDA cache to avoid recomputing addresses
pub struct PdaCache {
    cache: RwLock<HashMap<String, (Pubkey, u8)>>,
}

impl PdaCache {
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn get_or_compute<F>(&self, key: &str, compute: F) -> (Pubkey, u8)
    where
        F: FnOnce() -> (Pubkey, u8),
    {
        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
        {
            return *cached;
        }

        let result = compute();
        self.cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), result);
        result
    }

    pub fn len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PdaCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives the token-related addresses a mint needs
pub struct PdaBuilder {
    cache: PdaCache,
    pub token_program: Pubkey,
    pub metadata_program: Pubkey,
}

impl PdaBuilder {
    pub fn new() -> Self {
        Self {
            cache: PdaCache::new(),
            token_program: token_program_id(),
            metadata_program: metadata_program_id(),
        }
    }

    /// Metaplex metadata account of a mint
    pub fn metadata(&self, mint: &Pubkey) -> (Pubkey, u8) {
        let key = format!("metadata:{}", mint);
        self.cache.get_or_compute(&key, || {
            Pubkey::find_program_address(
                &[
                    seeds::METADATA,
                    self.metadata_program.as_ref(),
                    mint.as_ref(),
                ],
                &self.metadata_program,
            )
        })
    }

    /// Associated token account of `owner` for `mint`
    pub fn associated_token(&self, owner: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
        let key = format!("ata:{}:{}", owner, mint);
        self.cache.get_or_compute(&key, || {
            Pubkey::find_program_address(
                &[
                    owner.as_ref(),
                    self.token_program.as_ref(),
                    mint.as_ref(),
                ],
                &associated_token_program_id(),
            )
        })
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

impl Default for PdaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience functions for one-off derivations
pub fn find_metadata_address(mint: &Pubkey) -> Pubkey {
    PdaBuilder::new().metadata(mint).0
}

pub fn find_associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    PdaBuilder::new().associated_token(owner, mint).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_associated_token_matches_spl_derivation() {
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        assert_eq!(
            find_associated_token_address(&owner, &mint),
            spl_associated_token_account::get_associated_token_address(&owner, &mint)
        );
    }

    #[test]
    fn test_metadata_matches_metaplex_derivation() {
        let mint = Pubkey::new_unique();
        let (expected, _) = mpl_token_metadata::accounts::Metadata::find_pda(&mint);
        assert_eq!(find_metadata_address(&mint), expected);
    }

    #[test]
    fn test_cache_reuses_entries() {
        let pda = PdaBuilder::new();
        let mint = Pubkey::new_unique();
        let first = pda.metadata(&mint);
        let second = pda.metadata(&mint);
        assert_eq!(first, second);
        assert_eq!(pda.cached_entries(), 1);
    }
}
