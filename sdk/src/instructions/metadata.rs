use mpl_token_metadata::{
    accounts::Metadata,
    instructions::{UpdateMetadataAccountV2, UpdateMetadataAccountV2InstructionArgs},
    types::DataV2,
};
use solana_sdk::instruction::Instruction;

use crate::{
    core::{SdkError, SdkResult, TokenMetadataInfo},
    instructions::check_metadata_fields,
    prelude::*,
};

/// Fields to change on an existing metadata account; `None` keeps the value
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetadataChanges {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub uri: Option<String>,
}

impl MetadataChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.symbol.is_none() && self.uri.is_none()
    }
}

/// Metaplex pads fixed-size strings with NUL bytes
pub fn trim_padding(value: &str) -> String {
    value.trim_end_matches('\0').trim().to_string()
}

/// Deserialize the metadata account at `metadata_account` fetched from chain
pub fn parse_metadata_account(
    metadata_account: &Pubkey,
    mint: &Pubkey,
    data: &[u8],
) -> SdkResult<(Metadata, TokenMetadataInfo)> {
    let metadata = Metadata::from_bytes(data)
        .map_err(|e| SdkError::Serialization(format!("Invalid metadata account: {}", e)))?;
    if metadata.mint != *mint {
        return Err(SdkError::Serialization(format!(
            "metadata account belongs to mint {}, expected {}",
            metadata.mint, mint
        )));
    }
    let info = TokenMetadataInfo {
        mint: *mint,
        metadata_account: *metadata_account,
        update_authority: metadata.update_authority,
        name: trim_padding(&metadata.name),
        symbol: trim_padding(&metadata.symbol),
        uri: trim_padding(&metadata.uri),
        is_mutable: metadata.is_mutable,
        image: None,
    };
    Ok((metadata, info))
}

/// Rewrite name, symbol or uri of `current`, keeping royalties and creators
pub fn update_metadata(
    update_authority: &Pubkey,
    metadata_account: &Pubkey,
    current: &Metadata,
    changes: &MetadataChanges,
) -> SdkResult<Instruction> {
    if changes.is_empty() {
        return Err(SdkError::Validation("nothing to update".to_string()));
    }
    if !current.is_mutable {
        return Err(SdkError::Build("metadata account is immutable".to_string()));
    }
    if current.update_authority != *update_authority {
        return Err(SdkError::Wallet(format!(
            "connected wallet is not the update authority ({})",
            current.update_authority
        )));
    }

    let name = changes
        .name
        .clone()
        .unwrap_or_else(|| trim_padding(&current.name));
    let symbol = changes
        .symbol
        .clone()
        .unwrap_or_else(|| trim_padding(&current.symbol));
    let uri = changes
        .uri
        .clone()
        .unwrap_or_else(|| trim_padding(&current.uri));
    check_metadata_fields(&name, &symbol, &uri)?;

    Ok(UpdateMetadataAccountV2 {
        metadata: *metadata_account,
        update_authority: *update_authority,
    }
    .instruction(UpdateMetadataAccountV2InstructionArgs {
        data: Some(DataV2 {
            name,
            symbol,
            uri,
            seller_fee_basis_points: current.seller_fee_basis_points,
            creators: current.creators.clone(),
            collection: current.collection.clone(),
            uses: current.uses.clone(),
        }),
        new_update_authority: None,
        primary_sale_happened: None,
        is_mutable: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::find_metadata_address;
    use mpl_token_metadata::types::Key;

    pub(crate) fn sample_metadata(mint: Pubkey, authority: Pubkey) -> Metadata {
        Metadata {
            key: Key::MetadataV1,
            update_authority: authority,
            mint,
            name: format!("{:\0<32}", "Test"),
            symbol: format!("{:\0<10}", "TST"),
            uri: format!("{:\0<200}", "https://gw/ipfs/meta"),
            seller_fee_basis_points: 0,
            creators: None,
            primary_sale_happened: false,
            is_mutable: true,
            edition_nonce: None,
            token_standard: None,
            collection: None,
            uses: None,
            collection_details: None,
            programmable_config: None,
        }
    }

    #[test]
    fn test_trim_padding() {
        assert_eq!(trim_padding("Test\0\0\0"), "Test");
        assert_eq!(trim_padding("plain"), "plain");
    }

    #[test]
    fn test_update_keeps_unchanged_fields() {
        let mint = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let current = sample_metadata(mint, authority);
        let ix = update_metadata(
            &authority,
            &find_metadata_address(&mint),
            &current,
            &MetadataChanges {
                name: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(ix.program_id, mpl_token_metadata::ID);
        assert_eq!(ix.accounts[0].pubkey, find_metadata_address(&mint));
        assert_eq!(ix.accounts[1].pubkey, authority);
        assert!(ix.accounts[1].is_signer);
    }

    #[test]
    fn test_update_requires_authority() {
        let mint = Pubkey::new_unique();
        let current = sample_metadata(mint, Pubkey::new_unique());
        let changes = MetadataChanges {
            symbol: Some("NEW".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            update_metadata(
                &Pubkey::new_unique(),
                &find_metadata_address(&mint),
                &current,
                &changes
            ),
            Err(SdkError::Wallet(_))
        ));
    }

    #[test]
    fn test_update_rejects_empty_and_immutable() {
        let mint = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let mut current = sample_metadata(mint, authority);
        let address = find_metadata_address(&mint);
        assert!(update_metadata(&authority, &address, &current, &MetadataChanges::default()).is_err());

        current.is_mutable = false;
        let changes = MetadataChanges {
            uri: Some("https://gw/ipfs/other".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            update_metadata(&authority, &address, &current, &changes),
            Err(SdkError::Build(_))
        ));
    }
}
