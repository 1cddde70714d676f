//! Create-token transaction: mint account, supply and metadata in one shot

use mpl_token_metadata::{
    instructions::{CreateMetadataAccountV3, CreateMetadataAccountV3InstructionArgs},
    types::DataV2,
};
use solana_program::program_pack::Pack;
use solana_sdk::{
    hash::Hash,
    instruction::Instruction,
    signature::Keypair,
    signer::Signer,
    system_instruction, system_program,
    transaction::Transaction,
};
use tracing::debug;

use crate::{
    client::ChainRpc,
    core::{check_display_lengths, SdkError, SdkResult, TokenDraft, MAX_URI_LENGTH},
    math::to_base_units,
    prelude::*,
    protocol::PdaBuilder,
};

/// Validated inputs for the create-token instructions
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateTokenParams {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub decimals: u8,
    /// Supply in base units (already scaled by `10^decimals`)
    pub base_units: u64,
}

impl CreateTokenParams {
    pub fn from_draft(draft: &TokenDraft, metadata_uri: &str) -> SdkResult<Self> {
        draft.validate_for_submission()?;
        let decimals = draft.parsed_decimals()?;
        let params = Self {
            name: draft.name.trim().to_string(),
            symbol: draft.symbol.trim().to_string(),
            uri: metadata_uri.trim().to_string(),
            decimals,
            base_units: to_base_units(&draft.amount, decimals)?,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> SdkResult<()> {
        check_metadata_fields(&self.name, &self.symbol, &self.uri)
    }
}

/// Metaplex rejects fields past these lengths; catch it before signing
pub fn check_metadata_fields(name: &str, symbol: &str, uri: &str) -> SdkResult<()> {
    check_display_lengths(name, symbol)?;
    if uri.is_empty() {
        return Err(SdkError::Build("metadata uri is empty".to_string()));
    }
    if uri.len() > MAX_URI_LENGTH {
        return Err(SdkError::Build(format!(
            "metadata uri is {} bytes, at most {} allowed",
            uri.len(),
            MAX_URI_LENGTH
        )));
    }
    Ok(())
}

/// Everything needed to sign and send a create-token transaction
pub struct PreparedMint {
    /// Fresh mint account key, must co-sign the transaction
    pub mint: Keypair,
    pub payer: Pubkey,
    pub associated_token_account: Pubkey,
    pub metadata_account: Pubkey,
    pub base_units: u64,
    pub instructions: Vec<Instruction>,
}

impl PreparedMint {
    pub fn mint_address(&self) -> Pubkey {
        self.mint.pubkey()
    }

    /// Transaction carrying the mint signature, still missing the payer's
    pub fn to_transaction(&self, recent_blockhash: Hash) -> SdkResult<Transaction> {
        let mut transaction = Transaction::new_with_payer(&self.instructions, Some(&self.payer));
        transaction
            .try_partial_sign(&[&self.mint], recent_blockhash)
            .map_err(|e| SdkError::Build(format!("Failed to sign with mint key: {}", e)))?;
        Ok(transaction)
    }
}

/// Builds the ordered create-token instruction list
pub struct TokenInstructionBuilder {
    pda: PdaBuilder,
}

impl TokenInstructionBuilder {
    pub fn new() -> Self {
        Self {
            pda: PdaBuilder::new(),
        }
    }

    /// Instructions in execution order:
    /// create mint account, initialize mint, create the payer's associated
    /// token account, mint the supply into it, create the metadata account.
    pub fn create_token(
        &self,
        payer: &Pubkey,
        mint: &Pubkey,
        mint_rent_lamports: u64,
        params: &CreateTokenParams,
    ) -> SdkResult<Vec<Instruction>> {
        params.validate()?;
        let token_program = self.pda.token_program;
        let (associated_token_account, _) = self.pda.associated_token(payer, mint);
        let (metadata_account, _) = self.pda.metadata(mint);

        let create_mint_account = system_instruction::create_account(
            payer,
            mint,
            mint_rent_lamports,
            spl_token::state::Mint::LEN as u64,
            &token_program,
        );

        let initialize_mint = spl_token::instruction::initialize_mint2(
            &token_program,
            mint,
            payer,
            Some(payer),
            params.decimals,
        )
        .map_err(|e| SdkError::Build(format!("initialize_mint2: {}", e)))?;

        let create_associated_account =
            spl_associated_token_account::instruction::create_associated_token_account(
                payer,
                payer,
                mint,
                &token_program,
            );

        let mint_supply = spl_token::instruction::mint_to(
            &token_program,
            mint,
            &associated_token_account,
            payer,
            &[],
            params.base_units,
        )
        .map_err(|e| SdkError::Build(format!("mint_to: {}", e)))?;

        let create_metadata = CreateMetadataAccountV3 {
            metadata: metadata_account,
            mint: *mint,
            mint_authority: *payer,
            payer: *payer,
            update_authority: (*payer, true),
            system_program: system_program::id(),
            rent: None,
        }
        .instruction(CreateMetadataAccountV3InstructionArgs {
            data: DataV2 {
                name: params.name.clone(),
                symbol: params.symbol.clone(),
                uri: params.uri.clone(),
                seller_fee_basis_points: 0,
                creators: None,
                collection: None,
                uses: None,
            },
            is_mutable: true,
            collection_details: None,
        });

        Ok(vec![
            create_mint_account,
            initialize_mint,
            create_associated_account,
            mint_supply,
            create_metadata,
        ])
    }

    pub fn associated_token(&self, owner: &Pubkey, mint: &Pubkey) -> Pubkey {
        self.pda.associated_token(owner, mint).0
    }

    pub fn metadata(&self, mint: &Pubkey) -> Pubkey {
        self.pda.metadata(mint).0
    }

    /// Derived addresses held by this builder's cache
    pub fn cached_addresses(&self) -> usize {
        self.pda.cached_entries()
    }

    /// Assemble the create-token instructions for `draft`, querying rent from `rpc`.
    ///
    /// Nothing is sent; any failure leaves no trace on chain.
    pub async fn prepare_create_token(
        &self,
        rpc: &dyn ChainRpc,
        draft: &TokenDraft,
        metadata_uri: &str,
        payer: &Pubkey,
    ) -> SdkResult<PreparedMint> {
        let params = CreateTokenParams::from_draft(draft, metadata_uri)?;

        let mint_rent_lamports = rpc
            .minimum_balance_for_rent_exemption(spl_token::state::Mint::LEN)
            .await
            .map_err(|e| SdkError::Build(format!("Failed to fetch mint rent: {}", e)))?;

        let mint = Keypair::new();
        let instructions = self.create_token(payer, &mint.pubkey(), mint_rent_lamports, &params)?;

        debug!(
            mint = %mint.pubkey(),
            decimals = params.decimals,
            base_units = params.base_units,
            "Prepared create-token instructions"
        );

        Ok(PreparedMint {
            associated_token_account: self.associated_token(payer, &mint.pubkey()),
            metadata_account: self.metadata(&mint.pubkey()),
            payer: *payer,
            base_units: params.base_units,
            instructions,
            mint,
        })
    }
}

impl Default for TokenInstructionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
