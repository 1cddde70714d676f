use crate::prelude::*;
use serde::{Deserialize, Serialize};
use solana_sdk::{hash::Hash, signature::Signature};

use super::{SdkError, SdkResult, DEFAULT_DECIMALS, MAX_NAME_LENGTH, MAX_SYMBOL_LENGTH};

/// Editable fields of a [`TokenDraft`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DraftField {
    Name,
    Symbol,
    Decimals,
    Amount,
    Image,
    Description,
}

/// Token parameters collected by the wizard.
///
/// Numeric fields are kept as entered so that a half-typed value survives
/// until the step guard rejects it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenDraft {
    pub name: String,
    pub symbol: String,
    pub decimals: String,
    /// Supply in whole-token units
    pub amount: String,
    /// Gateway URL of the uploaded image, empty until an upload succeeds
    pub image: String,
    pub description: String,
}

impl Default for TokenDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            symbol: String::new(),
            decimals: DEFAULT_DECIMALS.to_string(),
            amount: String::new(),
            image: String::new(),
            description: String::new(),
        }
    }
}

impl TokenDraft {
    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DraftField::Name => self.name = value,
            DraftField::Symbol => self.symbol = value,
            DraftField::Decimals => self.decimals = value,
            DraftField::Amount => self.amount = value,
            DraftField::Image => self.image = value,
            DraftField::Description => self.description = value,
        }
    }

    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Name => &self.name,
            DraftField::Symbol => &self.symbol,
            DraftField::Decimals => &self.decimals,
            DraftField::Amount => &self.amount,
            DraftField::Image => &self.image,
            DraftField::Description => &self.description,
        }
    }

    pub fn parsed_decimals(&self) -> SdkResult<u8> {
        let raw = self.decimals.trim();
        if raw.is_empty() {
            return Err(SdkError::Validation("decimals is required".to_string()));
        }
        raw.parse::<u8>().map_err(|_| {
            SdkError::Validation(format!("decimals must be an integer in 0..=255, got {:?}", raw))
        })
    }

    /// Guard for leaving the details step
    pub fn validate_details(&self) -> SdkResult<()> {
        require_non_empty(&[
            (DraftField::Name, &self.name),
            (DraftField::Symbol, &self.symbol),
            (DraftField::Description, &self.description),
        ])?;
        check_display_lengths(self.name.trim(), self.symbol.trim())
    }

    /// Guard for leaving the supply and media step
    pub fn validate_supply_media(&self) -> SdkResult<()> {
        require_non_empty(&[
            (DraftField::Image, &self.image),
            (DraftField::Decimals, &self.decimals),
            (DraftField::Amount, &self.amount),
        ])?;
        self.parsed_decimals()?;
        if !is_non_negative_decimal(self.amount.trim()) {
            return Err(SdkError::Validation(format!(
                "amount must be a non-negative number, got {:?}",
                self.amount
            )));
        }
        Ok(())
    }

    pub fn validate_for_submission(&self) -> SdkResult<()> {
        self.validate_details()?;
        self.validate_supply_media()
    }

    /// Snapshot of the display fields, fails if any of them is empty
    pub fn metadata_document(&self) -> SdkResult<MetadataDocument> {
        require_non_empty(&[
            (DraftField::Name, &self.name),
            (DraftField::Symbol, &self.symbol),
            (DraftField::Description, &self.description),
            (DraftField::Image, &self.image),
        ])?;
        Ok(MetadataDocument {
            name: self.name.trim().to_string(),
            symbol: self.symbol.trim().to_string(),
            description: self.description.trim().to_string(),
            image: self.image.trim().to_string(),
        })
    }
}

/// Metaplex stores name and symbol in fixed-size fields, measured in bytes
pub fn check_display_lengths(name: &str, symbol: &str) -> SdkResult<()> {
    if name.len() > MAX_NAME_LENGTH {
        return Err(SdkError::Validation(format!(
            "name is {} bytes, at most {} allowed",
            name.len(),
            MAX_NAME_LENGTH
        )));
    }
    if symbol.len() > MAX_SYMBOL_LENGTH {
        return Err(SdkError::Validation(format!(
            "symbol is {} bytes, at most {} allowed",
            symbol.len(),
            MAX_SYMBOL_LENGTH
        )));
    }
    Ok(())
}

fn require_non_empty(fields: &[(DraftField, &String)]) -> SdkResult<()> {
    let missing: Vec<String> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| format!("{:?}", field).to_lowercase())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SdkError::Validation(format!("missing {}", missing.join(", "))))
    }
}

/// `123`, `0.5`, `10.` are accepted; signs, exponents and empty input are not
pub fn is_non_negative_decimal(raw: &str) -> bool {
    let (whole, frac) = match raw.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (raw, ""),
    };
    !(whole.is_empty() && frac.is_empty())
        && whole.chars().all(|c| c.is_ascii_digit())
        && frac.chars().all(|c| c.is_ascii_digit())
}

/// Off-chain JSON document the metadata URI points to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDocument {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image: String,
}

/// Outcome of a confirmed token creation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintResult {
    pub mint_address: Pubkey,
    pub transaction_signature: Signature,
    pub associated_token_account: Pubkey,
    pub metadata_account: Pubkey,
    pub metadata_uri: String,
    /// Supply actually minted, in base units
    pub base_units: u64,
}

/// Wizard position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WizardStep {
    Details,
    SupplyMedia,
    Review,
    Completed,
}

impl WizardStep {
    /// 1-based index shown in the step header, `None` once completed
    pub fn number(&self) -> Option<u8> {
        match self {
            WizardStep::Details => Some(1),
            WizardStep::SupplyMedia => Some(2),
            WizardStep::Review => Some(3),
            WizardStep::Completed => None,
        }
    }
}

/// Blockhash plus the last block height at which it is still valid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockhashInfo {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

/// On-chain and off-chain metadata of an existing mint
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenMetadataInfo {
    pub mint: Pubkey,
    pub metadata_account: Pubkey,
    pub update_authority: Pubkey,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub is_mutable: bool,
    /// Image link from the off-chain document, when it could be fetched
    pub image: Option<String>,
}
