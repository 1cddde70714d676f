use solana_sdk::{instruction::Instruction, system_instruction};

use crate::{
    core::{SdkError, SdkResult, SOL_DECIMALS},
    math::to_base_units,
    prelude::*,
};

/// Parse a SOL amount typed by the user into lamports, rejecting zero
pub fn sol_to_lamports(amount: &str) -> SdkResult<u64> {
    let lamports = to_base_units(amount, SOL_DECIMALS)
        .map_err(|_| SdkError::Validation("Please enter a valid amount.".to_string()))?;
    if lamports == 0 {
        return Err(SdkError::Validation("Please enter a valid amount.".to_string()));
    }
    Ok(lamports)
}

/// Plain SOL transfer
pub fn transfer_sol(from: &Pubkey, to: &Pubkey, lamports: u64) -> SdkResult<Instruction> {
    if from == to {
        return Err(SdkError::Validation(
            "sender and recipient are the same account".to_string(),
        ));
    }
    Ok(system_instruction::transfer(from, to, lamports))
}
