// Devnet and testnet airdrops

use anyhow::{Context, Result};
use clap::Args;
use tokenforge_sdk::{core::SOL_DECIMALS, instructions::sol_to_lamports, math::from_base_units};

use super::utils::{info, CliContext};

#[derive(Args)]
pub struct AirdropCmd {
    /// Amount in SOL, defaults to the configured airdrop size
    #[arg(long)]
    sol: Option<String>,
}

pub async fn execute(cmd: AirdropCmd, ctx: &CliContext) -> Result<()> {
    let lamports = match cmd.sol {
        Some(sol) => sol_to_lamports(&sol)?,
        None => ctx.config.airdrop_lamports,
    };

    info(&format!(
        "Requesting {} SOL on {}...",
        from_base_units(lamports, SOL_DECIMALS),
        ctx.network()
    ));
    let outcome = ctx
        .tools()?
        .airdrop(lamports)
        .await
        .context("Airdrop failed")?;

    info(&format!(
        "Balance: {} SOL",
        from_base_units(outcome.balance, SOL_DECIMALS)
    ));
    Ok(())
}
