// Wallet balance

use anyhow::Result;
use tokenforge_sdk::{core::SOL_DECIMALS, math::from_base_units};

use super::utils::{success, CliContext};

pub async fn execute(ctx: &CliContext) -> Result<()> {
    let lamports = ctx.tools()?.balance().await?;
    success(&format!(
        "{} SOL on {}",
        from_base_units(lamports, SOL_DECIMALS),
        ctx.network()
    ));
    Ok(())
}
