// SOL transfers

use anyhow::{Context, Result};
use clap::Args;
use tokenforge_sdk::{core::SOL_DECIMALS, math::from_base_units};

use super::utils::{info, parse_pubkey, CliContext};

#[derive(Args)]
pub struct SendCmd {
    /// Amount in SOL
    #[arg(long)]
    amount: String,

    /// Recipient, defaults to the configured creator address
    #[arg(long)]
    to: Option<String>,
}

pub async fn execute(cmd: SendCmd, ctx: &CliContext) -> Result<()> {
    let tools = ctx.tools()?;
    match cmd.to {
        Some(to) => {
            let recipient = parse_pubkey(&to)?;
            tools
                .send_sol(&recipient, &cmd.amount)
                .await
                .context("Transfer failed")?;
        }
        None => {
            tools
                .support_creator(ctx.config.creator_address.as_deref(), &cmd.amount)
                .await
                .context("Transfer failed")?;
        }
    }

    let balance = tools.balance().await?;
    info(&format!(
        "Remaining balance: {} SOL",
        from_base_units(balance, SOL_DECIMALS)
    ));
    Ok(())
}
