// Token creation through the wizard

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokenforge_sdk::{
    explorer, math::from_base_units, DraftField, PinataClient, WizardController,
};

use super::utils::{info, success, CliContext};

#[derive(Args)]
pub struct CreateCmd {
    /// Token name (at most 32 bytes)
    #[arg(long)]
    name: String,

    /// Ticker symbol (at most 10 bytes)
    #[arg(long)]
    symbol: String,

    #[arg(long)]
    description: String,

    /// Local png, jpg or gif to upload as the token logo
    #[arg(long, conflicts_with = "image_url", required_unless_present = "image_url")]
    image: Option<PathBuf>,

    /// Already hosted logo URL
    #[arg(long)]
    image_url: Option<String>,

    #[arg(long, default_value = "9")]
    decimals: String,

    /// Initial supply in whole tokens
    #[arg(long)]
    amount: String,
}

pub async fn execute(cmd: CreateCmd, ctx: &CliContext) -> Result<()> {
    let pinning = Arc::new(PinataClient::new(ctx.config.pinning.clone()));
    let wizard = WizardController::new(
        ctx.rpc()?,
        ctx.wallet(),
        pinning,
        ctx.notifications.clone(),
    )
    .with_max_file_bytes(ctx.config.pinning.max_file_bytes);

    info("Step 1/3: token details");
    wizard.set_field(DraftField::Name, cmd.name)?;
    wizard.set_field(DraftField::Symbol, cmd.symbol)?;
    wizard.set_field(DraftField::Description, cmd.description)?;
    wizard.next().context("Token details are incomplete")?;

    info("Step 2/3: supply and media");
    match (cmd.image, cmd.image_url) {
        (Some(path), _) => {
            info(&format!("Uploading {}...", path.display()));
            let url = wizard.upload_image_path(&path).await?;
            success(&format!("Image uploaded: {}", url));
        }
        (None, Some(url)) => wizard.set_field(DraftField::Image, url)?,
        (None, None) => {}
    }
    wizard.set_field(DraftField::Decimals, cmd.decimals)?;
    wizard.set_field(DraftField::Amount, cmd.amount)?;
    wizard.next().context("Supply or image is missing")?;

    info("Step 3/3: review");
    let summary = wizard.review()?;
    info(&format!("Name:        {}", summary.name));
    info(&format!("Symbol:      {}", summary.symbol));
    info(&format!("Description: {}", summary.description));
    info(&format!("Image:       {}", summary.image));
    info(&format!("Decimals:    {}", summary.decimals));
    info(&format!(
        "Supply:      {} ({} base units)",
        from_base_units(summary.base_units, summary.decimals),
        summary.base_units
    ));

    info(&format!("Creating token on {}...", ctx.network()));
    let result = wizard.submit().await.context("Token creation failed")?;

    success(&format!("Mint address: {}", result.mint_address));
    info(&format!("Token account: {}", result.associated_token_account));
    info(&format!("Metadata account: {}", result.metadata_account));
    info(&format!("Metadata URI: {}", result.metadata_uri));
    info(&format!(
        "Explorer: {}",
        explorer::address_url(&result.mint_address, ctx.network())
    ));
    Ok(())
}
