// Token metadata lookup and update

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tokenforge_sdk::{explorer, instructions::MetadataChanges};

use super::utils::{info, parse_pubkey, CliContext};

#[derive(Args)]
pub struct MetadataCmd {
    #[command(subcommand)]
    command: MetadataSubcommand,
}

#[derive(Subcommand)]
enum MetadataSubcommand {
    /// Show on-chain metadata and logo of a mint
    Show {
        /// Mint address
        mint: String,
    },

    /// Change name, symbol or URI (wallet must be the update authority)
    Update {
        /// Mint address
        mint: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        symbol: Option<String>,

        #[arg(long)]
        uri: Option<String>,
    },
}

pub async fn execute(cmd: MetadataCmd, ctx: &CliContext) -> Result<()> {
    let tools = ctx.tools()?;
    match cmd.command {
        MetadataSubcommand::Show { mint } => {
            let metadata = tools
                .fetch_token_metadata(&mint)
                .await
                .context("Metadata lookup failed")?;

            info(&format!("Mint:             {}", metadata.mint));
            info(&format!("Metadata account: {}", metadata.metadata_account));
            info(&format!("Update authority: {}", metadata.update_authority));
            info(&format!("Name:             {}", metadata.name));
            info(&format!("Symbol:           {}", metadata.symbol));
            info(&format!("URI:              {}", metadata.uri));
            info(&format!("Mutable:          {}", metadata.is_mutable));
            if let Some(image) = &metadata.image {
                info(&format!("Image:            {}", image));
            }
            info(&format!(
                "Explorer: {}",
                explorer::address_url(&metadata.mint, ctx.network())
            ));
            Ok(())
        }

        MetadataSubcommand::Update {
            mint,
            name,
            symbol,
            uri,
        } => {
            let mint_address = parse_pubkey(&mint)?;
            let changes = MetadataChanges { name, symbol, uri };
            tools
                .update_token_metadata(&mint, &changes)
                .await
                .context("Metadata update failed")?;
            info(&format!(
                "Explorer: {}",
                explorer::address_url(&mint_address, ctx.network())
            ));
            Ok(())
        }
    }
}
