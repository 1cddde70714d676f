// Configuration file helpers

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use tokenforge_sdk::SdkConfig;

use super::utils::{info, success};

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Write a configuration file with default values
    Init {
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn execute(cmd: ConfigCmd) -> Result<()> {
    match cmd.command {
        ConfigSubcommand::Init { path, force } => {
            if path.exists() && !force {
                bail!("{} already exists, pass --force to overwrite", path.display());
            }
            SdkConfig::default().save(&path)?;
            success(&format!("Wrote {}", path.display()));
            info("Set PINATA_API_KEY and PINATA_SECRET_API_KEY or fill in [pinning]");
            Ok(())
        }
    }
}
