// Network selection

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tokenforge_sdk::Network;

use super::utils::{info, success, CliContext};

#[derive(Args)]
pub struct NetworkCmd {
    #[command(subcommand)]
    command: NetworkSubcommand,
}

#[derive(Subcommand)]
enum NetworkSubcommand {
    /// Print the selected network
    Get,

    /// Select and persist a network
    Set {
        /// mainnet-beta, devnet or testnet
        network: Network,
    },
}

pub fn execute(cmd: NetworkCmd, ctx: &CliContext) -> Result<()> {
    let store = ctx.store();
    match cmd.command {
        NetworkSubcommand::Get => {
            let selected = store.get();
            for network in Network::ALL {
                let marker = if network == selected { "*" } else { " " };
                info(&format!("{} {}", marker, network));
            }
            info(&format!("Settings: {}", store.path().display()));
            Ok(())
        }
        NetworkSubcommand::Set { network } => {
            store
                .set(network)
                .with_context(|| format!("Failed to save {}", store.path().display()))?;
            success(&format!("Network set to {}", network));
            Ok(())
        }
    }
}
