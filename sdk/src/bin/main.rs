// CLI tool for TokenForge
//
// Creates SPL tokens with metadata and offers the wallet utilities that go
// with it: airdrops, transfers, metadata lookup and the contact form.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokenforge_sdk::{Network, NetworkStore, SdkConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::utils::CliContext;

#[derive(Parser)]
#[command(name = "tokenforge")]
#[command(about = "Create Solana tokens without writing code", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to wallet keypair file
    #[arg(long, global = true, default_value = "~/.config/solana/id.json")]
    wallet: String,

    /// Network for this run only (mainnet-beta, devnet, testnet)
    #[arg(long, global = true)]
    network: Option<Network>,

    /// RPC URL, overrides the network's public endpoint
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a token: mint, supply and metadata in one transaction
    Create(commands::create::CreateCmd),

    /// Request an airdrop to the wallet (devnet and testnet only)
    Airdrop(commands::airdrop::AirdropCmd),

    /// Send SOL, to the creator address unless --to is given
    Send(commands::send::SendCmd),

    /// Show the wallet balance
    Balance,

    /// Inspect or update token metadata
    Metadata(commands::metadata::MetadataCmd),

    /// Show or change the selected network
    Network(commands::network::NetworkCmd),

    /// Send a message through the contact form
    Contact(commands::contact::ContactCmd),

    /// Subscribe an email address to the newsletter
    Newsletter(commands::contact::NewsletterCmd),

    /// Configuration file helpers
    Config(commands::config::ConfigCmd),
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("tokenforge_sdk={},tokenforge={}", default_level, default_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&PathBuf>, rpc_url: Option<&String>) -> Result<SdkConfig> {
    let config = match path {
        Some(path) => SdkConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => SdkConfig::default(),
    };
    let config = config.with_env_overrides();
    Ok(match rpc_url {
        Some(url) => config.with_rpc_url(url.clone()),
        None => config,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let command = match cli.command {
        Commands::Config(cmd) => return commands::config::execute(cmd),
        other => other,
    };

    let config = load_config(cli.config.as_ref(), cli.rpc_url.as_ref())?;
    let store = NetworkStore::init_global(config.resolved_settings_path());
    let ctx = CliContext::new(config, store, cli.network, &cli.wallet);

    let result = match command {
        Commands::Create(cmd) => commands::create::execute(cmd, &ctx).await,
        Commands::Airdrop(cmd) => commands::airdrop::execute(cmd, &ctx).await,
        Commands::Send(cmd) => commands::send::execute(cmd, &ctx).await,
        Commands::Balance => commands::balance::execute(&ctx).await,
        Commands::Metadata(cmd) => commands::metadata::execute(cmd, &ctx).await,
        Commands::Network(cmd) => commands::network::execute(cmd, &ctx),
        Commands::Contact(cmd) => commands::contact::execute(cmd, &ctx).await,
        Commands::Newsletter(cmd) => commands::contact::subscribe(cmd, &ctx).await,
        Commands::Config(_) => Ok(()),
    };

    ctx.print_notifications();
    result
}
