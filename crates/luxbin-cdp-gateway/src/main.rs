/*
[INPUT]:  CLI arguments, YAML configuration file, CDP key environment variables
[OUTPUT]: Running onramp proxy or webhook registration results
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or subcommands
*/

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use luxbin_cdp_adapter::{CdpClient, KeyMaterialLoader, TokenSigner, WebhookEventType};
use luxbin_cdp_gateway::GatewayConfig;
use luxbin_cdp_gateway::commands::{self, RegisterWebhookArgs};

#[derive(Parser, Debug)]
#[command(name = "luxbin-cdp-gateway", version, about = "LUXBIN onramp proxy and CDP webhook tooling")]
struct Cli {
    #[arg(long = "config", value_name = "PATH", global = true)]
    config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info", global = true)]
    log_level: String,
    /// Validate configuration and key material, then exit
    #[arg(long = "dry-run", global = true)]
    dry_run: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the onramp proxy HTTP server
    Serve,
    /// Create a webhook subscription (prints its secret once)
    RegisterWebhook {
        #[arg(long = "url")]
        target_url: String,
        #[arg(long, default_value = "LUXBIN onramp/offramp events")]
        description: String,
        /// Event type; repeat for several. Defaults to created/success/failed for onramp and offramp.
        #[arg(long = "event", value_name = "TYPE")]
        events: Vec<WebhookEventType>,
        /// Skip creation when a subscription already targets the URL
        #[arg(long)]
        if_absent: bool,
    },
    /// List existing webhook subscriptions
    ListWebhooks,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    let config = GatewayConfig::load(args.config_path.as_deref()).context("load config")?;
    info!(
        listen_addr = %config.listen_addr,
        cdp_base_url = %config.cdp_base_url,
        "configuration loaded"
    );

    let key = KeyMaterialLoader::from_env()
        .load()
        .context("load CDP key material")?;
    TokenSigner::new()
        .preflight(&key)
        .context("CDP key cannot sign ES256 tokens")?;
    info!(key_id = key.key_id(), "CDP key material ready");

    if args.dry_run {
        info!("dry-run requested; configuration and key validated");
        return Ok(());
    }

    let client = CdpClient::with_config_and_base_url(key, config.client_config(), &config.cdp_base_url)
        .context("build CDP client")?;

    match args.command {
        Command::Serve => commands::serve(&config, client).await,
        Command::RegisterWebhook {
            target_url,
            description,
            events,
            if_absent,
        } => {
            let args = RegisterWebhookArgs {
                target_url,
                description,
                event_types: events,
                if_absent,
            };
            commands::register_webhook(&client, args).await
        }
        Command::ListWebhooks => commands::list_webhooks(&client).await,
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}
