/*
[INPUT]:  Parsed CLI subcommands, gateway configuration, CDP client
[OUTPUT]: Running proxy server or webhook subscription changes
[POS]:    CLI command layer - one function per subcommand
[UPDATE]: When adding subcommands or changing their output
*/

use anyhow::{Context, Result};
use luxbin_cdp_adapter::{CdpClient, Registration, WebhookEventType, WebhookSubscription};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::GatewayConfig;
use crate::routes::{AppState, router};

/// Arguments for webhook registration
#[derive(Debug, Clone)]
pub struct RegisterWebhookArgs {
    pub target_url: String,
    pub description: String,
    pub event_types: Vec<WebhookEventType>,
    pub if_absent: bool,
}

/// Serve the onramp proxy until SIGINT/SIGTERM
pub async fn serve(config: &GatewayConfig, client: CdpClient) -> Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(%addr, cdp_base_url = %config.cdp_base_url, "onramp proxy listening");

    axum::serve(listener, router(AppState::new(client)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve onramp proxy")?;

    info!("onramp proxy shutdown complete");
    Ok(())
}

/// Create a webhook subscription and print its secret once
pub async fn register_webhook(client: &CdpClient, args: RegisterWebhookArgs) -> Result<()> {
    let event_types = if args.event_types.is_empty() {
        WebhookEventType::defaults()
    } else {
        args.event_types
    };

    let subscription = if args.if_absent {
        match client
            .register_webhook_if_absent(&args.description, &event_types, &args.target_url)
            .await
            .context("register webhook")?
        {
            Registration::Existing(existing) => {
                println!(
                    "Subscription {} already targets {}; nothing created.",
                    existing.id(),
                    existing.target_url()
                );
                return Ok(());
            }
            Registration::Created(created) => created,
        }
    } else {
        client
            .register_webhook(&args.description, &event_types, &args.target_url)
            .await
            .context("register webhook")?
    };

    print_created(&subscription);
    Ok(())
}

/// Print every subscription, one per line
pub async fn list_webhooks(client: &CdpClient) -> Result<()> {
    let subscriptions = client
        .list_webhook_subscriptions()
        .await
        .context("list webhook subscriptions")?;

    if subscriptions.is_empty() {
        println!("No webhook subscriptions.");
        return Ok(());
    }
    for sub in &subscriptions {
        println!(
            "{}\t{}\t{}\t{}",
            sub.id(),
            if sub.is_enabled { "enabled" } else { "disabled" },
            sub.target_url(),
            sub.event_types.join(",")
        );
    }
    Ok(())
}

fn print_created(subscription: &WebhookSubscription) {
    println!("Created subscription {}", subscription.id());
    println!("  target: {}", subscription.target_url());
    println!("  events: {}", subscription.event_types.join(", "));
    match &subscription.secret {
        Some(secret) => {
            println!();
            println!("Store this secret now; CDP will not show it again:");
            println!("  CDP_WEBHOOK_SECRET={secret}");
        }
        None => warn!(
            subscription_id = subscription.id(),
            "no secret returned; delete this subscription and register again"
        ),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            std::future::pending::<()>().await;
        }
        info!("received SIGINT");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received SIGTERM");
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
