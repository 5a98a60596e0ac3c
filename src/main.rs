use std::net::SocketAddr;

use anyhow::Context;

use contact_relay::config::ContactConfig;
use contact_relay::contact::{ContactState, contact_routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ContactConfig::from_env().context("Invalid configuration")?;

    eprintln!("📨 Contact relay v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Listening: http://{}", config.bind_addr);
    eprintln!("   Classifier model: {}", config.classifier.model);
    eprintln!(
        "   Allowed origins: {}",
        if config.allowed_origins.is_empty() {
            "none (deny all)".to_string()
        } else {
            config.allowed_origins.as_slice().join(", ")
        }
    );
    for key in config.missing_settings() {
        tracing::warn!(key = key, "Setting not configured; dependent calls will fail");
    }

    let app = contact_routes(ContactState::from_config(&config));
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "Contact server started");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutting down");
    })
    .await?;

    Ok(())
}
