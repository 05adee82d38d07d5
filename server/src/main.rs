//! Homelink relay server
//!
//! Accepts validated commands from control clients, holds the latest command
//! per device for actuator pull, admits authenticated status reports, and
//! fans state changes out to all subscribed observers.

mod auth;
mod config;
mod dispatch;
mod hub;
mod session;
mod store;

use config::Config;
use dispatch::Relay;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = Config::from_env()?;
    info!("Relay starting on {}", config.listen_addr);
    info!(
        "  {} device secret(s) provisioned",
        config.device_secrets.len()
    );

    let relay = Arc::new(Relay::new(&config));
    let listener = TcpListener::bind(&config.listen_addr).await?;

    loop {
        let (stream, addr) = listener.accept().await?;
        info!("Connection from {}", addr);

        let relay = relay.clone();
        tokio::spawn(async move {
            session::run(stream, addr, relay).await;
        });
    }
}
