//! nft-mint - command line client for an NFT Move package on Sui
//!
//! # Usage
//!
//! ```bash
//! # Every minted event, newest first
//! NFT_PACKAGE_ID=0x... nft-mint events
//!
//! # NFTs held by an address
//! nft-mint --package-id 0x... owned --owner 0x...
//!
//! # Encoded mint call, ready for a wallet to sign
//! nft-mint --package-id 0x... mint-call --name Dragon --description "Breathes fire" \
//!     --image-url https://example.com/dragon.png
//!
//! # JSON feed on port 3000
//! nft-mint --package-id 0x... serve --port 3000
//! ```

mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Command, Config};
use nft_mint::{bcs, build_mint_call, format_timestamp, MintRequest, NftFeed};
use nft_mint_rpc::SuiRpcClient;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(true)
        .init();

    let nft_config = Arc::new(config.nft_config().context("invalid configuration")?);

    match config.command {
        Command::Encode { ref value } => {
            let field = bcs::try_encode(value)?;
            println!("0x{}", hex::encode(field.to_bytes()));
            return Ok(());
        }
        Command::Decode { ref hex } => {
            let bytes = hex::decode(hex.trim_start_matches("0x")).context("invalid hex input")?;
            let field = bcs::decode(&bytes)?;
            println!("{}", String::from_utf8_lossy(&field.payload));
            return Ok(());
        }
        Command::MintCall {
            ref name,
            ref description,
            ref image_url,
        } => {
            let request = MintRequest::new(name, description, image_url);
            let call = build_mint_call(&nft_config, &request)?;
            println!("{}", serde_json::to_string_pretty(&call)?);
            return Ok(());
        }
        Command::Explorer { ref digest } => {
            println!("{}", nft_config.explorer_url(digest));
            return Ok(());
        }
        _ => {}
    }

    let rpc_config = config.rpc_config();
    tracing::info!(target: "nft_mint::main", "Starting nft-mint");
    tracing::info!(target: "nft_mint::main", "RPC URL: {}", rpc_config.rpc_url);
    tracing::info!(target: "nft_mint::main", "Package: {}", nft_config.package_id);

    let client = Arc::new(SuiRpcClient::new(rpc_config).context("failed to create RPC client")?);
    let feed = Arc::new(NftFeed::new(nft_config, client.clone(), client));

    match config.command {
        Command::Events { local_time } => {
            let events = feed.refresh_events().await?;
            if !local_time {
                println!("{}", serde_json::to_string_pretty(&events)?);
                return Ok(());
            }
            for event in &events {
                let timestamp = event
                    .timestamp
                    .as_deref()
                    .and_then(format_timestamp)
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{timestamp}  {}  {}  {}",
                    event.name.as_deref().unwrap_or("-"),
                    event.object_id.as_deref().unwrap_or("-"),
                    event.creator.as_deref().unwrap_or("-"),
                );
            }
            tracing::info!(target: "nft_mint::main", "{} events", events.len());
        }
        Command::Owned { owner } => {
            let owned = feed.refresh_owned(&owner).await?;
            println!("{}", serde_json::to_string_pretty(&owned)?);
        }
        Command::Serve { port } => {
            if let Err(err) = feed.refresh_events().await {
                tracing::warn!(target: "nft_mint::main", error = %err, "initial event load failed");
            }

            let shutdown = CancellationToken::new();
            tokio::spawn(shutdown_on_signal(shutdown.clone()));

            let addr = SocketAddr::from(([0, 0, 0, 0], port));
            nft_mint::serve(feed, addr, shutdown).await?;
        }
        Command::Encode { .. }
        | Command::Decode { .. }
        | Command::MintCall { .. }
        | Command::Explorer { .. } => {}
    }

    Ok(())
}

async fn shutdown_on_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(target: "nft_mint::main", "Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(target: "nft_mint::main", "Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!(target: "nft_mint::main", "Received SIGINT (Ctrl+C), initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!(target: "nft_mint::main", "Received SIGTERM, initiating graceful shutdown...");
        }
    }

    token.cancel();
}
