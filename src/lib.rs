//! nft-mint - client core for minting and browsing NFTs of a Move package.
//!
//! The crate talks to the node and the wallet through the capability traits
//! in [`source`]. On top of them it provides:
//!
//! - [`bcs`]: the length-prefixed field encoding used for mint arguments
//! - [`events`]: paginated aggregation of `NFTMinted` events
//! - [`owned`]: owned NFT lookup with display-field defaults
//! - [`mint`]: validation, encoding and submission of a mint
//! - [`feed`]: presentation state and post-mint refresh scheduling
//! - [`http`]: a JSON surface over the feed

pub mod bcs;
pub mod config;
pub mod events;
pub mod feed;
pub mod http;
pub mod mint;
pub mod owned;
pub mod source;
pub mod types;
pub mod validate;

// Re-export commonly used types for capability implementors
pub use async_trait::async_trait;
pub use axum;

pub use config::{ConfigError, NftConfig};
pub use events::{format_timestamp, iso_timestamp, EventAggregator};
pub use feed::{FeedSnapshot, NftFeed, RefreshHandle};
pub use http::create_http_router;
pub use mint::{build_mint_call, MintError, MintOrchestrator, MintOutcome};
pub use owned::OwnershipFetcher;
pub use source::{EventSource, ObjectSource, Wallet};
pub use types::{
    EventId, EventPage, EventQuery, ExecutionResult, MintRequest, MintedEvent, MoveCall,
    OwnedObjectsQuery, OwnedToken, RawEvent, RawObject, SortOrder,
};
pub use validate::is_valid;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any as CorsAny, CorsLayer};

/// Serves the HTTP surface on `addr` until `shutdown` is cancelled.
pub async fn serve(feed: Arc<NftFeed>, addr: SocketAddr, shutdown: CancellationToken) -> Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(CorsAny)
        .allow_methods(CorsAny)
        .allow_headers(CorsAny);
    let app = create_http_router(feed).layer(cors);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(target: "nft_mint", %addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("HTTP server failed")?;

    tracing::info!(target: "nft_mint", "HTTP server stopped");
    Ok(())
}
