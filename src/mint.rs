//! Mint submission.
//!
//! Order is fixed: wallet check, validation, encoding, one submission, then
//! the post-mint refresh. Preconditions fail before anything touches the
//! network, and a failed submission leaves the request as it was.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::bcs::{self, EncodeError, EncodedField};
use crate::config::NftConfig;
use crate::feed::{NftFeed, RefreshHandle};
use crate::source::Wallet;
use crate::types::{MintRequest, MoveCall};

#[derive(Debug, Error)]
pub enum MintError {
    #[error("no wallet connected")]
    NoWallet,
    #[error("name, description and image url are all required")]
    InvalidRequest,
    #[error("cannot encode field: {0}")]
    Encode(#[from] EncodeError),
    /// The wallet or node rejected the transaction. Carries the underlying error.
    #[error(transparent)]
    Transport(anyhow::Error),
}

impl MintError {
    /// True for failures raised before any network call.
    pub fn is_precondition(&self) -> bool {
        !matches!(self, Self::Transport(_))
    }
}

/// Result of a successful mint.
#[derive(Debug)]
pub struct MintOutcome {
    pub digest: String,
    pub explorer_url: String,
    /// The scheduled feed refresh; awaiting it is optional.
    pub refresh: RefreshHandle,
}

/// Validates and encodes `request` into the `mint_to_sender` call.
///
/// Arguments are positional: name, description, image url.
pub fn build_mint_call(config: &NftConfig, request: &MintRequest) -> Result<MoveCall, MintError> {
    if !request.is_valid() {
        return Err(MintError::InvalidRequest);
    }

    let arguments = [&request.name, &request.description, &request.image_url]
        .into_iter()
        .map(|field| bcs::try_encode(field).map(EncodedField::into_bytes))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MoveCall::new(config.mint_target(), arguments))
}

pub struct MintOrchestrator {
    wallet: Arc<dyn Wallet>,
    feed: Arc<NftFeed>,
}

impl MintOrchestrator {
    pub fn new(wallet: Arc<dyn Wallet>, feed: Arc<NftFeed>) -> Self {
        Self { wallet, feed }
    }

    pub fn feed(&self) -> &Arc<NftFeed> {
        &self.feed
    }

    /// Same predicate the submit path applies, for enabling a submit control.
    pub fn can_submit(&self, request: &MintRequest) -> bool {
        self.wallet.active_address().is_some() && request.is_valid()
    }

    /// Submits `request` once. On success the request is cleared and a feed
    /// refresh is scheduled.
    pub async fn mint(&self, request: &mut MintRequest) -> Result<MintOutcome, MintError> {
        let sender = self.wallet.active_address().ok_or(MintError::NoWallet)?;
        let config = self.feed.config();
        let call = build_mint_call(config, request)?;

        info!(
            target: "nft_mint::mint",
            sender = %sender,
            target_fn = %call.target,
            name = %request.name,
            "submitting mint transaction"
        );

        let result = self.wallet.sign_and_execute(&call).await.map_err(|err| {
            warn!(target: "nft_mint::mint", error = %err, "mint transaction failed");
            MintError::Transport(err)
        })?;

        info!(target: "nft_mint::mint", digest = %result.digest, "mint transaction executed");

        self.feed.record_digest(&result.digest).await;
        request.clear();
        let refresh = self
            .feed
            .schedule_refresh(Some(sender), config.refresh_delay());

        Ok(MintOutcome {
            explorer_url: config.explorer_url(&result.digest),
            digest: result.digest,
            refresh,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_mint_call_argument_order() {
        let config = NftConfig::new("0xabc");
        let request = MintRequest::new("Dragon", "Breathes fire", "https://x.io/d.png");

        let call = build_mint_call(&config, &request).unwrap();
        assert_eq!(call.target, "0xabc::nft::mint_to_sender");
        assert_eq!(
            call.arguments,
            vec![
                bcs::encode("Dragon"),
                bcs::encode("Breathes fire"),
                bcs::encode("https://x.io/d.png"),
            ]
        );
    }

    #[test]
    fn test_build_mint_call_rejects_blank_field() {
        let config = NftConfig::new("0xabc");
        let request = MintRequest::new("Dragon", "   ", "https://x.io/d.png");
        let err = build_mint_call(&config, &request).unwrap_err();
        assert!(matches!(err, MintError::InvalidRequest));
        assert!(err.is_precondition());
    }

    #[test]
    fn test_build_mint_call_rejects_oversized_field() {
        let config = NftConfig::new("0xabc");
        let request = MintRequest::new("Dragon", "d".repeat(bcs::MAX_FIELD_LEN + 1), "u");
        let err = build_mint_call(&config, &request).unwrap_err();
        assert!(matches!(err, MintError::Encode(EncodeError::TooLong { .. })));
    }

    #[test]
    fn test_transport_error_is_transparent() {
        let err = MintError::Transport(anyhow::anyhow!("User rejected the request"));
        assert_eq!(err.to_string(), "User rejected the request");
        assert!(!err.is_precondition());
    }
}
