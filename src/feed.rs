//! Presentation state: the event feed, the owned-token list and the last
//! transaction, plus the refresh tasks that keep them current.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::NftConfig;
use crate::events::EventAggregator;
use crate::owned::OwnershipFetcher;
use crate::source::{EventSource, ObjectSource};
use crate::types::{MintedEvent, OwnedToken};

#[derive(Debug, Default)]
struct FeedState {
    events: Vec<MintedEvent>,
    owner: Option<String>,
    owned: Vec<OwnedToken>,
    last_digest: Option<String>,
    /// Generation of the refresh whose result is currently stored.
    events_generation: u64,
    owned_generation: u64,
}

/// Point-in-time copy of the feed, ready to render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    pub events: Vec<MintedEvent>,
    pub owner: Option<String>,
    pub owned: Vec<OwnedToken>,
    pub loading: bool,
    pub last_digest: Option<String>,
    pub last_tx_url: Option<String>,
}

pub struct NftFeed {
    config: Arc<NftConfig>,
    aggregator: EventAggregator,
    fetcher: OwnershipFetcher,
    state: RwLock<FeedState>,
    in_flight: AtomicUsize,
    events_generation: AtomicU64,
    owned_generation: AtomicU64,
}

impl NftFeed {
    pub fn new(
        config: Arc<NftConfig>,
        events: Arc<dyn EventSource>,
        objects: Arc<dyn ObjectSource>,
    ) -> Self {
        Self {
            aggregator: EventAggregator::new(events, &config),
            fetcher: OwnershipFetcher::new(objects, &config),
            config,
            state: RwLock::new(FeedState::default()),
            in_flight: AtomicUsize::new(0),
            events_generation: AtomicU64::new(0),
            owned_generation: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &NftConfig {
        &self.config
    }

    /// True while any refresh is running.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Re-reads the whole event history and replaces the feed's copy.
    ///
    /// On failure the previous events are kept. When refreshes overlap, the
    /// one started last wins: a result arriving after a newer one was stored
    /// is returned to its caller but not stored.
    pub async fn refresh_events(&self) -> Result<Vec<MintedEvent>> {
        let _loading = LoadingGuard::enter(&self.in_flight);
        let generation = self.events_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let events = self.aggregator.fetch_all().await?;

        let mut state = self.state.write().await;
        if generation > state.events_generation {
            state.events_generation = generation;
            state.events = events.clone();
        } else {
            debug!(target: "nft_mint::feed", generation, "dropping stale event refresh");
        }
        Ok(events)
    }

    /// Re-reads the NFTs held by `owner` and replaces the feed's copy.
    ///
    /// Overlapping refreshes resolve like [`Self::refresh_events`].
    pub async fn refresh_owned(&self, owner: &str) -> Result<Vec<OwnedToken>> {
        let _loading = LoadingGuard::enter(&self.in_flight);
        let generation = self.owned_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let owned = self.fetcher.fetch_owned(owner).await?;

        let mut state = self.state.write().await;
        if generation > state.owned_generation {
            state.owned_generation = generation;
            state.owner = Some(owner.to_string());
            state.owned = owned.clone();
        } else {
            debug!(target: "nft_mint::feed", generation, owner = %owner, "dropping stale owned refresh");
        }
        Ok(owned)
    }

    pub async fn record_digest(&self, digest: &str) {
        self.state.write().await.last_digest = Some(digest.to_string());
    }

    pub async fn events(&self) -> Vec<MintedEvent> {
        self.state.read().await.events.clone()
    }

    pub async fn owned(&self) -> Vec<OwnedToken> {
        self.state.read().await.owned.clone()
    }

    pub async fn last_digest(&self) -> Option<String> {
        self.state.read().await.last_digest.clone()
    }

    pub async fn snapshot(&self) -> FeedSnapshot {
        let state = self.state.read().await;
        FeedSnapshot {
            events: state.events.clone(),
            owner: state.owner.clone(),
            owned: state.owned.clone(),
            loading: self.is_loading(),
            last_digest: state.last_digest.clone(),
            last_tx_url: state
                .last_digest
                .as_deref()
                .map(|digest| self.config.explorer_url(digest)),
        }
    }

    /// Spawns the post-mint refresh: owned tokens right away (when an owner is
    /// known) and the event feed after `events_delay`.
    ///
    /// Failures are logged; the previous state stays in place.
    pub fn schedule_refresh(
        self: &Arc<Self>,
        owner: Option<String>,
        events_delay: Duration,
    ) -> RefreshHandle {
        let owned = owner.map(|owner| {
            let feed = Arc::clone(self);
            tokio::spawn(async move {
                if let Err(err) = feed.refresh_owned(&owner).await {
                    warn!(target: "nft_mint::feed", owner = %owner, error = ?err, "owned token refresh failed");
                }
            })
        });

        let feed = Arc::clone(self);
        let events = tokio::spawn(async move {
            if !events_delay.is_zero() {
                debug!(
                    target: "nft_mint::feed",
                    delay_ms = events_delay.as_millis() as u64,
                    "waiting before event refresh"
                );
                tokio::time::sleep(events_delay).await;
            }
            if let Err(err) = feed.refresh_events().await {
                warn!(target: "nft_mint::feed", error = ?err, "event refresh failed");
            }
        });

        RefreshHandle { owned, events }
    }
}

/// Handle on the tasks spawned by [`NftFeed::schedule_refresh`].
#[derive(Debug)]
pub struct RefreshHandle {
    owned: Option<JoinHandle<()>>,
    events: JoinHandle<()>,
}

impl RefreshHandle {
    /// Waits for both refreshes to complete.
    pub async fn join(self) {
        if let Some(owned) = self.owned {
            if let Err(err) = owned.await {
                warn!(target: "nft_mint::feed", error = %err, "owned token refresh task failed");
            }
        }
        if let Err(err) = self.events.await {
            warn!(target: "nft_mint::feed", error = %err, "event refresh task failed");
        }
    }
}

struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventPage, EventQuery, OwnedObjectsQuery, RawEvent, RawObject};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    /// Holds its first query until released; later queries answer at once.
    #[derive(Default)]
    struct HeldFirstQuery {
        calls: AtomicUsize,
        entered: Notify,
        release: Notify,
    }

    fn page(events: usize) -> EventPage {
        EventPage {
            data: vec![RawEvent::default(); events],
            has_next_page: false,
            next_cursor: None,
        }
    }

    #[async_trait]
    impl EventSource for HeldFirstQuery {
        async fn query_events(&self, _query: &EventQuery) -> Result<EventPage> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                self.entered.notify_one();
                self.release.notified().await;
                return Ok(page(1));
            }
            Ok(page(2))
        }
    }

    #[async_trait]
    impl ObjectSource for HeldFirstQuery {
        async fn get_owned_objects(&self, _query: &OwnedObjectsQuery) -> Result<Vec<RawObject>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_older_event_refresh_does_not_overwrite_newer() {
        let source = Arc::new(HeldFirstQuery::default());
        let feed = Arc::new(NftFeed::new(
            Arc::new(NftConfig::new("0xabc")),
            source.clone(),
            source.clone(),
        ));

        let older = tokio::spawn({
            let feed = Arc::clone(&feed);
            async move { feed.refresh_events().await }
        });
        source.entered.notified().await;
        assert!(feed.is_loading());

        let newer = feed.refresh_events().await.unwrap();
        assert_eq!(newer.len(), 2);

        source.release.notify_one();
        let stale = older.await.unwrap().unwrap();
        assert_eq!(stale.len(), 1);

        assert_eq!(feed.events().await.len(), 2);
        assert!(!feed.is_loading());
    }

    #[tokio::test]
    async fn test_snapshot_is_camel_case() {
        let source = Arc::new(HeldFirstQuery::default());
        let feed = NftFeed::new(Arc::new(NftConfig::new("0xabc")), source.clone(), source);
        feed.record_digest("AbC").await;

        let json = serde_json::to_value(feed.snapshot().await).unwrap();
        assert_eq!(json["lastDigest"], "AbC");
        assert_eq!(json["lastTxUrl"], "https://testnet.suivision.xyz/txblock/AbC");
        assert!(json.get("last_tx_url").is_none());
    }
}
