//! Aggregation of `NFTMinted` events across pages.
//!
//! The node returns events newest-first in pages of `event_page_size`. The
//! aggregator walks the cursor chain until the node reports no further page or
//! until the collected count exceeds the configured ceiling at a page
//! boundary. Hitting the ceiling returns what was collected so far; only a
//! source failure is an error.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::NftConfig;
use crate::source::EventSource;
use crate::types::{EventQuery, MintedEvent, RawEvent, SortOrder};

pub struct EventAggregator {
    source: Arc<dyn EventSource>,
    event_type: String,
    page_size: usize,
    max_events: usize,
}

impl EventAggregator {
    pub fn new(source: Arc<dyn EventSource>, config: &NftConfig) -> Self {
        Self {
            source,
            event_type: config.event_type(),
            page_size: config.event_page_size.max(1),
            max_events: config.max_events.max(1),
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// All `NFTMinted` events of the configured package, newest first.
    pub async fn fetch_all(&self) -> Result<Vec<MintedEvent>> {
        self.fetch_type(&self.event_type).await
    }

    /// All events of `event_type`, normalized.
    pub async fn fetch_type(&self, event_type: &str) -> Result<Vec<MintedEvent>> {
        let raw = self.fetch_raw(event_type).await?;
        Ok(raw.iter().map(minted_event_from_raw).collect())
    }

    /// All events of `event_type` as returned by the source, in received order.
    pub async fn fetch_raw(&self, event_type: &str) -> Result<Vec<RawEvent>> {
        info!(
            target: "nft_mint::events",
            event_type,
            page_size = self.page_size,
            max_events = self.max_events,
            "starting event aggregation"
        );

        let mut events: Vec<RawEvent> = Vec::new();
        let mut cursor = None;
        let mut pages = 0usize;

        loop {
            let query = EventQuery {
                event_type: event_type.to_string(),
                cursor: cursor.take(),
                limit: self.page_size,
                order: SortOrder::Descending,
            };
            let page = self
                .source
                .query_events(&query)
                .await
                .with_context(|| format!("failed to query page {} of {event_type}", pages + 1))?;
            pages += 1;

            let received = page.data.len();
            debug!(
                target: "nft_mint::events",
                page_number = pages,
                events = received,
                has_more = page.has_next_page,
                "received events page"
            );
            events.extend(page.data);

            if !page.has_next_page {
                break;
            }

            if events.len() > self.max_events {
                warn!(
                    target: "nft_mint::events",
                    collected = events.len(),
                    max_events = self.max_events,
                    "event ceiling reached, returning partial result"
                );
                break;
            }

            // Some nodes report more pages while handing out nothing; stop instead of spinning.
            if received == 0 {
                warn!(
                    target: "nft_mint::events",
                    page_number = pages,
                    "empty page announced further pages, stopping"
                );
                break;
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => {
                    warn!(
                        target: "nft_mint::events",
                        page_number = pages,
                        "page announced further pages without a cursor, stopping"
                    );
                    break;
                }
            }
        }

        info!(
            target: "nft_mint::events",
            events = events.len(),
            pages,
            "completed event aggregation"
        );
        Ok(events)
    }
}

/// Maps a raw record into the normalized shape. Absent fields stay `None`.
pub fn minted_event_from_raw(raw: &RawEvent) -> MintedEvent {
    let payload = raw.parsed_json.as_ref();
    MintedEvent {
        object_id: payload_str(payload, "object_id"),
        creator: payload_str(payload, "creator"),
        name: payload_str(payload, "name"),
        timestamp: raw.timestamp_ms.and_then(iso_timestamp),
        tx_digest: raw.id.as_ref().map(|id| id.tx_digest.clone()),
        event_seq: raw.id.as_ref().and_then(|id| id.event_seq.parse().ok()),
    }
}

fn payload_str(payload: Option<&Value>, key: &str) -> Option<String> {
    payload?.get(key)?.as_str().map(str::to_string)
}

/// Epoch milliseconds to an ISO-8601 UTC instant (`2023-11-14T22:13:20.123Z`).
pub fn iso_timestamp(millis: u64) -> Option<String> {
    let millis = i64::try_from(millis).ok()?;
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|instant| instant.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Renders an ISO-8601 instant in the local time zone for display.
pub fn format_timestamp(iso: &str) -> Option<String> {
    let instant = DateTime::parse_from_rfc3339(iso).ok()?;
    Some(
        instant
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
    )
}
