//! Scripted capability implementations for exercising the mint client
//! without a node or a wallet.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use nft_mint::{
    EventId, EventPage, EventQuery, EventSource, ExecutionResult, MoveCall, NftConfig,
    ObjectSource, OwnedObjectsQuery, RawEvent, RawObject, Wallet,
};
use serde_json::json;

pub const TEST_PACKAGE: &str = "0xabc";
pub const TEST_SENDER: &str = "0xcafe";

pub fn test_config() -> NftConfig {
    NftConfig::new(TEST_PACKAGE)
}

/// Builds a minted event the way a node reports it.
pub fn raw_event(index: usize) -> RawEvent {
    RawEvent {
        id: Some(EventId::new(format!("tx{index}"), 0)),
        package_id: Some(TEST_PACKAGE.to_string()),
        transaction_module: Some("nft".to_string()),
        sender: Some(TEST_SENDER.to_string()),
        event_type: Some(format!("{TEST_PACKAGE}::nft::NFTMinted")),
        parsed_json: Some(json!({
            "object_id": format!("0x{index:04x}"),
            "creator": TEST_SENDER,
            "name": format!("NFT #{index}"),
        })),
        timestamp_ms: Some(1_700_000_000_000 + index as u64),
    }
}

/// Owned object with the given display fields. `None` fields are omitted.
pub fn raw_object(
    object_id: &str,
    name: Option<&str>,
    description: Option<&str>,
    url: Option<&str>,
) -> RawObject {
    let mut fields = serde_json::Map::new();
    if let Some(name) = name {
        fields.insert("name".into(), json!(name));
    }
    if let Some(description) = description {
        fields.insert("description".into(), json!(description));
    }
    if let Some(url) = url {
        fields.insert("url".into(), json!(url));
    }

    serde_json::from_value(json!({
        "data": {
            "objectId": object_id,
            "content": {
                "dataType": "moveObject",
                "type": format!("{TEST_PACKAGE}::nft::NFT"),
                "hasPublicTransfer": true,
                "fields": fields,
            }
        }
    }))
    .expect("raw object fixture")
}

/// Event source that serves pre-built pages in order.
#[derive(Default)]
pub struct MockEventSource {
    pages: Mutex<VecDeque<EventPage>>,
    fail_on_call: Option<usize>,
    queries: Mutex<Vec<EventQuery>>,
}

impl MockEventSource {
    /// One page per entry in `sizes`, numbered consecutively across pages.
    pub fn with_page_sizes(sizes: &[usize]) -> Self {
        let mut next = 0;
        let pages = sizes
            .iter()
            .enumerate()
            .map(|(page, &size)| {
                let data = (next..next + size).map(raw_event).collect();
                next += size;
                let has_next_page = page + 1 < sizes.len();
                EventPage {
                    data,
                    has_next_page,
                    next_cursor: has_next_page.then(|| EventId::new(format!("page{page}"), 0)),
                }
            })
            .collect();
        Self {
            pages: Mutex::new(pages),
            ..Self::default()
        }
    }

    /// `count` full pages of `page_size`, always claiming more are available.
    pub fn endless(page_size: usize, count: usize) -> Self {
        let source = Self::with_page_sizes(&vec![page_size; count]);
        if let Some(last) = source.pages.lock().unwrap().back_mut() {
            last.has_next_page = true;
            last.next_cursor = Some(EventId::new("endless", 0));
        }
        source
    }

    pub fn with_pages(pages: Vec<EventPage>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            ..Self::default()
        }
    }

    /// Fails the `call`-th query (zero based) with a transport error.
    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn queries(&self) -> Vec<EventQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl EventSource for MockEventSource {
    async fn query_events(&self, query: &EventQuery) -> Result<EventPage> {
        let call = {
            let mut queries = self.queries.lock().unwrap();
            queries.push(query.clone());
            queries.len() - 1
        };
        if self.fail_on_call == Some(call) {
            return Err(anyhow!("connection reset by peer"));
        }
        Ok(self.pages.lock().unwrap().pop_front().unwrap_or_default())
    }
}

/// Object source returning a fixed set of objects.
#[derive(Default)]
pub struct MockObjectSource {
    objects: Vec<RawObject>,
    fail: bool,
    queries: Mutex<Vec<OwnedObjectsQuery>>,
}

impl MockObjectSource {
    pub fn new(objects: Vec<RawObject>) -> Self {
        Self {
            objects,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn queries(&self) -> Vec<OwnedObjectsQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectSource for MockObjectSource {
    async fn get_owned_objects(&self, query: &OwnedObjectsQuery) -> Result<Vec<RawObject>> {
        self.queries.lock().unwrap().push(query.clone());
        if self.fail {
            return Err(anyhow!("object query timed out"));
        }
        Ok(self.objects.clone())
    }
}

/// Wallet with a scripted address and execution result.
pub struct MockWallet {
    address: Option<String>,
    outcome: std::result::Result<String, String>,
    calls: Mutex<Vec<MoveCall>>,
}

impl MockWallet {
    /// Connected wallet that executes every call with `digest`.
    pub fn connected(digest: &str) -> Self {
        Self {
            address: Some(TEST_SENDER.to_string()),
            outcome: Ok(digest.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Connected wallet that rejects every call with `message`.
    pub fn rejecting(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            ..Self::connected("")
        }
    }

    pub fn disconnected() -> Self {
        Self {
            address: None,
            ..Self::connected("")
        }
    }

    pub fn calls(&self) -> Vec<MoveCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl Wallet for MockWallet {
    fn active_address(&self) -> Option<String> {
        self.address.clone()
    }

    async fn sign_and_execute(&self, call: &MoveCall) -> Result<ExecutionResult> {
        self.calls.lock().unwrap().push(call.clone());
        match &self.outcome {
            Ok(digest) => Ok(ExecutionResult {
                digest: digest.clone(),
            }),
            Err(message) => Err(anyhow!(message.clone())),
        }
    }
}
