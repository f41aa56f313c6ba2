//! Sui JSON-RPC implementation of the nft-mint event and object sources.
//!
//! Only the read side lives here: `suix_queryEvents` and
//! `suix_getOwnedObjects`. Signing stays with the wallet.

mod error;

pub use error::RpcError;

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use nft_mint::{
    EventPage, EventQuery, EventSource, ObjectSource, OwnedObjectsQuery, RawObject,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, trace, warn};
use url::Url;

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Public fullnode presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
    Devnet,
    Localnet,
}

impl Network {
    pub fn rpc_url(self) -> &'static str {
        match self {
            Self::Mainnet => "https://fullnode.mainnet.sui.io:443",
            Self::Testnet => "https://fullnode.testnet.sui.io:443",
            Self::Devnet => "https://fullnode.devnet.sui.io:443",
            Self::Localnet => "http://127.0.0.1:9000",
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "devnet" => Ok(Self::Devnet),
            "localnet" => Ok(Self::Localnet),
            other => Err(format!("unknown network '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuiRpcConfig {
    pub rpc_url: String,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl SuiRpcConfig {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            timeout_ms: None,
        }
    }

    pub fn for_network(network: Network) -> Self {
        Self::new(network.rpc_url())
    }
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectsPage {
    #[serde(default)]
    data: Vec<RawObject>,
    #[serde(default)]
    has_next_page: bool,
}

/// JSON-RPC client for a Sui fullnode.
pub struct SuiRpcClient {
    http: reqwest::Client,
    url: Url,
    next_id: AtomicU64,
}

impl SuiRpcClient {
    pub fn new(config: SuiRpcConfig) -> Result<Self, RpcError> {
        let url = Url::parse(&config.rpc_url).map_err(|source| RpcError::InvalidUrl {
            url: config.rpc_url.clone(),
            source,
        })?;
        let timeout = Duration::from_millis(config.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS));
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RpcError::Client)?;

        Ok(Self {
            http,
            url,
            next_id: AtomicU64::new(1),
        })
    }

    /// Performs one JSON-RPC call and decodes its `result`.
    pub async fn call<R: DeserializeOwned>(&self, method: &str, params: Value) -> Result<R, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        trace!(target: "nft_mint_rpc", id, method, %params, "sending request");

        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        let response = self
            .http
            .post(self.url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|source| RpcError::Http {
                method: method.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Status {
                method: method.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|source| RpcError::Http {
            method: method.to_string(),
            source,
        })?;
        let envelope: RpcResponse =
            serde_json::from_slice(&body).map_err(|source| RpcError::Decode {
                method: method.to_string(),
                source,
            })?;

        if let Some(error) = envelope.error {
            warn!(
                target: "nft_mint_rpc",
                method,
                code = error.code,
                message = %error.message,
                "rpc call returned an error"
            );
            return Err(RpcError::Rpc {
                method: method.to_string(),
                code: error.code,
                message: error.message,
            });
        }

        let result = envelope.result.ok_or_else(|| RpcError::EmptyResponse {
            method: method.to_string(),
        })?;
        serde_json::from_value(result).map_err(|source| RpcError::Decode {
            method: method.to_string(),
            source,
        })
    }
}

#[async_trait]
impl EventSource for SuiRpcClient {
    async fn query_events(&self, query: &EventQuery) -> Result<EventPage> {
        let params = json!([
            { "MoveEventType": query.event_type },
            query.cursor,
            query.limit,
            query.order.is_descending(),
        ]);
        let page: EventPage = self.call("suix_queryEvents", params).await?;

        debug!(
            target: "nft_mint_rpc",
            events = page.data.len(),
            has_more = page.has_next_page,
            "queried events"
        );
        Ok(page)
    }
}

#[async_trait]
impl ObjectSource for SuiRpcClient {
    async fn get_owned_objects(&self, query: &OwnedObjectsQuery) -> Result<Vec<RawObject>> {
        let params = json!([
            query.owner,
            {
                "filter": { "StructType": query.struct_type },
                "options": {
                    "showContent": query.show_content,
                    "showDisplay": query.show_display,
                },
            },
            Value::Null,
            Value::Null,
        ]);
        let page: ObjectsPage = self.call("suix_getOwnedObjects", params).await?;

        if page.has_next_page {
            debug!(
                target: "nft_mint_rpc",
                owner = %query.owner,
                returned = page.data.len(),
                "owner holds more objects than the first page"
            );
        }
        Ok(page.data)
    }
}
