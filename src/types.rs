//! Data model shared by the client core and its capability implementations.
//!
//! Raw types (`RawEvent`, `RawObject`, `EventPage`) mirror the node's JSON-RPC
//! shapes so that an RPC client can deserialize straight into them. Normalized
//! types (`MintedEvent`, `OwnedToken`) are what the feed and the HTTP surface
//! hand out.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::validate;

/// Form input for a single mint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintRequest {
    pub name: String,
    pub description: String,
    pub image_url: String,
}

impl MintRequest {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image_url: image_url.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        validate::is_valid(&self.name, &self.description, &self.image_url)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.description.is_empty() && self.image_url.is_empty()
    }

    /// Resets every field to the empty string.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A normalized `NFTMinted` event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintedEvent {
    pub object_id: Option<String>,
    pub creator: Option<String>,
    pub name: Option<String>,
    /// ISO-8601 instant in UTC with millisecond precision.
    pub timestamp: Option<String>,
    pub tx_digest: Option<String>,
    pub event_seq: Option<u64>,
}

/// Display projection of an owned NFT object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedToken {
    /// `None` for entries the node returned without object data.
    pub object_id: Option<String>,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
}

/// Identity envelope of an emitted event. Doubles as the pagination cursor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventId {
    pub tx_digest: String,
    #[serde(deserialize_with = "string_or_number")]
    pub event_seq: String,
}

impl EventId {
    pub fn new(tx_digest: impl Into<String>, event_seq: u64) -> Self {
        Self {
            tx_digest: tx_digest.into(),
            event_seq: event_seq.to_string(),
        }
    }
}

/// An event record as returned by the node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawEvent {
    pub id: Option<EventId>,
    pub package_id: Option<String>,
    pub transaction_module: Option<String>,
    pub sender: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    /// Decoded Move payload.
    pub parsed_json: Option<Value>,
    #[serde(deserialize_with = "opt_u64_from_string_or_number")]
    pub timestamp_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    pub fn is_descending(self) -> bool {
        self == Self::Descending
    }
}

/// One `queryEvents` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub event_type: String,
    pub cursor: Option<EventId>,
    pub limit: usize,
    pub order: SortOrder,
}

/// One page of `queryEvents` results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPage {
    #[serde(default)]
    pub data: Vec<RawEvent>,
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub next_cursor: Option<EventId>,
}

/// One `getOwnedObjects` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedObjectsQuery {
    pub owner: String,
    pub struct_type: String,
    pub show_content: bool,
    pub show_display: bool,
}

/// An owned-object entry as returned by the node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawObject {
    pub data: Option<ObjectData>,
    pub error: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectData {
    pub object_id: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default, rename = "type")]
    pub object_type: Option<String>,
    #[serde(default)]
    pub content: Option<ObjectContent>,
    #[serde(default)]
    pub display: Option<Value>,
}

/// Parsed object content, tagged by `dataType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dataType")]
pub enum ObjectContent {
    #[serde(rename = "moveObject")]
    MoveObject {
        #[serde(default, rename = "type")]
        object_type: Option<String>,
        #[serde(default, rename = "hasPublicTransfer")]
        has_public_transfer: bool,
        #[serde(default)]
        fields: Value,
    },
    #[serde(other)]
    Other,
}

/// A Move call with positional pure arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveCall {
    /// `<package>::<module>::<function>`
    pub target: String,
    /// Pre-encoded argument bytes, serialized as `0x`-prefixed hex.
    #[serde(serialize_with = "hex_arguments")]
    pub arguments: Vec<Vec<u8>>,
}

impl MoveCall {
    pub fn new(target: impl Into<String>, arguments: Vec<Vec<u8>>) -> Self {
        Self {
            target: target.into(),
            arguments,
        }
    }
}

/// Outcome of a signed and executed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub digest: String,
}

fn hex_arguments<S: Serializer>(arguments: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(arguments.iter().map(|arg| format!("0x{}", hex::encode(arg))))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Number(u64),
    String(String),
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Number(n) => n.to_string(),
        StringOrNumber::String(s) => s,
    })
}

fn opt_u64_from_string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u64>, D::Error> {
    match Option::<StringOrNumber>::deserialize(deserializer)? {
        None => Ok(None),
        Some(StringOrNumber::Number(n)) => Ok(Some(n)),
        Some(StringOrNumber::String(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
