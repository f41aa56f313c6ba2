//! Owned NFT lookup and display-field extraction.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::NftConfig;
use crate::source::ObjectSource;
use crate::types::{ObjectContent, OwnedObjectsQuery, OwnedToken, RawObject};

pub const DEFAULT_NAME: &str = "Unnamed NFT";
pub const DEFAULT_DESCRIPTION: &str = "No description";

/// Display fields of one object, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFields {
    pub name: String,
    pub description: String,
    pub url: Option<String>,
}

impl Default for DisplayFields {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            url: None,
        }
    }
}

pub struct OwnershipFetcher {
    source: Arc<dyn ObjectSource>,
    nft_type: String,
}

impl OwnershipFetcher {
    pub fn new(source: Arc<dyn ObjectSource>, config: &NftConfig) -> Self {
        Self {
            source,
            nft_type: config.nft_type(),
        }
    }

    pub fn nft_type(&self) -> &str {
        &self.nft_type
    }

    /// NFTs of the configured package held by `owner`, in the node's order.
    pub async fn fetch_owned(&self, owner: &str) -> Result<Vec<OwnedToken>> {
        self.fetch_owned_of_type(owner, &self.nft_type).await
    }

    pub async fn fetch_owned_of_type(&self, owner: &str, struct_type: &str) -> Result<Vec<OwnedToken>> {
        let query = OwnedObjectsQuery {
            owner: owner.to_string(),
            struct_type: struct_type.to_string(),
            show_content: true,
            show_display: true,
        };

        let objects = self
            .source
            .get_owned_objects(&query)
            .await
            .with_context(|| format!("failed to fetch {struct_type} objects owned by {owner}"))?;

        let tokens: Vec<OwnedToken> = objects.iter().map(owned_token_from_raw).collect();

        info!(
            target: "nft_mint::owned",
            owner,
            objects = objects.len(),
            tokens = tokens.len(),
            "fetched owned objects"
        );
        Ok(tokens)
    }
}

/// Projects a raw object into an [`OwnedToken`].
///
/// Every entry yields a token. Entries without object data (the node reports
/// per-object errors that way) get no object id and the default fields.
pub fn owned_token_from_raw(raw: &RawObject) -> OwnedToken {
    if raw.data.is_none() {
        debug!(
            target: "nft_mint::owned",
            error = ?raw.error,
            "owned object entry without data, using defaults"
        );
    }

    let fields = extract_display_fields(raw);
    OwnedToken {
        object_id: raw.data.as_ref().map(|data| data.object_id.clone()),
        name: fields.name,
        description: fields.description,
        image_url: fields.url,
    }
}

/// Reads `name`, `description` and `url` from a Move object's fields.
///
/// Anything other than a Move object, and any missing, empty or non-string
/// field, resolves to the defaults.
pub fn extract_display_fields(raw: &RawObject) -> DisplayFields {
    let content = raw.data.as_ref().and_then(|data| data.content.as_ref());
    let Some(ObjectContent::MoveObject { fields, .. }) = content else {
        return DisplayFields::default();
    };

    let defaults = DisplayFields::default();
    DisplayFields {
        name: non_empty_str(fields, "name").unwrap_or(defaults.name),
        description: non_empty_str(fields, "description").unwrap_or(defaults.description),
        url: non_empty_str(fields, "url"),
    }
}

fn non_empty_str(fields: &Value, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
