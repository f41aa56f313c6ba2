//! Client configuration.
//!
//! The package id is the only required value; everything else has a default
//! matching the behaviour of the public testnet deployment.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_EXPLORER_URL: &str = "https://testnet.suivision.xyz";
pub const DEFAULT_MODULE: &str = "nft";
pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const DEFAULT_MAX_EVENTS: usize = 1000;
pub const DEFAULT_REFRESH_DELAY_MS: u64 = 2000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("package id is empty")]
    EmptyPackageId,
    #[error("package id '{0}' is not a 0x-prefixed hex address")]
    InvalidPackageId(String),
    #[error("event page size must be greater than zero")]
    ZeroPageSize,
    #[error("event ceiling must be greater than zero")]
    ZeroMaxEvents,
    #[error("invalid explorer url '{url}': {reason}")]
    InvalidExplorerUrl { url: String, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct NftConfig {
    /// Address of the published package holding the NFT module.
    pub package_id: String,
    /// Module name inside the package.
    #[serde(default = "default_module")]
    pub module: String,
    /// Base of transaction links, without trailing slash.
    #[serde(default = "default_explorer_url")]
    pub explorer_url: String,
    /// Events requested per `queryEvents` call.
    #[serde(default = "default_page_size")]
    pub event_page_size: usize,
    /// Aggregation stops at the first page boundary past this count.
    #[serde(default = "default_max_events")]
    pub max_events: usize,
    /// Delay before re-reading events after a mint, to let the indexer catch up.
    #[serde(default = "default_refresh_delay_ms")]
    pub refresh_delay_ms: u64,
}

fn default_module() -> String {
    DEFAULT_MODULE.to_string()
}

fn default_explorer_url() -> String {
    DEFAULT_EXPLORER_URL.to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_max_events() -> usize {
    DEFAULT_MAX_EVENTS
}

fn default_refresh_delay_ms() -> u64 {
    DEFAULT_REFRESH_DELAY_MS
}

impl NftConfig {
    pub fn new(package_id: impl Into<String>) -> Self {
        Self {
            package_id: package_id.into(),
            module: default_module(),
            explorer_url: default_explorer_url(),
            event_page_size: DEFAULT_PAGE_SIZE,
            max_events: DEFAULT_MAX_EVENTS,
            refresh_delay_ms: DEFAULT_REFRESH_DELAY_MS,
        }
    }

    pub fn with_explorer_url(mut self, url: impl Into<String>) -> Self {
        self.explorer_url = url.into();
        self
    }

    pub fn with_event_page_size(mut self, page_size: usize) -> Self {
        self.event_page_size = page_size;
        self
    }

    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events;
        self
    }

    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let id = self.package_id.trim();
        if id.is_empty() {
            return Err(ConfigError::EmptyPackageId);
        }
        let hex_part = id
            .strip_prefix("0x")
            .ok_or_else(|| ConfigError::InvalidPackageId(id.to_string()))?;
        if hex_part.is_empty() || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::InvalidPackageId(id.to_string()));
        }
        if self.event_page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.max_events == 0 {
            return Err(ConfigError::ZeroMaxEvents);
        }
        Url::parse(&self.explorer_url).map_err(|e| ConfigError::InvalidExplorerUrl {
            url: self.explorer_url.clone(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }

    /// `<package>::nft::NFTMinted`
    pub fn event_type(&self) -> String {
        format!("{}::{}::NFTMinted", self.package_id, self.module)
    }

    /// `<package>::nft::NFT`
    pub fn nft_type(&self) -> String {
        format!("{}::{}::NFT", self.package_id, self.module)
    }

    /// `<package>::nft::mint_to_sender`
    pub fn mint_target(&self) -> String {
        format!("{}::{}::mint_to_sender", self.package_id, self.module)
    }

    /// Human-readable link for a transaction digest.
    pub fn explorer_url(&self, digest: &str) -> String {
        format!("{}/txblock/{digest}", self.explorer_url.trim_end_matches('/'))
    }
}
