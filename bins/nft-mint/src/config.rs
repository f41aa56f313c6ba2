//! Command line configuration for the nft-mint client

use std::time::Duration;

use clap::{Parser, Subcommand};
use nft_mint::config::{
    DEFAULT_PAGE_SIZE, DEFAULT_EXPLORER_URL, DEFAULT_MAX_EVENTS, DEFAULT_REFRESH_DELAY_MS,
};
use nft_mint::{ConfigError, NftConfig};
use nft_mint_rpc::{Network, SuiRpcConfig};

/// Mint and browse NFTs of a Sui Move package
///
/// Reads `NFTMinted` events and owned NFTs from a fullnode, builds encoded
/// mint calls and serves the feed over HTTP.
#[derive(Parser, Debug)]
#[command(name = "nft-mint")]
#[command(about = "Mint and browse NFTs of a Sui Move package", long_about = None)]
pub struct Config {
    /// Package that publishes the `nft` module
    #[arg(long, env = "NFT_PACKAGE_ID")]
    pub package_id: String,

    /// Fullnode JSON-RPC URL. Overrides --network.
    #[arg(long, env = "SUI_RPC_URL")]
    pub rpc_url: Option<String>,

    /// Public fullnode to use when no RPC URL is given
    #[arg(long, default_value = "testnet")]
    pub network: Network,

    /// RPC request timeout in milliseconds
    #[arg(long)]
    pub rpc_timeout_ms: Option<u64>,

    /// Block explorer base URL for transaction links
    #[arg(long, env = "NFT_EXPLORER_URL", default_value = DEFAULT_EXPLORER_URL)]
    pub explorer_url: String,

    /// Events requested per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Stop paginating once more than this many events were collected
    #[arg(long, default_value_t = DEFAULT_MAX_EVENTS)]
    pub max_events: usize,

    /// Delay before the event feed is re-read after a mint, in milliseconds
    #[arg(long, default_value_t = DEFAULT_REFRESH_DELAY_MS)]
    pub refresh_delay_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every minted event, newest first
    Events {
        /// Print a table with local-time timestamps instead of JSON
        #[arg(long)]
        local_time: bool,
    },
    /// Print the NFTs held by an address
    Owned {
        #[arg(long)]
        owner: String,
    },
    /// Length-prefix encode a field and print it as hex
    Encode { value: String },
    /// Decode a hex encoded field
    Decode { hex: String },
    /// Validate and encode a mint, printing the resulting Move call
    MintCall {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        image_url: String,
    },
    /// Print the explorer link of a transaction
    Explorer { digest: String },
    /// Serve the feed over HTTP
    Serve {
        /// Port for the HTTP API
        #[arg(long, default_value = "3000")]
        port: u16,
    },
}

impl Config {
    pub fn nft_config(&self) -> Result<NftConfig, ConfigError> {
        let config = NftConfig::new(&self.package_id)
            .with_explorer_url(&self.explorer_url)
            .with_event_page_size(self.page_size)
            .with_max_events(self.max_events)
            .with_refresh_delay(Duration::from_millis(self.refresh_delay_ms));
        config.validate()?;
        Ok(config)
    }

    pub fn rpc_config(&self) -> SuiRpcConfig {
        let mut rpc = match &self.rpc_url {
            Some(url) => SuiRpcConfig::new(url),
            None => SuiRpcConfig::for_network(self.network),
        };
        rpc.timeout_ms = self.rpc_timeout_ms;
        rpc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mint_call() {
        let config = Config::parse_from([
            "nft-mint",
            "--package-id",
            "0xabc",
            "mint-call",
            "--name",
            "Dragon",
            "--description",
            "Breathes fire",
            "--image-url",
            "https://x.io/d.png",
        ]);

        assert!(matches!(config.command, Command::MintCall { .. }));
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.nft_config().unwrap().mint_target(), "0xabc::nft::mint_to_sender");
    }

    #[test]
    fn test_rpc_url_overrides_network() {
        let config = Config::parse_from([
            "nft-mint",
            "--package-id",
            "0xabc",
            "--network",
            "devnet",
            "--rpc-url",
            "http://127.0.0.1:9000",
            "explorer",
            "abc",
        ]);
        assert_eq!(config.rpc_config().rpc_url, "http://127.0.0.1:9000");

        let config = Config::parse_from(["nft-mint", "--package-id", "0xabc", "explorer", "abc"]);
        assert_eq!(config.rpc_config().rpc_url, Network::Testnet.rpc_url());
    }

    #[test]
    fn test_rejects_bad_package() {
        let config = Config::parse_from(["nft-mint", "--package-id", "abc", "explorer", "d"]);
        assert!(config.nft_config().is_err());
    }
}
