//! Capabilities the client core consumes.
//!
//! The node and the wallet are external collaborators. Everything in this
//! crate talks to them through these traits, so tests and alternative
//! transports substitute freely.

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{EventPage, EventQuery, ExecutionResult, MoveCall, OwnedObjectsQuery, RawObject};

/// Paginated access to emitted events.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch one page of events matching `query`.
    ///
    /// Implementations do not keep pagination state: the cursor travels in the
    /// query and comes back in [`EventPage::next_cursor`].
    async fn query_events(&self, query: &EventQuery) -> Result<EventPage>;
}

/// Lookup of objects held by an address.
#[async_trait]
pub trait ObjectSource: Send + Sync {
    async fn get_owned_objects(&self, query: &OwnedObjectsQuery) -> Result<Vec<RawObject>>;
}

/// A connected wallet able to sign and submit transactions.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Address of the connected account, `None` when disconnected.
    fn active_address(&self) -> Option<String>;

    /// Sign `call` with the active account and execute it. One attempt, no retry.
    async fn sign_and_execute(&self, call: &MoveCall) -> Result<ExecutionResult>;
}
