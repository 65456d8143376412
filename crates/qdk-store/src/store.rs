use std::fmt;

use async_trait::async_trait;
use qdk_schemas::{Actor, Quote, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors a [`QuoteStore`] implementation may return.
#[derive(Debug)]
pub enum StoreError {
    /// The record does not exist (writes against unknown ids).
    NotFound(Uuid),
    /// The backing store could not be reached or failed mid-operation.
    /// During event handling this is the transient-read case: the session
    /// layer logs and drops, it never halts the stream.
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "quote {id} not found"),
            StoreError::Backend(msg) => write!(f, "store backend error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

// ---------------------------------------------------------------------------
// Snapshot scope
// ---------------------------------------------------------------------------

/// Which slice of the quote table a snapshot query covers.
///
/// Derived from an [`Actor`]; the same predicate the reconciliation layer
/// applies per event, expressed as a query filter for the initial fetch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeFilter {
    /// Admin/manager: the whole table.
    All,
    /// Editor: own-city unassigned quotes plus quotes assigned to them.
    Editor { actor_id: Uuid, city: String },
}

impl ScopeFilter {
    pub fn for_actor(actor: &Actor) -> Self {
        match actor.role {
            Role::Admin | Role::Manager => ScopeFilter::All,
            Role::Editor => ScopeFilter::Editor {
                actor_id: actor.id,
                city: actor.city.clone(),
            },
        }
    }

    pub fn matches(&self, quote: &Quote) -> bool {
        match self {
            ScopeFilter::All => true,
            ScopeFilter::Editor { actor_id, city } => {
                quote.assigned_to == Some(*actor_id)
                    || (quote.assigned_to.is_none() && &quote.location.city == city)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// Persistent quote storage contract.
///
/// Implementations must be `Send + Sync`; sessions share one behind an
/// `Arc<dyn QuoteStore>`.  Writes are atomic per record; the store owns the
/// `version` counter and bumps it on every successful insert/write, then
/// publishes the committed record on the paired change feed.
#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// `Ok(None)` when the record does not exist.
    async fn read(&self, id: Uuid) -> Result<Option<Quote>, StoreError>;

    /// Persist a new record.  Assigns `version = 1` and publishes an
    /// `Insert` event.  Returns the committed record.
    async fn insert(&self, quote: Quote) -> Result<Quote, StoreError>;

    /// Replace a record with a validated successor.  Bumps `version` and
    /// publishes an `Update` event.  Returns the committed record.
    async fn write(&self, id: Uuid, updated: Quote) -> Result<Quote, StoreError>;

    /// The initial working-set fetch for a viewer session.
    async fn query_snapshot(&self, scope: &ScopeFilter) -> Result<Vec<Quote>, StoreError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
