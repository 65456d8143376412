use qdk_schemas::Quote;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// What happened to a record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// One authoritative change, as published by the store after a commit.
///
/// `version` is the committed record version — the deduplication key for
/// at-least-once delivery.  `snapshot` carries the full committed record
/// for `Insert`/`Update`; a feed is free to omit it (`None`), in which case
/// the consumer refetches from the store.  `Delete` events never carry a
/// snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub quote_id: Uuid,
    pub version: u64,
    pub snapshot: Option<Quote>,
}

impl ChangeEvent {
    pub fn insert(quote: Quote) -> Self {
        Self {
            kind: ChangeKind::Insert,
            quote_id: quote.id,
            version: quote.version,
            snapshot: Some(quote),
        }
    }

    pub fn update(quote: Quote) -> Self {
        Self {
            kind: ChangeKind::Update,
            quote_id: quote.id,
            version: quote.version,
            snapshot: Some(quote),
        }
    }

    pub fn delete(quote_id: Uuid, version: u64) -> Self {
        Self {
            kind: ChangeKind::Delete,
            quote_id,
            version,
            snapshot: None,
        }
    }
}

/// Change-feed contract.
///
/// Guarantees required of implementations:
/// - events for the **same** `quote_id` arrive in commit order;
/// - delivery is at-least-once (duplicates allowed, consumers dedupe by
///   `version`);
/// - no ordering across different `quote_id`s is promised.
///
/// A `tokio::sync::broadcast` receiver fans one committed stream out to
/// every viewer session.  Lag (`RecvError::Lagged`) means delivery was
/// missed, not reordered; consumers resync from a fresh snapshot.
pub trait ChangeFeed: Send + Sync {
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}
