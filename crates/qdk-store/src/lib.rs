//! qdk-store
//!
//! Storage and change-feed boundaries for the quote desk.
//!
//! This crate defines **only** the traits and the event/filter types.  No
//! concrete storage, no transport: the testkit carries an in-memory
//! implementation, production adapters live outside the core.
//!
//! Contract highlights:
//! - `QuoteStore::write` is atomic per record and accepts only whole
//!   validated records produced by the lifecycle engine — there is no
//!   field-patch path to storage, which is what makes "fields plus
//!   recomputed totals commit or nothing" enforceable.
//! - `ChangeFeed` delivers events in commit order **per record** (no
//!   cross-record ordering), at least once.  Consumers deduplicate by the
//!   record version carried on every event.

mod feed;
mod store;

pub use feed::{ChangeEvent, ChangeFeed, ChangeKind};
pub use store::{QuoteStore, ScopeFilter, StoreError};
