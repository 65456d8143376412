//! qdk-reconcile
//!
//! Per-viewer visible-set reconciliation.
//!
//! Architectural decisions:
//! - Every event passes the same visibility predicate as the initial
//!   snapshot; visibility is re-derived per event, never cached.
//! - Duplicate / out-of-date deliveries are discarded by a per-record
//!   version watermark; applying the same event twice is a no-op.
//! - Watermarks survive removal (tombstones) so a redelivered pre-delete
//!   event cannot resurrect a deleted record.
//! - Records are keyed by id, not list position: an update replaces in
//!   place and viewer-local state keyed on the id survives.
//!
//! Deterministic, pure logic. No IO. No store calls. The session layer
//! resolves event snapshots (refetching when the feed omits them) before
//! handing events to this crate.

mod set;
mod visibility;

pub use set::{ApplyOutcome, VisibleSet};
pub use visibility::visible;
