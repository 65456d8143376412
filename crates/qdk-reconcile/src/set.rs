use std::collections::BTreeMap;

use qdk_schemas::{Actor, Quote};
use qdk_store::{ChangeEvent, ChangeKind};
use uuid::Uuid;

use crate::visibility::visible;

// ---------------------------------------------------------------------------
// Apply outcome
// ---------------------------------------------------------------------------

/// What applying one event did to the set.  Deterministic and side-effect
/// free beyond the set itself; the session layer decides what to log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Record became visible and was added.
    Inserted,
    /// Record was already held and its content was replaced in place.
    Replaced,
    /// Record was held and is no longer visible (or was deleted).
    Removed,
    /// Record is not visible to this viewer; nothing held, nothing added.
    NotVisible,
    /// `Insert` for a record already held — ignored, content untouched.
    AlreadyPresent,
    /// `Delete` for a record not held.
    AbsentNoop,
    /// Event version is at or below the watermark — duplicate or
    /// out-of-date delivery, discarded.
    Stale { held: u64, got: u64 },
    /// `Insert`/`Update` without a snapshot payload; the caller must
    /// refetch and re-apply.  The watermark is NOT advanced.
    MissingSnapshot,
}

impl ApplyOutcome {
    /// `true` when the visible set's content changed.
    pub fn changed_set(&self) -> bool {
        matches!(
            self,
            ApplyOutcome::Inserted | ApplyOutcome::Replaced | ApplyOutcome::Removed
        )
    }

    /// `true` when the event was dropped as a duplicate/out-of-date.
    pub fn is_stale(&self) -> bool {
        matches!(self, ApplyOutcome::Stale { .. })
    }
}

// ---------------------------------------------------------------------------
// Visible set
// ---------------------------------------------------------------------------

/// One viewer's working set of quotes, converging on the authoritative
/// store state as change events arrive.
///
/// # Watermarks
///
/// `watermarks` holds the highest version applied per record id and is
/// retained after removal: a record deleted at version 5 keeps its
/// tombstone, so an at-least-once redelivery of the version-4 update cannot
/// resurrect it.  A watermark advances only when an event is actually
/// applied (not on `MissingSnapshot`).
#[derive(Clone, Debug, Default)]
pub struct VisibleSet {
    quotes: BTreeMap<Uuid, Quote>,
    watermarks: BTreeMap<Uuid, u64>,
}

impl VisibleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the set from an initial snapshot, discarding any previous
    /// state.  The snapshot is re-filtered through the visibility predicate
    /// even when the query was already scoped — the predicate is the single
    /// source of truth.
    pub fn seed(&mut self, actor: &Actor, snapshot: Vec<Quote>) {
        self.quotes.clear();
        self.watermarks.clear();
        for q in snapshot {
            if visible(&q, actor) {
                self.watermarks.insert(q.id, q.version);
                self.quotes.insert(q.id, q);
            }
        }
    }

    /// Apply one change event.  Pure with respect to everything but the
    /// set; never fails, every degenerate case maps to an outcome.
    pub fn apply(&mut self, actor: &Actor, event: &ChangeEvent) -> ApplyOutcome {
        if let Some(&held) = self.watermarks.get(&event.quote_id) {
            if event.version <= held {
                return ApplyOutcome::Stale {
                    held,
                    got: event.version,
                };
            }
        }

        match event.kind {
            ChangeKind::Delete => {
                self.watermarks.insert(event.quote_id, event.version);
                if self.quotes.remove(&event.quote_id).is_some() {
                    ApplyOutcome::Removed
                } else {
                    ApplyOutcome::AbsentNoop
                }
            }
            ChangeKind::Insert | ChangeKind::Update => {
                let Some(snapshot) = &event.snapshot else {
                    return ApplyOutcome::MissingSnapshot;
                };
                self.watermarks.insert(event.quote_id, event.version);

                let is_insert = event.kind == ChangeKind::Insert;
                let is_visible = visible(snapshot, actor);
                let present = self.quotes.contains_key(&event.quote_id);

                match (is_insert, is_visible, present) {
                    (true, true, false) => {
                        self.quotes.insert(event.quote_id, snapshot.clone());
                        ApplyOutcome::Inserted
                    }
                    (true, true, true) => ApplyOutcome::AlreadyPresent,
                    (true, false, _) => ApplyOutcome::NotVisible,

                    // "Just assigned to me" / "my city's queue gained a lead".
                    (false, true, false) => {
                        self.quotes.insert(event.quote_id, snapshot.clone());
                        ApplyOutcome::Inserted
                    }
                    // Replace in place, keyed by id.
                    (false, true, true) => {
                        self.quotes.insert(event.quote_id, snapshot.clone());
                        ApplyOutcome::Replaced
                    }
                    // "Just assigned away from me".
                    (false, false, true) => {
                        self.quotes.remove(&event.quote_id);
                        ApplyOutcome::Removed
                    }
                    (false, false, false) => ApplyOutcome::NotVisible,
                }
            }
        }
    }

    /// Drop every held record the actor can no longer see.  Used after an
    /// actor scope change; records that *became* visible need a fresh
    /// snapshot, which is the session layer's job.
    pub fn retain_visible(&mut self, actor: &Actor) -> usize {
        let before = self.quotes.len();
        self.quotes.retain(|_, q| visible(q, actor));
        before - self.quotes.len()
    }

    pub fn get(&self, id: &Uuid) -> Option<&Quote> {
        self.quotes.get(id)
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.quotes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Held records in stable id order.
    pub fn iter(&self) -> impl Iterator<Item = &Quote> {
        self.quotes.values()
    }

    /// The watermark for a record, if any event or seed has touched it.
    pub fn watermark(&self, id: &Uuid) -> Option<u64> {
        self.watermarks.get(id).copied()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
