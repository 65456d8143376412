//! Scenario: Visibility Flips on Reassignment
//!
//! # Invariant under test
//! An editor's working set tracks visibility per event: a lead appears the
//! moment it becomes visible (assigned to them, or unassigned in their
//! city) and vanishes the moment it stops being visible — without a full
//! reload, purely from `Update` events passed through the same predicate
//! the snapshot used.

use chrono::Utc;
use qdk_lifecycle::create_from_funnel;
use qdk_reconcile::{ApplyOutcome, VisibleSet};
use qdk_schemas::{Actor, Quote, Role};
use qdk_store::ChangeEvent;
use qdk_testkit::{default_catalog, editor, funnel_submission, policy};
use uuid::Uuid;

fn quote_in(city: &str) -> Quote {
    let mut q = create_from_funnel(
        funnel_submission(city, 100.0),
        &default_catalog(),
        &policy(),
        Utc::now(),
    )
    .unwrap();
    q.version = 1;
    q
}

#[test]
fn cancun_editor_gains_then_loses_a_local_lead() {
    // The §8 walkthrough: an unassigned Cancún lead lands in the Cancún
    // editor's set on Insert, then an Update assigning it to someone else
    // removes it.
    let ed = editor("Cancún");
    let mut set = VisibleSet::new();

    let q = quote_in("Cancún");
    assert_eq!(
        set.apply(&ed, &ChangeEvent::insert(q.clone())),
        ApplyOutcome::Inserted
    );
    assert!(set.contains(&q.id));

    let mut taken = q.clone();
    taken.version = 2;
    taken.assigned_to = Some(Uuid::new_v4());
    assert_eq!(
        set.apply(&ed, &ChangeEvent::update(taken)),
        ApplyOutcome::Removed
    );
    assert!(!set.contains(&q.id));
}

#[test]
fn merida_editor_loses_foreign_quote_when_assigned_away() {
    // Held only through assignment: once the assignment moves elsewhere,
    // the foreign-city record has no remaining path into this scope.
    let ed = editor("Mérida");
    let mut set = VisibleSet::new();

    let mut q = quote_in("Cancún");
    q.assigned_to = Some(ed.id);
    set.seed(&ed, vec![q.clone()]);
    assert!(set.contains(&q.id));

    let mut reassigned = q.clone();
    reassigned.version = 2;
    reassigned.assigned_to = Some(Uuid::new_v4());
    assert_eq!(
        set.apply(&ed, &ChangeEvent::update(reassigned)),
        ApplyOutcome::Removed
    );
    assert!(!set.contains(&q.id));
}

#[test]
fn assignment_to_viewer_pulls_foreign_quote_in() {
    let ed = editor("Mérida");
    let mut set = VisibleSet::new();

    // A Cancún lead this editor has never seen.
    let q = quote_in("Cancún");
    assert_eq!(
        set.apply(&ed, &ChangeEvent::insert(q.clone())),
        ApplyOutcome::NotVisible
    );
    assert!(set.is_empty());

    let mut mine = q.clone();
    mine.version = 2;
    mine.assigned_to = Some(ed.id);
    assert_eq!(
        set.apply(&ed, &ChangeEvent::update(mine)),
        ApplyOutcome::Inserted
    );
    assert!(set.contains(&q.id));
}

#[test]
fn unassignment_returns_lead_to_its_city_queue() {
    let ed_merida = editor("Mérida");
    let ed_cancun = editor("Cancún");
    let mut merida_set = VisibleSet::new();
    let mut cancun_set = VisibleSet::new();

    // A Cancún lead assigned to the Mérida editor: visible to Mérida
    // (assignment), invisible to Cancún (assigned elsewhere).
    let mut q = quote_in("Cancún");
    q.assigned_to = Some(ed_merida.id);
    let ev = ChangeEvent::insert(q.clone());
    assert_eq!(merida_set.apply(&ed_merida, &ev), ApplyOutcome::Inserted);
    assert_eq!(cancun_set.apply(&ed_cancun, &ev), ApplyOutcome::NotVisible);

    // Unassigning flips it: out of the Mérida set, into the Cancún queue.
    let mut unassigned = q.clone();
    unassigned.version = 2;
    unassigned.assigned_to = None;
    let ev = ChangeEvent::update(unassigned);
    assert_eq!(merida_set.apply(&ed_merida, &ev), ApplyOutcome::Removed);
    assert_eq!(cancun_set.apply(&ed_cancun, &ev), ApplyOutcome::Inserted);
}

#[test]
fn global_viewer_is_unaffected_by_assignment_churn() {
    let viewer = Actor::new(Uuid::new_v4(), Role::Manager, qdk_schemas::CITY_ALL);
    let mut set = VisibleSet::new();

    let q = quote_in("Cancún");
    set.apply(&viewer, &ChangeEvent::insert(q.clone()));

    let mut churned = q.clone();
    for round in 0..4u64 {
        churned.version += 1;
        churned.assigned_to = if round % 2 == 0 {
            Some(Uuid::new_v4())
        } else {
            None
        };
        assert_eq!(
            set.apply(&viewer, &ChangeEvent::update(churned.clone())),
            ApplyOutcome::Replaced,
            "manager set must replace in place, never drop"
        );
    }
    assert_eq!(set.len(), 1);
}

#[test]
fn rescoped_actor_prunes_stale_holdings() {
    // Mid-session scope change: the same person moves from Mérida to
    // Cancún.  Held Mérida leads fall out via retain_visible; the fresh
    // snapshot (session layer) would bring Cancún's queue in.
    let before = editor("Mérida");
    let mut set = VisibleSet::new();
    set.seed(
        &before,
        vec![quote_in("Mérida"), quote_in("Mérida"), {
            let mut q = quote_in("Cancún");
            q.assigned_to = Some(before.id);
            q
        }],
    );
    assert_eq!(set.len(), 3);

    let after = Actor::new(before.id, Role::Editor, "Cancún");
    let dropped = set.retain_visible(&after);
    // The two unassigned Mérida leads leave; the assigned Cancún lead stays.
    assert_eq!(dropped, 2);
    assert_eq!(set.len(), 1);
}
