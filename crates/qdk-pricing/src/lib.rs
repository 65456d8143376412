//! qdk-pricing
//!
//! Pricing engine for the quote desk.
//!
//! # Invariants
//!
//! - **Pure, synchronous, non-suspending**: no IO, no clock, no randomness.
//!   Safe to run inline during optimistic updates and event reconciliation.
//! - **Both modes always**: cash and installments totals are computed on
//!   every call so the billed mode can be switched without data loss.
//! - **One canonical order**: override → raw → round-to-whole-unit → floor →
//!   logistics → tax.  The floor cannot be defeated by logistics (added
//!   after), and tax applies to the floored-plus-logistics amount, never to
//!   the pre-floor raw price.
//! - **Area gate**: `area <= 0` (or non-finite) produces zero totals — the
//!   "not yet quotable" signal — with no floor, logistics or tax applied.
//!
//! Product resolution is the caller's concern; this engine prices against an
//! already-resolved catalog entry.

mod engine;

pub use engine::{compute_for_quote, compute_totals, QuoteTotals};
