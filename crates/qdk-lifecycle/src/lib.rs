//! qdk-lifecycle
//!
//! Funnel state machine and role-gated mutation engine for quotes.
//!
//! # Invariants
//!
//! - **Single decision table**: every permission/status rule lives in
//!   [`apply_mutation`]; callers never re-implement role checks.
//! - **All-or-nothing**: a mutation either yields a fully validated record
//!   (edited fields plus recomputed totals) or an error with nothing
//!   applied.  Partial application does not exist.
//! - **Forward funnel**: `New → Contacted → SiteVisit → Closed`; only
//!   admin/manager may move a quote backward or re-open a closed one.
//! - **Editor lock**: once a quote leaves `New`, every editor mutation
//!   fails — there is no field that bypasses the lock.
//! - **Totals are derived**: any patch touching a pricing input triggers a
//!   recompute before the result is considered valid; the patch type has no
//!   slot for totals.
//!
//! All logic is pure deterministic — no IO, no clock (creation ops take
//! `now` from the caller), no ambient session state.

mod create;
mod engine;
mod error;

pub use create::{create_from_funnel, create_manual, FunnelSubmission, ManualDraft};
pub use engine::apply_mutation;
pub use error::{MutationError, PermissionReason, ValidationReason};
