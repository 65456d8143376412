//! qdk-session
//!
//! Per-viewer session runtime: one tokio task owning one [`VisibleSet`],
//! fed by the change feed and by local mutation commands.
//!
//! # Concurrency model
//!
//! Event handling and local mutations are serialized through a single
//! `select!` loop — the loop task is the **only** writer of the visible
//! set.  This is the intended design, not a limitation: a second writer
//! would reintroduce the read-modify-write races the serialization exists
//! to prevent.  Sessions are independent of each other; the store is the
//! only state they share.
//!
//! # Optimistic mutation
//!
//! A mutation is validated by the lifecycle engine, written to the store,
//! and the committed record is applied to the visible set immediately
//! ("fire, then trust the echo").  The authoritative echo arriving later
//! through the feed carries the same version and is discarded by the
//! reconcile watermark — convergence does not depend on which copy lands
//! first.
//!
//! [`VisibleSet`]: qdk_reconcile::VisibleSet

mod session;

pub use session::{SessionError, SessionHandle, ViewerSession};
