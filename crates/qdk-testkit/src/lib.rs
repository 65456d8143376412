//! qdk-testkit
//!
//! In-memory fakes and fixtures for exercising the quote-desk core without
//! a database or transport.  The fakes honor the same contracts production
//! adapters must: per-record event ordering, store-assigned versions,
//! atomic per-record writes.
//!
//! The `tests/` directory of this crate holds the cross-crate scenario
//! suite; each file names the invariant it proves.

mod fixtures;
mod memory_catalog;
mod memory_store;

pub use fixtures::{
    admin, default_catalog, editor, funnel_submission, manager, manual_draft, policy, product,
};
pub use memory_catalog::MemoryCatalog;
pub use memory_store::MemoryStore;
