//! Catalog record and reader trait.

use std::fmt;

use qdk_schemas::Money;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Product record
// ---------------------------------------------------------------------------

/// A catalog entry: one product priced for one city.
///
/// Unique per `(internal_id, city)`.  The same `internal_id` appears once
/// per city the business serves; `unit_price_*` are per-m² unit prices in
/// that city.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    /// Stable cross-city product code (what quotes reference).
    pub internal_id: String,
    pub city: String,
    pub title: String,
    pub category: String,
    pub unit_price_cash: Money,
    pub unit_price_installments: Money,
    /// Display/priority order inside a city listing; also the tie-breaker
    /// for the any-city resolution fallback.
    pub order: i32,
    pub active: bool,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors a [`CatalogReader`] implementation may return.
#[derive(Debug)]
pub enum CatalogError {
    /// The backing catalog could not be reached or answered malformed data.
    Backend(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Backend(msg) => write!(f, "catalog backend error: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

// ---------------------------------------------------------------------------
// Reader trait
// ---------------------------------------------------------------------------

/// Read-only catalog contract.
///
/// Implementations must be object-safe so callers can hold a
/// `Box<dyn CatalogReader>` / `Arc<dyn CatalogReader>` without knowing the
/// concrete type, and `Send + Sync` so a session task can share one.
pub trait CatalogReader: Send + Sync {
    /// The exact `(internal_id, city)` entry, active or not.
    /// `Ok(None)` when that city carries no entry for the code.
    fn get_product(&self, internal_id: &str, city: &str)
        -> Result<Option<Product>, CatalogError>;

    /// Active entries for one city, sorted by `(order, title)`.
    fn list_by_city(&self, city: &str) -> Result<Vec<Product>, CatalogError>;

    /// Every city's entry for one code, active or not, in no particular
    /// order; callers sort.
    fn list_by_code(&self, internal_id: &str) -> Result<Vec<Product>, CatalogError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal in-process mock that satisfies the trait for unit tests.
    struct MockCatalog {
        rows: Vec<Product>,
    }

    impl CatalogReader for MockCatalog {
        fn get_product(
            &self,
            internal_id: &str,
            city: &str,
        ) -> Result<Option<Product>, CatalogError> {
            Ok(self
                .rows
                .iter()
                .find(|p| p.internal_id == internal_id && p.city == city)
                .cloned())
        }

        fn list_by_city(&self, city: &str) -> Result<Vec<Product>, CatalogError> {
            let mut out: Vec<Product> = self
                .rows
                .iter()
                .filter(|p| p.city == city && p.active)
                .cloned()
                .collect();
            out.sort_by(|a, b| (a.order, &a.title).cmp(&(b.order, &b.title)));
            Ok(out)
        }

        fn list_by_code(&self, internal_id: &str) -> Result<Vec<Product>, CatalogError> {
            Ok(self
                .rows
                .iter()
                .filter(|p| p.internal_id == internal_id)
                .cloned()
                .collect())
        }
    }

    fn row(code: &str, city: &str, order: i32, active: bool) -> Product {
        Product {
            id: Uuid::new_v4(),
            internal_id: code.to_string(),
            city: city.to_string(),
            title: format!("{code} ({city})"),
            category: "turf".to_string(),
            unit_price_cash: Money::from_major(100),
            unit_price_installments: Money::from_major(120),
            order,
            active,
        }
    }

    #[test]
    fn get_product_is_exact_city_match() {
        let cat = MockCatalog {
            rows: vec![row("sod-50", "Mérida", 1, true)],
        };
        assert!(cat.get_product("sod-50", "Mérida").unwrap().is_some());
        assert!(cat.get_product("sod-50", "Cancún").unwrap().is_none());
    }

    #[test]
    fn list_by_city_filters_inactive_and_sorts() {
        let cat = MockCatalog {
            rows: vec![
                row("b", "Mérida", 2, true),
                row("a", "Mérida", 1, true),
                row("c", "Mérida", 0, false),
            ],
        };
        let listed = cat.list_by_city("Mérida").unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].internal_id, "a");
        assert_eq!(listed[1].internal_id, "b");
    }

    #[test]
    fn reader_is_object_safe_via_box() {
        // Compile-time proof: trait object can be constructed.
        let _c: Box<dyn CatalogReader> = Box::new(MockCatalog { rows: vec![] });
    }

    #[test]
    fn backend_error_display() {
        let err = CatalogError::Backend("connection refused".to_string());
        assert_eq!(err.to_string(), "catalog backend error: connection refused");
    }
}
