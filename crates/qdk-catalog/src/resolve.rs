//! City-fallback product resolution.
//!
//! A quote references a product by its cross-city code; the entry actually
//! priced against is resolved at compute time:
//!
//! 1. the **quote's own city**, when it carries an active entry;
//! 2. else the **base city** (the catalog's designated reference city);
//! 3. else **any** city carrying an active entry for the code, picking the
//!    lowest `(order, city)` pair so resolution is deterministic;
//! 4. else the product is unresolvable and the caller must not persist a
//!    price.

use std::fmt;

use crate::{CatalogError, CatalogReader, Product};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ResolveError {
    /// No active catalog entry exists for the code in any city.
    UnknownProduct { internal_id: String, city: String },
    /// The catalog itself failed; distinct from "looked and found nothing".
    Backend(CatalogError),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::UnknownProduct { internal_id, city } => write!(
                f,
                "product {internal_id:?} unresolvable for city {city:?} (no active entry anywhere)"
            ),
            ResolveError::Backend(e) => write!(f, "product resolution failed: {e}"),
        }
    }
}

impl std::error::Error for ResolveError {}

impl From<CatalogError> for ResolveError {
    fn from(e: CatalogError) -> Self {
        ResolveError::Backend(e)
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve the catalog entry a quote is priced against.  See the module
/// header for the fallback order.
pub fn resolve_product(
    catalog: &dyn CatalogReader,
    internal_id: &str,
    city: &str,
    base_city: &str,
) -> Result<Product, ResolveError> {
    if let Some(p) = catalog.get_product(internal_id, city)? {
        if p.active {
            return Ok(p);
        }
    }

    if city != base_city {
        if let Some(p) = catalog.get_product(internal_id, base_city)? {
            if p.active {
                return Ok(p);
            }
        }
    }

    let mut candidates: Vec<Product> = catalog
        .list_by_code(internal_id)?
        .into_iter()
        .filter(|p| p.active)
        .collect();
    candidates.sort_by(|a, b| (a.order, &a.city).cmp(&(b.order, &b.city)));

    candidates
        .into_iter()
        .next()
        .ok_or_else(|| ResolveError::UnknownProduct {
            internal_id: internal_id.to_string(),
            city: city.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use qdk_schemas::Money;
    use uuid::Uuid;

    struct TableCatalog {
        rows: Vec<Product>,
    }

    impl CatalogReader for TableCatalog {
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
            Ok(self
                .rows
                .iter()
                .filter(|p| p.city == city && p.active)
                .cloned()
                .collect())
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

    fn row(code: &str, city: &str, cash_major: i64, order: i32, active: bool) -> Product {
        Product {
            id: Uuid::new_v4(),
            internal_id: code.to_string(),
            city: city.to_string(),
            title: code.to_string(),
            category: "turf".to_string(),
            unit_price_cash: Money::from_major(cash_major),
            unit_price_installments: Money::from_major(cash_major + 20),
            order,
            active,
        }
    }

    #[test]
    fn own_city_entry_wins() {
        let cat = TableCatalog {
            rows: vec![
                row("sod-50", "Cancún", 110, 1, true),
                row("sod-50", "Mérida", 100, 1, true),
            ],
        };
        let p = resolve_product(&cat, "sod-50", "Cancún", "Mérida").unwrap();
        assert_eq!(p.city, "Cancún");
        assert_eq!(p.unit_price_cash, Money::from_major(110));
    }

    #[test]
    fn falls_back_to_base_city() {
        let cat = TableCatalog {
            rows: vec![row("sod-50", "Mérida", 100, 1, true)],
        };
        let p = resolve_product(&cat, "sod-50", "Cancún", "Mérida").unwrap();
        assert_eq!(p.city, "Mérida");
    }

    #[test]
    fn inactive_own_city_entry_falls_through() {
        let cat = TableCatalog {
            rows: vec![
                row("sod-50", "Cancún", 110, 1, false),
                row("sod-50", "Mérida", 100, 1, true),
            ],
        };
        let p = resolve_product(&cat, "sod-50", "Cancún", "Mérida").unwrap();
        assert_eq!(p.city, "Mérida");
    }

    #[test]
    fn any_city_fallback_is_deterministic() {
        let cat = TableCatalog {
            rows: vec![
                row("sod-50", "Tulum", 90, 2, true),
                row("sod-50", "Playa del Carmen", 95, 1, true),
            ],
        };
        // Neither the quote city nor the base city carries the code; the
        // lowest (order, city) active entry is picked.
        let p = resolve_product(&cat, "sod-50", "Cancún", "Mérida").unwrap();
        assert_eq!(p.city, "Playa del Carmen");
    }

    #[test]
    fn no_entry_anywhere_is_unresolvable() {
        let cat = TableCatalog { rows: vec![] };
        let err = resolve_product(&cat, "sod-50", "Cancún", "Mérida").unwrap_err();
        match err {
            ResolveError::UnknownProduct { internal_id, city } => {
                assert_eq!(internal_id, "sod-50");
                assert_eq!(city, "Cancún");
            }
            other => panic!("expected UnknownProduct, got {other:?}"),
        }
    }

    #[test]
    fn all_entries_inactive_is_unresolvable() {
        let cat = TableCatalog {
            rows: vec![
                row("sod-50", "Mérida", 100, 1, false),
                row("sod-50", "Cancún", 110, 1, false),
            ],
        };
        assert!(resolve_product(&cat, "sod-50", "Cancún", "Mérida").is_err());
    }
}
