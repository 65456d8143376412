//! qdk-schemas
//!
//! Shared record types for the quote desk: the `Quote` lead record, the
//! `Actor` identity passed explicitly into every core operation, the funnel
//! status enum, and the field-patch type used by the lifecycle engine.
//!
//! Invariants encoded here structurally:
//! - `QuotePatch` has no fields for `total_cash` / `total_installments`,
//!   `version`, `out_of_zone`, `is_manual` or `created_at` — derived and
//!   creation-time values cannot be hand-edited through any patch path.
//! - `QuoteStatus` derives `Ord` in funnel order so "forward" and
//!   "regression" are plain comparisons.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod money;

pub use money::{Money, MAJOR_SCALE};

/// City sentinel carried by admin/manager actors: global scope, all cities.
pub const CITY_ALL: &str = "All";

// ---------------------------------------------------------------------------
// Actors & roles
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Editor,
}

impl Role {
    /// Admin and manager see every city; editors are scoped to exactly one.
    pub fn has_global_scope(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

/// A staff identity. Passed explicitly into every core operation — there is
/// no ambient session lookup anywhere below the session layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
    /// `CITY_ALL` for admin/manager; the scoped city for editors.
    pub city: String,
}

impl Actor {
    pub fn new(id: Uuid, role: Role, city: impl Into<String>) -> Self {
        Self {
            id,
            role,
            city: city.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Funnel status
// ---------------------------------------------------------------------------

/// Funnel position of a quote.  Variant order is funnel order; the derived
/// `Ord` is what "moves forward" means.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    New,
    Contacted,
    SiteVisit,
    Closed,
}

impl QuoteStatus {
    /// Terminal for the normal flow; admin/manager may still re-open.
    pub fn is_terminal(self) -> bool {
        matches!(self, QuoteStatus::Closed)
    }

    /// `true` when moving from `prev` to `self` walks the funnel backward.
    pub fn is_regression_from(self, prev: QuoteStatus) -> bool {
        self < prev
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    Cash,
    Installments,
}

// ---------------------------------------------------------------------------
// Quote record
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteLocation {
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub maps_link: Option<String>,
}

/// A sales lead with measurement, pricing and funnel position.
///
/// `total_cash` / `total_installments` are derived by the pricing engine
/// from the other fields; no code path outside it writes them.  `version`
/// is assigned and bumped by the store, monotonic per record — it is the
/// key the reconciliation layer uses to discard duplicate deliveries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: Uuid,
    pub version: u64,

    pub contact: Contact,
    pub location: SiteLocation,

    /// Measured area in m².  Non-negative; zero means "not yet quotable".
    pub area_m2: f64,
    /// Catalog internal code; resolved against the quote's city with
    /// fallback to the base city.
    pub product_code: String,
    pub pricing_mode: PricingMode,
    /// Admin-set override; when present it replaces the catalog unit price
    /// for both payment modes.
    pub manual_unit_price: Option<Money>,
    /// Independent surcharge, added after the minimum-price floor.
    pub logistics_cost: Money,
    /// Invoice requested — applies the tax multiplier.
    pub requires_invoice: bool,

    pub total_cash: Money,
    pub total_installments: Money,

    pub status: QuoteStatus,
    pub assigned_to: Option<Uuid>,
    /// Set once: the first actor to save a previously-unowned draft.
    pub created_by: Option<Uuid>,

    pub out_of_zone: bool,
    pub is_manual: bool,

    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl Quote {
    /// The total actually billed under the quote's current pricing mode.
    /// Both totals are always stored so the mode can be switched later
    /// without recomputation from scratch.
    pub fn billed_total(&self) -> Money {
        match self.pricing_mode {
            PricingMode::Cash => self.total_cash,
            PricingMode::Installments => self.total_installments,
        }
    }
}

// ---------------------------------------------------------------------------
// Field patch
// ---------------------------------------------------------------------------

/// A partial edit to a quote.  `None` leaves a field untouched; for fields
/// whose target is itself nullable, `Some(None)` clears the value.
///
/// Derived totals, `version`, and creation-time fields have no patch slot —
/// the type is the enforcement.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotePatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Option<String>>,

    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub maps_link: Option<Option<String>>,

    pub area_m2: Option<f64>,
    pub product_code: Option<String>,
    pub pricing_mode: Option<PricingMode>,
    pub manual_unit_price: Option<Option<Money>>,
    pub logistics_cost: Option<Money>,
    pub requires_invoice: Option<bool>,

    pub status: Option<QuoteStatus>,
    pub assigned_to: Option<Option<Uuid>>,
    /// Claim slot: honored only while the quote's `created_by` is null.
    pub created_by: Option<Uuid>,

    pub notes: Option<String>,
}

impl QuotePatch {
    /// `true` when the patch touches any input of the pricing computation,
    /// which obliges the lifecycle engine to recompute both totals before
    /// the write.
    pub fn touches_pricing(&self) -> bool {
        self.area_m2.is_some()
            || self.product_code.is_some()
            || self.pricing_mode.is_some()
            || self.manual_unit_price.is_some()
            || self.logistics_cost.is_some()
            || self.requires_invoice.is_some()
    }

    /// `true` when the patch changes nothing at all.
    pub fn is_empty(&self) -> bool {
        self == &QuotePatch::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_order_matches_funnel_order() {
        assert!(QuoteStatus::New < QuoteStatus::Contacted);
        assert!(QuoteStatus::Contacted < QuoteStatus::SiteVisit);
        assert!(QuoteStatus::SiteVisit < QuoteStatus::Closed);
    }

    #[test]
    fn regression_is_a_plain_comparison() {
        assert!(QuoteStatus::New.is_regression_from(QuoteStatus::Closed));
        assert!(!QuoteStatus::Closed.is_regression_from(QuoteStatus::Closed));
        assert!(!QuoteStatus::SiteVisit.is_regression_from(QuoteStatus::Contacted));
    }

    #[test]
    fn only_closed_is_terminal() {
        assert!(QuoteStatus::Closed.is_terminal());
        assert!(!QuoteStatus::New.is_terminal());
        assert!(!QuoteStatus::SiteVisit.is_terminal());
    }

    #[test]
    fn global_scope_roles() {
        assert!(Role::Admin.has_global_scope());
        assert!(Role::Manager.has_global_scope());
        assert!(!Role::Editor.has_global_scope());
    }

    #[test]
    fn default_patch_is_empty_and_touches_nothing() {
        let p = QuotePatch::default();
        assert!(p.is_empty());
        assert!(!p.touches_pricing());
    }

    #[test]
    fn pricing_inputs_flag_recompute() {
        for p in [
            QuotePatch {
                area_m2: Some(12.5),
                ..Default::default()
            },
            QuotePatch {
                product_code: Some("grass-premium".into()),
                ..Default::default()
            },
            QuotePatch {
                manual_unit_price: Some(Some(Money::from_major(80))),
                ..Default::default()
            },
            QuotePatch {
                logistics_cost: Some(Money::from_major(500)),
                ..Default::default()
            },
            QuotePatch {
                requires_invoice: Some(true),
                ..Default::default()
            },
            QuotePatch {
                pricing_mode: Some(PricingMode::Installments),
                ..Default::default()
            },
        ] {
            assert!(p.touches_pricing(), "{p:?} must trigger a recompute");
        }
    }

    #[test]
    fn billed_total_follows_the_pricing_mode() {
        let mut q = Quote {
            id: Uuid::nil(),
            version: 1,
            contact: Contact {
                name: "Ana".into(),
                phone: "999".into(),
                email: None,
            },
            location: SiteLocation {
                address: "Calle 60".into(),
                city: "Mérida".into(),
                state: "Yucatán".into(),
                postal_code: "97000".into(),
                maps_link: None,
            },
            area_m2: 100.0,
            product_code: "sod-50".into(),
            pricing_mode: PricingMode::Cash,
            manual_unit_price: None,
            logistics_cost: Money::ZERO,
            requires_invoice: false,
            total_cash: Money::from_major(10_000),
            total_installments: Money::from_major(12_000),
            status: QuoteStatus::New,
            assigned_to: None,
            created_by: None,
            out_of_zone: false,
            is_manual: false,
            notes: String::new(),
            created_at: chrono::DateTime::<chrono::Utc>::MIN_UTC,
        };
        assert_eq!(q.billed_total(), Money::from_major(10_000));
        // Both totals are stored, so switching the mode is loss-free.
        q.pricing_mode = PricingMode::Installments;
        assert_eq!(q.billed_total(), Money::from_major(12_000));
    }

    #[test]
    fn status_only_patch_does_not_touch_pricing() {
        let p = QuotePatch {
            status: Some(QuoteStatus::Contacted),
            ..Default::default()
        };
        assert!(!p.touches_pricing());
        assert!(!p.is_empty());
    }
}
