//! Shared fixtures for unit and scenario tests.
//!
//! The default catalog carries the `sod-50` turf product priced for Mérida
//! (the base city) and Cancún, which is enough to exercise the city
//! fallback both ways.

use qdk_catalog::Product;
use qdk_config::PricingPolicy;
use qdk_lifecycle::{FunnelSubmission, ManualDraft};
use qdk_schemas::{Actor, Contact, Money, PricingMode, Role, SiteLocation, CITY_ALL};
use uuid::Uuid;

use crate::MemoryCatalog;

pub fn admin() -> Actor {
    Actor::new(Uuid::new_v4(), Role::Admin, CITY_ALL)
}

pub fn manager() -> Actor {
    Actor::new(Uuid::new_v4(), Role::Manager, CITY_ALL)
}

pub fn editor(city: &str) -> Actor {
    Actor::new(Uuid::new_v4(), Role::Editor, city)
}

pub fn policy() -> PricingPolicy {
    // min price 5900, invoice tax 16%, base city Mérida.
    PricingPolicy::defaults()
}

pub fn product(
    code: &str,
    city: &str,
    cash_major: i64,
    installments_major: i64,
    order: i32,
) -> Product {
    Product {
        id: Uuid::new_v4(),
        internal_id: code.to_string(),
        city: city.to_string(),
        title: format!("{code} ({city})"),
        category: "turf".to_string(),
        unit_price_cash: Money::from_major(cash_major),
        unit_price_installments: Money::from_major(installments_major),
        order,
        active: true,
    }
}

pub fn default_catalog() -> MemoryCatalog {
    MemoryCatalog::new(vec![
        product("sod-50", "Mérida", 100, 120, 1),
        product("sod-50", "Cancún", 110, 130, 1),
        product("turf-premium", "Mérida", 180, 210, 2),
    ])
}

fn contact() -> Contact {
    Contact {
        name: "Ana Gómez".to_string(),
        phone: "999-000-0000".to_string(),
        email: Some("ana@example.com".to_string()),
    }
}

fn location(city: &str) -> SiteLocation {
    SiteLocation {
        address: "Calle 60 #491".to_string(),
        city: city.to_string(),
        state: "Yucatán".to_string(),
        postal_code: "97000".to_string(),
        maps_link: None,
    }
}

pub fn funnel_submission(city: &str, area_m2: f64) -> FunnelSubmission {
    FunnelSubmission {
        contact: contact(),
        location: location(city),
        area_m2,
        product_code: "sod-50".to_string(),
        pricing_mode: PricingMode::Cash,
        out_of_zone: false,
        notes: String::new(),
    }
}

pub fn manual_draft(city: &str, area_m2: f64) -> ManualDraft {
    ManualDraft {
        contact: contact(),
        location: location(city),
        area_m2,
        product_code: "sod-50".to_string(),
        pricing_mode: PricingMode::Cash,
        logistics_cost: Money::ZERO,
        requires_invoice: false,
        out_of_zone: false,
        notes: String::new(),
    }
}
