use qdk_schemas::{Actor, Quote};
use qdk_store::ScopeFilter;

/// Whether an actor is permitted to see a quote.
///
/// - admin/manager: always.
/// - editor: assigned to them, or unassigned in their own city.
///
/// This is [`ScopeFilter`]'s predicate — the snapshot query and the
/// per-event check share one authoritative implementation, which is what
/// keeps "appears in the snapshot" and "appears via the feed" consistent.
pub fn visible(quote: &Quote, actor: &Actor) -> bool {
    ScopeFilter::for_actor(actor).matches(quote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use qdk_schemas::{Contact, Money, PricingMode, QuoteStatus, Role, SiteLocation, CITY_ALL};
    use uuid::Uuid;

    fn quote(city: &str, assigned_to: Option<Uuid>) -> Quote {
        Quote {
            id: Uuid::new_v4(),
            version: 1,
            contact: Contact {
                name: "Ana".into(),
                phone: "999".into(),
                email: None,
            },
            location: SiteLocation {
                address: "Calle 60".into(),
                city: city.into(),
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
            total_cash: Money::ZERO,
            total_installments: Money::ZERO,
            status: QuoteStatus::New,
            assigned_to,
            created_by: None,
            out_of_zone: false,
            is_manual: false,
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn global_roles_see_everything() {
        let admin = Actor::new(Uuid::new_v4(), Role::Admin, CITY_ALL);
        let manager = Actor::new(Uuid::new_v4(), Role::Manager, CITY_ALL);
        let q = quote("Cancún", Some(Uuid::new_v4()));
        assert!(visible(&q, &admin));
        assert!(visible(&q, &manager));
    }

    #[test]
    fn editor_sees_own_city_unassigned() {
        let ed = Actor::new(Uuid::new_v4(), Role::Editor, "Mérida");
        assert!(visible(&quote("Mérida", None), &ed));
        assert!(!visible(&quote("Cancún", None), &ed));
    }

    #[test]
    fn editor_sees_assignments_regardless_of_city() {
        let ed = Actor::new(Uuid::new_v4(), Role::Editor, "Mérida");
        assert!(visible(&quote("Cancún", Some(ed.id)), &ed));
    }

    #[test]
    fn assignment_to_someone_else_hides_even_own_city() {
        let ed = Actor::new(Uuid::new_v4(), Role::Editor, "Mérida");
        assert!(!visible(&quote("Mérida", Some(Uuid::new_v4())), &ed));
    }
}
