use qdk_catalog::{resolve_product, CatalogReader};
use qdk_config::PricingPolicy;
use qdk_pricing::compute_for_quote;
use qdk_schemas::{Actor, Quote, QuotePatch, QuoteStatus, Role};

use crate::error::{MutationError, PermissionReason, ValidationReason};

/// Validate and apply a patch to a quote on behalf of an actor.
///
/// Gate order: role/status/scope first, then field validation, then the
/// patch is applied to a copy and — when a pricing input was touched — the
/// totals are recomputed against the resolved catalog entry.  The input
/// record is never modified; `version` is left for the store to assign.
///
/// Role rules:
/// - `admin`: unrestricted field and status mutation.
/// - `manager`: as admin, except the manual unit-price override.
/// - `editor`: only while the quote is still `New`, and only for quotes in
///   their own city or assigned to them.  No field bypasses the lock.
pub fn apply_mutation(
    quote: &Quote,
    patch: &QuotePatch,
    actor: &Actor,
    catalog: &dyn CatalogReader,
    policy: &PricingPolicy,
) -> Result<Quote, MutationError> {
    check_permissions(quote, patch, actor)?;
    check_fields(patch)?;

    let mut next = quote.clone();
    apply_fields(&mut next, patch, quote);

    if patch.touches_pricing() {
        let product = resolve_product(
            catalog,
            &next.product_code,
            &next.location.city,
            &policy.base_city,
        )?;
        let totals = compute_for_quote(&next, &product, policy);
        next.total_cash = totals.cash;
        next.total_installments = totals.installments;
    }

    Ok(next)
}

fn check_permissions(
    quote: &Quote,
    patch: &QuotePatch,
    actor: &Actor,
) -> Result<(), MutationError> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::Manager => {
            if patch.manual_unit_price.is_some() {
                return Err(MutationError::Permission(
                    PermissionReason::ManualPriceRequiresAdmin,
                ));
            }
            Ok(())
        }
        Role::Editor => {
            if patch.manual_unit_price.is_some() {
                return Err(MutationError::Permission(
                    PermissionReason::ManualPriceRequiresAdmin,
                ));
            }
            // The lock binds regardless of which fields are patched.
            if quote.status != QuoteStatus::New {
                return Err(MutationError::Permission(PermissionReason::Locked));
            }
            let assigned_to_me = quote.assigned_to == Some(actor.id);
            if !assigned_to_me && quote.location.city != actor.city {
                return Err(MutationError::Permission(PermissionReason::OutOfScope));
            }
            Ok(())
        }
    }
}

fn check_fields(patch: &QuotePatch) -> Result<(), MutationError> {
    if let Some(area) = patch.area_m2 {
        if !area.is_finite() {
            return Err(MutationError::Validation(ValidationReason::NonFiniteArea));
        }
        if area < 0.0 {
            return Err(MutationError::Validation(ValidationReason::NegativeArea));
        }
    }
    if let Some(cost) = patch.logistics_cost {
        if cost.is_negative() {
            return Err(MutationError::Validation(
                ValidationReason::NegativeLogistics,
            ));
        }
    }
    if let Some(Some(price)) = patch.manual_unit_price {
        if price.is_negative() {
            return Err(MutationError::Validation(
                ValidationReason::NegativeManualPrice,
            ));
        }
    }
    Ok(())
}

fn apply_fields(next: &mut Quote, patch: &QuotePatch, current: &Quote) {
    if let Some(v) = &patch.name {
        next.contact.name = v.clone();
    }
    if let Some(v) = &patch.phone {
        next.contact.phone = v.clone();
    }
    if let Some(v) = &patch.email {
        next.contact.email = v.clone();
    }

    if let Some(v) = &patch.address {
        next.location.address = v.clone();
    }
    if let Some(v) = &patch.city {
        next.location.city = v.clone();
    }
    if let Some(v) = &patch.state {
        next.location.state = v.clone();
    }
    if let Some(v) = &patch.postal_code {
        next.location.postal_code = v.clone();
    }
    if let Some(v) = &patch.maps_link {
        next.location.maps_link = v.clone();
    }

    if let Some(v) = patch.area_m2 {
        next.area_m2 = v;
    }
    if let Some(v) = &patch.product_code {
        next.product_code = v.clone();
    }
    if let Some(v) = patch.pricing_mode {
        next.pricing_mode = v;
    }
    if let Some(v) = patch.manual_unit_price {
        next.manual_unit_price = v;
    }
    if let Some(v) = patch.logistics_cost {
        next.logistics_cost = v;
    }
    if let Some(v) = patch.requires_invoice {
        next.requires_invoice = v;
    }

    if let Some(v) = patch.status {
        next.status = v;
    }
    if let Some(v) = patch.assigned_to {
        next.assigned_to = v;
    }
    // Claim semantics: the first actor to save an unowned draft becomes its
    // creator; afterwards the slot is silently ignored.
    if current.created_by.is_none() {
        if let Some(claimant) = patch.created_by {
            next.created_by = Some(claimant);
        }
    }

    if let Some(v) = &patch.notes {
        next.notes = v.clone();
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
