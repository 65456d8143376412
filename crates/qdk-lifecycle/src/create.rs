//! Quote creation.
//!
//! Two entry points mirror the two ways a lead is born:
//!
//! - [`create_from_funnel`] — the public landing-page form.  Unauthenticated,
//!   so there is no actor; the record starts unowned and unassigned.  A zero
//!   area is acceptable (the lot has not been measured yet) and yields zero
//!   totals.
//! - [`create_manual`] — staff data entry.  Requires the full contact,
//!   location, measurement and product up front; the creating actor owns the
//!   record from the start.
//!
//! Both resolve the product and compute totals before returning, so a quote
//! never exists with a dangling product code.  `version` starts at 0; the
//! store assigns 1 on insert.

use chrono::{DateTime, Utc};
use qdk_catalog::{resolve_product, CatalogReader};
use qdk_config::PricingPolicy;
use qdk_pricing::compute_totals;
use qdk_schemas::{Actor, Contact, Money, PricingMode, Quote, QuoteStatus, SiteLocation};
use uuid::Uuid;

use crate::error::{MutationError, PermissionReason, ValidationReason};

/// What the public funnel form submits.
#[derive(Clone, Debug)]
pub struct FunnelSubmission {
    pub contact: Contact,
    pub location: SiteLocation,
    /// May be 0 when the visitor has not measured yet.
    pub area_m2: f64,
    pub product_code: String,
    pub pricing_mode: PricingMode,
    /// Decided by the form against the service-area list; immutable after.
    pub out_of_zone: bool,
    pub notes: String,
}

/// What staff data entry provides.  Unlike the funnel, everything needed to
/// price the quote is mandatory.
#[derive(Clone, Debug)]
pub struct ManualDraft {
    pub contact: Contact,
    pub location: SiteLocation,
    pub area_m2: f64,
    pub product_code: String,
    pub pricing_mode: PricingMode,
    pub logistics_cost: Money,
    pub requires_invoice: bool,
    pub out_of_zone: bool,
    pub notes: String,
}

fn validate_area(area: f64) -> Result<(), MutationError> {
    if !area.is_finite() {
        return Err(MutationError::Validation(ValidationReason::NonFiniteArea));
    }
    if area < 0.0 {
        return Err(MutationError::Validation(ValidationReason::NegativeArea));
    }
    Ok(())
}

/// Create a quote from a public funnel submission.
pub fn create_from_funnel(
    submission: FunnelSubmission,
    catalog: &dyn CatalogReader,
    policy: &PricingPolicy,
    now: DateTime<Utc>,
) -> Result<Quote, MutationError> {
    validate_area(submission.area_m2)?;

    let product = resolve_product(
        catalog,
        &submission.product_code,
        &submission.location.city,
        &policy.base_city,
    )?;
    let totals = compute_totals(
        submission.area_m2,
        &product,
        None,
        Money::ZERO,
        false,
        policy,
    );

    Ok(Quote {
        id: Uuid::new_v4(),
        version: 0,
        contact: submission.contact,
        location: submission.location,
        area_m2: submission.area_m2,
        product_code: submission.product_code,
        pricing_mode: submission.pricing_mode,
        manual_unit_price: None,
        logistics_cost: Money::ZERO,
        requires_invoice: false,
        total_cash: totals.cash,
        total_installments: totals.installments,
        status: QuoteStatus::New,
        assigned_to: None,
        created_by: None,
        out_of_zone: submission.out_of_zone,
        is_manual: false,
        notes: submission.notes,
        created_at: now,
    })
}

/// Create a quote from staff data entry.
///
/// Editors may only create in their own city; admin/manager anywhere.
pub fn create_manual(
    actor: &Actor,
    draft: ManualDraft,
    catalog: &dyn CatalogReader,
    policy: &PricingPolicy,
    now: DateTime<Utc>,
) -> Result<Quote, MutationError> {
    if !actor.role.has_global_scope() && draft.location.city != actor.city {
        return Err(MutationError::Permission(PermissionReason::OutOfScope));
    }

    for (value, field) in [
        (&draft.contact.name, "name"),
        (&draft.contact.phone, "phone"),
        (&draft.location.address, "address"),
        (&draft.location.city, "city"),
    ] {
        if value.trim().is_empty() {
            return Err(MutationError::Validation(
                ValidationReason::MissingRequiredField(field),
            ));
        }
    }

    validate_area(draft.area_m2)?;
    if draft.area_m2 == 0.0 {
        // The funnel may defer measurement; staff entry may not.
        return Err(MutationError::Validation(
            ValidationReason::MissingRequiredField("area_m2"),
        ));
    }
    if draft.logistics_cost.is_negative() {
        return Err(MutationError::Validation(
            ValidationReason::NegativeLogistics,
        ));
    }

    let product = resolve_product(
        catalog,
        &draft.product_code,
        &draft.location.city,
        &policy.base_city,
    )?;
    let totals = compute_totals(
        draft.area_m2,
        &product,
        None,
        draft.logistics_cost,
        draft.requires_invoice,
        policy,
    );

    Ok(Quote {
        id: Uuid::new_v4(),
        version: 0,
        contact: draft.contact,
        location: draft.location,
        area_m2: draft.area_m2,
        product_code: draft.product_code,
        pricing_mode: draft.pricing_mode,
        manual_unit_price: None,
        logistics_cost: draft.logistics_cost,
        requires_invoice: draft.requires_invoice,
        total_cash: totals.cash,
        total_installments: totals.installments,
        status: QuoteStatus::New,
        assigned_to: None,
        created_by: Some(actor.id),
        out_of_zone: draft.out_of_zone,
        is_manual: true,
        notes: draft.notes,
        created_at: now,
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
