use qdk_catalog::Product;
use qdk_config::PricingPolicy;
use qdk_schemas::{Money, Quote, MAJOR_SCALE};

/// Both payment-mode totals for one quote.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct QuoteTotals {
    pub cash: Money,
    pub installments: Money,
}

impl QuoteTotals {
    pub const ZERO: QuoteTotals = QuoteTotals {
        cash: Money::ZERO,
        installments: Money::ZERO,
    };
}

/// One payment mode: raw → round-to-whole-unit → floor → logistics → tax.
fn mode_total(
    area_m2: f64,
    unit_price: Money,
    logistics_cost: Money,
    requires_invoice: bool,
    policy: &PricingPolicy,
) -> Money {
    // Raw price in fractional centavos; the only place area (f64) meets
    // money.  Rounded to the nearest whole currency unit immediately — the
    // floor step — and never earlier.
    let raw_cents = area_m2 * unit_price.raw() as f64;
    let rounded = Money::from_major((raw_cents / MAJOR_SCALE as f64).round() as i64);

    let floored = rounded.max(Money::from_major(policy.min_price_major));

    // Logistics is added AFTER the floor: a large surcharge must not be
    // absorbed into the minimum dispatch fee, nor inflate past it twice.
    let subtotal = floored.saturating_add(logistics_cost);

    if requires_invoice {
        apply_tax(subtotal, policy.invoice_tax_percent)
    } else {
        subtotal
    }
}

/// Tax on the floored-plus-logistics amount, rounded half-up to the centavo.
fn apply_tax(amount: Money, tax_percent: u32) -> Money {
    let taxed = (amount.raw() as i128 * (100 + tax_percent as i128) + 50) / 100;
    Money::from_cents(taxed as i64)
}

/// Compute both totals for a quote's pricing inputs.
///
/// `manual_unit_price`, when present, replaces the catalog unit price for
/// **both** modes — setting it once moves cash and installments together.
pub fn compute_totals(
    area_m2: f64,
    product: &Product,
    manual_unit_price: Option<Money>,
    logistics_cost: Money,
    requires_invoice: bool,
    policy: &PricingPolicy,
) -> QuoteTotals {
    if !(area_m2 > 0.0) || !area_m2.is_finite() {
        return QuoteTotals::ZERO;
    }

    let unit_cash = manual_unit_price.unwrap_or(product.unit_price_cash);
    let unit_installments = manual_unit_price.unwrap_or(product.unit_price_installments);

    QuoteTotals {
        cash: mode_total(area_m2, unit_cash, logistics_cost, requires_invoice, policy),
        installments: mode_total(
            area_m2,
            unit_installments,
            logistics_cost,
            requires_invoice,
            policy,
        ),
    }
}

/// Convenience wrapper pulling the pricing inputs off a [`Quote`].
pub fn compute_for_quote(quote: &Quote, product: &Product, policy: &PricingPolicy) -> QuoteTotals {
    compute_totals(
        quote.area_m2,
        product,
        quote.manual_unit_price,
        quote.logistics_cost,
        quote.requires_invoice,
        policy,
    )
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
