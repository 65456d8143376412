//! Fixed-point money type.
//!
//! # Motivation
//!
//! All money amounts in this system use a centavo (1e-2) fixed-point
//! representation stored as `i64`.  Using raw `i64` for money is error-prone:
//! it allows accidental arithmetic with unrelated integers (areas, ids,
//! version counters) without any compile-time signal.
//!
//! `Money` wraps the raw `i64` so the type system prevents:
//! - Implicit construction from raw `i64` (no `From<i64>` impl).
//! - Mixing `Money` with unrelated `i64` values in arithmetic.
//!
//! # Scale
//!
//! 1 MXN = 100 centavos = `Money(100)`.  Catalog unit prices, logistics
//! surcharges and quote totals all use this scale.  Non-monetary quantities
//! (areas in m², record versions) remain plain `f64`/`u64` and are never
//! implicitly convertible.
//!
//! # Rounding
//!
//! Quote totals are rounded to the nearest whole currency unit at the
//! minimum-price floor step, never earlier.  [`Money::round_to_major`]
//! implements that rounding (ties away from zero).

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Centavos per whole currency unit.
pub const MAJOR_SCALE: i64 = 100;

// ---------------------------------------------------------------------------
// Money newtype
// ---------------------------------------------------------------------------

/// A fixed-point monetary amount at centavo scale.
///
/// 1 MXN = `Money(100)`.
///
/// # Construction
///
/// Use [`Money::from_cents`] or [`Money::from_major`] for explicit
/// construction.  There is intentionally no `From<i64>` implementation —
/// callers must be deliberate about which scale a raw integer carries.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Money(i64);

impl Money {
    /// Zero monetary amount.
    pub const ZERO: Money = Money(0);

    /// Maximum representable value.
    pub const MAX: Money = Money(i64::MAX);

    /// Construct from raw centavos.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Construct from whole currency units (e.g. `from_major(5900)` = $5900.00).
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * MAJOR_SCALE)
    }

    /// Extract the underlying raw centavo count.
    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Whole currency units, truncated toward zero.
    #[inline]
    pub const fn major_units(self) -> i64 {
        self.0 / MAJOR_SCALE
    }

    /// Round to the nearest whole currency unit, ties away from zero.
    ///
    /// `Money::from_cents(149).round_to_major()` = `Money::from_major(1)`;
    /// `Money::from_cents(150).round_to_major()` = `Money::from_major(2)`.
    #[inline]
    pub fn round_to_major(self) -> Money {
        let half = MAJOR_SCALE / 2;
        let adj = if self.0 >= 0 { half } else { -half };
        Money((self.0 + adj) / MAJOR_SCALE * MAJOR_SCALE)
    }

    /// Saturating addition — clamps at [`Money::MAX`] on overflow.
    #[inline]
    pub fn saturating_add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }

    /// Checked addition — `None` on overflow.
    #[inline]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// `true` if this amount is strictly negative.
    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// `true` if this amount is zero.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

// ---------------------------------------------------------------------------
// Arithmetic operators (closed over Money)
// ---------------------------------------------------------------------------

impl Add for Money {
    type Output = Money;
    #[inline]
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;
    #[inline]
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;
    #[inline]
    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let major = self.0 / MAJOR_SCALE;
        let frac = (self.0 % MAJOR_SCALE).abs();
        // When |value| < 1 unit and value is negative, major truncates to 0,
        // losing the sign.  Emit "-0" explicitly in that case.
        if self.0 < 0 && major == 0 {
            write!(f, "-{major}.{frac:02}")
        } else {
            write!(f, "{major}.{frac:02}")
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
