//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OMR makes it worse: 3 decimal places, so display rounding and          │
//! │  conversion rounding disagree far more often than with 2.               │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units tagged with their currency           │
//! │    5.000 OMR  = Money { minor: 5000, currency: OMR }  (baisa)           │
//! │    13.00 USD  = Money { minor: 1300, currency: USD }  (cents)           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use roastery_core::currency::Currency;
//! use roastery_core::money::Money;
//!
//! let price = Money::new(4_500, Currency::Omr); // 4.500 OMR
//! let line = price.multiply_quantity(2);
//! assert_eq!(line.minor(), 9_000);
//! assert_eq!(line.to_string(), "9.000 OMR");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::currency::{round_div, Currency};
use crate::error::{PricingError, PricingResult};
use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest unit of its currency.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for modifiers that lower a price
/// - **Currency tag**: 1000 baisa and 1000 cents are very different amounts
/// - **Mixing currencies is a logic error**: convert first with
///   [`CurrencyConverter`](crate::currency::CurrencyConverter)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money {
    minor: i64,
    currency: Currency,
}

impl Money {
    /// Creates a Money value from minor units.
    #[inline]
    pub const fn new(minor: i64, currency: Currency) -> Self {
        Money { minor, currency }
    }

    /// Returns zero in the given currency.
    #[inline]
    pub const fn zero(currency: Currency) -> Self {
        Money { minor: 0, currency }
    }

    /// Returns the value in minor units (baisa, cents, halalas).
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.minor
    }

    /// Returns the currency tag.
    #[inline]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the major unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.minor / self.currency.minor_per_major()
    }

    /// Returns the minor unit portion, always non-negative.
    ///
    /// ```rust
    /// use roastery_core::currency::Currency;
    /// use roastery_core::money::Money;
    ///
    /// assert_eq!(Money::new(-1_250, Currency::Omr).minor_part(), 250);
    /// assert_eq!(Money::new(1_299, Currency::Usd).minor_part(), 99);
    /// ```
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.minor % self.currency.minor_per_major()).abs()
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.minor == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.minor > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.minor < 0
    }

    /// Returns the larger of two amounts in the same currency.
    #[inline]
    pub fn max(self, other: Money) -> Money {
        debug_assert_eq!(self.currency, other.currency);
        if other.minor > self.minor {
            other
        } else {
            self
        }
    }

    /// Calculates tax, rounding half away from zero in the minor unit.
    ///
    /// ## Example
    /// ```rust
    /// use roastery_core::currency::Currency;
    /// use roastery_core::money::Money;
    /// use roastery_core::types::TaxRate;
    ///
    /// let subtotal = Money::new(8_250, Currency::Omr); // 8.250 OMR
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(500)); // 5%
    /// // 8.250 × 5% = 0.4125 → 0.413 OMR
    /// assert_eq!(tax.minor(), 413);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 prevents overflow on large amounts
        let tax = round_div(self.minor as i128 * rate.bps() as i128, 10_000);
        Money::new(tax as i64, self.currency)
    }

    /// Multiplies money by a line quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money::new(self.minor * qty as i64, self.currency)
    }

    /// Adds `other`, rejecting an amount in another currency.
    pub fn checked_add(self, other: Money) -> PricingResult<Money> {
        if self.currency != other.currency {
            return Err(PricingError::CurrencyMismatch {
                expected: self.currency,
                found: other.currency,
            });
        }
        Ok(Money::new(self.minor + other.minor, self.currency))
    }

    /// Sums amounts that must all be in `currency`.
    pub fn sum<I>(amounts: I, currency: Currency) -> PricingResult<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(currency), Money::checked_add)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the amount with the currency's precision and its code,
/// e.g. `5.000 OMR`, `13.00 USD`, `-0.50 SAR`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minor < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}.{:0width$} {}",
            sign,
            self.major().abs(),
            self.minor_part(),
            self.currency.code(),
            width = self.currency.minor_digits() as usize
        )
    }
}

/// Addition of two Money values in the same currency.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        debug_assert_eq!(self.currency, other.currency, "adding mixed currencies");
        Money::new(self.minor + other.minor, self.currency)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        debug_assert_eq!(self.currency, other.currency, "adding mixed currencies");
        self.minor += other.minor;
    }
}

/// Subtraction of two Money values in the same currency.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        debug_assert_eq!(self.currency, other.currency, "subtracting mixed currencies");
        Money::new(self.minor - other.minor, self.currency)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        debug_assert_eq!(self.currency, other.currency, "subtracting mixed currencies");
        self.minor -= other.minor;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_parts() {
        let money = Money::new(5_125, Currency::Omr);
        assert_eq!(money.minor(), 5_125);
        assert_eq!(money.major(), 5);
        assert_eq!(money.minor_part(), 125);

        let cents = Money::new(1_099, Currency::Usd);
        assert_eq!(cents.major(), 10);
        assert_eq!(cents.minor_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::new(5_000, Currency::Omr).to_string(), "5.000 OMR");
        assert_eq!(Money::new(45, Currency::Omr).to_string(), "0.045 OMR");
        assert_eq!(Money::new(1_300, Currency::Usd).to_string(), "13.00 USD");
        assert_eq!(Money::new(-50, Currency::Sar).to_string(), "-0.50 SAR");
        assert_eq!(Money::zero(Currency::Usd).to_string(), "0.00 USD");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::new(1_000, Currency::Omr);
        let b = Money::new(250, Currency::Omr);

        assert_eq!((a + b).minor(), 1_250);
        assert_eq!((a - b).minor(), 750);

        let mut c = a;
        c += b;
        c -= Money::new(50, Currency::Omr);
        assert_eq!(c.minor(), 1_200);
    }

    #[test]
    fn test_tax_rounds_in_minor_unit() {
        // 1.000 OMR at 5% = 0.050 OMR
        let amount = Money::new(1_000, Currency::Omr);
        assert_eq!(amount.calculate_tax(TaxRate::from_bps(500)).minor(), 50);

        // 10.00 USD at 8.25% = 0.825 → 0.83
        let amount = Money::new(1_000, Currency::Usd);
        assert_eq!(amount.calculate_tax(TaxRate::from_bps(825)).minor(), 83);
        assert_eq!(amount.calculate_tax(TaxRate::zero()).minor(), 0);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit = Money::new(4_000, Currency::Omr);
        assert_eq!(unit.multiply_quantity(2).minor(), 8_000);
        assert_eq!(unit.multiply_quantity(2).currency(), Currency::Omr);
    }

    #[test]
    fn test_sum_and_max() {
        let total = Money::sum(
            [Money::new(100, Currency::Sar), Money::new(250, Currency::Sar)],
            Currency::Sar,
        );
        assert_eq!(total, Ok(Money::new(350, Currency::Sar)));
        assert_eq!(Money::sum([], Currency::Usd), Ok(Money::zero(Currency::Usd)));

        let floor = Money::new(100, Currency::Omr);
        assert_eq!(Money::new(40, Currency::Omr).max(floor), floor);
    }

    #[test]
    fn test_mixed_currencies_are_rejected() {
        let baisa = Money::new(1_500, Currency::Omr);
        let cents = Money::new(390, Currency::Usd);

        assert_eq!(
            baisa.checked_add(cents),
            Err(PricingError::CurrencyMismatch {
                expected: Currency::Omr,
                found: Currency::Usd,
            })
        );
        assert!(Money::sum([baisa, cents], Currency::Omr).is_err());
        assert!(Money::sum([cents], Currency::Omr).is_err());
        assert_eq!(baisa.checked_add(baisa).unwrap().minor(), 3_000);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero(Currency::Omr);
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());
        assert!(Money::new(-1, Currency::Omr).is_negative());
    }
}
