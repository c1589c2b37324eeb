//! # Currency Module
//!
//! Supported currencies and the fixed-rate converter.
//!
//! ## Base Currency Anchoring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     ONE BASE, FIXED MULTIPLIERS                         │
//! │                                                                         │
//! │   OMR (base, 3 decimals)                                               │
//! │     │                                                                   │
//! │     ├── × 2.6000 ──► USD (2 decimals)                                   │
//! │     └── × 9.7500 ──► SAR (2 decimals)                                   │
//! │                                                                         │
//! │   Every conversion is ONE integer multiplication followed by ONE        │
//! │   rounding step. We never convert a value that was already rounded    │
//! │   for display, so errors do not compound across hops.                  │
//! │                                                                         │
//! │   USD → SAR goes through the ratio 9.75 / 2.60 in a single step,       │
//! │   not USD → OMR (rounded) → SAR (rounded again).                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Currency
// =============================================================================

/// A currency the storefront can price and charge in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Omani rial, the base currency. 1 OMR = 1000 baisa.
    Omr,
    /// US dollar. 1 USD = 100 cents.
    Usd,
    /// Saudi riyal. 1 SAR = 100 halalas.
    Sar,
}

impl Currency {
    /// The currency every catalog amount is anchored to.
    pub const BASE: Currency = Currency::Omr;

    /// All supported currencies, base first.
    pub const ALL: [Currency; 3] = [Currency::Omr, Currency::Usd, Currency::Sar];

    /// Number of decimal places in the minor unit.
    #[inline]
    pub const fn minor_digits(self) -> u32 {
        match self {
            Currency::Omr => 3,
            Currency::Usd | Currency::Sar => 2,
        }
    }

    /// Minor units per major unit (1000 for OMR, 100 otherwise).
    #[inline]
    pub const fn minor_per_major(self) -> i64 {
        10_i64.pow(self.minor_digits())
    }

    /// ISO 4217 code.
    #[inline]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Omr => "OMR",
            Currency::Usd => "USD",
            Currency::Sar => "SAR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OMR" => Ok(Currency::Omr),
            "USD" => Ok(Currency::Usd),
            "SAR" => Ok(Currency::Sar),
            other => Err(ValidationError::InvalidFormat {
                field: "currency".to_string(),
                reason: format!("unsupported currency code '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Rounding
// =============================================================================

/// Integer division rounding half away from zero.
///
/// `den` must be positive. Shared by conversion and tax so the whole crate
/// rounds the same way.
pub(crate) fn round_div(num: i128, den: i128) -> i128 {
    debug_assert!(den > 0);
    let half = den / 2;
    if num >= 0 {
        (num + half) / den
    } else {
        -((-num + half) / den)
    }
}

// =============================================================================
// Converter
// =============================================================================

/// Rate scale: multipliers are stored in ten-thousandths (2.6000 = 26_000).
pub const RATE_SCALE: i64 = 10_000;

/// Default OMR → USD multiplier (2.6000).
pub const DEFAULT_USD_PER_OMR: i64 = 26_000;

/// Default OMR → SAR multiplier (9.7500).
pub const DEFAULT_SAR_PER_OMR: i64 = 97_500;

/// Converts amounts between the supported currencies using fixed multipliers.
///
/// ## Example
/// ```rust
/// use roastery_core::currency::{Currency, CurrencyConverter};
/// use roastery_core::money::Money;
///
/// let converter = CurrencyConverter::default();
/// let price = Money::new(5_000, Currency::Omr); // 5.000 OMR
///
/// let usd = converter.convert(price, Currency::Usd);
/// assert_eq!(usd.minor(), 1_300); // 13.00 USD
/// assert_eq!(converter.format(usd), "13.00 USD");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyConverter {
    /// USD per OMR in ten-thousandths.
    usd_per_omr: i64,
    /// SAR per OMR in ten-thousandths.
    sar_per_omr: i64,
}

impl Default for CurrencyConverter {
    fn default() -> Self {
        CurrencyConverter {
            usd_per_omr: DEFAULT_USD_PER_OMR,
            sar_per_omr: DEFAULT_SAR_PER_OMR,
        }
    }
}

impl CurrencyConverter {
    /// Creates a converter with custom multipliers (ten-thousandths).
    ///
    /// Non-positive multipliers are rejected.
    pub fn with_rates(usd_per_omr: i64, sar_per_omr: i64) -> Result<Self, ValidationError> {
        for (field, rate) in [("usd_per_omr", usd_per_omr), ("sar_per_omr", sar_per_omr)] {
            if rate <= 0 {
                return Err(ValidationError::MustBePositive {
                    field: field.to_string(),
                });
            }
        }
        Ok(CurrencyConverter {
            usd_per_omr,
            sar_per_omr,
        })
    }

    /// Multiplier from the base currency to `currency`, in ten-thousandths.
    #[inline]
    pub const fn rate_from_base(&self, currency: Currency) -> i64 {
        match currency {
            Currency::Omr => RATE_SCALE,
            Currency::Usd => self.usd_per_omr,
            Currency::Sar => self.sar_per_omr,
        }
    }

    /// Converts `amount` into `to` with a single rounding step.
    ///
    /// ```text
    /// target_minor = source_minor × rate(to) × minor(to)
    ///                ─────────────────────────────────────
    ///                    rate(from) × minor(from)
    /// ```
    pub fn convert(&self, amount: Money, to: Currency) -> Money {
        let from = amount.currency();
        if from == to {
            return amount;
        }

        let num = amount.minor() as i128
            * self.rate_from_base(to) as i128
            * to.minor_per_major() as i128;
        let den = self.rate_from_base(from) as i128 * from.minor_per_major() as i128;

        Money::new(round_div(num, den) as i64, to)
    }

    /// Converts a base-currency amount for display in `to`.
    ///
    /// Amounts already in another currency are converted directly from that
    /// currency, never through a rounded OMR intermediate.
    #[inline]
    pub fn from_base(&self, amount: Money, to: Currency) -> Money {
        self.convert(amount, to)
    }

    /// Formats an amount for display, e.g. `"5.000 OMR"` or `"13.00 USD"`.
    pub fn format(&self, amount: Money) -> String {
        amount.to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_parsing() {
        assert_eq!("omr".parse::<Currency>().unwrap(), Currency::Omr);
        assert_eq!(" USD ".parse::<Currency>().unwrap(), Currency::Usd);
        assert_eq!("SAR".parse::<Currency>().unwrap(), Currency::Sar);
        assert!("EUR".parse::<Currency>().is_err());
    }

    #[test]
    fn test_minor_digits() {
        assert_eq!(Currency::Omr.minor_per_major(), 1000);
        assert_eq!(Currency::Usd.minor_per_major(), 100);
        assert_eq!(Currency::Sar.minor_per_major(), 100);
    }

    #[test]
    fn test_convert_from_base() {
        let converter = CurrencyConverter::default();
        let price = Money::new(1_500, Currency::Omr); // 1.500 OMR

        assert_eq!(converter.convert(price, Currency::Usd).minor(), 390); // 3.90 USD
        assert_eq!(converter.convert(price, Currency::Sar).minor(), 1_463); // 14.625 → 14.63 SAR
        assert_eq!(converter.convert(price, Currency::Omr), price);
    }

    #[test]
    fn test_convert_between_non_base_is_single_step() {
        let converter = CurrencyConverter::default();
        // 10.00 USD = 10 × 9.75 / 2.6 = 37.50 SAR exactly
        let usd = Money::new(1_000, Currency::Usd);
        assert_eq!(converter.convert(usd, Currency::Sar).minor(), 3_750);
    }

    /// Round trip OMR → X → OMR stays within the rounding of half a minor
    /// unit of X plus half a baisa.
    #[test]
    fn test_round_trip_error_is_bounded() {
        let converter = CurrencyConverter::default();
        for baisa in (0..20_000).step_by(7).chain([1, 2, 3, 999_999, 123_457]) {
            let original = Money::new(baisa, Currency::Omr);

            let usd = converter.convert(original, Currency::Usd);
            let back = converter.convert(usd, Currency::Omr);
            // 0.005 USD ≈ 1.92 baisa, plus 0.5 baisa
            assert!((back.minor() - baisa).abs() <= 2, "USD round trip of {}", baisa);

            let sar = converter.convert(original, Currency::Sar);
            let back = converter.convert(sar, Currency::Omr);
            // 0.005 SAR ≈ 0.51 baisa, plus 0.5 baisa
            assert!((back.minor() - baisa).abs() <= 1, "SAR round trip of {}", baisa);
        }
    }

    #[test]
    fn test_negative_amounts_round_symmetrically() {
        let converter = CurrencyConverter::default();
        let refund = Money::new(-1_500, Currency::Omr);
        assert_eq!(converter.convert(refund, Currency::Sar).minor(), -1_463);
    }

    #[test]
    fn test_with_rates_rejects_non_positive() {
        assert!(CurrencyConverter::with_rates(0, 97_500).is_err());
        assert!(CurrencyConverter::with_rates(26_000, -1).is_err());
        assert!(CurrencyConverter::with_rates(26_000, 97_500).is_ok());
    }
}
