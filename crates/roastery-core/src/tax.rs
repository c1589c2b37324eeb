//! # Tax Engine
//!
//! Per-line tax. The rate for a line comes from the enabled entry for its
//! category, falling back to the legacy global rate. Each line is taxed and
//! rounded on its own; the order tax is the sum.
//!
//! ```text
//! line subtotal ──► rate_for(category) ──► subtotal × bps / 10000 ──► tax
//!                     │                      (half away from zero)
//!                     ├── enabled category entry
//!                     └── else settings.tax_rate
//! ```

use crate::money::Money;
use crate::settings::CheckoutSettings;
use crate::types::TaxRate;

/// Tax lookups against one settings document.
#[derive(Debug, Clone, Copy)]
pub struct TaxEngine<'a> {
    settings: &'a CheckoutSettings,
}

impl<'a> TaxEngine<'a> {
    pub fn new(settings: &'a CheckoutSettings) -> Self {
        TaxEngine { settings }
    }

    /// The rate that applies to `category_id`.
    pub fn rate_for(&self, category_id: &str) -> TaxRate {
        self.settings
            .category_tax_rates
            .iter()
            .find(|entry| entry.enabled && entry.category_id == category_id)
            .map(|entry| entry.rate)
            .unwrap_or(self.settings.tax_rate)
    }

    /// Tax due on one line.
    pub fn tax_for(&self, line_subtotal: Money, category_id: &str) -> Money {
        line_subtotal.calculate_tax(self.rate_for(category_id))
    }
}

/// Tax due on one line under `settings`.
///
/// ```rust
/// use roastery_core::currency::Currency;
/// use roastery_core::money::Money;
/// use roastery_core::settings::CheckoutSettings;
/// use roastery_core::tax::tax_for;
/// use roastery_core::types::TaxRate;
///
/// let settings = CheckoutSettings {
///     tax_rate: TaxRate::from_bps(500),
///     ..Default::default()
/// };
/// let tax = tax_for(Money::new(10_000, Currency::Omr), "beans", &settings);
/// assert_eq!(tax.minor(), 500);
/// ```
pub fn tax_for(line_subtotal: Money, category_id: &str, settings: &CheckoutSettings) -> Money {
    TaxEngine::new(settings).tax_for(line_subtotal, category_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use crate::settings::CategoryTaxRate;

    fn settings() -> CheckoutSettings {
        CheckoutSettings {
            category_tax_rates: vec![
                CategoryTaxRate {
                    category_id: "equipment".to_string(),
                    rate: TaxRate::from_bps(1_000),
                    enabled: true,
                },
                CategoryTaxRate {
                    category_id: "beans".to_string(),
                    rate: TaxRate::zero(),
                    enabled: true,
                },
                CategoryTaxRate {
                    category_id: "apparel".to_string(),
                    rate: TaxRate::from_bps(2_000),
                    enabled: false,
                },
            ],
            tax_rate: TaxRate::from_bps(500),
            ..Default::default()
        }
    }

    #[test]
    fn test_rate_lookup() {
        let settings = settings();
        let engine = TaxEngine::new(&settings);

        assert_eq!(engine.rate_for("equipment").bps(), 1_000);
        assert_eq!(engine.rate_for("beans").bps(), 0);
        // Disabled entry falls through to the global rate
        assert_eq!(engine.rate_for("apparel").bps(), 500);
        assert_eq!(engine.rate_for("gift-cards").bps(), 500);
    }

    #[test]
    fn test_tax_rounds_half_up_per_line() {
        let settings = settings();
        // 8.250 OMR × 5% = 0.4125 → 0.413
        let tax = tax_for(Money::new(8_250, Currency::Omr), "other", &settings);
        assert_eq!(tax, Money::new(413, Currency::Omr));

        // 0.25 USD × 10% = 0.025 → 0.03
        let tax = tax_for(Money::new(25, Currency::Usd), "equipment", &settings);
        assert_eq!(tax, Money::new(3, Currency::Usd));
    }

    #[test]
    fn test_exempt_category() {
        let settings = settings();
        assert!(tax_for(Money::new(5_000, Currency::Omr), "beans", &settings).is_zero());
    }
}
