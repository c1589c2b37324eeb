//! # Checkout Aggregator
//!
//! Composes line prices, per-line tax and shipping into the order total shown
//! at checkout.
//!
//! ## Order Total
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      compute_order                                      │
//! │                                                                         │
//! │  lines ──► PricingResolver ──► line totals ──► Σ = subtotal             │
//! │                    │                                                    │
//! │                    └──► TaxEngine (per line) ──► Σ = tax                │
//! │                                                                         │
//! │  method ──┬── Flat { cost } ──────────► cost[currency] (or from OMR)    │
//! │           │                                                             │
//! │           └── ApiCalculated ──┬─ Accepted(quote) ─► convert once        │
//! │                               ├─ Pending ─────────► Incomplete          │
//! │                               ├─ Failed ──────────► Incomplete          │
//! │                               └─ InvalidDest ─────► Incomplete          │
//! │                                                                         │
//! │  Complete { subtotal, tax, shipping, grand_total }                      │
//! │  Incomplete { subtotal, tax, reason }   ← shipping is never zero-filled │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A pricing error on any line fails the whole computation; a line is never
//! priced at zero to keep the total going.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::CartLine;
use crate::catalog::Catalog;
use crate::currency::{Currency, CurrencyConverter};
use crate::error::{CoreError, CoreResult, PricingError};
use crate::money::Money;
use crate::pricing::{LinePrice, PricingResolver};
use crate::settings::{CheckoutSettings, ShippingMethod, ShippingPricing};
use crate::tax::TaxEngine;

// =============================================================================
// Types
// =============================================================================

/// What the rate quoter currently knows about shipping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum ShippingQuoteState {
    /// No quote yet, or one is being fetched.
    Pending,
    /// Latest accepted carrier quote, in the carrier's currency.
    Accepted { amount: Money },
    /// The destination or weight cannot be shipped.
    InvalidDestination { reason: String },
    /// The carrier could not produce a rate.
    Failed { detail: String },
}

/// Why shipping could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ShippingUnresolved {
    InvalidDestination { reason: String },
    QuotePending,
    ProviderFailed { detail: String },
    MethodDisabled {
        #[serde(rename = "methodId")]
        method_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum OrderTotal {
    Complete {
        subtotal: Money,
        tax: Money,
        shipping: Money,
        #[serde(rename = "grandTotal")]
        grand_total: Money,
    },
    Incomplete {
        subtotal: Money,
        tax: Money,
        reason: ShippingUnresolved,
    },
}

impl OrderTotal {
    pub fn subtotal(&self) -> Money {
        match self {
            OrderTotal::Complete { subtotal, .. } | OrderTotal::Incomplete { subtotal, .. } => *subtotal,
        }
    }

    pub fn tax(&self) -> Money {
        match self {
            OrderTotal::Complete { tax, .. } | OrderTotal::Incomplete { tax, .. } => *tax,
        }
    }

    /// Grand total, only when shipping is resolved.
    pub fn grand_total(&self) -> Option<Money> {
        match self {
            OrderTotal::Complete { grand_total, .. } => Some(*grand_total),
            OrderTotal::Incomplete { .. } => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, OrderTotal::Complete { .. })
    }
}

/// One priced cart line with its tax, for the order summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    pub product_id: String,
    pub price: LinePrice,
    pub tax: Money,
}

// =============================================================================
// Aggregator
// =============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct CheckoutAggregator {
    pricing: PricingResolver,
}

impl CheckoutAggregator {
    pub fn new(converter: CurrencyConverter) -> Self {
        CheckoutAggregator {
            pricing: PricingResolver::new(converter),
        }
    }

    fn converter(&self) -> &CurrencyConverter {
        self.pricing.converter()
    }

    /// Prices and taxes every line.
    pub fn price_lines(
        &self,
        lines: &[CartLine],
        catalog: &Catalog,
        settings: &CheckoutSettings,
        currency: Currency,
        at: DateTime<Utc>,
    ) -> CoreResult<Vec<PricedLine>> {
        let tax = TaxEngine::new(settings);
        lines
            .iter()
            .map(|line| {
                let product = catalog
                    .get(&line.product_id)
                    .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;
                let price = self
                    .pricing
                    .resolve_line_price(product, line, currency, at)?;
                Ok(PricedLine {
                    product_id: product.id.clone(),
                    tax: tax.tax_for(price.total, &product.category_id),
                    price,
                })
            })
            .collect()
    }

    /// Computes the order total for `lines` with `method` selected.
    #[allow(clippy::too_many_arguments)]
    pub fn compute_order(
        &self,
        lines: &[CartLine],
        catalog: &Catalog,
        method: &ShippingMethod,
        shipping_quote: &ShippingQuoteState,
        settings: &CheckoutSettings,
        currency: Currency,
        at: DateTime<Utc>,
    ) -> CoreResult<OrderTotal> {
        let priced = self.price_lines(lines, catalog, settings, currency, at)?;
        let subtotal = Money::sum(priced.iter().map(|l| l.price.total), currency)?;
        let tax = Money::sum(priced.iter().map(|l| l.tax), currency)?;

        let total = match self.shipping_cost(method, shipping_quote, currency)? {
            Ok(shipping) => OrderTotal::Complete {
                subtotal,
                tax,
                shipping,
                grand_total: subtotal.checked_add(tax)?.checked_add(shipping)?,
            },
            Err(reason) => OrderTotal::Incomplete {
                subtotal,
                tax,
                reason,
            },
        };
        Ok(total)
    }

    /// Shipping cost in `currency`, or why it is not known yet.
    ///
    /// The outer `Result` is a configuration error (flat cost with no amount);
    /// the inner one is an unresolved-but-expected checkout state.
    pub fn shipping_cost(
        &self,
        method: &ShippingMethod,
        quote: &ShippingQuoteState,
        currency: Currency,
    ) -> CoreResult<Result<Money, ShippingUnresolved>> {
        if !method.enabled {
            return Ok(Err(ShippingUnresolved::MethodDisabled {
                method_id: method.id.clone(),
            }));
        }

        match &method.pricing {
            ShippingPricing::Flat { cost } => {
                let amount = cost
                    .get(currency)
                    .or_else(|| {
                        cost.get(Currency::BASE)
                            .map(|base| self.converter().from_base(base, currency))
                    })
                    .ok_or_else(|| PricingError::MissingPriceData {
                        product_id: format!("shipping:{}", method.id),
                        currency,
                    })?;
                Ok(Ok(amount))
            }
            ShippingPricing::ApiCalculated => Ok(match quote {
                ShippingQuoteState::Accepted { amount } => {
                    Ok(self.converter().convert(*amount, currency))
                }
                ShippingQuoteState::Pending => Err(ShippingUnresolved::QuotePending),
                ShippingQuoteState::InvalidDestination { reason } => {
                    Err(ShippingUnresolved::InvalidDestination {
                        reason: reason.clone(),
                    })
                }
                ShippingQuoteState::Failed { detail } => Err(ShippingUnresolved::ProviderFailed {
                    detail: detail.clone(),
                }),
            }),
        }
    }
}

/// [`CheckoutAggregator::compute_order`] with the default exchange rates.
pub fn compute_order(
    lines: &[CartLine],
    catalog: &Catalog,
    method: &ShippingMethod,
    shipping_quote: &ShippingQuoteState,
    settings: &CheckoutSettings,
    currency: Currency,
    at: DateTime<Utc>,
) -> CoreResult<OrderTotal> {
    CheckoutAggregator::default().compute_order(
        lines,
        catalog,
        method,
        shipping_quote,
        settings,
        currency,
        at,
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CurrencyAmounts, Product};
    use crate::location::{LocationValidator, ShippingDestination};
    use crate::settings::{CategoryTaxRate, ServiceableDestination};
    use crate::types::{CategoryKind, TaxRate};

    fn product(id: &str, category_id: &str, omr: i64) -> Product {
        Product {
            id: id.to_string(),
            name: id.to_string(),
            category_id: category_id.to_string(),
            category_kind: CategoryKind::from_slug(category_id),
            prices: CurrencyAmounts::base(omr),
            sale: None,
            weight_grams: None,
            properties: vec![],
            options: vec![],
        }
    }

    fn catalog() -> Catalog {
        Catalog::from_products([
            product("haraz", "beans", 5_000),
            product("v60", "equipment", 8_250),
        ])
    }

    fn settings() -> CheckoutSettings {
        CheckoutSettings {
            category_tax_rates: vec![
                CategoryTaxRate {
                    category_id: "beans".to_string(),
                    rate: TaxRate::zero(),
                    enabled: true,
                },
                CategoryTaxRate {
                    category_id: "equipment".to_string(),
                    rate: TaxRate::from_bps(500),
                    enabled: true,
                },
            ],
            tax_rate: TaxRate::from_bps(500),
            shipping_methods: vec![flat(), api()],
            enabled_countries: vec!["OM".to_string()],
        }
    }

    fn flat() -> ShippingMethod {
        ShippingMethod {
            id: "local".to_string(),
            name: "Local courier".to_string(),
            enabled: true,
            pricing: ShippingPricing::Flat {
                cost: CurrencyAmounts::base(1_500),
            },
        }
    }

    fn api() -> ShippingMethod {
        ShippingMethod {
            id: "aramex".to_string(),
            name: "Aramex".to_string(),
            enabled: true,
            pricing: ShippingPricing::ApiCalculated,
        }
    }

    fn omr(minor: i64) -> Money {
        Money::new(minor, Currency::Omr)
    }

    #[test]
    fn test_flat_shipping_to_muscat_tax_exempt() {
        let validator = LocationValidator::new(
            vec!["OM".to_string()],
            vec![ServiceableDestination::new("OM", "Muscat")],
        );
        assert!(validator
            .validate(&ShippingDestination::new("Oman", "Muscat", "Muscat"))
            .is_ok());

        let lines = [CartLine::new("haraz", 2)];
        let total = compute_order(
            &lines,
            &catalog(),
            &flat(),
            &ShippingQuoteState::Pending,
            &settings(),
            Currency::Omr,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(
            total,
            OrderTotal::Complete {
                subtotal: omr(10_000),
                tax: omr(0),
                shipping: omr(1_500),
                grand_total: omr(11_500),
            }
        );
    }

    #[test]
    fn test_tax_is_per_line() {
        let lines = [CartLine::new("haraz", 1), CartLine::new("v60", 1)];
        let total = compute_order(
            &lines,
            &catalog(),
            &flat(),
            &ShippingQuoteState::Pending,
            &settings(),
            Currency::Omr,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(total.subtotal(), omr(13_250));
        // Only the equipment line is taxed: 8.250 × 5% = 0.4125 → 0.413
        assert_eq!(total.tax(), omr(413));
        assert_eq!(total.grand_total(), Some(omr(15_163)));
    }

    #[test]
    fn test_api_quote_converted_once() {
        let lines = [CartLine::new("haraz", 1)];
        let quote = ShippingQuoteState::Accepted { amount: omr(2_345) };
        let total = compute_order(
            &lines,
            &catalog(),
            &api(),
            &quote,
            &settings(),
            Currency::Usd,
            Utc::now(),
        )
        .unwrap();

        match total {
            OrderTotal::Complete {
                subtotal, shipping, ..
            } => {
                assert_eq!(subtotal, Money::new(1_300, Currency::Usd));
                // 2.345 × 2.6 = 6.097 → 6.10
                assert_eq!(shipping, Money::new(610, Currency::Usd));
            }
            other => panic!("expected complete total, got {:?}", other),
        }
    }

    #[test]
    fn test_unresolved_shipping_is_incomplete() {
        let lines = [CartLine::new("haraz", 1)];
        let cases = [
            (ShippingQuoteState::Pending, ShippingUnresolved::QuotePending),
            (
                ShippingQuoteState::Failed {
                    detail: "HTTP 503".to_string(),
                },
                ShippingUnresolved::ProviderFailed {
                    detail: "HTTP 503".to_string(),
                },
            ),
            (
                ShippingQuoteState::InvalidDestination {
                    reason: "city is required".to_string(),
                },
                ShippingUnresolved::InvalidDestination {
                    reason: "city is required".to_string(),
                },
            ),
        ];

        for (quote, expected) in cases {
            let total = compute_order(
                &lines,
                &catalog(),
                &api(),
                &quote,
                &settings(),
                Currency::Omr,
                Utc::now(),
            )
            .unwrap();
            assert_eq!(
                total,
                OrderTotal::Incomplete {
                    subtotal: omr(5_000),
                    tax: omr(0),
                    reason: expected,
                }
            );
        }
    }

    #[test]
    fn test_disabled_method_is_incomplete() {
        let mut method = flat();
        method.enabled = false;
        let total = compute_order(
            &[CartLine::new("haraz", 1)],
            &catalog(),
            &method,
            &ShippingQuoteState::Pending,
            &settings(),
            Currency::Omr,
            Utc::now(),
        )
        .unwrap();
        assert!(!total.is_complete());
    }

    #[test]
    fn test_pricing_errors_propagate() {
        let err = compute_order(
            &[CartLine::new("missing", 1)],
            &catalog(),
            &flat(),
            &ShippingQuoteState::Pending,
            &settings(),
            Currency::Omr,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::ProductNotFound(_)));

        let mut catalog = catalog();
        catalog.insert(Product {
            prices: CurrencyAmounts::default(),
            ..product("unpriced", "beans", 0)
        });
        let err = compute_order(
            &[CartLine::new("unpriced", 1)],
            &catalog,
            &flat(),
            &ShippingQuoteState::Pending,
            &settings(),
            Currency::Omr,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Pricing(PricingError::MissingPriceData { .. })
        ));
    }
}
