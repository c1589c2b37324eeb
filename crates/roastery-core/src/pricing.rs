//! # Pricing Resolver
//!
//! Resolves the unit price and line total of a cart line in one currency.
//!
//! ## Precedence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   How a Unit Price Is Built                             │
//! │                                                                         │
//! │  base = product.prices[currency]                                       │
//! │         (or OMR price × fixed multiplier, or MissingPriceData)         │
//! │         (or active product sale price)                                 │
//! │                                                                         │
//! │  for each selected option, in property order:                          │
//! │     active ABSOLUTE sale ──► line sale price = it      (wins outright) │
//! │     active MODIFIER sale ──► modifiers += sale delta   (not + regular) │
//! │     regular ABSOLUTE     ──► base = it                 (replaces)      │
//! │     regular MODIFIER     ──► modifiers += delta        (adds)          │
//! │                                                                         │
//! │  unit  = line sale price  OR  base + modifiers                         │
//! │  total = unit × quantity                                               │
//! │                                                                         │
//! │  Absolute > modifier, sale > regular. Every currency is evaluated on   │
//! │  its own: a sale with only an OMR amount does not touch USD prices.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use chrono::Utc;
//! use roastery_core::cart::CartLine;
//! use roastery_core::catalog::{CurrencyAmounts, Product};
//! use roastery_core::currency::Currency;
//! use roastery_core::pricing::PricingResolver;
//!
//! let product = Product {
//!     id: "haraz".into(),
//!     name: "Yemen Haraz".into(),
//!     category_id: "beans".into(),
//!     category_kind: Default::default(),
//!     prices: CurrencyAmounts::base(5_000),
//!     sale: None,
//!     weight_grams: None,
//!     properties: vec![],
//!     options: vec![],
//! };
//! let line = CartLine::new("haraz", 3);
//!
//! let price = PricingResolver::default()
//!     .resolve_line_price(&product, &line, Currency::Usd, Utc::now())
//!     .unwrap();
//! assert_eq!(price.unit_price.minor(), 1_300); // derived: 5.000 OMR × 2.6
//! assert_eq!(price.total.minor(), 3_900);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::CartLine;
use crate::catalog::{CurrencyAmounts, PriceSpec, Product, ProductVariantOption};
use crate::currency::{Currency, CurrencyConverter};
use crate::error::{PricingError, PricingResult};
use crate::money::Money;

// =============================================================================
// Line Price
// =============================================================================

/// Resolved price of one cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LinePrice {
    pub unit_price: Money,
    pub quantity: u32,
    /// `unit_price × quantity`
    pub total: Money,
    /// True when any active sale shaped the unit price.
    pub on_sale: bool,
    /// What the unit price would be with every sale ignored. Only set when
    /// `on_sale` is true, for strike-through display.
    pub original_unit_price: Option<Money>,
}

// =============================================================================
// Resolver
// =============================================================================

/// Resolves line prices. Holds only the currency converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingResolver {
    converter: CurrencyConverter,
}

/// Result of one evaluation pass.
struct Evaluation {
    unit: Money,
    on_sale: bool,
}

impl PricingResolver {
    pub fn new(converter: CurrencyConverter) -> Self {
        PricingResolver { converter }
    }

    pub fn converter(&self) -> &CurrencyConverter {
        &self.converter
    }

    /// Resolves `line` against `product` in `currency` at instant `at`.
    ///
    /// ## Errors
    /// - `InvalidQuantity` when the quantity is zero
    /// - `UnknownOption` when the selection names a property or option the
    ///   product does not have
    /// - `MissingPriceData` when a required price has no amount in either
    ///   `currency` or OMR
    /// - `NegativePrice` when modifiers drive the unit price below zero
    pub fn resolve_line_price(
        &self,
        product: &Product,
        line: &CartLine,
        currency: Currency,
        at: DateTime<Utc>,
    ) -> PricingResult<LinePrice> {
        if line.quantity == 0 {
            return Err(PricingError::InvalidQuantity(line.quantity));
        }

        let selected = selected_options(product, line)?;
        let priced = self.evaluate(product, &selected, currency, at, true)?;

        let original_unit_price = if priced.on_sale {
            Some(self.evaluate(product, &selected, currency, at, false)?.unit)
        } else {
            None
        };

        Ok(LinePrice {
            unit_price: priced.unit,
            quantity: line.quantity,
            total: priced.unit.multiply_quantity(line.quantity),
            on_sale: priced.on_sale,
            original_unit_price,
        })
    }

    fn evaluate(
        &self,
        product: &Product,
        selected: &[&ProductVariantOption],
        currency: Currency,
        at: DateTime<Utc>,
        apply_sales: bool,
    ) -> PricingResult<Evaluation> {
        // Whether `base` currently holds a product sale price
        let mut base_on_sale = false;
        let mut modifier_on_sale = false;

        let mut base = self.regular_amount(&product.prices, product, currency)?;
        if apply_sales {
            let product_sale = product
                .sale
                .as_ref()
                .filter(|sale| sale.price.is_absolute())
                .and_then(|sale| sale.active_amount(currency, at));
            if let Some(sale_price) = product_sale {
                base = sale_price;
                base_on_sale = true;
            }
        }

        let mut modifiers = Money::zero(currency);
        let mut absolute_sale: Option<Money> = None;

        for option in selected {
            let sale = if apply_sales {
                option.sale.as_ref().and_then(|sale| {
                    sale.active_amount(currency, at)
                        .map(|amount| (sale.price.is_absolute(), amount))
                })
            } else {
                None
            };

            match (sale, option.price.as_ref()) {
                (Some((true, sale_price)), _) => {
                    absolute_sale = Some(sale_price);
                }
                (Some((false, sale_delta)), regular) => {
                    // The sale delta stands in for this option's regular delta
                    modifiers += sale_delta;
                    modifier_on_sale = true;
                    if let Some(PriceSpec::Absolute(amounts)) = regular {
                        base = self.regular_amount(amounts, product, currency)?;
                        base_on_sale = false;
                    }
                }
                (None, Some(PriceSpec::Absolute(amounts))) => {
                    base = self.regular_amount(amounts, product, currency)?;
                    base_on_sale = false;
                }
                (None, Some(PriceSpec::Modifier(amounts))) => {
                    modifiers += self.regular_amount(amounts, product, currency)?;
                }
                (None, None) => {}
            }
        }

        let (unit, on_sale) = match absolute_sale {
            Some(sale_price) => (sale_price, true),
            None => (base + modifiers, base_on_sale || modifier_on_sale),
        };
        if unit.is_negative() {
            return Err(PricingError::NegativePrice {
                product_id: product.id.clone(),
                currency,
            });
        }

        Ok(Evaluation { unit, on_sale })
    }

    /// A regular (non-sale) amount in `currency`, derived from OMR when the
    /// currency has no explicit amount.
    fn regular_amount(
        &self,
        amounts: &CurrencyAmounts,
        product: &Product,
        currency: Currency,
    ) -> PricingResult<Money> {
        amounts
            .get(currency)
            .or_else(|| {
                amounts
                    .get(Currency::BASE)
                    .map(|base| self.converter.from_base(base, currency))
            })
            .ok_or_else(|| PricingError::MissingPriceData {
                product_id: product.id.clone(),
                currency,
            })
    }
}

/// Selected options in product property order, validated against the product.
fn selected_options<'a>(
    product: &'a Product,
    line: &CartLine,
) -> PricingResult<Vec<&'a ProductVariantOption>> {
    let unknown = |property_id: &str, option_id: &str| PricingError::UnknownOption {
        product_id: product.id.clone(),
        property_id: property_id.to_string(),
        option_id: option_id.to_string(),
    };

    if let Some((property_id, option_id)) = line
        .selected_property_options
        .iter()
        .find(|(property_id, _)| product.property(property_id).is_none())
    {
        return Err(unknown(property_id, option_id));
    }

    let mut selected = Vec::new();
    for property in &product.properties {
        let Some(option_id) = line.selected(&property.id) else {
            continue;
        };
        let option = product
            .option(option_id)
            .filter(|o| o.property_id == property.id)
            .ok_or_else(|| unknown(&property.id, option_id))?;
        selected.push(option);
    }
    Ok(selected)
}

// =============================================================================
// Unit Tests
// =============================================================================
