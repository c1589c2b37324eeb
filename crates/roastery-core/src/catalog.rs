//! # Catalog Types
//!
//! Products, variant properties and their currency-specific prices.
//!
//! ## Price Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Product & Variant Pricing                          │
//! │                                                                         │
//! │  Product "Yemen Haraz"                                                 │
//! │  ├── prices      { OMR: 5000 }              (base, minor units)        │
//! │  ├── sale?       Absolute { OMR: 4500 } 1–7 Mar                        │
//! │  └── properties                                                        │
//! │      ├── "Size/Weight" (SizeWeight)                                    │
//! │      │    ├── "250g"   no price            → base price                │
//! │      │    └── "1kg"    Absolute { OMR: 17000, USD: 4400 }              │
//! │      └── "Grind" (Grind)                                               │
//! │           └── "Espresso"  Modifier { OMR: 200 }                        │
//! │                                                                         │
//! │  PriceSpec is decided ONCE when records are loaded. Readers never      │
//! │  guess whether a number is a delta or a replacement.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::currency::Currency;
use crate::money::Money;
use crate::types::{CategoryKind, PropertyKind};

// =============================================================================
// Currency Amounts
// =============================================================================

/// An optional minor-unit amount per supported currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct CurrencyAmounts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub omr: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usd: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sar: Option<i64>,
}

impl CurrencyAmounts {
    /// Amounts with only the base currency set.
    pub const fn base(omr_minor: i64) -> Self {
        CurrencyAmounts {
            omr: Some(omr_minor),
            usd: None,
            sar: None,
        }
    }

    /// Returns a copy with `currency` set to `minor`.
    pub fn with(mut self, currency: Currency, minor: i64) -> Self {
        *self.slot_mut(currency) = Some(minor);
        self
    }

    /// The amount in `currency`, if one is stored.
    pub fn get(&self, currency: Currency) -> Option<Money> {
        let minor = match currency {
            Currency::Omr => self.omr,
            Currency::Usd => self.usd,
            Currency::Sar => self.sar,
        };
        minor.map(|m| Money::new(m, currency))
    }

    /// True when no currency carries an amount.
    pub fn is_empty(&self) -> bool {
        self.omr.is_none() && self.usd.is_none() && self.sar.is_none()
    }

    fn slot_mut(&mut self, currency: Currency) -> &mut Option<i64> {
        match currency {
            Currency::Omr => &mut self.omr,
            Currency::Usd => &mut self.usd,
            Currency::Sar => &mut self.sar,
        }
    }
}

// =============================================================================
// Price Spec
// =============================================================================

/// How an option (or a sale) affects the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "amounts", rename_all = "snake_case")]
pub enum PriceSpec {
    /// Replaces the running base price.
    Absolute(CurrencyAmounts),
    /// Adds a delta to the price.
    Modifier(CurrencyAmounts),
}

impl PriceSpec {
    /// The per-currency amounts regardless of kind.
    pub fn amounts(&self) -> &CurrencyAmounts {
        match self {
            PriceSpec::Absolute(amounts) | PriceSpec::Modifier(amounts) => amounts,
        }
    }

    /// True for `Absolute`.
    pub fn is_absolute(&self) -> bool {
        matches!(self, PriceSpec::Absolute(_))
    }
}

// =============================================================================
// Sale Override
// =============================================================================

/// Time window of a sale. Open bounds are unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SaleWindow {
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
}

impl SaleWindow {
    /// True when `at` is inside `[starts_at, ends_at)`.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let started = self.starts_at.map_or(true, |start| at >= start);
        let not_ended = self.ends_at.map_or(true, |end| at < end);
        started && not_ended
    }
}

/// A time-windowed price that takes precedence over regular pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleOverride {
    pub price: PriceSpec,
    /// Merchant toggle. An expired window wins over a stale `true`.
    pub on_sale: bool,
    #[serde(default)]
    pub window: SaleWindow,
}

impl SaleOverride {
    /// True when the toggle is on and `at` falls inside the window.
    pub fn is_active(&self, at: DateTime<Utc>) -> bool {
        self.on_sale && self.window.contains(at)
    }

    /// The sale amount in `currency`, only while active.
    ///
    /// Sale amounts are never derived from another currency: a sale without
    /// a USD amount simply does not apply to USD prices.
    pub fn active_amount(&self, currency: Currency, at: DateTime<Utc>) -> Option<Money> {
        if self.is_active(at) {
            self.price.amounts().get(currency)
        } else {
            None
        }
    }
}

// =============================================================================
// Properties & Options
// =============================================================================

/// A variant dimension of a product, e.g. "Size/Weight".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PropertyRecord")]
pub struct ProductProperty {
    pub id: String,
    pub name: String,
    pub kind: PropertyKind,
}

impl ProductProperty {
    /// Creates a property, inferring its kind from the name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        ProductProperty {
            id: id.into(),
            kind: PropertyKind::infer(&name),
            name,
        }
    }
}

#[derive(Deserialize)]
struct PropertyRecord {
    id: String,
    name: String,
    #[serde(default)]
    kind: Option<PropertyKind>,
}

impl From<PropertyRecord> for ProductProperty {
    fn from(record: PropertyRecord) -> Self {
        let kind = record
            .kind
            .unwrap_or_else(|| PropertyKind::infer(&record.name));
        ProductProperty {
            id: record.id,
            name: record.name,
            kind,
        }
    }
}

/// One selectable value of a property, e.g. "250g".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariantOption {
    pub id: String,
    pub property_id: String,
    pub label: String,
    #[serde(default)]
    pub price: Option<PriceSpec>,
    #[serde(default)]
    pub sale: Option<SaleOverride>,
}

// =============================================================================
// Legacy Option Records
// =============================================================================

/// Variant option as stored by the admin backend.
///
/// Older records carry loose decimal fields (`price_modifier` without a
/// currency suffix means OMR). This record is converted to a
/// [`ProductVariantOption`] once, at load time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariantOptionRecord {
    pub id: String,
    pub property_id: String,
    #[serde(alias = "value")]
    pub label: String,

    pub price_omr: Option<f64>,
    pub price_usd: Option<f64>,
    pub price_sar: Option<f64>,

    pub price_modifier: Option<f64>,
    pub price_modifier_omr: Option<f64>,
    pub price_modifier_usd: Option<f64>,
    pub price_modifier_sar: Option<f64>,

    pub sale_price_omr: Option<f64>,
    pub sale_price_usd: Option<f64>,
    pub sale_price_sar: Option<f64>,

    pub sale_modifier_omr: Option<f64>,
    pub sale_modifier_usd: Option<f64>,
    pub sale_modifier_sar: Option<f64>,

    #[serde(default)]
    pub on_sale: bool,
    pub sale_starts_at: Option<DateTime<Utc>>,
    pub sale_ends_at: Option<DateTime<Utc>>,
}

/// Converts a decimal major-unit amount to minor units.
fn to_minor(value: f64, currency: Currency) -> i64 {
    (value * currency.minor_per_major() as f64).round() as i64
}

fn amounts_from(omr: Option<f64>, usd: Option<f64>, sar: Option<f64>) -> CurrencyAmounts {
    CurrencyAmounts {
        omr: omr.map(|v| to_minor(v, Currency::Omr)),
        usd: usd.map(|v| to_minor(v, Currency::Usd)),
        sar: sar.map(|v| to_minor(v, Currency::Sar)),
    }
}

impl From<VariantOptionRecord> for ProductVariantOption {
    fn from(record: VariantOptionRecord) -> Self {
        let absolute = amounts_from(record.price_omr, record.price_usd, record.price_sar);
        let modifier = amounts_from(
            record.price_modifier_omr.or(record.price_modifier),
            record.price_modifier_usd,
            record.price_modifier_sar,
        );
        let price = if !absolute.is_empty() {
            Some(PriceSpec::Absolute(absolute))
        } else if !modifier.is_empty() {
            Some(PriceSpec::Modifier(modifier))
        } else {
            None
        };

        let sale_absolute = amounts_from(
            record.sale_price_omr,
            record.sale_price_usd,
            record.sale_price_sar,
        );
        let sale_modifier = amounts_from(
            record.sale_modifier_omr,
            record.sale_modifier_usd,
            record.sale_modifier_sar,
        );
        let sale_price = if !sale_absolute.is_empty() {
            Some(PriceSpec::Absolute(sale_absolute))
        } else if !sale_modifier.is_empty() {
            Some(PriceSpec::Modifier(sale_modifier))
        } else {
            None
        };
        let sale = sale_price.map(|price| SaleOverride {
            price,
            on_sale: record.on_sale,
            window: SaleWindow {
                starts_at: record.sale_starts_at,
                ends_at: record.sale_ends_at,
            },
        });

        ProductVariantOption {
            id: record.id,
            property_id: record.property_id,
            label: record.label,
            price,
            sale,
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A sellable product with its variant structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Storefront category id, the key for tax lookups.
    pub category_id: String,
    /// Broad kind of goods, the key for default weights.
    #[serde(default)]
    pub category_kind: CategoryKind,
    /// Base price per currency.
    pub prices: CurrencyAmounts,
    /// Product-level sale. Only `Absolute` sales apply at this level.
    #[serde(default)]
    pub sale: Option<SaleOverride>,
    /// Stored shipping weight.
    #[serde(default)]
    pub weight_grams: Option<i64>,
    /// Properties in display order. Pricing visits options in this order.
    #[serde(default)]
    pub properties: Vec<ProductProperty>,
    #[serde(default)]
    pub options: Vec<ProductVariantOption>,
}

impl Product {
    /// Looks up a property by id.
    pub fn property(&self, property_id: &str) -> Option<&ProductProperty> {
        self.properties.iter().find(|p| p.id == property_id)
    }

    /// Looks up an option by id.
    pub fn option(&self, option_id: &str) -> Option<&ProductVariantOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    /// Options belonging to one property.
    pub fn options_for<'a>(
        &'a self,
        property_id: &'a str,
    ) -> impl Iterator<Item = &'a ProductVariantOption> + 'a {
        self.options
            .iter()
            .filter(move |o| o.property_id == property_id)
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Products by id, as loaded for one checkout.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: HashMap<String, Product>,
}

impl Catalog {
    /// Builds a catalog from loaded products.
    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        Catalog {
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    /// Looks up a product.
    pub fn get(&self, product_id: &str) -> Option<&Product> {
        self.products.get(product_id)
    }

    /// Adds or replaces a product.
    pub fn insert(&mut self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_currency_amounts_get() {
        let amounts = CurrencyAmounts::base(5_000).with(Currency::Usd, 1_300);
        assert_eq!(amounts.get(Currency::Omr), Some(Money::new(5_000, Currency::Omr)));
        assert_eq!(amounts.get(Currency::Usd), Some(Money::new(1_300, Currency::Usd)));
        assert_eq!(amounts.get(Currency::Sar), None);
        assert!(CurrencyAmounts::default().is_empty());
    }

    #[test]
    fn test_sale_window_bounds() {
        let window = SaleWindow {
            starts_at: Some(at(1)),
            ends_at: Some(at(7)),
        };
        assert!(!window.contains(at(1) - chrono::Duration::seconds(1)));
        assert!(window.contains(at(1)));
        assert!(window.contains(at(6)));
        assert!(!window.contains(at(7)));
        assert!(SaleWindow::default().contains(at(20)));
    }

    #[test]
    fn test_expired_sale_is_inactive_even_when_flagged() {
        let sale = SaleOverride {
            price: PriceSpec::Absolute(CurrencyAmounts::base(4_000)),
            on_sale: true,
            window: SaleWindow {
                starts_at: None,
                ends_at: Some(at(5)),
            },
        };
        assert!(sale.is_active(at(4)));
        assert!(!sale.is_active(at(6)));
        assert_eq!(sale.active_amount(Currency::Omr, at(6)), None);
        // No USD amount means no USD sale, even while active
        assert_eq!(sale.active_amount(Currency::Usd, at(4)), None);
    }

    #[test]
    fn test_record_with_absolute_price() {
        let record: VariantOptionRecord = serde_json::from_value(serde_json::json!({
            "id": "opt-1kg",
            "property_id": "size",
            "value": "1kg",
            "price_omr": 17.0,
            "price_usd": 44.2,
            "price_modifier": 3.0,
            "sale_price_omr": 15.5,
            "on_sale": true
        }))
        .unwrap();
        let option = ProductVariantOption::from(record);

        // Absolute wins over a stray modifier on the same record
        assert_eq!(
            option.price,
            Some(PriceSpec::Absolute(
                CurrencyAmounts::base(17_000).with(Currency::Usd, 4_420)
            ))
        );
        let sale = option.sale.unwrap();
        assert_eq!(sale.price, PriceSpec::Absolute(CurrencyAmounts::base(15_500)));
        assert!(sale.on_sale);
    }

    #[test]
    fn test_record_with_legacy_modifier() {
        let record: VariantOptionRecord = serde_json::from_value(serde_json::json!({
            "id": "opt-espresso",
            "property_id": "grind",
            "label": "Espresso",
            "price_modifier": 0.2
        }))
        .unwrap();
        let option = ProductVariantOption::from(record);
        assert_eq!(
            option.price,
            Some(PriceSpec::Modifier(CurrencyAmounts::base(200)))
        );
        assert_eq!(option.sale, None);
    }

    #[test]
    fn test_property_kind_inferred_on_deserialize() {
        let property: ProductProperty =
            serde_json::from_str(r#"{"id":"p1","name":"Size/Weight"}"#).unwrap();
        assert_eq!(property.kind, PropertyKind::SizeWeight);

        let explicit: ProductProperty =
            serde_json::from_str(r#"{"id":"p2","name":"Bag","kind":"size_weight"}"#).unwrap();
        assert_eq!(explicit.kind, PropertyKind::SizeWeight);
    }

    #[test]
    fn test_price_spec_serde_shape() {
        let spec = PriceSpec::Modifier(CurrencyAmounts::base(200));
        let json = serde_json::to_value(spec).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "modifier", "amounts": {"OMR": 200}})
        );
    }
}
