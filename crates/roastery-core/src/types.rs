//! # Domain Types
//!
//! Small value types shared by every checkout module.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Shared Value Types                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │  CategoryKind   │   │  PropertyKind   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  CoffeeBeans    │   │  SizeWeight     │       │
//! │  │  500 = 5%       │   │  Capsules ...   │   │  Grind, Color   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000. 500 bps = 5% (Oman VAT).
///
/// Settings documents store rates as fractions (`0.05`); serde converts at the
/// boundary and rejects anything outside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a fraction (0.05 = 5%).
    pub fn from_fraction(fraction: f64) -> Result<Self, ValidationError> {
        if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            return Err(ValidationError::OutOfRange {
                field: "tax_rate".to_string(),
                min: 0,
                max: 1,
            });
        }
        Ok(TaxRate((fraction * 10_000.0).round() as u32))
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a fraction (for display only).
    #[inline]
    pub fn fraction(&self) -> f64 {
        self.0 as f64 / 10_000.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

impl TryFrom<f64> for TaxRate {
    type Error = ValidationError;

    fn try_from(fraction: f64) -> Result<Self, Self::Error> {
        TaxRate::from_fraction(fraction)
    }
}

impl From<TaxRate> for f64 {
    fn from(rate: TaxRate) -> f64 {
        rate.fraction()
    }
}

// =============================================================================
// Category Kind
// =============================================================================

/// Broad product category, used for default shipping weights.
///
/// Tax uses the category *id* instead, because tax tables are configured per
/// storefront category while weights follow the kind of goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    CoffeeBeans,
    GroundCoffee,
    Capsules,
    Equipment,
    Accessories,
    Apparel,
    #[default]
    #[serde(other)]
    Other,
}

impl CategoryKind {
    /// Maps a storefront category slug or name to a kind.
    ///
    /// Matching is by keyword, English or Arabic, so `"specialty-beans"` and
    /// `"حبوب القهوة"` both land on `CoffeeBeans`.
    pub fn from_slug(slug: &str) -> Self {
        let slug = slug.trim().to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| slug.contains(w));

        if has(&["capsule", "pod", "كبسول"]) {
            CategoryKind::Capsules
        } else if has(&["ground", "مطحون"]) {
            CategoryKind::GroundCoffee
        } else if has(&["bean", "حبوب", "بن"]) {
            CategoryKind::CoffeeBeans
        } else if has(&["equipment", "machine", "grinder", "brewer", "معدات", "أجهزة", "مطحنة"]) {
            CategoryKind::Equipment
        } else if has(&["accessor", "اكسسوار", "إكسسوار", "أدوات"]) {
            CategoryKind::Accessories
        } else if has(&["apparel", "shirt", "merch", "ملابس"]) {
            CategoryKind::Apparel
        } else {
            CategoryKind::Other
        }
    }

    /// Default weight in grams when a product stores none.
    pub const fn default_weight_grams(self) -> i64 {
        match self {
            CategoryKind::CoffeeBeans | CategoryKind::GroundCoffee => 250,
            CategoryKind::Capsules => 100,
            CategoryKind::Equipment => 1_000,
            CategoryKind::Accessories => 500,
            CategoryKind::Apparel => 300,
            CategoryKind::Other => 500,
        }
    }
}

// =============================================================================
// Property Kind
// =============================================================================

/// What a variant property describes.
///
/// Only `SizeWeight` properties feed the weight resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    SizeWeight,
    Grind,
    Color,
    #[default]
    #[serde(other)]
    Other,
}

impl PropertyKind {
    /// Infers the kind from a property display name.
    pub fn infer(name: &str) -> Self {
        let name = name.trim().to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| name.contains(w));

        if has(&["weight", "size", "وزن", "حجم"]) {
            PropertyKind::SizeWeight
        } else if has(&["grind", "طحن"]) {
            PropertyKind::Grind
        } else if has(&["color", "colour", "لون"]) {
            PropertyKind::Color
        } else {
            PropertyKind::Other
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_fraction() {
        assert_eq!(TaxRate::from_fraction(0.05).unwrap().bps(), 500);
        assert_eq!(TaxRate::from_fraction(0.15).unwrap().bps(), 1_500);
        assert_eq!(TaxRate::from_fraction(0.0).unwrap(), TaxRate::zero());
        assert!(TaxRate::from_fraction(1.5).is_err());
        assert!(TaxRate::from_fraction(-0.01).is_err());
        assert!(TaxRate::from_fraction(f64::NAN).is_err());
    }

    #[test]
    fn test_tax_rate_serde_uses_fraction() {
        let rate: TaxRate = serde_json::from_str("0.05").unwrap();
        assert_eq!(rate.bps(), 500);
        assert_eq!(serde_json::to_string(&rate).unwrap(), "0.05");
        assert!(serde_json::from_str::<TaxRate>("2.0").is_err());
    }

    #[test]
    fn test_category_from_slug() {
        assert_eq!(CategoryKind::from_slug("Specialty Beans"), CategoryKind::CoffeeBeans);
        assert_eq!(CategoryKind::from_slug("ground-coffee"), CategoryKind::GroundCoffee);
        assert_eq!(CategoryKind::from_slug("nespresso-capsules"), CategoryKind::Capsules);
        assert_eq!(CategoryKind::from_slug("Grinders"), CategoryKind::Equipment);
        assert_eq!(CategoryKind::from_slug("قهوة مطحونة"), CategoryKind::GroundCoffee);
        assert_eq!(CategoryKind::from_slug("gift cards"), CategoryKind::Other);
    }

    #[test]
    fn test_category_default_weights() {
        assert_eq!(CategoryKind::CoffeeBeans.default_weight_grams(), 250);
        assert_eq!(CategoryKind::Capsules.default_weight_grams(), 100);
        assert_eq!(CategoryKind::Equipment.default_weight_grams(), 1_000);
        assert_eq!(CategoryKind::Other.default_weight_grams(), 500);
    }

    #[test]
    fn test_category_unknown_deserializes_as_other() {
        let kind: CategoryKind = serde_json::from_str("\"tea\"").unwrap();
        assert_eq!(kind, CategoryKind::Other);
    }

    #[test]
    fn test_property_kind_inference() {
        assert_eq!(PropertyKind::infer("Size/Weight"), PropertyKind::SizeWeight);
        assert_eq!(PropertyKind::infer("الوزن"), PropertyKind::SizeWeight);
        assert_eq!(PropertyKind::infer("Grind Type"), PropertyKind::Grind);
        assert_eq!(PropertyKind::infer("Roast"), PropertyKind::Other);
    }
}
