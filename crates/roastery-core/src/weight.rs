//! # Weight Resolution
//!
//! Derives a shipping weight for each cart line from free-text variant labels.
//!
//! ## Resolution Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Where a Line's Weight Comes From                     │
//! │                                                                         │
//! │  1. Selected "Size/Weight" option label                                │
//! │       "250g" / "1.5 kg" / "500 جرام" / "٢٥٠ غ"                          │
//! │       │                                                                 │
//! │       ├── parsed > 0 ──────────────────────────────► use it            │
//! │       │                                                                 │
//! │  2. Product.weight_grams ──── present, > 0 ────────► use it            │
//! │       │                                                                 │
//! │  3. Category default table ────────────────────────► use it            │
//! │       beans/ground 250 g, capsules 100 g, equipment 1 kg,              │
//! │       accessories 500 g, apparel 300 g, other 500 g                    │
//! │                                                                         │
//! │  Cart weight      = Σ line weight × quantity                           │
//! │  Shipping weight  = max(cart weight, 100 g), rejected above 50 kg      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Gram/Kilogram Ambiguity
//! Labels are typed by merchants. A bare "250" is grams; a bare "1.5" is
//! kilograms. The storefront has always told them apart by magnitude: above
//! 10 means grams. That rule also turns "15kg" into 15 grams.
//!
//! Both behaviors are available as a [`WeightParseStrategy`]. The magnitude
//! rule stays the default until the merchant confirms their label
//! conventions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};
use ts_rs::TS;

use crate::cart::CartLine;
use crate::catalog::{Catalog, Product};
use crate::error::{CoreError, ValidationError};
use crate::types::PropertyKind;
use crate::validation::validate_shipping_weight;

// =============================================================================
// Constants
// =============================================================================

/// Carrier minimum billable weight.
pub const MIN_SHIPPING_WEIGHT_GRAMS: i64 = 100;

/// Carrier maximum weight per shipment.
pub const MAX_SHIPPING_WEIGHT_GRAMS: i64 = 50_000;

/// Values above this are read as grams by the magnitude heuristic.
const GRAMS_THRESHOLD: f64 = 10.0;

/// Largest weight a size label may state. Anything above is not a size.
const MAX_LABEL_GRAMS: i64 = 1_000_000;

const KILOGRAM_TOKENS: &[&str] = &[
    "kg", "kgs", "kilo", "kilos", "kilogram", "kilograms", "كجم", "كغ", "كيلو", "كيلوجرام",
    "كيلوغرام",
];

const GRAM_TOKENS: &[&str] = &[
    "g", "gm", "gms", "gr", "grs", "gram", "grams", "جرام", "غرام", "جم", "غ", "ج",
];

// =============================================================================
// Weight
// =============================================================================

/// A weight in whole grams.
///
/// Integer grams for the same reason money is integer baisa: sums of many
/// small bags must not drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Weight(i64);

impl Weight {
    #[inline]
    pub const fn from_grams(grams: i64) -> Self {
        Weight(grams)
    }

    /// Rounds to the nearest gram.
    pub fn from_kilograms(kg: f64) -> Self {
        Weight((kg * 1000.0).round() as i64)
    }

    #[inline]
    pub const fn grams(&self) -> i64 {
        self.0
    }

    /// Kilograms, as carriers expect.
    #[inline]
    pub fn kilograms(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Weight(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies by a line quantity, saturating at `i64::MAX` grams.
    #[inline]
    pub const fn times(&self, qty: u32) -> Self {
        Weight(self.0.saturating_mul(qty as i64))
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} kg", self.kilograms())
    }
}

impl Add for Weight {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Weight(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Weight {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

// =============================================================================
// Label Parsing
// =============================================================================

/// How to read a number out of a size label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightParseStrategy {
    /// Current storefront behavior: a value above 10 is grams, otherwise
    /// kilograms. Unit tokens are ignored, so "15kg" reads as 15 g.
    #[default]
    MagnitudeHeuristic,
    /// An explicit unit token decides; magnitude only applies to bare
    /// numbers. "15kg" reads as 15 kg.
    UnitTokenFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitToken {
    Grams,
    Kilograms,
}

/// Maps Arabic-Indic digits and the Arabic decimal separator to ASCII and
/// drops thousands separators.
fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter_map(|c| match c {
            '\u{0660}'..='\u{0669}' => char::from_digit(c as u32 - 0x0660, 10),
            '\u{06F0}'..='\u{06F9}' => char::from_digit(c as u32 - 0x06F0, 10),
            '\u{066B}' => Some('.'),
            ',' | '\u{066C}' => None,
            other => Some(other),
        })
        .flat_map(char::to_lowercase)
        .collect()
}

/// First explicit unit token in the label, if any.
///
/// Letters are grouped into runs; a run must match a token exactly, so the
/// "g" in "Guatemala" does not count.
fn find_unit(normalized: &str) -> Option<UnitToken> {
    normalized
        .split(|c: char| !c.is_alphabetic())
        .filter(|run| !run.is_empty())
        .find_map(|run| {
            if KILOGRAM_TOKENS.contains(&run) {
                Some(UnitToken::Kilograms)
            } else if GRAM_TOKENS.contains(&run) {
                Some(UnitToken::Grams)
            } else {
                None
            }
        })
}

/// First decimal number in the label ("1.5", ".5", "250").
fn first_number(normalized: &str) -> Option<f64> {
    let chars: Vec<char> = normalized.chars().collect();
    let start = chars.iter().enumerate().position(|(i, c)| {
        c.is_ascii_digit()
            || (*c == '.' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit()))
    })?;

    let mut token = String::new();
    let mut seen_dot = false;
    for &c in &chars[start..] {
        if c.is_ascii_digit() {
            token.push(c);
        } else if c == '.' && !seen_dot {
            seen_dot = true;
            token.push(c);
        } else {
            break;
        }
    }

    token.trim_end_matches('.').parse::<f64>().ok()
}

/// Parses a free-text size label into a weight.
///
/// Returns `None` when the label has no positive number.
///
/// ```rust
/// use roastery_core::weight::{parse_weight, WeightParseStrategy::*};
///
/// assert_eq!(parse_weight("250g", MagnitudeHeuristic).unwrap().kilograms(), 0.25);
/// assert_eq!(parse_weight("1.5 kg", MagnitudeHeuristic).unwrap().kilograms(), 1.5);
/// assert_eq!(parse_weight("15kg", MagnitudeHeuristic).unwrap().kilograms(), 0.015);
/// assert_eq!(parse_weight("15kg", UnitTokenFirst).unwrap().kilograms(), 15.0);
/// ```
pub fn parse_weight(label: &str, strategy: WeightParseStrategy) -> Option<Weight> {
    let normalized = normalize_label(label);
    let value = first_number(&normalized)?;
    if !value.is_finite() || value <= 0.0 {
        return None;
    }

    let by_magnitude = || {
        if value > GRAMS_THRESHOLD {
            UnitToken::Grams
        } else {
            UnitToken::Kilograms
        }
    };
    let unit = match strategy {
        WeightParseStrategy::MagnitudeHeuristic => by_magnitude(),
        WeightParseStrategy::UnitTokenFirst => find_unit(&normalized).unwrap_or_else(by_magnitude),
    };

    let weight = match unit {
        UnitToken::Grams => Weight::from_grams(value.round() as i64),
        UnitToken::Kilograms => Weight::from_kilograms(value),
    };
    (!weight.is_zero() && weight.grams() <= MAX_LABEL_GRAMS).then_some(weight)
}

// =============================================================================
// Weight Resolver
// =============================================================================

/// Resolves line, cart and shipping weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightResolver {
    strategy: WeightParseStrategy,
}

impl WeightResolver {
    pub fn new(strategy: WeightParseStrategy) -> Self {
        WeightResolver { strategy }
    }

    pub fn strategy(&self) -> WeightParseStrategy {
        self.strategy
    }

    /// Weight of ONE unit of the line's product and selection.
    pub fn resolve_line_weight(&self, line: &CartLine, product: &Product) -> Weight {
        let from_label = product
            .properties
            .iter()
            .filter(|p| p.kind == PropertyKind::SizeWeight)
            .filter_map(|p| line.selected(&p.id))
            .filter_map(|option_id| product.option(option_id))
            .find_map(|option| parse_weight(&option.label, self.strategy));
        if let Some(weight) = from_label {
            return weight;
        }

        if let Some(grams) = product.weight_grams.filter(|g| *g > 0) {
            return Weight::from_grams(grams);
        }

        Weight::from_grams(product.category_kind.default_weight_grams())
    }

    /// Σ unit weight × quantity over the cart.
    pub fn cart_weight(&self, lines: &[CartLine], catalog: &Catalog) -> Result<Weight, CoreError> {
        let mut total = Weight::zero();
        for line in lines {
            let product = catalog
                .get(&line.product_id)
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;
            total += self.resolve_line_weight(line, product).times(line.quantity);
        }
        Ok(total)
    }
}

/// Applies the carrier minimum: `max(total, 100 g)`.
pub fn shipping_weight(total: Weight) -> Weight {
    total.max(Weight::from_grams(MIN_SHIPPING_WEIGHT_GRAMS))
}

/// Shipping weight, rejected above the 50 kg carrier maximum.
pub fn shippable_weight(total: Weight) -> Result<Weight, ValidationError> {
    let weight = shipping_weight(total);
    validate_shipping_weight(weight)?;
    Ok(weight)
}

// =============================================================================
// Unit Tests
// =============================================================================
