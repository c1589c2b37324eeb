//! # Error Types
//!
//! Domain-specific error types for roastery-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  roastery-core errors (this file)                                      │
//! │  ├── CoreError        - Anything the order computation can fail with   │
//! │  ├── PricingError     - Catalog data cannot produce a price            │
//! │  └── ValidationError  - Input the customer can correct                 │
//! │                                                                         │
//! │  roastery-rates errors (separate crate)                                │
//! │  └── RatesError       - Carrier, transport and config failures         │
//! │                                                                         │
//! │  Flow: ValidationError / PricingError → CoreError → storefront message │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Recovery Rules
//! - `ValidationError` is user-actionable and never fatal.
//! - `PricingError` is a catalog configuration defect. The order total is not
//!   computed when one occurs; a line is never priced at zero instead.

use thiserror::Error;

use crate::currency::Currency;

// =============================================================================
// Core Error
// =============================================================================

/// Errors produced while computing an order.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A cart line references a product the catalog does not contain.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The selected shipping method is not configured.
    #[error("Shipping method not found: {0}")]
    ShippingMethodNotFound(String),

    /// Pricing data is missing or inconsistent (wraps PricingError).
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Pricing Error
// =============================================================================

/// Catalog data that cannot produce a deterministic price.
///
/// ## When This Occurs
/// ```text
/// Product "Ethiopia Guji" has no OMR price and no USD price
///      │
///      ▼
/// resolve_line_price(.., USD)
///      │
///      ▼
/// MissingPriceData { product_id: "ethiopia-guji", currency: USD }
///      │
///      ▼
/// Storefront shows "price unavailable", admin gets a config warning
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// Neither the requested currency nor the base currency carries a price.
    #[error("Missing price data for {product_id} in {currency}")]
    MissingPriceData {
        product_id: String,
        currency: Currency,
    },

    /// A selected option id is not an option of the product/property.
    #[error("Option {option_id} is not valid for property {property_id} of {product_id}")]
    UnknownOption {
        product_id: String,
        property_id: String,
        option_id: String,
    },

    /// Line quantity below one.
    #[error("Quantity {0} is invalid, must be at least 1")]
    InvalidQuantity(u32),

    /// Resolution produced a negative unit price.
    #[error("Resolved price for {product_id} is negative in {currency}")]
    NegativePrice {
        product_id: String,
        currency: Currency,
    },

    /// Two amounts in different currencies were combined.
    #[error("Cannot add {found} to an amount in {expected}")]
    CurrencyMismatch { expected: Currency, found: Currency },
}

impl PricingError {
    /// Stable machine-readable kind, used by the storefront to pick a message.
    pub fn kind(&self) -> &'static str {
        match self {
            PricingError::MissingPriceData { .. } => "missing-price-data",
            PricingError::UnknownOption { .. } => "unknown-option",
            PricingError::InvalidQuantity(_) => "invalid-quantity",
            PricingError::NegativePrice { .. } => "negative-price",
            PricingError::CurrencyMismatch { .. } => "currency-mismatch",
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when customer input doesn't meet requirements.
/// They are recovered locally and surfaced as a message next to the field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., unknown currency code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Country code is not in the geography table.
    #[error("Unknown country: {0}")]
    UnknownCountry(String),

    /// Country exists but checkout does not ship there.
    #[error("Shipping to {0} is not enabled")]
    CountryNotEnabled(String),

    /// State does not belong to the selected country.
    #[error("{state} is not a state of {country}")]
    StateNotInCountry { country: String, state: String },

    /// City does not belong to the selected state.
    #[error("{city} is not a city of {state}")]
    CityNotInState { state: String, city: String },

    /// The carrier does not deliver to this (country, city) pair.
    #[error("The carrier does not deliver to {city}, {country}")]
    NotServiceable { country: String, city: String },

    /// Shipment weight outside the carrier's limits (grams).
    #[error("Shipment weight {grams} g exceeds the maximum of {max_grams} g")]
    WeightOutOfRange { grams: i64, max_grams: i64 },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience type alias for pricing results.
pub type PricingResult<T> = Result<T, PricingError>;

// =============================================================================
// Unit Tests
// =============================================================================
