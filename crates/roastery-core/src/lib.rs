//! # roastery-core: Checkout Pricing for the Roastery Storefront
//!
//! Pure checkout logic: line pricing with variant overrides and sales,
//! currency conversion, shipping weights, destination validation, tax and the
//! order total. No I/O happens here; the live carrier quote is fetched by
//! `roastery-rates` and passed in as data.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Roastery Checkout                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Storefront (TypeScript)                         │   │
//! │  │    Cart UI ──► Destination form ──► Shipping picker ──► Pay    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ts-rs bindings                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            roastery-rates (async, carrier I/O)                  │   │
//! │  │    RateQuoter ──► CarrierClient      CheckoutSession            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ roastery-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │ currency │ │ pricing  │ │  weight  │ │ location │          │   │
//! │  │   │  money   │ │ catalog  │ │          │ │geography │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐                       │   │
//! │  │   │   tax    │ │ checkout │ │   cart   │                       │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘                       │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO GLOBAL SETTINGS • INTEGER MONEY     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`currency`] / [`money`] - OMR, USD, SAR and integer minor-unit amounts
//! - [`catalog`] - Products, variant options, price specs and sale overrides
//! - [`cart`] - Cart lines and cart edits
//! - [`pricing`] - Unit price and line total resolution
//! - [`weight`] - Label parsing and shipping weights
//! - [`geography`] / [`location`] - GCC destinations and their validation
//! - [`tax`] - Per-line tax
//! - [`settings`] - Checkout and carrier settings documents
//! - [`checkout`] - Order totals
//!
//! ## Example Usage
//!
//! ```rust
//! use roastery_core::currency::{Currency, CurrencyConverter};
//! use roastery_core::money::Money;
//!
//! let price = Money::new(5_000, Currency::Omr); // 5.000 OMR
//! let converter = CurrencyConverter::default();
//!
//! assert_eq!(converter.convert(price, Currency::Sar).to_string(), "48.75 SAR");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod currency;
pub mod error;
pub mod geography;
pub mod location;
pub mod money;
pub mod pricing;
pub mod settings;
pub mod tax;
pub mod types;
pub mod validation;
pub mod weight;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use checkout::{compute_order, CheckoutAggregator, OrderTotal, ShippingQuoteState};
pub use currency::{Currency, CurrencyConverter};
pub use error::{CoreError, CoreResult, PricingError, ValidationError};
pub use location::{LocationValidator, ShippingDestination, ValidDestination};
pub use money::Money;
pub use pricing::{LinePrice, PricingResolver};
pub use weight::{Weight, WeightParseStrategy, WeightResolver};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines in one cart.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity on a single cart line.
///
/// Catches typos like 1000 instead of 10 before they reach the carrier.
pub const MAX_LINE_QUANTITY: u32 = 999;
