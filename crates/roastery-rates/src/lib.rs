//! # roastery-rates: Live Shipping Rates
//!
//! Carrier rate quoting for the roastery checkout. This crate owns every
//! network call: the HTTP client, per-attempt timeouts, retry with backoff
//! and the sequence fencing that keeps a slow, superseded quote from
//! overwriting a newer one.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Rate Request Flow                                │
//! │                                                                         │
//! │  CheckoutSession::quote_shipping(lines)                                │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  WeightResolver::cart_weight ──► RateQuoter::quote                      │
//! │                                        │                                │
//! │                    ┌───────────────────┼────────────────────┐           │
//! │                    ▼                   ▼                    ▼           │
//! │            shippable_weight   LocationValidator      sequence = n       │
//! │                    │                   │                                │
//! │                    └─────── ok ────────┘                                │
//! │                                │                                        │
//! │                                ▼                                        │
//! │                  CarrierClient::calculate_rate                          │
//! │                  (timeout, ≤2 retries on transient errors)              │
//! │                                │                                        │
//! │                                ▼                                        │
//! │                  n still latest? ── no ──► Stale                        │
//! │                                │ yes                                    │
//! │                                ▼                                        │
//! │                        Ready / Failed                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let config = RatesConfig::load_or_default(None);
//! let session = CheckoutSession::connect(&config, checkout, carrier, catalog)?;
//!
//! session.set_country("OM").await?;
//! session.set_state("Dhofar").await?;
//! session.set_city("Salalah").await?;
//!
//! session.quote_shipping(&lines).await?;
//! let total = session.order_total(&lines, "aramex", Currency::Omr, Utc::now()).await?;
//! ```

pub mod carrier;
pub mod config;
pub mod error;
pub mod quoter;
pub mod session;

pub use carrier::{CarrierClient, HttpCarrierClient, RateRequest, RateResponse};
pub use config::RatesConfig;
pub use error::{RatesError, RatesResult};
pub use quoter::{QuoteState, QuoteTicket, QuotedShipment, QuoterConfig, RateQuoter, RateResult};
pub use session::CheckoutSession;
