//! # Checkout Session
//!
//! One customer's checkout: the destination they are entering, the live rate
//! quote for it and the order total computed from both.
//!
//! ```text
//! set_country / set_state / set_city ──► selector (cascading reset)
//!                │                              │
//!                └──► quoter.clear()            │ destination()
//!                                               ▼
//! quote_shipping(lines) ── cart weight ──► RateQuoter ──► carrier
//!                                               │
//! order_total(lines, method) ◄── shipping_state_for(weight, destination)
//! ```
//!
//! Destination edits and quotes take `&self`, so a quote can still be in
//! flight when the customer changes the destination. The edit clears the
//! quoter and the in-flight result comes back `Stale`.
//!
//! An accepted quote is only used for the cart weight and destination it was
//! fetched for. A cart that changed since is `QuotePending` until quoted
//! again.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use roastery_core::catalog::Catalog;
use roastery_core::cart::CartLine;
use roastery_core::checkout::ShippingQuoteState;
use roastery_core::location::DestinationSelector;
use roastery_core::settings::{AramexSettings, CheckoutSettings, Origin, ShippingMethod};
use roastery_core::validation::ValidationResult;
use roastery_core::{
    CheckoutAggregator, CoreError, Currency, LocationValidator, OrderTotal, ShippingDestination,
    WeightResolver,
};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::carrier::{CarrierClient, HttpCarrierClient};
use crate::config::RatesConfig;
use crate::error::RatesResult;
use crate::quoter::{QuoterConfig, RateQuoter, RateResult};

const CARRIER_DISABLED: &str = "carrier rates are disabled";

/// Per-customer checkout state.
pub struct CheckoutSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    selector: RwLock<DestinationSelector>,
    quoter: RateQuoter,
    checkout: Arc<CheckoutSettings>,
    carrier: Arc<AramexSettings>,
    catalog: Arc<Catalog>,
    weights: WeightResolver,
    aggregator: CheckoutAggregator,
    origin: Origin,
}

impl CheckoutSession {
    /// Creates a session that quotes through `client`.
    ///
    /// The origin is the configured one, falling back to the carrier's
    /// shipper address.
    pub fn new(
        config: &RatesConfig,
        client: Arc<dyn CarrierClient>,
        checkout: Arc<CheckoutSettings>,
        carrier: Arc<AramexSettings>,
        catalog: Arc<Catalog>,
    ) -> Self {
        let validator = LocationValidator::from_settings(&checkout, &carrier);
        let quoter = RateQuoter::new(client, validator, QuoterConfig::from(config))
            .with_credentials(carrier.credentials.clone());
        let origin = config.origin.clone().unwrap_or_else(|| carrier.origin());

        let session = CheckoutSession {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            selector: RwLock::new(DestinationSelector::new()),
            quoter,
            checkout,
            carrier,
            catalog,
            weights: WeightResolver::new(config.weights.strategy),
            aggregator: CheckoutAggregator::default(),
            origin,
        };
        info!(
            session_id = %session.id,
            origin_city = %session.origin.city,
            origin_country = %session.origin.country,
            "Checkout session started"
        );
        session
    }

    /// Creates a session backed by the HTTP carrier client at the configured
    /// endpoint.
    pub fn connect(
        config: &RatesConfig,
        checkout: Arc<CheckoutSettings>,
        carrier: Arc<AramexSettings>,
        catalog: Arc<Catalog>,
    ) -> RatesResult<Self> {
        config.validate()?;
        let client = HttpCarrierClient::new(config.endpoint()?, config.timeout())?;
        Ok(CheckoutSession::new(
            config,
            Arc::new(client),
            checkout,
            carrier,
            catalog,
        ))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn quoter(&self) -> &RateQuoter {
        &self.quoter
    }

    /// Shipping methods the customer may pick from.
    pub fn shipping_methods(&self) -> Vec<&ShippingMethod> {
        self.checkout.enabled_methods().collect()
    }

    // =========================================================================
    // Destination
    // =========================================================================

    pub async fn destination(&self) -> ShippingDestination {
        self.selector.read().await.destination()
    }

    pub async fn states(&self) -> Vec<&'static str> {
        self.selector.read().await.states()
    }

    pub async fn cities(&self) -> Vec<&'static str> {
        self.selector.read().await.cities()
    }

    pub async fn set_country(&self, query: &str) -> ValidationResult<()> {
        self.edit_destination(|selector| selector.set_country(query)).await
    }

    pub async fn set_state(&self, name: &str) -> ValidationResult<()> {
        self.edit_destination(|selector| selector.set_state(name)).await
    }

    pub async fn set_city(&self, name: &str) -> ValidationResult<()> {
        self.edit_destination(|selector| selector.set_city(name)).await
    }

    pub async fn clear_destination(&self) {
        let mut selector = self.selector.write().await;
        selector.clear();
        self.destination_changed().await;
    }

    /// Applies `edit` and drops the quote, all under the selector lock.
    /// A rejected edit leaves both untouched.
    async fn edit_destination<F>(&self, edit: F) -> ValidationResult<()>
    where
        F: FnOnce(&mut DestinationSelector) -> ValidationResult<()>,
    {
        let mut selector = self.selector.write().await;
        edit(&mut *selector)?;
        self.destination_changed().await;
        Ok(())
    }

    async fn destination_changed(&self) {
        debug!(session_id = %self.id, "Destination changed, dropping shipping quote");
        self.quoter.clear().await;
    }

    // =========================================================================
    // Quotes and Totals
    // =========================================================================

    /// Quotes shipping for `lines` to the current destination.
    pub async fn quote_shipping(&self, lines: &[CartLine]) -> RatesResult<RateResult> {
        let weight = self.weights.cart_weight(lines, &self.catalog)?;
        if !self.carrier.enabled {
            debug!(session_id = %self.id, "Carrier disabled, not requesting a rate");
            return Ok(RateResult::ProviderError {
                detail: CARRIER_DISABLED.to_string(),
            });
        }

        // Same lock as destination edits: the snapshot and the ticket agree
        let (ticket, destination) = {
            let selector = self.selector.read().await;
            (self.quoter.issue(), selector.destination())
        };
        Ok(self
            .quoter
            .quote_with(ticket, weight, &destination, &self.origin)
            .await)
    }

    /// Order total for `lines` shipped with `method_id`, in `currency`.
    pub async fn order_total(
        &self,
        lines: &[CartLine],
        method_id: &str,
        currency: Currency,
        at: DateTime<Utc>,
    ) -> RatesResult<OrderTotal> {
        let method = self
            .checkout
            .method(method_id)
            .ok_or_else(|| CoreError::ShippingMethodNotFound(method_id.to_string()))?;

        let quote = if !method.is_api_calculated() {
            // Flat methods never read the quote
            ShippingQuoteState::Pending
        } else if !self.carrier.enabled {
            ShippingQuoteState::Failed {
                detail: CARRIER_DISABLED.to_string(),
            }
        } else {
            let weight = self.weights.cart_weight(lines, &self.catalog)?;
            let destination = self.destination().await;
            self.quoter.shipping_state_for(weight, &destination).await
        };

        let total = self.aggregator.compute_order(
            lines,
            &self.catalog,
            method,
            &quote,
            &self.checkout,
            currency,
            at,
        )?;
        Ok(total)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
