//! # Rate Quoter
//!
//! Fetches live shipping rates for one checkout session. Only the most
//! recently issued request may change the session's quote state.
//!
//! ## Quote Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Quote States                                     │
//! │                                                                         │
//! │  ┌──────┐  quote()  ┌────────────┐  bad weight or   ┌─────────┐         │
//! │  │ Idle │ ────────► │ Validating │ ───────────────► │ Invalid │         │
//! │  └──────┘           └─────┬──────┘   destination    └─────────┘         │
//! │     ▲                     │ ok                                          │
//! │     │                     ▼                                             │
//! │     │              ┌─────────────┐  rate   ┌───────┐                    │
//! │     │              │ Calculating │ ──────► │ Ready │                    │
//! │     │              └──────┬──────┘         └───────┘                    │
//! │     │                     │ error (after retries)                       │
//! │     │                     ▼                                             │
//! │     │                 ┌────────┐                                        │
//! │     └──── clear() ─── │ Failed │                                        │
//! │                       └────────┘                                        │
//! │                                                                         │
//! │  SEQUENCE FENCING                                                      │
//! │  ────────────────                                                      │
//! │  Every quote() takes the next number from an atomic counter; clear()   │
//! │  advances it too. A result whose number is no longer the latest is     │
//! │  returned as Stale and never written to the state.                     │
//! │                                                                         │
//! │  RETRIES                                                                │
//! │  ───────                                                                │
//! │  Transport errors, timeouts, 5xx: up to 2 retries, exponential backoff │
//! │  4xx, success:false, bad JSON:    terminal                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use roastery_core::checkout::ShippingQuoteState;
use roastery_core::location::{LocationValidator, ShippingDestination, ValidDestination};
use roastery_core::settings::{AramexCredentials, Origin};
use roastery_core::weight::shippable_weight;
use roastery_core::{Money, Weight};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::carrier::{CarrierClient, RateRequest};
use crate::config::RatesConfig;
use crate::error::{RatesError, RatesResult};

// =============================================================================
// State and Results
// =============================================================================

/// Where the session's shipping quote stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum QuoteState {
    Idle,
    Validating,
    Invalid { reason: String },
    Calculating,
    /// Latest accepted quote, kept until the next quote or `clear()`.
    Ready {
        amount: Money,
        sequence: u64,
        shipment: QuotedShipment,
    },
    Failed { detail: String },
}

/// The shipment an accepted quote was fetched for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotedShipment {
    /// Billable weight, after the carrier minimum.
    pub weight: Weight,
    /// ISO country code.
    pub country: String,
    /// Canonical city name.
    pub city: String,
}

impl QuotedShipment {
    fn new(weight: Weight, destination: &ValidDestination) -> Self {
        QuotedShipment {
            weight,
            country: destination.country_code().to_string(),
            city: destination.city().to_string(),
        }
    }

    /// True when `weight` to `destination` is the shipment that was quoted.
    pub fn covers(&self, weight: Weight, destination: &ValidDestination) -> bool {
        self.weight == weight
            && self.country == destination.country_code()
            && self.city == destination.city()
    }
}

/// A reserved number in the quote sequence.
///
/// Issue the ticket while holding whatever lock guards the destination, so
/// the destination snapshot and the sequence agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteTicket(u64);

impl QuoteTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

impl QuoteState {
    /// The view the order total is computed from.
    pub fn shipping_state(&self) -> ShippingQuoteState {
        match self {
            QuoteState::Ready { amount, .. } => ShippingQuoteState::Accepted { amount: *amount },
            QuoteState::Invalid { reason } => ShippingQuoteState::InvalidDestination {
                reason: reason.clone(),
            },
            QuoteState::Failed { detail } => ShippingQuoteState::Failed {
                detail: detail.clone(),
            },
            QuoteState::Idle | QuoteState::Validating | QuoteState::Calculating => {
                ShippingQuoteState::Pending
            }
        }
    }
}

/// Outcome of one `quote()` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum RateResult {
    Ok { amount: Money, sequence: u64 },
    InvalidDestination { reason: String },
    ProviderError { detail: String },
    /// A newer request was issued (or the quoter was cleared) meanwhile.
    Stale,
}

impl RateResult {
    pub fn is_stale(&self) -> bool {
        matches!(self, RateResult::Stale)
    }
}

// =============================================================================
// Quoter Configuration
// =============================================================================

#[derive(Debug, Clone)]
pub struct QuoterConfig {
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Retries after the first attempt, transient failures only.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for QuoterConfig {
    fn default() -> Self {
        QuoterConfig::from(&RatesConfig::default())
    }
}

impl From<&RatesConfig> for QuoterConfig {
    fn from(config: &RatesConfig) -> Self {
        QuoterConfig {
            timeout: config.timeout(),
            max_retries: config.carrier.max_retries,
            initial_backoff: config.initial_backoff(),
            max_backoff: config.max_backoff(),
        }
    }
}

// =============================================================================
// Rate Quoter
// =============================================================================

/// Sequence-fenced rate fetching for one session.
///
/// ## Usage
/// ```rust,ignore
/// let quoter = RateQuoter::new(carrier, validator, QuoterConfig::default());
///
/// match quoter.quote(weight, &destination, &origin).await {
///     RateResult::Ok { amount, .. } => show(amount),
///     RateResult::Stale => {} // a newer quote is on its way
///     other => show_error(other),
/// }
/// ```
pub struct RateQuoter {
    carrier: Arc<dyn CarrierClient>,
    validator: LocationValidator,
    credentials: Option<AramexCredentials>,
    config: QuoterConfig,
    sequence: AtomicU64,
    state: RwLock<QuoteState>,
}

impl RateQuoter {
    pub fn new(
        carrier: Arc<dyn CarrierClient>,
        validator: LocationValidator,
        config: QuoterConfig,
    ) -> Self {
        RateQuoter {
            carrier,
            validator,
            credentials: None,
            config,
            sequence: AtomicU64::new(0),
            state: RwLock::new(QuoteState::Idle),
        }
    }

    /// Sends `credentials` as `clientInfo` with every request.
    pub fn with_credentials(mut self, credentials: Option<AramexCredentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Current state.
    pub async fn state(&self) -> QuoteState {
        self.state.read().await.clone()
    }

    /// The latest accepted quote, if the state is `Ready`.
    pub async fn latest(&self) -> Option<Money> {
        match &*self.state.read().await {
            QuoteState::Ready { amount, .. } => Some(*amount),
            _ => None,
        }
    }

    pub async fn shipping_state(&self) -> ShippingQuoteState {
        self.state.read().await.shipping_state()
    }

    /// The quote as it applies to a cart of `weight` going to `destination`.
    ///
    /// An accepted quote counts only for the billable weight and destination
    /// it was fetched for. Any other cart is `Pending` until quoted again; a
    /// cart over the carrier maximum is `InvalidDestination`.
    pub async fn shipping_state_for(
        &self,
        weight: Weight,
        destination: &ShippingDestination,
    ) -> ShippingQuoteState {
        let weight = match shippable_weight(weight) {
            Ok(weight) => weight,
            Err(e) => {
                return ShippingQuoteState::InvalidDestination {
                    reason: e.to_string(),
                }
            }
        };

        match &*self.state.read().await {
            QuoteState::Ready {
                amount, shipment, ..
            } => match self.validator.validate(destination) {
                Ok(valid) if shipment.covers(weight, &valid) => {
                    ShippingQuoteState::Accepted { amount: *amount }
                }
                Ok(_) => ShippingQuoteState::Pending,
                Err(e) => ShippingQuoteState::InvalidDestination {
                    reason: e.to_string(),
                },
            },
            other => other.shipping_state(),
        }
    }

    /// Reserves the next sequence number. Every earlier ticket becomes stale.
    pub fn issue(&self) -> QuoteTicket {
        QuoteTicket(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Drops the current quote and makes every in-flight request stale.
    pub async fn clear(&self) {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        *self.state.write().await = QuoteState::Idle;
        debug!(sequence, "Rate quote cleared");
    }

    /// Quotes shipping `weight` from `origin` to `destination`.
    pub async fn quote(
        &self,
        weight: Weight,
        destination: &ShippingDestination,
        origin: &Origin,
    ) -> RateResult {
        let ticket = self.issue();
        self.quote_with(ticket, weight, destination, origin).await
    }

    /// Like [`quote`](Self::quote), with a ticket issued earlier.
    pub async fn quote_with(
        &self,
        ticket: QuoteTicket,
        weight: Weight,
        destination: &ShippingDestination,
        origin: &Origin,
    ) -> RateResult {
        let sequence = ticket.sequence();
        if !self.transition(sequence, QuoteState::Validating).await {
            debug!(sequence, "Ticket superseded before quoting");
            return RateResult::Stale;
        }

        let (weight, destination) = match self.validate(weight, destination) {
            Ok(valid) => valid,
            Err(reason) => {
                debug!(sequence, %reason, "Rate request rejected before sending");
                let accepted = self
                    .transition(sequence, QuoteState::Invalid { reason: reason.clone() })
                    .await;
                return if accepted {
                    RateResult::InvalidDestination { reason }
                } else {
                    RateResult::Stale
                };
            }
        };

        if !self.transition(sequence, QuoteState::Calculating).await {
            return RateResult::Stale;
        }

        let request = RateRequest {
            origin_city: origin.city.clone(),
            origin_country: origin.country.clone(),
            dest_city: destination.city().to_string(),
            dest_country: destination.country_code().to_string(),
            weight_kg: weight.kilograms(),
            dimensions: None,
            client_info: self.credentials.clone(),
        };
        info!(
            sequence,
            dest_country = %request.dest_country,
            dest_city = %request.dest_city,
            weight_kg = request.weight_kg,
            "Requesting carrier rate"
        );

        let outcome = self.fetch_with_retry(sequence, &request).await;

        let mut state = self.state.write().await;
        if !self.is_current(sequence) {
            debug!(sequence, "Discarding stale rate result");
            return RateResult::Stale;
        }

        match outcome {
            Ok(amount) => {
                info!(sequence, %amount, "Carrier rate accepted");
                *state = QuoteState::Ready {
                    amount,
                    sequence,
                    shipment: QuotedShipment::new(weight, &destination),
                };
                RateResult::Ok { amount, sequence }
            }
            Err(e) => {
                warn!(sequence, error = %e, "Carrier rate failed");
                let detail = e.to_string();
                *state = QuoteState::Failed {
                    detail: detail.clone(),
                };
                RateResult::ProviderError { detail }
            }
        }
    }

    fn validate(
        &self,
        weight: Weight,
        destination: &ShippingDestination,
    ) -> Result<(Weight, ValidDestination), String> {
        let weight = shippable_weight(weight).map_err(|e| e.to_string())?;
        let destination = self.validator.validate(destination).map_err(|e| e.to_string())?;
        Ok((weight, destination))
    }

    /// Sends the request, retrying transient failures with backoff.
    async fn fetch_with_retry(&self, sequence: u64, request: &RateRequest) -> RatesResult<Money> {
        let mut backoff = self.create_backoff();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let error = match self.attempt(request).await {
                Ok(amount) => return Ok(amount),
                Err(e) => e,
            };

            if !error.is_retryable() || attempt > self.config.max_retries {
                return Err(error);
            }
            if !self.is_current(sequence) {
                debug!(sequence, attempt, "Superseded, not retrying");
                return Err(error);
            }

            let Some(delay) = backoff.next_backoff() else {
                return Err(error);
            };
            warn!(sequence, attempt, ?delay, error = %error, "Carrier request failed, retrying");
            tokio::time::sleep(delay).await;
        }
    }

    async fn attempt(&self, request: &RateRequest) -> RatesResult<Money> {
        match timeout(self.config.timeout, self.carrier.calculate_rate(request)).await {
            Ok(Ok(response)) => response.into_amount(),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(RatesError::Timeout(self.config.timeout.as_millis() as u64)),
        }
    }

    /// Writes `next` if `sequence` is still the latest. Returns whether it was.
    async fn transition(&self, sequence: u64, next: QuoteState) -> bool {
        let mut state = self.state.write().await;
        if !self.is_current(sequence) {
            return false;
        }
        *state = next;
        true
    }

    fn is_current(&self, sequence: u64) -> bool {
        self.sequence.load(Ordering::SeqCst) == sequence
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.config.initial_backoff,
            max_interval: self.config.max_backoff,
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::RateResponse;
    use async_trait::async_trait;
    use roastery_core::settings::ServiceableDestination;
    use roastery_core::Currency;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// One scripted carrier reply: wait `delay`, then return `reply`.
    struct Step {
        delay: Duration,
        reply: RatesResult<RateResponse>,
    }

    /// In-memory carrier that replays a script, one step per call.
    #[derive(Default)]
    struct ScriptedCarrier {
        steps: Mutex<VecDeque<Step>>,
        calls: AtomicUsize,
        requests: Mutex<Vec<RateRequest>>,
    }

    impl ScriptedCarrier {
        fn new(steps: Vec<Step>) -> Arc<Self> {
            Arc::new(ScriptedCarrier {
                steps: Mutex::new(steps.into()),
                ..Default::default()
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CarrierClient for ScriptedCarrier {
        async fn calculate_rate(&self, request: &RateRequest) -> RatesResult<RateResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            let step = self.steps.lock().unwrap().pop_front();
            match step {
                Some(step) => {
                    tokio::time::sleep(step.delay).await;
                    step.reply
                }
                None => Err(RatesError::Transport("script exhausted".into())),
            }
        }
    }

    fn rate(omr: f64, delay_ms: u64) -> Step {
        Step {
            delay: Duration::from_millis(delay_ms),
            reply: Ok(RateResponse {
                success: true,
                rate: Some(omr),
                currency: Some("OMR".into()),
                error: None,
            }),
        }
    }

    fn fail(error: RatesError) -> Step {
        Step {
            delay: Duration::from_millis(10),
            reply: Err(error),
        }
    }

    fn quoter(carrier: Arc<ScriptedCarrier>) -> RateQuoter {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let validator = LocationValidator::new(
            vec!["OM".into()],
            vec![
                ServiceableDestination::new("OM", "Muscat"),
                ServiceableDestination::new("OM", "Salalah"),
            ],
        );
        RateQuoter::new(carrier, validator, QuoterConfig::default())
    }

    fn salalah() -> ShippingDestination {
        ShippingDestination::new("OM", "Dhofar", "Salalah")
    }

    fn origin() -> Origin {
        Origin {
            city: "Muscat".into(),
            country: "OM".into(),
        }
    }

    fn omr(minor: i64) -> Money {
        Money::new(minor, Currency::Omr)
    }

    #[tokio::test(start_paused = true)]
    async fn test_quote_ready() {
        let carrier = ScriptedCarrier::new(vec![rate(2.5, 100)]);
        let quoter = quoter(carrier.clone());

        let result = quoter.quote(Weight::from_grams(500), &salalah(), &origin()).await;
        assert_eq!(
            result,
            RateResult::Ok {
                amount: omr(2_500),
                sequence: 1
            }
        );
        assert_eq!(quoter.latest().await, Some(omr(2_500)));
        assert_eq!(
            quoter.shipping_state().await,
            ShippingQuoteState::Accepted { amount: omr(2_500) }
        );

        let sent = carrier.requests.lock().unwrap()[0].clone();
        assert_eq!(sent.dest_city, "Salalah");
        assert_eq!(sent.weight_kg, 0.5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_minimum_weight_is_applied() {
        let carrier = ScriptedCarrier::new(vec![rate(1.0, 10)]);
        let quoter = quoter(carrier.clone());

        quoter.quote(Weight::from_grams(20), &salalah(), &origin()).await;
        assert_eq!(carrier.requests.lock().unwrap()[0].weight_kg, 0.1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_earlier_quote_is_stale_when_it_finishes_last() {
        // First request is slow, second is fast
        let carrier = ScriptedCarrier::new(vec![rate(9.0, 500), rate(2.5, 50)]);
        let quoter = quoter(carrier);

        let (destination, from) = (salalah(), origin());
        let (first, second) = tokio::join!(
            quoter.quote(Weight::from_grams(500), &destination, &from),
            quoter.quote(Weight::from_grams(500), &destination, &from),
        );

        assert_eq!(first, RateResult::Stale);
        assert_eq!(
            second,
            RateResult::Ok {
                amount: omr(2_500),
                sequence: 2
            }
        );
        assert_eq!(quoter.latest().await, Some(omr(2_500)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_earlier_quote_is_stale_when_it_finishes_first() {
        let carrier = ScriptedCarrier::new(vec![rate(9.0, 50), rate(2.5, 500)]);
        let quoter = quoter(carrier);

        let (destination, from) = (salalah(), origin());
        let (first, second) = tokio::join!(
            quoter.quote(Weight::from_grams(500), &destination, &from),
            quoter.quote(Weight::from_grams(500), &destination, &from),
        );

        assert!(first.is_stale());
        assert!(matches!(second, RateResult::Ok { sequence: 2, .. }));
        assert_eq!(quoter.latest().await, Some(omr(2_500)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_makes_in_flight_request_stale() {
        let carrier = ScriptedCarrier::new(vec![rate(2.5, 500)]);
        let quoter = quoter(carrier);

        let (destination, from) = (salalah(), origin());
        let (result, ()) = tokio::join!(
            quoter.quote(Weight::from_grams(500), &destination, &from),
            async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                quoter.clear().await;
            }
        );

        assert_eq!(result, RateResult::Stale);
        assert_eq!(quoter.state().await, QuoteState::Idle);
        assert_eq!(quoter.latest().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticket_issued_before_clear_is_stale() {
        let carrier = ScriptedCarrier::new(vec![rate(2.5, 10)]);
        let quoter = quoter(carrier.clone());

        let ticket = quoter.issue();
        quoter.clear().await;

        let result = quoter
            .quote_with(ticket, Weight::from_grams(500), &salalah(), &origin())
            .await;
        assert_eq!(result, RateResult::Stale);
        assert_eq!(quoter.state().await, QuoteState::Idle);
        assert_eq!(carrier.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_accepted_quote_only_covers_its_shipment() {
        let carrier = ScriptedCarrier::new(vec![rate(2.5, 10)]);
        let quoter = quoter(carrier);
        quoter.quote(Weight::from_grams(500), &salalah(), &origin()).await;

        assert_eq!(
            quoter.shipping_state_for(Weight::from_grams(500), &salalah()).await,
            ShippingQuoteState::Accepted { amount: omr(2_500) }
        );

        // Heavier cart, same destination
        assert_eq!(
            quoter.shipping_state_for(Weight::from_grams(750), &salalah()).await,
            ShippingQuoteState::Pending
        );

        // Same cart, another serviceable city
        let muscat = ShippingDestination::new("OM", "Muscat", "Muscat");
        assert_eq!(
            quoter.shipping_state_for(Weight::from_grams(500), &muscat).await,
            ShippingQuoteState::Pending
        );

        // Over the carrier maximum
        assert!(matches!(
            quoter.shipping_state_for(Weight::from_grams(75_000), &salalah()).await,
            ShippingQuoteState::InvalidDestination { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quote_covers_billable_weight() {
        let carrier = ScriptedCarrier::new(vec![rate(1.0, 10)]);
        let quoter = quoter(carrier);
        quoter.quote(Weight::from_grams(20), &salalah(), &origin()).await;

        // 20 g and 60 g both bill as 100 g
        assert_eq!(
            quoter.shipping_state_for(Weight::from_grams(60), &salalah()).await,
            ShippingQuoteState::Accepted { amount: omr(1_000) }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_destination_skips_network() {
        let carrier = ScriptedCarrier::new(vec![]);
        let quoter = quoter(carrier.clone());

        let incomplete = ShippingDestination {
            country: Some("OM".into()),
            state: Some("Dhofar".into()),
            city: None,
        };
        let result = quoter.quote(Weight::from_grams(500), &incomplete, &origin()).await;
        assert_eq!(
            result,
            RateResult::InvalidDestination {
                reason: "city is required".into()
            }
        );

        let too_heavy = quoter
            .quote(Weight::from_grams(60_000), &salalah(), &origin())
            .await;
        assert!(matches!(too_heavy, RateResult::InvalidDestination { .. }));
        assert!(matches!(quoter.state().await, QuoteState::Invalid { .. }));
        assert_eq!(carrier.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_are_retried() {
        let carrier = ScriptedCarrier::new(vec![
            fail(RatesError::Transport("connection reset".into())),
            fail(RatesError::HttpStatus {
                status: 503,
                body: "busy".into(),
            }),
            rate(3.0, 10),
        ]);
        let quoter = quoter(carrier.clone());

        let result = quoter.quote(Weight::from_grams(500), &salalah(), &origin()).await;
        assert!(matches!(result, RateResult::Ok { .. }));
        assert_eq!(carrier.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_are_bounded() {
        let carrier = ScriptedCarrier::new(vec![
            fail(RatesError::Transport("down".into())),
            fail(RatesError::Transport("down".into())),
            fail(RatesError::Transport("down".into())),
            rate(3.0, 10),
        ]);
        let quoter = quoter(carrier.clone());

        let result = quoter.quote(Weight::from_grams(500), &salalah(), &origin()).await;
        assert!(matches!(result, RateResult::ProviderError { .. }));
        assert_eq!(carrier.calls(), 3);
        assert_eq!(
            quoter.shipping_state().await,
            ShippingQuoteState::Failed {
                detail: "Carrier request failed: down".into()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_failures_are_not_retried() {
        let declined = Step {
            delay: Duration::from_millis(10),
            reply: Ok(RateResponse {
                success: false,
                rate: None,
                currency: None,
                error: Some("No service".into()),
            }),
        };
        let carrier = ScriptedCarrier::new(vec![
            fail(RatesError::HttpStatus {
                status: 400,
                body: "bad request".into(),
            }),
            declined,
        ]);
        let quoter = quoter(carrier.clone());

        let first = quoter.quote(Weight::from_grams(500), &salalah(), &origin()).await;
        assert!(matches!(first, RateResult::ProviderError { .. }));
        assert_eq!(carrier.calls(), 1);

        let second = quoter.quote(Weight::from_grams(500), &salalah(), &origin()).await;
        assert_eq!(
            second,
            RateResult::ProviderError {
                detail: "Carrier rejected the request: No service".into()
            }
        );
        assert_eq!(carrier.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_transient() {
        let carrier = ScriptedCarrier::new(vec![rate(9.0, 60_000), rate(2.5, 10)]);
        let quoter = quoter(carrier.clone());

        let result = quoter.quote(Weight::from_grams(500), &salalah(), &origin()).await;
        assert!(matches!(result, RateResult::Ok { .. }));
        assert_eq!(quoter.latest().await, Some(omr(2_500)));
        assert_eq!(carrier.calls(), 2);
    }
}
