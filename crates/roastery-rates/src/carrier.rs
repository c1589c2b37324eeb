//! # Carrier Client
//!
//! The seam between the quoter and the carrier's rate API.
//!
//! ## Wire Format
//! ```text
//! POST {endpoint}
//! {
//!   "originCity": "Muscat",  "originCountry": "OM",
//!   "destCity":   "Salalah", "destCountry":   "OM",
//!   "weightKg":   0.75,
//!   "dimensions": { "length": 20, "width": 15, "height": 10 },   (optional)
//!   "clientInfo": { "username": ..., "accountNumber": ... }      (optional)
//! }
//!
//! 200 → { "success": true,  "rate": 2.5, "currency": "OMR" }
//! 200 → { "success": false, "error": "No service to destination" }
//! ```
//!
//! [`HttpCarrierClient`] owns transport details only: serialisation, status
//! mapping and JSON decoding. Retry and staleness live in the quoter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use roastery_core::settings::AramexCredentials;
use roastery_core::{Currency, Money};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{RatesError, RatesResult};

// =============================================================================
// Wire Types
// =============================================================================

/// Parcel dimensions in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

/// Rate request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRequest {
    pub origin_city: String,
    pub origin_country: String,
    pub dest_city: String,
    pub dest_country: String,
    pub weight_kg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_info: Option<AramexCredentials>,
}

/// Rate response body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RateResponse {
    pub success: bool,
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl RateResponse {
    /// Converts a decoded response into an amount.
    ///
    /// A missing currency means OMR. `success: false` becomes
    /// [`RatesError::Rejected`], which is never retried.
    pub fn into_amount(self) -> RatesResult<Money> {
        if !self.success {
            return Err(RatesError::Rejected(
                self.error
                    .unwrap_or_else(|| "carrier declined without a reason".to_string()),
            ));
        }

        let rate = self
            .rate
            .ok_or_else(|| RatesError::Decode("successful response without a rate".into()))?;
        if !rate.is_finite() || rate < 0.0 {
            return Err(RatesError::Decode(format!("invalid rate {}", rate)));
        }

        let currency = match self.currency.as_deref() {
            Some(code) => code
                .parse::<Currency>()
                .map_err(|e| RatesError::Decode(e.to_string()))?,
            None => Currency::BASE,
        };

        let minor = (rate * currency.minor_per_major() as f64).round() as i64;
        Ok(Money::new(minor, currency))
    }
}

// =============================================================================
// Carrier Seam
// =============================================================================

/// Something that can price a shipment.
///
/// Implementations return `Ok` for any decoded 2xx body, including
/// `success: false`; transport failures, timeouts and non-2xx statuses are
/// errors.
#[async_trait]
pub trait CarrierClient: Send + Sync {
    async fn calculate_rate(&self, request: &RateRequest) -> RatesResult<RateResponse>;
}

// =============================================================================
// HTTP Implementation
// =============================================================================

/// Carrier client that POSTs JSON to one endpoint.
pub struct HttpCarrierClient {
    client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpCarrierClient {
    /// Builds a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> RatesResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RatesError::InvalidConfig(e.to_string()))?;
        Ok(HttpCarrierClient {
            client,
            endpoint,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl CarrierClient for HttpCarrierClient {
    async fn calculate_rate(&self, request: &RateRequest) -> RatesResult<RateResponse> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        Ok(serde_json::from_slice(body.as_ref())?)
    }
}

impl HttpCarrierClient {
    fn map_transport_error(&self, error: reqwest::Error) -> RatesError {
        if error.is_timeout() {
            RatesError::Timeout(self.timeout.as_millis() as u64)
        } else {
            RatesError::Transport(error.to_string())
        }
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> RatesError {
    RatesError::HttpStatus {
        status: status.as_u16(),
        body: body_preview(body),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let request = RateRequest {
            origin_city: "Muscat".into(),
            origin_country: "OM".into(),
            dest_city: "Salalah".into(),
            dest_country: "OM".into(),
            weight_kg: 0.75,
            dimensions: None,
            client_info: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "originCity": "Muscat",
                "originCountry": "OM",
                "destCity": "Salalah",
                "destCountry": "OM",
                "weightKg": 0.75
            })
        );
    }

    #[test]
    fn test_client_info_is_sent_when_configured() {
        let request = RateRequest {
            origin_city: "Muscat".into(),
            origin_country: "OM".into(),
            dest_city: "Dubai".into(),
            dest_country: "AE".into(),
            weight_kg: 1.0,
            dimensions: Some(Dimensions {
                length: 20.0,
                width: 15.0,
                height: 10.0,
            }),
            client_info: Some(AramexCredentials {
                username: "shop@example.com".into(),
                password: "secret".into(),
                account_number: "123456".into(),
                account_pin: "4321".into(),
                account_entity: "MCT".into(),
                account_country_code: "OM".into(),
            }),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["clientInfo"]["accountNumber"], "123456");
        assert_eq!(json["dimensions"]["height"], 10.0);
    }

    #[test]
    fn test_response_into_amount() {
        let ok: RateResponse =
            serde_json::from_str(r#"{"success":true,"rate":2.5,"currency":"OMR"}"#).unwrap();
        assert_eq!(ok.into_amount().unwrap(), Money::new(2_500, Currency::Omr));

        let usd: RateResponse =
            serde_json::from_str(r#"{"success":true,"rate":6.1,"currency":"USD"}"#).unwrap();
        assert_eq!(usd.into_amount().unwrap(), Money::new(610, Currency::Usd));

        let implicit: RateResponse = serde_json::from_str(r#"{"success":true,"rate":1.25}"#).unwrap();
        assert_eq!(implicit.into_amount().unwrap(), Money::new(1_250, Currency::Omr));
    }

    #[test]
    fn test_response_failures() {
        let declined: RateResponse =
            serde_json::from_str(r#"{"success":false,"error":"No service to Duqm"}"#).unwrap();
        match declined.into_amount() {
            Err(RatesError::Rejected(reason)) => assert_eq!(reason, "No service to Duqm"),
            other => panic!("expected rejection, got {:?}", other),
        }

        let no_rate: RateResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(matches!(no_rate.into_amount(), Err(RatesError::Decode(_))));

        let bad_currency: RateResponse =
            serde_json::from_str(r#"{"success":true,"rate":1,"currency":"EUR"}"#).unwrap();
        assert!(matches!(bad_currency.into_amount(), Err(RatesError::Decode(_))));
    }

    #[test]
    fn test_status_mapping() {
        let err = map_status_error(StatusCode::BAD_GATEWAY, b"  upstream \n unavailable ");
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "Carrier returned HTTP 502: upstream unavailable");

        let err = map_status_error(StatusCode::UNPROCESSABLE_ENTITY, b"{}");
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        let endpoint = Url::parse("http://127.0.0.1:9/rate").unwrap();
        let client = HttpCarrierClient::new(endpoint, Duration::from_secs(2)).unwrap();
        let request = RateRequest {
            origin_city: "Muscat".into(),
            origin_country: "OM".into(),
            dest_city: "Salalah".into(),
            dest_country: "OM".into(),
            weight_kg: 0.5,
            dimensions: None,
            client_info: None,
        };

        let err = client.calculate_rate(&request).await.unwrap_err();
        assert!(matches!(err, RatesError::Transport(_)), "got {:?}", err);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_body_preview_truncates() {
        let long = "x".repeat(200);
        let preview = body_preview(long.as_bytes());
        assert_eq!(preview.len(), 163);
        assert!(preview.ends_with("..."));
    }
}
