//! # Rates Configuration
//!
//! Configuration for the carrier client and rate quoter.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     ROASTERY_CARRIER_ENDPOINT=https://...                              │
//! │     ROASTERY_WEIGHT_STRATEGY=unit_token_first                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/roastery-checkout/rates.toml (Linux)                     │
//! │     ~/Library/Application Support/com.roastery.checkout/rates.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     8 s timeout, 2 retries, magnitude weight heuristic                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # rates.toml
//! [carrier]
//! endpoint = "https://shop.example.com/api/shipping/aramex/rate"
//! timeout_ms = 8000
//! max_retries = 2
//! initial_backoff_ms = 250
//! max_backoff_ms = 2000
//!
//! [origin]            # optional, defaults to the carrier shipper info
//! city = "Muscat"
//! country = "OM"
//!
//! [weights]
//! strategy = "magnitude_heuristic"  # magnitude_heuristic | unit_token_first
//! ```

use std::path::PathBuf;
use std::time::Duration;

use roastery_core::settings::Origin;
use roastery_core::WeightParseStrategy;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{RatesError, RatesResult};

/// Upper bound on retries of one rate request.
pub const MAX_RETRIES: u32 = 2;

// =============================================================================
// Carrier Settings
// =============================================================================

/// Carrier endpoint and retry behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierSettings {
    /// Rate endpoint receiving the JSON `POST`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-attempt timeout (milliseconds).
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,

    /// Retries after the first attempt, for transient failures only.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff interval (milliseconds).
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Backoff ceiling (milliseconds).
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
}

fn default_endpoint() -> String {
    "http://localhost:3000/api/shipping/aramex/rate".to_string()
}
fn default_timeout() -> u64 {
    8_000
}
fn default_max_retries() -> u32 {
    MAX_RETRIES
}
fn default_initial_backoff() -> u64 {
    250
}
fn default_max_backoff() -> u64 {
    2_000
}

impl Default for CarrierSettings {
    fn default() -> Self {
        CarrierSettings {
            endpoint: default_endpoint(),
            timeout_ms: default_timeout(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
        }
    }
}

/// Weight label parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightSettings {
    #[serde(default)]
    pub strategy: WeightParseStrategy,
}

// =============================================================================
// Main Rates Configuration
// =============================================================================

/// Complete rates configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatesConfig {
    #[serde(default)]
    pub carrier: CarrierSettings,

    /// Shipment origin. `None` uses the shipper info from carrier settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,

    #[serde(default)]
    pub weights: WeightSettings,
}

impl RatesConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (rates.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> RatesResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading rates config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load rates config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> RatesResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| RatesError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Rates config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> RatesResult<()> {
        let endpoint = Url::parse(&self.carrier.endpoint)?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(RatesError::InvalidUrl(format!(
                "Carrier endpoint must be http:// or https://, got: {}",
                self.carrier.endpoint
            )));
        }

        if self.carrier.timeout_ms == 0 {
            return Err(RatesError::InvalidConfig(
                "timeout_ms must be greater than 0".into(),
            ));
        }

        if self.carrier.max_retries > MAX_RETRIES {
            return Err(RatesError::InvalidConfig(format!(
                "max_retries must be at most {}",
                MAX_RETRIES
            )));
        }

        if self.carrier.initial_backoff_ms > self.carrier.max_backoff_ms {
            return Err(RatesError::InvalidConfig(
                "initial_backoff_ms must not exceed max_backoff_ms".into(),
            ));
        }

        if let Some(origin) = &self.origin {
            if origin.city.trim().is_empty() || origin.country.trim().is_empty() {
                return Err(RatesError::InvalidConfig(
                    "origin needs both city and country".into(),
                ));
            }
        }

        Ok(())
    }

    /// Applies `ROASTERY_*` overrides from `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup("ROASTERY_CARRIER_ENDPOINT") {
            debug!(endpoint = %endpoint, "Overriding carrier endpoint from environment");
            self.carrier.endpoint = endpoint;
        }

        if let Some(timeout) = lookup("ROASTERY_CARRIER_TIMEOUT_MS") {
            match timeout.parse::<u64>() {
                Ok(ms) => self.carrier.timeout_ms = ms,
                Err(_) => warn!(value = %timeout, "Ignoring invalid ROASTERY_CARRIER_TIMEOUT_MS"),
            }
        }

        if let Some(retries) = lookup("ROASTERY_CARRIER_MAX_RETRIES") {
            match retries.parse::<u32>() {
                Ok(n) => self.carrier.max_retries = n,
                Err(_) => warn!(value = %retries, "Ignoring invalid ROASTERY_CARRIER_MAX_RETRIES"),
            }
        }

        let city = lookup("ROASTERY_ORIGIN_CITY");
        let country = lookup("ROASTERY_ORIGIN_COUNTRY");
        if city.is_some() || country.is_some() {
            let current = self.origin.take();
            let origin = Origin {
                city: city
                    .or_else(|| current.as_ref().map(|o| o.city.clone()))
                    .unwrap_or_default(),
                country: country
                    .or_else(|| current.as_ref().map(|o| o.country.clone()))
                    .unwrap_or_default(),
            };
            debug!(city = %origin.city, country = %origin.country, "Overriding origin from environment");
            self.origin = Some(origin);
        }

        if let Some(strategy) = lookup("ROASTERY_WEIGHT_STRATEGY") {
            match strategy.to_lowercase().as_str() {
                "magnitude_heuristic" | "magnitude" => {
                    self.weights.strategy = WeightParseStrategy::MagnitudeHeuristic
                }
                "unit_token_first" | "unit" => {
                    self.weights.strategy = WeightParseStrategy::UnitTokenFirst
                }
                _ => warn!(strategy = %strategy, "Unknown weight strategy in environment"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "roastery", "checkout")
            .map(|dirs| dirs.config_dir().join("rates.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.carrier.timeout_ms)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.carrier.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.carrier.max_backoff_ms)
    }

    /// Parsed carrier endpoint.
    pub fn endpoint(&self) -> RatesResult<Url> {
        Ok(Url::parse(&self.carrier.endpoint)?)
    }
}
