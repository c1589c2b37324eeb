//! # Checkout Settings
//!
//! Read-only store configuration that checkout is computed against. The
//! storefront admin owns these documents; this crate only deserializes them
//! and passes them by reference into each computation. Nothing here is global.
//!
//! ```text
//! CheckoutSettings              AramexSettings
//! ├── category_tax_rates[]      ├── credentials?
//! ├── tax_rate (legacy global)  ├── shipper_info     (origin of every quote)
//! ├── shipping_methods[]        ├── services[]
//! └── enabled_countries[]       ├── enabled
//!                               └── serviceable_destinations[]
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::CurrencyAmounts;
use crate::error::ValidationError;
use crate::types::TaxRate;
use crate::validation::ValidationResult;

// =============================================================================
// Checkout Settings
// =============================================================================

/// Per-category tax entry. Only enabled entries are consulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTaxRate {
    pub category_id: String,
    pub rate: TaxRate,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

/// How a shipping method is priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShippingPricing {
    /// Fixed cost; currencies without an amount derive from OMR.
    Flat { cost: CurrencyAmounts },
    /// Cost comes from a live carrier quote.
    ApiCalculated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingMethod {
    pub id: String,
    pub name: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub pricing: ShippingPricing,
}

impl ShippingMethod {
    pub fn is_api_calculated(&self) -> bool {
        matches!(self.pricing, ShippingPricing::ApiCalculated)
    }
}

/// Store-wide checkout configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSettings {
    #[serde(default)]
    pub category_tax_rates: Vec<CategoryTaxRate>,
    /// Legacy global rate, used when no enabled category entry matches.
    #[serde(default)]
    pub tax_rate: TaxRate,
    #[serde(default)]
    pub shipping_methods: Vec<ShippingMethod>,
    /// ISO codes of countries checkout ships to.
    #[serde(default)]
    pub enabled_countries: Vec<String>,
}

impl CheckoutSettings {
    /// Parses the settings document stored by the storefront admin.
    pub fn from_json(json: &str) -> ValidationResult<Self> {
        serde_json::from_str(json).map_err(|e| ValidationError::InvalidFormat {
            field: "checkout settings".to_string(),
            reason: e.to_string(),
        })
    }

    /// Looks up a shipping method by id, enabled or not.
    pub fn method(&self, id: &str) -> Option<&ShippingMethod> {
        self.shipping_methods.iter().find(|m| m.id == id)
    }

    /// Methods the customer may pick from.
    pub fn enabled_methods(&self) -> impl Iterator<Item = &ShippingMethod> {
        self.shipping_methods.iter().filter(|m| m.enabled)
    }

    pub fn is_country_enabled(&self, code: &str) -> bool {
        self.enabled_countries
            .iter()
            .any(|c| c.eq_ignore_ascii_case(code))
    }
}

// =============================================================================
// Carrier Settings
// =============================================================================

/// Carrier account credentials, sent as `clientInfo` with each rate request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AramexCredentials {
    pub username: String,
    pub password: String,
    pub account_number: String,
    pub account_pin: String,
    pub account_entity: String,
    pub account_country_code: String,
}

/// The store's shipping origin and contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipperInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    pub city: String,
    pub country: String,
}

/// Carrier product the store has enabled, such as express or economy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AramexService {
    pub code: String,
    pub name: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

/// A (country, city) pair the carrier delivers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceableDestination {
    pub country: String,
    pub city: String,
}

impl ServiceableDestination {
    pub fn new(country: impl Into<String>, city: impl Into<String>) -> Self {
        ServiceableDestination {
            country: country.into(),
            city: city.into(),
        }
    }

    pub(crate) fn matches(&self, country: &str, city: &str) -> bool {
        self.country.eq_ignore_ascii_case(country) && self.city.trim().eq_ignore_ascii_case(city)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AramexSettings {
    #[serde(default)]
    pub credentials: Option<AramexCredentials>,
    #[serde(default)]
    pub shipper_info: ShipperInfo,
    #[serde(default)]
    pub services: Vec<AramexService>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub serviceable_destinations: Vec<ServiceableDestination>,
}

impl AramexSettings {
    pub fn from_json(json: &str) -> ValidationResult<Self> {
        serde_json::from_str(json).map_err(|e| ValidationError::InvalidFormat {
            field: "carrier settings".to_string(),
            reason: e.to_string(),
        })
    }

    /// Where every shipment departs from.
    pub fn origin(&self) -> Origin {
        Origin {
            city: self.shipper_info.city.clone(),
            country: self.shipper_info.country.clone(),
        }
    }

    pub fn is_serviceable(&self, country: &str, city: &str) -> bool {
        self.serviceable_destinations
            .iter()
            .any(|d| d.matches(country, city))
    }
}

/// Shipment origin for rate requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub city: String,
    pub country: String,
}

fn enabled_by_default() -> bool {
    true
}
