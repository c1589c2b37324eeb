//! # Location Validation
//!
//! Decides whether a shipping destination can be quoted, and keeps the
//! country → state → city selection consistent while the customer edits it.
//!
//! ## Validation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Destination Validation                                 │
//! │                                                                         │
//! │  country, state, city present? ──── no ───► Required                   │
//! │           │                                                             │
//! │  country in geography table? ────── no ───► UnknownCountry             │
//! │           │                                                             │
//! │  country enabled for checkout? ──── no ───► CountryNotEnabled          │
//! │           │                                                             │
//! │  state belongs to country? ──────── no ───► StateNotInCountry          │
//! │           │                                                             │
//! │  city belongs to state? ─────────── no ───► CityNotInState             │
//! │           │                     (case-insensitive)                      │
//! │  (country, city) serviceable? ───── no ───► NotServiceable             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │     ValidDestination (canonical spellings from the table)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::geography::{self, Country, State};
use crate::settings::{AramexSettings, CheckoutSettings, ServiceableDestination};
use crate::validation::{validate_required, ValidationResult};

pub use crate::geography::{cities_for, states_for};

// =============================================================================
// Destination Types
// =============================================================================

/// A destination as the customer is entering it. Every part is optional
/// until the form is complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDestination {
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
}

impl ShippingDestination {
    pub fn new(country: &str, state: &str, city: &str) -> Self {
        ShippingDestination {
            country: Some(country.to_string()),
            state: Some(state.to_string()),
            city: Some(city.to_string()),
        }
    }
}

/// A destination that passed validation, resolved against the geography
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidDestination {
    pub country: &'static Country,
    pub state: &'static State,
    pub city: &'static str,
}

impl ValidDestination {
    pub fn country_code(&self) -> &'static str {
        self.country.code
    }

    pub fn city(&self) -> &'static str {
        self.city
    }
}

/// UI-facing outcome of a validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LocationCheck {
    pub valid: bool,
    pub reason: Option<String>,
}

// =============================================================================
// Validator
// =============================================================================

/// Validates destinations against enabled countries and the carrier's
/// serviceable list.
///
/// An empty serviceable list means the carrier delivers nowhere.
#[derive(Debug, Clone, Default)]
pub struct LocationValidator {
    enabled_countries: Vec<String>,
    serviceable: Vec<ServiceableDestination>,
}

impl LocationValidator {
    pub fn new(enabled_countries: Vec<String>, serviceable: Vec<ServiceableDestination>) -> Self {
        LocationValidator {
            enabled_countries,
            serviceable,
        }
    }

    /// Builds a validator from the store's settings documents.
    pub fn from_settings(checkout: &CheckoutSettings, carrier: &AramexSettings) -> Self {
        LocationValidator::new(
            checkout.enabled_countries.clone(),
            carrier.serviceable_destinations.clone(),
        )
    }

    pub fn validate(&self, destination: &ShippingDestination) -> ValidationResult<ValidDestination> {
        let country_query = validate_required("country", destination.country.as_deref())?;
        let state_query = validate_required("state", destination.state.as_deref())?;
        let city_query = validate_required("city", destination.city.as_deref())?;

        let country = geography::country(country_query)
            .ok_or_else(|| ValidationError::UnknownCountry(country_query.to_string()))?;

        if !self
            .enabled_countries
            .iter()
            .any(|c| c.eq_ignore_ascii_case(country.code))
        {
            return Err(ValidationError::CountryNotEnabled(country.code.to_string()));
        }

        let state = country
            .state(state_query)
            .ok_or_else(|| ValidationError::StateNotInCountry {
                country: country.code.to_string(),
                state: state_query.to_string(),
            })?;

        let city = state
            .city(city_query)
            .ok_or_else(|| ValidationError::CityNotInState {
                state: state.name.to_string(),
                city: city_query.to_string(),
            })?;

        if !self.serviceable.iter().any(|d| d.matches(country.code, city)) {
            return Err(ValidationError::NotServiceable {
                country: country.code.to_string(),
                city: city.to_string(),
            });
        }

        Ok(ValidDestination {
            country,
            state,
            city,
        })
    }

    /// Same decision as [`validate`](Self::validate), shaped for display.
    pub fn check(&self, destination: &ShippingDestination) -> LocationCheck {
        match self.validate(destination) {
            Ok(_) => LocationCheck {
                valid: true,
                reason: None,
            },
            Err(e) => LocationCheck {
                valid: false,
                reason: Some(e.to_string()),
            },
        }
    }
}

// =============================================================================
// Destination Selector
// =============================================================================

/// Cascading country → state → city selection.
///
/// ## Invariants
/// - `state` is set only when it belongs to `country`
/// - `city` is set only when it belongs to `state`
///
/// Changing a parent clears its children; a rejected change leaves the
/// selector as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationSelector {
    country: Option<&'static Country>,
    state: Option<&'static State>,
    city: Option<&'static str>,
}

impl DestinationSelector {
    pub fn new() -> Self {
        DestinationSelector::default()
    }

    /// Selects a country and clears state and city.
    pub fn set_country(&mut self, query: &str) -> ValidationResult<()> {
        let country = geography::country(query)
            .ok_or_else(|| ValidationError::UnknownCountry(query.trim().to_string()))?;
        *self = DestinationSelector {
            country: Some(country),
            state: None,
            city: None,
        };
        Ok(())
    }

    /// Selects a state of the current country and clears the city.
    pub fn set_state(&mut self, name: &str) -> ValidationResult<()> {
        let country = self.country.ok_or_else(|| ValidationError::Required {
            field: "country".to_string(),
        })?;
        let state = country
            .state(name)
            .ok_or_else(|| ValidationError::StateNotInCountry {
                country: country.code.to_string(),
                state: name.trim().to_string(),
            })?;
        self.state = Some(state);
        self.city = None;
        Ok(())
    }

    /// Selects a city of the current state.
    pub fn set_city(&mut self, name: &str) -> ValidationResult<()> {
        let state = self.state.ok_or_else(|| ValidationError::Required {
            field: "state".to_string(),
        })?;
        let city = state
            .city(name)
            .ok_or_else(|| ValidationError::CityNotInState {
                state: state.name.to_string(),
                city: name.trim().to_string(),
            })?;
        self.city = Some(city);
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = DestinationSelector::default();
    }

    /// States offered for the current country.
    pub fn states(&self) -> Vec<&'static str> {
        self.country
            .map(|c| c.states.iter().map(|s| s.name).collect())
            .unwrap_or_default()
    }

    /// Cities offered for the current state.
    pub fn cities(&self) -> Vec<&'static str> {
        self.state.map(|s| s.cities.to_vec()).unwrap_or_default()
    }

    /// The current selection, country as its ISO code.
    pub fn destination(&self) -> ShippingDestination {
        ShippingDestination {
            country: self.country.map(|c| c.code.to_string()),
            state: self.state.map(|s| s.name.to_string()),
            city: self.city.map(str::to_string),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
