//! # Cart
//!
//! Client-side cart lines: a product, a variant selection and a quantity.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Storefront Action        Cart Method             Line Change           │
//! │  ─────────────────        ───────────             ───────────           │
//! │                                                                         │
//! │  Add to cart ───────────► add() ────────────────► push or qty += n      │
//! │                                                                         │
//! │  Change quantity ───────► set_quantity() ───────► qty = n (0 removes)   │
//! │                                                                         │
//! │  Pick "1kg" ────────────► select_option() ──────► selection changes,    │
//! │                                                   merges duplicates     │
//! │                                                                         │
//! │  Click remove ──────────► remove() ─────────────► line removed          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart is persisted by the storefront, not by this crate. The JSON
//! shape matches what the storefront stores:
//! `{ "productId", "quantity", "selectedPropertyOptions" }`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::validation::{validate_cart_size, validate_quantity, ValidationResult};
use crate::MAX_LINE_QUANTITY;

/// One cart entry.
///
/// ## Invariants
/// - `quantity >= 1` (a line at zero is removed, never stored)
/// - at most one option per property (the map key is the property id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub quantity: u32,
    /// property id → option id
    #[serde(default, alias = "selectedOptions")]
    pub selected_property_options: BTreeMap<String, String>,
}

impl CartLine {
    /// Creates a line without a variant selection.
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        CartLine {
            product_id: product_id.into(),
            quantity,
            selected_property_options: BTreeMap::new(),
        }
    }

    /// Returns the line with `option_id` selected for `property_id`.
    pub fn with_option(mut self, property_id: impl Into<String>, option_id: impl Into<String>) -> Self {
        self.selected_property_options
            .insert(property_id.into(), option_id.into());
        self
    }

    /// The selected option id for a property.
    pub fn selected(&self, property_id: &str) -> Option<&str> {
        self.selected_property_options
            .get(property_id)
            .map(String::as_str)
    }

    /// Stable identity of a line: product plus selection.
    ///
    /// Two lines with the same key are the same thing and get merged.
    pub fn key(&self) -> String {
        let mut key = self.product_id.clone();
        for (property, option) in &self.selected_property_options {
            key.push('|');
            key.push_str(property);
            key.push('=');
            key.push_str(option);
        }
        key
    }
}

/// The customer's cart.
///
/// ## Invariants
/// - Lines are unique by [`CartLine::key`]
/// - Maximum lines: 100, maximum quantity per line: 999
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds a line, or increases the quantity of an identical one.
    pub fn add(&mut self, line: CartLine) -> ValidationResult<()> {
        validate_quantity(line.quantity)?;

        let key = line.key();
        if let Some(existing) = self.lines.iter_mut().find(|l| l.key() == key) {
            let new_qty = existing.quantity.saturating_add(line.quantity);
            validate_quantity(new_qty)?;
            existing.quantity = new_qty;
            return Ok(());
        }

        validate_cart_size(self.lines.len())?;
        self.lines.push(line);
        Ok(())
    }

    /// Sets the quantity of a line. Zero removes it.
    pub fn set_quantity(&mut self, key: &str, quantity: u32) -> ValidationResult<()> {
        if quantity == 0 {
            return self.remove(key);
        }
        validate_quantity(quantity)?;

        let line = self.line_mut(key)?;
        line.quantity = quantity;
        Ok(())
    }

    /// Changes the selected option of one property on a line.
    ///
    /// If the new selection matches another line, the two are merged and the
    /// quantity is capped at the maximum.
    pub fn select_option(
        &mut self,
        key: &str,
        property_id: &str,
        option_id: &str,
    ) -> ValidationResult<()> {
        let index = self.index_of(key)?;
        let mut line = self.lines.remove(index);
        line.selected_property_options
            .insert(property_id.to_string(), option_id.to_string());

        let new_key = line.key();
        if let Some(existing) = self.lines.iter_mut().find(|l| l.key() == new_key) {
            existing.quantity = existing
                .quantity
                .saturating_add(line.quantity)
                .min(MAX_LINE_QUANTITY);
        } else {
            self.lines.insert(index, line);
        }
        Ok(())
    }

    /// Removes a line.
    pub fn remove(&mut self, key: &str) -> ValidationResult<()> {
        let index = self.index_of(key)?;
        self.lines.remove(index);
        Ok(())
    }

    /// Removes every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across lines.
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    fn index_of(&self, key: &str) -> ValidationResult<usize> {
        self.lines
            .iter()
            .position(|l| l.key() == key)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "cart line".to_string(),
                reason: format!("no line with key '{}'", key),
            })
    }

    fn line_mut(&mut self, key: &str) -> ValidationResult<&mut CartLine> {
        let index = self.index_of(key)?;
        Ok(&mut self.lines[index])
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
