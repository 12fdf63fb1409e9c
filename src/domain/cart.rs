use serde::Serialize;
use std::collections::BTreeMap;

use super::order::OrderItem;

// ============================================================================
// Cart Store
// ============================================================================
//
// In-memory cart owned exclusively by one client context. Lines are keyed
// by item name; a surfaced line always has quantity >= 1. The running
// total is derived on demand, never cached.
//
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct CartLine {
    pub unit_price: f64,
    pub quantity: u32,
}

#[derive(Default, Clone, Debug)]
pub struct CartStore {
    lines: BTreeMap<String, CartLine>,
}

/// View model handed to the rendering collaborator.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: f64,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CartLineView {
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
    pub line_total: f64,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of an item: bumps the quantity if the line exists,
    /// otherwise inserts it with quantity 1.
    pub fn add_item(&mut self, name: &str, price: f64) {
        self.lines
            .entry(name.to_string())
            .and_modify(|line| line.quantity += 1)
            .or_insert(CartLine {
                unit_price: price,
                quantity: 1,
            });
    }

    /// Adjusting an absent line is a no-op.
    pub fn increment(&mut self, name: &str) {
        if let Some(line) = self.lines.get_mut(name) {
            line.quantity += 1;
        }
    }

    /// Dropping to zero removes the line entirely; quantity is never
    /// surfaced as zero or negative.
    pub fn decrement(&mut self, name: &str) {
        if let Some(line) = self.lines.get_mut(name) {
            line.quantity -= 1;
            if line.quantity == 0 {
                self.lines.remove(name);
            }
        }
    }

    /// Set a line's quantity from raw user input. Anything that does not
    /// parse as a positive integer deletes the line silently; this is the
    /// invalid-input policy, not an error path.
    pub fn set_quantity(&mut self, name: &str, raw: &str) {
        match raw.trim().parse::<u32>() {
            Ok(value) if value > 0 => {
                if let Some(line) = self.lines.get_mut(name) {
                    line.quantity = value;
                }
            }
            _ => {
                if self.lines.remove(name).is_some() {
                    tracing::debug!(item = %name, input = %raw, "removed cart line on invalid quantity input");
                }
            }
        }
    }

    pub fn total(&self) -> f64 {
        self.lines
            .values()
            .map(|line| line.unit_price * f64::from(line.quantity))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Empties the cart. Called only after a successful order submission.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Snapshot the cart as the ordered item sequence of a new order.
    pub fn snapshot(&self) -> Vec<OrderItem> {
        self.lines
            .iter()
            .map(|(name, line)| OrderItem {
                name: name.clone(),
                price: line.unit_price,
                qty: line.quantity,
            })
            .collect()
    }

    pub fn view(&self) -> CartView {
        CartView {
            lines: self
                .lines
                .iter()
                .map(|(name, line)| CartLineView {
                    name: name.clone(),
                    unit_price: line.unit_price,
                    quantity: line.quantity,
                    line_total: line.unit_price * f64::from(line.quantity),
                })
                .collect(),
            total: self.total(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
