//! Stackable resource economy.
//!
//! Responsibilities:
//! - The `Inventory` map type used by the player, survivors, and storage
//!   buildings (item id -> stack count, counts strictly positive)
//! - Cost validation and deduction for actions and construction
//! - Atomic transfers between inventories with a receiver-side capacity
//!
//! This module is a leaf: no other domain module is imported here.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of a cost check: either everything is available, or the first
/// item that falls short is reported so callers can build a message from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceCheck {
    pub success: bool,
    pub missing: Option<String>,
}

/// A stack-count inventory. Keys never map to zero: a stack that reaches
/// zero is removed, so iteration and `total` stay honest.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub items: HashMap<String, u32>,
}

impl Inventory {
    pub fn count(&self, item: &str) -> u32 {
        self.items.get(item).copied().unwrap_or(0)
    }

    pub fn has(&self, item: &str, amount: u32) -> bool {
        self.count(item) >= amount
    }

    /// Sum of every stack. Storage capacities are quoted in this measure.
    pub fn total(&self) -> u32 {
        self.items.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add `amount` of `item`. Amounts are unsigned by construction, so the
    /// only degenerate input left is zero; that is logged and ignored.
    pub fn add(&mut self, item: &str, amount: u32) {
        if amount == 0 {
            warn!("[Economy] Ignoring zero-amount add of '{item}'");
            return;
        }
        *self.items.entry(item.to_string()).or_insert(0) += amount;
    }

    /// Check a cost list without mutating, reporting the first shortfall.
    pub fn has_resources(&self, costs: &[(&str, u32)]) -> ResourceCheck {
        for (item, amount) in costs {
            if self.count(item) < *amount {
                return ResourceCheck {
                    success: false,
                    missing: Some((*item).to_string()),
                };
            }
        }
        ResourceCheck {
            success: true,
            missing: None,
        }
    }

    /// Deduct a cost list that `has_resources` already validated. A stack
    /// falling short here means a caller skipped validation; the stack is
    /// clamped at zero and the inconsistency logged rather than propagated.
    pub fn apply_deduction(&mut self, costs: &[(&str, u32)]) {
        for (item, amount) in costs {
            let have = self.count(item);
            if have < *amount {
                warn!("[Economy] Deducting {amount} '{item}' with only {have} on hand; clamping");
            }
            let left = have.saturating_sub(*amount);
            if left == 0 {
                self.items.remove(*item);
            } else {
                self.items.insert((*item).to_string(), left);
            }
        }
    }

    /// Move every stack into `other` with no capacity check. Used where the
    /// receiving side is trusted: ground spills and survivor deposits.
    pub fn drain_into(&mut self, other: &mut Inventory) {
        for (item, amount) in self.items.drain() {
            *other.items.entry(item).or_insert(0) += amount;
        }
    }
}

/// Move `amount` of `item` from `from` to `to`. Fails without touching
/// either side if the source lacks the amount or the destination would
/// exceed `to_capacity` total units.
pub fn transfer(
    from: &mut Inventory,
    to: &mut Inventory,
    item: &str,
    amount: u32,
    to_capacity: u32,
) -> bool {
    if amount == 0 {
        return true;
    }
    if !from.has(item, amount) {
        return false;
    }
    if to.total() + amount > to_capacity {
        return false;
    }
    from.apply_deduction(&[(item, amount)]);
    to.add(item, amount);
    true
}
