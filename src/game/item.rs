//! Item valuation and degradation rules.
//!
//! Sale value is a pure function of tier and base value. The seller's
//! Luck stat is deliberately absent from every signature in this module;
//! an earlier iteration of the game scaled sell prices with Luck and the
//! economy never recovered.

use crate::game::types::{Item, ItemLocation, Rarity};

/// Base-value reduction applied per rebirth degrade.
pub const DEGRADATION_STEP: i64 = 5;

/// Sale value of an item: effective base value times the tier multiplier.
///
/// Degradation lowers the effective base value by a fixed step per
/// degrade, floored at 1 so degraded relics never become worthless.
pub fn sale_value(item: &Item) -> f64 {
    let effective = (item.base_value - item.degradation as i64 * DEGRADATION_STEP).max(1);
    effective as f64 * item.rarity.value_multiplier()
}

/// Apply one rebirth degrade. Only Legendary and Ascended gear decays;
/// other tiers pass through untouched. Invoked by the rebirth transition
/// only, never by trading or selling.
pub fn degrade(item: &mut Item) {
    if !item.rarity.decays() {
        return;
    }
    item.degraded = true;
    item.degradation = item.degradation.saturating_add(1);
}

/// Whether an item at the given location survives a rebirth. Equipped and
/// backpack gear is protected; loose loot is cleared.
pub fn is_protected_on_rebirth(location: ItemLocation) -> bool {
    matches!(location, ItemLocation::Equipped | ItemLocation::Backpack)
}

/// Inclusive base-value range items of this tier spawn with.
pub fn base_value_range(rarity: Rarity) -> (i64, i64) {
    match rarity {
        Rarity::Normal => (10, 50),
        Rarity::Rare => (40, 120),
        Rarity::Epic => (100, 300),
        Rarity::Legendary => (250, 600),
        Rarity::Ascended => (500, 1200),
        Rarity::Set => (1000, 2000),
    }
}
