//! Progression engine: experience composition, the rebirth transition,
//! and loadout management.

use chrono::{DateTime, Utc};
use log::info;

use crate::config::Config;
use crate::game::cooldown;
use crate::game::errors::GameError;
use crate::game::item::degrade;
use crate::game::types::{ActionKind, GearSlot, Loadout, PlayerRecord};

/// Compose an experience grant.
///
/// Day, set, and class bonuses are additive: they are summed, clamped to
/// `max_pct`, and applied once as a single multiplier. They are never
/// chained as successive multiplications; chaining over-rewarded badly at
/// high percentages.
pub fn grant_experience(
    base: u64,
    day_bonus_pct: f64,
    set_bonus_pct: f64,
    class_bonus_pct: f64,
    max_pct: f64,
) -> u64 {
    let combined = (day_bonus_pct + set_bonus_pct + class_bonus_pct)
        .clamp(0.0, max_pct);
    (base as f64 * (1.0 + combined / 100.0)).round() as u64
}

/// Apply an experience grant to a player using the configured ceiling.
pub fn apply_experience(
    player: &mut PlayerRecord,
    base: u64,
    day_bonus_pct: f64,
    set_bonus_pct: f64,
    class_bonus_pct: f64,
    config: &Config,
) -> u64 {
    let gained = grant_experience(
        base,
        day_bonus_pct,
        set_bonus_pct,
        class_bonus_pct,
        config.progression.max_daily_bonus_pct,
    );
    player.experience = player.experience.saturating_add(gained);
    player.touch();
    gained
}

/// The rebirth transition.
///
/// Increments the rebirth level, wipes loose loot, and degrades each
/// equipped or backpack Legendary/Ascended item. Equipped and backpack
/// membership is otherwise untouched; rebirth stopped wiping gear a long
/// time ago and must never regress to that behavior.
pub fn rebirth(player: &mut PlayerRecord) {
    player.rebirth_level += 1;
    player.loot.clear();

    for item in player.equipped.values_mut() {
        degrade(item);
    }
    for item in player.backpack.iter_mut() {
        degrade(item);
    }

    player.touch();
    info!("{} reborn at level {}", player.id, player.rebirth_level);
}

/// Snapshot the current equipped set under a name.
pub fn save_loadout(player: &mut PlayerRecord, name: &str) {
    let preset: Loadout = player
        .equipped
        .iter()
        .map(|(slot, item)| (*slot, item.name.clone()))
        .collect();
    player.loadouts.insert(name.to_string(), preset);
    player.touch();
}

/// Remove a named preset.
pub fn delete_loadout(player: &mut PlayerRecord, name: &str) -> Result<(), GameError> {
    player
        .loadouts
        .remove(name)
        .map(|_| player.touch())
        .ok_or_else(|| GameError::LoadoutNotFound(name.to_string()))
}

/// Switch to a named loadout, gated by the loadout cooldown.
///
/// Validation order matters: unknown names fail `LoadoutNotFound` and
/// missing gear fails `ItemNotOwned` before the cooldown is consumed, so
/// a failed switch never burns the window.
pub fn switch_loadout(
    player: &mut PlayerRecord,
    name: &str,
    now: DateTime<Utc>,
    config: &Config,
) -> Result<(), GameError> {
    let preset = player
        .loadouts
        .get(name)
        .cloned()
        .ok_or_else(|| GameError::LoadoutNotFound(name.to_string()))?;

    // Every named item must be equipped already or sitting in the backpack,
    // counting copies so a preset cannot claim one item twice.
    let mut required: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for item_name in preset.values() {
        *required.entry(item_name.to_ascii_lowercase()).or_default() += 1;
    }
    for (needle, needed) in &required {
        let available = player
            .equipped
            .values()
            .chain(player.backpack.iter())
            .filter(|i| i.name.to_ascii_lowercase() == *needle)
            .count();
        if available < *needed {
            return Err(GameError::ItemNotOwned(needle.clone()));
        }
    }

    cooldown::try_consume(
        &mut player.cooldowns,
        ActionKind::LoadoutSwitch,
        now,
        config.cooldowns.duration_for(ActionKind::LoadoutSwitch),
    )?;

    // Unequip everything into the backpack, then equip the preset.
    let slots: Vec<GearSlot> = player.equipped.keys().copied().collect();
    for slot in slots {
        if let Some(item) = player.equipped.remove(&slot) {
            player.backpack.push(item);
        }
    }
    for (slot, item_name) in preset {
        let idx = player
            .backpack
            .iter()
            .position(|i| i.name.eq_ignore_ascii_case(&item_name))
            .expect("presence validated above");
        let item = player.backpack.remove(idx);
        player.equipped.insert(slot, item);
    }

    player.touch();
    Ok(())
}
