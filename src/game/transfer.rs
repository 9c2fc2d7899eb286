//! Transfer engine: item trades and bank transfers between players.
//!
//! Both operations are all-or-nothing. The service layer holds both
//! players' locks (acquired in id order) while these run, so there is no
//! intermediate state in which an item or a coin exists on both sides or
//! neither.

use chrono::{DateTime, Utc};
use log::info;

use crate::config::Config;
use crate::game::cooldown;
use crate::game::errors::GameError;
use crate::game::types::{ActionKind, Item, ItemLocation, PlayerRecord};

/// Locate every named item on a player, failing fast on the first miss.
/// Indices are collected before anything is removed so validation cannot
/// leave a half-taken inventory behind.
fn locate_all(
    player: &PlayerRecord,
    names: &[String],
) -> Result<Vec<(ItemLocation, usize)>, GameError> {
    let mut taken: Vec<(ItemLocation, usize)> = Vec::with_capacity(names.len());
    for name in names {
        let found = next_copy(player, name, &taken)
            .ok_or_else(|| GameError::ItemNotOwned(name.clone()))?;
        taken.push(found);
    }
    Ok(taken)
}

/// First copy of `name` (backpack before loot) not already claimed by an
/// earlier entry in the same trade list.
fn next_copy(
    player: &PlayerRecord,
    name: &str,
    taken: &[(ItemLocation, usize)],
) -> Option<(ItemLocation, usize)> {
    let needle = name.to_ascii_lowercase();
    for (loc, items) in [
        (ItemLocation::Backpack, &player.backpack),
        (ItemLocation::Loot, &player.loot),
    ] {
        for (idx, item) in items.iter().enumerate() {
            if item.name.to_ascii_lowercase() == needle && !taken.contains(&(loc, idx)) {
                return Some((loc, idx));
            }
        }
    }
    None
}

/// Remove located items, highest index first so earlier indices stay valid.
fn extract(player: &mut PlayerRecord, mut located: Vec<(ItemLocation, usize)>) -> Vec<Item> {
    located.sort_by(|a, b| b.1.cmp(&a.1));
    located
        .into_iter()
        .map(|(loc, idx)| match loc {
            ItemLocation::Backpack => player.backpack.remove(idx),
            _ => player.loot.remove(idx),
        })
        .collect()
}

/// Trade items between two players.
///
/// Permitted between any two players regardless of rebirth level; the
/// old rebirth-gap restriction is gone. Ownership of every listed item is
/// validated for both sides before a single item moves.
pub fn trade(
    a: &mut PlayerRecord,
    b: &mut PlayerRecord,
    items_a: &[String],
    items_b: &[String],
) -> Result<(), GameError> {
    let located_a = locate_all(a, items_a)?;
    let located_b = locate_all(b, items_b)?;

    let moving_a = extract(a, located_a);
    let moving_b = extract(b, located_b);

    a.loot.extend(moving_b);
    b.loot.extend(moving_a);
    a.touch();
    b.touch();
    info!(
        "trade complete: {} gave {} item(s), {} gave {} item(s)",
        a.id,
        items_a.len(),
        b.id,
        items_b.len()
    );
    Ok(())
}

/// Move currency from sender to recipient.
///
/// The sender's 30-second transfer cooldown is checked before funds, so a
/// rapid second transfer reports `CooldownActive` rather than
/// `InsufficientFunds`, and the cooldown is only consumed once the
/// transfer is certain to commit.
pub fn bank_transfer(
    sender: &mut PlayerRecord,
    recipient: &mut PlayerRecord,
    amount: i64,
    now: DateTime<Utc>,
    config: &Config,
) -> Result<(), GameError> {
    cooldown::check(&sender.cooldowns, ActionKind::BankTransfer, now)?;

    if amount < 1 || sender.balance < amount {
        return Err(GameError::InsufficientFunds);
    }

    cooldown::try_consume(
        &mut sender.cooldowns,
        ActionKind::BankTransfer,
        now,
        config.cooldowns.duration_for(ActionKind::BankTransfer),
    )?;
    sender.balance -= amount;
    recipient.balance += amount;
    sender.touch();
    recipient.touch();
    info!("{} transferred {} to {}", sender.id, amount, recipient.id);
    Ok(())
}
