//! Economy engine: cart restocking, buy/sell pricing, and the negaverse
//! gamble.
//!
//! The cart is world-scoped and regenerated wholesale; the service layer
//! swaps the new value in atomically so readers never observe a
//! half-built listing. Listing names are validated here, at generation
//! time, so a purchase by a valid listed name can never fail on name
//! length.

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use rand::Rng;

use crate::config::Config;
use crate::game::errors::GameError;
use crate::game::item::{base_value_range, sale_value};
use crate::game::rng::{finalize_price, trimmed_uniform, uniform_int, weighted_tier};
use crate::game::types::{
    CartListing, CartRecord, Item, ItemLocation, PlayerRecord, Rarity, CART_SCHEMA_VERSION,
};

// Name tables keep every combination comfortably under the default
// 40-character listing budget; restock still validates each generated
// name so shrinking the budget in config fails loudly at restock time.
const NAME_PREFIXES: [&str; 12] = [
    "Rusty", "Sturdy", "Polished", "Gleaming", "Runed", "Ancient", "Whispering", "Stormforged",
    "Sunlit", "Grim", "Hallowed", "Mirrored",
];

const NAME_CORES: [&str; 12] = [
    "Blade", "Helm", "Cuirass", "Gauntlets", "Greaves", "Talisman", "Ring", "Cloak", "Warhammer",
    "Longbow", "Grimoire", "Idol",
];

const NAME_SUFFIXES: [&str; 8] = [
    "of Embers", "of the Fox", "of Dusk", "of Clarity", "of the Deep", "of Thorns", "of Echoes",
    "of Winter",
];

/// Pick a display name for a freshly rolled item. Higher tiers carry a
/// suffix, plain gear does not.
fn generate_item_name<R: Rng + ?Sized>(rng: &mut R, rarity: Rarity) -> String {
    let prefix = NAME_PREFIXES[rng.gen_range(0..NAME_PREFIXES.len())];
    let core = NAME_CORES[rng.gen_range(0..NAME_CORES.len())];
    if rarity >= Rarity::Legendary {
        let suffix = NAME_SUFFIXES[rng.gen_range(0..NAME_SUFFIXES.len())];
        format!("{prefix} {core} {suffix}")
    } else {
        format!("{prefix} {core}")
    }
}

/// Validate a name against the listing budget. The only place
/// [`GameError::ItemNameTooLong`] can originate.
pub fn validate_listing_name(name: &str, config: &Config) -> Result<(), GameError> {
    if name.chars().count() > config.economy.max_item_name_len {
        return Err(GameError::ItemNameTooLong(name.to_string()));
    }
    Ok(())
}

/// Cart price for an item: sale value with the buy markup applied,
/// rounded once. Selling back at the configured spread midpoint yields
/// `price / markup` (80% with the default 1.25 markup).
pub fn price_of(item: &Item, config: &Config) -> i64 {
    finalize_price(sale_value(item) * config.economy.buy_markup)
}

/// Roll a single item of the given tier.
fn roll_item<R: Rng + ?Sized>(rng: &mut R, rarity: Rarity) -> Item {
    let (lo, hi) = base_value_range(rarity);
    let base_value = uniform_int(rng, lo, hi);
    Item::new(generate_item_name(rng, rarity), rarity, base_value)
}

/// Build a fresh cart: 10-12 listings, rarity sampled independently per
/// slot from the configured weights, prices finalized here.
///
/// The rendered listing must fit the message budget; the item count and
/// name tables are sized so it always does with default config, and a
/// misconfigured budget surfaces as a hard error instead of a truncated
/// cart.
pub fn restock_cart<R: Rng + ?Sized>(
    rng: &mut R,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<CartRecord, GameError> {
    let eco = &config.economy;
    let count = uniform_int(rng, eco.cart_min_items as i64, eco.cart_max_items as i64) as usize;

    let mut listings = Vec::with_capacity(count);
    for _ in 0..count {
        let rarity = weighted_tier(rng, &config.rarity_weights);
        let item = roll_item(rng, rarity);
        validate_listing_name(&item.name, config)?;
        let price = price_of(&item, config);
        listings.push(CartListing { item, price });
    }

    let cart = CartRecord {
        listings,
        restocked_at: now,
        expires_at: now + Duration::seconds(eco.restock_interval_secs),
        schema_version: CART_SCHEMA_VERSION,
    };

    let rendered = cart.render();
    if rendered.chars().count() > eco.cart_message_budget {
        return Err(GameError::InvalidConfiguration(format!(
            "rendered cart is {} chars, budget is {}",
            rendered.chars().count(),
            eco.cart_message_budget
        )));
    }

    info!(
        "cart restocked with {} listings, expires {}",
        cart.listings.len(),
        cart.expires_at
    );
    Ok(cart)
}

/// Purchase a listed item. Debits the buyer and drops a copy of the item
/// into their loose loot in one step; on any failure the player is
/// untouched.
pub fn buy(
    player: &mut PlayerRecord,
    cart: &CartRecord,
    listing_name: &str,
) -> Result<(Item, i64), GameError> {
    let listing = cart
        .find_listing(listing_name)
        .ok_or_else(|| GameError::NotFound(format!("cart listing: {listing_name}")))?;

    if player.balance < listing.price {
        return Err(GameError::InsufficientFunds);
    }

    player.balance -= listing.price;
    player.loot.push(listing.item.clone());
    player.touch();
    debug!(
        "{} bought {} for {}",
        player.id, listing.item.name, listing.price
    );
    Ok((listing.item.clone(), listing.price))
}

/// Sell an owned (unequipped) item. The payout is a trimmed-uniform draw
/// around the item's sale value, rounded once, and independent of the
/// seller's stats.
pub fn sell<R: Rng + ?Sized>(
    rng: &mut R,
    player: &mut PlayerRecord,
    item_name: &str,
    config: &Config,
) -> Result<i64, GameError> {
    let (location, idx) = player
        .find_owned(item_name)
        .ok_or_else(|| GameError::ItemNotOwned(item_name.to_string()))?;

    let item = match location {
        ItemLocation::Backpack => player.backpack.remove(idx),
        _ => player.loot.remove(idx),
    };

    let eco = &config.economy;
    let value = sale_value(&item);
    let payout = finalize_price(trimmed_uniform(
        rng,
        value * (1.0 - eco.sell_spread),
        value * (1.0 + eco.sell_spread),
        eco.sell_trim_low,
        eco.sell_trim_high,
    ));

    player.balance += payout;
    player.touch();
    debug!("{} sold {} for {}", player.id, item.name, payout);
    Ok(payout)
}

/// Outcome of a negaverse gamble: the multiplier that was drawn and the
/// experience it yielded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NegaverseOutcome {
    pub multiplier: f64,
    pub experience_gained: u64,
}

/// Trade a wager for a randomized experience multiplier.
///
/// The multiplier is drawn exactly once per call from the trimmed range,
/// so the bottom half of the naive roll range is eliminated outright. A
/// wager below 1 or above the balance is rejected before any mutation;
/// there is no neutral-default fallback.
pub fn negaverse<R: Rng + ?Sized>(
    rng: &mut R,
    player: &mut PlayerRecord,
    wager: i64,
    config: &Config,
) -> Result<NegaverseOutcome, GameError> {
    if wager < 1 || wager > player.balance {
        return Err(GameError::InsufficientFunds);
    }

    let eco = &config.economy;
    let multiplier = trimmed_uniform(
        rng,
        eco.nega_multiplier_min,
        eco.nega_multiplier_max,
        eco.nega_trim_low,
        0.0,
    );
    let experience_gained = (wager as f64 * multiplier).round() as u64;

    player.balance -= wager;
    player.experience = player.experience.saturating_add(experience_gained);
    player.touch();
    info!(
        "{} braved the negaverse: wager {}, multiplier {:.2}, xp {}",
        player.id, wager, multiplier, experience_gained
    );
    Ok(NegaverseOutcome {
        multiplier,
        experience_gained,
    })
}
