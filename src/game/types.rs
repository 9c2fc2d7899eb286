use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const PLAYER_SCHEMA_VERSION: u8 = 1;
pub const CART_SCHEMA_VERSION: u8 = 1;

/// Item rarity ladder. Ordering matters: spawn weight, value multiplier,
/// and degradation eligibility are all keyed off the tier.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Normal,
    Rare,
    Epic,
    Legendary,
    Ascended,
    Set,
}

impl Rarity {
    /// All tiers in ascending order.
    pub const ALL: [Rarity; 6] = [
        Rarity::Normal,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Ascended,
        Rarity::Set,
    ];

    /// Only Legendary and Ascended gear decays across rebirths.
    pub fn decays(&self) -> bool {
        matches!(self, Rarity::Legendary | Rarity::Ascended)
    }

    /// Sale-value multiplier applied on top of an item's base value.
    pub fn value_multiplier(&self) -> f64 {
        match self {
            Rarity::Normal => 1.0,
            Rarity::Rare => 2.0,
            Rarity::Epic => 4.0,
            Rarity::Legendary => 8.0,
            Rarity::Ascended => 16.0,
            Rarity::Set => 32.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rarity::Normal => "Normal",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
            Rarity::Ascended => "Ascended",
            Rarity::Set => "Set",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Equipment slots a player can fill.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GearSlot {
    Head,
    Neck,
    Chest,
    Gloves,
    Belt,
    Legs,
    Boots,
    Left,
    Right,
    Ring,
    Charm,
    TwoHanded,
}

/// Where an item currently lives. Equipped and backpack items survive a
/// rebirth; loose loot does not.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemLocation {
    Equipped,
    Backpack,
    Loot,
    ShopListed,
}

/// A single item instance. Ownership moves atomically on trade, purchase,
/// and sale; there is no shared or partial ownership.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub name: String,
    pub rarity: Rarity,
    /// Tier-independent base value; the rarity multiplier is applied on top.
    pub base_value: i64,
    /// Set once the item has been through at least one rebirth degrade.
    #[serde(default)]
    pub degraded: bool,
    /// Number of rebirth degrades applied (Legendary/Ascended only).
    #[serde(default)]
    pub degradation: u32,
}

impl Item {
    pub fn new(name: impl Into<String>, rarity: Rarity, base_value: i64) -> Self {
        Self {
            name: name.into(),
            rarity,
            base_value,
            degraded: false,
            degradation: 0,
        }
    }
}

/// Actions gated by the cooldown ledger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    LoadoutSwitch,
    BankTransfer,
    Forage,
}

/// Hero classes with bespoke subsystems. Players without a class get no
/// class bonus and no class actions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HeroClass {
    Ranger,
    Bard,
}

/// A Ranger's bonded pet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub bonded_at: DateTime<Utc>,
}

/// Core attribute block. Luck exists but must never influence sale
/// payouts; Bard scaling reads Charisma only.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerStats {
    pub attack: i32,
    pub strength: i32,
    pub intelligence: i32,
    pub charisma: i32,
    pub luck: i32,
}

/// A named preset of equipped-gear assignments, referencing owned items
/// by name.
pub type Loadout = HashMap<GearSlot, String>;

/// Persistent per-player state. Created on first interaction, persists
/// indefinitely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub stats: PlayerStats,
    /// Currency on hand. Invariant: never negative; all debits are checked.
    pub balance: i64,
    pub experience: u64,
    /// Monotonically increasing; never reset.
    pub rebirth_level: u32,
    #[serde(default)]
    pub hero_class: Option<HeroClass>,
    /// Equipped gear by slot. Survives rebirth (degraded where eligible).
    #[serde(default)]
    pub equipped: HashMap<GearSlot, Item>,
    /// Carried gear. Survives rebirth like equipped gear.
    #[serde(default)]
    pub backpack: Vec<Item>,
    /// Loose loot inventory. Wiped on rebirth.
    #[serde(default)]
    pub loot: Vec<Item>,
    #[serde(default)]
    pub loadouts: HashMap<String, Loadout>,
    /// Action -> expiry timestamp. Entries are never deleted; an expired
    /// entry is equivalent to an absent one.
    #[serde(default)]
    pub cooldowns: HashMap<ActionKind, DateTime<Utc>>,
    /// Ranger pet, if bonded.
    #[serde(default)]
    pub pet: Option<Pet>,
    pub schema_version: u8,
}

impl PlayerRecord {
    pub fn new(id: &str, display_name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            created_at: now,
            updated_at: now,
            stats: PlayerStats::default(),
            balance: 0,
            experience: 0,
            rebirth_level: 0,
            hero_class: None,
            equipped: HashMap::new(),
            backpack: Vec::new(),
            loot: Vec::new(),
            loadouts: HashMap::new(),
            cooldowns: HashMap::new(),
            pet: None,
            schema_version: PLAYER_SCHEMA_VERSION,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Look up an unequipped item (backpack first, then loot) by
    /// case-insensitive name.
    pub fn find_owned(&self, name: &str) -> Option<(ItemLocation, usize)> {
        let needle = name.to_ascii_lowercase();
        if let Some(idx) = self
            .backpack
            .iter()
            .position(|i| i.name.to_ascii_lowercase() == needle)
        {
            return Some((ItemLocation::Backpack, idx));
        }
        self.loot
            .iter()
            .position(|i| i.name.to_ascii_lowercase() == needle)
            .map(|idx| (ItemLocation::Loot, idx))
    }
}

/// One cart listing: an item template and its finalized (rounded) price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartListing {
    pub item: Item,
    pub price: i64,
}

/// The world-scoped rotating shop. Regenerated wholesale on restock and
/// swapped in atomically; listings are never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartRecord {
    pub listings: Vec<CartListing>,
    pub restocked_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl CartRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Case-insensitive listing lookup by item name.
    pub fn find_listing(&self, name: &str) -> Option<&CartListing> {
        let needle = name.to_ascii_lowercase();
        self.listings
            .iter()
            .find(|l| l.item.name.to_ascii_lowercase() == needle)
    }

    /// Render the cart as the user-facing listing text. The serialized
    /// form must stay within the configured message budget; restock
    /// validates this before the cart is published.
    pub fn render(&self) -> String {
        let mut out = String::from("=== Wandering Cart ===\n");
        for (idx, listing) in self.listings.iter().enumerate() {
            out.push_str(&format!(
                "{}. [{}] {} - {} gold\n",
                idx + 1,
                listing.item.rarity.label(),
                listing.item.name,
                listing.price
            ));
        }
        out
    }
}
