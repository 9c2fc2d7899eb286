//! # Configuration Management
//!
//! World constants for the simulation core, loaded from TOML with
//! fail-fast validation. Nothing tunable is hard-coded in the engines:
//! rarity spawn weights, cooldown durations, economy markup and trim
//! fractions, and the daily bonus ceiling all live here so operators can
//! adjust them without a rebuild.
//!
//! Validation runs at load time and is fatal: a weight table that does
//! not sum to 100% or a trim pair that rejects the whole range never
//! reaches a running world.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

use crate::game::errors::GameError;
use crate::game::types::{ActionKind, Rarity};

/// Rarity spawn weight table, in percent. Must sum to 100.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RarityWeights {
    pub normal: f64,
    pub rare: f64,
    pub epic: f64,
    pub legendary: f64,
    pub ascended: f64,
    pub set: f64,
}

impl Default for RarityWeights {
    fn default() -> Self {
        Self {
            normal: 13.0,
            rare: 35.0,
            epic: 35.0,
            legendary: 15.0,
            ascended: 1.8,
            set: 0.2,
        }
    }
}

impl RarityWeights {
    pub fn weight_for(&self, rarity: Rarity) -> f64 {
        match rarity {
            Rarity::Normal => self.normal,
            Rarity::Rare => self.rare,
            Rarity::Epic => self.epic,
            Rarity::Legendary => self.legendary,
            Rarity::Ascended => self.ascended,
            Rarity::Set => self.set,
        }
    }

    pub fn sum(&self) -> f64 {
        Rarity::ALL.iter().map(|r| self.weight_for(*r)).sum()
    }
}

/// Cart, pricing, and gambling constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Cart price = round(sale value * markup). 1.25 keeps sell-back at 80%.
    pub buy_markup: f64,
    /// Half-width of the sale payout spread around the sale value.
    pub sell_spread: f64,
    /// Fraction of the payout range rejected at the low end.
    pub sell_trim_low: f64,
    /// Fraction of the payout range rejected at the high end.
    pub sell_trim_high: f64,
    /// Negaverse multiplier range before trimming.
    pub nega_multiplier_min: f64,
    pub nega_multiplier_max: f64,
    /// Fraction of the multiplier range rejected at the low end. 0.5
    /// eliminates the bottom half outright rather than making it rare.
    pub nega_trim_low: f64,
    pub cart_min_items: usize,
    pub cart_max_items: usize,
    /// Hard budget for the rendered cart listing, in characters.
    pub cart_message_budget: usize,
    /// Longest item name the cart may register.
    pub max_item_name_len: usize,
    /// Cart lifetime before a restock is due, in seconds.
    pub restock_interval_secs: i64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            buy_markup: 1.25,
            sell_spread: 0.25,
            sell_trim_low: 0.2,
            sell_trim_high: 0.2,
            nega_multiplier_min: 0.5,
            nega_multiplier_max: 2.0,
            nega_trim_low: 0.5,
            cart_min_items: 10,
            cart_max_items: 12,
            cart_message_budget: 2000,
            max_item_name_len: 40,
            restock_interval_secs: 10800,
        }
    }
}

/// Per-action cooldown durations, in seconds. A zero duration means the
/// action is never gated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooldownConfig {
    pub loadout_switch_secs: i64,
    pub bank_transfer_secs: i64,
    /// Flat duration regardless of stats.
    pub forage_secs: i64,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            loadout_switch_secs: 60,
            bank_transfer_secs: 30,
            forage_secs: 1800,
        }
    }
}

impl CooldownConfig {
    pub fn duration_for(&self, kind: ActionKind) -> chrono::Duration {
        let secs = match kind {
            ActionKind::LoadoutSwitch => self.loadout_switch_secs,
            ActionKind::BankTransfer => self.bank_transfer_secs,
            ActionKind::Forage => self.forage_secs,
        };
        chrono::Duration::seconds(secs)
    }
}

/// Experience composition constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// Ceiling for the summed day+set+class bonus percentage. At most
    /// 1000 (a 10x multiplier).
    pub max_daily_bonus_pct: f64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            max_daily_bonus_pct: 1000.0,
        }
    }
}

/// Ranger and Bard tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassConfig {
    /// Base pet-bonus proc chance before the Charisma scaling term.
    pub pet_base_proc_rate: f64,
    /// Experience bonus percentage granted when the pet bonus procs.
    pub pet_bonus_pct: f64,
    /// Seconds a pet-capture proposal stays confirmable.
    pub catch_confirm_window_secs: i64,
    /// Bard bonus percentage contributed per point of Charisma.
    pub bard_pct_per_charisma: f64,
}

impl Default for ClassConfig {
    fn default() -> Self {
        Self {
            pet_base_proc_rate: 0.25,
            pet_bonus_pct: 50.0,
            catch_confirm_window_secs: 60,
            bard_pct_per_charisma: 0.25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rarity_weights: RarityWeights,
    #[serde(default)]
    pub economy: EconomyConfig,
    #[serde(default)]
    pub cooldowns: CooldownConfig,
    #[serde(default)]
    pub progression: ProgressionConfig,
    #[serde(default)]
    pub classes: ClassConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

const WEIGHT_SUM_EPSILON: f64 = 1e-6;

impl Config {
    /// Load configuration from a TOML file and validate it. Validation
    /// failures are fatal here; they are never deferred to first use.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .await
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Config =
            toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
        config
            .validate()
            .map_err(|e| anyhow!("config validation failed: {}", e))?;
        Ok(config)
    }

    /// Write a default configuration file.
    pub async fn create_default<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Config::default();
        let rendered = toml::to_string_pretty(&config)?;
        fs::write(path.as_ref(), rendered).await?;
        Ok(())
    }

    /// Check every constant against its documented bounds.
    pub fn validate(&self) -> Result<(), GameError> {
        let sum = self.rarity_weights.sum();
        if (sum - 100.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(GameError::InvalidConfiguration(format!(
                "rarity weights must sum to 100, got {sum}"
            )));
        }
        for rarity in Rarity::ALL {
            let w = self.rarity_weights.weight_for(rarity);
            if w < 0.0 {
                return Err(GameError::InvalidConfiguration(format!(
                    "rarity weight for {rarity} is negative"
                )));
            }
        }

        let eco = &self.economy;
        if eco.buy_markup <= 1.0 {
            return Err(GameError::InvalidConfiguration(
                "buy_markup must be greater than 1.0".into(),
            ));
        }
        if !(0.0..1.0).contains(&eco.sell_spread) {
            return Err(GameError::InvalidConfiguration(
                "sell_spread must be in [0, 1)".into(),
            ));
        }
        for (name, value) in [
            ("sell_trim_low", eco.sell_trim_low),
            ("sell_trim_high", eco.sell_trim_high),
            ("nega_trim_low", eco.nega_trim_low),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(GameError::InvalidConfiguration(format!(
                    "{name} must be in [0, 1)"
                )));
            }
        }
        if eco.sell_trim_low + eco.sell_trim_high >= 1.0 {
            return Err(GameError::InvalidConfiguration(
                "sell trim fractions reject the entire range".into(),
            ));
        }
        if eco.nega_multiplier_min >= eco.nega_multiplier_max {
            return Err(GameError::InvalidConfiguration(
                "negaverse multiplier range is empty".into(),
            ));
        }
        if eco.cart_min_items == 0 || eco.cart_min_items > eco.cart_max_items {
            return Err(GameError::InvalidConfiguration(
                "cart item bounds are inverted or zero".into(),
            ));
        }
        if eco.cart_message_budget == 0 || eco.max_item_name_len == 0 {
            return Err(GameError::InvalidConfiguration(
                "cart message budget and name length must be positive".into(),
            ));
        }
        if eco.restock_interval_secs <= 0 {
            return Err(GameError::InvalidConfiguration(
                "restock_interval_secs must be positive".into(),
            ));
        }

        if !(0.0..=1000.0).contains(&self.progression.max_daily_bonus_pct) {
            return Err(GameError::InvalidConfiguration(
                "max_daily_bonus_pct must be within 0..=1000".into(),
            ));
        }

        let classes = &self.classes;
        if !(0.0..=1.0).contains(&classes.pet_base_proc_rate) {
            return Err(GameError::InvalidConfiguration(
                "pet_base_proc_rate must be a probability".into(),
            ));
        }
        if classes.catch_confirm_window_secs <= 0 {
            return Err(GameError::InvalidConfiguration(
                "catch_confirm_window_secs must be positive".into(),
            ));
        }
        if classes.bard_pct_per_charisma < 0.0 || classes.pet_bonus_pct < 0.0 {
            return Err(GameError::InvalidConfiguration(
                "class bonus constants must be non-negative".into(),
            ));
        }

        for (name, secs) in [
            ("loadout_switch_secs", self.cooldowns.loadout_switch_secs),
            ("bank_transfer_secs", self.cooldowns.bank_transfer_secs),
            ("forage_secs", self.cooldowns.forage_secs),
        ] {
            if secs < 0 {
                return Err(GameError::InvalidConfiguration(format!(
                    "{name} must not be negative"
                )));
            }
        }

        Ok(())
    }
}
