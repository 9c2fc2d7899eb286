//! Action routing and concurrency control.
//!
//! [`GameService`] is the single entry point the command dispatcher
//! calls. Each mutating action acquires the owning player's exclusive
//! lock (bounded wait, surfacing [`GameError::ConcurrentModification`]
//! on timeout), loads state, runs the pure engine, and writes the result
//! back — so two concurrent requests for the same player can never both
//! pass a cooldown check or both spend the same coin. Cross-player
//! operations take both locks in id order to rule out deadlock between
//! opposite-direction transfers.
//!
//! The cart is world-scoped with single-writer semantics: restock builds
//! a complete replacement and swaps it behind an `RwLock`, so readers
//! always observe a fully-formed cart.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use log::{info, warn};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::time::timeout;

use crate::config::Config;
use crate::game::classes::{self, CatchOutcome, PendingCatch};
use crate::game::economy::{self, NegaverseOutcome};
use crate::game::errors::GameError;
use crate::game::progression;
use crate::game::transfer;
use crate::game::types::{CartRecord, Item, Pet, PlayerRecord};
use crate::storage::GameStore;

/// Longest a caller waits on a player lock before the whole action is
/// rejected for retry.
const LOCK_WAIT: StdDuration = StdDuration::from_secs(5);

/// The simulation core's front door.
#[derive(Debug)]
pub struct GameService {
    store: GameStore,
    config: Config,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    cart: RwLock<Option<Arc<CartRecord>>>,
    pending_catches: Mutex<HashMap<String, PendingCatch>>,
}

impl GameService {
    /// Validate the configuration and open the store at the configured
    /// data directory. Configuration problems are fatal here.
    pub fn new(config: Config) -> Result<Self, GameError> {
        let data_dir = config.storage.data_dir.clone();
        Self::open_at(config, data_dir)
    }

    /// Open against an explicit path (used by tests with tempdirs).
    pub fn open_at(config: Config, path: impl Into<std::path::PathBuf>) -> Result<Self, GameError> {
        config.validate()?;
        let store = GameStore::open(path.into())?;
        let cart = store.get_cart()?.map(Arc::new);
        Ok(Self {
            store,
            config,
            locks: Mutex::new(HashMap::new()),
            cart: RwLock::new(cart),
            pending_catches: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    async fn player_lock(&self, id: &str) -> Arc<Mutex<()>> {
        let mut registry = self.locks.lock().await;
        registry
            .entry(id.to_ascii_lowercase())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn acquire(&self, lock: Arc<Mutex<()>>) -> Result<OwnedMutexGuard<()>, GameError> {
        match timeout(LOCK_WAIT, lock.lock_owned()).await {
            Ok(guard) => Ok(guard),
            Err(_) => {
                warn!("player lock wait exceeded {LOCK_WAIT:?}");
                Err(GameError::ConcurrentModification)
            }
        }
    }

    /// Run a mutation against a single player under their exclusive lock.
    /// The record is persisted only when the engine succeeds.
    async fn with_player<T, F>(&self, id: &str, action: F) -> Result<T, GameError>
    where
        F: FnOnce(&mut PlayerRecord, &Config) -> Result<T, GameError>,
    {
        let lock = self.player_lock(id).await;
        let _guard = self.acquire(lock).await?;

        let mut player = self.store.get_or_create_player(id)?;
        let outcome = action(&mut player, &self.config)?;
        self.store.put_player(player)?;
        Ok(outcome)
    }

    /// Run a mutation against two distinct players, locks taken in id
    /// order. Both records persist together or not at all.
    async fn with_pair<T, F>(&self, id_a: &str, id_b: &str, action: F) -> Result<T, GameError>
    where
        F: FnOnce(&mut PlayerRecord, &mut PlayerRecord, &Config) -> Result<T, GameError>,
    {
        let key_a = id_a.to_ascii_lowercase();
        let key_b = id_b.to_ascii_lowercase();
        if key_a == key_b {
            return Err(GameError::NotFound(
                "a transfer requires two distinct players".to_string(),
            ));
        }

        // Total order on player id prevents AB/BA deadlock.
        let (first, second) = if key_a < key_b {
            (id_a, id_b)
        } else {
            (id_b, id_a)
        };
        let lock_first = self.player_lock(first).await;
        let _guard_first = self.acquire(lock_first).await?;
        let lock_second = self.player_lock(second).await;
        let _guard_second = self.acquire(lock_second).await?;

        let mut a = self.store.get_or_create_player(id_a)?;
        let mut b = self.store.get_or_create_player(id_b)?;
        let outcome = action(&mut a, &mut b, &self.config)?;
        self.store.put_player(a)?;
        self.store.put_player(b)?;
        Ok(outcome)
    }

    /// Read-only snapshot of a player.
    pub async fn player(&self, id: &str) -> Result<PlayerRecord, GameError> {
        self.store.get_player(id)
    }

    /// Ids of every player the store knows about.
    pub fn list_players(&self) -> Result<Vec<String>, GameError> {
        self.store.list_player_ids()
    }

    // ------------------------------------------------------------------
    // Cart
    // ------------------------------------------------------------------

    /// Force a restock: build a complete new cart, persist it, and swap
    /// it in atomically.
    pub async fn restock_cart(&self, now: DateTime<Utc>) -> Result<Arc<CartRecord>, GameError> {
        let mut slot = self.cart.write().await;
        let cart = economy::restock_cart(&mut rand::thread_rng(), &self.config, now)?;
        self.store.put_cart(cart.clone())?;
        let cart = Arc::new(cart);
        *slot = Some(cart.clone());
        Ok(cart)
    }

    /// The current cart, restocking first if none exists or the schedule
    /// has lapsed.
    pub async fn current_cart(&self, now: DateTime<Utc>) -> Result<Arc<CartRecord>, GameError> {
        {
            let slot = self.cart.read().await;
            if let Some(cart) = slot.as_ref() {
                if !cart.is_expired(now) {
                    return Ok(cart.clone());
                }
            }
        }
        info!("cart missing or expired, restocking");
        self.restock_cart(now).await
    }

    /// Buy a listed item by name.
    pub async fn buy(
        &self,
        player_id: &str,
        listing_name: &str,
        now: DateTime<Utc>,
    ) -> Result<(Item, i64), GameError> {
        let cart = self.current_cart(now).await?;
        self.with_player(player_id, |player, _| {
            economy::buy(player, &cart, listing_name)
        })
        .await
    }

    /// Sell an owned item for a trimmed-uniform payout.
    pub async fn sell(&self, player_id: &str, item_name: &str) -> Result<i64, GameError> {
        self.with_player(player_id, |player, config| {
            economy::sell(&mut rand::thread_rng(), player, item_name, config)
        })
        .await
    }

    /// Wager currency in the negaverse for an experience multiplier.
    pub async fn negaverse(
        &self,
        player_id: &str,
        wager: i64,
    ) -> Result<NegaverseOutcome, GameError> {
        self.with_player(player_id, |player, config| {
            economy::negaverse(&mut rand::thread_rng(), player, wager, config)
        })
        .await
    }

    // ------------------------------------------------------------------
    // Progression
    // ------------------------------------------------------------------

    /// Grant experience with day/set bonuses from the caller and the
    /// class bonus rolled here. Returns the experience gained.
    pub async fn grant_experience(
        &self,
        player_id: &str,
        base: u64,
        day_bonus_pct: f64,
        set_bonus_pct: f64,
    ) -> Result<u64, GameError> {
        self.with_player(player_id, |player, config| {
            let class_pct = classes::class_bonus_pct(&mut rand::thread_rng(), player, config);
            Ok(progression::apply_experience(
                player,
                base,
                day_bonus_pct,
                set_bonus_pct,
                class_pct,
                config,
            ))
        })
        .await
    }

    /// Rebirth: level up the counter, wipe loose loot, degrade top-tier
    /// gear, keep everything equipped or carried.
    pub async fn rebirth(&self, player_id: &str) -> Result<u32, GameError> {
        self.with_player(player_id, |player, _| {
            progression::rebirth(player);
            Ok(player.rebirth_level)
        })
        .await
    }

    pub async fn save_loadout(&self, player_id: &str, name: &str) -> Result<(), GameError> {
        self.with_player(player_id, |player, _| {
            progression::save_loadout(player, name);
            Ok(())
        })
        .await
    }

    pub async fn delete_loadout(&self, player_id: &str, name: &str) -> Result<(), GameError> {
        self.with_player(player_id, |player, _| {
            progression::delete_loadout(player, name)
        })
        .await
    }

    pub async fn switch_loadout(
        &self,
        player_id: &str,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        self.with_player(player_id, |player, config| {
            progression::switch_loadout(player, name, now, config)
        })
        .await
    }

    // ------------------------------------------------------------------
    // Transfers
    // ------------------------------------------------------------------

    pub async fn trade(
        &self,
        player_a: &str,
        player_b: &str,
        items_a: &[String],
        items_b: &[String],
    ) -> Result<(), GameError> {
        self.with_pair(player_a, player_b, |a, b, _| {
            transfer::trade(a, b, items_a, items_b)
        })
        .await
    }

    pub async fn bank_transfer(
        &self,
        sender: &str,
        recipient: &str,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        self.with_pair(sender, recipient, |s, r, config| {
            transfer::bank_transfer(s, r, amount, now, config)
        })
        .await
    }

    // ------------------------------------------------------------------
    // Class subsystems
    // ------------------------------------------------------------------

    pub async fn forage(&self, player_id: &str, now: DateTime<Utc>) -> Result<Item, GameError> {
        self.with_player(player_id, |player, config| {
            classes::forage(&mut rand::thread_rng(), player, now, config)
        })
        .await
    }

    /// Phase one of pet capture: record the proposal. A newer proposal
    /// replaces any older one for the same player.
    pub async fn propose_catch(
        &self,
        player_id: &str,
        pet_id: &str,
        now: DateTime<Utc>,
    ) -> Result<PendingCatch, GameError> {
        let pending = classes::propose_catch(pet_id, now, &self.config);
        let mut table = self.pending_catches.lock().await;
        table.insert(player_id.to_ascii_lowercase(), pending.clone());
        Ok(pending)
    }

    /// Phase two: consume the proposal and commit the bond if the window
    /// is still open. An expired or missing proposal changes nothing.
    pub async fn confirm_catch(
        &self,
        player_id: &str,
        now: DateTime<Utc>,
    ) -> Result<CatchOutcome, GameError> {
        let pending = {
            let mut table = self.pending_catches.lock().await;
            table.remove(&player_id.to_ascii_lowercase())
        };
        let Some(pending) = pending else {
            return Ok(CatchOutcome::Expired);
        };

        self.with_player(player_id, |player, _| {
            Ok(classes::confirm_catch(player, &pending, now))
        })
        .await
    }

    /// Free the current pet immediately and unconditionally.
    pub async fn release_pet(&self, player_id: &str) -> Result<Option<Pet>, GameError> {
        self.with_player(player_id, |player, _| Ok(classes::release_pet(player)))
            .await
    }

    /// Drop expired proposals. Safe to call from a periodic sweep; the
    /// confirm path already treats stale entries as absent.
    pub async fn sweep_expired_catches(&self, now: DateTime<Utc>) -> usize {
        let mut table = self.pending_catches.lock().await;
        let before = table.len();
        table.retain(|_, pending| now < pending.expires_at);
        before - table.len()
    }
}
