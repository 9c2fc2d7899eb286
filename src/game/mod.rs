//! Game engines and data model.
//! Engines are pure functions of (player state, world constants, RNG
//! stream) so tests can pin a seed and assert exact outcomes; the
//! [`service`] module layers per-player serialization and persistence on
//! top.

pub mod classes;
pub mod cooldown;
pub mod economy;
pub mod errors;
pub mod item;
pub mod progression;
pub mod rng;
pub mod service;
pub mod transfer;
pub mod types;

pub use classes::{
    bard_bonus_pct, class_bonus_pct, confirm_catch, forage, pet_proc_rate, propose_catch,
    release_pet, CatchOutcome, PendingCatch,
};
pub use cooldown::{check as cooldown_check, remaining as cooldown_remaining, try_consume};
pub use economy::{
    buy, negaverse, price_of, restock_cart, sell, validate_listing_name, NegaverseOutcome,
};
pub use errors::GameError;
pub use item::{base_value_range, degrade, is_protected_on_rebirth, sale_value, DEGRADATION_STEP};
pub use progression::{
    apply_experience, delete_loadout, grant_experience, rebirth, save_loadout, switch_loadout,
};
pub use rng::{finalize_price, trimmed_uniform, uniform_int, weighted_tier};
pub use service::GameService;
pub use transfer::{bank_transfer, trade};
pub use types::*;
