//! Class subsystems: the Ranger's forage and pet-capture minigame, and
//! the Bard's Charisma-driven reward scaling.
//!
//! Pet capture is two-phase: a proposal is recorded with an expiry
//! window, and a later confirmation either commits the bond or collapses
//! to a no-op if the window has passed. The service layer keys pending
//! proposals by player id; no callbacks are involved.

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use rand::Rng;

use crate::config::Config;
use crate::game::cooldown;
use crate::game::errors::GameError;
use crate::game::rng::uniform_int;
use crate::game::types::{ActionKind, HeroClass, Item, Pet, PlayerRecord, Rarity};

const FORAGE_FINDS: [&str; 8] = [
    "Wild Mushroom",
    "Bitterroot",
    "Moonpetal",
    "Dried Sage",
    "Pine Resin",
    "Sour Berries",
    "Owl Feather",
    "River Clay",
];

/// Forage for loose loot. Flat 30-minute cooldown by default and a yield
/// that is deliberately independent of every stat; the old stat-scaled
/// cooldown is gone.
pub fn forage<R: Rng + ?Sized>(
    rng: &mut R,
    player: &mut PlayerRecord,
    now: DateTime<Utc>,
    config: &Config,
) -> Result<Item, GameError> {
    cooldown::try_consume(
        &mut player.cooldowns,
        ActionKind::Forage,
        now,
        config.cooldowns.duration_for(ActionKind::Forage),
    )?;

    let name = FORAGE_FINDS[rng.gen_range(0..FORAGE_FINDS.len())];
    let find = Item::new(name, Rarity::Normal, uniform_int(rng, 5, 25));
    player.loot.push(find.clone());
    player.touch();
    debug!("{} foraged {}", player.id, find.name);
    Ok(find)
}

/// A pet-capture proposal waiting for confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCatch {
    pub pet_id: String,
    pub proposed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Result of confirming a capture.
#[derive(Debug, Clone, PartialEq)]
pub enum CatchOutcome {
    /// The bond committed.
    Caught(Pet),
    /// The confirmation window had passed; nothing changed.
    Expired,
    /// The player already has a pet; release it first.
    AlreadyBonded,
}

/// Phase one: record intent to catch. No cooldown applies; the explicit
/// confirmation step is the gate.
pub fn propose_catch(pet_id: &str, now: DateTime<Utc>, config: &Config) -> PendingCatch {
    PendingCatch {
        pet_id: pet_id.to_string(),
        proposed_at: now,
        expires_at: now + Duration::seconds(config.classes.catch_confirm_window_secs),
    }
}

/// Phase two: commit the capture if the window is still open.
pub fn confirm_catch(
    player: &mut PlayerRecord,
    pending: &PendingCatch,
    now: DateTime<Utc>,
) -> CatchOutcome {
    if now >= pending.expires_at {
        return CatchOutcome::Expired;
    }
    if player.pet.is_some() {
        return CatchOutcome::AlreadyBonded;
    }
    let pet = Pet {
        id: pending.pet_id.clone(),
        name: pending.pet_id.replace('_', " "),
        bonded_at: now,
    };
    player.pet = Some(pet.clone());
    player.touch();
    info!("{} bonded with pet {}", player.id, pet.id);
    CatchOutcome::Caught(pet)
}

/// Free the current pet immediately and unconditionally, clearing the way
/// for a new catch attempt.
pub fn release_pet(player: &mut PlayerRecord) -> Option<Pet> {
    let released = player.pet.take();
    if released.is_some() {
        player.touch();
    }
    released
}

/// Chance of the pet bonus firing on a reward:
/// `base + floor(charisma / 100) * 0.01`.
pub fn pet_proc_rate(charisma: i32, config: &Config) -> f64 {
    let steps = (charisma.max(0) / 100) as f64;
    (config.classes.pet_base_proc_rate + steps * 0.01).min(1.0)
}

/// Bard reward scaling, as a bonus percentage. A function of Charisma
/// only; Attack, Strength, and Intelligence are intentionally absent.
pub fn bard_bonus_pct(charisma: i32, config: &Config) -> f64 {
    charisma.max(0) as f64 * config.classes.bard_pct_per_charisma
}

/// Class bonus percentage for an experience grant. Rangers roll their pet
/// proc; Bards scale with Charisma; everyone else gets nothing.
pub fn class_bonus_pct<R: Rng + ?Sized>(
    rng: &mut R,
    player: &PlayerRecord,
    config: &Config,
) -> f64 {
    match player.hero_class {
        Some(HeroClass::Bard) => bard_bonus_pct(player.stats.charisma, config),
        Some(HeroClass::Ranger) => {
            if player.pet.is_some()
                && rng.gen_bool(pet_proc_rate(player.stats.charisma, config))
            {
                config.classes.pet_bonus_pct
            } else {
                0.0
            }
        }
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn forage_is_gated_by_flat_cooldown() {
        let config = Config::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut player = PlayerRecord::new("rowan", "Rowan");
        player.hero_class = Some(HeroClass::Ranger);
        let t0 = Utc::now();

        forage(&mut rng, &mut player, t0, &config).expect("first forage");
        assert_eq!(player.loot.len(), 1);

        let err = forage(&mut rng, &mut player, t0 + Duration::minutes(29), &config)
            .expect_err("still cooling down");
        assert!(matches!(err, GameError::CooldownActive { .. }));

        forage(&mut rng, &mut player, t0 + Duration::minutes(30), &config)
            .expect("window elapsed");
        assert_eq!(player.loot.len(), 2);
    }

    #[test]
    fn forage_yield_ignores_stats() {
        let config = Config::default();
        let mut strong = PlayerRecord::new("strong", "Strong");
        strong.stats.strength = 500;
        strong.stats.luck = 500;
        let mut weak = PlayerRecord::new("weak", "Weak");

        let mut rng_a = StdRng::seed_from_u64(21);
        let mut rng_b = StdRng::seed_from_u64(21);
        let a = forage(&mut rng_a, &mut strong, Utc::now(), &config).unwrap();
        let b = forage(&mut rng_b, &mut weak, Utc::now(), &config).unwrap();
        assert_eq!(a.name, b.name);
        assert_eq!(a.base_value, b.base_value);
    }

    #[test]
    fn catch_confirms_within_window() {
        let config = Config::default();
        let mut player = PlayerRecord::new("rowan", "Rowan");
        let t0 = Utc::now();
        let pending = propose_catch("silver_fox", t0, &config);

        match confirm_catch(&mut player, &pending, t0 + Duration::seconds(10)) {
            CatchOutcome::Caught(pet) => assert_eq!(pet.id, "silver_fox"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(player.pet.is_some());
    }

    #[test]
    fn catch_expires_to_noop() {
        let config = Config::default();
        let mut player = PlayerRecord::new("rowan", "Rowan");
        let t0 = Utc::now();
        let pending = propose_catch("silver_fox", t0, &config);

        let outcome = confirm_catch(&mut player, &pending, t0 + Duration::seconds(61));
        assert_eq!(outcome, CatchOutcome::Expired);
        assert!(player.pet.is_none());
    }

    #[test]
    fn release_enables_immediate_recatch() {
        let config = Config::default();
        let mut player = PlayerRecord::new("rowan", "Rowan");
        let t0 = Utc::now();

        let first = propose_catch("silver_fox", t0, &config);
        confirm_catch(&mut player, &first, t0);

        let second = propose_catch("ember_owl", t0, &config);
        assert_eq!(
            confirm_catch(&mut player, &second, t0 + Duration::seconds(1)),
            CatchOutcome::AlreadyBonded
        );

        assert!(release_pet(&mut player).is_some());
        match confirm_catch(&mut player, &second, t0 + Duration::seconds(2)) {
            CatchOutcome::Caught(pet) => assert_eq!(pet.id, "ember_owl"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn pet_proc_rate_steps_per_hundred_charisma() {
        let config = Config::default();
        let base = config.classes.pet_base_proc_rate;
        assert_eq!(pet_proc_rate(0, &config), base);
        assert_eq!(pet_proc_rate(99, &config), base);
        assert!((pet_proc_rate(100, &config) - (base + 0.01)).abs() < 1e-12);
        assert!((pet_proc_rate(250, &config) - (base + 0.02)).abs() < 1e-12);
    }

    #[test]
    fn bard_bonus_reads_charisma_only() {
        let config = Config::default();
        let mut bard = PlayerRecord::new("lyra", "Lyra");
        bard.hero_class = Some(HeroClass::Bard);
        bard.stats.charisma = 200;
        bard.stats.attack = 999;
        bard.stats.strength = 999;
        bard.stats.intelligence = 999;

        let mut rng = StdRng::seed_from_u64(1);
        let with_combat_stats = class_bonus_pct(&mut rng, &bard, &config);

        bard.stats.attack = 0;
        bard.stats.strength = 0;
        bard.stats.intelligence = 0;
        let mut rng = StdRng::seed_from_u64(1);
        let without_combat_stats = class_bonus_pct(&mut rng, &bard, &config);

        assert_eq!(with_combat_stats, without_combat_stats);
        assert_eq!(with_combat_stats, bard_bonus_pct(200, &config));
    }

    #[test]
    fn ranger_without_pet_gets_no_bonus() {
        let config = Config::default();
        let mut ranger = PlayerRecord::new("rowan", "Rowan");
        ranger.hero_class = Some(HeroClass::Ranger);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            assert_eq!(class_bonus_pct(&mut rng, &ranger, &config), 0.0);
        }
    }
}
