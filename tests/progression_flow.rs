//! Experience composition, rebirth, and loadout switching end to end.

mod common;

use chrono::{Duration, Utc};
use questforge::game::{
    grant_experience, GameError, GearSlot, HeroClass, Item, PlayerRecord, Rarity,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

#[test]
fn experience_formula_holds_over_random_inputs() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..1000 {
        let base: u64 = rng.gen_range(1..10_000);
        let day: f64 = rng.gen_range(0.0..600.0);
        let set: f64 = rng.gen_range(0.0..400.0);
        let class: f64 = rng.gen_range(0.0..300.0);
        let max_pct: f64 = rng.gen_range(0.0..=1000.0);

        let expected = (base as f64 * (1.0 + (day + set + class).min(max_pct) / 100.0)).round();
        assert_eq!(grant_experience(base, day, set, class, max_pct), expected as u64);
    }
}

#[tokio::test]
async fn rebirth_keeps_gear_wipes_loot_and_degrades_top_tiers() {
    let dir = TempDir::new().expect("tempdir");
    let mut hero = PlayerRecord::new("hero", "Hero");
    hero.equipped
        .insert(GearSlot::Head, Item::new("Runed Helm", Rarity::Legendary, 300));
    hero.equipped
        .insert(GearSlot::Chest, Item::new("Sturdy Cuirass", Rarity::Epic, 150));
    hero.backpack
        .push(Item::new("Ancient Idol", Rarity::Ascended, 700));
    hero.backpack
        .push(Item::new("Rusty Blade", Rarity::Normal, 15));
    hero.loot.push(Item::new("Sour Berries", Rarity::Normal, 8));
    common::seed_players(dir.path(), vec![hero]);

    let service = common::open_service(dir.path());
    let level = service.rebirth("hero").await.expect("rebirth");
    assert_eq!(level, 1);

    let after = service.player("hero").await.expect("player");
    assert!(after.loot.is_empty());

    // Membership unchanged for equipped and backpack gear.
    assert_eq!(after.equipped.len(), 2);
    assert_eq!(after.backpack.len(), 2);

    assert!(after.equipped[&GearSlot::Head].degraded);
    assert!(!after.equipped[&GearSlot::Chest].degraded);
    let idol = after
        .backpack
        .iter()
        .find(|i| i.name == "Ancient Idol")
        .expect("idol kept");
    assert!(idol.degraded);
    let blade = after
        .backpack
        .iter()
        .find(|i| i.name == "Rusty Blade")
        .expect("blade kept");
    assert!(!blade.degraded);
}

#[tokio::test]
async fn repeated_rebirths_stack_degradation() {
    let dir = TempDir::new().expect("tempdir");
    let mut hero = PlayerRecord::new("hero", "Hero");
    hero.equipped
        .insert(GearSlot::Right, Item::new("Dawnblade", Rarity::Legendary, 400));
    common::seed_players(dir.path(), vec![hero]);

    let service = common::open_service(dir.path());
    for expected in 1..=3u32 {
        let level = service.rebirth("hero").await.expect("rebirth");
        assert_eq!(level, expected);
    }

    let after = service.player("hero").await.expect("player");
    assert_eq!(after.equipped[&GearSlot::Right].degradation, 3);
}

#[tokio::test]
async fn loadout_switch_cooldown_scenario() {
    let dir = TempDir::new().expect("tempdir");
    let mut hero = PlayerRecord::new("hero", "Hero");
    hero.equipped
        .insert(GearSlot::Right, Item::new("Rusty Blade", Rarity::Normal, 15));
    hero.backpack
        .push(Item::new("Grim Warhammer", Rarity::Rare, 70));

    let mut sword = std::collections::HashMap::new();
    sword.insert(GearSlot::Right, "Rusty Blade".to_string());
    hero.loadouts.insert("sword".to_string(), sword);
    let mut hammer = std::collections::HashMap::new();
    hammer.insert(GearSlot::Right, "Grim Warhammer".to_string());
    hero.loadouts.insert("hammer".to_string(), hammer);
    common::seed_players(dir.path(), vec![hero]);

    let service = common::open_service(dir.path());
    let t0 = Utc::now();

    // First switch succeeds.
    service
        .switch_loadout("hero", "hammer", t0)
        .await
        .expect("first switch");

    // +30s, distinct valid name: still cooling down.
    let err = service
        .switch_loadout("hero", "sword", t0 + Duration::seconds(30))
        .await
        .expect_err("within window");
    assert!(matches!(err, GameError::CooldownActive { .. }));

    // +61s: allowed again.
    service
        .switch_loadout("hero", "sword", t0 + Duration::seconds(61))
        .await
        .expect("third switch");

    let after = service.player("hero").await.expect("player");
    assert_eq!(after.equipped[&GearSlot::Right].name, "Rusty Blade");
}

#[tokio::test]
async fn unknown_loadout_is_a_typed_error() {
    let dir = TempDir::new().expect("tempdir");
    common::seed_players(dir.path(), vec![PlayerRecord::new("hero", "Hero")]);
    let service = common::open_service(dir.path());

    let err = service
        .switch_loadout("hero", "nonexistent", Utc::now())
        .await
        .expect_err("unknown preset");
    assert!(matches!(err, GameError::LoadoutNotFound(_)));
}

#[tokio::test]
async fn class_bonus_composes_additively_through_service() {
    let dir = TempDir::new().expect("tempdir");
    let mut bard = PlayerRecord::new("bard", "Bard");
    bard.hero_class = Some(HeroClass::Bard);
    bard.stats.charisma = 400; // 400 * 0.25 = 100% class bonus
    common::seed_players(dir.path(), vec![bard]);

    let service = common::open_service(dir.path());
    let gained = service
        .grant_experience("bard", 100, 50.0, 50.0)
        .await
        .expect("grant");

    // 50 + 50 + 100 = 200% combined => base * 3, applied once.
    assert_eq!(gained, 300);
    let after = service.player("bard").await.expect("player");
    assert_eq!(after.experience, 300);
}
