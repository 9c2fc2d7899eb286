//! Configuration loading and fail-fast validation at service startup.

mod common;

use questforge::config::Config;
use questforge::game::{GameError, GameService};
use tempfile::TempDir;

#[tokio::test]
async fn default_file_round_trips_through_load() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("config.toml");

    Config::create_default(&path).await.expect("write defaults");
    let config = Config::load(&path).await.expect("load");
    assert_eq!(config.economy.cart_min_items, 10);
    assert_eq!(config.cooldowns.loadout_switch_secs, 60);
}

#[tokio::test]
async fn bad_weight_sum_fails_at_load() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("config.toml");

    let mut config = Config::default();
    config.rarity_weights.set = 10.0;
    let rendered = toml::to_string_pretty(&config).expect("render");
    tokio::fs::write(&path, rendered).await.expect("write");

    let err = Config::load(&path).await.expect_err("weights off by ten");
    assert!(err.to_string().contains("validation"));
}

#[tokio::test]
async fn missing_file_is_an_error_not_a_default() {
    let dir = TempDir::new().expect("tempdir");
    let err = Config::load(dir.path().join("absent.toml"))
        .await
        .expect_err("no file");
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn invalid_config_is_fatal_at_service_construction() {
    let dir = TempDir::new().expect("tempdir");
    let mut config = Config::default();
    config.economy.nega_trim_low = 1.5;

    let err = GameService::open_at(config, dir.path()).expect_err("must refuse to start");
    assert!(matches!(err, GameError::InvalidConfiguration(_)));
}

#[tokio::test]
async fn partial_file_fills_missing_sections_with_defaults() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("config.toml");
    tokio::fs::write(&path, "[cooldowns]\nloadout_switch_secs = 90\nbank_transfer_secs = 30\nforage_secs = 1800\n")
        .await
        .expect("write");

    let config = Config::load(&path).await.expect("load");
    assert_eq!(config.cooldowns.loadout_switch_secs, 90);
    assert_eq!(config.economy.cart_max_items, 12);
    assert!((config.rarity_weights.sum() - 100.0).abs() < 1e-6);
}
