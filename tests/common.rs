//! Shared helpers for integration tests: seed a sled store with players,
//! then open a service over the same path.
#![allow(dead_code)]

use std::path::Path;

use questforge::config::Config;
use questforge::game::{GameService, PlayerRecord};
use questforge::storage::GameStoreBuilder;

/// Write player records into a fresh store at `path`, then release the
/// sled lock so a service can open the same directory.
pub fn seed_players(path: &Path, players: Vec<PlayerRecord>) {
    let store = GameStoreBuilder::new(path).open().expect("seed store");
    for player in players {
        store.put_player(player).expect("seed player");
    }
}

pub fn open_service(path: &Path) -> GameService {
    GameService::open_at(Config::default(), path).expect("service")
}

pub fn open_service_with(config: Config, path: &Path) -> GameService {
    GameService::open_at(config, path).expect("service")
}
