//! # Storage Module - Data Persistence Layer
//!
//! Sled-backed persistence for player records and world state. The store
//! is the durability boundary for the simulation core: engines mutate
//! in-memory records and the service layer writes them back here, one
//! atomic put per player.
//!
//! Layout:
//!
//! ```text
//! <data_dir>/
//! └── sled trees:
//!     questforge          ← player records, keyed "players:<id>"
//!     questforge_world    ← world-scoped state, keyed "world:cart"
//! ```
//!
//! Records carry a schema version that is checked on every read; a
//! mismatch surfaces as a typed error instead of a mangled record.

use std::path::{Path, PathBuf};

use sled::IVec;

use crate::game::errors::GameError;
use crate::game::types::{CartRecord, PlayerRecord, CART_SCHEMA_VERSION, PLAYER_SCHEMA_VERSION};

const TREE_PRIMARY: &str = "questforge";
const TREE_WORLD: &str = "questforge_world";

const CART_KEY: &[u8] = b"world:cart";

/// Helper builder so tests can easily create throwaway stores with custom
/// paths.
pub struct GameStoreBuilder {
    path: PathBuf,
}

impl GameStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open(self) -> Result<GameStore, GameError> {
        GameStore::open(self.path)
    }
}

/// Sled-backed persistence for player and world state.
#[derive(Debug)]
pub struct GameStore {
    _db: sled::Db,
    primary: sled::Tree,
    world: sled::Tree,
}

impl GameStore {
    /// Open (or create) the store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GameError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let primary = db.open_tree(TREE_PRIMARY)?;
        let world = db.open_tree(TREE_WORLD)?;
        Ok(Self {
            _db: db,
            primary,
            world,
        })
    }

    fn player_key(id: &str) -> Vec<u8> {
        format!("players:{}", id.to_ascii_lowercase()).into_bytes()
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, GameError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, GameError> {
        Ok(bincode::deserialize::<T>(&bytes)?)
    }

    /// Insert or update a player record.
    pub fn put_player(&self, mut player: PlayerRecord) -> Result<(), GameError> {
        player.schema_version = PLAYER_SCHEMA_VERSION;
        let key = Self::player_key(&player.id);
        let bytes = Self::serialize(&player)?;
        self.primary.insert(key, bytes)?;
        self.primary.flush()?;
        Ok(())
    }

    /// Fetch a player record by id.
    pub fn get_player(&self, id: &str) -> Result<PlayerRecord, GameError> {
        let key = Self::player_key(id);
        let Some(bytes) = self.primary.get(&key)? else {
            return Err(GameError::NotFound(format!("player: {id}")));
        };
        let record: PlayerRecord = Self::deserialize(bytes)?;
        if record.schema_version != PLAYER_SCHEMA_VERSION {
            return Err(GameError::SchemaMismatch {
                entity: "player",
                expected: PLAYER_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    /// Fetch a player, creating a fresh record on first interaction.
    pub fn get_or_create_player(&self, id: &str) -> Result<PlayerRecord, GameError> {
        match self.get_player(id) {
            Ok(player) => Ok(player),
            Err(GameError::NotFound(_)) => {
                let player = PlayerRecord::new(id, id);
                self.put_player(player.clone())?;
                Ok(player)
            }
            Err(e) => Err(e),
        }
    }

    /// List all player ids currently stored.
    pub fn list_player_ids(&self) -> Result<Vec<String>, GameError> {
        let mut ids = Vec::new();
        for entry in self.primary.scan_prefix(b"players:") {
            let (key, _) = entry?;
            let text = String::from_utf8_lossy(&key);
            if let Some(id) = text.strip_prefix("players:") {
                ids.push(id.to_string());
            }
        }
        Ok(ids)
    }

    /// Replace the world cart wholesale.
    pub fn put_cart(&self, mut cart: CartRecord) -> Result<(), GameError> {
        cart.schema_version = CART_SCHEMA_VERSION;
        let bytes = Self::serialize(&cart)?;
        self.world.insert(CART_KEY, bytes)?;
        self.world.flush()?;
        Ok(())
    }

    /// Fetch the current cart, if one has ever been stocked.
    pub fn get_cart(&self) -> Result<Option<CartRecord>, GameError> {
        let Some(bytes) = self.world.get(CART_KEY)? else {
            return Ok(None);
        };
        let record: CartRecord = Self::deserialize(bytes)?;
        if record.schema_version != CART_SCHEMA_VERSION {
            return Err(GameError::SchemaMismatch {
                entity: "cart",
                expected: CART_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(Some(record))
    }
}
