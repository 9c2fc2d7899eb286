use thiserror::Error;

/// Errors surfaced by the game engines and the storage layer.
///
/// Every player-facing failure is a typed variant; engines never report
/// failure through silent no-ops or partially applied state.
#[derive(Debug, Error)]
pub enum GameError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Store(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Encoding(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when fetching a record that is not present.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Returned when deserializing a record with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },

    /// Balance too low for a purchase, wager, or transfer.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// The action's cooldown has not elapsed yet.
    #[error("cooldown active: {remaining_secs}s remaining")]
    CooldownActive { remaining_secs: i64 },

    /// A trade or sale named an item the claimed owner does not hold.
    #[error("item not owned: {0}")]
    ItemNotOwned(String),

    /// A generated listing name would break the cart's message budget.
    /// Surfaced at listing-generation time only, never at purchase time.
    #[error("item name too long: {0}")]
    ItemNameTooLong(String),

    /// Loadout switch named an unknown preset.
    #[error("loadout not found: {0}")]
    LoadoutNotFound(String),

    /// Configuration failed validation. Fatal at startup, never deferred.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Per-player lock could not be acquired in time. The caller should
    /// retry the whole action; nothing was applied.
    #[error("concurrent modification, retry the action")]
    ConcurrentModification,
}

impl GameError {
    /// Helper for gating code: wrap a remaining duration.
    pub fn cooldown(remaining: chrono::Duration) -> Self {
        GameError::CooldownActive {
            remaining_secs: remaining.num_seconds().max(1),
        }
    }
}
