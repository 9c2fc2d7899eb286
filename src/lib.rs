//! # Questforge - RPG progression and economy core
//!
//! Questforge is the simulation core of a persistent multiplayer
//! text-based RPG: it owns character advancement, the item economy, and
//! inter-player transfers, while the surrounding chat bot handles
//! command parsing, rendering, and transport.
//!
//! ## Features
//!
//! - **Rotating cart shop**: 10-12 rarity-weighted listings regenerated
//!   wholesale on a schedule, priced at a configurable markup, with the
//!   rendered listing held to a hard message-size budget.
//! - **Progression**: additive experience bonus composition with a
//!   configurable ceiling, and a rebirth transition that preserves
//!   equipped and backpack gear while degrading top-tier items.
//! - **Gambling**: the negaverse wager draws its multiplier from a
//!   trimmed distribution so low-end outcomes are eliminated outright.
//! - **Transfers**: atomic trades (no rebirth-gap restriction) and
//!   cooldown-gated bank transfers.
//! - **Class subsystems**: Ranger foraging and two-phase pet capture,
//!   Bard reward scaling driven by Charisma alone.
//! - **Concurrency**: per-player lock serialization with bounded waits,
//!   ordered dual-lock acquisition for cross-player operations.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use questforge::config::Config;
//! use questforge::game::GameService;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let service = GameService::new(config)?;
//!
//!     let cart = service.current_cart(chrono::Utc::now()).await?;
//!     println!("{}", cart.render());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`game`] - Engines (economy, progression, transfers, classes), the
//!   data model, and the [`game::GameService`] entry point
//! - [`storage`] - Sled-backed persistence for players and world state
//! - [`config`] - World constants with fail-fast validation
//!
//! Engines are pure: they take player state, world constants, and an RNG
//! stream, and return new state plus a typed outcome. Substituting a
//! seeded RNG makes every outcome deterministic under test.

pub mod config;
pub mod game;
pub mod storage;
