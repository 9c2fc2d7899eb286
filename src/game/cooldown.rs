//! Per-player cooldown ledger.
//!
//! Entries map an action kind to its expiry timestamp. An action is
//! permitted when no entry exists or the entry has expired; a successful
//! consume overwrites the entry with `now + duration`. Expired entries
//! are never cleaned up explicitly, they just stop mattering.
//!
//! Callers hold the player's exclusive lock across check-and-set, so two
//! concurrent requests cannot both pass the same gate.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::game::errors::GameError;
use crate::game::types::ActionKind;

pub type CooldownMap = HashMap<ActionKind, DateTime<Utc>>;

/// Time left on a cooldown, or `None` when the action is permitted.
pub fn remaining(
    cooldowns: &CooldownMap,
    kind: ActionKind,
    now: DateTime<Utc>,
) -> Option<Duration> {
    let expiry = cooldowns.get(&kind)?;
    if now >= *expiry {
        None
    } else {
        Some(*expiry - now)
    }
}

/// Gate check without consuming. Use when later validation may still fail
/// and the cooldown must not be spent on a failed action.
pub fn check(cooldowns: &CooldownMap, kind: ActionKind, now: DateTime<Utc>) -> Result<(), GameError> {
    match remaining(cooldowns, kind, now) {
        Some(left) => Err(GameError::cooldown(left)),
        None => Ok(()),
    }
}

/// Check-and-set: reject with the remaining duration if the cooldown is
/// active, otherwise stamp a new expiry. A zero duration never gates and
/// writes nothing.
pub fn try_consume(
    cooldowns: &mut CooldownMap,
    kind: ActionKind,
    now: DateTime<Utc>,
    duration: Duration,
) -> Result<(), GameError> {
    check(cooldowns, kind, now)?;
    if duration > Duration::zero() {
        cooldowns.insert(kind, now + duration);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_use_is_allowed_and_sets_expiry() {
        let mut map = CooldownMap::new();
        let now = Utc::now();
        try_consume(&mut map, ActionKind::BankTransfer, now, Duration::seconds(30))
            .expect("first use allowed");
        assert_eq!(map[&ActionKind::BankTransfer], now + Duration::seconds(30));
    }

    #[test]
    fn second_use_within_window_is_rejected() {
        let mut map = CooldownMap::new();
        let now = Utc::now();
        try_consume(&mut map, ActionKind::LoadoutSwitch, now, Duration::seconds(60)).unwrap();

        let err = try_consume(
            &mut map,
            ActionKind::LoadoutSwitch,
            now + Duration::seconds(30),
            Duration::seconds(60),
        )
        .expect_err("still cooling down");
        match err {
            GameError::CooldownActive { remaining_secs } => assert_eq!(remaining_secs, 30),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn use_after_expiry_is_allowed() {
        let mut map = CooldownMap::new();
        let now = Utc::now();
        try_consume(&mut map, ActionKind::Forage, now, Duration::minutes(30)).unwrap();
        try_consume(
            &mut map,
            ActionKind::Forage,
            now + Duration::minutes(30),
            Duration::minutes(30),
        )
        .expect("expired entry is absent");
    }

    #[test]
    fn zero_duration_never_gates() {
        let mut map = CooldownMap::new();
        let now = Utc::now();
        for _ in 0..3 {
            try_consume(&mut map, ActionKind::Forage, now, Duration::zero()).unwrap();
        }
        assert!(map.is_empty());
    }

    #[test]
    fn kinds_are_independent() {
        let mut map = CooldownMap::new();
        let now = Utc::now();
        try_consume(&mut map, ActionKind::BankTransfer, now, Duration::seconds(30)).unwrap();
        try_consume(&mut map, ActionKind::LoadoutSwitch, now, Duration::seconds(60))
            .expect("different action unaffected");
    }
}
