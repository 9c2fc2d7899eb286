//! Bounded-randomness helpers shared by the engines.
//!
//! Everything here is generic over [`rand::Rng`] so tests can substitute a
//! seeded `StdRng` and get deterministic outcomes. Monetary values are
//! rounded exactly once, through [`finalize_price`], at the point a price
//! is surfaced or persisted; intermediate arithmetic stays in `f64`.

use rand::Rng;

use crate::config::RarityWeights;
use crate::game::types::Rarity;

/// Uniform integer draw over an inclusive range.
pub fn uniform_int<R: Rng + ?Sized>(rng: &mut R, min: i64, max: i64) -> i64 {
    debug_assert!(min <= max);
    rng.gen_range(min..=max)
}

/// Sample a rarity tier from the configured weight table.
///
/// The table is validated at startup to sum to 100, so the cursor walk
/// always lands on a tier; the final arm absorbs floating point dust.
pub fn weighted_tier<R: Rng + ?Sized>(rng: &mut R, weights: &RarityWeights) -> Rarity {
    let mut roll = rng.gen_range(0.0..weights.sum());
    for rarity in Rarity::ALL {
        let w = weights.weight_for(rarity);
        if roll < w {
            return rarity;
        }
        roll -= w;
    }
    Rarity::Set
}

/// Uniform draw over `[min, max]` that rejects and resamples while the
/// value falls within the bottom `trim_low` or top `trim_high` fraction
/// of the range.
///
/// Rejection (rather than range narrowing) keeps the acceptance region's
/// density uniform and makes the trim semantics explicit: trimmed
/// outcomes are eliminated, not merely rare.
pub fn trimmed_uniform<R: Rng + ?Sized>(
    rng: &mut R,
    min: f64,
    max: f64,
    trim_low: f64,
    trim_high: f64,
) -> f64 {
    debug_assert!(min < max);
    debug_assert!(trim_low + trim_high < 1.0);
    let span = max - min;
    let floor = min + span * trim_low;
    let ceiling = max - span * trim_high;
    loop {
        let sample = rng.gen_range(min..=max);
        if sample >= floor && sample <= ceiling {
            return sample;
        }
    }
}

/// Round a computed monetary amount to the integer that gets surfaced or
/// persisted. This is the single rounding point for prices and payouts.
pub fn finalize_price(raw: f64) -> i64 {
    raw.round() as i64
}
