//! Randomness source types.

use std::sync::Arc;

/// Represents the ability to draw uniform random offsets on the slot
/// number line.
///
/// Selection consumes one draw per attempt, and the fairness of the whole
/// selector reduces to the uniformity and unpredictability of this source.
/// Production implementations must be cryptographically strong so a voting
/// counterparty cannot anticipate which peers will be polled. Tests inject
/// deterministic sources to script selection outcomes.
pub trait Entropy: 'static + Send + Sync + std::fmt::Debug {
    /// Draw a uniformly distributed value in `[0, max)`.
    ///
    /// `max` is always greater than zero.
    fn draw(&self, max: u64) -> u64;
}

/// Trait-object [Entropy].
pub type DynEntropy = Arc<dyn Entropy>;
