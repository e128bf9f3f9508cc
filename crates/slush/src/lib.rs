#![deny(missing_docs)]
//! An avalanche-style weighted random peer selector.
//!
//! Voting rounds continuously ask "pick a peer", and the answer must be
//! distributed proportionally to peer score while peers join, leave, and
//! are rescored underneath. The production module is
//! [factories::SlotSelectorFactory]; wire it up through
//! [default_builder].

use slush_api::*;

/// A default [Entropy] source backed by [rand::thread_rng].
///
/// The thread rng is a CSPRNG. Selection fairness and unpredictability
/// rest on this source, so only replace it with one of equal strength.
#[derive(Debug)]
pub struct ThreadRngEntropy;

impl Entropy for ThreadRngEntropy {
    fn draw(&self, max: u64) -> u64 {
        use rand::Rng;
        rand::thread_rng().gen_range(0..max)
    }
}

/// Construct a production-ready default builder.
///
/// - `entropy` - The default entropy source is [ThreadRngEntropy].
/// - `peer_selector` - The default peer selector is
///   [factories::SlotSelectorFactory].
pub fn default_builder() -> Builder {
    Builder {
        config: Config::default(),
        entropy: std::sync::Arc::new(ThreadRngEntropy),
        peer_selector: factories::SlotSelectorFactory::create(),
    }
}

pub mod factories;
