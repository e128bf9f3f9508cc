//! Deterministic entropy sources for driving selection in tests.

use slush_api::{DynEntropy, Entropy};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// An [Entropy] source that replays a scripted list of draws.
///
/// Draws are handed out in script order and reduced modulo `max`, so a
/// script written against a known slot layout always stays in range.
/// When the script runs out it wraps around to the beginning, which lets
/// a one-entry script pin every draw to a single offset.
#[derive(Debug)]
pub struct ScriptedEntropy {
    script: Vec<u64>,
    cursor: AtomicUsize,
}

impl ScriptedEntropy {
    /// Construct a scripted entropy source. Panics on an empty script.
    pub fn new(script: impl Into<Vec<u64>>) -> DynEntropy {
        let script = script.into();
        assert!(!script.is_empty(), "empty entropy script");
        Arc::new(Self {
            script,
            cursor: AtomicUsize::new(0),
        })
    }
}

impl Entropy for ScriptedEntropy {
    fn draw(&self, max: u64) -> u64 {
        let at = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.script[at % self.script.len()] % max
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn draws_replay_in_order_and_wrap() {
        let entropy = ScriptedEntropy::new([3, 5, 7]);
        assert_eq!(3, entropy.draw(100));
        assert_eq!(5, entropy.draw(100));
        assert_eq!(7, entropy.draw(100));
        assert_eq!(3, entropy.draw(100));
    }

    #[test]
    fn draws_are_reduced_into_range() {
        let entropy = ScriptedEntropy::new([12]);
        assert_eq!(2, entropy.draw(10));
    }
}
