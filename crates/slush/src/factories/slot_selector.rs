//! A production-ready slot-based weighted random peer selector.

use slush_api::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// SlotSelector configuration types.
mod config {
    /// Configuration parameters for [SlotSelectorFactory](super::SlotSelectorFactory).
    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    #[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
    #[serde(rename_all = "camelCase")]
    pub struct SlotSelectorConfig {
        /// The percentage of the slot number line lost to tombstones and
        /// gaps at which `should_compact` starts advising a rebuild.
        ///
        /// Selection re-draws after landing on reclaimable space, so with
        /// a fraction `f` of the line reclaimable a whole selection comes
        /// back empty with probability `f^3`. At the default threshold
        /// that is below one percent.
        ///
        /// Default: 20.
        #[cfg_attr(feature = "schema", schemars(default))]
        pub compact_fragmentation_pct: u32,
    }

    impl Default for SlotSelectorConfig {
        fn default() -> Self {
            Self {
                compact_fragmentation_pct: 20,
            }
        }
    }
}

pub use config::*;

impl ModConfig for SlotSelectorConfig {}

/// The module name under which [SlotSelectorConfig] is keyed in a
/// [Config].
pub const MOD_NAME: &str = "slotSelector";

/// Window size at which interpolation probing stops paying for itself
/// and the search falls back to a linear scan.
const LINEAR_SEARCH_THRESHOLD: usize = 8;

/// A production-ready weighted random peer selector factory.
///
/// Every peer owns a score-sized half-open interval, and the intervals
/// are packed onto a single u64 number line. Selection draws one uniform
/// offset and resolves it back to the owning interval, so the per-peer
/// probability is exactly `score / slot_count`.
///
/// Removal never shifts intervals (shifting would stale every positional
/// index entry to the right of it). Interior intervals are tombstoned in
/// place instead, and an explicit [PeerSelector::compact] repacks the
/// line once enough of it has died.
#[derive(Debug)]
pub struct SlotSelectorFactory {}

impl SlotSelectorFactory {
    /// Construct a new SlotSelectorFactory.
    pub fn create() -> DynPeerSelectorFactory {
        let out: DynPeerSelectorFactory = Arc::new(Self {});
        out
    }
}

impl PeerSelectorFactory for SlotSelectorFactory {
    fn default_config(&self, config: &mut Config) -> SlushResult<()> {
        config.add_default_module_config::<SlotSelectorConfig>(
            MOD_NAME.to_string(),
        )
    }

    fn validate_config(&self, config: &Config) -> SlushResult<()> {
        let config: SlotSelectorConfig = config.get_module_config(MOD_NAME)?;
        if config.compact_fragmentation_pct > 100 {
            return Err(SlushError::other(format!(
                "compactFragmentationPct is a percentage, got {}",
                config.compact_fragmentation_pct,
            )));
        }
        Ok(())
    }

    fn create(&self, builder: Arc<Builder>) -> SlushResult<DynPeerSelector> {
        let config: SlotSelectorConfig =
            builder.config.get_module_config(MOD_NAME)?;
        let out: DynPeerSelector =
            Arc::new(SlotSelector::new(config, builder.entropy.clone()));
        Ok(out)
    }
}

struct SlotSelector {
    inner: Mutex<Inner>,
    entropy: DynEntropy,
}

impl std::fmt::Debug for SlotSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotSelector").finish()
    }
}

impl SlotSelector {
    pub fn new(config: SlotSelectorConfig, entropy: DynEntropy) -> Self {
        Self {
            inner: Mutex::new(Inner::new(config)),
            entropy,
        }
    }
}

impl PeerSelector for SlotSelector {
    fn add_peer(&self, peer: PeerId, score: u32) -> SlushResult<PeerId> {
        self.inner.lock().unwrap().add_peer(peer, score)
    }

    fn remove_peer(&self, peer: PeerId) -> bool {
        self.inner.lock().unwrap().remove_peer(peer)
    }

    fn rescore_peer(&self, peer: PeerId, score: u32) -> bool {
        self.inner.lock().unwrap().rescore_peer(peer, score)
    }

    fn select_peer(&self) -> PeerId {
        self.inner.lock().unwrap().select_peer(&self.entropy)
    }

    fn compact(&self) -> u64 {
        self.inner.lock().unwrap().compact()
    }

    fn should_compact(&self) -> bool {
        self.inner.lock().unwrap().should_compact()
    }

    fn report(&self) -> SelectorReport {
        self.inner.lock().unwrap().report()
    }

    fn verify(&self) -> bool {
        self.inner.lock().unwrap().verify()
    }
}

/// One interval `[start, start + score)` on the selection number line.
///
/// A slot either belongs to a live peer or is a tombstone that keeps its
/// arithmetic footprint until the next compaction. Tombstones are encoded
/// through the [NO_PEER] peer field with `start` and `score` untouched,
/// so the layout the search walks stays monotone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    start: u64,
    score: u32,
    peer: PeerId,
}

impl Slot {
    fn new(start: u64, score: u32, peer: PeerId) -> Self {
        Self { start, score, peer }
    }

    /// Exclusive upper bound of the interval.
    fn stop(&self) -> u64 {
        self.start + self.score as u64
    }

    fn is_dead(&self) -> bool {
        self.peer == NO_PEER
    }

    /// `start <= offset < stop`.
    fn contains(&self, offset: u64) -> bool {
        self.start <= offset && offset < self.stop()
    }

    /// The whole interval lies at or below `offset`.
    fn precedes(&self, offset: u64) -> bool {
        self.stop() <= offset
    }

    /// The whole interval lies above `offset`.
    fn follows(&self, offset: u64) -> bool {
        offset < self.start
    }

    fn with_start(self, start: u64) -> Self {
        Self { start, ..self }
    }

    fn with_score(self, score: u32) -> Self {
        Self { score, ..self }
    }

    fn with_peer(self, peer: PeerId) -> Self {
        Self { peer, ..self }
    }
}

struct Inner {
    config: SlotSelectorConfig,
    slots: Vec<Slot>,
    peer_indices: HashMap<PeerId, usize>,
    slot_count: u64,
    fragmentation: u64,
}

impl Inner {
    pub fn new(config: SlotSelectorConfig) -> Self {
        Self {
            config,
            slots: Vec::new(),
            peer_indices: HashMap::new(),
            slot_count: 0,
            fragmentation: 0,
        }
    }

    pub fn add_peer(
        &mut self,
        peer: PeerId,
        score: u32,
    ) -> SlushResult<PeerId> {
        debug_assert_ne!(peer, NO_PEER);

        if score == 0 {
            return Err(SlushError::InvalidScore);
        }
        if self.peer_indices.contains_key(&peer) {
            return Err(SlushError::DuplicatePeer(peer));
        }

        let start = self.slot_count;
        let stop = start
            .checked_add(score as u64)
            .ok_or(SlushError::Overflow)?;

        self.peer_indices.insert(peer, self.slots.len());
        self.slots.push(Slot::new(start, score, peer));
        self.slot_count = stop;

        Ok(peer)
    }

    pub fn remove_peer(&mut self, peer: PeerId) -> bool {
        let i = match self.peer_indices.get(&peer) {
            Some(i) => *i,
            None => return false,
        };
        debug_assert!(i < self.slots.len());

        if i + 1 == self.slots.len() {
            // The tail interval can simply be dropped.
            self.slots.pop();
            self.slot_count = self.slots.last().map_or(0, |s| s.stop());
        } else {
            // An interior interval must keep its position, so it turns
            // into a tombstone.
            self.fragmentation += self.slots[i].score as u64;
            self.slots[i] = self.slots[i].with_peer(NO_PEER);
        }

        self.peer_indices.remove(&peer);
        true
    }

    pub fn rescore_peer(&mut self, peer: PeerId, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        let i = match self.peer_indices.get(&peer) {
            Some(i) => *i,
            None => return false,
        };
        debug_assert!(i < self.slots.len());

        let slot = self.slots[i];

        // The tail interval can grow or shrink freely.
        if i + 1 == self.slots.len() {
            let stop = match slot.start.checked_add(score as u64) {
                Some(stop) => stop,
                None => return false,
            };
            self.slots[i] = slot.with_score(score);
            self.slot_count = stop;
            return true;
        }

        // An interior interval can be resized in place while it still
        // ends at or before the next interval's start.
        if let Some(stop) = slot.start.checked_add(score as u64) {
            if stop <= self.slots[i + 1].start {
                let old_stop = slot.stop();
                if stop <= old_stop {
                    self.fragmentation += old_stop - stop;
                } else {
                    // Growing consumes gap space a previous shrink
                    // already counted.
                    self.fragmentation -= stop - old_stop;
                }
                self.slots[i] = slot.with_score(score);
                return true;
            }
        }

        // No room where it is. Tombstone the interval in place and
        // relocate the peer to a fresh one at the tail.
        let start = self.slot_count;
        let stop = match start.checked_add(score as u64) {
            Some(stop) => stop,
            None => return false,
        };
        self.fragmentation += slot.score as u64;
        self.slots[i] = slot.with_peer(NO_PEER);
        self.peer_indices.insert(peer, self.slots.len());
        self.slots.push(Slot::new(start, score, peer));
        self.slot_count = stop;

        true
    }

    pub fn select_peer(&self, entropy: &DynEntropy) -> PeerId {
        if self.slots.is_empty() || self.slot_count == 0 {
            return NO_PEER;
        }

        for _ in 0..SELECT_PEER_MAX_RETRY {
            let offset = entropy.draw(self.slot_count);
            let peer = locate(&self.slots, offset, self.slot_count);
            if peer != NO_PEER {
                return peer;
            }
        }

        tracing::warn!(
            fragmentation = self.fragmentation,
            slot_count = self.slot_count,
            "Peer selection exhausted its retries on reclaimable space"
        );
        NO_PEER
    }

    pub fn compact(&mut self) -> u64 {
        // The relocation below fills holes from the tail, so the tail
        // must always be live.
        trim_dead_tail(&mut self.slots);

        let mut prev_stop = 0;
        let mut i = 0;
        while i < self.slots.len() {
            if !self.slots[i].is_dead() {
                // Live interval, slide it down against its predecessor.
                self.slots[i] = self.slots[i].with_start(prev_stop);
                prev_stop = self.slots[i].stop();
                i += 1;
                continue;
            }

            // Dead interval, move the tail interval into its place.
            let moved =
                self.slots[self.slots.len() - 1].with_start(prev_stop);
            debug_assert!(!moved.is_dead());
            self.slots[i] = moved;
            prev_stop = moved.stop();
            self.peer_indices.insert(moved.peer, i);

            self.slots.pop();
            trim_dead_tail(&mut self.slots);
            i += 1;
        }

        let saved = self.slot_count - prev_stop;
        self.slot_count = prev_stop;
        self.fragmentation = 0;

        tracing::debug!(
            saved,
            slot_count = self.slot_count,
            "Compacted slot layout"
        );
        saved
    }

    pub fn should_compact(&self) -> bool {
        if self.slot_count == 0 {
            return false;
        }
        self.fragmentation as u128 * 100
            >= self.slot_count as u128
                * self.config.compact_fragmentation_pct as u128
    }

    pub fn report(&self) -> SelectorReport {
        SelectorReport {
            peers: self.peer_indices.len(),
            slots: self.slots.len(),
            slot_count: self.slot_count,
            fragmentation: self.fragmentation,
        }
    }

    pub fn verify(&self) -> bool {
        let mut prev_stop = 0;
        let mut live_total: u64 = 0;
        for (i, slot) in self.slots.iter().enumerate() {
            // Intervals must be laid out in order, without overlap, and
            // packed against zero at the front.
            if slot.start < prev_stop {
                return false;
            }
            if i == 0 && slot.start != 0 {
                return false;
            }
            prev_stop = slot.stop();

            // Nothing more to check on a tombstone.
            if slot.is_dead() {
                continue;
            }
            live_total += slot.score as u64;

            // A live interval must be indexed at its own position.
            match self.peer_indices.get(&slot.peer) {
                Some(at) if *at == i => {}
                _ => return false,
            }
        }

        // The number line ends exactly at the last interval.
        if self.slot_count != prev_stop {
            return false;
        }

        // Every index entry must point back at an interval owned by its
        // peer.
        for (peer, i) in self.peer_indices.iter() {
            match self.slots.get(*i) {
                Some(slot) if slot.peer == *peer => {}
                _ => return false,
            }
        }

        // The accumulator may overcount space that tail pops discarded,
        // but it can never undercount what is currently reclaimable.
        match self.slot_count.checked_sub(live_total) {
            Some(reclaimable) => reclaimable <= self.fragmentation,
            None => false,
        }
    }
}

fn trim_dead_tail(slots: &mut Vec<Slot>) {
    while slots.last().is_some_and(Slot::is_dead) {
        slots.pop();
    }
}

/// Resolve one uniform draw on `[0, max)` to the peer whose interval
/// contains it.
///
/// Interpolation over the index window converges fast on a dense layout.
/// A draw that falls outside the window's arithmetic range or between two
/// intervals is not an answer: the draw hit a gap, and the caller is
/// expected to re-draw. Windows of at most [LINEAR_SEARCH_THRESHOLD]
/// entries are scanned linearly.
fn locate(slots: &[Slot], offset: u64, max: u64) -> PeerId {
    debug_assert!(offset < max);

    let mut begin = 0;
    let mut end = slots.len();
    let mut bottom = 0;
    let mut top = max;

    while end - begin > LINEAR_SEARCH_THRESHOLD {
        // The draw fell in a gap at the edge of the window.
        if offset < bottom || offset >= top {
            return NO_PEER;
        }

        // Guess the position from the arithmetic proportions. Widening
        // to u128 keeps the product from wrapping on large lines.
        let i = begin
            + ((offset - bottom) as u128 * (end - begin) as u128
                / (top - bottom) as u128) as usize;
        debug_assert!(begin <= i && i < end);

        let slot = &slots[i];
        if slot.contains(offset) {
            return slot.peer;
        }

        if slot.precedes(offset) {
            // Undershot.
            begin = i + 1;
            if begin >= end {
                return NO_PEER;
            }
            bottom = slots[begin].start;
        } else {
            // Overshot.
            debug_assert!(slot.follows(offset));
            end = i;
            top = slots[end].start;
        }
    }

    for slot in &slots[begin..end] {
        if slot.contains(offset) {
            return slot.peer;
        }
    }

    // The draw landed between intervals.
    NO_PEER
}
