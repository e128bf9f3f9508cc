//! Peer-selector related types.

use crate::*;
use std::sync::Arc;

/// The number of times one selection re-draws after landing on a
/// tombstone or a gap before reporting [NO_PEER].
///
/// With a fraction `f` of the number line reclaimable, a whole selection
/// comes back empty with probability `f` raised to this constant. Hosts
/// that keep `f` low by compacting (see
/// [PeerSelector::should_compact]) will effectively never observe an
/// empty selection on a populated selector.
pub const SELECT_PEER_MAX_RETRY: u32 = 3;

/// Represents the ability to pick a voting peer at random, weighted by
/// score.
///
/// The probability of picking peer `p` is `score(p) / Σ score` across all
/// registered peers. The structure itself is single-writer:
/// implementations serialize calls internally, and no operation suspends,
/// blocks, or performs I/O.
pub trait PeerSelector: 'static + Send + Sync + std::fmt::Debug {
    /// Register a peer under a strictly positive score.
    ///
    /// The peer is eligible for selection as soon as this returns. Fails
    /// with [SlushError::DuplicatePeer] when the id is already registered,
    /// [SlushError::InvalidScore] on a zero score, and
    /// [SlushError::Overflow] when the number line is exhausted. The
    /// selector is unchanged on any failure.
    fn add_peer(&self, peer: PeerId, score: u32) -> SlushResult<PeerId>;

    /// Withdraw a peer from selection.
    ///
    /// Returns false when the peer is unknown.
    fn remove_peer(&self, peer: PeerId) -> bool;

    /// Replace the score of a registered peer.
    ///
    /// Returns false, leaving the selector unchanged, when the peer is
    /// unknown, the score is zero, or the number line cannot hold the
    /// relocated interval.
    fn rescore_peer(&self, peer: PeerId, score: u32) -> bool;

    /// Pick a peer with probability proportional to its score.
    ///
    /// Returns [NO_PEER] when no peer is registered, or when every attempt
    /// within [SELECT_PEER_MAX_RETRY] landed on reclaimable space. The
    /// caller should treat that as "no peer available right now" and try
    /// again later, compacting first if advised.
    fn select_peer(&self) -> PeerId;

    /// Rebuild the slot layout, dropping tombstones and closing gaps.
    ///
    /// Returns the number of number-line units reclaimed.
    fn compact(&self) -> u64;

    /// True when reclaimable space has reached the configured share of
    /// the number line and a [PeerSelector::compact] is worthwhile.
    fn should_compact(&self) -> bool;

    /// Snapshot occupancy counters for host reporting.
    fn report(&self) -> SelectorReport;

    /// Walk every structural invariant and report whether all hold.
    ///
    /// Intended for tests and debug assertions, not for the hot path.
    fn verify(&self) -> bool;
}

/// Trait-object [PeerSelector].
pub type DynPeerSelector = Arc<dyn PeerSelector>;

/// A factory for constructing [PeerSelector] instances.
pub trait PeerSelectorFactory: 'static + Send + Sync + std::fmt::Debug {
    /// Register this module's default configuration on a builder's
    /// [Config].
    fn default_config(&self, config: &mut Config) -> SlushResult<()>;

    /// Check a configuration for values this factory cannot honor.
    fn validate_config(&self, config: &Config) -> SlushResult<()>;

    /// Build a selector instance from the frozen builder.
    fn create(&self, builder: Arc<Builder>) -> SlushResult<DynPeerSelector>;
}

/// Trait-object [PeerSelectorFactory].
pub type DynPeerSelectorFactory = Arc<dyn PeerSelectorFactory>;
