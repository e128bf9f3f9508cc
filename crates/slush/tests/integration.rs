use slush::default_builder;
use slush_api::*;

fn build_selector() -> DynPeerSelector {
    slush_test_utils::enable_tracing();

    let mut builder = default_builder();
    builder.set_default_config().unwrap();
    let builder = builder.build().unwrap();

    builder.peer_selector.create(builder.clone()).unwrap()
}

#[test]
fn a_single_peer_is_always_selected() {
    let selector = build_selector();
    selector.add_peer(PeerId(7), 42).unwrap();

    for _ in 0..100 {
        assert_eq!(PeerId(7), selector.select_peer());
    }
}

#[test]
fn selection_tracks_weights() {
    let selector = build_selector();
    selector.add_peer(PeerId(1), 900).unwrap();
    selector.add_peer(PeerId(2), 100).unwrap();

    let mut hits = 0;
    for _ in 0..2000 {
        if selector.select_peer() == PeerId(1) {
            hits += 1;
        }
    }

    // 9:1 odds. The expectation is 1800 and anything near parity would
    // mean the draw is not weighted at all.
    assert!(hits > 1400, "peer 1 selected {hits}/2000 times");
}

#[test]
fn removed_peers_are_never_selected() {
    let selector = build_selector();
    for p in 0..10_u32 {
        selector.add_peer(PeerId(p), 10 + p).unwrap();
    }
    assert!(selector.remove_peer(PeerId(3)));
    assert!(selector.remove_peer(PeerId(7)));

    for _ in 0..500 {
        let got = selector.select_peer();
        assert_ne!(PeerId(3), got);
        assert_ne!(PeerId(7), got);
    }
}

#[test]
fn rescore_keeps_selection_fair_after_relocation() {
    let selector = build_selector();
    selector.add_peer(PeerId(1), 10).unwrap();
    selector.add_peer(PeerId(2), 20).unwrap();

    // does not fit in place, so the peer relocates to the tail
    assert!(selector.rescore_peer(PeerId(1), 1000));
    assert!(selector.verify());

    // peer 1 now owns ~97% of the line
    let mut hits = 0;
    for _ in 0..1000 {
        if selector.select_peer() == PeerId(1) {
            hits += 1;
        }
    }
    assert!(hits > 800, "peer 1 selected {hits}/1000 times");
}

#[test]
fn churn_then_compact_preserves_weight_mass() {
    use rand::seq::SliceRandom;
    use rand::Rng;

    let selector = build_selector();
    let mut rng = rand::thread_rng();

    let mut live = std::collections::HashMap::new();
    for p in 0..1000_u32 {
        let score = rng.gen_range(1..10_000_u32);
        selector.add_peer(PeerId(p), score).unwrap();
        live.insert(p, score);
    }
    assert!(selector.verify());

    let mut peers: Vec<u32> = live.keys().copied().collect();
    peers.shuffle(&mut rng);
    for p in peers.into_iter().take(300) {
        assert!(selector.remove_peer(PeerId(p)));
        live.remove(&p);
    }
    assert!(selector.verify());

    let before = selector.report();
    let saved = selector.compact();
    assert!(selector.verify());

    let mass: u64 = live.values().map(|score| *score as u64).sum();
    let report = selector.report();
    assert_eq!(mass, report.slot_count);
    assert_eq!(live.len(), report.peers);
    assert_eq!(live.len(), report.slots);
    assert_eq!(0, report.fragmentation);
    assert_eq!(before.slot_count - mass, saved);
}

#[test]
fn heavy_fragmentation_advises_compaction() {
    let selector = build_selector();
    for p in 0..10_u32 {
        selector.add_peer(PeerId(p), 100).unwrap();
    }
    assert!(!selector.should_compact());

    // tombstone half of the interior mass
    for p in 1..6_u32 {
        assert!(selector.remove_peer(PeerId(p)));
    }
    assert!(selector.should_compact());

    assert_eq!(500, selector.compact());
    assert!(!selector.should_compact());
    assert!(selector.verify());
}
