//! Slush report types.

/// A point-in-time occupancy snapshot of a peer selector.
///
/// The counters describe the physical layout, not fairness: live peers
/// are always selected proportionally to score regardless of how much of
/// the number line is currently reclaimable. Hosts typically watch
/// `fragmentation` relative to `slot_count` to schedule compaction, and
/// surface the rest through their own status reporting.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct SelectorReport {
    /// Number of live peers currently eligible for selection.
    pub peers: usize,

    /// Number of slots in the backing array, tombstones included.
    pub slots: usize,

    /// Exclusive upper bound of the selection number line.
    pub slot_count: u64,

    /// Number-line units covered by tombstones and gaps.
    pub fragmentation: u64,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn report_encoding_is_camel_case() {
        let report = SelectorReport {
            peers: 2,
            slots: 3,
            slot_count: 40,
            fragmentation: 10,
        };
        assert_eq!(
            r#"{"peers":2,"slots":3,"slotCount":40,"fragmentation":10}"#,
            serde_json::to_string(&report).unwrap().as_str(),
        );
    }
}
