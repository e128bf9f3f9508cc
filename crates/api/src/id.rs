//! Types dealing with peer identity.

/// An opaque peer identity assigned by the host.
///
/// Slush attaches no meaning to the value beyond equality. Whether it is a
/// node index, a connection handle, or a key into some host-side table is
/// entirely up to the caller. The maximum value is reserved as [NO_PEER]
/// and must never identify a real peer.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct PeerId(pub u32);

/// Sentinel peer id.
///
/// Marks tombstoned slots inside selector implementations, and signals
/// "no peer could be chosen" when returned from selection.
pub const NO_PEER: PeerId = PeerId(u32::MAX);

impl std::fmt::Debug for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if *self == NO_PEER {
            f.write_str("NO_PEER")
        } else {
            write!(f, "PeerId({})", self.0)
        }
    }
}

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PeerId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<PeerId> for u32 {
    fn from(id: PeerId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sentinel_debug_is_named() {
        assert_eq!("NO_PEER", format!("{:?}", NO_PEER).as_str());
        assert_eq!("PeerId(42)", format!("{:?}", PeerId(42)).as_str());
    }

    #[test]
    fn u32_round_trip() {
        let id: PeerId = 7.into();
        assert_eq!(7_u32, u32::from(id));
        assert_eq!("7", id.to_string().as_str());
    }

    #[test]
    fn serde_is_transparent() {
        assert_eq!("3", serde_json::to_string(&PeerId(3)).unwrap().as_str());
        let id: PeerId = serde_json::from_str("3").unwrap();
        assert_eq!(PeerId(3), id);
    }
}
