//! Slush error types.

use crate::PeerId;
use std::sync::Arc;

/// The core slush error type. This type is used in all external slush
/// apis as well as internally in some modules.
///
/// This type implements `Clone` so hosts can store or replay failed
/// results without reconstructing them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlushError {
    /// The peer id is already registered with the selector.
    #[error("duplicate peer {0}")]
    DuplicatePeer(PeerId),

    /// A peer score must be strictly positive.
    #[error("peer score must be greater than zero")]
    InvalidScore,

    /// The slot number line cannot hold another interval of the
    /// requested score.
    #[error("slot number line overflow")]
    Overflow,

    /// Generic slush internal error.
    #[error("{ctx}")]
    Other {
        /// Any context associated with this error.
        ctx: Arc<str>,
    },
}

impl SlushError {
    /// Construct an "other" error.
    pub fn other<C: std::fmt::Display>(ctx: C) -> Self {
        Self::Other {
            ctx: ctx.to_string().into_boxed_str().into(),
        }
    }
}

/// The core slush result type.
pub type SlushResult<T> = Result<T, SlushError>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            "duplicate peer 9",
            SlushError::DuplicatePeer(PeerId(9)).to_string().as_str(),
        );
        assert_eq!(
            "peer score must be greater than zero",
            SlushError::InvalidScore.to_string().as_str(),
        );
        assert_eq!(
            "slot number line overflow",
            SlushError::Overflow.to_string().as_str(),
        );
        assert_eq!("bla", SlushError::other("bla").to_string().as_str());
        assert_eq!(
            "bla",
            SlushError::other("bla".to_string()).to_string().as_str(),
        );
    }

    #[test]
    fn ensure_error_type_is_send_and_sync() {
        fn ensure<T: std::fmt::Display + Send + Sync>(_t: T) {}
        ensure(SlushError::other("bla"));
    }
}
