//! Builder-related types.

use crate::*;
use std::sync::Arc;

/// Assembles the pieces a running selector needs: configuration, an
/// entropy source, and the factory that constructs module instances.
///
/// The expected flow is [Builder::set_default_config], optional edits to
/// [Builder::config] (or replacing it with one loaded from disk), then
/// [Builder::build] to validate everything and freeze the builder behind
/// an [Arc].
pub struct Builder {
    /// The module configuration used when building modules. Factory
    /// defaults land here, and a host may overwrite it with a config
    /// loaded from disk before building.
    pub config: Config,

    /// The [Entropy] source selection will draw from.
    pub entropy: DynEntropy,

    /// The [selector::PeerSelectorFactory] used for creating
    /// [selector::PeerSelector] instances.
    pub peer_selector: DynPeerSelectorFactory,
}

impl Builder {
    /// Ask each configured factory to register its default
    /// configuration on this builder.
    pub fn set_default_config(&mut self) -> SlushResult<()> {
        self.peer_selector.default_config(&mut self.config)
    }

    /// Check the current configuration against each configured factory.
    pub fn validate_config(&self) -> SlushResult<()> {
        self.peer_selector.validate_config(&self.config)
    }

    /// Validate the configuration, then freeze the builder so factories
    /// can hold it while constructing module instances.
    pub fn build(self) -> SlushResult<Arc<Self>> {
        self.validate_config()?;
        Ok(Arc::new(self))
    }
}
