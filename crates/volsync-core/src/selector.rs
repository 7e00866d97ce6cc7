//! Deterministic choice of sync targets.
//!
//! Every node computes its targets from the same ordered [`GroupView`], so
//! with [`SyncStrategy::Next`] the group forms a ring and with
//! [`SyncStrategy::First`] a star around the smallest address.

use tracing::warn;

use crate::types::{GroupView, PeerAddress, SyncStrategy};

/// Targets chosen for one cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Peers to sync with, ascending, never containing this node
    pub targets: Vec<PeerAddress>,
    /// Whether this node's own address was found in the group
    pub self_in_group: bool,
}

impl Selection {
    /// No sync needed this cycle
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Applies a [`SyncStrategy`] to a group snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct PeerSelector {
    strategy: SyncStrategy,
}

impl PeerSelector {
    /// Selector for a fixed strategy
    #[must_use]
    pub const fn new(strategy: SyncStrategy) -> Self {
        Self { strategy }
    }

    /// The configured strategy
    #[must_use]
    pub const fn strategy(&self) -> SyncStrategy {
        self.strategy
    }

    /// Compute the targets for `own` within `group`.
    ///
    /// When `own` is missing from the group the node still syncs: its index
    /// counts as -1, so `Next` resolves to `(-1 + 1) % len`, the first peer.
    pub fn select(&self, group: &GroupView, own: PeerAddress) -> Selection {
        let position = group.position(own);
        if position.is_none() {
            warn!(
                own = %own,
                group = %group,
                "own address is not part of the group, are all hosts on the same network?"
            );
        }

        let peers = group.peers();
        let mut targets = if peers.is_empty() {
            Vec::new()
        } else {
            match self.strategy {
                SyncStrategy::First => vec![peers[0]],
                SyncStrategy::Next => {
                    let next = position.map_or(0, |index| (index + 1) % peers.len());
                    vec![peers[next]]
                }
                SyncStrategy::All => peers.to_vec(),
            }
        };

        targets.retain(|peer| *peer != own);

        Selection {
            targets,
            self_in_group: position.is_some(),
        }
    }
}
