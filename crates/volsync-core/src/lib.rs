//! Core types, peer selection and configuration for volsync.
//!
//! volsync keeps a shared volume consistent across a group of peer
//! containers by running an external bidirectional sync tool (unison)
//! against a deterministic subset of the group. This crate holds the pure
//! parts of that job:
//!
//! - **Types**: [`PeerAddress`], [`GroupView`], [`SyncStrategy`], [`SyncTask`]
//! - **Selection**: [`PeerSelector`] decides which peers this node syncs to
//! - **Configuration**: [`SyncConfig`] with TOML loading and defaults
//! - **Errors**: [`CoreError`]
//!
//! # Example
//!
//! ```rust
//! use volsync_core::{GroupView, PeerAddress, PeerSelector, SyncStrategy};
//!
//! let group: GroupView = ["10.0.0.3", "10.0.0.1", "10.0.0.2"]
//!     .iter()
//!     .map(|s| s.parse::<PeerAddress>().unwrap())
//!     .collect();
//! let me: PeerAddress = "10.0.0.3".parse().unwrap();
//!
//! let selection = PeerSelector::new(SyncStrategy::Next).select(&group, me);
//! assert_eq!(selection.targets, vec!["10.0.0.1".parse::<PeerAddress>().unwrap()]);
//! ```

#![doc(html_root_url = "https://docs.rs/volsync-core/0.1.0")]

pub mod config;
mod error;
pub mod selector;
pub mod types;

pub use config::SyncConfig;
pub use error::{CoreError, Result};
pub use selector::{PeerSelector, Selection};
pub use types::*;
