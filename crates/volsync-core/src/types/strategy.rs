use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::error::CoreError;

/// Which peers a node actively syncs outward to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", from = "String")]
pub enum SyncStrategy {
    /// The successor of this node in the ordered group, wrapping around
    #[default]
    Next,
    /// The numerically smallest member
    First,
    /// Every other member, ascending
    All,
}

impl SyncStrategy {
    /// Parse a configured sync type, falling back to [`SyncStrategy::Next`]
    /// for anything unrecognized.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            let fallback = Self::default();
            info!(value, fallback = %fallback, "not a valid sync type, using default");
            fallback
        })
    }
}

impl fmt::Display for SyncStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next => write!(f, "NEXT"),
            Self::First => write!(f, "FIRST"),
            Self::All => write!(f, "ALL"),
        }
    }
}

impl FromStr for SyncStrategy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NEXT" => Ok(Self::Next),
            "FIRST" => Ok(Self::First),
            "ALL" => Ok(Self::All),
            _ => Err(CoreError::UnknownStrategy(s.to_string())),
        }
    }
}

impl From<String> for SyncStrategy {
    fn from(value: String) -> Self {
        Self::parse_lenient(&value)
    }
}
