//! Capability tiers and grantable capability kinds
//!
//! The ledger records four roles. For delete decisions they collapse into a
//! strictly ordered tier so the acting identity and the original author can
//! be compared directly.

use crate::errors::RainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Strictly ordered capability tier
///
/// `None < Member < Moderator < Admin < Owner`. The derived ordering follows
/// declaration order and is what delete decisions compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapabilityTier {
    /// No recorded capability
    None,
    /// Plain member
    Member,
    /// Moderator
    Moderator,
    /// Administrator
    Admin,
    /// Community owner
    Owner,
}

impl CapabilityTier {
    /// Numeric rank, 0 for `None` through 4 for `Owner`
    pub fn rank(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Member => 1,
            Self::Moderator => 2,
            Self::Admin => 3,
            Self::Owner => 4,
        }
    }

    /// Whether entries authored at this tier are protected from deletion by others
    pub fn is_protected(self) -> bool {
        self == Self::Owner
    }
}

impl fmt::Display for CapabilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "NONE",
            Self::Member => "MEMBER",
            Self::Moderator => "MODERATOR",
            Self::Admin => "ADMIN",
            Self::Owner => "OWNER",
        };
        f.write_str(name)
    }
}

/// Capability kind that can be granted or revoked on the ledger
///
/// Ownership is not a kind: it moves only through a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapabilityKind {
    /// Member role
    Member,
    /// Moderator role
    Moderator,
    /// Admin role
    Admin,
}

impl CapabilityKind {
    /// All grantable kinds
    pub const ALL: [CapabilityKind; 3] = [Self::Member, Self::Moderator, Self::Admin];

    /// Wire name, as accepted by [`FromStr`]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "MEMBER",
            Self::Moderator => "MODERATOR",
            Self::Admin => "ADMIN",
        }
    }

    /// Tier held by an address carrying this capability
    pub fn tier(self) -> CapabilityTier {
        match self {
            Self::Member => CapabilityTier::Member,
            Self::Moderator => CapabilityTier::Moderator,
            Self::Admin => CapabilityTier::Admin,
        }
    }

    /// Ledger method that adds this capability
    pub fn add_method(self) -> &'static str {
        match self {
            Self::Member => "addMember",
            Self::Moderator => "addModerator",
            Self::Admin => "addAdmin",
        }
    }

    /// Ledger method that removes this capability
    pub fn remove_method(self) -> &'static str {
        match self {
            Self::Member => "removeMember",
            Self::Moderator => "removeModerator",
            Self::Admin => "removeAdmin",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapabilityKind {
    type Err = RainError;

    /// Exact match on the wire name; no case folding, no default
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| RainError::invalid_capability_kind(s))
    }
}
