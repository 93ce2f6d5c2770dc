//! Trait abstraction for ballot contract reads.
//!
//! The reader only ever talks to a `BallotAccessor`, so the JSON-RPC client
//! and the in-memory mock are interchangeable in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Width of a Solidity `bytes32` value.
pub const NAME_WIDTH: usize = 32;

/// Raw `bytes32` proposal name as stored on chain.
pub type NameBytes = [u8; NAME_WIDTH];

/// Token-weighted vote count (`uint256` on chain, bounded to `u128` here).
pub type VoteWeight = u128;

/// 20-byte EVM address (contract or account).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Get bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

/// Address parse errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("Address must start with 0x: {0}")]
    MissingPrefix(String),

    #[error("Address must have 40 hex characters, got {0}")]
    WrongLength(usize),

    #[error("Address contains non-hex characters: {0}")]
    NotHex(String),
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| AddressError::MissingPrefix(s.to_string()))?;

        if digits.len() != 40 {
            return Err(AddressError::WrongLength(digits.len()));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|_| AddressError::NotHex(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A proposal exactly as the contract returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProposal {
    pub name: NameBytes,
    pub vote_count: VoteWeight,
}

/// Result type for accessor reads.
pub type AccessResult<T> = Result<T, AccessError>;

/// Accessor read failures.
///
/// `NotFound` is the only variant that means "no entry at this index".
/// Everything else is a real failure and must reach the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("No proposal at index {index}")]
    NotFound { index: u64 },

    #[error("Contract call reverted: {0}")]
    Reverted(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed contract response: {0}")]
    Decode(String),
}

impl AccessError {
    /// Transient failures worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Read-only view of a ballot contract.
#[async_trait]
pub trait BallotAccessor: Send + Sync {
    /// Read `proposals(index)`. Fails with `NotFound` past the last entry.
    async fn proposal(&self, index: u64) -> AccessResult<RawProposal>;

    /// Read `winningProposal()`.
    async fn winning_index(&self) -> AccessResult<u64>;

    /// Read `winnerName()`.
    async fn winning_name(&self) -> AccessResult<NameBytes>;

    /// Read `chairperson()`.
    async fn chairperson(&self) -> AccessResult<Address>;

    /// Read `votingPower(account)`: unspent voting weight, 0 for unknown accounts.
    async fn voting_power(&self, account: Address) -> AccessResult<VoteWeight>;
}
