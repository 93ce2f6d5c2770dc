//! Decoded ballot values.

use super::traits::{Address, NameBytes, VoteWeight, NAME_WIDTH};
use serde::{Deserialize, Serialize};

/// A proposal with its name decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub index: u64,
    pub name: String,
    pub vote_count: VoteWeight,
}

/// The leading proposal as declared by the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerInfo {
    pub index: u64,
    pub name: String,
    pub vote_count: VoteWeight,
}

/// Unspent voting weight of one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingPower {
    pub address: Address,
    pub voting_power: VoteWeight,
}

/// Everything a results query reads from one contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotSnapshot {
    pub contract: Address,
    pub chairperson: Option<Address>,
    pub proposals: Vec<Proposal>,
    /// Absent when the ballot has no proposals.
    pub winner: Option<WinnerInfo>,
}

/// Decode a zero-padded `bytes32` name.
///
/// Invalid UTF-8 is replaced rather than rejected.
pub fn decode_name(bytes: &NameBytes) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches('\0')
        .to_string()
}

/// Encode a name into a zero-padded `bytes32`, truncating past 32 bytes.
pub fn encode_name(name: &str) -> NameBytes {
    let mut out = [0u8; NAME_WIDTH];
    let bytes = name.as_bytes();
    let len = bytes.len().min(NAME_WIDTH);
    out[..len].copy_from_slice(&bytes[..len]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_strips_zero_padding() {
        let mut bytes = [0u8; 32];
        bytes[..10].copy_from_slice(b"Proposal 1");
        assert_eq!(decode_name(&bytes), "Proposal 1");
    }

    #[test]
    fn test_decode_full_width_name() {
        let bytes = [b'a'; 32];
        assert_eq!(decode_name(&bytes), "a".repeat(32));
    }

    #[test]
    fn test_decode_all_zero_is_empty() {
        assert_eq!(decode_name(&[0u8; 32]), "");
    }

    #[test]
    fn test_decode_keeps_interior_spaces() {
        let bytes = encode_name("Cat  ");
        assert_eq!(decode_name(&bytes), "Cat  ");
    }

    #[test]
    fn test_decode_invalid_utf8_is_lossy() {
        let mut bytes = [0u8; 32];
        bytes[0] = b'A';
        bytes[1] = 0xff;
        assert_eq!(decode_name(&bytes), "A\u{fffd}");
    }

    #[test]
    fn test_encode_truncates_long_names() {
        let long = "x".repeat(40);
        let bytes = encode_name(&long);
        assert_eq!(decode_name(&bytes), "x".repeat(32));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let snapshot = BallotSnapshot {
            contract: Address::from_bytes([1u8; 20]),
            chairperson: None,
            proposals: vec![Proposal {
                index: 0,
                name: "Cats".to_string(),
                vote_count: 3,
            }],
            winner: None,
        };

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["proposals"][0]["name"], "Cats");
        assert_eq!(value["proposals"][0]["vote_count"], 3);
        assert!(value["winner"].is_null());
    }
}
