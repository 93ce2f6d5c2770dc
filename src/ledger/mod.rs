//! Ballot contract reading.
//!
//! This module provides:
//! - A mock-friendly accessor trait for contract reads
//! - Sequential proposal enumeration with explicit end-of-list detection
//! - Winner resolution against the enumerated proposals
//! - Per-account voting power reads
//! - Bounded retry for transport failures

pub mod mock;
pub mod reader;
pub mod retry;
pub mod traits;
pub mod types;

#[cfg(test)]
mod proptests;

pub use mock::MockBallot;
pub use reader::{LedgerError, LedgerResult, ProposalLedgerReader, ReaderOptions};
pub use retry::RetryPolicy;
pub use traits::{AccessError, AccessResult, Address, BallotAccessor, RawProposal, VoteWeight};
pub use types::{decode_name, encode_name, BallotSnapshot, Proposal, VotingPower, WinnerInfo};
