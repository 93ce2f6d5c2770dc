//! Mock ballot contract for testing.
//!
//! Behaves like the Solidity `Ballot` contract: `proposals(i)` fails past the
//! last entry and `winningProposal()` returns the first proposal holding the
//! highest count. Faults can be injected per index.

use super::traits::*;
use super::types::encode_name;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock ballot contract.
#[derive(Clone)]
pub struct MockBallot {
    state: Arc<Mutex<MockState>>,
}

struct MockState {
    proposals: Vec<RawProposal>,
    chairperson: Address,
    winning_index: Option<u64>,
    winning_name: Option<NameBytes>,
    voting_power: HashMap<Address, VoteWeight>,
    /// Permanent failure for a proposal index.
    faults: HashMap<u64, AccessError>,
    /// Number of transport failures still to serve for an index.
    transient: HashMap<u64, u32>,
    /// Artificial latency for `proposal(index)`.
    delays: HashMap<u64, Duration>,
    proposal_calls: Vec<u64>,
}

impl MockBallot {
    /// Create an empty ballot.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                proposals: Vec::new(),
                chairperson: Address::from_bytes([0u8; 20]),
                winning_index: None,
                winning_name: None,
                voting_power: HashMap::new(),
                faults: HashMap::new(),
                transient: HashMap::new(),
                delays: HashMap::new(),
                proposal_calls: Vec::new(),
            })),
        }
    }

    /// Create a ballot from `(name, votes)` pairs.
    pub fn with_proposals(proposals: &[(&str, VoteWeight)]) -> Self {
        let ballot = Self::new();
        for (name, votes) in proposals {
            ballot.push_proposal(name, *votes);
        }
        ballot
    }

    /// Append a proposal (for test setup).
    pub fn push_proposal(&self, name: &str, vote_count: VoteWeight) {
        let mut s = self.state.lock().unwrap();
        s.proposals.push(RawProposal {
            name: encode_name(name),
            vote_count,
        });
    }

    /// Set the chairperson address.
    pub fn set_chairperson(&self, address: Address) {
        self.state.lock().unwrap().chairperson = address;
    }

    /// Override the index reported by `winningProposal()`.
    pub fn set_winning_index(&self, index: u64) {
        self.state.lock().unwrap().winning_index = Some(index);
    }

    /// Override both `winningProposal()` and `winnerName()`.
    pub fn set_winner(&self, index: u64, name: &str) {
        let mut s = self.state.lock().unwrap();
        s.winning_index = Some(index);
        s.winning_name = Some(encode_name(name));
    }

    /// Set the voting power reported for `account`.
    pub fn set_voting_power(&self, account: Address, power: VoteWeight) {
        self.state.lock().unwrap().voting_power.insert(account, power);
    }

    /// Make every read of `proposals(index)` fail with `error`.
    pub fn fail_at(&self, index: u64, error: AccessError) {
        self.state.lock().unwrap().faults.insert(index, error);
    }

    /// Make the next `times` reads of `proposals(index)` fail with a transport error.
    pub fn fail_transiently(&self, index: u64, times: u32) {
        self.state.lock().unwrap().transient.insert(index, times);
    }

    /// Delay reads of `proposals(index)`.
    pub fn delay_at(&self, index: u64, delay: Duration) {
        self.state.lock().unwrap().delays.insert(index, delay);
    }

    /// Indices passed to `proposal()`, in call order.
    pub fn proposal_calls(&self) -> Vec<u64> {
        self.state.lock().unwrap().proposal_calls.clone()
    }

    fn leader(state: &MockState) -> u64 {
        let mut best = 0usize;
        for (i, p) in state.proposals.iter().enumerate() {
            if p.vote_count > state.proposals[best].vote_count {
                best = i;
            }
        }
        state.winning_index.unwrap_or(best as u64)
    }
}

impl Default for MockBallot {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BallotAccessor for MockBallot {
    async fn proposal(&self, index: u64) -> AccessResult<RawProposal> {
        let delay = {
            let mut s = self.state.lock().unwrap();
            s.proposal_calls.push(index);
            s.delays.get(&index).copied()
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut s = self.state.lock().unwrap();

        if let Some(remaining) = s.transient.get_mut(&index) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(AccessError::Transport(format!(
                    "connection reset reading index {}",
                    index
                )));
            }
        }

        if let Some(err) = s.faults.get(&index) {
            return Err(err.clone());
        }

        usize::try_from(index)
            .ok()
            .and_then(|i| s.proposals.get(i))
            .cloned()
            .ok_or(AccessError::NotFound { index })
    }

    async fn winning_index(&self) -> AccessResult<u64> {
        let s = self.state.lock().unwrap();
        if s.proposals.is_empty() && s.winning_index.is_none() {
            return Err(AccessError::Reverted("no proposals".to_string()));
        }
        Ok(Self::leader(&s))
    }

    async fn winning_name(&self) -> AccessResult<NameBytes> {
        let s = self.state.lock().unwrap();
        if let Some(name) = s.winning_name {
            return Ok(name);
        }
        let index = Self::leader(&s);
        usize::try_from(index)
            .ok()
            .and_then(|i| s.proposals.get(i))
            .map(|p| p.name)
            .ok_or_else(|| AccessError::Reverted(format!("index {} out of bounds", index)))
    }

    async fn chairperson(&self) -> AccessResult<Address> {
        Ok(self.state.lock().unwrap().chairperson)
    }

    async fn voting_power(&self, account: Address) -> AccessResult<VoteWeight> {
        let s = self.state.lock().unwrap();
        Ok(s.voting_power.get(&account).copied().unwrap_or(0))
    }
}
