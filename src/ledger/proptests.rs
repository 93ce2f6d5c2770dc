//! Property-based tests for proposal enumeration
//!
//! Tests for:
//! - Length discovery: N stored proposals yield exactly N, in index order
//! - Fault isolation: a transport failure anywhere is never read as end-of-list
//! - Name decoding: zero padding never leaks into decoded names

use super::{
    mock::MockBallot,
    reader::{LedgerError, ProposalLedgerReader, ReaderOptions},
    retry::RetryPolicy,
    traits::AccessError,
    types::{decode_name, encode_name},
};
use proptest::prelude::*;

fn options() -> ReaderOptions {
    ReaderOptions {
        retry: RetryPolicy::none(),
        call_timeout: None,
        ..ReaderOptions::default()
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
}

fn ballot_of(votes: &[u64]) -> MockBallot {
    let ballot = MockBallot::new();
    for (i, v) in votes.iter().enumerate() {
        ballot.push_proposal(&format!("Proposal {}", i + 1), *v as u128);
    }
    ballot
}

proptest! {
    /// Property test: Length discovery
    /// An accessor with indices 0..N that fails at N yields exactly N proposals
    #[test]
    fn prop_enumerates_exactly_n(votes in proptest::collection::vec(any::<u64>(), 0..32)) {
        let reader = ProposalLedgerReader::with_options(ballot_of(&votes), options());
        let proposals = runtime().block_on(reader.enumerate_proposals()).unwrap();

        prop_assert_eq!(proposals.len(), votes.len());
        for (i, p) in proposals.iter().enumerate() {
            prop_assert_eq!(p.index, i as u64);
            prop_assert_eq!(p.vote_count, votes[i] as u128);
            prop_assert_eq!(&p.name, &format!("Proposal {}", i + 1));
        }
    }

    /// Property test: Fault isolation
    /// A transport failure at any index propagates instead of truncating
    #[test]
    fn prop_transport_failure_never_truncates(
        len in 1usize..16,
        fail_seed in any::<usize>(),
    ) {
        let fail_at = (fail_seed % len) as u64;
        let ballot = ballot_of(&vec![1; len]);
        ballot.fail_at(fail_at, AccessError::Transport("unreachable".to_string()));

        let reader = ProposalLedgerReader::with_options(ballot, options());
        let result = runtime().block_on(reader.enumerate_proposals());

        prop_assert!(matches!(
            result,
            Err(LedgerError::Access(AccessError::Transport(_)))
        ));
    }

    /// Property test: Name decoding
    /// Any name without NUL characters survives zero padding
    #[test]
    fn prop_name_padding_stripped(name in "[a-zA-Z0-9 ]{0,32}") {
        prop_assert_eq!(decode_name(&encode_name(&name)), name);
    }
}
