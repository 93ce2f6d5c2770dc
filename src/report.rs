//! Plain-text rendering of ballot reads.
//!
//! Vote weights of a tokenized ballot are token amounts, so they are shown
//! in token units (`decimals` places). With `decimals == 0` the raw integer
//! is printed.

use crate::ledger::traits::VoteWeight;
use crate::ledger::types::{BallotSnapshot, Proposal, VotingPower, WinnerInfo};
use std::fmt::Write;

/// Decimals of the ERC20Votes token backing a tokenized ballot.
pub const TOKEN_DECIMALS: u8 = 18;

/// Fixed-point rendering of `value` with `decimals` places.
///
/// Trailing zeros are dropped but one fractional digit is kept:
/// `1500000000000000000` at 18 decimals is `1.5`, `2 * 10^18` is `2.0`.
pub fn format_units(value: u128, decimals: u8) -> String {
    let digits = value.to_string();
    if decimals == 0 {
        return digits;
    }

    let places = usize::from(decimals);
    let (whole, fraction) = if digits.len() > places {
        let (whole, fraction) = digits.split_at(digits.len() - places);
        (whole.to_string(), fraction.to_string())
    } else {
        ("0".to_string(), format!("{:0>width$}", digits, width = places))
    };

    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, fraction)
    }
}

/// `1 vote`, `0 votes`, `1.5 votes`.
pub fn format_votes(count: VoteWeight, decimals: u8) -> String {
    if decimals == 0 && count == 1 {
        "1 vote".to_string()
    } else {
        format!("{} votes", format_units(count, decimals))
    }
}

/// One proposal line, indented for the results list.
pub fn format_proposal(proposal: &Proposal, decimals: u8) -> String {
    format!(
        "  {}: \"{}\" - {}",
        proposal.index,
        proposal.name,
        format_votes(proposal.vote_count, decimals)
    )
}

/// Single-line winner summary.
pub fn format_winner(winner: &WinnerInfo, decimals: u8) -> String {
    format!(
        "Current winning proposal: #{} - \"{}\" with {}",
        winner.index,
        winner.name,
        format_votes(winner.vote_count, decimals)
    )
}

pub fn format_voting_power(power: &VotingPower, decimals: u8) -> String {
    format!(
        "Voting power of {}: {}",
        power.address,
        format_units(power.voting_power, decimals)
    )
}

/// Full results report for a snapshot.
pub fn render_snapshot(snapshot: &BallotSnapshot, decimals: u8) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Ballot Contract Query Results");
    let _ = writeln!(out, "Contract address: {}", snapshot.contract);

    if let Some(chair) = &snapshot.chairperson {
        let _ = writeln!(out);
        let _ = writeln!(out, "Chairperson: {}", chair);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Proposals:");
    if snapshot.proposals.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "No proposals found in the ballot.");
        return out;
    }

    for proposal in &snapshot.proposals {
        let _ = writeln!(out, "{}", format_proposal(proposal, decimals));
    }

    if let Some(winner) = &snapshot.winner {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", format_winner(winner, decimals));
    }

    out
}
