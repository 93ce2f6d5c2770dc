//! ballot-ledger - read-only queries against tokenized ballot contracts
//!
//! Enumerates a contract's proposals through an injected accessor and
//! reports the winner the contract itself declares.
//!
//! Key principles:
//! - Contract reads go through the `BallotAccessor` trait (mockable)
//! - Only an explicit "no entry at this index" ends the proposal list
//! - Transport failures are retried boundedly, then surfaced

pub mod ledger;
pub mod report;
pub mod rpc;
