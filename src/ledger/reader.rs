//! Proposal enumeration and winner resolution.
//!
//! A ballot contract exposes `proposals(i)` but no length. The reader reads
//! indices 0, 1, 2, ... in order until the accessor answers `NotFound`, which
//! is the only answer that ends the list. Any other failure aborts the read.

use super::retry::{retry_with_backoff, RetryPolicy};
use super::traits::{AccessError, AccessResult, Address, BallotAccessor};
use super::types::{decode_name, BallotSnapshot, Proposal, VotingPower, WinnerInfo};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default ceiling on the number of proposals read from one contract.
pub const DEFAULT_MAX_PROPOSALS: usize = 1024;

/// Reader failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Winning index {index} is outside the {count} enumerated proposals")]
    ConsistencyMismatch { index: u64, count: usize },

    #[error("Contract returned more than {limit} proposals")]
    TooManyProposals { limit: usize },
}

/// Result type for reader operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Reader tuning.
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    pub retry: RetryPolicy,
    /// Per-read timeout. `None` waits as long as the accessor does.
    pub call_timeout: Option<Duration>,
    pub max_proposals: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            call_timeout: Some(Duration::from_secs(30)),
            max_proposals: DEFAULT_MAX_PROPOSALS,
        }
    }
}

/// Reads proposals and the declared winner through a `BallotAccessor`.
pub struct ProposalLedgerReader<A: BallotAccessor> {
    accessor: A,
    options: ReaderOptions,
}

impl<A: BallotAccessor> ProposalLedgerReader<A> {
    /// Create a reader with default options.
    pub fn new(accessor: A) -> Self {
        Self::with_options(accessor, ReaderOptions::default())
    }

    /// Create a reader with explicit options.
    pub fn with_options(accessor: A, options: ReaderOptions) -> Self {
        Self { accessor, options }
    }

    /// Get the underlying accessor.
    pub fn accessor(&self) -> &A {
        &self.accessor
    }

    /// Read every proposal, in index order.
    ///
    /// Reads are strictly sequential. `NotFound` ends the list (index 0
    /// failing yields an empty list); every other error is returned.
    pub async fn enumerate_proposals(&self) -> LedgerResult<Vec<Proposal>> {
        let mut proposals = Vec::new();
        let mut index: u64 = 0;

        loop {
            match self.read(move || self.accessor.proposal(index)).await {
                Ok(raw) => {
                    if proposals.len() >= self.options.max_proposals {
                        return Err(LedgerError::TooManyProposals {
                            limit: self.options.max_proposals,
                        });
                    }

                    let name = decode_name(&raw.name);
                    debug!(index, name = %name, votes = %raw.vote_count, "read proposal");
                    proposals.push(Proposal {
                        index,
                        name,
                        vote_count: raw.vote_count,
                    });
                    index += 1;
                }
                Err(AccessError::NotFound { .. }) => break,
                Err(err) => {
                    warn!(index, error = %err, "proposal read failed");
                    return Err(err.into());
                }
            }
        }

        info!(count = proposals.len(), "enumerated proposals");
        Ok(proposals)
    }

    /// Resolve the contract-declared winner against `proposals`.
    ///
    /// The contract decides the leader; the vote count is taken from the
    /// already-enumerated entry at the winning index.
    pub async fn resolve_winner(&self, proposals: &[Proposal]) -> LedgerResult<WinnerInfo> {
        let index = self.read(|| self.accessor.winning_index()).await?;
        let name_bytes = self.read(|| self.accessor.winning_name()).await?;

        let entry = usize::try_from(index)
            .ok()
            .and_then(|i| proposals.get(i))
            .ok_or(LedgerError::ConsistencyMismatch {
                index,
                count: proposals.len(),
            })?;

        let name = decode_name(&name_bytes);
        if name != entry.name {
            warn!(
                index,
                declared = %name,
                enumerated = %entry.name,
                "winner name differs from enumerated proposal"
            );
        }

        Ok(WinnerInfo {
            index,
            name,
            vote_count: entry.vote_count,
        })
    }

    /// Read the unspent voting power of `account`.
    pub async fn voting_power(&self, account: Address) -> LedgerResult<VotingPower> {
        let power = self.read(move || self.accessor.voting_power(account)).await?;
        debug!(account = %account, power = %power, "read voting power");
        Ok(VotingPower {
            address: account,
            voting_power: power,
        })
    }

    /// Read chairperson, proposals and (if any) the winner.
    ///
    /// A reverted or malformed chairperson read is tolerated; transport
    /// failures are not.
    pub async fn snapshot(&self, contract: Address) -> LedgerResult<BallotSnapshot> {
        let chairperson = match self.read(|| self.accessor.chairperson()).await {
            Ok(address) => Some(address),
            Err(err @ AccessError::Transport(_)) => return Err(err.into()),
            Err(err) => {
                warn!(error = %err, "could not read chairperson");
                None
            }
        };

        let proposals = self.enumerate_proposals().await?;
        let winner = if proposals.is_empty() {
            None
        } else {
            Some(self.resolve_winner(&proposals).await?)
        };

        Ok(BallotSnapshot {
            contract,
            chairperson,
            proposals,
            winner,
        })
    }

    /// One accessor read with timeout and transport retries.
    async fn read<T, F, Fut>(&self, mut call: F) -> AccessResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AccessResult<T>>,
    {
        let timeout = self.options.call_timeout;
        retry_with_backoff(
            &self.options.retry,
            || {
                let fut = call();
                async move {
                    match timeout {
                        Some(limit) => tokio::time::timeout(limit, fut).await.unwrap_or_else(|_| {
                            Err(AccessError::Transport(format!(
                                "read timed out after {}ms",
                                limit.as_millis()
                            )))
                        }),
                        None => fut.await,
                    }
                }
            },
            AccessError::is_transient,
        )
        .await
    }
}
