//! `BallotAccessor` over Ethereum JSON-RPC `eth_call`.
//!
//! Reverts and transport failures are kept apart. Only an out-of-bounds
//! `Panic(0x32)` revert of `proposals(i)` maps to `NotFound`; any other
//! revert stays `Reverted`, and everything that never reached the contract
//! maps to `Transport`.

use super::abi;
use crate::ledger::traits::{
    AccessError, AccessResult, Address, BallotAccessor, NameBytes, RawProposal,
    VoteWeight,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::trace;

/// JSON-RPC error code used by geth-style nodes for reverts.
const REVERT_CODE: i64 = 3;

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: serde_json::Value,
    id: u64,
}

/// JSON-RPC response envelope.
#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<String>,
    pub error: Option<RpcErrorObject>,
}

/// JSON-RPC error object.
#[derive(Debug, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl RpcErrorObject {
    /// Whether the node reports an EVM revert (as opposed to a node-side failure).
    pub fn is_revert(&self) -> bool {
        self.code == REVERT_CODE || self.message.to_ascii_lowercase().contains("revert")
    }

    /// Revert data as hex, either inline or nested one level as `{ "data": "0x…" }`.
    fn revert_data(&self) -> Option<&str> {
        match self.data.as_ref()? {
            serde_json::Value::String(hex) => Some(hex),
            serde_json::Value::Object(inner) => inner.get("data")?.as_str(),
            _ => None,
        }
    }

    /// Whether the revert is the compiler's array bounds check (`Panic(0x32)`).
    ///
    /// Nodes that strip the revert data (Hardhat) only leave the decoded
    /// reason in the message.
    pub fn is_array_out_of_bounds(&self) -> bool {
        if !self.is_revert() {
            return false;
        }

        let from_data = self
            .revert_data()
            .and_then(|hex| abi::decode_hex(hex).ok())
            .and_then(|data| abi::decode_panic_code(&data))
            .is_some_and(|code| code == abi::PANIC_ARRAY_OUT_OF_BOUNDS);

        from_data
            || self
                .message
                .to_ascii_lowercase()
                .contains("panic code 0x32")
    }
}

/// Why an `eth_call` produced no output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallFailure {
    /// Reverted with `Panic(0x32)`: an array index past the end.
    OutOfBounds(String),
    /// Any other failure, already classified.
    Access(AccessError),
}

impl From<AccessError> for CallFailure {
    fn from(err: AccessError) -> Self {
        Self::Access(err)
    }
}

impl From<CallFailure> for AccessError {
    fn from(failure: CallFailure) -> Self {
        match failure {
            CallFailure::OutOfBounds(message) => AccessError::Reverted(message),
            CallFailure::Access(err) => err,
        }
    }
}

/// Turn a decoded response into call output bytes.
pub fn classify_response(response: RpcResponse) -> Result<Vec<u8>, CallFailure> {
    if let Some(err) = response.error {
        if err.is_array_out_of_bounds() {
            return Err(CallFailure::OutOfBounds(err.message));
        }
        return Err(CallFailure::Access(if err.is_revert() {
            AccessError::Reverted(err.message)
        } else {
            AccessError::Transport(format!("rpc error {}: {}", err.code, err.message))
        }));
    }

    match response.result {
        Some(result) => Ok(abi::decode_hex(&result)?),
        None => Err(CallFailure::Access(AccessError::Transport(
            "rpc response has neither result nor error".to_string(),
        ))),
    }
}

/// Ballot accessor backed by an HTTP JSON-RPC endpoint.
pub struct JsonRpcBallot {
    http: reqwest::Client,
    endpoint: String,
    contract: Address,
    next_id: AtomicU64,
}

impl JsonRpcBallot {
    /// Create a client for `contract` on `endpoint`.
    pub fn new(
        endpoint: impl Into<String>,
        contract: Address,
        timeout: Duration,
    ) -> AccessResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AccessError::Transport(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            contract,
            next_id: AtomicU64::new(1),
        })
    }

    /// Contract being read.
    pub fn contract(&self) -> Address {
        self.contract
    }

    async fn eth_call(&self, data: String) -> Result<Vec<u8>, CallFailure> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        trace!(id, data = %data, "eth_call");

        let request = RpcRequest {
            jsonrpc: "2.0",
            method: "eth_call",
            params: json!([{ "to": self.contract.to_string(), "data": data }, "latest"]),
            id,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| AccessError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CallFailure::Access(AccessError::Transport(format!("http status {}", status))));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| AccessError::Transport(format!("invalid rpc body: {}", e)))?;

        classify_response(body)
    }
}

#[async_trait]
impl BallotAccessor for JsonRpcBallot {
    async fn proposal(&self, index: u64) -> AccessResult<RawProposal> {
        match self.eth_call(abi::encode_call(abi::PROPOSALS, &[index])).await {
            Ok(data) => abi::decode_proposal(&data),
            Err(CallFailure::OutOfBounds(_)) => Err(AccessError::NotFound { index }),
            Err(CallFailure::Access(err)) => Err(err),
        }
    }

    async fn winning_index(&self) -> AccessResult<u64> {
        let data = self
            .eth_call(abi::encode_call(abi::WINNING_PROPOSAL, &[]))
            .await
            .map_err(AccessError::from)?;
        abi::decode_u64(&data, 0)
    }

    async fn winning_name(&self) -> AccessResult<NameBytes> {
        let data = self
            .eth_call(abi::encode_call(abi::WINNER_NAME, &[]))
            .await
            .map_err(AccessError::from)?;
        abi::decode_bytes32(&data, 0)
    }

    async fn chairperson(&self) -> AccessResult<Address> {
        let data = self
            .eth_call(abi::encode_call(abi::CHAIRPERSON, &[]))
            .await
            .map_err(AccessError::from)?;
        abi::decode_address(&data, 0)
    }

    async fn voting_power(&self, account: Address) -> AccessResult<VoteWeight> {
        let data = self
            .eth_call(abi::encode_address_call(abi::VOTING_POWER, &account))
            .await
            .map_err(AccessError::from)?;
        abi::decode_u128(&data, 0)
    }
}
