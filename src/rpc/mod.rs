//! Ethereum JSON-RPC access to ballot contracts.

pub mod abi;
pub mod client;

pub use client::JsonRpcBallot;
