//! Minimal Solidity ABI encoding for the ballot getters.
//!
//! Only static types are needed: `uint256` and `address` arguments, and
//! `bytes32`, `uint256` and `address` return words.

use crate::ledger::traits::{
    AccessError, AccessResult, Address, NameBytes, RawProposal, VoteWeight,
};
use sha3::{Digest, Keccak256};

/// ABI word width.
pub const WORD: usize = 32;

pub const PROPOSALS: &str = "proposals(uint256)";
pub const WINNING_PROPOSAL: &str = "winningProposal()";
pub const WINNER_NAME: &str = "winnerName()";
pub const CHAIRPERSON: &str = "chairperson()";
pub const VOTING_POWER: &str = "votingPower(address)";

/// Selector of the compiler-inserted `Panic(uint256)` error.
pub const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

/// `Panic` code for an out-of-bounds array access.
pub const PANIC_ARRAY_OUT_OF_BOUNDS: u64 = 0x32;

/// First four bytes of the Keccak-256 hash of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let mut hasher = Keccak256::new();
    hasher.update(signature.as_bytes());
    let digest = hasher.finalize();
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Encode a call with `uint256` arguments as `0x`-prefixed calldata.
pub fn encode_call(signature: &str, args: &[u64]) -> String {
    let mut data = Vec::with_capacity(4 + WORD * args.len());
    data.extend_from_slice(&selector(signature));
    for arg in args {
        data.extend_from_slice(&[0u8; WORD - 8]);
        data.extend_from_slice(&arg.to_be_bytes());
    }
    format!("0x{}", hex::encode(data))
}

/// Encode a call taking a single `address` argument.
pub fn encode_address_call(signature: &str, account: &Address) -> String {
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&selector(signature));
    data.extend_from_slice(&[0u8; WORD - 20]);
    data.extend_from_slice(account.as_bytes());
    format!("0x{}", hex::encode(data))
}

/// Panic code carried by `Panic(uint256)` revert data, if that is what it is.
pub fn decode_panic_code(revert_data: &[u8]) -> Option<u64> {
    let payload = revert_data.strip_prefix(&PANIC_SELECTOR[..])?;
    decode_u64(payload, 0).ok()
}

/// Parse a `0x`-prefixed hex result.
pub fn decode_hex(result: &str) -> AccessResult<Vec<u8>> {
    let digits = result.strip_prefix("0x").unwrap_or(result);
    hex::decode(digits).map_err(|e| AccessError::Decode(format!("invalid hex result: {}", e)))
}

fn word(data: &[u8], n: usize) -> AccessResult<&[u8]> {
    data.get(n * WORD..(n + 1) * WORD).ok_or_else(|| {
        AccessError::Decode(format!(
            "expected at least {} bytes, got {}",
            (n + 1) * WORD,
            data.len()
        ))
    })
}

fn high_bytes_zero(word: &[u8], keep: usize) -> bool {
    word[..WORD - keep].iter().all(|b| *b == 0)
}

/// Decode word `n` as a `uint256` that must fit in `u128`.
pub fn decode_u128(data: &[u8], n: usize) -> AccessResult<VoteWeight> {
    let w = word(data, n)?;
    if !high_bytes_zero(w, 16) {
        return Err(AccessError::Decode("uint256 value exceeds u128".to_string()));
    }
    let mut buf = [0u8; 16];
    buf.copy_from_slice(&w[16..]);
    Ok(u128::from_be_bytes(buf))
}

/// Decode word `n` as a `uint256` that must fit in `u64`.
pub fn decode_u64(data: &[u8], n: usize) -> AccessResult<u64> {
    let w = word(data, n)?;
    if !high_bytes_zero(w, 8) {
        return Err(AccessError::Decode("uint256 value exceeds u64".to_string()));
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&w[24..]);
    Ok(u64::from_be_bytes(buf))
}

/// Decode word `n` as `bytes32`.
pub fn decode_bytes32(data: &[u8], n: usize) -> AccessResult<NameBytes> {
    let w = word(data, n)?;
    let mut out = [0u8; WORD];
    out.copy_from_slice(w);
    Ok(out)
}

/// Decode word `n` as an `address`.
pub fn decode_address(data: &[u8], n: usize) -> AccessResult<Address> {
    let w = word(data, n)?;
    if !high_bytes_zero(w, 20) {
        return Err(AccessError::Decode("address word has dirty high bytes".to_string()));
    }
    let mut out = [0u8; 20];
    out.copy_from_slice(&w[12..]);
    Ok(Address::from_bytes(out))
}

/// Decode the `(bytes32 name, uint256 voteCount)` tuple of `proposals(i)`.
pub fn decode_proposal(data: &[u8]) -> AccessResult<RawProposal> {
    Ok(RawProposal {
        name: decode_bytes32(data, 0)?,
        vote_count: decode_u128(data, 1)?,
    })
}
