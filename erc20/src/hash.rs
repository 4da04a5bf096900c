//! Hash computation for token pair identity
//!
//! # Token pair id
//! ```text
//! id = keccak256(erc20_address_hex || "|" || denom)
//! ```
//! The id is content-addressed: the same (contract, denom) pairing always maps
//! to the same id, on every node.

use crate::address_codec::EvmAddress;
use tiny_keccak::{Hasher, Keccak};

/// 32-byte token pair identifier
pub type TokenPairId = [u8; 32];

/// Compute keccak256 hash of arbitrary data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Compute the id of the token pair binding `erc20_address` to `denom`.
///
/// The address is hashed in its canonical checksummed form, so callers may pass
/// any casing of the same contract.
pub fn compute_token_pair_id(erc20_address: &EvmAddress, denom: &str) -> TokenPairId {
    let preimage = format!("{}|{}", erc20_address.to_checksum(), denom);
    keccak256(preimage.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256_empty() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_token_pair_id_is_case_insensitive_on_address() {
        let lower: EvmAddress = "0xdac17f958d2ee523a2206206994597c13d831ec7".parse().unwrap();
        let mixed: EvmAddress = "0xdAC17F958D2ee523a2206206994597C13D831ec7".parse().unwrap();
        assert_eq!(
            compute_token_pair_id(&lower, "acoin"),
            compute_token_pair_id(&mixed, "acoin")
        );
        assert_ne!(
            compute_token_pair_id(&lower, "acoin"),
            compute_token_pair_id(&lower, "bcoin")
        );
    }
}
