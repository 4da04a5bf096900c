//! Address encoding for the two sides of a token pair
//!
//! An account has one 20-byte address that is rendered two ways:
//!
//! - EVM side: `0x`-prefixed hex, displayed with the EIP-55 mixed-case checksum
//! - Native side: bech32 with the chain's human readable prefix (e.g. `cosmos1...`)
//!
//! Converting between the two never changes the underlying bytes, so the EVM
//! receiver of a `ConvertCoin` and the native sender of the same account refer
//! to one ledger identity.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;
use cosmwasm_std::{Addr, StdError, StdResult};

// ============================================================================
// EVM Address
// ============================================================================

/// 20-byte EVM account or contract address
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EvmAddress(Address);

impl EvmAddress {
    pub const ZERO: EvmAddress = EvmAddress(Address::ZERO);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(Address::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0 .0 .0
    }

    /// EIP-55 checksummed hex string
    pub fn to_checksum(&self) -> String {
        self.0.to_checksum(None)
    }

    /// Address of the contract `self` creates with the `CREATE` opcode at `nonce`.
    pub fn create(&self, nonce: u64) -> EvmAddress {
        Self(self.0.create(nonce))
    }

    /// Native bech32 form of the same account.
    pub fn to_native(&self, hrp: &str) -> StdResult<Addr> {
        encode_bech32_address(self.as_bytes(), hrp).map(Addr::unchecked)
    }
}

impl fmt::Display for EvmAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

/// Hex with or without `0x`; the checksum casing is not enforced.
impl FromStr for EvmAddress {
    type Err = StdError;

    fn from_str(s: &str) -> StdResult<Self> {
        Address::from_str(s)
            .map(Self)
            .map_err(|e| StdError::generic_err(format!("invalid EVM address {}: {}", s, e)))
    }
}

impl From<[u8; 20]> for EvmAddress {
    fn from(bytes: [u8; 20]) -> Self {
        Self::new(bytes)
    }
}

impl From<Address> for EvmAddress {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl From<EvmAddress> for Address {
    fn from(address: EvmAddress) -> Self {
        address.0
    }
}

/// Whether `s` is shaped like a hex EVM address.
///
/// Used to decide whether a user-supplied token identifier names a contract
/// or a denomination.
pub fn is_hex_address(s: &str) -> bool {
    s.parse::<EvmAddress>().is_ok()
}

// ============================================================================
// Native (bech32) Address
// ============================================================================

/// Validate a native bech32 address against the expected prefix.
pub fn validate_native_address(addr: &str, hrp: &str) -> StdResult<Addr> {
    if addr != addr.to_lowercase() {
        return Err(StdError::generic_err(format!(
            "Address {} must be lowercase",
            addr
        )));
    }

    let (decoded_hrp, _) = decode_bech32_address(addr)?;
    if decoded_hrp != hrp {
        return Err(StdError::generic_err(format!(
            "Invalid address prefix: expected {}, got {}",
            hrp, decoded_hrp
        )));
    }

    Ok(Addr::unchecked(addr))
}

/// Decode a bech32 address to its prefix and raw 20 bytes, verifying the checksum
pub fn decode_bech32_address(addr: &str) -> StdResult<(String, [u8; 20])> {
    let (hrp, data_part) = addr
        .rsplit_once('1')
        .ok_or_else(|| StdError::generic_err("Invalid bech32 format"))?;

    if hrp.is_empty() {
        return Err(StdError::generic_err("Bech32 prefix is empty"));
    }

    // The data part includes the address data + 6 char checksum
    if data_part.len() < 7 {
        return Err(StdError::generic_err("Bech32 data too short"));
    }

    let values = decode_bech32_data(data_part)?;

    let mut check = expand_hrp(hrp);
    check.extend_from_slice(&values);
    if bech32_polymod(&check) != 1 {
        return Err(StdError::generic_err("Invalid bech32 checksum"));
    }

    // Convert from 5-bit groups (without checksum) to 8-bit bytes
    let bytes = convert_bits(&values[..values.len() - 6], 5, 8, false)?;

    if bytes.len() != 20 {
        return Err(StdError::generic_err(format!(
            "Invalid address length: expected 20 bytes, got {}",
            bytes.len()
        )));
    }

    let mut result = [0u8; 20];
    result.copy_from_slice(&bytes);
    Ok((hrp.to_string(), result))
}

/// Encode raw 20 bytes to a bech32 address with given prefix
pub fn encode_bech32_address(bytes: &[u8; 20], hrp: &str) -> StdResult<String> {
    if hrp.is_empty() || !hrp.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
        return Err(StdError::generic_err(format!("Invalid bech32 prefix: {}", hrp)));
    }

    let data5 = convert_bits(bytes, 8, 5, true)?;
    let checksum = compute_bech32_checksum(hrp, &data5);

    Ok(format!(
        "{}1{}{}",
        hrp,
        encode_bech32_data(&data5),
        encode_bech32_data(&checksum)
    ))
}

/// Convert bits between different group sizes
fn convert_bits(data: &[u8], from_bits: u32, to_bits: u32, pad: bool) -> StdResult<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut result = Vec::new();
    let max_v = (1u32 << to_bits) - 1;

    for &value in data {
        let v = value as u32;
        acc = (acc << from_bits) | v;
        bits += from_bits;

        while bits >= to_bits {
            bits -= to_bits;
            result.push(((acc >> bits) & max_v) as u8);
        }
    }

    if pad && bits > 0 {
        result.push(((acc << (to_bits - bits)) & max_v) as u8);
    } else if !pad && (bits >= from_bits || ((acc << (to_bits - bits)) & max_v) != 0) {
        return Err(StdError::generic_err("Invalid padding"));
    }

    Ok(result)
}

/// Bech32 character set
const BECH32_CHARSET: &[u8] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Decode bech32 base32 data
fn decode_bech32_data(data: &str) -> StdResult<Vec<u8>> {
    data.chars()
        .map(|c| {
            BECH32_CHARSET
                .iter()
                .position(|&x| x as char == c)
                .map(|idx| idx as u8)
                .ok_or_else(|| StdError::generic_err(format!("Invalid bech32 character: {}", c)))
        })
        .collect()
}

/// Encode bytes to bech32 base32 string
fn encode_bech32_data(data: &[u8]) -> String {
    data.iter()
        .map(|&b| BECH32_CHARSET[b as usize] as char)
        .collect()
}

/// Compute bech32 checksum
fn compute_bech32_checksum(hrp: &str, data: &[u8]) -> Vec<u8> {
    let mut values = expand_hrp(hrp);
    values.extend_from_slice(data);
    values.extend_from_slice(&[0, 0, 0, 0, 0, 0]);

    let polymod = bech32_polymod(&values) ^ 1;

    (0..6)
        .map(|i| ((polymod >> (5 * (5 - i))) & 31) as u8)
        .collect()
}

/// Expand HRP for checksum calculation
fn expand_hrp(hrp: &str) -> Vec<u8> {
    let mut result = Vec::with_capacity(hrp.len() * 2 + 1);

    for c in hrp.bytes() {
        result.push(c >> 5);
    }
    result.push(0);
    for c in hrp.bytes() {
        result.push(c & 31);
    }

    result
}

/// Bech32 polymod function
fn bech32_polymod(values: &[u8]) -> u32 {
    const GENERATOR: [u32; 5] = [
        0x3b6a_57b2,
        0x2650_8e6d,
        0x1ea1_19fa,
        0x3d42_33dd,
        0x2a14_62b3,
    ];

    let mut chk: u32 = 1;
    for &v in values {
        let top = chk >> 25;
        chk = ((chk & 0x01ff_ffff) << 5) ^ (v as u32);
        for (i, gen) in GENERATOR.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= gen;
            }
        }
    }
    chk
}
