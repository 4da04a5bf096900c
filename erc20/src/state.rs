//! State definitions for the ERC20 conversion module
//!
//! The registry keeps one primary record per token pair plus two secondary
//! indices (denom -> id, contract address -> id). Index maintenance lives in
//! [`crate::registry`]; this module only declares the records and their keys.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{StdError, StdResult};
use cw_storage_plus::{Item, Map};

use crate::address_codec::EvmAddress;
use crate::hash::{compute_token_pair_id, TokenPairId};

// ============================================================================
// Records
// ============================================================================

/// Which side of a pair is the source-of-truth asset
#[cw_serde]
#[derive(Copy)]
pub enum Owner {
    /// Invalid/undefined owner; no conversion is defined for it
    Unspecified,
    /// Native coin pre-existed; the ERC20 is a module-minted wrapper
    Module,
    /// ERC20 pre-existed; the native coin is a module-minted wrapper
    External,
}

/// Binding of one native denom to one ERC20 contract
#[cw_serde]
pub struct TokenPair {
    /// ERC20 contract address, EIP-55 hex
    pub erc20_address: String,
    /// Native base denomination
    pub denom: String,
    /// Whether conversion is currently allowed in both directions
    pub enabled: bool,
    pub contract_owner: Owner,
}

impl TokenPair {
    pub fn new(erc20_address: &EvmAddress, denom: impl Into<String>, contract_owner: Owner) -> Self {
        Self {
            erc20_address: erc20_address.to_checksum(),
            denom: denom.into(),
            enabled: true,
            contract_owner,
        }
    }

    /// Content-addressed id of this pair
    pub fn id(&self) -> StdResult<TokenPairId> {
        Ok(compute_token_pair_id(&self.erc20_contract()?, &self.denom))
    }

    pub fn erc20_contract(&self) -> StdResult<EvmAddress> {
        self.erc20_address.parse()
    }

    /// Shape check: valid contract address and denom.
    pub fn validate(&self) -> StdResult<()> {
        self.erc20_contract().map_err(|e| {
            StdError::generic_err(format!(
                "invalid ERC20 contract address {}: {}",
                self.erc20_address, e
            ))
        })?;
        common::validate_denom(&self.denom)
    }
}

/// Module parameters
#[cw_serde]
pub struct Params {
    /// Global switch for registrations and the EVM hook
    pub enable_erc20: bool,
    /// Whether ERC20 transfers to the module address are converted by the EVM hook
    pub enable_evm_hook: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            enable_erc20: true,
            enable_evm_hook: true,
        }
    }
}

// ============================================================================
// Constants
// ============================================================================

/// Module name for cw2 version info
pub const CONTRACT_NAME: &str = "crates.io:erc20";

/// Module version for cw2 version info
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix of the native denom created for an EXTERNAL ERC20 contract
pub const ERC20_DENOM_PREFIX: &str = "erc20/";

// ============================================================================
// Storage
// ============================================================================

pub const PARAMS: Item<Params> = Item::new("params");

/// Key: token pair id, Value: TokenPair
pub const TOKEN_PAIRS: Map<&[u8], TokenPair> = Map::new("token_pairs");

/// Key: native denom, Value: id of the most recently registered pair for it
pub const DENOM_INDEX: Map<&str, TokenPairId> = Map::new("denom_index");

/// Key: 20-byte contract address, Value: token pair id
pub const ERC20_INDEX: Map<&[u8], TokenPairId> = Map::new("erc20_index");

/// Denoms and checksummed contract addresses of pairs deleted after their
/// contract self-destructed. Value: id of the deleted pair
pub const RETIRED_TOKENS: Map<&str, TokenPairId> = Map::new("retired_tokens");
