//! Message types for the ERC20 conversion module
//!
//! Every execute message carries its own signer (`sender` for conversions,
//! `authority` for governance messages). `validate` runs the stateless checks
//! before a handler touches any store.

use common::{validate_denom, Metadata};
use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Coin, HexBinary, Uint256};

use crate::address_codec::{is_hex_address, validate_native_address};
use crate::error::ContractError;
use crate::state::{Params, TokenPair};

// ============================================================================
// Execute Messages
// ============================================================================

#[cw_serde]
pub enum ExecuteMsg {
    // ========================================================================
    // Conversions
    // ========================================================================
    /// Convert a native coin into its ERC20 representation
    ConvertCoin {
        coin: Coin,
        /// Hex address receiving the ERC20 tokens
        receiver: String,
        /// Bech32 address the coins are taken from
        sender: String,
    },

    /// Convert ERC20 tokens into their native coin representation
    ConvertErc20 {
        contract_address: String,
        amount: Uint256,
        /// Bech32 address receiving the coins
        receiver: String,
        /// Hex address the tokens are taken from
        sender: String,
    },

    // ========================================================================
    // Governance
    // ========================================================================
    /// Register a native coin and deploy its wrapper ERC20
    RegisterCoin { authority: String, metadata: Metadata },

    /// Register an existing ERC20 and create its wrapper coin
    RegisterErc20 {
        authority: String,
        erc20_address: String,
    },

    /// Flip the `enabled` flag of a pair, looked up by contract address or denom
    ToggleTokenConversion { authority: String, token: String },

    UpdateParams { authority: String, params: Params },
}

impl ExecuteMsg {
    /// Stateless checks on the message shape.
    pub fn validate(&self, bech32_prefix: &str) -> Result<(), ContractError> {
        match self {
            ExecuteMsg::ConvertCoin {
                coin,
                receiver,
                sender,
            } => {
                validate_convertible_denom(&coin.denom)?;
                if coin.amount.is_zero() {
                    return Err(ContractError::InvalidAmount {
                        reason: "cannot convert a non-positive amount".to_string(),
                    });
                }
                validate_native(sender, bech32_prefix, "sender")?;
                validate_hex(receiver, "receiver")
            }
            ExecuteMsg::ConvertErc20 {
                contract_address,
                amount,
                receiver,
                sender,
            } => {
                validate_hex(contract_address, "contract")?;
                if amount.is_zero() {
                    return Err(ContractError::InvalidAmount {
                        reason: "cannot convert a non-positive amount".to_string(),
                    });
                }
                validate_native(receiver, bech32_prefix, "receiver")?;
                validate_hex(sender, "sender")
            }
            ExecuteMsg::RegisterCoin {
                authority,
                metadata,
            } => {
                validate_native(authority, bech32_prefix, "authority")?;
                metadata.validate().map_err(|e| ContractError::InvalidDenom {
                    reason: format!("invalid metadata: {}", e),
                })
            }
            ExecuteMsg::RegisterErc20 {
                authority,
                erc20_address,
            } => {
                validate_native(authority, bech32_prefix, "authority")?;
                validate_hex(erc20_address, "erc20 address")
            }
            ExecuteMsg::ToggleTokenConversion { authority, token } => {
                validate_native(authority, bech32_prefix, "authority")?;
                if token.trim().is_empty() {
                    return Err(ContractError::InvalidDenom {
                        reason: "token cannot be empty".to_string(),
                    });
                }
                Ok(())
            }
            ExecuteMsg::UpdateParams { authority, .. } => {
                validate_native(authority, bech32_prefix, "authority")
            }
        }
    }
}

/// A denom `ConvertCoin` accepts: a plain base denom, `ibc/<sha256 hex>` or
/// `erc20/<hex address>`.
pub fn validate_convertible_denom(denom: &str) -> Result<(), ContractError> {
    let invalid = |reason: String| ContractError::InvalidDenom { reason };

    match denom.split_once('/') {
        None => validate_denom(denom).map_err(|e| invalid(e.to_string())),
        Some(("ibc", hash)) => {
            if hash.len() == 64 && hex::decode(hash).is_ok() {
                Ok(())
            } else {
                Err(invalid(format!("invalid ibc denom hash in {}", denom)))
            }
        }
        Some(("erc20", address)) => {
            if is_hex_address(address) {
                Ok(())
            } else {
                Err(invalid(format!("invalid erc20 contract address in {}", denom)))
            }
        }
        Some(_) => Err(invalid(format!(
            "{} is neither a base denom, an ibc denom nor an erc20 denom",
            denom
        ))),
    }
}

fn validate_native(addr: &str, prefix: &str, field: &str) -> Result<(), ContractError> {
    validate_native_address(addr, prefix)
        .map(|_| ())
        .map_err(|e| ContractError::InvalidAddress {
            reason: format!("invalid {} address {}: {}", field, addr, e),
        })
}

fn validate_hex(addr: &str, field: &str) -> Result<(), ContractError> {
    if is_hex_address(addr) {
        Ok(())
    } else {
        Err(ContractError::InvalidAddress {
            reason: format!("invalid {} hex address {}", field, addr),
        })
    }
}

// ============================================================================
// Execute Responses
// ============================================================================

#[cw_serde]
pub struct ConvertCoinResponse {}

#[cw_serde]
pub struct ConvertErc20Response {}

#[cw_serde]
pub struct RegisterResponse {
    /// Hex id of the new pair
    pub token_pair_id: HexBinary,
    pub token_pair: TokenPair,
}

// ============================================================================
// Query Messages
// ============================================================================

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    /// Registered pairs in id order
    #[returns(TokenPairsResponse)]
    TokenPairs {
        /// Hex id of the last pair of the previous page
        start_after: Option<String>,
        limit: Option<u32>,
    },

    /// Pair by ERC20 contract address or native denom
    #[returns(TokenPairResponse)]
    TokenPair { token: String },

    #[returns(ParamsResponse)]
    Params {},
}

// ============================================================================
// Query Responses
// ============================================================================

#[cw_serde]
pub struct TokenPairsResponse {
    pub token_pairs: Vec<TokenPair>,
    /// Id to pass as `start_after` for the next page, if the page was full
    pub next_key: Option<HexBinary>,
}

#[cw_serde]
pub struct TokenPairResponse {
    pub token_pair: TokenPair,
}

#[cw_serde]
pub struct ParamsResponse {
    pub params: Params,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address_codec::EvmAddress;
    use cosmwasm_std::Uint128;

    const PREFIX: &str = "cosmos";

    fn native(byte: u8) -> String {
        EvmAddress::new([byte; 20]).to_native(PREFIX).unwrap().to_string()
    }

    fn hex_addr(byte: u8) -> String {
        EvmAddress::new([byte; 20]).to_string()
    }

    #[test]
    fn test_convertible_denoms() {
        validate_convertible_denom("acoin").unwrap();
        validate_convertible_denom(&format!("ibc/{}", "A".repeat(64))).unwrap();
        validate_convertible_denom(&format!("erc20/{}", hex_addr(1))).unwrap();

        assert!(validate_convertible_denom("ibc/1234").is_err());
        assert!(validate_convertible_denom("erc20/0x1234").is_err());
        assert!(validate_convertible_denom("gamm/pool/1").is_err());
        assert!(validate_convertible_denom("1coin").is_err());
        assert!(validate_convertible_denom("").is_err());
    }

    #[test]
    fn test_convert_coin_validation() {
        let msg = ExecuteMsg::ConvertCoin {
            coin: Coin::new(10, "acoin"),
            receiver: hex_addr(2),
            sender: native(1),
        };
        msg.validate(PREFIX).unwrap();

        let zero = ExecuteMsg::ConvertCoin {
            coin: Coin {
                denom: "acoin".to_string(),
                amount: Uint128::zero(),
            },
            receiver: hex_addr(2),
            sender: native(1),
        };
        assert!(matches!(
            zero.validate(PREFIX),
            Err(ContractError::InvalidAmount { .. })
        ));

        let swapped = ExecuteMsg::ConvertCoin {
            coin: Coin::new(10, "acoin"),
            receiver: native(2),
            sender: hex_addr(1),
        };
        assert!(matches!(
            swapped.validate(PREFIX),
            Err(ContractError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_convert_erc20_validation() {
        let msg = ExecuteMsg::ConvertErc20 {
            contract_address: hex_addr(9),
            amount: Uint256::from(5u128),
            receiver: native(1),
            sender: hex_addr(1),
        };
        msg.validate(PREFIX).unwrap();
        assert!(msg.validate("terra").is_err());

        let zero = ExecuteMsg::ConvertErc20 {
            contract_address: hex_addr(9),
            amount: Uint256::zero(),
            receiver: native(1),
            sender: hex_addr(1),
        };
        assert!(matches!(
            zero.validate(PREFIX),
            Err(ContractError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_toggle_requires_token() {
        let msg = ExecuteMsg::ToggleTokenConversion {
            authority: native(1),
            token: " ".to_string(),
        };
        assert!(msg.validate(PREFIX).is_err());
    }
}
