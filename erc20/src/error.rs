//! Error types for the ERC20 conversion module
//!
//! Policy errors (disabled conversion, duplicate registration, bad authority)
//! and invariant violations (balance mismatch, failed transfer, unexpected
//! approval) all abort the message; the host reverts every state change.

use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    // ========================================================================
    // Authorization Errors
    // ========================================================================

    #[error("invalid signer: expected {expected}, got {got}")]
    InvalidSigner { expected: String, got: String },

    // ========================================================================
    // Policy Errors
    // ========================================================================

    #[error("erc20 module is disabled")]
    Erc20Disabled,

    #[error("token pair not found: {token}")]
    TokenPairNotFound { token: String },

    #[error("token pair already exists: {token}")]
    TokenPairAlreadyExists { token: String },

    #[error("token pair disabled: {token}")]
    TokenPairDisabled { token: String },

    #[error("undefined owner of contract pair")]
    UndefinedOwner,

    #[error("cannot register the evm denomination or a denom containing it: {denom}")]
    EvmDenom { denom: String },

    #[error("base denomination '{denom}' cannot have a supply of 0")]
    NoSupply { denom: String },

    #[error("{address} is not allowed to receive funds")]
    BlockedAddress { address: String },

    // ========================================================================
    // Metadata Errors
    // ========================================================================

    #[error("internal token pair error: {reason}")]
    InternalTokenPair { reason: String },

    #[error("metadata provided ({supplied}) is different from metadata stored ({stored})")]
    MetadataMismatch { supplied: String, stored: String },

    // ========================================================================
    // Validation Errors
    // ========================================================================

    #[error("invalid address: {reason}")]
    InvalidAddress { reason: String },

    #[error("invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("invalid denom: {reason}")]
    InvalidDenom { reason: String },

    #[error("invalid genesis: {reason}")]
    InvalidGenesis { reason: String },

    // ========================================================================
    // Collaborator Errors
    // ========================================================================

    #[error("evm call {method} failed: {reason}")]
    EvmCall { method: String, reason: String },

    #[error("bank operation failed: {reason}")]
    Bank { reason: String },

    // ========================================================================
    // Invariant Violations
    // ========================================================================

    #[error("balance invariance: {reason}")]
    BalanceInvariance { reason: String },

    #[error("logic error: {reason}")]
    Logic { reason: String },

    #[error("unexpected event: {reason}")]
    UnexpectedEvent { reason: String },
}

impl ContractError {
    pub(crate) fn evm_call(method: &str, reason: impl ToString) -> Self {
        ContractError::EvmCall {
            method: method.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn bank(reason: impl ToString) -> Self {
        ContractError::Bank {
            reason: reason.to_string(),
        }
    }
}
