//! ERC20 conversion module - Entry Points
//!
//! The host routes messages here with a dependency context that bundles the
//! module store, the bank and EVM collaborators, and the module config.
//! Handlers live in:
//! - `execute/` - conversion, registration, params and EVM hook handlers
//! - `query` - query handlers

use cosmwasm_std::{to_json_binary, Binary, Response, StdResult, Storage};

use crate::config::ModuleConfig;
use crate::error::ContractError;
use crate::execute::{
    execute_convert_coin, execute_convert_erc20, execute_register_coin, execute_register_erc20,
    execute_toggle_token_conversion, execute_update_params,
};
use crate::keepers::{BankKeeper, EvmKeeper};
use crate::msg::{ExecuteMsg, QueryMsg};
use crate::query::{query_params, query_token_pair, query_token_pairs};

// ============================================================================
// Dependency Context
// ============================================================================

/// Read-only view of the module and its collaborators
#[derive(Clone, Copy)]
pub struct ModuleDeps<'a> {
    pub storage: &'a dyn Storage,
    pub bank: &'a dyn BankKeeper,
    pub evm: &'a dyn EvmKeeper,
    pub config: &'a ModuleConfig,
}

/// Mutable view of the module and its collaborators
pub struct ModuleDepsMut<'a> {
    pub storage: &'a mut dyn Storage,
    pub bank: &'a mut dyn BankKeeper,
    pub evm: &'a mut dyn EvmKeeper,
    pub config: &'a ModuleConfig,
}

impl<'a> ModuleDepsMut<'a> {
    pub fn as_ref(&'_ self) -> ModuleDeps<'_> {
        ModuleDeps {
            storage: self.storage,
            bank: self.bank,
            evm: self.evm,
            config: self.config,
        }
    }

    /// Reborrow for passing to a helper while keeping `self` usable afterwards
    pub fn branch(&'_ mut self) -> ModuleDepsMut<'_> {
        ModuleDepsMut {
            storage: self.storage,
            bank: self.bank,
            evm: self.evm,
            config: self.config,
        }
    }
}

// ============================================================================
// Execute
// ============================================================================

pub fn execute(deps: ModuleDepsMut, msg: ExecuteMsg) -> Result<Response, ContractError> {
    msg.validate(&deps.config.bech32_prefix)?;

    match msg {
        ExecuteMsg::ConvertCoin {
            coin,
            receiver,
            sender,
        } => execute_convert_coin(deps, coin, receiver, sender),
        ExecuteMsg::ConvertErc20 {
            contract_address,
            amount,
            receiver,
            sender,
        } => execute_convert_erc20(deps, contract_address, amount, receiver, sender),
        ExecuteMsg::RegisterCoin {
            authority,
            metadata,
        } => execute_register_coin(deps, authority, metadata),
        ExecuteMsg::RegisterErc20 {
            authority,
            erc20_address,
        } => execute_register_erc20(deps, authority, erc20_address),
        ExecuteMsg::ToggleTokenConversion { authority, token } => {
            execute_toggle_token_conversion(deps, authority, token)
        }
        ExecuteMsg::UpdateParams { authority, params } => {
            execute_update_params(deps, authority, params)
        }
    }
}

// ============================================================================
// Query
// ============================================================================

pub fn query(deps: ModuleDeps, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::TokenPairs { start_after, limit } => {
            to_json_binary(&query_token_pairs(deps, start_after, limit)?)
        }
        QueryMsg::TokenPair { token } => to_json_binary(&query_token_pair(deps, token)?),
        QueryMsg::Params {} => to_json_binary(&query_params(deps)?),
    }
}
