//! Registration handlers (RegisterCoin, RegisterErc20, ToggleTokenConversion).
//!
//! All three are governance messages. Registration writes the primary record
//! and then both indices; a second registration of the same denom repoints
//! the denom index to the newer pair.

use common::Metadata;
use cosmwasm_std::{to_json_binary, Event, HexBinary, Response, Storage};
use tracing::info;

use crate::address_codec::EvmAddress;
use crate::contract::ModuleDepsMut;
use crate::error::ContractError;
use crate::evm::deploy_erc20_contract;
use crate::execute::params::ensure_authority;
use crate::hash::TokenPairId;
use crate::metadata::{create_coin_metadata, verify_metadata};
use crate::msg::RegisterResponse;
use crate::registry;
use crate::state::{Owner, TokenPair};

/// Register a native coin and deploy a wrapper ERC20 owned by the module.
///
/// Authorization: Governance authority only
pub fn execute_register_coin(
    deps: ModuleDepsMut,
    authority: String,
    metadata: Metadata,
) -> Result<Response, ContractError> {
    ensure_authority(deps.config, &authority)?;
    ensure_erc20_enabled(&deps)?;

    if metadata.base.contains(&deps.config.evm_denom) {
        return Err(ContractError::EvmDenom {
            denom: metadata.base,
        });
    }

    if registry::is_denom_registered(deps.storage, &metadata.base) {
        return Err(ContractError::TokenPairAlreadyExists {
            token: metadata.base,
        });
    }

    if !deps.bank.has_supply(&metadata.base) {
        return Err(ContractError::NoSupply {
            denom: metadata.base,
        });
    }

    verify_metadata(deps.bank, &metadata)?;

    let contract = deploy_erc20_contract(
        deps.evm,
        &deps.config.module_address,
        deps.config.wrapper_bytecode.as_slice(),
        &metadata,
    )?;

    let pair = TokenPair::new(&contract, &metadata.base, Owner::Module);
    let id = store_token_pair(deps.storage, &pair)?;

    info!(
        denom = %pair.denom,
        erc20 = %pair.erc20_address,
        chain_id = deps.evm.chain_id(),
        "registered coin"
    );

    registration_response("register_coin", id, pair)
}

/// Register an existing ERC20 contract and create its wrapper coin.
///
/// Authorization: Governance authority only
pub fn execute_register_erc20(
    mut deps: ModuleDepsMut,
    authority: String,
    erc20_address: String,
) -> Result<Response, ContractError> {
    ensure_authority(deps.config, &authority)?;
    ensure_erc20_enabled(&deps)?;

    let contract: EvmAddress = erc20_address.parse()?;
    if registry::is_erc20_registered(deps.storage, &contract) {
        return Err(ContractError::TokenPairAlreadyExists {
            token: contract.to_checksum(),
        });
    }

    let metadata = create_coin_metadata(deps.branch(), &contract)?;

    let pair = TokenPair::new(&contract, metadata.base, Owner::External);
    let id = store_token_pair(deps.storage, &pair)?;

    info!(
        denom = %pair.denom,
        erc20 = %pair.erc20_address,
        chain_id = deps.evm.chain_id(),
        "registered erc20"
    );

    registration_response("register_erc20", id, pair)
}

/// Enable or disable conversions for a pair.
///
/// Authorization: Governance authority only
pub fn execute_toggle_token_conversion(
    deps: ModuleDepsMut,
    authority: String,
    token: String,
) -> Result<Response, ContractError> {
    ensure_authority(deps.config, &authority)?;

    let mut pair = registry::get_token_pair_by_token(deps.storage, &token)?.ok_or(
        ContractError::TokenPairNotFound {
            token: token.clone(),
        },
    )?;

    pair.enabled = !pair.enabled;
    registry::set_token_pair(deps.storage, &pair)?;

    info!(
        denom = %pair.denom,
        erc20 = %pair.erc20_address,
        enabled = pair.enabled,
        "toggled token conversion"
    );

    Ok(Response::new()
        .add_attribute("action", "toggle_token_conversion")
        .add_event(
            Event::new("toggle_token_conversion")
                .add_attribute("cosmos_coin", &pair.denom)
                .add_attribute("erc20_token", &pair.erc20_address)
                .add_attribute("enabled", pair.enabled.to_string()),
        ))
}

// ============================================================================
// Helpers
// ============================================================================

fn ensure_erc20_enabled(deps: &ModuleDepsMut) -> Result<(), ContractError> {
    if !registry::get_params(deps.storage)?.enable_erc20 {
        return Err(ContractError::Erc20Disabled);
    }
    Ok(())
}

/// Write the pair, point both indices at it and lift any earlier retirement
/// of its denom or contract
fn store_token_pair(storage: &mut dyn Storage, pair: &TokenPair) -> Result<TokenPairId, ContractError> {
    let id = registry::set_token_pair(storage, pair)?;
    registry::set_denom_index(storage, &pair.denom, &id)?;
    registry::set_erc20_index(storage, &pair.erc20_contract()?, &id)?;
    registry::clear_retired_tokens(storage, pair)?;
    Ok(id)
}

fn registration_response(
    action: &str,
    id: TokenPairId,
    pair: TokenPair,
) -> Result<Response, ContractError> {
    let token_pair_id = HexBinary::from(id.to_vec());
    Ok(Response::new()
        .add_attribute("action", action)
        .add_event(
            Event::new(action)
                .add_attribute("cosmos_coin", &pair.denom)
                .add_attribute("erc20_token", &pair.erc20_address)
                .add_attribute("token_pair_id", token_pair_id.to_hex()),
        )
        .set_data(to_json_binary(&RegisterResponse {
            token_pair_id,
            token_pair: pair,
        })?))
}
