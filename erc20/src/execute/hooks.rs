//! EVM hook: ERC20 transfers to the module address become native coins.
//!
//! Runs after an EVM transaction with the logs it emitted. A `Transfer` log
//! whose recipient is the module address and whose emitter is an enabled,
//! registered pair credits the sender's native account with the same amount.
//! A log that fails to convert is logged and skipped; it never fails the EVM
//! transaction.

use cosmwasm_std::{Coin, Event, Response, Uint128};
use tracing::{debug, warn};

use alloy_sol_types::SolEvent;

use crate::abi::{from_u256, IERC20MinterBurner, IERC20};
use crate::address_codec::EvmAddress;
use crate::contract::ModuleDepsMut;
use crate::error::ContractError;
use crate::evm::call_evm;
use crate::keepers::EvmLog;
use crate::metrics;
use crate::registry;
use crate::state::Owner;

/// Convert every qualifying transfer in `logs`.
///
/// Only a failure to read the params is returned as an error.
pub fn post_tx_processing(mut deps: ModuleDepsMut, logs: &[EvmLog]) -> Result<Response, ContractError> {
    let params = registry::get_params(deps.storage)?;
    if !params.enable_erc20 || !params.enable_evm_hook {
        return Ok(Response::new());
    }

    let mut res = Response::new().add_attribute("action", "post_tx_processing");

    for (index, log) in logs.iter().enumerate() {
        match convert_transfer_log(deps.branch(), log) {
            Ok(Some(event)) => {
                metrics::record_hook_transfer("converted");
                res = res.add_event(event);
            }
            Ok(None) => {}
            Err(err) => {
                metrics::record_hook_transfer("failed");
                warn!(
                    index,
                    contract = %log.address,
                    error = %err,
                    "failed to process EVM hook for ERC20 -> coin conversion"
                );
            }
        }
    }

    Ok(res)
}

/// Convert one log, or `None` when it is not a transfer this module handles.
fn convert_transfer_log(
    deps: ModuleDepsMut,
    log: &EvmLog,
) -> Result<Option<Event>, ContractError> {
    let transfer = match IERC20::Transfer::decode_log_data(&log.data, true) {
        Ok(transfer) => transfer,
        Err(_) => return Ok(None),
    };

    let module = deps.config.module_address;
    if EvmAddress::from(transfer.to) != module {
        return Ok(None);
    }

    let contract = EvmAddress::from(log.address);
    let id = match registry::get_token_pair_id_by_erc20(deps.storage, &contract)? {
        Some(id) => id,
        None => return Ok(None),
    };
    let pair = match registry::get_token_pair(deps.storage, &id)? {
        Some(pair) if pair.enabled => pair,
        _ => return Ok(None),
    };

    let value = from_u256(transfer.value);
    if value.is_zero() {
        return Ok(None);
    }
    let amount = Uint128::try_from(value).map_err(|_| ContractError::InvalidAmount {
        reason: format!("{} exceeds the maximum coin amount", value),
    })?;

    let from = EvmAddress::from(transfer.from);
    let recipient = from.to_native(&deps.config.bech32_prefix)?;
    if deps.bank.blocked_addr(&recipient) {
        return Err(ContractError::BlockedAddress {
            address: recipient.to_string(),
        });
    }

    let coins = [Coin::new(amount.u128(), &pair.denom)];
    match pair.contract_owner {
        Owner::Module => {
            let burn = IERC20MinterBurner::burnCall {
                amount: transfer.value,
            };
            call_evm(deps.evm, &module, &contract, &burn, true)?;
        }
        Owner::External => deps
            .bank
            .mint_coins(&deps.config.module_name, &coins)
            .map_err(ContractError::bank)?,
        Owner::Unspecified => return Err(ContractError::UndefinedOwner),
    }

    deps.bank
        .send_coins_from_module_to_account(&deps.config.module_name, &recipient, &coins)
        .map_err(ContractError::bank)?;

    debug!(
        from = %from,
        recipient = %recipient,
        amount = %amount,
        denom = %pair.denom,
        "converted erc20 transfer to module"
    );

    Ok(Some(
        Event::new("convert_erc20")
            .add_attribute("sender", from.to_checksum())
            .add_attribute("receiver", recipient.as_str())
            .add_attribute("amount", amount.to_string())
            .add_attribute("cosmos_coin", &pair.denom)
            .add_attribute("erc20_token", &pair.erc20_address),
    ))
}
