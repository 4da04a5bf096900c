//! Conversion handlers (ConvertCoin and ConvertErc20).
//!
//! Every conversion resolves its pair, repairs the registry if the pair's
//! contract no longer exists, and then runs the algorithm for the pair's
//! owner. Each algorithm snapshots balances, performs one ledger mutation and
//! one EVM call, and requires the observed balance deltas to equal the amount.

use cosmwasm_std::{to_json_binary, Addr, Coin, Event, Response, Uint128, Uint256};
use tracing::{debug, info};

use crate::abi::{to_u256, IERC20MinterBurner, IERC20};
use crate::address_codec::{validate_native_address, EvmAddress};
use crate::contract::{ModuleDeps, ModuleDepsMut};
use crate::error::ContractError;
use crate::evm::{balance_of, call_evm, decode_return, monitor_approval_event};
use crate::keepers::EvmCallResponse;
use crate::metrics;
use crate::msg::{ConvertCoinResponse, ConvertErc20Response};
use crate::registry;
use crate::state::{Owner, TokenPair};

// ============================================================================
// Entry points
// ============================================================================

/// Convert native coins held by `sender` into ERC20 tokens for `receiver`.
///
/// Authorization: `sender` (the host verifies the signature)
pub fn execute_convert_coin(
    mut deps: ModuleDepsMut,
    coin: Coin,
    receiver: String,
    sender: String,
) -> Result<Response, ContractError> {
    let sender = validate_native_address(&sender, &deps.config.bech32_prefix)?;
    let receiver: EvmAddress = receiver.parse()?;
    let receiver_native = receiver.to_native(&deps.config.bech32_prefix)?;

    if let Some(res) = retired_token_response(deps.as_ref(), &coin.denom)? {
        return Ok(res);
    }
    let pair = mint_enabled(deps.as_ref(), &receiver_native, &coin.denom)?;
    if let Some(res) = delete_if_selfdestructed(&mut deps, &pair)? {
        return Ok(res);
    }

    match pair.contract_owner {
        Owner::Module => {
            convert_coin_native_coin(deps.branch(), &pair, &sender, &receiver, coin.amount)?
        }
        Owner::External => {
            convert_coin_native_erc20(deps.branch(), &pair, &sender, &receiver, coin.amount)?
        }
        Owner::Unspecified => return Err(ContractError::UndefinedOwner),
    }

    metrics::record_convert_coin(&pair.denom, &pair.erc20_address, coin.amount.u128());
    debug!(
        sender = %sender,
        receiver = %receiver,
        amount = %coin.amount,
        denom = %pair.denom,
        "converted coin to erc20"
    );

    Ok(Response::new()
        .add_attribute("action", "convert_coin")
        .add_event(
            Event::new("convert_coin")
                .add_attribute("sender", sender.as_str())
                .add_attribute("receiver", receiver.to_checksum())
                .add_attribute("amount", coin.amount.to_string())
                .add_attribute("cosmos_coin", &pair.denom)
                .add_attribute("erc20_token", &pair.erc20_address),
        )
        .set_data(to_json_binary(&ConvertCoinResponse {})?))
}

/// Convert ERC20 tokens held by `sender` into native coins for `receiver`.
///
/// Authorization: `sender` (the host verifies the signature)
pub fn execute_convert_erc20(
    mut deps: ModuleDepsMut,
    contract_address: String,
    amount: Uint256,
    receiver: String,
    sender: String,
) -> Result<Response, ContractError> {
    let contract: EvmAddress = contract_address.parse()?;
    let sender: EvmAddress = sender.parse()?;
    let receiver = validate_native_address(&receiver, &deps.config.bech32_prefix)?;
    let amount = Uint128::try_from(amount).map_err(|_| ContractError::InvalidAmount {
        reason: format!("{} exceeds the maximum coin amount", amount),
    })?;

    if let Some(res) = retired_token_response(deps.as_ref(), &contract_address)? {
        return Ok(res);
    }
    let pair = mint_enabled(deps.as_ref(), &receiver, &contract.to_string())?;
    if let Some(res) = delete_if_selfdestructed(&mut deps, &pair)? {
        return Ok(res);
    }

    match pair.contract_owner {
        Owner::Module => {
            convert_erc20_native_coin(deps.branch(), &pair, &sender, &receiver, amount)?
        }
        Owner::External => {
            convert_erc20_native_token(deps.branch(), &pair, &sender, &receiver, amount)?
        }
        Owner::Unspecified => return Err(ContractError::UndefinedOwner),
    }

    metrics::record_convert_erc20(&pair.denom, &pair.erc20_address, amount.u128());
    debug!(
        sender = %sender,
        receiver = %receiver,
        amount = %amount,
        denom = %pair.denom,
        "converted erc20 to coin"
    );

    Ok(Response::new()
        .add_attribute("action", "convert_erc20")
        .add_event(
            Event::new("convert_erc20")
                .add_attribute("sender", sender.to_checksum())
                .add_attribute("receiver", receiver.as_str())
                .add_attribute("amount", amount.to_string())
                .add_attribute("cosmos_coin", &pair.denom)
                .add_attribute("erc20_token", &pair.erc20_address),
        )
        .set_data(to_json_binary(&ConvertErc20Response {})?))
}

// ============================================================================
// Ownership resolution
// ============================================================================

/// Resolve `token` to an enabled pair whose coins may be sent to `receiver`.
pub fn mint_enabled(
    deps: ModuleDeps,
    receiver: &Addr,
    token: &str,
) -> Result<TokenPair, ContractError> {
    let not_found = || ContractError::TokenPairNotFound {
        token: token.to_string(),
    };

    let id = registry::get_token_pair_id(deps.storage, token)?.ok_or_else(not_found)?;
    let pair = registry::get_token_pair(deps.storage, &id)?.ok_or_else(not_found)?;

    if !pair.enabled {
        return Err(ContractError::TokenPairDisabled {
            token: token.to_string(),
        });
    }

    if deps.bank.blocked_addr(receiver) {
        return Err(ContractError::BlockedAddress {
            address: receiver.to_string(),
        });
    }

    Ok(pair)
}

/// Delete `pair` if its contract is gone and return the response to send.
///
/// A missing account and an account without code are treated alike: the pair
/// no longer exists and the message succeeds without moving any balance.
fn delete_if_selfdestructed(
    deps: &mut ModuleDepsMut,
    pair: &TokenPair,
) -> Result<Option<Response>, ContractError> {
    let contract = pair.erc20_contract()?;
    let alive = deps
        .evm
        .get_account_without_balance(&contract)
        .map_or(false, |account| account.is_contract());
    if alive {
        return Ok(None);
    }

    registry::retire_token_pair(deps.storage, pair)?;
    metrics::record_pair_deleted(&pair.denom, &pair.erc20_address);
    info!(
        denom = %pair.denom,
        erc20 = %pair.erc20_address,
        "deleted token pair of self-destructed contract"
    );

    Ok(Some(
        Response::new()
            .add_attribute("action", "delete_token_pair")
            .add_event(
                Event::new("delete_token_pair")
                    .add_attribute("cosmos_coin", &pair.denom)
                    .add_attribute("erc20_token", &pair.erc20_address),
            ),
    ))
}

/// Success without effect for a token whose pair was deleted and never replaced
fn retired_token_response(deps: ModuleDeps, token: &str) -> Result<Option<Response>, ContractError> {
    if registry::get_token_pair_id(deps.storage, token)?.is_some()
        || !registry::is_token_retired(deps.storage, token)?
    {
        return Ok(None);
    }

    debug!(token, "conversion of retired token pair is a no-op");
    Ok(Some(
        Response::new()
            .add_attribute("action", "retired_token_pair")
            .add_attribute("token", token),
    ))
}

// ============================================================================
// Coin -> ERC20
// ============================================================================

/// MODULE owner: escrow the coins and mint the same amount of wrapper tokens.
pub fn convert_coin_native_coin(
    deps: ModuleDepsMut,
    pair: &TokenPair,
    sender: &Addr,
    receiver: &EvmAddress,
    amount: Uint128,
) -> Result<(), ContractError> {
    let contract = pair.erc20_contract()?;
    let module = deps.config.module_address;
    let coins = [Coin::new(amount.u128(), &pair.denom)];

    let balance_token = balance_of(deps.evm, &module, &contract, receiver)?;

    deps.bank
        .send_coins_from_account_to_module(sender, &deps.config.module_name, &coins)
        .map_err(ContractError::bank)?;

    let mint = IERC20MinterBurner::mintCall {
        to: (*receiver).into(),
        amount: to_u256(amount.into()),
    };
    call_evm(deps.evm, &module, &contract, &mint, true)?;

    let balance_token_after = balance_of(deps.evm, &module, &contract, receiver)?;
    ensure_increased("token", balance_token, balance_token_after, amount.into())
}

/// EXTERNAL owner: escrow and burn the wrapper coins, release escrowed tokens.
pub fn convert_coin_native_erc20(
    deps: ModuleDepsMut,
    pair: &TokenPair,
    sender: &Addr,
    receiver: &EvmAddress,
    amount: Uint128,
) -> Result<(), ContractError> {
    let contract = pair.erc20_contract()?;
    let module = deps.config.module_address;
    let coins = [Coin::new(amount.u128(), &pair.denom)];

    let balance_token = balance_of(deps.evm, &module, &contract, receiver)?;

    deps.bank
        .send_coins_from_account_to_module(sender, &deps.config.module_name, &coins)
        .map_err(ContractError::bank)?;

    let transfer = IERC20::transferCall {
        to: (*receiver).into(),
        amount: to_u256(amount.into()),
    };
    let res = call_evm(deps.evm, &module, &contract, &transfer, true)?;
    ensure_transfer_succeeded(&res)?;

    let balance_token_after = balance_of(deps.evm, &module, &contract, receiver)?;
    ensure_increased("token", balance_token, balance_token_after, amount.into())?;

    deps.bank
        .burn_coins(&deps.config.module_name, &coins)
        .map_err(ContractError::bank)?;

    monitor_approval_event(&res)
}

// ============================================================================
// ERC20 -> Coin
// ============================================================================

/// MODULE owner: burn the sender's wrapper tokens and unescrow the coins.
pub fn convert_erc20_native_coin(
    deps: ModuleDepsMut,
    pair: &TokenPair,
    sender: &EvmAddress,
    receiver: &Addr,
    amount: Uint128,
) -> Result<(), ContractError> {
    let contract = pair.erc20_contract()?;
    let module = deps.config.module_address;
    let coins = [Coin::new(amount.u128(), &pair.denom)];

    let balance_coin = deps.bank.get_balance(receiver, &pair.denom).amount;
    let balance_token = balance_of(deps.evm, &module, &contract, sender)?;

    let burn = IERC20MinterBurner::burnCoinsCall {
        from: (*sender).into(),
        amount: to_u256(amount.into()),
    };
    call_evm(deps.evm, &module, &contract, &burn, true)?;

    deps.bank
        .send_coins_from_module_to_account(&deps.config.module_name, receiver, &coins)
        .map_err(ContractError::bank)?;

    let balance_coin_after = deps.bank.get_balance(receiver, &pair.denom).amount;
    ensure_increased(
        "coin",
        balance_coin.into(),
        balance_coin_after.into(),
        amount.into(),
    )?;

    let balance_token_after = balance_of(deps.evm, &module, &contract, sender)?;
    ensure_decreased("token", balance_token, balance_token_after, amount.into())
}

/// EXTERNAL owner: escrow the sender's tokens in the module address, then mint
/// and send wrapper coins.
pub fn convert_erc20_native_token(
    deps: ModuleDepsMut,
    pair: &TokenPair,
    sender: &EvmAddress,
    receiver: &Addr,
    amount: Uint128,
) -> Result<(), ContractError> {
    let contract = pair.erc20_contract()?;
    let module = deps.config.module_address;
    let coins = [Coin::new(amount.u128(), &pair.denom)];

    let balance_coin = deps.bank.get_balance(receiver, &pair.denom).amount;
    let balance_token = balance_of(deps.evm, &module, &contract, &module)?;

    let transfer = IERC20::transferCall {
        to: module.into(),
        amount: to_u256(amount.into()),
    };
    let res = call_evm(deps.evm, sender, &contract, &transfer, true)?;
    ensure_transfer_succeeded(&res)?;

    let balance_token_after = balance_of(deps.evm, &module, &contract, &module)?;
    ensure_increased("token", balance_token, balance_token_after, amount.into())?;

    deps.bank
        .mint_coins(&deps.config.module_name, &coins)
        .map_err(ContractError::bank)?;
    deps.bank
        .send_coins_from_module_to_account(&deps.config.module_name, receiver, &coins)
        .map_err(ContractError::bank)?;

    let balance_coin_after = deps.bank.get_balance(receiver, &pair.denom).amount;
    ensure_increased(
        "coin",
        balance_coin.into(),
        balance_coin_after.into(),
        amount.into(),
    )?;

    monitor_approval_event(&res)
}

// ============================================================================
// Checks
// ============================================================================

fn ensure_transfer_succeeded(res: &EvmCallResponse) -> Result<(), ContractError> {
    if !decode_return::<IERC20::transferCall>(res)?._0 {
        return Err(ContractError::Logic {
            reason: "failed to execute transfer".to_string(),
        });
    }
    Ok(())
}

fn ensure_increased(
    what: &str,
    before: Uint256,
    after: Uint256,
    amount: Uint256,
) -> Result<(), ContractError> {
    if before.checked_add(amount).ok() == Some(after) {
        return Ok(());
    }
    Err(ContractError::BalanceInvariance {
        reason: format!(
            "invalid {} balance - expected {} + {}, got {}",
            what, before, amount, after
        ),
    })
}

fn ensure_decreased(
    what: &str,
    before: Uint256,
    after: Uint256,
    amount: Uint256,
) -> Result<(), ContractError> {
    if before.checked_sub(amount).ok() == Some(after) {
        return Ok(());
    }
    Err(ContractError::BalanceInvariance {
        reason: format!(
            "invalid {} balance - expected {} - {}, got {}",
            what, before, amount, after
        ),
    })
}
