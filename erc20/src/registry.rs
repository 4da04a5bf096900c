//! Token pair registry
//!
//! Direct key-value access to the primary `TokenPair` records and the two
//! secondary indices. `set_token_pair` writes only the primary record; callers
//! update the indices explicitly. Registering a pair for a denom that already
//! has one repoints the denom index to the newer pair and leaves the older row
//! (and its own contract index entry) in place.

use cosmwasm_std::{Order, StdError, StdResult, Storage};

use crate::address_codec::{is_hex_address, EvmAddress};
use crate::hash::TokenPairId;
use crate::state::{
    Params, TokenPair, DENOM_INDEX, ERC20_INDEX, PARAMS, RETIRED_TOKENS, TOKEN_PAIRS,
};

// ============================================================================
// Params
// ============================================================================

pub fn get_params(storage: &dyn Storage) -> StdResult<Params> {
    Ok(PARAMS.may_load(storage)?.unwrap_or_default())
}

pub fn set_params(storage: &mut dyn Storage, params: &Params) -> StdResult<()> {
    PARAMS.save(storage, params)
}

// ============================================================================
// Primary records
// ============================================================================

pub fn get_token_pair(storage: &dyn Storage, id: &TokenPairId) -> StdResult<Option<TokenPair>> {
    TOKEN_PAIRS.may_load(storage, id)
}

/// Write the primary record for `pair` and return its id. Indices are untouched.
pub fn set_token_pair(storage: &mut dyn Storage, pair: &TokenPair) -> StdResult<TokenPairId> {
    let id = pair.id()?;
    TOKEN_PAIRS.save(storage, &id, pair)?;
    Ok(id)
}

/// Remove the primary record of `pair` and the index entries that still point
/// at it.
///
/// Entries repointed to another pair are left alone. Returns the denom and the
/// checksummed address whose entries were removed.
pub fn delete_token_pair(storage: &mut dyn Storage, pair: &TokenPair) -> StdResult<Vec<String>> {
    let id = pair.id()?;
    let contract = pair.erc20_contract()?;
    TOKEN_PAIRS.remove(storage, &id);

    let mut removed = vec![];
    if ERC20_INDEX.may_load(storage, contract.as_bytes())? == Some(id) {
        ERC20_INDEX.remove(storage, contract.as_bytes());
        removed.push(contract.to_checksum());
    }
    if DENOM_INDEX.may_load(storage, &pair.denom)? == Some(id) {
        DENOM_INDEX.remove(storage, &pair.denom);
        removed.push(pair.denom.clone());
    }
    Ok(removed)
}

/// Delete a pair whose contract is gone and remember the tokens that resolved
/// to it, so later conversions of them succeed without effect.
pub fn retire_token_pair(storage: &mut dyn Storage, pair: &TokenPair) -> StdResult<()> {
    let id = pair.id()?;
    for token in delete_token_pair(storage, pair)? {
        RETIRED_TOKENS.save(storage, &token, &id)?;
    }
    Ok(())
}

/// Forget retirements of the denom and contract of `pair`.
pub fn clear_retired_tokens(storage: &mut dyn Storage, pair: &TokenPair) -> StdResult<()> {
    RETIRED_TOKENS.remove(storage, &pair.denom);
    RETIRED_TOKENS.remove(storage, &pair.erc20_contract()?.to_checksum());
    Ok(())
}

pub fn set_retired_token(storage: &mut dyn Storage, token: &str, id: &TokenPairId) -> StdResult<()> {
    RETIRED_TOKENS.save(storage, token, id)
}

/// Retired tokens keyed by denom or checksummed address
pub fn get_retired_tokens(storage: &dyn Storage) -> StdResult<Vec<(String, TokenPairId)>> {
    RETIRED_TOKENS
        .range(storage, None, None, Order::Ascending)
        .collect()
}

/// Whether `token` (address or denom) belonged to a retired pair
pub fn is_token_retired(storage: &dyn Storage, token: &str) -> StdResult<bool> {
    if is_hex_address(token) {
        let contract: EvmAddress = token.parse()?;
        Ok(RETIRED_TOKENS.has(storage, &contract.to_checksum()))
    } else {
        Ok(RETIRED_TOKENS.has(storage, token))
    }
}

pub fn is_token_pair_registered(storage: &dyn Storage, id: &TokenPairId) -> bool {
    TOKEN_PAIRS.has(storage, id)
}

/// All stored pairs, including ones no longer reachable through the denom index
pub fn get_token_pairs(storage: &dyn Storage) -> StdResult<Vec<TokenPair>> {
    TOKEN_PAIRS
        .range(storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, pair)| pair))
        .collect()
}

// ============================================================================
// Indices
// ============================================================================

pub fn get_token_pair_id_by_denom(storage: &dyn Storage, denom: &str) -> StdResult<Option<TokenPairId>> {
    DENOM_INDEX.may_load(storage, denom)
}

pub fn get_token_pair_id_by_erc20(
    storage: &dyn Storage,
    contract: &EvmAddress,
) -> StdResult<Option<TokenPairId>> {
    ERC20_INDEX.may_load(storage, contract.as_bytes())
}

pub fn set_denom_index(storage: &mut dyn Storage, denom: &str, id: &TokenPairId) -> StdResult<()> {
    DENOM_INDEX.save(storage, denom, id)
}

pub fn set_erc20_index(storage: &mut dyn Storage, contract: &EvmAddress, id: &TokenPairId) -> StdResult<()> {
    ERC20_INDEX.save(storage, contract.as_bytes(), id)
}

pub fn is_denom_registered(storage: &dyn Storage, denom: &str) -> bool {
    DENOM_INDEX.has(storage, denom)
}

pub fn is_erc20_registered(storage: &dyn Storage, contract: &EvmAddress) -> bool {
    ERC20_INDEX.has(storage, contract.as_bytes())
}

pub fn get_denom_indexes(storage: &dyn Storage) -> StdResult<Vec<(String, TokenPairId)>> {
    DENOM_INDEX
        .range(storage, None, None, Order::Ascending)
        .collect()
}

pub fn get_erc20_indexes(storage: &dyn Storage) -> StdResult<Vec<(EvmAddress, TokenPairId)>> {
    ERC20_INDEX
        .range(storage, None, None, Order::Ascending)
        .map(|item| {
            let (key, id) = item?;
            let bytes: [u8; 20] = key.as_slice().try_into().map_err(|_| {
                StdError::generic_err(format!("corrupt erc20 index key of {} bytes", key.len()))
            })?;
            Ok((EvmAddress::new(bytes), id))
        })
        .collect()
}

/// Resolve a user-facing token identifier: a hex contract address goes through
/// the contract index, anything else through the denom index.
pub fn get_token_pair_id(storage: &dyn Storage, token: &str) -> StdResult<Option<TokenPairId>> {
    if is_hex_address(token) {
        let contract: EvmAddress = token.parse()?;
        get_token_pair_id_by_erc20(storage, &contract)
    } else {
        get_token_pair_id_by_denom(storage, token)
    }
}

/// Resolve `token` to its pair record, if both the index entry and the row exist
pub fn get_token_pair_by_token(storage: &dyn Storage, token: &str) -> StdResult<Option<TokenPair>> {
    match get_token_pair_id(storage, token)? {
        Some(id) => get_token_pair(storage, &id),
        None => Ok(None),
    }
}
