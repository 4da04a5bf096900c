//! Query handlers for the ERC20 conversion module.

use cosmwasm_std::{HexBinary, Order, StdError, StdResult};
use cw_storage_plus::Bound;

use crate::contract::ModuleDeps;
use crate::msg::{ParamsResponse, TokenPairResponse, TokenPairsResponse};
use crate::registry;
use crate::state::TOKEN_PAIRS;

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

/// Page through registered pairs in id order.
pub fn query_token_pairs(
    deps: ModuleDeps,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<TokenPairsResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;

    let start = start_after
        .map(|id| {
            let bytes = HexBinary::from_hex(id.trim_start_matches("0x"))?;
            if bytes.len() != 32 {
                return Err(StdError::generic_err(format!(
                    "start_after must be a 32-byte token pair id, got {} bytes",
                    bytes.len()
                )));
            }
            Ok(bytes.to_vec())
        })
        .transpose()?;
    let min = start.as_deref().map(Bound::exclusive);

    let page: Vec<(Vec<u8>, _)> = TOKEN_PAIRS
        .range(deps.storage, min, None, Order::Ascending)
        .take(limit)
        .collect::<StdResult<_>>()?;

    let next_key = if page.len() == limit {
        page.last().map(|(id, _)| HexBinary::from(id.clone()))
    } else {
        None
    };

    Ok(TokenPairsResponse {
        token_pairs: page.into_iter().map(|(_, pair)| pair).collect(),
        next_key,
    })
}

/// Query a pair by ERC20 contract address or native denom.
pub fn query_token_pair(deps: ModuleDeps, token: String) -> StdResult<TokenPairResponse> {
    let token_pair = registry::get_token_pair_by_token(deps.storage, &token)?
        .ok_or_else(|| StdError::not_found(format!("token pair for {}", token)))?;
    Ok(TokenPairResponse { token_pair })
}

pub fn query_params(deps: ModuleDeps) -> StdResult<ParamsResponse> {
    Ok(ParamsResponse {
        params: registry::get_params(deps.storage)?,
    })
}
