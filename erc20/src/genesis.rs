//! Genesis import and export
//!
//! Import writes pairs and index entries exactly as given. Indices are not
//! recomputed from the pairs, so an exported registry with orphaned pairs
//! (older pairs for a denom whose index moved on) round-trips unchanged.
//! Retired tokens are carried too, so conversions of a self-destructed pair's
//! tokens keep succeeding without effect after a restart.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{HexBinary, StdResult, Storage};
use cw2::set_contract_version;
use std::collections::HashSet;

use crate::address_codec::{is_hex_address, EvmAddress};
use crate::error::ContractError;
use crate::hash::TokenPairId;
use crate::registry;
use crate::state::{Params, TokenPair, CONTRACT_NAME, CONTRACT_VERSION};

#[cw_serde]
pub struct DenomIndex {
    pub denom: String,
    pub token_pair_id: HexBinary,
}

#[cw_serde]
pub struct Erc20AddressIndex {
    pub erc20_address: String,
    pub token_pair_id: HexBinary,
}

/// Denom or contract address of a pair deleted after its contract self-destructed
#[cw_serde]
pub struct RetiredToken {
    pub token: String,
    pub token_pair_id: HexBinary,
}

#[cw_serde]
#[derive(Default)]
pub struct GenesisState {
    pub params: Params,
    pub token_pairs: Vec<TokenPair>,
    pub denom_indexes: Vec<DenomIndex>,
    pub erc20_address_indexes: Vec<Erc20AddressIndex>,
    #[serde(default)]
    pub retired_tokens: Vec<RetiredToken>,
}

impl GenesisState {
    /// Shape checks only; the indices are trusted to match the pairs.
    pub fn validate(&self) -> Result<(), ContractError> {
        let invalid = |reason: String| ContractError::InvalidGenesis { reason };

        let mut seen = HashSet::new();
        for pair in &self.token_pairs {
            pair.validate()
                .map_err(|e| invalid(format!("token pair {}: {}", pair.denom, e)))?;
            if !seen.insert(pair.id()?) {
                return Err(invalid(format!(
                    "duplicate token pair {} / {}",
                    pair.erc20_address, pair.denom
                )));
            }
        }

        for index in &self.denom_indexes {
            common::validate_denom(&index.denom)
                .map_err(|e| invalid(format!("denom index {}: {}", index.denom, e)))?;
            to_token_pair_id(&index.token_pair_id)?;
        }

        for index in &self.erc20_address_indexes {
            index
                .erc20_address
                .parse::<EvmAddress>()
                .map_err(|e| invalid(format!("erc20 index {}: {}", index.erc20_address, e)))?;
            to_token_pair_id(&index.token_pair_id)?;
        }

        for retired in &self.retired_tokens {
            retired_token_key(&retired.token)
                .map_err(|e| invalid(format!("retired token {}: {}", retired.token, e)))?;
            to_token_pair_id(&retired.token_pair_id)?;
        }

        Ok(())
    }
}

/// Storage key of a retired token: checksummed address or the denom itself
fn retired_token_key(token: &str) -> StdResult<String> {
    if is_hex_address(token) {
        Ok(token.parse::<EvmAddress>()?.to_checksum())
    } else {
        common::validate_denom(token)?;
        Ok(token.to_string())
    }
}

/// Validate and store a genesis state.
pub fn init_genesis(storage: &mut dyn Storage, genesis: &GenesisState) -> Result<(), ContractError> {
    genesis.validate()?;

    set_contract_version(storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    registry::set_params(storage, &genesis.params)?;

    for pair in &genesis.token_pairs {
        registry::set_token_pair(storage, pair)?;
    }
    for index in &genesis.denom_indexes {
        registry::set_denom_index(storage, &index.denom, &to_token_pair_id(&index.token_pair_id)?)?;
    }
    for index in &genesis.erc20_address_indexes {
        let contract: EvmAddress = index.erc20_address.parse()?;
        registry::set_erc20_index(storage, &contract, &to_token_pair_id(&index.token_pair_id)?)?;
    }
    for retired in &genesis.retired_tokens {
        registry::set_retired_token(
            storage,
            &retired_token_key(&retired.token)?,
            &to_token_pair_id(&retired.token_pair_id)?,
        )?;
    }

    Ok(())
}

pub fn export_genesis(storage: &dyn Storage) -> StdResult<GenesisState> {
    Ok(GenesisState {
        params: registry::get_params(storage)?,
        token_pairs: registry::get_token_pairs(storage)?,
        denom_indexes: registry::get_denom_indexes(storage)?
            .into_iter()
            .map(|(denom, id)| DenomIndex {
                denom,
                token_pair_id: HexBinary::from(id.to_vec()),
            })
            .collect(),
        erc20_address_indexes: registry::get_erc20_indexes(storage)?
            .into_iter()
            .map(|(contract, id)| Erc20AddressIndex {
                erc20_address: contract.to_checksum(),
                token_pair_id: HexBinary::from(id.to_vec()),
            })
            .collect(),
        retired_tokens: registry::get_retired_tokens(storage)?
            .into_iter()
            .map(|(token, id)| RetiredToken {
                token,
                token_pair_id: HexBinary::from(id.to_vec()),
            })
            .collect(),
    })
}

fn to_token_pair_id(id: &HexBinary) -> Result<TokenPairId, ContractError> {
    id.as_slice()
        .try_into()
        .map_err(|_| ContractError::InvalidGenesis {
            reason: format!("token pair id must be 32 bytes, got {}", id.len()),
        })
}
