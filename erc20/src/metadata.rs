//! Coin metadata for registered pairs
//!
//! `create_coin_metadata` builds the bank metadata of the native wrapper coin
//! for an existing ERC20 contract. `verify_metadata` guards the metadata of a
//! native coin being registered against silent replacement.

use common::{DenomUnit, Metadata};
use tracing::debug;

use crate::address_codec::EvmAddress;
use crate::contract::ModuleDepsMut;
use crate::error::ContractError;
use crate::evm::query_erc20;
use crate::keepers::BankKeeper;
use crate::registry;
use crate::state::ERC20_DENOM_PREFIX;

/// Longest display name kept from an ERC20 `name()`
pub const MAX_SANITIZED_NAME_LEN: usize = 128;

const RESERVED_PREFIXES: [&str; 2] = ["ibc/", "erc20/"];

/// Native denom of the wrapper coin for an ERC20 contract
pub fn erc20_denom(contract: &EvmAddress) -> String {
    format!("{}{}", ERC20_DENOM_PREFIX, contract.to_checksum())
}

/// Build and store the bank metadata for the wrapper coin of `contract`.
pub fn create_coin_metadata(
    deps: ModuleDepsMut,
    contract: &EvmAddress,
) -> Result<Metadata, ContractError> {
    let module_address = deps.config.module_address;
    let erc20 = query_erc20(deps.evm, &module_address, contract)?;

    let base = erc20_denom(contract);
    if deps.bank.get_denom_metadata(&base).is_some() {
        return Err(ContractError::InternalTokenPair {
            reason: format!("denom metadata already registered {}", base),
        });
    }
    if registry::is_denom_registered(deps.storage, &base) {
        return Err(ContractError::InternalTokenPair {
            reason: format!("coin denomination already registered: {}", erc20.name),
        });
    }

    let mut metadata = Metadata {
        description: format!("Cosmos coin token representation of {}", contract.to_checksum()),
        denom_units: vec![DenomUnit::new(base.clone(), 0)],
        base: base.clone(),
        display: base.clone(),
        name: base.clone(),
        symbol: erc20.symbol,
    };

    // A unit with exponent 0 other than the base is invalid.
    if erc20.decimals > 0 {
        let name = sanitize_erc20_name(&erc20.name);
        metadata
            .denom_units
            .push(DenomUnit::new(name.clone(), u32::from(erc20.decimals)));
        metadata.display = name;
    }

    metadata
        .validate()
        .map_err(|e| ContractError::InternalTokenPair {
            reason: format!("ERC20 token data is invalid for contract {}: {}", contract, e),
        })?;

    deps.bank.set_denom_metadata(metadata.clone());
    debug!(denom = %base, display = %metadata.display, "created coin metadata");

    Ok(metadata)
}

/// Store `supplied` if the bank has no metadata for its base denom, otherwise
/// require it to equal the stored metadata field for field.
pub fn verify_metadata(bank: &mut dyn BankKeeper, supplied: &Metadata) -> Result<(), ContractError> {
    match bank.get_denom_metadata(&supplied.base) {
        None => {
            bank.set_denom_metadata(supplied.clone());
            Ok(())
        }
        Some(stored) if stored == *supplied => Ok(()),
        Some(stored) => Err(ContractError::MetadataMismatch {
            supplied: cosmwasm_std::to_json_string(supplied)?,
            stored: cosmwasm_std::to_json_string(&stored)?,
        }),
    }
}

/// Turn an arbitrary ERC20 `name()` into a display denom.
///
/// Leading digits go first, then every character that is not an ASCII
/// letter, digit or `/`. The result is capped at 128 bytes and finally loses
/// any `ibc/` or `erc20/` prefixes, repeatedly.
pub fn sanitize_erc20_name(name: &str) -> String {
    let mut sanitized: String = name
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '/')
        .collect();
    sanitized.truncate(MAX_SANITIZED_NAME_LEN);
    strip_reserved_prefixes(&sanitized).to_string()
}

fn strip_reserved_prefixes(mut name: &str) -> &str {
    while let Some(rest) = RESERVED_PREFIXES
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
    {
        name = rest;
    }
    name
}
