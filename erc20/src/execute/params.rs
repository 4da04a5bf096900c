//! Governance authority check and params updates.

use cosmwasm_std::{Event, Response};
use tracing::info;

use crate::config::ModuleConfig;
use crate::contract::ModuleDepsMut;
use crate::error::ContractError;
use crate::registry::set_params;
use crate::state::Params;

/// Require `authority` to be the configured governance authority.
pub fn ensure_authority(config: &ModuleConfig, authority: &str) -> Result<(), ContractError> {
    if authority != config.authority.as_str() {
        return Err(ContractError::InvalidSigner {
            expected: config.authority.to_string(),
            got: authority.to_string(),
        });
    }
    Ok(())
}

/// Replace the module params.
///
/// Authorization: Governance authority only
pub fn execute_update_params(
    deps: ModuleDepsMut,
    authority: String,
    params: Params,
) -> Result<Response, ContractError> {
    ensure_authority(deps.config, &authority)?;

    set_params(deps.storage, &params)?;

    info!(
        enable_erc20 = params.enable_erc20,
        enable_evm_hook = params.enable_evm_hook,
        "erc20 params updated"
    );

    Ok(Response::new()
        .add_attribute("action", "update_params")
        .add_event(
            Event::new("update_params")
                .add_attribute("enable_erc20", params.enable_erc20.to_string())
                .add_attribute("enable_evm_hook", params.enable_evm_hook.to_string()),
        ))
}
