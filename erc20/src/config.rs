//! Module configuration
//!
//! The host supplies [`Settings`] once at start-up. [`ModuleConfig::new`]
//! validates them and derives the module's EVM identity; the resulting config
//! is passed to every handler through the dependency context.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary};

use crate::address_codec::{validate_native_address, EvmAddress};
use crate::error::ContractError;
use crate::hash::keccak256;

/// Default module name, also the name of its bank module account
pub const DEFAULT_MODULE_NAME: &str = "erc20";

/// Raw module settings as loaded from the host configuration
#[cw_serde]
pub struct Settings {
    /// Module account name (defaults to "erc20")
    #[serde(default = "default_module_name")]
    pub module_name: String,
    /// Governance authority allowed to register pairs and update params
    pub authority: String,
    /// Bech32 prefix of native account addresses
    pub bech32_prefix: String,
    /// Native gas token denom; no registered coin may contain it
    pub evm_denom: String,
    /// Creation bytecode of the minter/burner wrapper contract deployed by `RegisterCoin`
    pub wrapper_bytecode: Binary,
}

fn default_module_name() -> String {
    DEFAULT_MODULE_NAME.to_string()
}

/// Validated module configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleConfig {
    pub module_name: String,
    /// EVM address of the module account, `keccak256(module_name)[12..32]`
    pub module_address: EvmAddress,
    pub authority: Addr,
    pub bech32_prefix: String,
    pub evm_denom: String,
    pub wrapper_bytecode: Binary,
}

impl ModuleConfig {
    pub fn new(settings: Settings) -> Result<Self, ContractError> {
        if settings.module_name.trim().is_empty() {
            return Err(ContractError::Std(cosmwasm_std::StdError::generic_err(
                "module name cannot be blank",
            )));
        }
        if settings.evm_denom.trim().is_empty() {
            return Err(ContractError::InvalidDenom {
                reason: "evm denom cannot be blank".to_string(),
            });
        }
        if settings.wrapper_bytecode.is_empty() {
            return Err(ContractError::Std(cosmwasm_std::StdError::generic_err(
                "wrapper contract bytecode cannot be empty",
            )));
        }

        let authority = validate_native_address(&settings.authority, &settings.bech32_prefix)
            .map_err(|e| ContractError::InvalidAddress {
                reason: format!("authority: {}", e),
            })?;

        Ok(Self {
            module_address: module_address(&settings.module_name),
            module_name: settings.module_name,
            authority,
            bech32_prefix: settings.bech32_prefix,
            evm_denom: settings.evm_denom,
            wrapper_bytecode: settings.wrapper_bytecode,
        })
    }

    /// Native bech32 form of the module account
    pub fn module_account(&self) -> Result<Addr, ContractError> {
        Ok(self.module_address.to_native(&self.bech32_prefix)?)
    }
}

/// Derive a module account's EVM address from its name
pub fn module_address(module_name: &str) -> EvmAddress {
    let hash = keccak256(module_name.as_bytes());
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[12..32]);
    EvmAddress::new(bytes)
}
