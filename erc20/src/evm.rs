//! ERC20 calls made through the EVM keeper
//!
//! Every helper encodes one typed call from [`crate::abi`], runs it from the
//! given account and maps both keeper failures and VM reverts to
//! [`ContractError::EvmCall`].

use alloy_sol_types::{SolCall, SolEvent};
use common::Metadata;
use cosmwasm_std::Uint256;
use tracing::debug;

use crate::abi::{from_u256, WrapperInit, IERC20};
use crate::address_codec::EvmAddress;
use crate::error::ContractError;
use crate::keepers::{EvmCallResponse, EvmKeeper};

/// Name, symbol and decimals read from an ERC20 contract
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Erc20Data {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

// ============================================================================
// Calls
// ============================================================================

/// Run `call` on `contract`, failing on keeper errors and reverts.
pub fn call_evm<C: SolCall>(
    evm: &mut dyn EvmKeeper,
    from: &EvmAddress,
    contract: &EvmAddress,
    call: &C,
    commit: bool,
) -> Result<EvmCallResponse, ContractError> {
    let res = evm
        .call_evm(from, Some(contract), &call.abi_encode(), commit)
        .map_err(|e| ContractError::evm_call(C::SIGNATURE, e))?;

    if let Some(vm_error) = &res.vm_error {
        return Err(ContractError::evm_call(C::SIGNATURE, vm_error));
    }

    debug!(
        contract = %contract,
        method = C::SIGNATURE,
        commit,
        logs = res.logs.len(),
        "evm call"
    );
    Ok(res)
}

/// Decode the return data of a successful `C` call.
pub fn decode_return<C: SolCall>(res: &EvmCallResponse) -> Result<C::Return, ContractError> {
    C::abi_decode_returns(&res.ret, true).map_err(|e| ContractError::evm_call(C::SIGNATURE, e))
}

/// Run a read-only `C` call and decode its return data.
fn query<C: SolCall>(
    evm: &mut dyn EvmKeeper,
    from: &EvmAddress,
    contract: &EvmAddress,
    call: &C,
) -> Result<C::Return, ContractError> {
    let res = call_evm(evm, from, contract, call, false)?;
    decode_return::<C>(&res)
}

/// ERC20 balance of `account`, read without committing state
pub fn balance_of(
    evm: &mut dyn EvmKeeper,
    from: &EvmAddress,
    contract: &EvmAddress,
    account: &EvmAddress,
) -> Result<Uint256, ContractError> {
    let call = IERC20::balanceOfCall {
        account: (*account).into(),
    };
    Ok(from_u256(query(evm, from, contract, &call)?._0))
}

/// Read name, symbol and decimals of an ERC20 contract
pub fn query_erc20(
    evm: &mut dyn EvmKeeper,
    from: &EvmAddress,
    contract: &EvmAddress,
) -> Result<Erc20Data, ContractError> {
    Ok(Erc20Data {
        name: query(evm, from, contract, &IERC20::nameCall {})?._0,
        symbol: query(evm, from, contract, &IERC20::symbolCall {})?._0,
        decimals: query(evm, from, contract, &IERC20::decimalsCall {})?._0,
    })
}

/// Deploy a wrapper ERC20 for `metadata` from the module account.
///
/// The address is derived from the module account nonce before the creation
/// call runs. Constructor arguments are `(name, symbol, decimals)` where
/// decimals is the exponent of the largest denom unit.
pub fn deploy_erc20_contract(
    evm: &mut dyn EvmKeeper,
    deployer: &EvmAddress,
    bytecode: &[u8],
    metadata: &Metadata,
) -> Result<EvmAddress, ContractError> {
    let decimals = u8::try_from(metadata.decimals()).map_err(|_| ContractError::InternalTokenPair {
        reason: format!(
            "decimals {} of {} do not fit in uint8",
            metadata.decimals(),
            metadata.base
        ),
    })?;

    let init = WrapperInit {
        name: metadata.name.clone(),
        symbol: metadata.symbol.clone(),
        decimals,
    };
    let mut init_code = bytecode.to_vec();
    init_code.extend_from_slice(&alloy_sol_types::SolValue::abi_encode_params(&init));

    let nonce = evm
        .get_account_without_balance(deployer)
        .map_or(0, |account| account.nonce);
    let contract = deployer.create(nonce);

    let res = evm
        .call_evm(deployer, None, &init_code, true)
        .map_err(|e| ContractError::evm_call("deploy", e))?;
    if let Some(vm_error) = res.vm_error {
        return Err(ContractError::evm_call("deploy", vm_error));
    }

    Ok(contract)
}

/// Fail if the call emitted an ERC20 `Approval` event.
pub fn monitor_approval_event(res: &EvmCallResponse) -> Result<(), ContractError> {
    match res
        .logs
        .iter()
        .find(|log| log.topics().first() == Some(&IERC20::Approval::SIGNATURE_HASH))
    {
        Some(log) => Err(ContractError::UnexpectedEvent {
            reason: format!("Approval event emitted by {}", EvmAddress::from(log.address)),
        }),
        None => Ok(()),
    }
}
