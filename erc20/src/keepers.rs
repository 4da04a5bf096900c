//! Collaborator interfaces the conversion module drives
//!
//! The module owns only its registry store. Coin balances live in the bank and
//! contract state lives in the EVM; both are reached through these traits so
//! the host chain can plug in its own implementations.

use common::Metadata;
use cosmwasm_std::{Addr, Coin, StdResult};

use crate::address_codec::EvmAddress;

/// Log emitted during an EVM call
pub use alloy_primitives::Log as EvmLog;

/// keccak256 of empty code, the code hash of every externally owned account
pub const EMPTY_CODE_HASH: [u8; 32] = [
    0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c, 0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03, 0xc0,
    0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b, 0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85, 0xa4, 0x70,
];

/// Account bank ledger with module accounts
pub trait BankKeeper {
    fn mint_coins(&mut self, module: &str, amount: &[Coin]) -> StdResult<()>;

    fn burn_coins(&mut self, module: &str, amount: &[Coin]) -> StdResult<()>;

    fn send_coins_from_account_to_module(
        &mut self,
        sender: &Addr,
        module: &str,
        amount: &[Coin],
    ) -> StdResult<()>;

    fn send_coins_from_module_to_account(
        &mut self,
        module: &str,
        recipient: &Addr,
        amount: &[Coin],
    ) -> StdResult<()>;

    fn get_balance(&self, address: &Addr, denom: &str) -> Coin;

    /// Whether any supply of `denom` exists
    fn has_supply(&self, denom: &str) -> bool;

    fn get_denom_metadata(&self, denom: &str) -> Option<Metadata>;

    fn set_denom_metadata(&mut self, metadata: Metadata);

    /// Whether `address` is barred from receiving funds (module accounts)
    fn blocked_addr(&self, address: &Addr) -> bool;
}

/// EVM account as seen without loading its balance
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvmAccount {
    pub nonce: u64,
    pub code_hash: [u8; 32],
}

impl EvmAccount {
    /// Whether the account currently holds contract code
    pub fn is_contract(&self) -> bool {
        self.code_hash != EMPTY_CODE_HASH
    }
}

/// Result of an EVM call
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvmCallResponse {
    /// Return data of the call
    pub ret: Vec<u8>,
    pub logs: Vec<EvmLog>,
    /// Set when execution reverted or otherwise failed inside the VM
    pub vm_error: Option<String>,
}

impl EvmCallResponse {
    pub fn failed(&self) -> bool {
        self.vm_error.is_some()
    }
}

/// EVM state transition engine
pub trait EvmKeeper {
    /// Account nonce and code hash, `None` if the account does not exist.
    fn get_account_without_balance(&self, address: &EvmAddress) -> Option<EvmAccount>;

    /// Run a message call (`to = Some`) or a contract creation (`to = None`).
    ///
    /// With `commit = false` the call is simulated and leaves no state behind.
    /// `Err` is reserved for failures to run the call at all; reverts are
    /// reported through [`EvmCallResponse::vm_error`].
    fn call_evm(
        &mut self,
        from: &EvmAddress,
        to: Option<&EvmAddress>,
        data: &[u8],
        commit: bool,
    ) -> StdResult<EvmCallResponse>;

    fn chain_id(&self) -> u64;
}
