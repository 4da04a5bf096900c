//! In-memory collaborators for tests
//!
//! `MockBank` keeps balances, supply and metadata in maps. `MockEvm` runs a
//! tiny ERC20 interpreter that understands exactly the calls this module
//! makes, plus a few misbehaving token variants. `ModuleApp` ties them to a
//! `MockStorage` and restores all three when a message fails, the way the host
//! reverts a failed transaction.

use std::collections::{BTreeMap, BTreeSet};

use common::{DenomUnit, Metadata};
use cosmwasm_std::testing::MockStorage;
use cosmwasm_std::{
    from_json, Addr, Binary, Coin, Order, Response, StdError, StdResult, Storage, Uint128,
    Uint256,
};
use alloy_sol_types::{SolCall, SolEvent, SolInterface, SolValue};
use serde::de::DeserializeOwned;

use crate::abi::{
    from_u256, to_u256, IERC20::IERC20Calls, IERC20MinterBurner::IERC20MinterBurnerCalls,
    WrapperInit, IERC20,
};
use crate::address_codec::EvmAddress;
use crate::config::{module_address, ModuleConfig, Settings, DEFAULT_MODULE_NAME};
use crate::contract::{self, ModuleDeps, ModuleDepsMut};
use crate::error::ContractError;
use crate::execute::post_tx_processing;
use crate::genesis::{init_genesis, GenesisState};
use crate::hash::keccak256;
use crate::keepers::{BankKeeper, EvmAccount, EvmCallResponse, EvmKeeper, EvmLog, EMPTY_CODE_HASH};
use crate::msg::{ExecuteMsg, QueryMsg};

pub const BECH32_PREFIX: &str = "cosmos";
pub const EVM_DENOM: &str = "aevm";
pub const CHAIN_ID: u64 = 9000;
/// Creation code the mock EVM recognizes as the wrapper contract
pub const WRAPPER_BYTECODE: &[u8] = b"\x60\x80\x60\x40mock-erc20-minter-burner";

/// Native account whose raw bytes are `[byte; 20]`
pub fn native_addr(byte: u8) -> Addr {
    EvmAddress::new([byte; 20])
        .to_native(BECH32_PREFIX)
        .expect("valid bech32")
}

pub fn evm_addr(byte: u8) -> EvmAddress {
    EvmAddress::new([byte; 20])
}

pub fn authority() -> Addr {
    native_addr(0xaa)
}

pub fn mock_settings() -> Settings {
    Settings {
        module_name: DEFAULT_MODULE_NAME.to_string(),
        authority: authority().to_string(),
        bech32_prefix: BECH32_PREFIX.to_string(),
        evm_denom: EVM_DENOM.to_string(),
        wrapper_bytecode: Binary::from(WRAPPER_BYTECODE),
    }
}

/// Metadata of a coin with a base unit and one display unit
pub fn coin_metadata(base: &str, display: &str, exponent: u32) -> Metadata {
    Metadata {
        description: format!("The native coin {}", display),
        denom_units: vec![DenomUnit::new(base, 0), DenomUnit::new(display, exponent)],
        base: base.to_string(),
        display: display.to_string(),
        name: format!("{} coin", display),
        symbol: display.to_uppercase(),
    }
}

// ============================================================================
// Bank
// ============================================================================

#[derive(Clone, Debug, Default)]
pub struct MockBank {
    prefix: String,
    balances: BTreeMap<(String, String), Uint128>,
    supply: BTreeMap<String, Uint128>,
    metadata: BTreeMap<String, Metadata>,
    blocked: BTreeSet<String>,
}

impl MockBank {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            ..Default::default()
        }
    }

    /// Address of a module account, derived the same way as the module's own
    pub fn module_account(&self, module: &str) -> StdResult<Addr> {
        module_address(module).to_native(&self.prefix)
    }

    /// Create coins out of thin air for `address`
    pub fn fund(&mut self, address: &Addr, coin: &Coin) {
        self.credit(address.as_str(), coin);
        *self.supply.entry(coin.denom.clone()).or_default() += coin.amount;
    }

    pub fn block(&mut self, address: &Addr) {
        self.blocked.insert(address.to_string());
    }

    pub fn balance(&self, address: &Addr, denom: &str) -> Uint128 {
        self.balances
            .get(&(address.to_string(), denom.to_string()))
            .copied()
            .unwrap_or_default()
    }

    pub fn supply_of(&self, denom: &str) -> Uint128 {
        self.supply.get(denom).copied().unwrap_or_default()
    }

    fn credit(&mut self, address: &str, coin: &Coin) {
        *self
            .balances
            .entry((address.to_string(), coin.denom.clone()))
            .or_default() += coin.amount;
    }

    fn debit(&mut self, address: &str, coin: &Coin) -> StdResult<()> {
        let key = (address.to_string(), coin.denom.clone());
        let balance = self.balances.get(&key).copied().unwrap_or_default();
        let remaining = balance.checked_sub(coin.amount).map_err(|_| {
            StdError::generic_err(format!(
                "insufficient funds: {}{} < {}{}",
                balance, coin.denom, coin.amount, coin.denom
            ))
        })?;
        self.balances.insert(key, remaining);
        Ok(())
    }

    fn send(&mut self, from: &str, to: &str, amount: &[Coin]) -> StdResult<()> {
        for coin in amount {
            self.debit(from, coin)?;
            self.credit(to, coin);
        }
        Ok(())
    }
}

impl BankKeeper for MockBank {
    fn mint_coins(&mut self, module: &str, amount: &[Coin]) -> StdResult<()> {
        let account = self.module_account(module)?;
        for coin in amount {
            self.fund(&account, coin);
        }
        Ok(())
    }

    fn burn_coins(&mut self, module: &str, amount: &[Coin]) -> StdResult<()> {
        let account = self.module_account(module)?;
        for coin in amount {
            self.debit(account.as_str(), coin)?;
            let supply = self.supply.entry(coin.denom.clone()).or_default();
            *supply = supply.checked_sub(coin.amount)?;
        }
        Ok(())
    }

    fn send_coins_from_account_to_module(
        &mut self,
        sender: &Addr,
        module: &str,
        amount: &[Coin],
    ) -> StdResult<()> {
        let account = self.module_account(module)?;
        self.send(sender.as_str(), account.as_str(), amount)
    }

    fn send_coins_from_module_to_account(
        &mut self,
        module: &str,
        recipient: &Addr,
        amount: &[Coin],
    ) -> StdResult<()> {
        let account = self.module_account(module)?;
        self.send(account.as_str(), recipient.as_str(), amount)
    }

    fn get_balance(&self, address: &Addr, denom: &str) -> Coin {
        Coin {
            denom: denom.to_string(),
            amount: self.balance(address, denom),
        }
    }

    fn has_supply(&self, denom: &str) -> bool {
        !self.supply_of(denom).is_zero()
    }

    fn get_denom_metadata(&self, denom: &str) -> Option<Metadata> {
        self.metadata.get(denom).cloned()
    }

    fn set_denom_metadata(&mut self, metadata: Metadata) {
        self.metadata.insert(metadata.base.clone(), metadata);
    }

    fn blocked_addr(&self, address: &Addr) -> bool {
        self.blocked.contains(address.as_str())
    }
}

// ============================================================================
// EVM
// ============================================================================

/// How a mock token's `transfer` behaves
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenBehavior {
    Standard,
    /// Recipient receives one unit less than sent
    FeeOnTransfer,
    /// Moves nothing and returns `false`
    ReturnsFalse,
    /// Transfers normally but also emits an `Approval` event
    ApprovalOnTransfer,
}

#[derive(Clone, Debug)]
pub struct MockErc20 {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub balances: BTreeMap<EvmAddress, Uint256>,
    pub total_supply: Uint256,
    /// Account allowed to `mint` and `burnCoins`; `None` for fixed-supply tokens
    pub minter: Option<EvmAddress>,
    pub behavior: TokenBehavior,
}

impl MockErc20 {
    fn balance(&self, account: &EvmAddress) -> Uint256 {
        self.balances.get(account).copied().unwrap_or_default()
    }

    fn credit(&mut self, account: &EvmAddress, amount: Uint256) {
        *self.balances.entry(*account).or_default() += amount;
    }

    fn debit(&mut self, account: &EvmAddress, amount: Uint256) -> Result<(), String> {
        let balance = self.balance(account);
        let remaining = balance
            .checked_sub(amount)
            .map_err(|_| "ERC20: transfer amount exceeds balance".to_string())?;
        self.balances.insert(*account, remaining);
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct MockEvm {
    chain_id: u64,
    wrapper_bytecode: Vec<u8>,
    contracts: BTreeMap<EvmAddress, MockErc20>,
    nonces: BTreeMap<EvmAddress, u64>,
}

impl MockEvm {
    pub fn new(chain_id: u64, wrapper_bytecode: &[u8]) -> Self {
        Self {
            chain_id,
            wrapper_bytecode: wrapper_bytecode.to_vec(),
            contracts: BTreeMap::new(),
            nonces: BTreeMap::new(),
        }
    }

    /// Deploy a fixed-supply token from `deployer`
    pub fn deploy_token(
        &mut self,
        deployer: &EvmAddress,
        name: &str,
        symbol: &str,
        decimals: u8,
        behavior: TokenBehavior,
    ) -> EvmAddress {
        let address = self.next_create_address(deployer);
        self.contracts.insert(
            address,
            MockErc20 {
                name: name.to_string(),
                symbol: symbol.to_string(),
                decimals,
                balances: BTreeMap::new(),
                total_supply: Uint256::zero(),
                minter: None,
                behavior,
            },
        );
        address
    }

    /// Give `account` tokens without going through a call
    pub fn mint_tokens(&mut self, contract: &EvmAddress, account: &EvmAddress, amount: u128) {
        if let Some(token) = self.contracts.get_mut(contract) {
            token.credit(account, Uint256::from(amount));
            token.total_supply += Uint256::from(amount);
        }
    }

    pub fn token_balance(&self, contract: &EvmAddress, account: &EvmAddress) -> Uint256 {
        self.contracts
            .get(contract)
            .map(|token| token.balance(account))
            .unwrap_or_default()
    }

    pub fn token(&self, contract: &EvmAddress) -> Option<&MockErc20> {
        self.contracts.get(contract)
    }

    pub fn set_behavior(&mut self, contract: &EvmAddress, behavior: TokenBehavior) {
        if let Some(token) = self.contracts.get_mut(contract) {
            token.behavior = behavior;
        }
    }

    /// Remove the code of `contract`, keeping its address as an empty account
    pub fn selfdestruct(&mut self, contract: &EvmAddress) {
        self.contracts.remove(contract);
        self.nonces.entry(*contract).or_insert(1);
    }

    fn next_create_address(&mut self, deployer: &EvmAddress) -> EvmAddress {
        let nonce = self.nonces.entry(*deployer).or_insert(0);
        let address = deployer.create(*nonce);
        *nonce += 1;
        address
    }

    fn execute_call(
        &mut self,
        from: &EvmAddress,
        to: Option<&EvmAddress>,
        data: &[u8],
    ) -> StdResult<EvmCallResponse> {
        let to = match to {
            Some(to) => to,
            None => return self.execute_create(from, data),
        };
        let token = match self.contracts.get_mut(to) {
            Some(token) => token,
            // A call to an account without code succeeds and returns nothing.
            None => return Ok(EvmCallResponse::default()),
        };

        let outcome = if let Ok(call) = IERC20Calls::abi_decode(data, true) {
            erc20_call(token, to, from, call)
        } else if let Ok(call) = IERC20MinterBurnerCalls::abi_decode(data, true) {
            minter_burner_call(token, to, from, call)
        } else {
            Err(format!(
                "unknown selector 0x{}",
                hex::encode(data.get(..4).unwrap_or(data))
            ))
        };

        Ok(match outcome {
            Ok((ret, logs)) => EvmCallResponse {
                ret,
                logs,
                vm_error: None,
            },
            Err(reason) => revert(&reason),
        })
    }

    fn execute_create(&mut self, from: &EvmAddress, data: &[u8]) -> StdResult<EvmCallResponse> {
        let args = match data.strip_prefix(self.wrapper_bytecode.as_slice()) {
            Some(args) => args,
            None => return Ok(revert("invalid opcode: unknown init code")),
        };
        let init = match WrapperInit::abi_decode_params(args, true) {
            Ok(init) => init,
            Err(e) => return Ok(revert(&e.to_string())),
        };

        let address = self.next_create_address(from);
        self.contracts.insert(
            address,
            MockErc20 {
                name: init.name,
                symbol: init.symbol,
                decimals: init.decimals,
                balances: BTreeMap::new(),
                total_supply: Uint256::zero(),
                minter: Some(*from),
                behavior: TokenBehavior::Standard,
            },
        );
        Ok(EvmCallResponse::default())
    }
}

impl EvmKeeper for MockEvm {
    fn get_account_without_balance(&self, address: &EvmAddress) -> Option<EvmAccount> {
        let nonce = self.nonces.get(address).copied();
        if self.contracts.contains_key(address) {
            return Some(EvmAccount {
                nonce: nonce.unwrap_or(1),
                code_hash: keccak256(address.as_bytes()),
            });
        }
        nonce.map(|nonce| EvmAccount {
            nonce,
            code_hash: EMPTY_CODE_HASH,
        })
    }

    fn call_evm(
        &mut self,
        from: &EvmAddress,
        to: Option<&EvmAddress>,
        data: &[u8],
        commit: bool,
    ) -> StdResult<EvmCallResponse> {
        let mut next = self.clone();
        let res = next.execute_call(from, to, data)?;
        if commit && !res.failed() {
            *self = next;
        }
        Ok(res)
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

fn revert(reason: &str) -> EvmCallResponse {
    EvmCallResponse {
        ret: vec![],
        logs: vec![],
        vm_error: Some(format!("execution reverted: {}", reason)),
    }
}

fn event_log<E: SolEvent>(contract: &EvmAddress, event: &E) -> EvmLog {
    EvmLog {
        address: (*contract).into(),
        data: event.encode_log_data(),
    }
}

fn transfer_log(contract: &EvmAddress, from: &EvmAddress, to: &EvmAddress, amount: Uint256) -> EvmLog {
    event_log(
        contract,
        &IERC20::Transfer {
            from: (*from).into(),
            to: (*to).into(),
            value: to_u256(amount),
        },
    )
}

type CallOutcome = Result<(Vec<u8>, Vec<EvmLog>), String>;

fn erc20_call(
    token: &mut MockErc20,
    contract: &EvmAddress,
    from: &EvmAddress,
    call: IERC20Calls,
) -> CallOutcome {
    match call {
        IERC20Calls::name(_) => Ok((
            IERC20::nameCall::abi_encode_returns(&(token.name.clone(),)),
            vec![],
        )),
        IERC20Calls::symbol(_) => Ok((
            IERC20::symbolCall::abi_encode_returns(&(token.symbol.clone(),)),
            vec![],
        )),
        IERC20Calls::decimals(_) => Ok((
            IERC20::decimalsCall::abi_encode_returns(&(token.decimals,)),
            vec![],
        )),
        IERC20Calls::balanceOf(call) => {
            let balance = token.balance(&call.account.into());
            Ok((
                IERC20::balanceOfCall::abi_encode_returns(&(to_u256(balance),)),
                vec![],
            ))
        }
        IERC20Calls::transfer(call) => {
            transfer(token, contract, from, &call.to.into(), from_u256(call.amount))
        }
    }
}

fn minter_burner_call(
    token: &mut MockErc20,
    contract: &EvmAddress,
    from: &EvmAddress,
    call: IERC20MinterBurnerCalls,
) -> CallOutcome {
    match call {
        IERC20MinterBurnerCalls::mint(call) => {
            if token.minter != Some(*from) {
                return Err("caller is not the minter".to_string());
            }
            let recipient = EvmAddress::from(call.to);
            let amount = from_u256(call.amount);
            token.credit(&recipient, amount);
            token.total_supply += amount;
            Ok((
                vec![],
                vec![transfer_log(contract, &EvmAddress::ZERO, &recipient, amount)],
            ))
        }
        IERC20MinterBurnerCalls::burnCoins(call) => {
            if token.minter != Some(*from) {
                return Err("caller is not the minter".to_string());
            }
            burn(token, contract, &call.from.into(), from_u256(call.amount))
        }
        IERC20MinterBurnerCalls::burn(call) => burn(token, contract, from, from_u256(call.amount)),
    }
}

fn transfer(
    token: &mut MockErc20,
    contract: &EvmAddress,
    from: &EvmAddress,
    to: &EvmAddress,
    amount: Uint256,
) -> CallOutcome {
    let ok = IERC20::transferCall::abi_encode_returns(&(true,));
    match token.behavior {
        TokenBehavior::ReturnsFalse => Ok((IERC20::transferCall::abi_encode_returns(&(false,)), vec![])),
        TokenBehavior::Standard => {
            token.debit(from, amount)?;
            token.credit(to, amount);
            Ok((ok, vec![transfer_log(contract, from, to, amount)]))
        }
        TokenBehavior::FeeOnTransfer => {
            token.debit(from, amount)?;
            let fee = Uint256::one().min(amount);
            token.credit(to, amount - fee);
            token.total_supply -= fee;
            Ok((ok, vec![transfer_log(contract, from, to, amount - fee)]))
        }
        TokenBehavior::ApprovalOnTransfer => {
            token.debit(from, amount)?;
            token.credit(to, amount);
            let approval = event_log(
                contract,
                &IERC20::Approval {
                    owner: (*to).into(),
                    spender: (*from).into(),
                    value: to_u256(Uint256::MAX),
                },
            );
            Ok((
                ok,
                vec![transfer_log(contract, from, to, amount), approval],
            ))
        }
    }
}

fn burn(token: &mut MockErc20, contract: &EvmAddress, account: &EvmAddress, amount: Uint256) -> CallOutcome {
    token.debit(account, amount)?;
    token.total_supply -= amount;
    Ok((
        vec![],
        vec![transfer_log(contract, account, &EvmAddress::ZERO, amount)],
    ))
}

// ============================================================================
// App
// ============================================================================

/// Module plus collaborators with all-or-nothing message execution
pub struct ModuleApp {
    pub storage: MockStorage,
    pub bank: MockBank,
    pub evm: MockEvm,
    pub config: ModuleConfig,
}

impl ModuleApp {
    pub fn new(settings: Settings, genesis: &GenesisState) -> Result<Self, ContractError> {
        let config = ModuleConfig::new(settings)?;
        let mut bank = MockBank::new(&config.bech32_prefix);
        bank.block(&config.module_account()?);

        let mut storage = MockStorage::new();
        init_genesis(&mut storage, genesis)?;

        Ok(Self {
            storage,
            bank,
            evm: MockEvm::new(CHAIN_ID, config.wrapper_bytecode.as_slice()),
            config,
        })
    }

    /// App with default settings and default genesis
    pub fn default_app() -> Self {
        Self::new(mock_settings(), &GenesisState::default()).expect("default app")
    }

    pub fn deps(&self) -> ModuleDeps<'_> {
        ModuleDeps {
            storage: &self.storage,
            bank: &self.bank,
            evm: &self.evm,
            config: &self.config,
        }
    }

    pub fn deps_mut(&mut self) -> ModuleDepsMut<'_> {
        ModuleDepsMut {
            storage: &mut self.storage,
            bank: &mut self.bank,
            evm: &mut self.evm,
            config: &self.config,
        }
    }

    /// Run a message; on error every store is restored to its prior state.
    pub fn execute(&mut self, msg: ExecuteMsg) -> Result<Response, ContractError> {
        let snapshot = self.snapshot();
        let res = contract::execute(self.deps_mut(), msg);
        if res.is_err() {
            self.restore(snapshot);
        }
        res
    }

    pub fn post_tx_processing(&mut self, logs: &[EvmLog]) -> Result<Response, ContractError> {
        let snapshot = self.snapshot();
        let res = post_tx_processing(self.deps_mut(), logs);
        if res.is_err() {
            self.restore(snapshot);
        }
        res
    }

    pub fn query<T: DeserializeOwned>(&self, msg: QueryMsg) -> StdResult<T> {
        from_json(contract::query(self.deps(), msg)?)
    }

    fn snapshot(&self) -> (Vec<(Vec<u8>, Vec<u8>)>, MockBank, MockEvm) {
        let entries = self.storage.range(None, None, Order::Ascending).collect();
        (entries, self.bank.clone(), self.evm.clone())
    }

    fn restore(&mut self, (entries, bank, evm): (Vec<(Vec<u8>, Vec<u8>)>, MockBank, MockEvm)) {
        let mut storage = MockStorage::new();
        for (key, value) in entries {
            storage.set(&key, &value);
        }
        self.storage = storage;
        self.bank = bank;
        self.evm = evm;
    }
}
