//! Conversion Flow Integration Tests.
//!
//! Tests both conversion directions for both pair owners:
//! - Coin → ERC20 → Coin round trips (module-owned and external pairs)
//! - Supply conservation across conversions
//! - Self-destructed contracts (lazy pair deletion, repeated attempts,
//!   retirements carried through genesis, orphaned rows next to live pairs)
//! - Pairs without a known owner
//! - Disabled pairs, blocked receivers, unknown tokens
//! - Rollback of every store when a conversion fails

use cosmwasm_std::{from_json, Coin, HexBinary, Uint128, Uint256};

use erc20::genesis::{export_genesis, DenomIndex, Erc20AddressIndex, GenesisState};
use erc20::msg::{ExecuteMsg, QueryMsg, RegisterResponse, TokenPairsResponse};
use erc20::registry;
use erc20::testing::{
    authority, coin_metadata, evm_addr, mock_settings, native_addr, ModuleApp, TokenBehavior,
};
use erc20::{ContractError, EvmAddress, Owner, TokenPair};

// ============================================================================
// Test Setup
// ============================================================================

struct TestEnv {
    app: ModuleApp,
    /// Wrapper ERC20 of `acoin`, owned by the module
    coin_token: EvmAddress,
    /// Pre-existing ERC20 registered as an external pair
    external_token: EvmAddress,
    external_denom: String,
}

fn setup() -> TestEnv {
    let mut app = ModuleApp::default_app();
    let alice = native_addr(1);

    app.bank.fund(&alice, &Coin::new(100, "acoin"));
    let res = app
        .execute(ExecuteMsg::RegisterCoin {
            authority: authority().to_string(),
            metadata: coin_metadata("acoin", "coin", 18),
        })
        .unwrap();
    let registered: RegisterResponse = from_json(res.data.unwrap()).unwrap();
    let coin_token: EvmAddress = registered.token_pair.erc20_address.parse().unwrap();

    let external_token =
        app.evm
            .deploy_token(&evm_addr(0x77), "Test Token", "TT", 6, TokenBehavior::Standard);
    app.evm.mint_tokens(&external_token, &evm_addr(1), 1_000);
    let res = app
        .execute(ExecuteMsg::RegisterErc20 {
            authority: authority().to_string(),
            erc20_address: external_token.to_string(),
        })
        .unwrap();
    let registered: RegisterResponse = from_json(res.data.unwrap()).unwrap();

    TestEnv {
        app,
        coin_token,
        external_token,
        external_denom: registered.token_pair.denom,
    }
}

fn convert_coin(amount: u128, denom: &str, from: u8, to: u8) -> ExecuteMsg {
    ExecuteMsg::ConvertCoin {
        coin: Coin::new(amount, denom),
        receiver: evm_addr(to).to_string(),
        sender: native_addr(from).to_string(),
    }
}

fn convert_erc20(amount: u128, contract: &EvmAddress, from: u8, to: u8) -> ExecuteMsg {
    ExecuteMsg::ConvertErc20 {
        contract_address: contract.to_string(),
        amount: Uint256::from(amount),
        receiver: native_addr(to).to_string(),
        sender: evm_addr(from).to_string(),
    }
}

fn token_balance(env: &TestEnv, contract: &EvmAddress, account: u8) -> u128 {
    let balance = env.app.evm.token_balance(contract, &evm_addr(account));
    Uint128::try_from(balance).unwrap().u128()
}

fn coin_balance(env: &TestEnv, denom: &str, account: u8) -> u128 {
    env.app.bank.balance(&native_addr(account), denom).u128()
}

// ============================================================================
// Module-owned pairs
// ============================================================================

#[test]
fn test_convert_coin_then_back() {
    let mut env = setup();
    let token = env.coin_token;

    let res = env.app.execute(convert_coin(10, "acoin", 1, 1)).unwrap();
    assert_eq!(coin_balance(&env, "acoin", 1), 90);
    assert_eq!(token_balance(&env, &token, 1), 10);

    let event = res.events.iter().find(|e| e.ty == "convert_coin").unwrap();
    let attr = |key: &str| {
        event
            .attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.clone())
            .unwrap()
    };
    assert_eq!(attr("sender"), native_addr(1).to_string());
    assert_eq!(attr("receiver"), evm_addr(1).to_checksum());
    assert_eq!(attr("amount"), "10");
    assert_eq!(attr("cosmos_coin"), "acoin");
    assert_eq!(attr("erc20_token"), token.to_checksum());

    env.app.execute(convert_erc20(5, &token, 1, 1)).unwrap();
    assert_eq!(coin_balance(&env, "acoin", 1), 95);
    assert_eq!(token_balance(&env, &token, 1), 5);
}

#[test]
fn test_module_owned_round_trip_has_no_drift() {
    let mut env = setup();
    let token = env.coin_token;
    let module = env.app.config.module_account().unwrap();

    env.app.execute(convert_coin(40, "acoin", 1, 2)).unwrap();
    assert_eq!(env.app.bank.balance(&module, "acoin"), Uint128::new(40));
    assert_eq!(env.app.bank.supply_of("acoin"), Uint128::new(100));

    env.app.execute(convert_erc20(40, &token, 2, 1)).unwrap();
    assert_eq!(coin_balance(&env, "acoin", 1), 100);
    assert_eq!(token_balance(&env, &token, 2), 0);
    assert_eq!(env.app.bank.balance(&module, "acoin"), Uint128::zero());
    assert_eq!(env.app.evm.token(&token).unwrap().total_supply, Uint256::zero());
}

#[test]
fn test_convert_more_than_balance_fails_without_effect() {
    let mut env = setup();
    let token = env.coin_token;

    let err = env.app.execute(convert_coin(101, "acoin", 1, 1)).unwrap_err();
    assert!(matches!(err, ContractError::Bank { .. }));
    assert_eq!(coin_balance(&env, "acoin", 1), 100);

    env.app.execute(convert_coin(10, "acoin", 1, 1)).unwrap();
    let err = env.app.execute(convert_erc20(11, &token, 1, 1)).unwrap_err();
    assert!(matches!(err, ContractError::EvmCall { .. }));
    assert_eq!(coin_balance(&env, "acoin", 1), 90);
    assert_eq!(token_balance(&env, &token, 1), 10);
}

// ============================================================================
// External pairs
// ============================================================================

#[test]
fn test_external_round_trip() {
    let mut env = setup();
    let token = env.external_token;
    let denom = env.external_denom.clone();
    let module = env.app.config.module_address;

    env.app.execute(convert_erc20(100, &token, 1, 1)).unwrap();
    assert_eq!(token_balance(&env, &token, 1), 900);
    assert_eq!(coin_balance(&env, &denom, 1), 100);
    assert_eq!(
        env.app.evm.token_balance(&token, &module),
        Uint256::from(100u128)
    );
    assert_eq!(env.app.bank.supply_of(&denom), Uint128::new(100));

    env.app.execute(convert_coin(100, &denom, 1, 1)).unwrap();
    assert_eq!(token_balance(&env, &token, 1), 1_000);
    assert_eq!(coin_balance(&env, &denom, 1), 0);
    assert_eq!(env.app.evm.token_balance(&token, &module), Uint256::zero());
    assert_eq!(env.app.bank.supply_of(&denom), Uint128::zero());
}

#[test]
fn test_external_convert_by_lowercase_address() {
    let mut env = setup();
    let token = env.external_token;

    env.app
        .execute(ExecuteMsg::ConvertErc20 {
            contract_address: token.to_string().to_lowercase(),
            amount: Uint256::from(1u128),
            receiver: native_addr(3).to_string(),
            sender: evm_addr(1).to_string(),
        })
        .unwrap();
    assert_eq!(coin_balance(&env, &env.external_denom, 3), 1);
}

#[test]
fn test_external_coin_conversion_needs_escrowed_tokens() {
    let mut env = setup();
    let denom = env.external_denom.clone();

    // Wrapper coins that were never backed cannot be redeemed.
    env.app.bank.fund(&native_addr(4), &Coin::new(5, denom.as_str()));
    let err = env.app.execute(convert_coin(5, &denom, 4, 4)).unwrap_err();
    assert!(matches!(err, ContractError::EvmCall { .. }));
    assert_eq!(coin_balance(&env, &denom, 4), 5);
}

// ============================================================================
// Self-destructed contracts
// ============================================================================

#[test]
fn test_selfdestructed_pair_is_deleted_idempotently() {
    let mut env = setup();
    let token = env.coin_token;
    env.app.execute(convert_coin(10, "acoin", 1, 1)).unwrap();
    env.app.evm.selfdestruct(&token);

    let res = env.app.execute(convert_coin(10, "acoin", 1, 1)).unwrap();
    assert!(res.events.iter().any(|e| e.ty == "delete_token_pair"));
    assert_eq!(coin_balance(&env, "acoin", 1), 90);

    let pairs: TokenPairsResponse = env
        .app
        .query(QueryMsg::TokenPairs {
            start_after: None,
            limit: None,
        })
        .unwrap();
    assert!(pairs
        .token_pairs
        .iter()
        .all(|pair| pair.erc20_address != token.to_checksum()));

    // A second attempt, in either direction, also succeeds without effect.
    env.app.execute(convert_coin(10, "acoin", 1, 1)).unwrap();
    env.app.execute(convert_erc20(5, &token, 1, 1)).unwrap();
    assert_eq!(coin_balance(&env, "acoin", 1), 90);
}

#[test]
fn test_selfdestructed_external_pair_is_deleted_from_erc20_side() {
    let mut env = setup();
    let token = env.external_token;
    env.app.evm.selfdestruct(&token);

    env.app.execute(convert_erc20(10, &token, 1, 1)).unwrap();
    assert_eq!(coin_balance(&env, &env.external_denom, 1), 0);

    let err = env
        .app
        .query::<erc20::msg::TokenPairResponse>(QueryMsg::TokenPair {
            token: env.external_denom.clone(),
        })
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_denom_can_be_registered_again_after_cleanup() {
    let mut env = setup();
    let old_token = env.coin_token;
    env.app.evm.selfdestruct(&old_token);
    env.app.execute(convert_coin(1, "acoin", 1, 1)).unwrap();

    let res = env
        .app
        .execute(ExecuteMsg::RegisterCoin {
            authority: authority().to_string(),
            metadata: coin_metadata("acoin", "coin", 18),
        })
        .unwrap();
    let registered: RegisterResponse = from_json(res.data.unwrap()).unwrap();
    let new_token: EvmAddress = registered.token_pair.erc20_address.parse().unwrap();
    assert_ne!(new_token, old_token);

    env.app.execute(convert_coin(10, "acoin", 1, 1)).unwrap();
    assert_eq!(token_balance(&env, &new_token, 1), 10);
}

#[test]
fn test_retired_tokens_survive_genesis_round_trip() {
    let mut env = setup();
    let token = env.coin_token;
    env.app.execute(convert_coin(10, "acoin", 1, 1)).unwrap();
    env.app.evm.selfdestruct(&token);
    env.app.execute(convert_coin(10, "acoin", 1, 1)).unwrap();

    let exported = export_genesis(&env.app.storage).unwrap();
    assert_eq!(exported.retired_tokens.len(), 2);

    let mut imported = ModuleApp::new(mock_settings(), &exported).unwrap();
    assert_eq!(export_genesis(&imported.storage).unwrap(), exported);
    imported.bank.fund(&native_addr(1), &Coin::new(10, "acoin"));

    // Still a no-op in both directions after the restart.
    imported.execute(convert_coin(10, "acoin", 1, 1)).unwrap();
    imported.execute(convert_erc20(5, &token, 1, 1)).unwrap();
    assert_eq!(imported.bank.balance(&native_addr(1), "acoin").u128(), 10);
}

#[test]
fn test_reregistration_clears_retirement() {
    let mut env = setup();
    let old_token = env.coin_token;
    env.app.evm.selfdestruct(&old_token);
    env.app.execute(convert_coin(1, "acoin", 1, 1)).unwrap();
    assert!(registry::is_token_retired(&env.app.storage, "acoin").unwrap());

    env.app
        .execute(ExecuteMsg::RegisterCoin {
            authority: authority().to_string(),
            metadata: coin_metadata("acoin", "coin", 18),
        })
        .unwrap();
    assert!(!registry::is_token_retired(&env.app.storage, "acoin").unwrap());
    // The old contract stays retired; only the denom was registered again.
    assert!(registry::is_token_retired(&env.app.storage, &old_token.to_string()).unwrap());
    assert_eq!(export_genesis(&env.app.storage).unwrap().retired_tokens.len(), 1);
}

#[test]
fn test_orphan_deletion_keeps_live_pair_of_same_denom() {
    // An older `acoin` row whose contract never existed, reachable only by
    // its address, next to the live wrapper registered for `acoin`.
    let orphan = TokenPair::new(&evm_addr(0x55), "acoin", Owner::Module);
    let genesis = GenesisState {
        token_pairs: vec![orphan.clone()],
        erc20_address_indexes: vec![Erc20AddressIndex {
            erc20_address: orphan.erc20_address.clone(),
            token_pair_id: HexBinary::from(orphan.id().unwrap().to_vec()),
        }],
        ..Default::default()
    };
    let mut app = ModuleApp::new(mock_settings(), &genesis).unwrap();
    app.bank.fund(&native_addr(1), &Coin::new(100, "acoin"));
    let res = app
        .execute(ExecuteMsg::RegisterCoin {
            authority: authority().to_string(),
            metadata: coin_metadata("acoin", "coin", 18),
        })
        .unwrap();
    let registered: RegisterResponse = from_json(res.data.unwrap()).unwrap();
    let live_token: EvmAddress = registered.token_pair.erc20_address.parse().unwrap();

    let res = app.execute(convert_erc20(5, &evm_addr(0x55), 1, 1)).unwrap();
    assert!(res.events.iter().any(|e| e.ty == "delete_token_pair"));
    assert!(!registry::is_token_retired(&app.storage, "acoin").unwrap());

    app.execute(convert_coin(10, "acoin", 1, 1)).unwrap();
    assert_eq!(app.bank.balance(&native_addr(1), "acoin").u128(), 90);
    assert_eq!(
        app.evm.token_balance(&live_token, &evm_addr(1)),
        Uint256::from(10u128)
    );
}

// ============================================================================
// Unspecified owner
// ============================================================================

#[test]
fn test_unspecified_owner_rejects_both_directions() {
    let deployer = evm_addr(0x77);
    let pair = TokenPair::new(&deployer.create(0), "ucoin", Owner::Unspecified);
    let id = HexBinary::from(pair.id().unwrap().to_vec());
    let genesis = GenesisState {
        token_pairs: vec![pair.clone()],
        denom_indexes: vec![DenomIndex {
            denom: pair.denom.clone(),
            token_pair_id: id.clone(),
        }],
        erc20_address_indexes: vec![Erc20AddressIndex {
            erc20_address: pair.erc20_address.clone(),
            token_pair_id: id,
        }],
        ..Default::default()
    };
    let mut app = ModuleApp::new(mock_settings(), &genesis).unwrap();

    let token = app
        .evm
        .deploy_token(&deployer, "Legacy", "LEG", 6, TokenBehavior::Standard);
    assert_eq!(token.to_checksum(), pair.erc20_address);
    app.bank.fund(&native_addr(1), &Coin::new(50, "ucoin"));
    app.evm.mint_tokens(&token, &evm_addr(1), 50);

    let err = app.execute(convert_coin(10, "ucoin", 1, 1)).unwrap_err();
    assert_eq!(err, ContractError::UndefinedOwner);
    let err = app.execute(convert_erc20(10, &token, 1, 1)).unwrap_err();
    assert_eq!(err, ContractError::UndefinedOwner);

    assert_eq!(app.bank.balance(&native_addr(1), "ucoin").u128(), 50);
    assert_eq!(app.bank.supply_of("ucoin").u128(), 50);
    assert_eq!(app.evm.token_balance(&token, &evm_addr(1)), Uint256::from(50u128));
    assert_eq!(
        app.evm.token_balance(&token, &app.config.module_address),
        Uint256::zero()
    );
}

// ============================================================================
// Policy
// ============================================================================

#[test]
fn test_disabled_pair_rejects_both_directions() {
    let mut env = setup();
    let token = env.coin_token;
    env.app.execute(convert_coin(10, "acoin", 1, 1)).unwrap();

    env.app
        .execute(ExecuteMsg::ToggleTokenConversion {
            authority: authority().to_string(),
            token: "acoin".to_string(),
        })
        .unwrap();

    let err = env.app.execute(convert_coin(10, "acoin", 1, 1)).unwrap_err();
    assert!(matches!(err, ContractError::TokenPairDisabled { .. }));
    let err = env.app.execute(convert_erc20(5, &token, 1, 1)).unwrap_err();
    assert!(matches!(err, ContractError::TokenPairDisabled { .. }));

    assert_eq!(coin_balance(&env, "acoin", 1), 90);
    assert_eq!(token_balance(&env, &token, 1), 10);
}

#[test]
fn test_unknown_token_not_found() {
    let mut env = setup();
    env.app.bank.fund(&native_addr(1), &Coin::new(5, "bcoin"));

    let err = env.app.execute(convert_coin(5, "bcoin", 1, 1)).unwrap_err();
    assert_eq!(
        err,
        ContractError::TokenPairNotFound {
            token: "bcoin".to_string()
        }
    );

    let err = env
        .app
        .execute(convert_erc20(5, &evm_addr(0x42), 1, 1))
        .unwrap_err();
    assert!(matches!(err, ContractError::TokenPairNotFound { .. }));
}

#[test]
fn test_module_account_cannot_receive() {
    let mut env = setup();
    let token = env.coin_token;
    let module = env.app.config.module_address;
    env.app.execute(convert_coin(10, "acoin", 1, 1)).unwrap();

    let err = env
        .app
        .execute(ExecuteMsg::ConvertCoin {
            coin: Coin::new(1, "acoin"),
            receiver: module.to_string(),
            sender: native_addr(1).to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, ContractError::BlockedAddress { .. }));

    let err = env
        .app
        .execute(ExecuteMsg::ConvertErc20 {
            contract_address: token.to_string(),
            amount: Uint256::from(1u128),
            receiver: env.app.config.module_account().unwrap().to_string(),
            sender: evm_addr(1).to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, ContractError::BlockedAddress { .. }));
}

#[test]
fn test_invalid_messages_rejected() {
    let mut env = setup();

    let err = env.app.execute(convert_coin(0, "acoin", 1, 1)).unwrap_err();
    assert!(matches!(err, ContractError::InvalidAmount { .. }));

    let err = env
        .app
        .execute(ExecuteMsg::ConvertCoin {
            coin: Coin::new(1, "acoin"),
            receiver: native_addr(1).to_string(),
            sender: native_addr(1).to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, ContractError::InvalidAddress { .. }));

    let err = env
        .app
        .execute(ExecuteMsg::ConvertErc20 {
            contract_address: "acoin".to_string(),
            amount: Uint256::from(1u128),
            receiver: native_addr(1).to_string(),
            sender: evm_addr(1).to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, ContractError::InvalidAddress { .. }));
}

#[test]
fn test_erc20_amount_above_coin_range_rejected() {
    let mut env = setup();
    let token = env.coin_token;

    let err = env
        .app
        .execute(ExecuteMsg::ConvertErc20 {
            contract_address: token.to_string(),
            amount: Uint256::from(u128::MAX) + Uint256::one(),
            receiver: native_addr(1).to_string(),
            sender: evm_addr(1).to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, ContractError::InvalidAmount { .. }));
}
