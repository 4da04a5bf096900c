//! ERC20 Conversion Module - Native Coin <-> ERC20 Token Bridging
//!
//! Lets one fungible asset live both as a native bank balance and as an ERC20
//! balance inside the EVM, and converts between the two 1:1.
//!
//! # Pair ownership
//! - `Module`: the native coin came first. The module deploys a wrapper ERC20,
//!   escrows coins and mints tokens on the way in, burns tokens and releases
//!   coins on the way out.
//! - `External`: the ERC20 came first. The module creates an `erc20/<address>`
//!   coin, escrows tokens in its EVM address and mints coins on the way in,
//!   burns coins and releases tokens on the way out.
//!
//! # Safety
//! - Every conversion compares balances before and after the EVM call and
//!   fails unless the delta equals the amount exactly
//! - Transfers on external contracts must return `true` and must not emit
//!   an `Approval` event
//! - A pair whose contract self-destructed is deleted on the next conversion
//!   attempt, which then succeeds without moving funds
//!
//! The host supplies the bank and EVM through [`keepers`] and runs every
//! message atomically; a returned error means the whole message reverts.

pub mod abi;
pub mod address_codec;
pub mod config;
pub mod contract;
pub mod error;
mod execute;
pub mod evm;
pub mod genesis;
pub mod hash;
pub mod keepers;
pub mod metadata;
pub mod metrics;
pub mod msg;
mod query;
pub mod registry;
pub mod state;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use crate::address_codec::EvmAddress;
pub use crate::config::{ModuleConfig, Settings};
pub use crate::contract::{execute, query, ModuleDeps, ModuleDepsMut};
pub use crate::error::ContractError;
pub use crate::execute::post_tx_processing;
pub use crate::hash::{compute_token_pair_id, keccak256, TokenPairId};
pub use crate::metadata::sanitize_erc20_name;
pub use crate::state::{Owner, Params, TokenPair};
