//! Execute handlers for the ERC20 conversion module.
//!
//! Handlers are organized by category:
//! - `convert` - ConvertCoin and ConvertErc20, one algorithm per pair owner
//! - `register` - RegisterCoin, RegisterErc20 and ToggleTokenConversion
//! - `params` - UpdateParams and the authority check shared by governance messages
//! - `hooks` - conversion of ERC20 transfers to the module address after an EVM tx

mod convert;
mod hooks;
mod params;
mod register;

pub use convert::*;
pub use hooks::*;
pub use params::*;
pub use register::*;
