//! Common - Shared Bank Types and Denomination Rules
//!
//! This package provides the bank-side type definitions and validation
//! helpers used by the ERC20 conversion module and the bank collaborator
//! it drives.

pub mod denom;
pub mod metadata;

pub use denom::{validate_denom, MAX_DENOM_LEN, MIN_DENOM_LEN};
pub use metadata::{DenomUnit, Metadata};
