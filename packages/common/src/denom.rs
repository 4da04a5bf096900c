//! Denomination validation matching the Cosmos SDK coin denom rules.
//!
//! A valid denom is 3 to 128 characters long, starts with an ASCII letter and
//! continues with ASCII letters, digits or one of `/ : . _ -`.

use cosmwasm_std::{StdError, StdResult};

/// Minimum length of a denomination
pub const MIN_DENOM_LEN: usize = 3;

/// Maximum length of a denomination
pub const MAX_DENOM_LEN: usize = 128;

/// Validate a coin denomination.
pub fn validate_denom(denom: &str) -> StdResult<()> {
    if denom.len() < MIN_DENOM_LEN || denom.len() > MAX_DENOM_LEN {
        return Err(StdError::generic_err(format!(
            "invalid denom {:?}: length must be between {} and {}",
            denom, MIN_DENOM_LEN, MAX_DENOM_LEN
        )));
    }

    let mut chars = denom.chars();
    let first_is_letter = chars.next().map_or(false, |c| c.is_ascii_alphabetic());
    if !first_is_letter {
        return Err(StdError::generic_err(format!(
            "invalid denom {:?}: must start with a letter",
            denom
        )));
    }

    if let Some(c) = chars.find(|c| !is_denom_char(*c)) {
        return Err(StdError::generic_err(format!(
            "invalid denom {:?}: unexpected character {:?}",
            denom, c
        )));
    }

    Ok(())
}

fn is_denom_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.' | '_' | '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_denoms() {
        for denom in ["uatom", "acoin", "erc20/0xdAC17F958D2ee523a2206206994597C13D831ec7", "ibc/ABC", "a.b_c-d:e"] {
            assert!(validate_denom(denom).is_ok(), "{denom} should be valid");
        }
    }

    #[test]
    fn test_invalid_denoms() {
        assert!(validate_denom("").is_err());
        assert!(validate_denom("ab").is_err());
        assert!(validate_denom("1coin").is_err());
        assert!(validate_denom("/coin").is_err());
        assert!(validate_denom("coin with space").is_err());
        assert!(validate_denom(&"a".repeat(129)).is_err());
        assert!(validate_denom(&"a".repeat(128)).is_ok());
    }
}
