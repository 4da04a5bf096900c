//! Bank denomination metadata.
//!
//! Mirrors the bank module's `Metadata`/`DenomUnit` records together with the
//! validation rules the bank applies before storing them.

use std::collections::HashSet;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{StdError, StdResult};

use crate::denom::validate_denom;

/// A unit of a denomination, e.g. `atom` with exponent 6 relative to `uatom`
#[cw_serde]
pub struct DenomUnit {
    /// Denomination string of this unit
    pub denom: String,
    /// Power of 10 relating this unit to the base unit
    pub exponent: u32,
    /// Alternative names for this unit
    pub aliases: Vec<String>,
}

impl DenomUnit {
    pub fn new(denom: impl Into<String>, exponent: u32) -> Self {
        Self {
            denom: denom.into(),
            exponent,
            aliases: vec![],
        }
    }

    /// Validate the unit denom and its alias list.
    pub fn validate(&self) -> StdResult<()> {
        validate_denom(&self.denom)?;

        let mut seen = HashSet::new();
        for alias in &self.aliases {
            if alias.trim().is_empty() {
                return Err(StdError::generic_err(format!(
                    "alias for denom unit {} cannot be blank",
                    self.denom
                )));
            }
            if !seen.insert(alias.as_str()) {
                return Err(StdError::generic_err(format!(
                    "duplicate denomination unit alias {}",
                    alias
                )));
            }
        }

        Ok(())
    }
}

/// Metadata describing a coin denomination
#[cw_serde]
pub struct Metadata {
    pub description: String,
    /// Units in ascending exponent order; the first one is the base unit
    pub denom_units: Vec<DenomUnit>,
    /// Smallest unit, the one stored in balances
    pub base: String,
    /// Unit suggested for display by clients
    pub display: String,
    pub name: String,
    pub symbol: String,
}

impl Metadata {
    /// Validate the metadata the same way the bank does before storing it.
    ///
    /// - name and symbol are not blank
    /// - base and display are valid denoms
    /// - the first unit is the base unit with exponent 0
    /// - exponents are strictly increasing and unit denoms are unique
    /// - one of the units is the display unit
    pub fn validate(&self) -> StdResult<()> {
        if self.name.trim().is_empty() {
            return Err(StdError::generic_err("name field cannot be blank"));
        }
        if self.symbol.trim().is_empty() {
            return Err(StdError::generic_err("symbol field cannot be blank"));
        }
        validate_denom(&self.base)
            .map_err(|e| StdError::generic_err(format!("invalid metadata base denom: {}", e)))?;
        validate_denom(&self.display)
            .map_err(|e| StdError::generic_err(format!("invalid metadata display denom: {}", e)))?;

        let mut has_display = false;
        let mut current_exponent = 0u32;
        let mut seen_units = HashSet::new();

        for (i, unit) in self.denom_units.iter().enumerate() {
            if i == 0 {
                if unit.denom != self.base {
                    return Err(StdError::generic_err(format!(
                        "metadata's first denomination unit must be the one with base denom '{}'",
                        self.base
                    )));
                }
                if unit.exponent != 0 {
                    return Err(StdError::generic_err(format!(
                        "the exponent for base denomination unit {} must be 0",
                        self.base
                    )));
                }
            } else if current_exponent >= unit.exponent {
                return Err(StdError::generic_err(
                    "the denomination units must be sorted in ascending order",
                ));
            }
            current_exponent = unit.exponent;

            if !seen_units.insert(unit.denom.as_str()) {
                return Err(StdError::generic_err(format!(
                    "duplicate denomination unit {}",
                    unit.denom
                )));
            }
            if unit.denom == self.display {
                has_display = true;
            }
            unit.validate()?;
        }

        if !has_display {
            return Err(StdError::generic_err(format!(
                "metadata must contain a denomination unit with display denom '{}'",
                self.display
            )));
        }

        Ok(())
    }

    /// Exponent of the largest unit, used as the ERC20 `decimals`.
    pub fn decimals(&self) -> u32 {
        self.denom_units.last().map_or(0, |unit| unit.exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acoin_metadata() -> Metadata {
        Metadata {
            description: "A coin".to_string(),
            denom_units: vec![DenomUnit::new("acoin", 0), DenomUnit::new("coin", 18)],
            base: "acoin".to_string(),
            display: "coin".to_string(),
            name: "Coin".to_string(),
            symbol: "COIN".to_string(),
        }
    }

    #[test]
    fn test_valid_metadata() {
        let metadata = acoin_metadata();
        metadata.validate().unwrap();
        assert_eq!(metadata.decimals(), 18);
    }

    #[test]
    fn test_first_unit_must_be_base() {
        let mut metadata = acoin_metadata();
        metadata.denom_units.swap(0, 1);
        assert!(metadata.validate().is_err());
    }

    #[test]
    fn test_base_exponent_must_be_zero() {
        let mut metadata = acoin_metadata();
        metadata.denom_units[0].exponent = 1;
        assert!(metadata.validate().is_err());
    }

    #[test]
    fn test_exponents_must_increase() {
        let mut metadata = acoin_metadata();
        metadata.denom_units.push(DenomUnit::new("kcoin", 18));
        assert!(metadata.validate().is_err());
    }

    #[test]
    fn test_display_must_be_a_unit() {
        let mut metadata = acoin_metadata();
        metadata.display = "mcoin".to_string();
        assert!(metadata.validate().is_err());
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let mut metadata = acoin_metadata();
        metadata.denom_units[1].aliases = vec!["c".to_string(), "c".to_string()];
        assert!(metadata.validate().is_err());
    }

    #[test]
    fn test_blank_symbol_rejected() {
        let mut metadata = acoin_metadata();
        metadata.symbol = " ".to_string();
        assert!(metadata.validate().is_err());
    }
}
