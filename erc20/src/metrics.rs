//! Prometheus counters for the ERC20 conversion module
//!
//! Registered in the default registry; the host node exposes them with the
//! rest of its telemetry.

use lazy_static::lazy_static;
use prometheus::{register_counter_vec, CounterVec};

lazy_static! {
    // Conversions
    pub static ref CONVERT_COIN: CounterVec = register_counter_vec!(
        "erc20_convert_coin_total",
        "Total number of coin to ERC20 conversions",
        &["denom", "erc20"]
    ).unwrap();

    pub static ref CONVERT_COIN_AMOUNT: CounterVec = register_counter_vec!(
        "erc20_convert_coin_amount_total",
        "Sum of amounts converted from coin to ERC20",
        &["denom", "erc20"]
    ).unwrap();

    pub static ref CONVERT_ERC20: CounterVec = register_counter_vec!(
        "erc20_convert_erc20_total",
        "Total number of ERC20 to coin conversions",
        &["denom", "erc20"]
    ).unwrap();

    pub static ref CONVERT_ERC20_AMOUNT: CounterVec = register_counter_vec!(
        "erc20_convert_erc20_amount_total",
        "Sum of amounts converted from ERC20 to coin",
        &["denom", "erc20"]
    ).unwrap();

    // Registry
    pub static ref PAIRS_DELETED: CounterVec = register_counter_vec!(
        "erc20_token_pairs_deleted_total",
        "Token pairs removed because the ERC20 contract no longer exists",
        &["denom", "erc20"]
    ).unwrap();

    // EVM hook
    pub static ref HOOK_TRANSFERS: CounterVec = register_counter_vec!(
        "erc20_hook_transfers_total",
        "Transfers to the module address seen by the EVM hook",
        &["status"]
    ).unwrap();
}

pub fn record_convert_coin(denom: &str, erc20: &str, amount: u128) {
    CONVERT_COIN.with_label_values(&[denom, erc20]).inc();
    CONVERT_COIN_AMOUNT
        .with_label_values(&[denom, erc20])
        .inc_by(amount as f64);
}

pub fn record_convert_erc20(denom: &str, erc20: &str, amount: u128) {
    CONVERT_ERC20.with_label_values(&[denom, erc20]).inc();
    CONVERT_ERC20_AMOUNT
        .with_label_values(&[denom, erc20])
        .inc_by(amount as f64);
}

pub fn record_pair_deleted(denom: &str, erc20: &str) {
    PAIRS_DELETED.with_label_values(&[denom, erc20]).inc();
}

pub fn record_hook_transfer(status: &str) {
    HOOK_TRANSFERS.with_label_values(&[status]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_counters_increment() {
        let before = CONVERT_COIN.with_label_values(&["tcoin", "0xT"]).get();
        let before_amount = CONVERT_COIN_AMOUNT.with_label_values(&["tcoin", "0xT"]).get();
        record_convert_coin("tcoin", "0xT", 10);
        assert_eq!(CONVERT_COIN.with_label_values(&["tcoin", "0xT"]).get(), before + 1.0);
        assert_eq!(
            CONVERT_COIN_AMOUNT.with_label_values(&["tcoin", "0xT"]).get(),
            before_amount + 10.0
        );
    }
}
