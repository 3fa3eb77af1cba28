//! Conversions between whole units of the native asset, wei and Gwei.

use alloy::primitives::U256;

use crate::constants::{GWEI_DECIMALS, WEI_PER_UNIT};

/// Converts a count of whole units of the native asset to wei.
pub fn whole_units_to_wei(units: u64) -> U256 {
    U256::from(units) * U256::from(WEI_PER_UNIT)
}

/// Renders a wei amount in Gwei, truncating the fractional part.
///
/// The conversion works on the decimal representation so it never divides.
pub fn format_gwei(wei: U256) -> String {
    let digits = wei.to_string();
    match digits.len().checked_sub(GWEI_DECIMALS) {
        Some(whole) if whole > 0 => digits[..whole].to_string(),
        _ => "0".to_string(),
    }
}
