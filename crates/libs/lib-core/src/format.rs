//! Display formatting for on-chain quantities.

use alloy_primitives::{utils::format_ether, U256};

/// Balance shown before (or instead of) a fetched one.
pub const DEFAULT_BALANCE: &str = "0";

/// Format a wei amount as an ether decimal string.
///
/// Trailing zeros are trimmed but one fractional digit is always kept, so
/// whole amounts read `"1.0"`.
///
/// ```rust
/// use alloy_primitives::U256;
/// use lib_core::format::format_balance;
///
/// assert_eq!(format_balance(U256::from(1_500_000_000_000_000_000u128)), "1.5");
/// assert_eq!(format_balance(U256::ZERO), "0.0");
/// ```
pub fn format_balance(wei: U256) -> String {
    let formatted = format_ether(wei);

    match formatted.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                format!("{}.0", whole)
            } else {
                format!("{}.{}", whole, fraction)
            }
        }
        None => format!("{}.0", formatted),
    }
}
