//! # Shared Utility Functions
//!
//! ## Address Formatting
//!
//! Functions for formatting hex account addresses for display:
//! - [`format_address`] - Format address with ellipsis (first N and last M characters)
//! - [`truncate_address`] - `format_address` with the `0x1234...abcd` layout
//!
//! ```rust
//! use shared::utils::format_address;
//!
//! let address = "0xAbC0000000000000000000000000000000001234";
//! assert_eq!(format_address(address, 6, 4), "0xAbC0...1234");
//! ```

/// Number of leading characters kept by [`truncate_address`] (`0x` plus four hex digits).
pub const ADDRESS_PREFIX_LEN: usize = 6;

/// Number of trailing characters kept by [`truncate_address`].
pub const ADDRESS_SUFFIX_LEN: usize = 4;

const ELLIPSIS: &str = "...";

/// Format an address by showing the first `prefix_len` and last `suffix_len` characters.
///
/// The `...` separator costs three characters, so addresses that would not get
/// shorter, and non-ASCII input, are returned as-is.
///
/// # Examples
///
/// ```rust
/// use shared::utils::format_address;
///
/// let addr = "0x1234567890123456789012345678901234567890";
/// assert_eq!(format_address(addr, 6, 4), "0x1234...7890");
/// assert_eq!(format_address(addr, 8, 6), "0x123456...567890");
/// assert_eq!(format_address("0x12", 6, 4), "0x12");
/// ```
pub fn format_address(address: &str, prefix_len: usize, suffix_len: usize) -> String {
    let address_len = address.len();

    if !address.is_ascii() || address_len <= prefix_len + suffix_len + ELLIPSIS.len() {
        return address.to_string();
    }

    let prefix = &address[..prefix_len];
    let suffix = &address[address_len - suffix_len..];

    format!("{}{}{}", prefix, ELLIPSIS, suffix)
}

/// Format an address with the default `0x1234...abcd` layout.
///
/// # Examples
///
/// ```rust
/// use shared::utils::truncate_address;
///
/// let addr = "0xdeF0000000000000000000000000000000005678";
/// assert_eq!(truncate_address(addr), "0xdeF0...5678");
/// ```
pub fn truncate_address(address: &str) -> String {
    format_address(address, ADDRESS_PREFIX_LEN, ADDRESS_SUFFIX_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_address() {
        let addr = "0x1234567890123456789012345678901234567890";
        assert_eq!(format_address(addr, 6, 4), "0x1234...7890");
        assert_eq!(format_address(addr, 2, 2), "0x...90");
    }

    #[test]
    fn test_format_address_short() {
        assert_eq!(format_address("0x1234", 6, 4), "0x1234");
        assert_eq!(format_address("0x1234567890", 6, 4), "0x1234567890");
        assert_eq!(format_address("0x123456789012", 6, 4), "0x123456789012");
        assert_eq!(format_address("0x1234567890123", 6, 4), "0x1234...0123");
    }

    #[test]
    fn test_format_address_never_grows() {
        let addr = "0x1234567890123456789012345678901234567890";
        for len in 0..=addr.len() {
            let input = &addr[..len];
            assert!(format_address(input, 6, 4).len() <= input.len(), "input {:?}", input);
        }
    }

    #[test]
    fn test_format_address_non_ascii_is_untouched() {
        assert_eq!(format_address("0xé234567890123456", 6, 4), "0xé234567890123456");
    }

    #[test]
    fn test_truncate_address() {
        let addr = "0x0000000000000000000000000000000000000000";
        assert_eq!(truncate_address(addr), "0x0000...0000");
    }
}
