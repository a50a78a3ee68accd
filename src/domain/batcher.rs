//! Withdrawal batcher contract binding and address handling

use alloy::primitives::{Address, U256};
use alloy::sol;

use crate::error::TickerError;

/// L1 withdrawal batching contract on mainnet
pub const DEFAULT_BATCHER_ADDRESS: &str = "0x613d088F2e5a2ED91635016483dAFa3cd47a8964";

/// Pending funds are denominated in a 6-decimal token
const AMOUNT_UNIT: u64 = 1_000_000;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IBatcher {
        /// Flushes pending withdrawals and returns the amount released
        function tick() external returns (uint256);
    }
}

/// Parse a batcher address in any casing.
///
/// The input is lowercased before parsing, so a stale or mistyped checksum is
/// normalized rather than rejected; display it with `to_checksum`.
pub fn parse_batcher_address(input: &str) -> Result<Address, TickerError> {
    let trimmed = input.trim();
    let payload = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let invalid = |reason: String| TickerError::InvalidAddress {
        input: input.to_string(),
        reason,
    };

    if payload.len() != 40 || !payload.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid("expected 40 hex chars".into()));
    }

    payload
        .to_ascii_lowercase()
        .parse::<Address>()
        .map_err(|e| invalid(e.to_string()))
}

/// Whole-token amount shown to the operator (integer division, fraction dropped)
pub fn display_amount(pending: U256) -> U256 {
    pending / U256::from(AMOUNT_UNIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::keccak256;
    use alloy_sol_types::SolCall;

    #[test]
    fn test_default_address_is_checksummed() {
        let addr = parse_batcher_address(DEFAULT_BATCHER_ADDRESS).unwrap();
        assert_eq!(addr.to_checksum(None), DEFAULT_BATCHER_ADDRESS);
    }

    #[test]
    fn test_lowercase_normalized() {
        let addr = parse_batcher_address("0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359").unwrap();
        assert_eq!(
            addr.to_checksum(None),
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359"
        );
    }

    #[test]
    fn test_uppercase_without_prefix() {
        let addr = parse_batcher_address("FB6916095CA1DF60BB79CE92CE3EA74C37C5D359").unwrap();
        assert_eq!(
            addr.to_checksum(None),
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359"
        );
    }

    #[test]
    fn test_wrong_checksum_normalized() {
        let miscased = "0x613D088F2e5a2ED91635016483dAFa3cd47a8964";
        let addr = parse_batcher_address(miscased).unwrap();
        assert_eq!(addr.to_checksum(None), DEFAULT_BATCHER_ADDRESS);

        let tampered = DEFAULT_BATCHER_ADDRESS.replace("dAF", "daF");
        let addr = parse_batcher_address(&tampered).unwrap();
        assert_eq!(addr.to_checksum(None), DEFAULT_BATCHER_ADDRESS);
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(parse_batcher_address("0x1234").is_err());
        assert!(parse_batcher_address("0xzz3d088f2e5a2ed91635016483dafa3cd47a8964").is_err());
    }

    #[test]
    fn test_display_amount_truncates() {
        assert_eq!(display_amount(U256::ZERO), U256::ZERO);
        assert_eq!(display_amount(U256::from(999_999u64)), U256::ZERO);
        assert_eq!(display_amount(U256::from(2_500_000u64)), U256::from(2u64));
    }

    #[test]
    fn test_tick_selector() {
        let expected = &keccak256("tick()")[..4];
        assert_eq!(IBatcher::tickCall::SELECTOR.as_slice(), expected);
        assert_eq!(IBatcher::tickCall {}.abi_encode(), expected.to_vec());
    }
}
