//! Utility functions and helpers

/// Fractional digits shown for balances
const BALANCE_DISPLAY_DIGITS: usize = 4;

/// Format a raw on-chain balance with proper decimals.
///
/// The fractional part is truncated (never rounded) to four digits.
/// Anything that is not a non-negative integer renders as `0.0000`.
pub fn format_balance(balance: &str, decimals: u8) -> String {
    let Ok(raw) = balance.trim().parse::<u128>() else {
        return "0.0000".to_string();
    };
    let Some(divisor) = 10u128.checked_pow(decimals as u32) else {
        return "0.0000".to_string();
    };

    let integer_part = raw / divisor;
    let fractional_part = raw % divisor;

    let padded = format!("{:0>width$}", fractional_part, width = decimals as usize);
    let fractional: String = padded.chars().take(BALANCE_DISPLAY_DIGITS).collect();
    format!("{}.{}", integer_part, fractional)
}

/// Shorten an address for display: `0x1234...abcd`
pub fn format_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Explorer link for an account
pub fn explorer_url(explorer_base: &str, address: &str) -> String {
    format!("{}/address/{}", explorer_base.trim_end_matches('/'), address)
}

/// Check that a string looks like a hex account address (`0x` + hex digits)
pub fn is_hex_address(address: &str) -> bool {
    let Some(body) = address.strip_prefix("0x") else {
        return false;
    };
    if body.is_empty() {
        return false;
    }
    // hex::decode needs an even length
    let normalized = if body.len() % 2 == 1 {
        format!("0{}", body)
    } else {
        body.to_string()
    };
    hex::decode(normalized).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_balance() {
        assert_eq!(format_balance("0", 6), "0.0000");
        assert_eq!(format_balance("1500000", 6), "1.5000");
        assert_eq!(format_balance("1", 8), "0.0000");
        assert_eq!(format_balance("123456789", 8), "1.2345");
    }

    #[test]
    fn test_format_balance_invalid_input() {
        assert_eq!(format_balance("abc", 6), "0.0000");
        assert_eq!(format_balance("-5", 6), "0.0000");
        assert_eq!(format_balance("", 6), "0.0000");
    }

    #[test]
    fn test_format_address() {
        assert_eq!(format_address("0x1234567890abcdef"), "0x1234...cdef");
        assert_eq!(format_address("0x1"), "0x1");
    }

    #[test]
    fn test_explorer_url() {
        assert_eq!(
            explorer_url("https://suprascan.io/", "0xabc"),
            "https://suprascan.io/address/0xabc"
        );
    }

    #[test]
    fn test_is_hex_address() {
        assert!(is_hex_address("0x1"));
        assert!(is_hex_address("0xdeadbeef"));
        assert!(!is_hex_address("deadbeef"));
        assert!(!is_hex_address("0xzz"));
    }
}
