use alloy_primitives::Address;

/// Parse a `0x`-prefixed 20-byte hex address.
///
/// All-lowercase and all-uppercase inputs are accepted as-is; mixed case must carry a valid
/// EIP-55 checksum.
pub fn parse_address(value: &str) -> Option<Address> {
    let hex = value.strip_prefix("0x")?;
    if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let address: Address = value.parse().ok()?;

    let has_lower = hex.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper && address.to_checksum(None)[2..] != *hex {
        return None;
    }
    Some(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_accepts_checksummed_and_lowercase() {
        let checksummed = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        let a = parse_address(checksummed).unwrap();
        let b = parse_address(&checksummed.to_lowercase()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_address_rejects_bad_checksum() {
        assert!(parse_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD").is_none());
    }

    #[test]
    fn test_parse_address_rejects_malformed() {
        for value in [
            "",
            "0x",
            "5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1bea",
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaedaa",
            "0xzaaeb6053f3e94c9b9a09f33669435e7ef1beaed",
        ] {
            assert!(parse_address(value).is_none(), "{value} should be rejected");
        }
    }
}
