//! Decimal <-> smallest-unit conversion.
//!
//! Exact integer arithmetic only: the precision comes from the token's `decimals()`, never from
//! an assumed 18.

use alloy_primitives::U256;

use crate::errors::ConfigurationError;

/// Largest exponent for which `10^decimals` fits in a U256.
const MAX_DECIMALS: u8 = 77;

/// Scale a human-readable decimal (eg, `"0.0001"`) to the token's smallest unit.
pub fn parse_units(value: &str, decimals: u8) -> Result<U256, ConfigurationError> {
    let invalid = |reason: &str| invalid_amount(value, reason);

    if decimals > MAX_DECIMALS {
        return Err(invalid("token precision exceeds 77 decimals"));
    }
    let (whole, fraction) = split_decimal(value)?;

    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize {
        return Err(invalid(&format!(
            "more than {decimals} fractional digits for this token"
        )));
    }

    let mut digits = String::with_capacity(whole.len() + decimals as usize);
    digits.push_str(whole);
    digits.push_str(fraction);
    digits.extend(std::iter::repeat('0').take(decimals as usize - fraction.len()));

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 10).map_err(|_| invalid("amount overflows uint256"))
}

/// Syntax-check a decimal without a precision and report whether it is zero.
///
/// Zero is zero at every precision, so this needs no token metadata.
pub fn is_zero_decimal(value: &str) -> Result<bool, ConfigurationError> {
    let (whole, fraction) = split_decimal(value)?;
    Ok(whole.bytes().chain(fraction.bytes()).all(|b| b == b'0'))
}

fn split_decimal(value: &str) -> Result<(&str, &str), ConfigurationError> {
    let trimmed = value.trim();
    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid_amount(value, "empty amount"));
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid_amount(value, "expected an unsigned decimal number"));
    }
    Ok((whole, fraction))
}

fn invalid_amount(value: &str, reason: &str) -> ConfigurationError {
    ConfigurationError::InvalidAmount {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Inverse of [`parse_units`] for display; trailing fractional zeros are dropped.
pub fn format_units(amount: U256, decimals: u8) -> String {
    let raw = amount.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return raw;
    }
    let padded = if raw.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - raw.len()), raw)
    } else {
        raw
    };
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}
